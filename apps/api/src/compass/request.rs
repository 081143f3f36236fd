//! Turns an uploaded resume (document or pasted text) plus an instruction template into a
//! single generation prompt.

use bytes::Bytes;
use thiserror::Error;

use crate::llm_client::{Message, Part, Prompt, Role, Sampling};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromptError {
    #[error("No content provided for analysis")]
    MissingInput,

    #[error("Unsupported file format. Only {0} files or text content are supported.")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Png,
    Jpeg,
}

impl DocumentFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "application/pdf",
            DocumentFormat::Png => "image/png",
            DocumentFormat::Jpeg => "image/jpeg",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Png => "PNG",
            DocumentFormat::Jpeg => "JPEG",
        }
    }

    fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "application/pdf" => Some(DocumentFormat::Pdf),
            "image/png" => Some(DocumentFormat::Png),
            "image/jpeg" | "image/jpg" => Some(DocumentFormat::Jpeg),
            _ => None,
        }
    }

    fn from_file_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "png" => Some(DocumentFormat::Png),
            "jpg" | "jpeg" => Some(DocumentFormat::Jpeg),
            _ => None,
        }
    }

    fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(DocumentFormat::Png)
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(DocumentFormat::Jpeg)
        } else if has_pdf_header(data) {
            Some(DocumentFormat::Pdf)
        } else {
            None
        }
    }
}

/// PDF readers accept the `%PDF-` header anywhere in the first kilobyte.
fn has_pdf_header(data: &[u8]) -> bool {
    let head = &data[..data.len().min(1024)];
    head.windows(5).any(|w| w == b"%PDF-")
}

/// An instruction template and the document formats it can be paired with.
#[derive(Debug)]
pub struct PromptTemplate {
    pub instruction: &'static str,
    /// Appended to the instruction when the content is an attached document.
    pub document_lead_in: &'static str,
    /// Appended to the instruction, before the text, when the content is text.
    pub text_heading: &'static str,
    pub accepts: &'static [DocumentFormat],
}

impl PromptTemplate {
    fn accepted_labels(&self) -> String {
        self.accepts
            .iter()
            .map(DocumentFormat::label)
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[derive(Debug, Clone, Default)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadedFile {
    /// Declared MIME type, then filename extension, then magic bytes.
    pub fn detect_format(&self) -> Option<DocumentFormat> {
        self.content_type
            .as_deref()
            .and_then(DocumentFormat::from_mime)
            .or_else(|| self.file_name.as_deref().and_then(DocumentFormat::from_file_name))
            .or_else(|| DocumentFormat::sniff(&self.data))
    }
}

/// Raw multipart input: an optional `file` field and an optional `text` field.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub file: Option<UploadedFile>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserContent {
    Text(String),
    Document { data: Bytes, format: DocumentFormat },
}

#[derive(Debug)]
pub struct GenerationRequest {
    template: &'static PromptTemplate,
    content: UserContent,
}

impl GenerationRequest {
    /// Prefers an accepted document; otherwise falls back to non-empty text.
    pub fn from_upload(template: &'static PromptTemplate, upload: Upload) -> Result<Self, PromptError> {
        let text = upload.text.filter(|t| !t.trim().is_empty());
        let file = upload.file.filter(|f| !f.data.is_empty());

        let mut rejected = false;
        if let Some(file) = file {
            match file.detect_format() {
                Some(format) if template.accepts.contains(&format) => {
                    return Ok(Self {
                        template,
                        content: UserContent::Document {
                            data: file.data,
                            format,
                        },
                    });
                }
                _ => rejected = true,
            }
        }

        match text {
            Some(text) => Ok(Self {
                template,
                content: UserContent::Text(text),
            }),
            None if rejected => Err(PromptError::UnsupportedFormat(template.accepted_labels())),
            None => Err(PromptError::MissingInput),
        }
    }

    pub fn content(&self) -> &UserContent {
        &self.content
    }

    pub fn into_prompt(self) -> Prompt {
        let parts = match self.content {
            UserContent::Document { data, format } => vec![
                Part::Text(format!(
                    "{}\n\n{}",
                    self.template.instruction, self.template.document_lead_in
                )),
                Part::File {
                    data,
                    mime_type: format.mime_type().to_string(),
                },
            ],
            UserContent::Text(text) => vec![Part::Text(format!(
                "{}\n\n{}\n{}",
                self.template.instruction, self.template.text_heading, text
            ))],
        };

        Prompt {
            system: None,
            messages: vec![Message {
                role: Role::User,
                parts,
            }],
            sampling: Sampling::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static PDF_ONLY: PromptTemplate = PromptTemplate {
        instruction: "INSTRUCTION",
        document_lead_in: "Analyze the attached file:",
        text_heading: "CONTENT:",
        accepts: &[DocumentFormat::Pdf],
    };

    static ANY_DOCUMENT: PromptTemplate = PromptTemplate {
        instruction: "INSTRUCTION",
        document_lead_in: "Analyze the attached file:",
        text_heading: "CONTENT:",
        accepts: &[DocumentFormat::Pdf, DocumentFormat::Png, DocumentFormat::Jpeg],
    };

    fn pdf(name: &str) -> UploadedFile {
        UploadedFile {
            file_name: Some(name.to_string()),
            content_type: None,
            data: Bytes::from_static(b"%PDF-1.7\n..."),
        }
    }

    #[test]
    fn test_document_builds_two_part_message() {
        let upload = Upload {
            file: Some(pdf("resume.pdf")),
            text: None,
        };
        let prompt = GenerationRequest::from_upload(&PDF_ONLY, upload)
            .unwrap()
            .into_prompt();

        assert_eq!(prompt.messages.len(), 1);
        let parts = &prompt.messages[0].parts;
        assert_eq!(parts.len(), 2);
        assert_eq!(
            parts[0],
            Part::Text("INSTRUCTION\n\nAnalyze the attached file:".to_string())
        );
        assert!(matches!(&parts[1], Part::File { mime_type, .. } if mime_type == "application/pdf"));
    }

    #[test]
    fn test_text_builds_single_part_message() {
        let upload = Upload {
            file: None,
            text: Some("Rust engineer, 5 years".to_string()),
        };
        let prompt = GenerationRequest::from_upload(&PDF_ONLY, upload)
            .unwrap()
            .into_prompt();

        assert_eq!(
            prompt.messages[0].parts,
            vec![Part::Text(
                "INSTRUCTION\n\nCONTENT:\nRust engineer, 5 years".to_string()
            )]
        );
    }

    #[test]
    fn test_missing_input_is_rejected() {
        assert_eq!(
            GenerationRequest::from_upload(&PDF_ONLY, Upload::default()).unwrap_err(),
            PromptError::MissingInput
        );

        let blank = Upload {
            file: None,
            text: Some("   \n".to_string()),
        };
        assert_eq!(
            GenerationRequest::from_upload(&PDF_ONLY, blank).unwrap_err(),
            PromptError::MissingInput
        );
    }

    #[test]
    fn test_unsupported_file_without_text_is_rejected() {
        let upload = Upload {
            file: Some(UploadedFile {
                file_name: Some("resume.docx".to_string()),
                content_type: Some(
                    "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
                        .to_string(),
                ),
                data: Bytes::from_static(b"PK\x03\x04"),
            }),
            text: None,
        };
        assert!(matches!(
            GenerationRequest::from_upload(&PDF_ONLY, upload).unwrap_err(),
            PromptError::UnsupportedFormat(_)
        ));
    }

    #[test]
    fn test_unsupported_file_falls_back_to_text() {
        let upload = Upload {
            file: Some(UploadedFile {
                file_name: Some("photo.png".to_string()),
                content_type: Some("image/png".to_string()),
                data: Bytes::from_static(b"\x89PNG\r\n\x1a\n"),
            }),
            text: Some("extracted resume text".to_string()),
        };
        let request = GenerationRequest::from_upload(&PDF_ONLY, upload).unwrap();
        assert_eq!(
            request.content(),
            &UserContent::Text("extracted resume text".to_string())
        );
    }

    #[test]
    fn test_format_detection_order() {
        let declared = UploadedFile {
            file_name: Some("scan.pdf".to_string()),
            content_type: Some("image/jpeg".to_string()),
            data: Bytes::from_static(b"\xFF\xD8\xFF\xE0"),
        };
        assert_eq!(declared.detect_format(), Some(DocumentFormat::Jpeg));

        let by_extension = UploadedFile {
            file_name: Some("Resume.PDF".to_string()),
            content_type: Some("application/octet-stream".to_string()),
            data: Bytes::from_static(b"%PDF-1.4"),
        };
        assert_eq!(by_extension.detect_format(), Some(DocumentFormat::Pdf));

        let sniffed = UploadedFile {
            file_name: None,
            content_type: None,
            data: Bytes::from_static(b"\x89PNG\r\n\x1a\nrest"),
        };
        assert_eq!(sniffed.detect_format(), Some(DocumentFormat::Png));
    }

    #[test]
    fn test_images_accepted_only_where_template_allows() {
        let image = || Upload {
            file: Some(UploadedFile {
                file_name: Some("resume.jpg".to_string()),
                content_type: None,
                data: Bytes::from_static(b"\xFF\xD8\xFF\xE0"),
            }),
            text: None,
        };
        assert!(GenerationRequest::from_upload(&ANY_DOCUMENT, image()).is_ok());
        assert!(GenerationRequest::from_upload(&PDF_ONLY, image()).is_err());
    }
}
