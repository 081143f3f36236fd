// Prompt templates for the Career Compass routes.

use super::request::{DocumentFormat, PromptTemplate};

const PDF: &[DocumentFormat] = &[DocumentFormat::Pdf];
const PDF_OR_IMAGE: &[DocumentFormat] = &[
    DocumentFormat::Pdf,
    DocumentFormat::Png,
    DocumentFormat::Jpeg,
];

/// Markdown career analysis of a resume.
pub static CAREER_COMPASS: PromptTemplate = PromptTemplate {
    instruction: CAREER_COMPASS_INSTRUCTION,
    document_lead_in: "Analyze the resume in the attached PDF file using this format:",
    text_heading: "RESUME CONTENT TO ANALYZE:",
    accepts: PDF,
};

/// Single JSON object with the same data points as the markdown analysis.
pub static STRUCTURED_COMPASS: PromptTemplate = PromptTemplate {
    instruction: STRUCTURED_COMPASS_INSTRUCTION,
    document_lead_in: "Analyze the resume in the attached PDF file for structured object generation:",
    text_heading: "Analyze the resume for structured object generation:",
    accepts: PDF,
};

/// Job recommendations only, for manually entered credentials.
pub static MANUAL_STRUCTURED: PromptTemplate = PromptTemplate {
    instruction: MANUAL_STRUCTURED_INSTRUCTION,
    document_lead_in: "Analyze the inputted credentials in the attached PDF file for structured object generation:",
    text_heading: "Analyze the inputted credentials for structured object generation:",
    accepts: PDF,
};

/// Resume detection; answers YES or NO.
pub static RESUME_VALIDATION: PromptTemplate = PromptTemplate {
    instruction: "Analyze the following document and determine if it's a resume. \
        Only respond with \"YES\" if it's a resume or \"NO\" if it's not a resume.",
    document_lead_in: "Document to analyze:",
    text_heading: "Content to analyze:",
    accepts: PDF_OR_IMAGE,
};

pub const MANUAL_DETAILS_VALIDATION: &str = "\
Analyze the following text that contains professional background information.
Determine if it contains sufficient information for a basic career analysis.

For a valid submission, the text MUST include:
1. Education information (degree, diploma, or qualification)
2. Skills information (at least 2-5 relevant skills)

Any additional personal information is optional and not required for validation.

Only respond with \"VALID\" if the text contains sufficient education and skills information,
or \"INVALID: [reason]\" if either education or skills information is missing or too vague.

Text to analyze:";

/// Formats previously generated structured data as a markdown report.
pub const STRUCTURED_TO_MARKDOWN: &str = "\
# Job Recommendations
**IMPORTANT: DO NOT USE CODE BLOCKS, JUST PLAIN TEXT MARKDOWN**

For each role, format as follows:

## [Role Title] + Experience Level

| Assessment Metric     | Details |
|-----------------------|---------|
| 🔍 Skills Match       | List the matching skills |
| 👤 Experience Match   | Show the experience alignment |
| 📖 Education Match    | Show the education relevance |
| 🏭 Industry Focus     | Specify the primary industry for this position |

### 💵 Salary Benchmarks
For more accurate salary estimates, consider using the following resources
- List the links

### 📈 Growth Potential
- Market Demand: Specify the expected job growth rate
- Upward Mobility: Describe promotion potential

### 🔗 Current Opportunities
- Format each opportunity as a markdown link with the platform name:
- [Platform: Search Query](URL)

### 📚 Skill Development
Format exactly as follows:

| Tutorial Title       | Description                          | Duration | Link |
|----------------------|--------------------------------------|----------|------|
| Course name          | Skills covered                       | Duration | URL  |

### 🌟 Career Path Projections
- List the potential career paths
- Include required steps
- Note estimated timeline to achieve the next level

### ⚖️ Work-Life Balance
- Describe typical work-life balance for this role

### 🤖 AI Analysis Insights
- Include the AI analysis explanation

---
## Overall Evaluation

### 📊 Job Fit Score Per Role
Format as:
- Job Title: Percentage";

pub const STRUCTURED_DATA_HEADING: &str = "STRUCTURED DATA TO FORMAT:";

const CAREER_COMPASS_INSTRUCTION: &str = "\
**STRICT PROCESSING ORDER (DO NOT SKIP):**
1. COMPLETE Candidate Profile Analysis FIRST
2. ONLY THEN proceed to Job Recommendations
3. Confirm all profile analysis sections are complete before continuing.
---

# 1. Candidate Profile Analysis

## A. Core Competency Identification
- 🏅 **Technical Strengths**
- 📊 **Skill Frequency Analysis**:
  - Analyze the frequency of skills mentioned
  - Estimate how long each skill has been used, based on work experience descriptions.
- 🧩 **Unique Value Proposition**:
  - Identify what makes the candidate distinct: rare skill combinations, notable achievements or niche industry experience.
- 🎗️ **Certifications**:
  - List all of the candidate's certifications if they have any.

## B. Work Experience Summary
- ⏳ **Total Professional Tenure Breakdown**:
  - Summarize years of experience by role and industry.
- 🔀 **Multi-Industry Transfer Potential**:
  - Identify industries where the candidate's skills and experience are transferable.
  - Base recommendations on overlapping skills, certifications, or past projects.
- 📌 **Highlight: Most Impactful Project/Initiative**:
  - Describe the project, its impact, and relevance to career goals.

## C. Educational Pathway Analysis
- 🎓 **Degree Utilization Spectrum**:
  - Analyze possible applications of the candidate's degree to different careers.
  - Include relevant coursework or projects that align with potential career paths.
- 📜 **Certification Opportunities**:
  - Suggest certifications based on existing skills.
- 🌐 **Emerging Tech Alignment**:
  - Identify emerging technologies relevant to the candidate's field and assess alignment with their skills and education.

---
# 2. Job Recommendations
**DO NOT START BEFORE PROFILE ANALYSIS IS COMPLETE**
For each role (5-7 total, tailored to experience level):

## [Role Title] + Experience Level

| Assessment Metric     | Details |
|-----------------------|---------|
| 🔍 Skills Match       | [List of matching skills] |
| 👤 Experience Match   | [Experience alignment] |
| 📖 Education Match    | [Education relevance] |

### 💵 Salary Benchmarks
- Emphasize that salaries vary significantly by industry, location, and company size.
  Refer to [Glassdoor](https://glassdoor.com) and [PayScale](https://payscale.com) for accurate, up-to-date information.

### 🔗 Current Opportunities
- Provide 3-4 job search queries without specifying company names, linked to job boards (LinkedIn, Indeed, Glassdoor, JobStreet).
- Example: [Software Engineering](https://www.linkedin.com/jobs/search/?keywords=software%20engineer)

### 📚 Skill Development
- Provide 4 resources for skill development, mixing online courses, certifications, tutorials and books.
- *Format tables EXACTLY as shown below:*

| Tutorial Title       | Description                          | Duration | Link |
|----------------------|--------------------------------------|----------|------|
| [Course Name]        | [Specific skills covered]            | Xh Ym    | URL  |
| [Certification Name] | [Relevance to role]                  | Xh Ym    | URL  |

### 🌟 Career Path Projections
- Provide potential career trajectories based on current skills and experience.
- Include steps to achieve these paths (certifications, additional experience).

### 🤖 AI Analysis Insights
- In 1-2 sentences, explain which parts of the profile made this role a strong match.

---
## 3. Overall Evaluation
**Important:** Do not start until job recommendations are complete.

### Overall Job Fit Score Per Role
- Report the final fit score (e.g., 73.5%) for each role, one per line:
  \"Software Engineer: 75.9%\"

---
**Formatting Rules:**
1. Tables use pipe formatting with headers, keep descriptions under 25 words and show durations as Xh Ym.
2. Links use clean formatting: [Display Text](URL). No broken links.
3. Language is clear and accessible. Define technical terms when they are necessary.";

// One job recommendation, shared by the resume and manual structured prompts.
macro_rules! recommendation_shape {
    () => {
r#"{
  "roleTitle": "job title",
  "experienceLevel": "entry/mid/senior",
  "industryFocus": "primary industry for this role",
  "workplaceType": "remote/hybrid/onsite",
  "assessment": {
    "skillsMatch": ["matching skill"],
    "skillGaps": ["missing skill"],
    "experienceMatch": "experience alignment",
    "educationMatch": "education relevance",
    "cultureFit": "alignment with typical culture for this role"
  },
  "salaryBenchmarks": {
    "description": "For more accurate salary estimates, consider using the following resources:",
    "links": [{ "platform": "Glassdoor", "searchQuery": "query", "url": "https://..." }]
  },
  "growthPotential": { "marketDemand": "expected job growth", "upwardMobility": "promotion potential" },
  "currentOpportunities": [
    { "platform": "LinkedIn", "searchQuery": "query", "url": "https://..." }
  ],
  "skillDevelopment": [
    { "title": "resource title", "description": "what it covers", "duration": "6h 30m", "link": "https://..." }
  ],
  "careerPathProjections": {
    "potentialPaths": ["trajectory"],
    "requiredSteps": ["step"],
    "timelineEstimate": "time to reach next level"
  },
  "randomForestInsights": "why the profile matches this role",
  "workLifeBalance": "typical work-life balance"
}"#
    };
}

const STRUCTURED_COMPASS_INSTRUCTION: &str = concat!(
    "Generate a structured JSON object with comprehensive career analysis data based on the resume.

IMPORTANT: This system supports ALL career fields, not just IT or Computer Science. Adapt your analysis to the specific industry and career path evident in the resume.

IF the resume lacks very basic data of skills and education, ONLY generate the \"resumeImprovement\" section.

Top-level shape:
{
  \"candidateProfile\": {
    \"coreCompetencies\": {
      \"technicalSkills\": [], \"softSkills\": [], \"mostUsedSkill\": [\"3 or 4 skills\"],
      \"uniqueValueProposition\": \"\", \"certifications\": []
    },
    \"workExperience\": {
      \"totalProfessionalTenure\": \"\", \"seniorityLevel\": \"\", \"industryTransferPotential\": [],
      \"keyAccomplishments\": [],
      \"mostImpactfulProject\": { \"title\": \"\", \"description\": \"\", \"impact\": \"\", \"relevance\": \"\", \"technologies\": [] }
    },
    \"education\": {
      \"highestDegree\": \"\", \"relevantCoursework\": [], \"degreeUtilization\": [],
      \"certificationOpportunities\": [], \"emergingTechAlignment\": []
    },
    \"careerProgression\": { \"growthTrajectory\": \"\", \"gapAnalysis\": [], \"transitionReadiness\": \"\" }
  },
  \"jobRecommendations\": [ /* 5 to 7 recommendations */ ],
  \"overallEvaluation\": {
    \"jobFitScores\": { \"<job title>\": 73.5 },
    \"marketPositioning\": { \"competitiveAdvantages\": [], \"improvementAreas\": [] },
    \"interviewReadiness\": { \"commonQuestions\": [], \"suggestedTalkingPoints\": [] },
    \"personalBrandingSuggestions\": []
  },
  \"resumeImprovement\": {
    \"overallAssessment\": \"\", \"missingElements\": [], \"formattingIssues\": [],
    \"contentWeaknesses\": [], \"actionableSteps\": [],
    \"professionalResourceLinks\": [{ \"title\": \"\", \"description\": \"\", \"link\": \"\" }]
  }
}

Each job recommendation has this shape. Include EXACTLY 4 currentOpportunities and EXACTLY 4 skillDevelopment resources of different types:
",
    recommendation_shape!()
);

const MANUAL_STRUCTURED_INSTRUCTION: &str = concat!(
    "Generate a structured JSON object with job recommendations based on the input credentials.
IMPORTANT: This system supports ALL career fields, not just IT or Computer Science. Adapt your analysis to the specific industry and career path evident in the credentials.

Respond with { \"jobRecommendations\": [...] } containing between 3 and 7 recommendations (aim for at least 4).
Each recommendation MUST include EXACTLY 4 currentOpportunities and EXACTLY 4 skillDevelopment resources, and has this shape:
",
    recommendation_shape!()
);
