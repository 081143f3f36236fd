//! Career Compass: resume analysis, manual-entry recommendations and saved reports.

pub mod handlers;
pub mod prompts;
pub mod report;
pub mod request;
pub mod schema;
