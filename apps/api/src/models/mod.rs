pub mod report;
pub mod token;
pub mod user;
