pub mod handlers;
pub mod password;
pub mod session;
pub mod tokens;
pub mod validation;

pub use session::{AuthUser, SessionKeys};
