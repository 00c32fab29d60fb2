pub mod url_validation;
pub use url_validation::{UrlValidationError, is_allowed_redirect, validate_recording_url};
