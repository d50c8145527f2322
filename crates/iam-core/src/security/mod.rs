mod validation;

pub use validation::{is_valid_email, is_valid_slug, validate_name_length};
