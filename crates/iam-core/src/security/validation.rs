//! Input validation helpers shared by every service, grounded on
//! `rustok_core::security::validation`. Spec §4.4: slug must match
//! `[a-z0-9-]+`, length [3,255]; name length bounded [3,255].

use email_address::EmailAddress;

pub fn is_valid_slug(slug: &str) -> bool {
    let len = slug.chars().count();
    if !(3..=255).contains(&len) {
        return false;
    }
    slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

pub fn validate_name_length(name: &str) -> bool {
    let len = name.chars().count();
    (3..=255).contains(&len)
}

pub fn is_valid_email(email: &str) -> bool {
    EmailAddress::is_valid(email)
}
