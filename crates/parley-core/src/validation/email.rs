use regex::Regex;
use std::sync::LazyLock;

use parley_types::error::ValidationError;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9._%+-]+@[a-z0-9-]+(\.[a-z0-9-]+)*\.[a-z]{2,}$")
        .expect("email regex is valid")
});

const MAX_EMAIL_LEN: usize = 254;

/// Trim, lowercase and check an email address. Returns the normalized form.
pub fn validate_email(raw: &str) -> Result<String, ValidationError> {
    let email = raw.trim().to_lowercase();

    if email.is_empty() {
        return Err(ValidationError::EmailRequired);
    }

    if email.len() > MAX_EMAIL_LEN || !EMAIL_REGEX.is_match(&email) {
        return Err(ValidationError::EmailInvalid);
    }

    Ok(email)
}
