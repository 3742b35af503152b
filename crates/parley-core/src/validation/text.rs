use parley_types::chat::MAX_USER_TURN_CHARS;
use parley_types::error::ValidationError;

const NAME_MIN_CHARS: usize = 2;
const NAME_MAX_CHARS: usize = 50;

/// Replace characters with meaning in HTML by their entities.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            other => out.push(other),
        }
    }
    out
}

/// Display name: trimmed, 2 to 50 characters, escaped.
pub fn validate_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ValidationError::NameRequired);
    }
    let len = name.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) {
        return Err(ValidationError::NameLength {
            min: NAME_MIN_CHARS,
            max: NAME_MAX_CHARS,
        });
    }
    Ok(escape_html(name))
}

/// Chat message: trimmed, 1 to 1000 characters, escaped.
///
/// Length is measured before escaping so entities do not count against it.
pub fn validate_chat_message(raw: &str) -> Result<String, ValidationError> {
    let message = raw.trim();
    if message.is_empty() {
        return Err(ValidationError::MessageEmpty);
    }
    if message.chars().count() > MAX_USER_TURN_CHARS {
        return Err(ValidationError::MessageTooLong(MAX_USER_TURN_CHARS));
    }
    Ok(escape_html(message))
}
