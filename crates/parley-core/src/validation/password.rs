use parley_types::error::ValidationError;

/// Length and character-class rules for a password.
///
/// Lengths count characters, not bytes. "Special" means any character that
/// is neither alphanumeric nor whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    pub require_special: bool,
}

impl PasswordPolicy {
    /// Login only bounds the length; strength is enforced at signup.
    pub const fn login() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            require_uppercase: false,
            require_lowercase: false,
            require_digit: false,
            require_special: false,
        }
    }

    pub const fn signup() -> Self {
        Self {
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_special: true,
            ..Self::login()
        }
    }

    pub fn validate(&self, password: &str) -> Result<(), ValidationError> {
        if password.is_empty() {
            return Err(ValidationError::PasswordRequired);
        }

        let len = password.chars().count();
        if len < self.min_length {
            return Err(ValidationError::PasswordTooShort(self.min_length));
        }
        if len > self.max_length {
            return Err(ValidationError::PasswordTooLong(self.max_length));
        }

        let missing = (self.require_uppercase && !password.chars().any(char::is_uppercase))
            || (self.require_lowercase && !password.chars().any(char::is_lowercase))
            || (self.require_digit && !password.chars().any(|c| c.is_ascii_digit()))
            || (self.require_special
                && !password
                    .chars()
                    .any(|c| !c.is_alphanumeric() && !c.is_whitespace()));
        if missing {
            return Err(ValidationError::PasswordTooWeak);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_policy() {
        let policy = PasswordPolicy::signup();
        assert!(policy.validate("MyP@ssw0rd").is_ok());
        assert_eq!(policy.validate("").unwrap_err(), ValidationError::PasswordRequired);
        assert_eq!(policy.validate("abc").unwrap_err(), ValidationError::PasswordTooShort(8));
        assert_eq!(
            policy.validate("alllowercase1!").unwrap_err(),
            ValidationError::PasswordTooWeak
        );
        assert_eq!(
            policy.validate("ALLUPPERCASE1!").unwrap_err(),
            ValidationError::PasswordTooWeak
        );
        assert_eq!(policy.validate("NoDigits!!").unwrap_err(), ValidationError::PasswordTooWeak);
        assert_eq!(policy.validate("NoSpecial1").unwrap_err(), ValidationError::PasswordTooWeak);
    }

    #[test]
    fn test_whitespace_is_not_special() {
        assert_eq!(
            PasswordPolicy::signup().validate("No Special1").unwrap_err(),
            ValidationError::PasswordTooWeak
        );
    }

    #[test]
    fn test_max_length() {
        let long = format!("Aa1!{}", "x".repeat(125));
        assert_eq!(
            PasswordPolicy::signup().validate(&long).unwrap_err(),
            ValidationError::PasswordTooLong(128)
        );
    }

    #[test]
    fn test_length_counts_characters() {
        // 8 characters, 16 bytes
        assert!(PasswordPolicy::login().validate("éééééééé").is_ok());
    }
}
