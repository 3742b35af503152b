//! Input validation for signup, login and chat payloads.
//!
//! Rules run field by field in declared order and the first failure is
//! surfaced. Successful validation returns normalized values (trimmed,
//! lowercased email, HTML-escaped free text) ready for the services.

pub mod email;
pub mod password;
pub mod text;

use serde::Deserialize;

use parley_types::error::ValidationError;

pub use email::validate_email;
pub use password::PasswordPolicy;
pub use text::{escape_html, validate_chat_message, validate_name};

/// Raw signup body as posted by the client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Signup input after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSignup {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl SignupForm {
    pub fn validate(&self) -> Result<ValidSignup, ValidationError> {
        let name = validate_name(&self.name)?;
        let email = validate_email(&self.email)?;
        PasswordPolicy::signup().validate(&self.password)?;
        Ok(ValidSignup {
            name,
            email,
            password: self.password.clone(),
        })
    }
}

/// Raw login body as posted by the client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidLogin {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<ValidLogin, ValidationError> {
        let email = validate_email(&self.email)?;
        PasswordPolicy::login().validate(&self.password)?;
        Ok(ValidLogin {
            email,
            password: self.password.clone(),
        })
    }
}

/// Raw chat body as posted by the client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(name: &str, email: &str, password: &str) -> SignupForm {
        SignupForm {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_valid_signup_is_normalized() {
        let valid = signup("  Ada <3 ", " Ada@Example.COM ", "Str0ng!pass")
            .validate()
            .unwrap();
        assert_eq!(valid.name, "Ada &lt;3");
        assert_eq!(valid.email, "ada@example.com");
        assert_eq!(valid.password, "Str0ng!pass");
    }

    #[test]
    fn test_first_failing_field_wins() {
        let err = signup("A", "not-an-email", "abc").validate().unwrap_err();
        assert_eq!(err, ValidationError::NameLength { min: 2, max: 50 });

        let err = signup("Ada", "not-an-email", "abc").validate().unwrap_err();
        assert_eq!(err, ValidationError::EmailInvalid);

        let err = signup("Ada", "ada@example.com", "abc").validate().unwrap_err();
        assert_eq!(err, ValidationError::PasswordTooShort(8));
    }

    #[test]
    fn test_weak_signup_passwords_rejected() {
        for weak in ["abc", "alllowercase1!", "ALLUPPERCASE1!", "NoDigitsHere!", "NoSpecial123"] {
            assert!(
                signup("Ada", "ada@example.com", weak).validate().is_err(),
                "{weak} should be rejected"
            );
        }
    }

    #[test]
    fn test_login_only_checks_length() {
        let form = LoginForm {
            email: "ada@example.com".to_string(),
            password: "alllowercase".to_string(),
        };
        assert!(form.validate().is_ok());

        let short = LoginForm {
            email: "ada@example.com".to_string(),
            password: "short".to_string(),
        };
        assert_eq!(short.validate().unwrap_err(), ValidationError::PasswordTooShort(8));
    }

    #[test]
    fn test_missing_fields_deserialize_to_empty() {
        let form: SignupForm = serde_json::from_str(r#"{"email":"a@b.co"}"#).unwrap();
        assert_eq!(form.validate().unwrap_err(), ValidationError::NameRequired);
    }
}
