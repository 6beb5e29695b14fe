//! Staff account forms: registration and login.

use once_cell::sync::Lazy;
use regex::Regex;

use super::fields::{FieldCleaner, FieldSpec, Widget};
use super::{Form, FormData, FormErrors};
use crate::auth::password::{validate_password, UserAttributes};

pub const USERNAME_MAX_LENGTH: usize = 150;
pub const NAME_MAX_LENGTH: usize = 150;
pub const PHONE_MAX_LENGTH: usize = 20;
pub const EMAIL_MAX_LENGTH: usize = 254;

pub const MSG_INVALID_USERNAME: &str = "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";
pub const MSG_PASSWORD_MISMATCH: &str = "The two password fields didn’t match.";

static USERNAME_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w.@+-]+$").unwrap());

/// Cleaned staff registration. The password is still plain text and must be
/// hashed before storage.
#[derive(Debug, Clone, PartialEq)]
pub struct StaffRegistration {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub password: String,
}

/// Form for creating a museum staff account.
pub struct StaffRegistrationForm;

impl Form for StaffRegistrationForm {
    type Cleaned = StaffRegistration;

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("username", "Username", Widget::TextInput)
                .required()
                .max_length(USERNAME_MAX_LENGTH)
                .placeholder("Choose a username"),
            FieldSpec::new("email", "Email", Widget::EmailInput)
                .required()
                .max_length(EMAIL_MAX_LENGTH)
                .placeholder("your@email.com"),
            FieldSpec::new("first_name", "First name", Widget::TextInput)
                .required()
                .max_length(NAME_MAX_LENGTH)
                .placeholder("First Name"),
            FieldSpec::new("last_name", "Last name", Widget::TextInput)
                .required()
                .max_length(NAME_MAX_LENGTH)
                .placeholder("Last Name"),
            FieldSpec::new("phone", "Phone", Widget::TextInput)
                .max_length(PHONE_MAX_LENGTH)
                .placeholder("+1234567890"),
            FieldSpec::new("password1", "Password", Widget::PasswordInput)
                .required()
                .placeholder("Password"),
            FieldSpec::new("password2", "Password confirmation", Widget::PasswordInput)
                .required()
                .placeholder("Confirm Password"),
        ]
    }

    fn clean(data: &FormData) -> Result<StaffRegistration, FormErrors> {
        let mut cleaner = FieldCleaner::new(data);

        let username = cleaner.text("username", true, Some(USERNAME_MAX_LENGTH));
        let username = match username {
            Some(name) if !USERNAME_PATTERN.is_match(&name) => {
                cleaner.add_error("username", MSG_INVALID_USERNAME);
                None
            }
            other => other,
        };
        let email = cleaner.email("email", true, EMAIL_MAX_LENGTH);
        let first_name = cleaner.text("first_name", true, Some(NAME_MAX_LENGTH));
        let last_name = cleaner.text("last_name", true, Some(NAME_MAX_LENGTH));
        let phone = cleaner.text("phone", false, Some(PHONE_MAX_LENGTH));
        let password1 = cleaner.secret("password1", true);
        let password2 = cleaner.secret("password2", true);

        if let (Some(p1), Some(p2)) = (&password1, &password2) {
            if p1 != p2 {
                cleaner.add_error("password2", MSG_PASSWORD_MISMATCH);
            } else {
                let attributes = UserAttributes {
                    username: username.as_deref(),
                    email: email.as_deref(),
                    first_name: first_name.as_deref(),
                    last_name: last_name.as_deref(),
                };
                for message in validate_password(p2, &attributes) {
                    cleaner.add_error("password2", message);
                }
            }
        }

        cleaner.finish()?;
        Ok(StaffRegistration {
            username: username.unwrap_or_default(),
            email: email.unwrap_or_default(),
            first_name: first_name.unwrap_or_default(),
            last_name: last_name.unwrap_or_default(),
            phone,
            password: password1.unwrap_or_default(),
        })
    }
}

/// Cleaned login submission.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

/// Form for staff login.
pub struct StaffLoginForm;

impl Form for StaffLoginForm {
    type Cleaned = LoginCredentials;

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("username", "Username", Widget::TextInput)
                .required()
                .max_length(USERNAME_MAX_LENGTH)
                .placeholder("Username"),
            FieldSpec::new("password", "Password", Widget::PasswordInput)
                .required()
                .placeholder("Password"),
        ]
    }

    fn clean(data: &FormData) -> Result<LoginCredentials, FormErrors> {
        let mut cleaner = FieldCleaner::new(data);
        let username = cleaner.text("username", true, Some(USERNAME_MAX_LENGTH));
        let password = cleaner.secret("password", true);
        cleaner.finish()?;
        Ok(LoginCredentials {
            username: username.unwrap_or_default(),
            password: password.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::fields::MSG_REQUIRED;

    fn valid_registration() -> FormData {
        FormData::new()
            .with("username", "ada.l")
            .with("email", "ada@museum.org")
            .with("first_name", "Ada")
            .with("last_name", "Lovelace")
            .with("password1", "Analytical-Engine-1843")
            .with("password2", "Analytical-Engine-1843")
    }

    #[test]
    fn test_valid_registration() {
        let cleaned = StaffRegistrationForm::clean(&valid_registration()).unwrap();
        assert_eq!(cleaned.username, "ada.l");
        assert_eq!(cleaned.phone, None);
        assert_eq!(cleaned.password, "Analytical-Engine-1843");
    }

    #[test]
    fn test_missing_required_fields() {
        let errors = StaffRegistrationForm::clean(&FormData::new()).unwrap_err();
        for field in ["username", "email", "first_name", "last_name", "password1", "password2"] {
            assert_eq!(errors.get(field), [MSG_REQUIRED.to_string()], "{}", field);
        }
        assert!(!errors.has("phone"));
    }

    #[test]
    fn test_invalid_username_characters() {
        let data = valid_registration().with("username", "ada lovelace!");
        let errors = StaffRegistrationForm::clean(&data).unwrap_err();
        assert_eq!(errors.get("username"), [MSG_INVALID_USERNAME.to_string()]);
    }

    #[test]
    fn test_password_mismatch() {
        let data = valid_registration().with("password2", "Analytical-Engine-1844");
        let errors = StaffRegistrationForm::clean(&data).unwrap_err();
        assert_eq!(errors.get("password2"), [MSG_PASSWORD_MISMATCH.to_string()]);
    }

    #[test]
    fn test_weak_password_reported_on_confirmation() {
        let data = valid_registration()
            .with("password1", "12345")
            .with("password2", "12345");
        let errors = StaffRegistrationForm::clean(&data).unwrap_err();
        assert!(errors.get("password2").len() >= 2);
        assert!(!errors.has("password1"));
    }

    #[test]
    fn test_phone_too_long() {
        let data = valid_registration().with("phone", "+39 011 123 4567 890 12");
        let errors = StaffRegistrationForm::clean(&data).unwrap_err();
        assert!(errors.has("phone"));
    }

    #[test]
    fn test_login_requires_both_fields() {
        let errors = StaffLoginForm::clean(&FormData::new().with("username", "ada")).unwrap_err();
        assert!(!errors.has("username"));
        assert_eq!(errors.get("password"), [MSG_REQUIRED.to_string()]);

        let creds = StaffLoginForm::clean(
            &FormData::new().with("username", " ada ").with("password", " pw "),
        )
        .unwrap();
        assert_eq!(creds.username, "ada");
        assert_eq!(creds.password, " pw ");
    }

    #[test]
    fn test_registration_fields_order_and_placeholders() {
        let fields = StaffRegistrationForm::fields();
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            ["username", "email", "first_name", "last_name", "phone", "password1", "password2"]
        );
        assert_eq!(
            fields[6].attrs.get("placeholder").map(String::as_str),
            Some("Confirm Password")
        );
    }
}
