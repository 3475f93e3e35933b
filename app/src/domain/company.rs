//! Company accounts and their form validation.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use super::UserId;

/// Minimum length of a contact person's name.
pub const NAME_MIN: usize = 3;
/// Minimum password length.
pub const PASSWORD_MIN: usize = 6;

/// Validation errors for company forms.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompanyValidationError {
    /// A required field was blank.
    #[error("{field} is required")]
    MissingField {
        /// Form field name.
        field: &'static str,
    },
    /// Contact name shorter than [`NAME_MIN`].
    #[error("name must be at least {min} characters")]
    NameTooShort {
        /// Required minimum.
        min: usize,
    },
    /// Email is not syntactically valid.
    #[error("email address is invalid")]
    InvalidEmail,
    /// Contact number contains something other than digits.
    #[error("contact number may only contain digits")]
    InvalidContact,
    /// Password shorter than [`PASSWORD_MIN`].
    #[error("password must be at least {min} characters")]
    PasswordTooShort {
        /// Required minimum.
        min: usize,
    },
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Same shape the signup form accepts: something@domain.tld, no spaces.
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

fn require(field: &'static str, value: &str) -> Result<(), CompanyValidationError> {
    if value.trim().is_empty() {
        return Err(CompanyValidationError::MissingField { field });
    }
    Ok(())
}

fn check_email(email: &str) -> Result<(), CompanyValidationError> {
    require("email", email)?;
    if !email_regex().is_match(email.trim()) {
        return Err(CompanyValidationError::InvalidEmail);
    }
    Ok(())
}

fn check_password(password: &Password) -> Result<(), CompanyValidationError> {
    require("password", password.expose())?;
    if password.expose().chars().count() < PASSWORD_MIN {
        return Err(CompanyValidationError::PasswordTooShort { min: PASSWORD_MIN });
    }
    Ok(())
}

fn check_contact_details(
    name: &str,
    email: &str,
    contact: &str,
    company_name: &str,
    address: &str,
) -> Result<(), CompanyValidationError> {
    require("name", name)?;
    if name.trim().chars().count() < NAME_MIN {
        return Err(CompanyValidationError::NameTooShort { min: NAME_MIN });
    }
    check_email(email)?;
    require("contact", contact)?;
    if !contact.chars().all(|c| c.is_ascii_digit()) {
        return Err(CompanyValidationError::InvalidContact);
    }
    require("company name", company_name)?;
    require("address", address)
}

/// Password held in memory for the legacy login flow.
///
/// Redacted from `Debug` output and wiped on drop.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    /// Wrap a password.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Read the plaintext.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

impl Drop for Password {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Stored company account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyUser {
    /// Account id.
    pub id: UserId,
    /// Contact person.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Phone number, digits only.
    pub contact: String,
    /// Registered company name.
    pub company_name: String,
    /// Postal address.
    pub address: String,
    /// Legacy plaintext password.
    pub password: Password,
}

impl CompanyUser {
    /// Editable view of the account.
    #[must_use]
    pub fn profile(&self) -> CompanyProfileUpdate {
        CompanyProfileUpdate {
            name: self.name.clone(),
            email: self.email.clone(),
            contact: self.contact.clone(),
            company_name: self.company_name.clone(),
            address: self.address.clone(),
        }
    }
}

/// Company signup form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySignup {
    /// Contact person.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Phone number.
    pub contact: String,
    /// Company name.
    pub company_name: String,
    /// Postal address.
    pub address: String,
    /// Chosen password.
    pub password: Password,
}

impl CompanySignup {
    /// Check every field against the signup rules.
    pub fn validate(&self) -> Result<(), CompanyValidationError> {
        check_contact_details(
            &self.name,
            &self.email,
            &self.contact,
            &self.company_name,
            &self.address,
        )?;
        check_password(&self.password)
    }
}

/// Company login form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyLogin {
    /// Login email.
    pub email: String,
    /// Password.
    pub password: Password,
}

impl CompanyLogin {
    /// Check the login fields.
    pub fn validate(&self) -> Result<(), CompanyValidationError> {
        check_email(&self.email)?;
        check_password(&self.password)
    }
}

/// Editable company profile fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfileUpdate {
    /// Contact person.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Phone number.
    pub contact: String,
    /// Company name.
    pub company_name: String,
    /// Postal address.
    pub address: String,
}

impl CompanyProfileUpdate {
    /// Check the fields against the signup rules, minus the password.
    pub fn validate(&self) -> Result<(), CompanyValidationError> {
        check_contact_details(
            &self.name,
            &self.email,
            &self.contact,
            &self.company_name,
            &self.address,
        )
    }
}
