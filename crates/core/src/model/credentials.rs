use std::fmt;

use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_PHONE: &str = "+0000000000";
pub const DEFAULT_LOCATION: &str = "Unknown";
pub const DEFAULT_FARM_SIZE: &str = "1 acre";
pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CredentialsError {
    #[error("please fill in: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("password must be 8+ chars with upper, lower, and a number")]
    WeakPassword,
}

//
// ─── LOGIN ─────────────────────────────────────────────────────────────────────
//

/// Raw login form input.
#[derive(Clone, Default)]
pub struct LoginDraft {
    pub email: String,
    pub password: String,
}

/// Validated login request body.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    email: String,
    password: String,
}

impl LoginDraft {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Trim the email and require both fields.
    ///
    /// # Errors
    ///
    /// Returns `CredentialsError::MissingFields` if email or password is empty.
    pub fn validate(self) -> Result<Credentials, CredentialsError> {
        let email = self.email.trim().to_owned();
        let mut missing = Vec::new();
        if email.is_empty() {
            missing.push("email");
        }
        if self.password.is_empty() {
            missing.push("password");
        }
        if !missing.is_empty() {
            return Err(CredentialsError::MissingFields(missing));
        }

        Ok(Credentials {
            email,
            password: self.password,
        })
    }
}

impl Credentials {
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}

//
// ─── REGISTRATION ──────────────────────────────────────────────────────────────
//

/// Raw registration form input.
#[derive(Clone, Default)]
pub struct RegistrationDraft {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub location: String,
    pub farm_size: String,
}

/// Validated registration request body.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    name: String,
    email: String,
    password: String,
    phone: String,
    location: String,
    farm_size: String,
}

impl RegistrationDraft {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    /// Normalize the draft and apply the client-side password policy.
    ///
    /// Missing phone, location, and farm size are filled with placeholders the
    /// API accepts.
    ///
    /// # Errors
    ///
    /// Returns `CredentialsError::MissingFields` listing every empty required
    /// field, or `CredentialsError::WeakPassword`.
    pub fn validate(self) -> Result<Registration, CredentialsError> {
        let name = self.name.trim().to_owned();
        let email = self.email.trim().to_lowercase();
        let password = self.password.trim().to_owned();

        let mut missing = Vec::new();
        if name.is_empty() {
            missing.push("name");
        }
        if email.is_empty() {
            missing.push("email");
        }
        if password.is_empty() {
            missing.push("password");
        }
        if !missing.is_empty() {
            return Err(CredentialsError::MissingFields(missing));
        }

        if !is_strong_password(&password) {
            return Err(CredentialsError::WeakPassword);
        }

        Ok(Registration {
            name,
            email,
            password,
            phone: or_placeholder(&self.phone, DEFAULT_PHONE),
            location: or_placeholder(&self.location, DEFAULT_LOCATION),
            farm_size: or_placeholder(&self.farm_size, DEFAULT_FARM_SIZE),
        })
    }
}

impl Registration {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn phone(&self) -> &str {
        &self.phone
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    #[must_use]
    pub fn farm_size(&self) -> &str {
        &self.farm_size
    }
}

fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        placeholder.to_owned()
    } else {
        trimmed.to_owned()
    }
}

// Passwords never show up in debug output.

impl fmt::Debug for LoginDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginDraft")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl fmt::Debug for RegistrationDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationDraft")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("location", &self.location)
            .field("farm_size", &self.farm_size)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("location", &self.location)
            .field("farm_size", &self.farm_size)
            .finish_non_exhaustive()
    }
}
