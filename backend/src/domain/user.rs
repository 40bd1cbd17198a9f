//! Membership domain types.
//!
//! Validated newtypes for the identity fields plus the aggregates the
//! membership service and its ports exchange. Validation happens once at
//! the boundary; everything past a constructor holds a well-formed value.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors raised by the membership newtypes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// The user id was empty or not a UUID.
    InvalidId,
    /// The email did not match the accepted format.
    InvalidEmail,
    /// The password was shorter than the minimum length.
    PasswordTooShort {
        /// Required minimum length.
        min: usize,
    },
    /// A name field was empty once trimmed.
    EmptyName,
    /// A name field exceeded the maximum length.
    NameTooLong {
        /// Allowed maximum length.
        max: usize,
    },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::InvalidEmail => write!(f, "email is not in a valid format"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from string input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for UserId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Intentionally permissive: local@domain.tld with no whitespace.
        let pattern = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Registered email address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and construct an [`Email`].
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into();
        if !email_regex().is_match(&email) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(email))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Minimum accepted password length.
pub const PASSWORD_MIN: usize = 8;

/// Raw password as supplied by the caller.
///
/// Only ever held transiently on the way into the hasher; the stored
/// credential is the hash. The `Debug` impl redacts the content.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Validate and construct a [`Password`].
    pub fn new(password: impl Into<String>) -> Result<Self, UserValidationError> {
        let password = password.into();
        if password.chars().count() < PASSWORD_MIN {
            return Err(UserValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        Ok(Self(password))
    }

    /// Expose the raw secret for hashing or verification.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Maximum accepted length for a name field.
pub const NAME_MAX: usize = 100;

/// A non-empty first or last name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersonName(String);

impl PersonName {
    /// Validate and construct a [`PersonName`], trimming whitespace.
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if name.chars().count() > NAME_MAX {
            return Err(UserValidationError::NameTooLong { max: NAME_MAX });
        }
        Ok(Self(name))
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<PersonName> for String {
    fn from(value: PersonName) -> Self {
        value.0
    }
}

impl TryFrom<String> for PersonName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A validated registration request.
#[derive(Debug, Clone)]
pub struct Registration {
    /// Unique login email.
    pub email: Email,
    /// Raw password, hashed before storage.
    pub password: Password,
    /// First name.
    pub first_name: PersonName,
    /// Last name.
    pub last_name: PersonName,
}

/// A user row prepared for insertion, with the password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Freshly generated identifier.
    pub id: UserId,
    /// Unique login email.
    pub email: Email,
    /// Argon2 password hash.
    pub password_hash: String,
    /// First name.
    pub first_name: PersonName,
    /// Last name.
    pub last_name: PersonName,
}

/// Stored credentials fetched for login verification.
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    /// Owning user.
    pub user_id: UserId,
    /// Login email as stored.
    pub email: Email,
    /// Argon2 password hash.
    pub password_hash: String,
}

/// Profile fields exposed to the owning user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    /// Login email.
    pub email: Email,
    /// First name.
    pub first_name: PersonName,
    /// Last name.
    pub last_name: PersonName,
    /// Public URL of the stored profile image, if one was uploaded.
    pub profile_image: Option<String>,
}

/// The identity carried by a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    /// Authenticated user id.
    pub user_id: UserId,
    /// Email claim carried alongside the id.
    pub email: Email,
}

/// An issued bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthToken {
    /// Encoded token for the `Authorization: Bearer` header.
    pub token: String,
}
