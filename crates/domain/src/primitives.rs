//! Domain primitives with validated constructors.

use resumariner_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Validation failures for domain primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// `Uid` string was not a valid UUID.
    InvalidUid {
        /// Raw input that failed to parse.
        input: String,
    },
    /// `JobId` string was not a valid UUID.
    InvalidJobId {
        /// Raw input that failed to parse.
        input: String,
    },
    /// Email address failed the basic shape check (`local@domain`).
    InvalidEmail {
        /// Raw input that failed validation.
        input: String,
    },
    /// CEFR level string did not match a known level.
    InvalidCefrLevel {
        /// Raw input that failed to parse.
        input: String,
    },
    /// `EmploymentDuration.duration_months` was negative.
    NegativeDurationMonths {
        /// Offending value.
        value: i64,
    },
    /// `EmploymentDuration.end` predates `start` under the same date format.
    EndBeforeStart {
        /// Start value in `YYYY.MM` form.
        start: String,
        /// End value in `YYYY.MM` form.
        end: String,
    },
}

impl PrimitiveError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidUid { .. } => ErrorCode::new("domain", "invalid_uid"),
            Self::InvalidJobId { .. } => ErrorCode::new("domain", "invalid_job_id"),
            Self::InvalidEmail { .. } => ErrorCode::new("domain", "invalid_email"),
            Self::InvalidCefrLevel { .. } => ErrorCode::new("domain", "invalid_cefr_level"),
            Self::NegativeDurationMonths { .. } => {
                ErrorCode::new("domain", "invalid_employment_duration")
            },
            Self::EndBeforeStart { .. } => ErrorCode::new("domain", "invalid_employment_duration"),
        }
    }
}

impl fmt::Display for PrimitiveError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUid { .. } => formatter.write_str("uid must be a valid UUID"),
            Self::InvalidJobId { .. } => formatter.write_str("job_id must be a valid UUID"),
            Self::InvalidEmail { .. } => formatter.write_str("email must contain local@domain"),
            Self::InvalidCefrLevel { .. } => {
                formatter.write_str("cefr level must be one of A1,A2,B1,B2,C1,C2,Native")
            },
            Self::NegativeDurationMonths { .. } => {
                formatter.write_str("duration_months must be >= 0")
            },
            Self::EndBeforeStart { .. } => {
                formatter.write_str("employment end must be empty or >= start")
            },
        }
    }
}

impl std::error::Error for PrimitiveError {}

impl From<PrimitiveError> for ErrorEnvelope {
    fn from(error: PrimitiveError) -> Self {
        let code = error.error_code();
        let mut envelope = Self::expected(code, error.to_string());
        envelope = match &error {
            PrimitiveError::InvalidUid { input } | PrimitiveError::InvalidJobId { input } => {
                envelope.with_metadata("input", input.clone())
            },
            PrimitiveError::InvalidEmail { input } => envelope.with_metadata("input", input.clone()),
            PrimitiveError::InvalidCefrLevel { input } => {
                envelope.with_metadata("input", input.clone())
            },
            PrimitiveError::NegativeDurationMonths { value } => {
                envelope.with_metadata("value", value.to_string())
            },
            PrimitiveError::EndBeforeStart { start, end } => envelope
                .with_metadata("start", start.clone())
                .with_metadata("end", end.clone()),
        };
        envelope
    }
}

/// Resume aggregate identifier (UUID-v4). The join key across graph and
/// vector stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(Uuid);

impl Uid {
    /// Generate a fresh random uid.
    #[must_use]
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a uid from its canonical string form.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let raw = input.as_ref();
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_error| PrimitiveError::InvalidUid {
                input: raw.to_owned(),
            })
    }

    /// Wrap an already-parsed UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Borrow the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, formatter)
    }
}

/// Job identifier (UUID-v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    /// Generate a fresh random job id.
    #[must_use]
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a job id from its canonical string form.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let raw = input.as_ref();
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_error| PrimitiveError::InvalidJobId {
                input: raw.to_owned(),
            })
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, formatter)
    }
}

/// Validated email address (shape-checked only; no DNS/MX verification).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(Box<str>);

impl Email {
    /// Parse an email, requiring a single `@` with non-empty local and
    /// domain parts.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let raw = input.as_ref().trim();
        let invalid = || PrimitiveError::InvalidEmail {
            input: raw.to_owned(),
        };

        let mut parts = raw.split('@');
        let local = parts.next().ok_or_else(invalid)?;
        let domain = parts.next().ok_or_else(invalid)?;
        if parts.next().is_some() || local.is_empty() || domain.is_empty() || !domain.contains('.')
        {
            return Err(invalid());
        }

        Ok(Self(raw.to_lowercase().into_boxed_str()))
    }

    /// Access the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// CEFR language-proficiency level, ordered `A1 < A2 < B1 < B2 < C1 < C2 <
/// Native`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CefrLevel {
    /// Beginner.
    A1,
    /// Elementary.
    A2,
    /// Intermediate.
    B1,
    /// Upper intermediate.
    B2,
    /// Advanced.
    C1,
    /// Proficient.
    C2,
    /// Native or bilingual proficiency, ranked above `C2`.
    Native,
}

impl CefrLevel {
    /// Parse a CEFR level from its canonical label.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let raw = input.as_ref();
        match raw.trim().to_ascii_uppercase().as_str() {
            "A1" => Ok(Self::A1),
            "A2" => Ok(Self::A2),
            "B1" => Ok(Self::B1),
            "B2" => Ok(Self::B2),
            "C1" => Ok(Self::C1),
            "C2" => Ok(Self::C2),
            "NATIVE" => Ok(Self::Native),
            _ => Err(PrimitiveError::InvalidCefrLevel {
                input: raw.to_owned(),
            }),
        }
    }

    /// Canonical label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A1 => "A1",
            Self::A2 => "A2",
            Self::B1 => "B1",
            Self::B2 => "B2",
            Self::C1 => "C1",
            Self::C2 => "C2",
            Self::Native => "Native",
        }
    }
}

impl fmt::Display for CefrLevel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uid_round_trips() {
        let uid = Uid::new_random();
        let parsed = Uid::parse(uid.to_string()).expect("parse should succeed");
        assert_eq!(uid, parsed);
    }

    #[test]
    fn email_requires_domain_dot() {
        assert!(Email::parse("max@example.com").is_ok());
        assert!(Email::parse("max@example").is_err());
        assert!(Email::parse("not-an-email").is_err());
    }

    #[test]
    fn email_lowercases_for_identity() {
        let email = Email::parse("Max@Example.COM").expect("valid email");
        assert_eq!(email.as_str(), "max@example.com");
    }

    #[test]
    fn cefr_ordering_matches_spec() {
        assert!(CefrLevel::A1 < CefrLevel::A2);
        assert!(CefrLevel::A2 < CefrLevel::B1);
        assert!(CefrLevel::B1 < CefrLevel::B2);
        assert!(CefrLevel::B2 < CefrLevel::C1);
        assert!(CefrLevel::C1 < CefrLevel::C2);
        assert!(CefrLevel::C2 < CefrLevel::Native);
    }

    #[test]
    fn cefr_parse_rejects_unknown_levels() {
        assert!(CefrLevel::parse("D1").is_err());
    }
}
