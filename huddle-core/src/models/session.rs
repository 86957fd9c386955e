use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::SessionId;

/// Alphabet for join codes: uppercase alphanumerics without easily-confused
/// characters (0/O, 1/I)
pub const CODE_ALPHABET: [char; 32] = [
    '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L',
    'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// Generate a join code of the given length
pub fn generate_code(length: usize) -> String {
    nanoid::nanoid!(length, &CODE_ALPHABET)
}

/// What a session carries: chat text or stream signaling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Text,
    Stream,
}

impl SessionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Stream => "stream",
        }
    }
}

impl std::str::FromStr for SessionKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "stream" => Ok(Self::Stream),
            other => Err(crate::Error::InvalidInput(format!(
                "Invalid session type: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A short-lived, code-addressable session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub code: String,
    #[serde(rename = "session_type")]
    pub kind: SessionKind,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

impl Session {
    pub fn new(code: String, kind: SessionKind) -> Self {
        Self {
            id: SessionId::new(),
            code,
            kind,
            created_at: Utc::now(),
            is_active: true,
        }
    }
}
