use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(CitationId);

/// Shown in place of an answer whenever a query cannot be completed.
pub const QUERY_FAILURE_MESSAGE: &str = "Sorry, I encountered an error. Is the backend running?";

const UNKNOWN_FILENAME: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationMetadata {
    #[serde(default = "unknown_filename")]
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Backend metadata keys this client does not interpret.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CitationMetadata {
    pub fn for_file(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            path: None,
            extra: serde_json::Map::new(),
        }
    }
}

impl Default for CitationMetadata {
    fn default() -> Self {
        Self::for_file(UNKNOWN_FILENAME)
    }
}

fn unknown_filename() -> String {
    UNKNOWN_FILENAME.to_string()
}

/// A retrieved passage backing an assistant answer.
///
/// `id` is only unique inside the source list of a single turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub id: CitationId,
    pub content: String,
    #[serde(default, deserialize_with = "deserialize_score")]
    pub score: f64,
    #[serde(default)]
    pub metadata: CitationMetadata,
}

fn deserialize_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_default())
}

impl Citation {
    pub fn filename(&self) -> &str {
        &self.metadata.filename
    }

    pub fn score_percent(&self) -> f64 {
        self.score * 100.0
    }

    /// `0.91` renders as `91.0%`.
    pub fn score_label(&self) -> String {
        format!("{:.1}%", self.score_percent())
    }

    pub fn label(&self) -> String {
        format!("#{} {}", self.id, self.metadata.filename)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Citation>,
    pub sent_at: DateTime<Utc>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            sources: Vec::new(),
            sent_at: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>, sources: Vec<Citation>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            sources,
            sent_at: Utc::now(),
        }
    }

    pub fn failure() -> Self {
        Self::assistant(QUERY_FAILURE_MESSAGE, Vec::new())
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn source(&self, id: CitationId) -> Option<&Citation> {
        self.sources.iter().find(|citation| citation.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}
