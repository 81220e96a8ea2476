//! Request and response bodies of the DELIA backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which backend agent answers a question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Agent {
    /// General Q&A over the uploaded document index.
    #[default]
    Documents,
    /// EDSL language expert, tuned by [`UserLevel`].
    Edsl,
}

impl Agent {
    pub const ALL: [Agent; 2] = [Agent::Documents, Agent::Edsl];

    pub fn as_str(self) -> &'static str {
        match self {
            Agent::Documents => "documents",
            Agent::Edsl => "edsl",
        }
    }

    /// Human-readable name shown in headers.
    pub fn label(self) -> &'static str {
        match self {
            Agent::Documents => "Documents assistant",
            Agent::Edsl => "EDSL expert",
        }
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Agent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "documents" | "docs" => Ok(Agent::Documents),
            "edsl" | "delia" => Ok(Agent::Edsl),
            other => Err(format!(
                "unknown agent '{other}' (expected 'documents' or 'edsl')"
            )),
        }
    }
}

/// Knowledge level sent to the EDSL agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserLevel {
    #[default]
    Basic,
    Intermediate,
    Advanced,
}

impl UserLevel {
    pub const ALL: [UserLevel; 3] = [
        UserLevel::Basic,
        UserLevel::Intermediate,
        UserLevel::Advanced,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            UserLevel::Basic => "basic",
            UserLevel::Intermediate => "intermediate",
            UserLevel::Advanced => "advanced",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UserLevel::Basic => "Basic",
            UserLevel::Intermediate => "Intermediate",
            UserLevel::Advanced => "Advanced",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            UserLevel::Basic => "New to EDSL, explanations step by step",
            UserLevel::Intermediate => "Knows the basics, wants idiomatic usage",
            UserLevel::Advanced => "Expert, concise answers and edge cases",
        }
    }
}

impl fmt::Display for UserLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(UserLevel::Basic),
            "intermediate" => Ok(UserLevel::Intermediate),
            "advanced" => Ok(UserLevel::Advanced),
            other => Err(format!(
                "unknown level '{other}' (expected 'basic', 'intermediate' or 'advanced')"
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub question: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EdslChatRequest<'a> {
    pub question: &'a str,
    pub user_level: UserLevel,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EdslChatResponse {
    pub response: String,
    #[serde(default)]
    pub validation_results: Vec<serde_json::Value>,
    #[serde(default)]
    pub user_level: Option<UserLevel>,
    #[serde(default)]
    pub has_edsl_code: bool,
    #[serde(default)]
    pub edsl_code_blocks_count: u32,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct DocumentStats {
    pub total_documents: u64,
    pub total_chunks: u64,
}

impl fmt::Display for DocumentStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} documents, {} chunks",
            self.total_documents, self.total_chunks
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Document {
    pub id: String,
    pub filename: String,
    pub upload_date: String,
    #[serde(default)]
    pub file_size: u64,
}
