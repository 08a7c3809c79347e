use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ==================== CONTACTS ====================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Contact {
    pub alias: String,
    pub address: String,
}

// ==================== CONVERSATION ====================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }

    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("user") {
            ChatRole::User
        } else {
            ChatRole::Assistant
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct ChatTurnRow {
    pub role: String,
    pub content: String,
}

impl From<ChatTurnRow> for ChatTurn {
    fn from(row: ChatTurnRow) -> Self {
        Self {
            role: ChatRole::parse(&row.role),
            text: row.content,
        }
    }
}

// ==================== ACCOUNT ====================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResetSummary {
    pub wallets: u64,
    pub conversations: u64,
    pub contacts: u64,
}

// ==================== API ====================
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
