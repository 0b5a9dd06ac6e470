// src/schemas/prompt.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Validate, nested_max_len, nullable, opt_max_len, patch, require_text};
use crate::db::{ConversationRow, PromptRow};
use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct PromptCreate {
    pub name: String,
    pub title: Option<String>,
    pub content: String,
    pub tags: Option<String>,
}

impl Validate for PromptCreate {
    fn validate(&self) -> AppResult<()> {
        require_text("name", &self.name, 100)?;
        opt_max_len("title", self.title.as_deref(), 200)?;
        if self.content.trim().is_empty() {
            return Err(AppError::validation("content must not be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PromptUpdate {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub title: Option<Option<String>>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Option<Option<String>>,
}

impl Validate for PromptUpdate {
    fn validate(&self) -> AppResult<()> {
        if let Some(name) = &self.name {
            require_text("name", name, 100)?;
        }
        if self.content.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(AppError::validation("content must not be empty"));
        }
        nested_max_len("title", &self.title, 200)
    }
}

impl PromptUpdate {
    pub fn apply(self, row: &mut PromptRow) {
        if let Some(name) = self.name {
            row.name = name;
        }
        patch(&mut row.title, self.title);
        if let Some(content) = self.content {
            row.content = content;
        }
        patch(&mut row.tags, self.tags);
    }
}

#[derive(Debug, Serialize)]
pub struct PromptResponse {
    pub id: i64,
    pub name: String,
    pub title: Option<String>,
    pub content: String,
    pub tags: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PromptRow> for PromptResponse {
    fn from(row: PromptRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            title: row.title,
            content: row.content,
            tags: row.tags,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// One line of a novel's assistant conversation history.
#[derive(Debug, Serialize)]
pub struct ConversationEntry {
    pub id: i64,
    pub speaker: String,
    pub assistant_role: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<ConversationRow> for ConversationEntry {
    fn from(row: ConversationRow) -> Self {
        Self {
            id: row.id,
            speaker: row.speaker,
            assistant_role: row.assistant_role,
            content: row.content,
            created_at: row.created_at,
        }
    }
}
