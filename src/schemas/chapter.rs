// src/schemas/chapter.rs
// Chapters plus their generated versions and editorial evaluations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Validate, max_len, nullable, opt_max_len, patch, require_text};
use crate::db::{ChapterEvaluationRow, ChapterRow, ChapterVersionRow};
use crate::error::{AppError, AppResult};

pub const DEFAULT_CHAPTER_STATUS: &str = "DRAFT";

/// Chapter status labels are stored lower case and shown upper case.
pub fn store_status(label: &str) -> String {
    label.trim().to_lowercase()
}

pub fn display_status(stored: &str) -> String {
    stored.to_uppercase()
}

#[derive(Debug, Deserialize)]
pub struct ChapterCreate {
    pub novel_id: String,
    pub chapter_number: i64,
    pub title: Option<String>,
    pub content: Option<String>,
    pub summary: Option<String>,
    #[serde(default)]
    pub word_count: i64,
    pub status: Option<String>,
}

impl Validate for ChapterCreate {
    fn validate(&self) -> AppResult<()> {
        if self.chapter_number < 0 {
            return Err(AppError::validation("chapter_number must be >= 0"));
        }
        if self.word_count < 0 {
            return Err(AppError::validation("word_count must be >= 0"));
        }
        opt_max_len("title", self.title.as_deref(), 200)?;
        match &self.status {
            Some(status) => require_text("status", status, 50),
            None => Ok(()),
        }
    }
}

impl ChapterCreate {
    pub fn stored_status(&self) -> String {
        store_status(self.status.as_deref().unwrap_or(DEFAULT_CHAPTER_STATUS))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ChapterUpdate {
    pub chapter_number: Option<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub content: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub summary: Option<Option<String>>,
    pub word_count: Option<i64>,
    pub status: Option<String>,
}

impl Validate for ChapterUpdate {
    fn validate(&self) -> AppResult<()> {
        if self.chapter_number.is_some_and(|n| n < 0) {
            return Err(AppError::validation("chapter_number must be >= 0"));
        }
        if self.word_count.is_some_and(|n| n < 0) {
            return Err(AppError::validation("word_count must be >= 0"));
        }
        super::nested_max_len("title", &self.title, 200)?;
        match &self.status {
            Some(status) => require_text("status", status, 50),
            None => Ok(()),
        }
    }
}

impl ChapterUpdate {
    pub fn apply(self, row: &mut ChapterRow) {
        if let Some(number) = self.chapter_number {
            row.chapter_number = number;
        }
        patch(&mut row.title, self.title);
        patch(&mut row.content, self.content);
        patch(&mut row.summary, self.summary);
        if let Some(word_count) = self.word_count {
            row.word_count = word_count;
        }
        if let Some(status) = self.status {
            row.status = store_status(&status);
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChapterResponse {
    pub id: i64,
    pub novel_id: String,
    pub chapter_number: i64,
    pub title: Option<String>,
    pub content: Option<String>,
    pub summary: Option<String>,
    pub word_count: i64,
    pub status: String,
    pub selected_version_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ChapterRow> for ChapterResponse {
    fn from(row: ChapterRow) -> Self {
        Self {
            status: display_status(&row.status),
            id: row.id,
            novel_id: row.novel_id,
            chapter_number: row.chapter_number,
            title: row.title,
            content: row.content,
            summary: row.summary,
            word_count: row.word_count,
            selected_version_id: row.selected_version_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Versions
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ChapterVersionCreate {
    pub chapter_id: i64,
    pub version_label: Option<String>,
    pub provider: Option<String>,
    pub content: String,
}

impl Validate for ChapterVersionCreate {
    fn validate(&self) -> AppResult<()> {
        if self.content.is_empty() {
            return Err(AppError::validation("content must not be empty"));
        }
        opt_max_len("version_label", self.version_label.as_deref(), 64)?;
        opt_max_len("provider", self.provider.as_deref(), 64)
    }
}

#[derive(Debug, Serialize)]
pub struct ChapterVersionResponse {
    pub id: i64,
    pub chapter_id: i64,
    pub version_label: Option<String>,
    pub provider: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<ChapterVersionRow> for ChapterVersionResponse {
    fn from(row: ChapterVersionRow) -> Self {
        Self {
            id: row.id,
            chapter_id: row.chapter_id,
            version_label: row.version_label,
            provider: row.provider,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChapterWithVersions {
    #[serde(flatten)]
    pub chapter: ChapterResponse,
    pub versions: Vec<ChapterVersionResponse>,
}

#[derive(Debug, Serialize)]
pub struct SelectVersionResponse {
    pub message: String,
    pub version_id: i64,
}

// ---------------------------------------------------------------------------
// Evaluations
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ChapterEvaluationCreate {
    pub chapter_id: i64,
    pub version_id: Option<i64>,
    pub decision: Option<String>,
    pub feedback: Option<String>,
    pub score: Option<f64>,
}

impl Validate for ChapterEvaluationCreate {
    fn validate(&self) -> AppResult<()> {
        if let Some(decision) = &self.decision {
            max_len("decision", decision, 32)?;
        }
        if let Some(score) = self.score
            && !(0.0..=10.0).contains(&score)
        {
            return Err(AppError::validation("score must be between 0 and 10"));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct ChapterEvaluationResponse {
    pub id: i64,
    pub chapter_id: i64,
    pub version_id: Option<i64>,
    pub decision: Option<String>,
    pub feedback: Option<String>,
    pub score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl From<ChapterEvaluationRow> for ChapterEvaluationResponse {
    fn from(row: ChapterEvaluationRow) -> Self {
        Self {
            id: row.id,
            chapter_id: row.chapter_id,
            version_id: row.version_id,
            decision: row.decision,
            feedback: row.feedback,
            score: row.score,
            created_at: row.created_at,
        }
    }
}
