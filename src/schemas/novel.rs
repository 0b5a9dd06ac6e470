// src/schemas/novel.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Validate, nested_max_len, nullable, opt_max_len, patch, require_text};
use crate::db::NovelRow;
use crate::error::AppResult;

/// Novel lifecycle label. Accepted case-insensitively, emitted upper case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NovelStatus {
    #[default]
    Draft,
    InProgress,
    Completed,
    Published,
}

impl NovelStatus {
    pub const ALL: [NovelStatus; 4] = [
        NovelStatus::Draft,
        NovelStatus::InProgress,
        NovelStatus::Completed,
        NovelStatus::Published,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Published => "PUBLISHED",
        }
    }
}

impl FromStr for NovelStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "DRAFT" => Ok(Self::Draft),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            "PUBLISHED" => Ok(Self::Published),
            _ => Err(format!(
                "invalid novel status '{}', expected one of DRAFT, IN_PROGRESS, COMPLETED, PUBLISHED",
                s
            )),
        }
    }
}

impl<'de> Deserialize<'de> for NovelStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for NovelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
pub struct NovelCreate {
    pub title: String,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub status: NovelStatus,
}

impl Validate for NovelCreate {
    fn validate(&self) -> AppResult<()> {
        require_text("title", &self.title, 200)?;
        opt_max_len("author", self.author.as_deref(), 100)?;
        opt_max_len("genre", self.genre.as_deref(), 50)
    }
}

impl NovelCreate {
    pub fn into_row(self) -> NovelRow {
        let now = Utc::now();
        NovelRow {
            id: uuid::Uuid::new_v4().to_string(),
            title: self.title,
            author: self.author,
            genre: self.genre,
            description: self.description,
            status: self.status.as_str().to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NovelUpdate {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub author: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub genre: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub status: Option<NovelStatus>,
}

impl Validate for NovelUpdate {
    fn validate(&self) -> AppResult<()> {
        if let Some(title) = &self.title {
            require_text("title", title, 200)?;
        }
        nested_max_len("author", &self.author, 100)?;
        nested_max_len("genre", &self.genre, 50)
    }
}

impl NovelUpdate {
    pub fn apply(self, row: &mut NovelRow) {
        if let Some(title) = self.title {
            row.title = title;
        }
        patch(&mut row.author, self.author);
        patch(&mut row.genre, self.genre);
        patch(&mut row.description, self.description);
        if let Some(status) = self.status {
            row.status = status.as_str().to_string();
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NovelResponse {
    pub id: String,
    pub title: String,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub status: NovelStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<NovelRow> for NovelResponse {
    fn from(row: NovelRow) -> Self {
        Self {
            status: row.status.parse().unwrap_or_default(),
            id: row.id,
            title: row.title,
            author: row.author,
            genre: row.genre,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_case_insensitive() {
        assert_eq!("draft".parse::<NovelStatus>(), Ok(NovelStatus::Draft));
        assert_eq!("In_Progress".parse::<NovelStatus>(), Ok(NovelStatus::InProgress));
        assert_eq!("in-progress".parse::<NovelStatus>(), Ok(NovelStatus::InProgress));
        assert!("archived".parse::<NovelStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_upper_case() {
        let json = serde_json::to_string(&NovelStatus::InProgress).unwrap();
        assert_eq!(json, r#""IN_PROGRESS""#);
        let parsed: NovelStatus = serde_json::from_str(r#""published""#).unwrap();
        assert_eq!(parsed, NovelStatus::Published);
    }

    #[test]
    fn test_create_validation() {
        let ok: NovelCreate =
            serde_json::from_str(r#"{"title": "Test Novel", "author": "Test Author"}"#).unwrap();
        assert!(ok.validate().is_ok());
        assert_eq!(ok.status, NovelStatus::Draft);

        let long_title = NovelCreate {
            title: "x".repeat(201),
            author: None,
            genre: None,
            description: None,
            status: NovelStatus::Draft,
        };
        assert!(long_title.validate().is_err());
    }

    #[test]
    fn test_update_keeps_omitted_fields() {
        let mut row = NovelCreate {
            title: "Test Novel".into(),
            author: Some("Test Author".into()),
            genre: Some("Fantasy".into()),
            description: None,
            status: NovelStatus::Draft,
        }
        .into_row();

        let update: NovelUpdate =
            serde_json::from_str(r#"{"title": "Updated Novel", "genre": null}"#).unwrap();
        update.apply(&mut row);

        assert_eq!(row.title, "Updated Novel");
        assert_eq!(row.author.as_deref(), Some("Test Author"));
        assert_eq!(row.genre, None);
        assert_eq!(row.status, "DRAFT");
    }
}
