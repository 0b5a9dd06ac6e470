// src/schemas/character.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Validate, nested_max_len, nullable, opt_max_len, patch, require_text};
use crate::db::CharacterRow;
use crate::error::AppResult;

#[derive(Debug, Deserialize)]
pub struct CharacterCreate {
    pub novel_id: String,
    pub name: String,
    pub role: Option<String>,
    pub description: Option<String>,
    pub personality: Option<String>,
    pub background: Option<String>,
    pub appearance: Option<String>,
    pub relationships: Option<String>,
    pub goals: Option<String>,
    pub abilities: Option<String>,
    #[serde(default)]
    pub position: i64,
}

impl Validate for CharacterCreate {
    fn validate(&self) -> AppResult<()> {
        require_text("name", &self.name, 100)?;
        opt_max_len("role", self.role.as_deref(), 50)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CharacterUpdate {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub role: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub personality: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub background: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub appearance: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub relationships: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub goals: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub abilities: Option<Option<String>>,
    pub position: Option<i64>,
}

impl Validate for CharacterUpdate {
    fn validate(&self) -> AppResult<()> {
        if let Some(name) = &self.name {
            require_text("name", name, 100)?;
        }
        nested_max_len("role", &self.role, 50)
    }
}

impl CharacterUpdate {
    pub fn apply(self, row: &mut CharacterRow) {
        if let Some(name) = self.name {
            row.name = name;
        }
        patch(&mut row.role, self.role);
        patch(&mut row.description, self.description);
        patch(&mut row.personality, self.personality);
        patch(&mut row.background, self.background);
        patch(&mut row.appearance, self.appearance);
        patch(&mut row.relationships, self.relationships);
        patch(&mut row.goals, self.goals);
        patch(&mut row.abilities, self.abilities);
        if let Some(position) = self.position {
            row.position = position;
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CharacterResponse {
    pub id: i64,
    pub novel_id: String,
    pub name: String,
    pub role: Option<String>,
    pub description: Option<String>,
    pub personality: Option<String>,
    pub background: Option<String>,
    pub appearance: Option<String>,
    pub relationships: Option<String>,
    pub goals: Option<String>,
    pub abilities: Option<String>,
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CharacterRow> for CharacterResponse {
    fn from(row: CharacterRow) -> Self {
        Self {
            id: row.id,
            novel_id: row.novel_id,
            name: row.name,
            role: row.role,
            description: row.description,
            personality: row.personality,
            background: row.background,
            appearance: row.appearance,
            relationships: row.relationships,
            goals: row.goals,
            abilities: row.abilities,
            position: row.position,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
