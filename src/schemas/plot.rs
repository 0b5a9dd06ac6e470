// src/schemas/plot.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Validate, nested_max_len, nullable, opt_max_len, patch, require_text};
use crate::db::PlotRow;
use crate::error::AppResult;

#[derive(Debug, Deserialize)]
pub struct PlotCreate {
    pub novel_id: String,
    pub title: String,
    pub description: Option<String>,
    /// Act or arc label, e.g. "Act I" or "main".
    pub plot_type: Option<String>,
    pub key_events: Option<String>,
    pub characters: Option<String>,
    pub conflicts: Option<String>,
    #[serde(default)]
    pub order_index: i64,
}

impl Validate for PlotCreate {
    fn validate(&self) -> AppResult<()> {
        require_text("title", &self.title, 200)?;
        opt_max_len("plot_type", self.plot_type.as_deref(), 50)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PlotUpdate {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub plot_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub key_events: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub characters: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub conflicts: Option<Option<String>>,
    pub order_index: Option<i64>,
}

impl Validate for PlotUpdate {
    fn validate(&self) -> AppResult<()> {
        if let Some(title) = &self.title {
            require_text("title", title, 200)?;
        }
        nested_max_len("plot_type", &self.plot_type, 50)
    }
}

impl PlotUpdate {
    pub fn apply(self, row: &mut PlotRow) {
        if let Some(title) = self.title {
            row.title = title;
        }
        patch(&mut row.description, self.description);
        patch(&mut row.plot_type, self.plot_type);
        patch(&mut row.key_events, self.key_events);
        patch(&mut row.characters, self.characters);
        patch(&mut row.conflicts, self.conflicts);
        if let Some(order_index) = self.order_index {
            row.order_index = order_index;
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlotResponse {
    pub id: i64,
    pub novel_id: String,
    pub title: String,
    pub description: Option<String>,
    pub plot_type: Option<String>,
    pub key_events: Option<String>,
    pub characters: Option<String>,
    pub conflicts: Option<String>,
    pub order_index: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PlotRow> for PlotResponse {
    fn from(row: PlotRow) -> Self {
        Self {
            id: row.id,
            novel_id: row.novel_id,
            title: row.title,
            description: row.description,
            plot_type: row.plot_type,
            key_events: row.key_events,
            characters: row.characters,
            conflicts: row.conflicts,
            order_index: row.order_index,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
