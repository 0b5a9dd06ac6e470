// src/schemas/world.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Validate, nested_max_len, nullable, opt_max_len, patch};
use crate::db::WorldSettingRow;
use crate::error::AppResult;

pub type JsonMap = Map<String, Value>;

#[derive(Debug, Deserialize)]
pub struct WorldSettingCreate {
    pub novel_id: String,
    pub era: Option<String>,
    pub locations: Option<JsonMap>,
    pub rules: Option<JsonMap>,
    pub culture: Option<JsonMap>,
}

impl Validate for WorldSettingCreate {
    fn validate(&self) -> AppResult<()> {
        opt_max_len("era", self.era.as_deref(), 100)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct WorldSettingUpdate {
    #[serde(default, deserialize_with = "nullable")]
    pub era: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub locations: Option<Option<JsonMap>>,
    #[serde(default, deserialize_with = "nullable")]
    pub rules: Option<Option<JsonMap>>,
    #[serde(default, deserialize_with = "nullable")]
    pub culture: Option<Option<JsonMap>>,
}

impl Validate for WorldSettingUpdate {
    fn validate(&self) -> AppResult<()> {
        nested_max_len("era", &self.era, 100)
    }
}

impl WorldSettingUpdate {
    pub fn apply(self, row: &mut WorldSettingRow) {
        patch(&mut row.era, self.era);
        patch(&mut row.locations, self.locations.map(encode_map));
        patch(&mut row.rules, self.rules.map(encode_map));
        patch(&mut row.culture, self.culture.map(encode_map));
    }
}

/// Serialize an optional map into the TEXT column representation.
pub fn encode_map(map: Option<JsonMap>) -> Option<String> {
    map.map(|m| Value::Object(m).to_string())
}

/// Read a stored JSON column back; malformed text reads as absent.
pub fn decode_map(raw: Option<&str>) -> Option<JsonMap> {
    match serde_json::from_str(raw?) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
pub struct WorldSettingResponse {
    pub id: i64,
    pub novel_id: String,
    pub era: Option<String>,
    pub locations: Option<JsonMap>,
    pub rules: Option<JsonMap>,
    pub culture: Option<JsonMap>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<WorldSettingRow> for WorldSettingResponse {
    fn from(row: WorldSettingRow) -> Self {
        Self {
            locations: decode_map(row.locations.as_deref()),
            rules: decode_map(row.rules.as_deref()),
            culture: decode_map(row.culture.as_deref()),
            id: row.id,
            novel_id: row.novel_id,
            era: row.era,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
