// src/schemas/mod.rs
// Request and response shapes, field constraints and partial-update payloads

pub mod account;
pub mod ai;
pub mod chapter;
pub mod character;
pub mod novel;
pub mod plot;
pub mod prompt;
pub mod world;

use serde::{Deserialize, Deserializer};

use crate::error::{AppError, AppResult};

pub const DEFAULT_LIMIT: i64 = 100;
pub const MAX_LIMIT: i64 = 1000;

/// Implemented by every inbound payload with field constraints.
pub trait Validate {
    fn validate(&self) -> AppResult<()>;
}

/// `skip`/`limit` paging plus the optional novel filter used by child collections.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub novel_id: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl ListQuery {
    pub fn paging(&self) -> AppResult<(i64, i64)> {
        let skip = self.skip.unwrap_or(0);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);
        if skip < 0 {
            return Err(AppError::validation("skip must be >= 0"));
        }
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(AppError::validation(format!(
                "limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }
        Ok((skip, limit))
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
///
/// Use with `#[serde(default, deserialize_with = "nullable")]`.
pub fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Apply a nullable patch field onto a stored column.
pub(crate) fn patch<T>(target: &mut Option<T>, value: Option<Option<T>>) {
    if let Some(v) = value {
        *target = v;
    }
}

pub(crate) fn require_text(field: &str, value: &str, max: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{} must not be empty", field)));
    }
    max_len(field, value, max)
}

pub(crate) fn max_len(field: &str, value: &str, max: usize) -> AppResult<()> {
    if value.chars().count() > max {
        return Err(AppError::validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}

pub(crate) fn opt_max_len(field: &str, value: Option<&str>, max: usize) -> AppResult<()> {
    match value {
        Some(v) => max_len(field, v, max),
        None => Ok(()),
    }
}

pub(crate) fn nested_max_len(field: &str, value: &Option<Option<String>>, max: usize) -> AppResult<()> {
    opt_max_len(field, value.as_ref().and_then(|v| v.as_deref()), max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "nullable")]
        genre: Option<Option<String>>,
    }

    #[test]
    fn test_nullable_distinguishes_absent_and_null() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.genre, None);

        let null: Patch = serde_json::from_str(r#"{"genre": null}"#).unwrap();
        assert_eq!(null.genre, Some(None));

        let set: Patch = serde_json::from_str(r#"{"genre": "Fantasy"}"#).unwrap();
        assert_eq!(set.genre, Some(Some("Fantasy".to_string())));
    }

    #[test]
    fn test_patch_only_touches_present_fields() {
        let mut column = Some("old".to_string());
        patch(&mut column, None);
        assert_eq!(column.as_deref(), Some("old"));
        patch(&mut column, Some(None));
        assert_eq!(column, None);
    }

    #[test]
    fn test_paging_defaults_and_bounds() {
        assert_eq!(ListQuery::default().paging().unwrap(), (0, DEFAULT_LIMIT));

        let negative = ListQuery {
            skip: Some(-1),
            ..Default::default()
        };
        assert!(negative.paging().is_err());

        let too_big = ListQuery {
            limit: Some(MAX_LIMIT + 1),
            ..Default::default()
        };
        assert!(too_big.paging().is_err());
    }

    #[test]
    fn test_text_constraints_count_chars() {
        assert!(require_text("title", "   ", 10).is_err());
        // multi-byte characters count once each
        assert!(max_len("title", "龍龍龍", 3).is_ok());
        assert!(max_len("title", "龍龍龍龍", 3).is_err());
    }
}
