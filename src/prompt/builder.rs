// src/prompt/builder.rs
// Load a generation context for one novel from the database

use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::schemas::world::decode_map;

use super::context::{CharacterSummary, GenerationContext, NovelSummary, PlotSummary, WorldSummary};

/// Upper bound on rows pulled into a single prompt per section
const MAX_SECTION_ROWS: i64 = 200;

/// Which optional sections to load. The novel summary is always included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextOptions {
    pub characters: bool,
    pub plots: bool,
    pub world: bool,
}

impl ContextOptions {
    pub fn all() -> Self {
        Self {
            characters: true,
            plots: true,
            world: true,
        }
    }

    pub fn novel_only() -> Self {
        Self::default()
    }

    /// Sections relevant to a free-form `context_type` label.
    pub fn for_context_type(context_type: &str) -> Self {
        match context_type.trim().to_ascii_lowercase().as_str() {
            "character" | "characters" => Self {
                characters: true,
                world: true,
                ..Self::default()
            },
            "world" | "setting" => Self {
                world: true,
                ..Self::default()
            },
            "plot" | "plots" | "outline" => Self {
                characters: true,
                plots: true,
                ..Self::default()
            },
            "novel" | "general" | "" => Self::novel_only(),
            _ => Self::all(),
        }
    }
}

/// Build the context for `novel_id`.
///
/// Fails with `NotFound` for an unknown novel. Optional sections are only
/// filled when requested and when matching rows exist.
pub async fn build_context(
    db: &Database,
    novel_id: &str,
    options: ContextOptions,
) -> AppResult<GenerationContext> {
    let novel = db
        .get_novel(novel_id)
        .await?
        .ok_or_else(|| AppError::not_found("Novel not found"))?;

    let mut context = GenerationContext {
        novel: Some(NovelSummary {
            title: novel.title,
            genre: novel.genre,
            synopsis: novel.description,
        }),
        ..Default::default()
    };

    if options.characters {
        context.characters = db
            .list_characters(Some(novel_id), 0, MAX_SECTION_ROWS)
            .await?
            .into_iter()
            .map(|c| CharacterSummary {
                name: c.name,
                role: c.role,
                description: c.description,
                personality: c.personality,
                background: c.background,
            })
            .collect();
    }

    if options.plots {
        context.plots = db
            .list_plots(Some(novel_id), 0, MAX_SECTION_ROWS)
            .await?
            .into_iter()
            .map(|p| PlotSummary {
                title: p.title,
                description: p.description,
                plot_type: p.plot_type,
                key_events: p.key_events,
            })
            .collect();
    }

    if options.world
        && let Some(world) = db.get_world_setting_for_novel(novel_id).await?
    {
        let summary = WorldSummary {
            era: world.era,
            rules: decode_map(world.rules.as_deref()),
            locations: decode_map(world.locations.as_deref()),
            culture: decode_map(world.culture.as_deref()),
        };
        context.world = (!summary.is_empty()).then_some(summary);
    }

    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;
    use crate::schemas::character::CharacterCreate;
    use crate::schemas::novel::{NovelCreate, NovelStatus};
    use crate::schemas::world::WorldSettingCreate;

    async fn seed(db: &Database) -> String {
        let novel = NovelCreate {
            title: "Ember Road".into(),
            author: None,
            genre: Some("Adventure".into()),
            description: Some("Two couriers cross a burning continent.".into()),
            status: NovelStatus::Draft,
        }
        .into_row();
        db.insert_novel(&novel).await.unwrap();

        db.insert_character(&CharacterCreate {
            novel_id: novel.id.clone(),
            name: "Tam".into(),
            role: Some("protagonist".into()),
            description: None,
            personality: Some("restless".into()),
            background: None,
            appearance: None,
            relationships: None,
            goals: None,
            abilities: None,
            position: 0,
        })
        .await
        .unwrap();
        novel.id
    }

    #[tokio::test]
    async fn test_unknown_novel_is_not_found() {
        let db = test_db().await;
        let err = build_context(&db, "missing", ContextOptions::all())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_sections_follow_options() {
        let db = test_db().await;
        let id = seed(&db).await;

        let bare = build_context(&db, &id, ContextOptions::novel_only()).await.unwrap();
        assert_eq!(bare.novel.as_ref().unwrap().title, "Ember Road");
        assert!(bare.characters.is_empty());

        let full = build_context(&db, &id, ContextOptions::all()).await.unwrap();
        assert_eq!(full.characters.len(), 1);
        assert_eq!(full.characters[0].personality.as_deref(), Some("restless"));
        // requested but absent
        assert!(full.plots.is_empty());
        assert!(full.world.is_none());
    }

    #[tokio::test]
    async fn test_world_section_loaded_when_present() {
        let db = test_db().await;
        let id = seed(&db).await;
        db.insert_world_setting(WorldSettingCreate {
            novel_id: id.clone(),
            era: Some("Age of Ash".into()),
            locations: None,
            rules: None,
            culture: None,
        })
        .await
        .unwrap();

        let context = build_context(&db, &id, ContextOptions::for_context_type("world"))
            .await
            .unwrap();
        assert_eq!(context.world.unwrap().era.as_deref(), Some("Age of Ash"));
        assert!(context.characters.is_empty());
    }

    #[test]
    fn test_context_type_mapping() {
        assert_eq!(ContextOptions::for_context_type("general"), ContextOptions::novel_only());
        assert!(ContextOptions::for_context_type("Outline").plots);
        assert_eq!(ContextOptions::for_context_type("chapter"), ContextOptions::all());
    }
}
