// src/prompt/context.rs
// Context sections and prompt rendering
//
// SECTION ORDER (fixed):
// 1. Novel summary
// 2. Character roster
// 3. World settings
// 4. Plots / key events
// 5. Previous content
// then the caller's instruction. Empty sections are skipped entirely.

use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, Serialize)]
pub struct NovelSummary {
    pub title: String,
    pub genre: Option<String>,
    pub synopsis: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CharacterSummary {
    pub name: String,
    pub role: Option<String>,
    pub description: Option<String>,
    pub personality: Option<String>,
    pub background: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PlotSummary {
    pub title: String,
    pub description: Option<String>,
    pub plot_type: Option<String>,
    pub key_events: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct WorldSummary {
    pub era: Option<String>,
    pub rules: Option<Map<String, Value>>,
    pub locations: Option<Map<String, Value>>,
    pub culture: Option<Map<String, Value>>,
}

impl WorldSummary {
    pub fn is_empty(&self) -> bool {
        self.era.as_deref().is_none_or(str::is_empty)
            && self.rules.as_ref().is_none_or(Map::is_empty)
            && self.locations.as_ref().is_none_or(Map::is_empty)
            && self.culture.as_ref().is_none_or(Map::is_empty)
    }
}

/// Structured bundle handed to the AI adapter alongside the instruction.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub novel: Option<NovelSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub characters: Vec<CharacterSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plots: Vec<PlotSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub world: Option<WorldSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_content: Option<String>,
}

/// Render the full prompt: present context sections, then the instruction.
pub fn render_prompt(context: &GenerationContext, instruction: &str) -> String {
    let mut prompt = String::new();

    add_novel_section(&mut prompt, context.novel.as_ref());
    add_character_section(&mut prompt, &context.characters);
    add_world_section(&mut prompt, context.world.as_ref());
    add_plot_section(&mut prompt, &context.plots);
    add_previous_content(&mut prompt, context.previous_content.as_deref());

    if prompt.is_empty() {
        return instruction.to_string();
    }

    prompt.push_str("## Request\n");
    prompt.push_str(instruction);
    prompt
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn add_novel_section(prompt: &mut String, novel: Option<&NovelSummary>) {
    let Some(novel) = novel else { return };

    prompt.push_str("## Novel\n");
    prompt.push_str(&format!("Title: {}\n", novel.title));
    if let Some(genre) = present(novel.genre.as_deref()) {
        prompt.push_str(&format!("Genre: {}\n", genre));
    }
    if let Some(synopsis) = present(novel.synopsis.as_deref()) {
        prompt.push_str(&format!("Synopsis: {}\n", synopsis));
    }
    prompt.push('\n');
}

fn add_character_section(prompt: &mut String, characters: &[CharacterSummary]) {
    if characters.is_empty() {
        return;
    }

    prompt.push_str("## Characters\n");
    for character in characters {
        prompt.push_str("- ");
        prompt.push_str(&character.name);
        if let Some(role) = present(character.role.as_deref()) {
            prompt.push_str(&format!(" ({})", role));
        }
        let details: Vec<String> = [
            ("", character.description.as_deref()),
            ("Personality: ", character.personality.as_deref()),
            ("Background: ", character.background.as_deref()),
        ]
        .into_iter()
        .filter_map(|(label, value)| present(value).map(|v| format!("{}{}", label, v)))
        .collect();
        if !details.is_empty() {
            prompt.push_str(": ");
            prompt.push_str(&details.join(". "));
        }
        prompt.push('\n');
    }
    prompt.push('\n');
}

fn add_world_section(prompt: &mut String, world: Option<&WorldSummary>) {
    let Some(world) = world.filter(|w| !w.is_empty()) else {
        return;
    };

    prompt.push_str("## World\n");
    if let Some(era) = present(world.era.as_deref()) {
        prompt.push_str(&format!("Era: {}\n", era));
    }
    for (label, map) in [
        ("Rules", &world.rules),
        ("Locations", &world.locations),
        ("Culture", &world.culture),
    ] {
        if let Some(map) = map.as_ref().filter(|m| !m.is_empty()) {
            prompt.push_str(&format!("{}: {}\n", label, render_map(map)));
        }
    }
    prompt.push('\n');
}

fn add_plot_section(prompt: &mut String, plots: &[PlotSummary]) {
    if plots.is_empty() {
        return;
    }

    prompt.push_str("## Plot\n");
    for plot in plots {
        prompt.push_str("- ");
        prompt.push_str(&plot.title);
        if let Some(kind) = present(plot.plot_type.as_deref()) {
            prompt.push_str(&format!(" [{}]", kind));
        }
        if let Some(description) = present(plot.description.as_deref()) {
            prompt.push_str(&format!(": {}", description));
        }
        prompt.push('\n');
        if let Some(events) = present(plot.key_events.as_deref()) {
            prompt.push_str(&format!("  Key events: {}\n", events));
        }
    }
    prompt.push('\n');
}

fn add_previous_content(prompt: &mut String, previous: Option<&str>) {
    if let Some(previous) = present(previous) {
        prompt.push_str("## Previous content\n");
        prompt.push_str(previous);
        prompt.push_str("\n\n");
    }
}

fn render_map(map: &Map<String, Value>) -> String {
    map.iter()
        .map(|(key, value)| match value {
            Value::String(s) => format!("{} = {}", key, s),
            other => format!("{} = {}", key, other),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn novel() -> NovelSummary {
        NovelSummary {
            title: "The Glass Tide".into(),
            genre: Some("Fantasy".into()),
            synopsis: Some("A city that floods with light.".into()),
        }
    }

    #[test]
    fn test_empty_context_is_just_the_instruction() {
        assert_eq!(render_prompt(&GenerationContext::default(), "Say hi"), "Say hi");
    }

    #[test]
    fn test_sections_in_fixed_order() {
        let context = GenerationContext {
            novel: Some(novel()),
            characters: vec![CharacterSummary {
                name: "Ilse".into(),
                role: Some("protagonist".into()),
                personality: Some("stubborn".into()),
                ..Default::default()
            }],
            plots: vec![PlotSummary {
                title: "The flood".into(),
                key_events: Some("the dam breaks".into()),
                ..Default::default()
            }],
            world: Some(WorldSummary {
                era: Some("Late bronze".into()),
                rules: json!({"magic": "light only"}).as_object().cloned(),
                ..Default::default()
            }),
            previous_content: Some("Ilse woke early.".into()),
        };

        let prompt = render_prompt(&context, "Continue the story");
        let order = ["## Novel", "## Characters", "## World", "## Plot", "## Previous content", "## Request"];
        let positions: Vec<usize> = order.iter().map(|h| prompt.find(h).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", prompt);

        assert!(prompt.contains("- Ilse (protagonist): Personality: stubborn"));
        assert!(prompt.contains("Rules: magic = light only"));
        assert!(prompt.contains("  Key events: the dam breaks"));
        assert!(prompt.ends_with("Continue the story"));
    }

    #[test]
    fn test_missing_sections_have_no_headers() {
        let context = GenerationContext {
            novel: Some(NovelSummary {
                title: "Bare".into(),
                genre: None,
                synopsis: Some("   ".into()),
            }),
            world: Some(WorldSummary::default()),
            ..Default::default()
        };
        let prompt = render_prompt(&context, "Go");
        assert!(!prompt.contains("## Characters"));
        assert!(!prompt.contains("## World"));
        assert!(!prompt.contains("Synopsis"));
        assert!(!prompt.contains("Genre"));
    }
}
