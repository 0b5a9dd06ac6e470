// src/prompt/templates.rs
// Instructions for the task-specific AI endpoints

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterArchetype {
    Protagonist,
    Antagonist,
    Supporting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotKind {
    #[default]
    Main,
    Subplot,
    Twist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotLength {
    Short,
    #[default]
    Medium,
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpansionStyle {
    Brief,
    #[default]
    Detailed,
    Dramatic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorldFocus {
    Era,
    Rules,
    Locations,
    Culture,
    #[default]
    Overall,
}

pub fn character_instruction(archetype: CharacterArchetype, traits: Option<&str>) -> String {
    let role = match archetype {
        CharacterArchetype::Protagonist => "a protagonist who can carry the story",
        CharacterArchetype::Antagonist => "an antagonist whose goals collide with the protagonist's",
        CharacterArchetype::Supporting => "a supporting character who deepens the main cast",
    };
    let mut instruction = format!(
        "Create {} for this novel. Give a name, appearance, personality, background, goals and \
         their relationship to the existing characters.",
        role
    );
    if let Some(traits) = traits.map(str::trim).filter(|t| !t.is_empty()) {
        instruction.push_str(&format!(" Required traits: {}.", traits));
    }
    instruction
}

pub fn plot_instruction(kind: PlotKind, length: PlotLength) -> String {
    let kind = match kind {
        PlotKind::Main => "the main plot line",
        PlotKind::Subplot => "a subplot that runs alongside the main plot",
        PlotKind::Twist => "a plot twist that recontextualises earlier events",
    };
    let length = match length {
        PlotLength::Short => "Keep it to three or four key events.",
        PlotLength::Medium => "Outline six to eight key events.",
        PlotLength::Long => "Outline ten or more key events across the full arc.",
    };
    format!(
        "Design {} for this novel, consistent with the characters and existing plots. {} \
         For each event, name the characters involved and the conflict it raises.",
        kind, length
    )
}

pub fn chapter_outline_instruction(chapter_number: i64, theme: Option<&str>) -> String {
    let mut instruction = format!(
        "Write a scene-by-scene outline for chapter {}. Continue naturally from the earlier \
         chapters, advance at least one plot line and end on a hook.",
        chapter_number
    );
    if let Some(theme) = theme.map(str::trim).filter(|t| !t.is_empty()) {
        instruction.push_str(&format!(" The chapter's theme is: {}.", theme));
    }
    instruction
}

pub fn expand_instruction(snippet: &str, style: ExpansionStyle) -> String {
    let style = match style {
        ExpansionStyle::Brief => "Expand it modestly, adding only the most important detail.",
        ExpansionStyle::Detailed => {
            "Expand it into a full passage with sensory detail, interiority and dialogue."
        }
        ExpansionStyle::Dramatic => {
            "Expand it with heightened tension, sharp pacing and vivid emotional beats."
        }
    };
    format!(
        "Expand the following passage while keeping its voice and continuity. {}\n\nPassage:\n{}",
        style,
        snippet.trim()
    )
}

pub fn world_instruction(focus: WorldFocus) -> String {
    let focus = match focus {
        WorldFocus::Era => "the era: period, technology level and recent history",
        WorldFocus::Rules => "the rules of the world: magic, physics or social laws and their costs",
        WorldFocus::Locations => "key locations: geography, landmarks and what happens there",
        WorldFocus::Culture => "culture: customs, beliefs, factions and daily life",
        WorldFocus::Overall => "the overall setting: era, rules, locations and culture",
    };
    format!(
        "Develop {} for this novel. Stay consistent with any established world details and \
         make each element matter to the story.",
        focus
    )
}

/// Join earlier chapter summaries into a prior-content block.
pub fn summarize_previous_chapters<'a>(
    chapters: impl IntoIterator<Item = (i64, Option<&'a str>, Option<&'a str>)>,
) -> Option<String> {
    let lines: Vec<String> = chapters
        .into_iter()
        .filter_map(|(number, title, summary)| {
            let summary = summary.map(str::trim).filter(|s| !s.is_empty())?;
            Some(match title.map(str::trim).filter(|t| !t.is_empty()) {
                Some(title) => format!("Chapter {} ({}): {}", number, title, summary),
                None => format!("Chapter {}: {}", number, summary),
            })
        })
        .collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}
