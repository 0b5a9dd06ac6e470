// src/assistants/mod.rs
// Writing assistant personas layered over the AI service

use futures::future::try_join_all;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

use crate::llm::{AiService, GenerationResult, ProviderError};
use crate::prompt::GenerationContext;
use crate::schemas::ai::{AssistantInfo, ProviderSettings};

/// Token budget for each multi-version draft
pub const VERSION_MAX_TOKENS: u32 = 3000;

/// Style hints cycled across multi-version drafts
pub const VERSION_STYLES: [&str; 2] = ["detailed", "concise"];

const UNNAMED: &str = "Untitled";
const UNSPECIFIED: &str = "unspecified";

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Unknown assistant role: {0}")]
    UnknownRole(String),

    #[error("{0}")]
    Unsupported(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantRole {
    Conceptualizer,
    Blueplanner,
    Outliner,
    Novelist,
    Extractor,
    Evaluator,
}

impl AssistantRole {
    pub const ALL: [AssistantRole; 6] = [
        Self::Conceptualizer,
        Self::Blueplanner,
        Self::Outliner,
        Self::Novelist,
        Self::Extractor,
        Self::Evaluator,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Conceptualizer => "conceptualizer",
            Self::Blueplanner => "blueplanner",
            Self::Outliner => "outliner",
            Self::Novelist => "novelist",
            Self::Extractor => "extractor",
            Self::Evaluator => "evaluator",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Conceptualizer => "Concept Assistant",
            Self::Blueplanner => "Blueprint Planner",
            Self::Outliner => "Outline Assistant",
            Self::Novelist => "Novelist",
            Self::Extractor => "Summary Extractor",
            Self::Evaluator => "Quality Evaluator",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Conceptualizer => {
                "Brainstorms with you and distils vague ideas into a core concept"
            }
            Self::Blueplanner => {
                "Turns a concept into a structured blueprint of world, cast and plot framework"
            }
            Self::Outliner => "Plans and refines chapter outlines with attention to pacing",
            Self::Novelist => "Writes chapter prose and can draft several versions to choose from",
            Self::Extractor => "Compresses chapter text into a compact summary for later context",
            Self::Evaluator => "Assesses quality objectively and suggests concrete improvements",
        }
    }

    /// Token budget when the caller does not supply one.
    pub fn default_max_tokens(self) -> u32 {
        match self {
            Self::Novelist => VERSION_MAX_TOKENS,
            Self::Extractor => 800,
            _ => 2000,
        }
    }

    fn preamble(self) -> &'static str {
        match self {
            Self::Conceptualizer => {
                "You are a creative concept assistant. You brainstorm from rough ideas, \
                 distil scattered thoughts into a clear concept, explore the themes underneath \
                 and open up different creative directions. Ask provoking questions and keep \
                 the creative space open."
            }
            Self::Blueplanner => {
                "You are a blueprint planning assistant. You organise ideas into a clear \
                 framework, design a self-consistent world, check that settings agree with \
                 each other and build a foundation later writing can rely on."
            }
            Self::Outliner => {
                "You are an outline assistant. You divide the story into chapters, keep \
                 transitions between chapters natural, balance tension and release, and \
                 plant foreshadowing that pays off later."
            }
            Self::Novelist => {
                "You are a professional novelist. You write vivid scenes, natural dialogue \
                 and nuanced interior life while keeping the plot moving. Show, don't tell; \
                 keep every character's words true to their personality."
            }
            Self::Extractor => {
                "You are a summarisation assistant. You identify the essential plot points, \
                 record changes in each character's state, flag foreshadowing and open \
                 threads, and drop redundant description."
            }
            Self::Evaluator => {
                "You are a literary critic. You assess writing across plot, character, prose, \
                 pacing and reader experience, name strengths as well as problems, and give \
                 constructive, actionable suggestions."
            }
        }
    }

    /// Render the persona prompt for `user_input`.
    pub fn build_prompt(self, context: &GenerationContext, user_input: &str) -> String {
        let novel = context.novel.as_ref();
        let title = novel.map(|n| n.title.as_str()).unwrap_or(UNNAMED);
        let genre = novel.and_then(|n| n.genre.as_deref()).unwrap_or(UNSPECIFIED);
        let synopsis = novel.and_then(|n| n.synopsis.as_deref()).unwrap_or("none yet");

        let body = match self {
            Self::Conceptualizer => format!(
                "## Novel\nTitle: {title}\nGenre: {genre}\nSynopsis: {synopsis}\n\n\
                 ## Idea\n{user_input}\n\n\
                 Brainstorm around this idea and offer three to five distinct creative \
                 directions. For each give the core concept, possible plot threads and the \
                 questions still worth exploring."
            ),
            Self::Blueplanner => format!(
                "## Current state\nNovel: {title}\nGenre: {genre}\nCharacters so far: {}\n\
                 World setting: {}\n\n## Planning goal\n{user_input}\n\n\
                 Produce a structured blueprint covering world elements, the cast and their \
                 relationships, the plot framework and the key turning points. Use JSON or \
                 structured Markdown.",
                context.characters.len(),
                if context.world.is_some() { "defined" } else { "not yet defined" },
            ),
            Self::Outliner => {
                let names: Vec<&str> = context
                    .characters
                    .iter()
                    .take(5)
                    .map(|c| c.name.as_str())
                    .collect();
                format!(
                    "## Novel\nTitle: {title}\nGenre: {genre}\nPlot lines: {}\n\
                     Main characters: {}\n\n## Outline request\n{user_input}\n\n\
                     For each chapter give a title, a two or three sentence summary, key plot \
                     points, character development and how it links to the chapters around it.",
                    context.plots.len(),
                    names.join(", "),
                )
            }
            Self::Novelist => {
                let roster: Vec<String> = context
                    .characters
                    .iter()
                    .take(5)
                    .map(|c| format!("- {}: {}", c.name, c.personality.as_deref().unwrap_or("")))
                    .collect();
                format!(
                    "## Novel\nTitle: {title}\nGenre: {genre}\nTone: {synopsis}\n\n\
                     ## Main characters\n{}\n\n## Writing request\n{user_input}\n\n\
                     Write the chapter text. Match the genre's style, keep characters \
                     consistent, move the plot forward naturally and make details concrete. \
                     Aim for roughly 2000 to 3000 words.",
                    roster.join("\n"),
                )
            }
            Self::Extractor => format!(
                "## Text to compress\n{user_input}\n\n\
                 Compress the text into a summary with the core plot in two or three \
                 sentences, character state changes, important dialogue or decisions, and \
                 open threads. Keep it under 300 words."
            ),
            Self::Evaluator => format!(
                "## Text to evaluate\n{user_input}\n\n\
                 Evaluate it with: 1. scores out of 10 for plot, character, prose and pacing; \
                 2. two or three strengths; 3. two or three problems; 4. a concrete \
                 suggestion for each problem. Stay objective and constructive."
            ),
        };

        format!("{}\n\n{}", self.preamble(), body)
    }

    pub fn info(self) -> AssistantInfo {
        AssistantInfo {
            role: self.as_str(),
            name: self.display_name(),
            description: self.description(),
        }
    }
}

impl FromStr for AssistantRole {
    type Err = AssistantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| AssistantError::UnknownRole(s.to_string()))
    }
}

impl fmt::Display for AssistantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn list_assistants() -> Vec<AssistantInfo> {
    AssistantRole::ALL.into_iter().map(AssistantRole::info).collect()
}

/// A persona bound to one provider configuration.
#[derive(Debug, Clone)]
pub struct Assistant {
    role: AssistantRole,
    settings: ProviderSettings,
}

impl Assistant {
    pub fn create(role: &str, settings: ProviderSettings) -> Result<Self, AssistantError> {
        Ok(Self {
            role: role.parse()?,
            settings,
        })
    }

    pub fn role(&self) -> AssistantRole {
        self.role
    }

    pub async fn process(
        &self,
        ai: &AiService,
        context: &GenerationContext,
        user_input: &str,
        max_tokens: u32,
    ) -> Result<GenerationResult, AssistantError> {
        let prompt = self.role.build_prompt(context, user_input);
        debug!(role = %self.role, max_tokens, "assistant generating");
        let request = self.settings.request(prompt, context.clone(), max_tokens);
        Ok(ai.generate(request).await?)
    }

    pub fn ensure_multi_version(&self) -> Result<(), AssistantError> {
        if self.role != AssistantRole::Novelist {
            return Err(AssistantError::Unsupported(
                "Multiple versions only supported for 'novelist' role".to_string(),
            ));
        }
        Ok(())
    }

    /// Draft `count` alternative versions concurrently. Novelist only.
    pub async fn process_multiple_versions(
        &self,
        ai: &AiService,
        context: &GenerationContext,
        user_input: &str,
        count: usize,
    ) -> Result<Vec<GenerationResult>, AssistantError> {
        self.ensure_multi_version()?;

        info!(count, "drafting alternative versions");
        let drafts = (0..count).map(|i| {
            let style = VERSION_STYLES[i % VERSION_STYLES.len()];
            let input = format!("{}\n\n[Style: {}]", user_input, style);
            async move { self.process(ai, context, &input, VERSION_MAX_TOKENS).await }
        });
        try_join_all(drafts).await
    }
}
