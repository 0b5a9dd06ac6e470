// src/prompt/mod.rs
// Generation context: what the model should know about a novel, how it is
// loaded from the database and how it is rendered into a prompt

pub mod builder;
pub mod context;
pub mod templates;

pub use builder::{ContextOptions, build_context};
pub use context::{
    CharacterSummary, GenerationContext, NovelSummary, PlotSummary, WorldSummary, render_prompt,
};
