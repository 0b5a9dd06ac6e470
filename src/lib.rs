// src/lib.rs

pub mod api;
pub mod assistants;
pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod prompt;
pub mod schemas;
pub mod state;
