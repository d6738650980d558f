//! Doubtreel: turn a student's question and its answer into an explanatory
//! Manim animation.
//!
//! A text-generation provider writes a scene script from a structured prompt
//! ([`prompt`], [`generate`]). Code is pulled out of the free-form response
//! ([`extract`]), patched into something the renderer accepts ([`patch`]),
//! and rendered by an external subprocess ([`render`]). Whenever generation
//! or validation fails, a deterministic template script is rendered instead
//! ([`fallback`]). [`pipeline`] composes the stages.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exit_codes;
pub mod extract;
pub mod fallback;
pub mod fs;
pub mod generate;
pub mod journal;
pub mod patch;
pub mod pipeline;
pub mod prompt;
pub mod render;
pub mod scene;
