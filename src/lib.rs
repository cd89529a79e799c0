//! Classroom audio transcription and LLM-based lesson evaluation pipeline.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
