//! # Prompt Template Modules
//!
//! This module organizes the prompt templates used by the explore assistant.

pub mod explore;

pub use explore::{build_explore_prompt, EXPLORE_INSTRUCTIONS};
