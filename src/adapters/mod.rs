//! External integrations
//!
//! - [`llm`] - Language-model analyzers

pub mod llm;
