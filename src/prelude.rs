//! Prelude module for convenient imports.

pub use crate::error::{PlaygroundError, Result};
pub use crate::exec::{
    config::PlaygroundConfig,
    dispatcher::{ExecutionRequest, ExecutionResult, Language, Playground},
};
