//! Error taxonomy for the shell.
//!
//! Only [`LoadError`] and [`RenderError`] cross into the shell controller;
//! [`ValidationError`] stays inside a calculator's container and
//! [`InitializationError`] aborts startup.

use thiserror::Error;

use crate::{CalculatorId, ModuleReference};

/// A single failed resolution attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no module registered at {address}")]
    NotFound { address: String },
}

/// Neither the primary nor the fallback address produced a calculator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("calculator '{id}' did not resolve: {} / {}", .causes[0], .causes[1])]
pub struct LoadError {
    pub id: CalculatorId,
    /// The reference both attempts were made from, marked failed.
    pub reference: ModuleReference,
    /// `[primary, fallback]`
    pub causes: [ResolveError; 2],
}

impl LoadError {
    #[must_use]
    pub fn primary(&self) -> &ResolveError {
        &self.causes[0]
    }

    #[must_use]
    pub fn fallback(&self) -> &ResolveError {
        &self.causes[1]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("field '{key}' declared twice")]
    DuplicateField { key: String },
    #[error("choice field '{key}' has no options")]
    EmptyChoice { key: String },
    #[error("render panicked: {message}")]
    Panicked { message: String },
}

/// Malformed user input. Shown inside the calculator, never propagated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitializationError {
    #[error("required host region '{name}' not found")]
    MissingAnchor { name: &'static str },
}
