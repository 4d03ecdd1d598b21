//! Core domain types for EndoCalc.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies:
//! routing identifiers, the calculator contract and its render surface, the
//! shell's message set, offline cache state, and the error taxonomy.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod cache;
mod contract;
mod errors;
mod ids;
mod message;
mod surface;
mod ui;

pub use cache::{AgentEvent, AgentState, CacheState, PlatformEvent};
pub use contract::{
    AddressKind, Calculator, Factory, LoadedCalculator, ModuleReference, Resolution,
};
pub use errors::{InitializationError, LoadError, RenderError, ResolveError, ValidationError};
pub use ids::{CalculatorId, EmptyIdError, Generation, Route};
pub use message::{LoadCompletion, ShellMessage, View};
pub use surface::{
    ChoiceOption, Container, Field, FieldKind, FieldValue, FormEvent, FormFields, HandlerResult,
    InfoSection, Output,
};
pub use ui::UiOptions;
