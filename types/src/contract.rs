//! The capability contract every pluggable calculator satisfies.

use std::fmt;

use crate::{CalculatorId, Container, RenderError};

/// A pluggable calculator.
///
/// `render` must build everything it needs inside `container`: fields,
/// handler, static text. Input validation is the calculator's own concern and
/// is reported through the container, not through the returned `Result`,
/// which is reserved for a malformed subtree.
pub trait Calculator: Send {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn render(&self, container: &mut Container) -> Result<(), RenderError>;
}

/// Constructs a fresh calculator instance.
pub type Factory = fn() -> Box<dyn Calculator>;

/// Which of the two resolution addresses produced an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    Primary,
    Fallback,
}

impl AddressKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            AddressKind::Primary => "primary",
            AddressKind::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Pending,
    Resolved(AddressKind),
    /// Neither address resolved; the causes live on the [`LoadError`].
    ///
    /// [`LoadError`]: crate::LoadError
    Failed,
}

/// An identifier with its two candidate addresses and what came of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleReference {
    pub id: CalculatorId,
    pub primary: String,
    pub fallback: String,
    pub resolution: Resolution,
}

impl ModuleReference {
    #[must_use]
    pub fn new(id: CalculatorId, primary: String, fallback: String) -> Self {
        Self {
            id,
            primary,
            fallback,
            resolution: Resolution::Pending,
        }
    }
}

/// A freshly constructed instance plus the reference it was resolved from.
pub struct LoadedCalculator {
    pub reference: ModuleReference,
    pub instance: Box<dyn Calculator>,
}

impl fmt::Debug for LoadedCalculator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedCalculator")
            .field("reference", &self.reference)
            .field("name", &self.instance.name())
            .finish()
    }
}
