use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("calculator id must not be empty")]
pub struct EmptyIdError;

/// Routing identifier of a calculator module (`bmi`, `egfr-mdrd`, ...).
///
/// Guaranteed non-empty after trimming. No further validation happens here:
/// whether an id is resolvable is the loader's business.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalculatorId(String);

impl CalculatorId {
    pub fn new(raw: impl Into<String>) -> Result<Self, EmptyIdError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EmptyIdError);
        }
        if trimmed.len() == raw.len() {
            Ok(Self(raw))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CalculatorId {
    type Error = EmptyIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CalculatorId> for String {
    fn from(value: CalculatorId) -> Self {
        value.0
    }
}

impl Borrow<str> for CalculatorId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CalculatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The routing address: empty selects the menu, anything else names a calculator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Route {
    #[default]
    Menu,
    Calculator(CalculatorId),
}

impl Route {
    /// Parse a fragment. A leading `#` is stripped; blank fragments select the menu.
    #[must_use]
    pub fn from_fragment(fragment: &str) -> Self {
        let raw = fragment.trim();
        let raw = raw.strip_prefix('#').unwrap_or(raw);
        CalculatorId::new(raw).map_or(Route::Menu, Route::Calculator)
    }

    #[must_use]
    pub fn fragment(&self) -> &str {
        match self {
            Route::Menu => "",
            Route::Calculator(id) => id.as_str(),
        }
    }

    #[must_use]
    pub fn calculator(&self) -> Option<&CalculatorId> {
        match self {
            Route::Menu => None,
            Route::Calculator(id) => Some(id),
        }
    }

    #[must_use]
    pub fn is_menu(&self) -> bool {
        matches!(self, Route::Menu)
    }
}

impl From<CalculatorId> for Route {
    fn from(id: CalculatorId) -> Self {
        Route::Calculator(id)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.fragment())
    }
}

/// Sequence number allocated per navigation; load results carrying an older
/// generation are stale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    #[must_use]
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
