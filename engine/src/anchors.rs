//! Named host regions the front end must provide before the shell starts.

use endocalc_types::InitializationError;

/// Region holding the calculator menu.
pub const MAIN_CONTAINER: &str = "main-container";
/// Region holding the calculator detail (or error panel).
pub const CALCULATOR_CONTAINER: &str = "calculator-container";

pub const REQUIRED_ANCHORS: [&str; 2] = [MAIN_CONTAINER, CALCULATOR_CONTAINER];

/// Fails on the first required region missing from `available`.
pub fn require_anchors(available: &[&str]) -> Result<(), InitializationError> {
    match REQUIRED_ANCHORS
        .into_iter()
        .find(|name| !available.contains(name))
    {
        Some(name) => Err(InitializationError::MissingAnchor { name }),
        None => Ok(()),
    }
}
