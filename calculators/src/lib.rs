//! The calculator modules shipped with EndoCalc.
//!
//! Modules are exposed through two static registries that the engine's loader
//! resolves against. [`BUNDLED`] holds the calculators packaged alongside the
//! shell (the primary address, `calculators/<id>`); [`STANDALONE`] holds
//! modules published on their own (the fallback address,
//! `/js/calculators/<id>`).

pub mod bmi;
pub mod bmr;
pub mod egfr;
pub mod glucose;
pub mod metabolic;
pub mod steroid;
mod units;
pub mod weight;

use endocalc_types::Factory;

/// One registered module.
#[derive(Debug, Clone, Copy)]
pub struct ModuleEntry {
    pub id: &'static str,
    pub factory: Factory,
}

impl ModuleEntry {
    const fn new(id: &'static str, factory: Factory) -> Self {
        Self { id, factory }
    }
}

pub const BUNDLED: &[ModuleEntry] = &[
    ModuleEntry::new("bmi", bmi::create),
    ModuleEntry::new("bmr", bmr::create),
    ModuleEntry::new("egfr-mdrd", egfr::create),
    ModuleEntry::new("hba1c", glucose::create),
    ModuleEntry::new("metabolic-syndrome", metabolic::create),
    ModuleEntry::new("steroid", steroid::create),
];

pub const STANDALONE: &[ModuleEntry] = &[ModuleEntry::new("pounds-kg", weight::create)];

#[must_use]
pub fn lookup(registry: &[ModuleEntry], id: &str) -> Option<Factory> {
    registry
        .iter()
        .find(|entry| entry.id == id)
        .map(|entry| entry.factory)
}
