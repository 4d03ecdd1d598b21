//! Resolves calculator identifiers to fresh instances.
//!
//! Resolution tries the primary address (`<base>calculators/<id>`) and then the
//! fixed fallback address (`/js/calculators/<id>`). Each address is backed by
//! a static registry built once at startup; nothing is guessed at runtime.

use endocalc_calculators::{BUNDLED, ModuleEntry, STANDALONE, lookup};
use endocalc_types::{
    AddressKind, CalculatorId, Factory, LoadError, LoadedCalculator, ModuleReference, Resolution,
    ResolveError,
};

pub const FALLBACK_PREFIX: &str = "/js/calculators/";

/// One menu line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: CalculatorId,
    pub name: String,
    pub description: String,
}

#[derive(Debug)]
pub struct ModuleLoader {
    base: String,
    primary: Vec<ModuleEntry>,
    fallback: Vec<ModuleEntry>,
}

impl ModuleLoader {
    /// Loader over the modules shipped in this workspace.
    #[must_use]
    pub fn bundled(base: impl Into<String>) -> Self {
        Self::with_registries(base, BUNDLED, STANDALONE)
    }

    #[must_use]
    pub fn with_registries(
        base: impl Into<String>,
        primary: &[ModuleEntry],
        fallback: &[ModuleEntry],
    ) -> Self {
        Self {
            base: base.into(),
            primary: primary.to_vec(),
            fallback: fallback.to_vec(),
        }
    }

    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    #[must_use]
    pub fn reference(&self, id: &CalculatorId) -> ModuleReference {
        ModuleReference::new(
            id.clone(),
            format!("{}calculators/{id}", self.base),
            format!("{FALLBACK_PREFIX}{id}"),
        )
    }

    /// Construct a new instance for `id`. Instances are never reused.
    pub fn load(&self, id: &CalculatorId) -> Result<LoadedCalculator, LoadError> {
        let reference = self.reference(id);
        tracing::info!("Loading calculator: {id}");

        let primary_err = match attempt(&self.primary, id, &reference.primary) {
            Ok(factory) => return Ok(finish(reference, AddressKind::Primary, factory)),
            Err(err) => err,
        };
        tracing::debug!(
            "Trying alternate path for {id}: {} ({primary_err})",
            reference.fallback
        );

        match attempt(&self.fallback, id, &reference.fallback) {
            Ok(factory) => Ok(finish(reference, AddressKind::Fallback, factory)),
            Err(fallback_err) => {
                tracing::warn!("Both path attempts failed for {id}");
                let mut reference = reference;
                reference.resolution = Resolution::Failed;
                Err(LoadError {
                    id: id.clone(),
                    reference,
                    causes: [primary_err, fallback_err],
                })
            }
        }
    }

    /// Menu entries for every resolvable id, primary registry first.
    #[must_use]
    pub fn catalog(&self) -> Vec<CatalogEntry> {
        self.primary
            .iter()
            .chain(&self.fallback)
            .filter_map(|entry| {
                let id = CalculatorId::new(entry.id).ok()?;
                let instance = (entry.factory)();
                Some(CatalogEntry {
                    id,
                    name: instance.name().to_string(),
                    description: instance.description().to_string(),
                })
            })
            .collect()
    }
}

fn attempt(
    registry: &[ModuleEntry],
    id: &CalculatorId,
    address: &str,
) -> Result<Factory, ResolveError> {
    tracing::debug!("Loading module from: {address}");
    lookup(registry, id.as_str()).ok_or_else(|| {
        tracing::debug!("No module at {address}");
        ResolveError::NotFound {
            address: address.to_string(),
        }
    })
}

fn finish(mut reference: ModuleReference, kind: AddressKind, factory: Factory) -> LoadedCalculator {
    let address = match kind {
        AddressKind::Primary => &reference.primary,
        AddressKind::Fallback => &reference.fallback,
    };
    tracing::info!("Module loaded successfully from {} path {address}", kind.as_str());
    reference.resolution = Resolution::Resolved(kind);
    LoadedCalculator {
        reference,
        instance: factory(),
    }
}

#[cfg(test)]
mod tests {
    use endocalc_types::{Calculator, Container, Field, RenderError};

    use super::*;

    fn id(raw: &str) -> CalculatorId {
        CalculatorId::new(raw).expect("non-empty id")
    }

    struct Probe;

    impl Calculator for Probe {
        fn name(&self) -> &str {
            "Probe"
        }

        fn description(&self) -> &str {
            "Registered twice"
        }

        fn render(&self, container: &mut Container) -> Result<(), RenderError> {
            container.add_field(Field::number("x", "X"))
        }
    }

    fn stand_in() -> Box<dyn Calculator> {
        Box::new(Probe)
    }

    #[test]
    fn bundled_module_resolves_at_primary() {
        let loader = ModuleLoader::bundled("./");
        let loaded = loader.load(&id("bmi")).expect("bmi resolves");
        assert_eq!(loaded.instance.name(), "BMI Calculator");
        assert_eq!(loaded.reference.primary, "./calculators/bmi");
        assert_eq!(
            loaded.reference.resolution,
            Resolution::Resolved(AddressKind::Primary)
        );
    }

    #[test]
    fn standalone_module_resolves_at_fallback() {
        let loader = ModuleLoader::bundled("./");
        let loaded = loader.load(&id("pounds-kg")).expect("pounds-kg resolves");
        assert_eq!(loaded.instance.name(), "Weight Converter");
        assert_eq!(loaded.reference.fallback, "/js/calculators/pounds-kg");
        assert_eq!(
            loaded.reference.resolution,
            Resolution::Resolved(AddressKind::Fallback)
        );
    }

    #[test]
    fn unknown_id_reports_both_causes() {
        let loader = ModuleLoader::bundled("/app/");
        let err = loader.load(&id("nonexistent")).expect_err("nothing registered");
        assert_eq!(err.id.as_str(), "nonexistent");
        assert_eq!(
            err.primary(),
            &ResolveError::NotFound {
                address: "/app/calculators/nonexistent".to_string()
            }
        );
        assert_eq!(
            err.fallback(),
            &ResolveError::NotFound {
                address: "/js/calculators/nonexistent".to_string()
            }
        );
        assert!(err.to_string().contains("nonexistent"));
        assert_eq!(err.reference.resolution, Resolution::Failed);
        assert_eq!(err.reference.primary, "/app/calculators/nonexistent");
    }

    #[test]
    fn primary_wins_over_fallback() {
        let entry = [ModuleEntry { id: "bmi", factory: stand_in }];
        let loader = ModuleLoader::with_registries("./", BUNDLED, &entry);
        let loaded = loader.load(&id("bmi")).expect("bmi resolves");
        assert_eq!(loaded.instance.name(), "BMI Calculator");
    }

    #[test]
    fn each_load_builds_a_fresh_instance() {
        let loader = ModuleLoader::bundled("./");
        let first = loader.load(&id("steroid")).expect("resolves");
        let second = loader.load(&id("steroid")).expect("resolves");

        let mut a = Container::new();
        let mut b = Container::new();
        first.instance.render(&mut a).expect("renders");
        second.instance.render(&mut b).expect("renders");
        assert_eq!(a.text_lines(), b.text_lines());
    }

    #[test]
    fn catalog_lists_primary_then_fallback() {
        let loader = ModuleLoader::bundled("./");
        let ids: Vec<String> = loader
            .catalog()
            .into_iter()
            .map(|entry| entry.id.to_string())
            .collect();
        assert_eq!(
            ids,
            [
                "bmi",
                "bmr",
                "egfr-mdrd",
                "hba1c",
                "metabolic-syndrome",
                "steroid",
                "pounds-kg"
            ]
        );
    }
}
