//! Equivalent glucocorticoid doses by relative potency.

use endocalc_types::{
    Calculator, Container, Field, FormEvent, FormFields, HandlerResult, Output, RenderError,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Steroid {
    pub key: &'static str,
    pub name: &'static str,
    /// Relative to hydrocortisone.
    pub potency: f64,
}

pub const STEROIDS: &[Steroid] = &[
    Steroid { key: "hydrocortisone", name: "Hydrocortisone", potency: 1.0 },
    Steroid { key: "cortisone", name: "Cortisone", potency: 0.8 },
    Steroid { key: "prednisone", name: "Prednisone", potency: 4.0 },
    Steroid { key: "prednisolone", name: "Prednisolone", potency: 4.0 },
    Steroid { key: "triamcinolone", name: "Triamcinolone", potency: 5.0 },
    Steroid { key: "methylprednisolone", name: "Methylprednisolone", potency: 5.0 },
    Steroid { key: "dexamethasone", name: "Dexamethasone", potency: 25.0 },
    Steroid { key: "betamethasone", name: "Betamethasone", potency: 30.0 },
];

/// Both selectors start on prednisone.
const DEFAULT_INDEX: usize = 2;

#[must_use]
pub fn steroid(key: &str) -> Option<&'static Steroid> {
    STEROIDS.iter().find(|steroid| steroid.key == key)
}

#[must_use]
pub fn equivalent_dose(dose: f64, from: &Steroid, to: &Steroid) -> f64 {
    dose * (from.potency / to.potency)
}

fn result_line(dose: f64) -> String {
    format!("Equivalent dose: {dose:.2} mg")
}

fn update(fields: &FormFields) -> HandlerResult {
    // Unparsable or blank dose reads as zero, like an empty input box.
    let dose = fields.number("dose").ok().flatten().unwrap_or(0.0);
    let (Some(from), Some(to)) = (
        steroid(fields.choice("from")?),
        steroid(fields.choice("to")?),
    ) else {
        return Ok(None);
    };
    Ok(Some(vec![result_line(equivalent_dose(dose, from, to))]))
}

pub struct SteroidConverter;

pub fn create() -> Box<dyn Calculator> {
    Box::new(SteroidConverter)
}

impl Calculator for SteroidConverter {
    fn name(&self) -> &str {
        "Steroid Converter"
    }

    fn description(&self) -> &str {
        "Convert between equivalent doses of different steroids"
    }

    fn render(&self, container: &mut Container) -> Result<(), RenderError> {
        let options: Vec<(&str, &str)> = STEROIDS
            .iter()
            .map(|steroid| (steroid.key, steroid.name))
            .collect();

        container.set_heading(self.name());
        container.push_intro(self.description());
        container.add_field(Field::choice("from", "Convert from", &options).selected(DEFAULT_INDEX))?;
        container.add_field(Field::number("dose", "Dose").with_unit("mg").optional())?;
        container.add_field(Field::choice("to", "Convert to", &options).selected(DEFAULT_INDEX))?;
        container.set_output(Output::Lines(vec![result_line(0.0)]));
        container.add_info(
            "Relative Potencies",
            STEROIDS
                .iter()
                .map(|steroid| format!("{:<20}{}", steroid.name, steroid.potency))
                .collect(),
        );

        container.set_handler(|event, fields| match event {
            FormEvent::Input(_) => update(fields),
            FormEvent::Submit => Ok(None),
        });
        Ok(())
    }
}
