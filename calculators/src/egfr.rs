//! eGFR by the MDRD study equation.

use endocalc_types::{
    Calculator, Container, Field, FormEvent, FormFields, HandlerResult, RenderError,
    ValidationError,
};

use crate::bmr::{SEX_OPTIONS, Sex};
use crate::units::UMOL_TO_MGDL;

const CKD_STAGES: &[&str] = &[
    "Stage 1: > 90 mL/min (Normal or high GFR)",
    "Stage 2: 60-89 mL/min (Mild CKD)",
    "Stage 3A: 45-59 mL/min (Moderate CKD)",
    "Stage 3B: 30-44 mL/min (Moderate CKD)",
    "Stage 4: 15-29 mL/min (Severe CKD)",
    "Stage 5: < 15 mL/min (End Stage CKD)",
];

pub struct EgfrCalculator;

pub fn create() -> Box<dyn Calculator> {
    Box::new(EgfrCalculator)
}

/// 175 x Scr^-1.154 x age^-0.203 (x 0.742 if female). Creatinine in mg/dL.
#[must_use]
pub fn mdrd(creatinine: f64, age: f64, sex: Sex) -> f64 {
    let egfr = 175.0 * creatinine.powf(-1.154) * age.powf(-0.203);
    match sex {
        Sex::Female => egfr * 0.742,
        Sex::Male => egfr,
    }
}

#[must_use]
pub fn ckd_stage(egfr: f64) -> &'static str {
    if egfr >= 90.0 {
        "Stage 1 with normal or high GFR"
    } else if egfr >= 60.0 {
        "Stage 2 Mild CKD"
    } else if egfr >= 45.0 {
        "Stage 3A Moderate CKD"
    } else if egfr >= 30.0 {
        "Stage 3B Moderate CKD"
    } else if egfr >= 15.0 {
        "Stage 4 Severe CKD"
    } else {
        "Stage 5 End Stage CKD"
    }
}

fn compute(fields: &FormFields) -> HandlerResult {
    let creatinine = fields
        .number("creatinine")
        .ok()
        .flatten()
        .filter(|value| *value > 0.0)
        .ok_or_else(|| ValidationError::new("Please enter a valid serum creatinine value"))?;
    let age = fields
        .number("age")
        .ok()
        .flatten()
        .filter(|age| (18.0..=130.0).contains(age))
        .ok_or_else(|| ValidationError::new("Please enter a valid age between 18 and 130"))?;
    let sex = Sex::parse(fields.choice("sex")?);

    let creatinine_mgdl = if fields.choice("creatinine_unit")? == "umoll" {
        creatinine * UMOL_TO_MGDL
    } else {
        creatinine
    };

    let egfr = mdrd(creatinine_mgdl, age.trunc(), sex);
    Ok(Some(vec![
        format!("eGFR: {egfr:.1} mL/min/1.73m²"),
        format!("Category: {}", ckd_stage(egfr)),
    ]))
}

impl Calculator for EgfrCalculator {
    fn name(&self) -> &str {
        "eGFR Calculator"
    }

    fn description(&self) -> &str {
        "Calculate eGFR using MDRD (Modification of Diet in Renal Disease) formula"
    }

    fn render(&self, container: &mut Container) -> Result<(), RenderError> {
        container.set_heading(self.name());
        container.push_intro(self.description());
        container.add_field(Field::number("creatinine", "Serum creatinine"))?;
        container.add_field(Field::choice(
            "creatinine_unit",
            "Creatinine unit",
            &[("mgdl", "mg/dL"), ("umoll", "µmol/L")],
        ))?;
        container.add_field(Field::number("age", "Age").with_unit("years"))?;
        container.add_field(Field::choice("sex", "Gender", SEX_OPTIONS))?;
        container.set_submit_label("Calculate eGFR");
        container.add_info(
            "CKD Classification by GFR",
            CKD_STAGES.iter().map(ToString::to_string).collect(),
        );

        container.set_handler(|event, fields| match event {
            FormEvent::Submit => compute(fields),
            FormEvent::Input(_) => Ok(None),
        });
        Ok(())
    }
}
