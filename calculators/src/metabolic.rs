//! Metabolic syndrome screening against the ATP-III criteria.

use endocalc_types::{
    Calculator, Container, Field, FormEvent, FormFields, HandlerResult, RenderError,
};

use crate::bmr::{SEX_OPTIONS, Sex};
use crate::units::IN_TO_CM;

/// Three or more met criteria indicate metabolic syndrome.
pub const DIAGNOSTIC_THRESHOLD: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurements {
    pub sex: Sex,
    /// Centimetres.
    pub waist: f64,
    pub triglycerides: f64,
    pub hdl: f64,
    pub systolic: f64,
    pub diastolic: f64,
    pub fasting_glucose: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub met: Vec<&'static str>,
}

impl Assessment {
    #[must_use]
    pub fn count(&self) -> usize {
        self.met.len()
    }

    #[must_use]
    pub fn has_syndrome(&self) -> bool {
        self.count() >= DIAGNOSTIC_THRESHOLD
    }
}

#[must_use]
pub fn check_criteria(m: &Measurements) -> Assessment {
    let (waist_limit, hdl_limit) = match m.sex {
        Sex::Male => (102.0, 40.0),
        Sex::Female => (88.0, 50.0),
    };

    let mut met = Vec::new();
    if m.waist >= waist_limit {
        met.push("Elevated waist circumference");
    }
    if m.triglycerides >= 150.0 {
        met.push("High triglycerides");
    }
    if m.hdl < hdl_limit {
        met.push("Low HDL cholesterol");
    }
    if m.systolic >= 130.0 || m.diastolic >= 85.0 {
        met.push("Elevated blood pressure");
    }
    if m.fasting_glucose >= 110.0 {
        met.push("High fasting glucose");
    }
    Assessment { met }
}

fn compute(fields: &FormFields) -> HandlerResult {
    let mut waist = fields.require("waist")?;
    if fields.choice("waist_unit")? == "inches" {
        waist *= IN_TO_CM;
    }
    let measurements = Measurements {
        sex: Sex::parse(fields.choice("sex")?),
        waist,
        triglycerides: fields.require("triglycerides")?,
        hdl: fields.require("hdl")?,
        systolic: fields.require("systolic")?,
        diastolic: fields.require("diastolic")?,
        fasting_glucose: fields.require("fasting_glucose")?,
    };
    let assessment = check_criteria(&measurements);

    let mut lines = vec![
        "Results".to_string(),
        if assessment.has_syndrome() {
            "Metabolic Syndrome criteria are met".to_string()
        } else {
            "Metabolic Syndrome criteria are not met".to_string()
        },
        format!(
            "Number of criteria met: {} (≥{DIAGNOSTIC_THRESHOLD} required for diagnosis)",
            assessment.count()
        ),
    ];
    if !assessment.met.is_empty() {
        lines.push("Criteria met:".to_string());
        lines.extend(assessment.met.iter().map(|criterion| format!("- {criterion}")));
    }
    lines.push(
        "Note: This calculator uses ATP-III Criteria. Please consult with a healthcare provider for proper diagnosis."
            .to_string(),
    );
    Ok(Some(lines))
}

pub struct MetabolicSyndromeCalculator;

pub fn create() -> Box<dyn Calculator> {
    Box::new(MetabolicSyndromeCalculator)
}

impl Calculator for MetabolicSyndromeCalculator {
    fn name(&self) -> &str {
        "Metabolic Syndrome Calculator"
    }

    fn description(&self) -> &str {
        "Calculate risk for metabolic syndrome based on ATP-III Criteria"
    }

    fn render(&self, container: &mut Container) -> Result<(), RenderError> {
        container.set_heading(self.name());
        container.push_intro(self.description());
        container.add_field(Field::choice("sex", "Gender", SEX_OPTIONS))?;
        container.add_field(Field::number("waist", "Waist size"))?;
        container.add_field(Field::choice(
            "waist_unit",
            "Waist unit",
            &[("inches", "Inches"), ("cm", "cm")],
        ))?;
        container.add_field(Field::number("triglycerides", "Triglycerides level").with_unit("mg/dL"))?;
        container.add_field(Field::number("hdl", "HDL-Cholesterol").with_unit("mg/dL"))?;
        container.add_field(Field::number("systolic", "Systolic blood pressure").with_unit("mm Hg"))?;
        container.add_field(Field::number("diastolic", "Diastolic blood pressure").with_unit("mm Hg"))?;
        container.add_field(
            Field::number("fasting_glucose", "Fasting blood glucose").with_unit("mg/dL"),
        )?;
        container.set_submit_label("Calculate");

        container.set_handler(|event, fields| match event {
            FormEvent::Submit => compute(fields),
            FormEvent::Input(_) => Ok(None),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use endocalc_types::Output;

    use super::*;

    fn healthy(sex: Sex) -> Measurements {
        Measurements {
            sex,
            waist: 80.0,
            triglycerides: 100.0,
            hdl: 60.0,
            systolic: 120.0,
            diastolic: 80.0,
            fasting_glucose: 90.0,
        }
    }

    #[test]
    fn healthy_values_meet_nothing() {
        let assessment = check_criteria(&healthy(Sex::Male));
        assert_eq!(assessment.count(), 0);
        assert!(!assessment.has_syndrome());
    }

    #[test]
    fn thresholds_depend_on_sex() {
        let mut m = healthy(Sex::Female);
        m.waist = 90.0;
        m.hdl = 45.0;
        assert_eq!(
            check_criteria(&m).met,
            vec!["Elevated waist circumference", "Low HDL cholesterol"]
        );

        m.sex = Sex::Male;
        assert!(check_criteria(&m).met.is_empty());
    }

    #[test]
    fn either_pressure_counts_once() {
        let mut m = healthy(Sex::Male);
        m.systolic = 140.0;
        m.diastolic = 90.0;
        assert_eq!(check_criteria(&m).met, vec!["Elevated blood pressure"]);
    }

    #[test]
    fn three_criteria_diagnose() {
        let mut container = Container::new();
        MetabolicSyndromeCalculator
            .render(&mut container)
            .expect("metabolic renders");
        // 41 in = 104.14 cm
        for (key, value) in [
            ("waist", "41"),
            ("triglycerides", "180"),
            ("hdl", "35"),
            ("systolic", "120"),
            ("diastolic", "80"),
            ("fasting_glucose", "95"),
        ] {
            container.set_value(key, value);
        }
        container.submit();

        let Output::Lines(lines) = container.output() else {
            panic!("expected results, got {:?}", container.output());
        };
        assert_eq!(lines[1], "Metabolic Syndrome criteria are met");
        assert_eq!(lines[2], "Number of criteria met: 3 (≥3 required for diagnosis)");
        assert!(lines.contains(&"- High triglycerides".to_string()));
    }

    #[test]
    fn missing_measurement_is_reported() {
        let mut container = Container::new();
        MetabolicSyndromeCalculator
            .render(&mut container)
            .expect("metabolic renders");
        container.set_value("waist", "30");
        container.submit();
        assert_eq!(
            container.output(),
            &Output::Invalid("Please enter a value for triglycerides level".to_string())
        );
    }
}
