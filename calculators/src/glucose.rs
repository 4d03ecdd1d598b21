//! Blood glucose, HbA1c and fructosamine, converted live as any one is typed.

use endocalc_types::{
    Calculator, Container, Field, FormEvent, FormFields, HandlerResult, RenderError,
    ValidationError,
};

use crate::units::{round_whole, trim_fixed};

pub struct GlucoseConverter;

pub fn create() -> Box<dyn Calculator> {
    Box::new(GlucoseConverter)
}

/// Glucose in mg/dL from HbA1c in percent.
#[must_use]
pub fn glucose_from_hba1c(hba1c: f64) -> f64 {
    hba1c * 28.7 - 46.7
}

#[must_use]
pub fn hba1c_from_glucose(glucose: f64) -> f64 {
    (glucose + 46.7) / 28.7
}

/// Fructosamine in µmol/L from HbA1c in percent.
#[must_use]
pub fn fructosamine_from_hba1c(hba1c: f64) -> f64 {
    (hba1c - 1.61) * 58.82
}

#[must_use]
pub fn hba1c_from_fructosamine(fructosamine: f64) -> f64 {
    0.017 * fructosamine + 1.61
}

/// Recompute the two fields other than `source`.
fn convert(source: &str, fields: &mut FormFields) -> HandlerResult {
    let value = fields
        .number(source)
        .map_err(|_| ValidationError::new(format!("Invalid {source} value")))?
        .filter(|value| *value > 0.0);

    let (glucose, hba1c, fructosamine) = match (source, value) {
        (_, None) => {
            for key in ["glucose", "hba1c", "fructosamine"] {
                if key != source {
                    fields.clear(key);
                }
            }
            return Ok(None);
        }
        ("glucose", Some(glucose)) => {
            let hba1c = hba1c_from_glucose(glucose);
            (glucose, hba1c, fructosamine_from_hba1c(hba1c))
        }
        ("hba1c", Some(hba1c)) => (
            glucose_from_hba1c(hba1c),
            hba1c,
            fructosamine_from_hba1c(hba1c),
        ),
        ("fructosamine", Some(fructosamine)) => {
            let hba1c = hba1c_from_fructosamine(fructosamine);
            (glucose_from_hba1c(hba1c), hba1c, fructosamine)
        }
        _ => return Ok(None),
    };

    if source != "glucose" {
        fields.set_text("glucose", round_whole(glucose));
    }
    if source != "hba1c" {
        fields.set_text("hba1c", trim_fixed(hba1c, 2));
    }
    if source != "fructosamine" {
        fields.set_text("fructosamine", trim_fixed(fructosamine, 2));
    }
    Ok(None)
}

impl Calculator for GlucoseConverter {
    fn name(&self) -> &str {
        "Glucose Converter"
    }

    fn description(&self) -> &str {
        "Convert between Blood Glucose, HbA1c, and Fructosamine"
    }

    fn render(&self, container: &mut Container) -> Result<(), RenderError> {
        container.set_heading(self.name());
        container.push_intro(self.description());
        container.add_field(
            Field::number("glucose", "Blood glucose")
                .with_unit("mg/dL")
                .optional(),
        )?;
        container.add_field(Field::number("hba1c", "HbA1c").with_unit("%").optional())?;
        container.add_field(
            Field::number("fructosamine", "Fructosamine")
                .with_unit("µmol/L")
                .optional(),
        )?;

        container.set_handler(|event, fields| match event {
            FormEvent::Input(key) => convert(key, fields),
            FormEvent::Submit => Ok(None),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use endocalc_types::Output;

    use super::*;

    fn rendered() -> Container {
        let mut container = Container::new();
        GlucoseConverter.render(&mut container).expect("glucose renders");
        container
    }

    fn value<'a>(container: &'a Container, key: &str) -> &'a str {
        container
            .fields()
            .get(key)
            .map(Field::display_value)
            .unwrap_or_default()
    }

    #[test]
    fn hba1c_drives_other_fields() {
        let mut container = rendered();
        container.set_value("hba1c", "7");
        // 7 * 28.7 - 46.7 = 154.2; (7 - 1.61) * 58.82 = 317.0398
        assert_eq!(value(&container, "glucose"), "154");
        assert_eq!(value(&container, "fructosamine"), "317.04");
        assert_eq!(value(&container, "hba1c"), "7");
    }

    #[test]
    fn glucose_drives_other_fields() {
        let mut container = rendered();
        container.set_value("glucose", "154.2");
        assert_eq!(value(&container, "hba1c"), "7");
        assert_eq!(value(&container, "fructosamine"), "317.04");
    }

    #[test]
    fn fructosamine_drives_other_fields() {
        let mut container = rendered();
        container.set_value("fructosamine", "300");
        // 0.017 * 300 + 1.61 = 6.71; 6.71 * 28.7 - 46.7 = 145.877
        assert_eq!(value(&container, "hba1c"), "6.71");
        assert_eq!(value(&container, "glucose"), "146");
    }

    #[test]
    fn clearing_source_clears_others() {
        let mut container = rendered();
        container.set_value("hba1c", "7");
        container.set_value("hba1c", "");
        assert_eq!(value(&container, "glucose"), "");
        assert_eq!(value(&container, "fructosamine"), "");
    }

    #[test]
    fn garbage_input_reports_field() {
        let mut container = rendered();
        container.set_value("glucose", "-.");
        assert_eq!(
            container.output(),
            &Output::Invalid("Invalid glucose value".to_string())
        );
    }
}
