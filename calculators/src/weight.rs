//! Pounds/kilograms converter, served from the standalone module location.

use endocalc_types::{
    Calculator, Container, Field, FormEvent, FormFields, HandlerResult, RenderError,
    ValidationError,
};

use crate::units::{KG_TO_LB, LB_TO_KG};

pub struct WeightConverter;

pub fn create() -> Box<dyn Calculator> {
    Box::new(WeightConverter)
}

#[must_use]
pub fn pounds_to_kg(pounds: f64) -> f64 {
    pounds * LB_TO_KG
}

#[must_use]
pub fn kg_to_pounds(kg: f64) -> f64 {
    kg * KG_TO_LB
}

/// Zero and blank both count as "no value".
fn entered(fields: &FormFields, key: &str) -> Option<f64> {
    fields
        .number(key)
        .ok()
        .flatten()
        .filter(|value| *value != 0.0)
}

fn convert(fields: &mut FormFields) -> HandlerResult {
    match (entered(fields, "pounds"), entered(fields, "kilograms")) {
        (Some(pounds), None) => {
            if pounds < 0.0 {
                return Err(ValidationError::new("Please enter a positive value"));
            }
            fields.set_text("kilograms", format!("{:.2}", pounds_to_kg(pounds)));
        }
        (None, Some(kg)) => {
            if kg < 0.0 {
                return Err(ValidationError::new("Please enter a positive value"));
            }
            fields.set_text("pounds", format!("{:.2}", kg_to_pounds(kg)));
        }
        _ => {
            return Err(ValidationError::new(
                "Please enter a value in one of the fields",
            ));
        }
    }
    Ok(None)
}

impl Calculator for WeightConverter {
    fn name(&self) -> &str {
        "Weight Converter"
    }

    fn description(&self) -> &str {
        "Convert between Pounds and Kilograms"
    }

    fn render(&self, container: &mut Container) -> Result<(), RenderError> {
        container.set_heading(self.name());
        container.push_intro(self.description());
        container.add_field(
            Field::number("pounds", "Weight in Pounds")
                .with_unit("lb")
                .optional(),
        )?;
        container.add_field(
            Field::number("kilograms", "Weight in Kilograms")
                .with_unit("kg")
                .optional(),
        )?;
        container.set_submit_label("Convert Units");

        container.set_handler(|event, fields| match event {
            // Typing into one side clears the other.
            FormEvent::Input(key) => {
                let other = if key == "pounds" { "kilograms" } else { "pounds" };
                fields.clear(other);
                Ok(None)
            }
            FormEvent::Submit => convert(fields),
        });
        Ok(())
    }
}
