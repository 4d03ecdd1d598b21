//! Body Mass Index.

use endocalc_types::{
    Calculator, Container, Field, FormEvent, RenderError, ValidationError,
};

pub struct BmiCalculator;

pub fn create() -> Box<dyn Calculator> {
    Box::new(BmiCalculator)
}

/// Weight in kg, height in metres.
#[must_use]
pub fn calculate_bmi(weight: f64, height: f64) -> f64 {
    weight / (height * height)
}

#[must_use]
pub fn bmi_category(bmi: f64) -> &'static str {
    if bmi < 18.5 {
        "Underweight"
    } else if bmi < 25.0 {
        "Normal weight"
    } else if bmi < 30.0 {
        "Overweight"
    } else {
        "Obese"
    }
}

impl Calculator for BmiCalculator {
    fn name(&self) -> &str {
        "BMI Calculator"
    }

    fn description(&self) -> &str {
        "Calculate Body Mass Index (BMI)"
    }

    fn render(&self, container: &mut Container) -> Result<(), RenderError> {
        container.set_heading(self.name());
        container.push_intro(self.description());
        container.add_field(Field::number("weight", "Weight").with_unit("kg"))?;
        container.add_field(Field::number("height", "Height").with_unit("m"))?;
        container.set_submit_label("Calculate BMI");

        container.set_handler(|event, fields| {
            if *event != FormEvent::Submit {
                return Ok(None);
            }
            let weight = fields.require("weight")?;
            let height = fields.require("height")?;
            if weight <= 0.0 || height <= 0.0 {
                return Err(ValidationError::new(
                    "Weight and height must be greater than zero",
                ));
            }

            let bmi = calculate_bmi(weight, height);
            Ok(Some(vec![
                "Results".to_string(),
                format!("Your BMI is: {bmi:.1}"),
                format!("Category: {}", bmi_category(bmi)),
            ]))
        });
        Ok(())
    }
}
