//! Basal Metabolic Rate by three formulas, plus TDEE.

use endocalc_types::{
    Calculator, Container, Field, FormEvent, FormFields, HandlerResult, RenderError,
    ValidationError,
};

use crate::units::{IN_TO_CM, LB_TO_KG, round_whole};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub(crate) fn parse(value: &str) -> Self {
        if value == "female" {
            Sex::Female
        } else {
            Sex::Male
        }
    }
}

pub(crate) const SEX_OPTIONS: &[(&str, &str)] = &[("male", "Male"), ("female", "Female")];

const ACTIVITY_LEVELS: &[(&str, &str, f64)] = &[
    ("sedentary", "Sedentary (little or no exercise)", 1.2),
    ("light", "Light (exercise 1-3 days/week)", 1.375),
    ("moderate", "Moderate (exercise 3-5 days/week)", 1.55),
    ("active", "Active (exercise 6-7 days/week)", 1.725),
    ("very_active", "Very Active (hard exercise & physical job)", 1.9),
];

pub struct BmrCalculator;

pub fn create() -> Box<dyn Calculator> {
    Box::new(BmrCalculator)
}

/// Weight in kg, height in cm, age in years.
#[must_use]
pub fn harris_benedict(weight: f64, height: f64, age: f64, sex: Sex) -> f64 {
    match sex {
        Sex::Male => 66.47 + 13.75 * weight + 5.003 * height - 6.755 * age,
        Sex::Female => 655.1 + 9.563 * weight + 1.850 * height - 4.676 * age,
    }
}

#[must_use]
pub fn mifflin_st_jeor(weight: f64, height: f64, age: f64, sex: Sex) -> f64 {
    let base = 10.0 * weight + 6.25 * height - 5.0 * age;
    match sex {
        Sex::Male => base + 5.0,
        Sex::Female => base - 161.0,
    }
}

/// Body fat in percent.
#[must_use]
pub fn katch_mcardle(weight: f64, body_fat: f64) -> f64 {
    let lean_mass = weight * (1.0 - body_fat / 100.0);
    370.0 + 21.6 * lean_mass
}

#[must_use]
pub fn activity_multiplier(level: &str) -> Option<f64> {
    ACTIVITY_LEVELS
        .iter()
        .find(|(key, _, _)| *key == level)
        .map(|(_, _, factor)| *factor)
}

fn compute(fields: &FormFields) -> HandlerResult {
    let sex = Sex::parse(fields.choice("sex")?);
    let age = fields.require("age")?;
    if !(15.0..=120.0).contains(&age) {
        return Err(ValidationError::new("Please enter an age between 15 and 120"));
    }
    let mut weight = fields.require("weight")?;
    let mut height = fields.require("height")?;
    if weight <= 0.0 || height <= 0.0 {
        return Err(ValidationError::new(
            "Weight and height must be greater than zero",
        ));
    }
    if fields.choice("weight_unit")? == "lbs" {
        weight *= LB_TO_KG;
    }
    if fields.choice("height_unit")? == "inches" {
        height *= IN_TO_CM;
    }
    let body_fat = fields.number("body_fat")?;
    if let Some(fat) = body_fat
        && !(1.0..=70.0).contains(&fat)
    {
        return Err(ValidationError::new("Body fat must be between 1% and 70%"));
    }
    let multiplier = activity_multiplier(fields.choice("activity")?)
        .ok_or_else(|| ValidationError::new("Please select an activity level"))?;

    let hb = harris_benedict(weight, height, age, sex);
    let msj = mifflin_st_jeor(weight, height, age, sex);
    let km = body_fat.map(|fat| katch_mcardle(weight, fat));

    let mut values = vec![hb, msj];
    values.extend(km);
    let average = values.iter().sum::<f64>() / values.len() as f64;
    let tdee = average * multiplier;

    let mut lines = vec![
        "Results".to_string(),
        format!("Harris-Benedict: {} calories/day", round_whole(hb)),
        format!("Mifflin-St Jeor: {} calories/day", round_whole(msj)),
    ];
    if let Some(km) = km {
        lines.push(format!("Katch-McArdle: {} calories/day", round_whole(km)));
    }
    lines.push(format!("Average BMR: {} calories/day", round_whole(average)));
    lines.push(format!(
        "Total Daily Energy Expenditure (TDEE): {} calories/day",
        round_whole(tdee)
    ));
    Ok(Some(lines))
}

impl Calculator for BmrCalculator {
    fn name(&self) -> &str {
        "Basal Metabolic Rate Calculator"
    }

    fn description(&self) -> &str {
        "Calculate your Basal Metabolic Rate using multiple formulas"
    }

    fn render(&self, container: &mut Container) -> Result<(), RenderError> {
        let activity: Vec<(&str, &str)> = ACTIVITY_LEVELS
            .iter()
            .map(|(key, label, _)| (*key, *label))
            .collect();

        container.set_heading(self.name());
        container.push_intro(self.description());
        container.add_field(Field::choice("sex", "Gender", SEX_OPTIONS))?;
        container.add_field(Field::number("age", "Age").with_unit("years"))?;
        container.add_field(Field::number("weight", "Weight"))?;
        container.add_field(Field::choice(
            "weight_unit",
            "Weight unit",
            &[("kg", "kg"), ("lbs", "lbs")],
        ))?;
        container.add_field(Field::number("height", "Height"))?;
        container.add_field(Field::choice(
            "height_unit",
            "Height unit",
            &[("cm", "cm"), ("inches", "inches")],
        ))?;
        container.add_field(
            Field::number("body_fat", "Body fat (optional, for Katch-McArdle)")
                .with_unit("%")
                .optional(),
        )?;
        container.add_field(Field::choice("activity", "Activity level", &activity))?;
        container.set_submit_label("Calculate BMR");
        container.add_info(
            "Note",
            vec![
                "These calculations are estimates. Actual BMR varies with body composition,"
                    .to_string(),
                "genetics, and medical conditions.".to_string(),
            ],
        );

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

    #[test]
    fn formulas_match_reference_values() {
        // 30 year old male, 80 kg, 180 cm
        let hb = harris_benedict(80.0, 180.0, 30.0, Sex::Male);
        assert!((hb - 1864.36).abs() < 0.01);
        let msj = mifflin_st_jeor(80.0, 180.0, 30.0, Sex::Male);
        assert!((msj - 1780.0).abs() < f64::EPSILON);
        let msj_f = mifflin_st_jeor(80.0, 180.0, 30.0, Sex::Female);
        assert!((msj_f - 1614.0).abs() < f64::EPSILON);
        let km = katch_mcardle(80.0, 20.0);
        assert!((km - 1752.4).abs() < 0.001);
    }

    #[test]
    fn activity_multipliers() {
        assert_eq!(activity_multiplier("sedentary"), Some(1.2));
        assert_eq!(activity_multiplier("very_active"), Some(1.9));
        assert_eq!(activity_multiplier("couch"), None);
    }

    #[test]
    fn submit_without_body_fat_averages_two_formulas() {
        let mut container = Container::new();
        BmrCalculator.render(&mut container).expect("bmr renders");
        container.set_value("age", "30");
        container.set_value("weight", "80");
        container.set_value("height", "180");
        container.submit();

        let Output::Lines(lines) = container.output() else {
            panic!("expected results, got {:?}", container.output());
        };
        assert!(lines.contains(&"Harris-Benedict: 1864 calories/day".to_string()));
        assert!(lines.contains(&"Mifflin-St Jeor: 1780 calories/day".to_string()));
        assert!(!lines.iter().any(|line| line.starts_with("Katch-McArdle")));
        // (1864.36 + 1780) / 2 = 1822.18; * 1.2 = 2186.616
        assert!(lines.contains(&"Average BMR: 1822 calories/day".to_string()));
        assert!(
            lines.contains(&"Total Daily Energy Expenditure (TDEE): 2187 calories/day".to_string())
        );
    }

    #[test]
    fn imperial_units_are_converted() {
        let mut container = Container::new();
        BmrCalculator.render(&mut container).expect("bmr renders");
        container.set_value("age", "30");
        container.set_value("weight", "176.37");
        container.select("weight_unit", "lbs");
        container.set_value("height", "70.866");
        container.select("height_unit", "inches");
        container.submit();

        let Output::Lines(lines) = container.output() else {
            panic!("expected results, got {:?}", container.output());
        };
        // 176.37 lb ~= 80 kg, 70.866 in ~= 180 cm
        assert!(lines.contains(&"Mifflin-St Jeor: 1780 calories/day".to_string()));
    }

    #[test]
    fn age_out_of_range_is_validation_message() {
        let mut container = Container::new();
        BmrCalculator.render(&mut container).expect("bmr renders");
        container.set_value("age", "9");
        container.set_value("weight", "80");
        container.set_value("height", "180");
        container.submit();
        assert_eq!(
            container.output(),
            &Output::Invalid("Please enter an age between 15 and 120".to_string())
        );
    }
}
