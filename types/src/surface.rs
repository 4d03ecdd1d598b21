//! Render surface handed to a calculator.
//!
//! A [`Container`] is the subtree a calculator owns while it is shown: its
//! heading and intro text, form fields, static info sections, a result area,
//! and the handler that reacts to input. A new container is built for every
//! render, so nothing one calculator leaves behind can reach the next.
//!
//! Validation failures raised by the handler are caught here and displayed
//! in the result area; they never propagate to the shell.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::{RenderError, ValidationError};

/// Characters accepted by numeric fields.
fn is_numeric_input(c: char) -> bool {
    c.is_ascii_digit() || c == '.' || c == '-'
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Number {
        unit: Option<String>,
        required: bool,
    },
    Choice {
        options: Vec<ChoiceOption>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Selected(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    key: String,
    label: String,
    kind: FieldKind,
    value: FieldValue,
}

impl Field {
    /// A required numeric input.
    pub fn number(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind: FieldKind::Number {
                unit: None,
                required: true,
            },
            value: FieldValue::Text(String::new()),
        }
    }

    /// A selection among fixed options; the first option is selected.
    pub fn choice(key: impl Into<String>, label: impl Into<String>, options: &[(&str, &str)]) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind: FieldKind::Choice {
                options: options
                    .iter()
                    .map(|(value, label)| ChoiceOption {
                        value: (*value).to_string(),
                        label: (*label).to_string(),
                    })
                    .collect(),
            },
            value: FieldValue::Selected(0),
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        if let FieldKind::Number { unit: slot, .. } = &mut self.kind {
            *slot = Some(unit.into());
        }
        self
    }

    pub fn optional(mut self) -> Self {
        if let FieldKind::Number { required, .. } = &mut self.kind {
            *required = false;
        }
        self
    }

    /// Preselect an option by index. Out-of-range indices are ignored.
    pub fn selected(mut self, index: usize) -> Self {
        if let FieldKind::Choice { options } = &self.kind
            && index < options.len()
        {
            self.value = FieldValue::Selected(index);
        }
        self
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    #[must_use]
    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    /// Text as displayed: raw input for numbers, option label for choices.
    #[must_use]
    pub fn display_value(&self) -> &str {
        match (&self.kind, &self.value) {
            (_, FieldValue::Text(text)) => text,
            (FieldKind::Choice { options }, FieldValue::Selected(index)) => options
                .get(*index)
                .map_or("", |option| option.label.as_str()),
            (FieldKind::Number { .. }, FieldValue::Selected(_)) => "",
        }
    }

    #[must_use]
    pub fn is_choice(&self) -> bool {
        matches!(self.kind, FieldKind::Choice { .. })
    }
}

/// The field set as seen by a form handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    fields: Vec<Field>,
}

impl FormFields {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.key == key)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|field| field.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parsed numeric value; `Ok(None)` when the field is blank.
    pub fn number(&self, key: &str) -> Result<Option<f64>, ValidationError> {
        let field = self
            .get(key)
            .ok_or_else(|| ValidationError::new(format!("Unknown field: {key}")))?;
        let FieldValue::Text(text) = &field.value else {
            return Err(ValidationError::new(format!("{} is not numeric", field.label)));
        };
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Some(value)),
            _ => Err(ValidationError::new(format!(
                "Please enter a valid {}",
                field.label.to_lowercase()
            ))),
        }
    }

    /// Parsed numeric value that must be present.
    pub fn require(&self, key: &str) -> Result<f64, ValidationError> {
        match self.number(key)? {
            Some(value) => Ok(value),
            None => {
                let label = self.get(key).map_or(key, Field::label);
                Err(ValidationError::new(format!(
                    "Please enter a value for {}",
                    label.to_lowercase()
                )))
            }
        }
    }

    /// Value of the selected option of a choice field.
    pub fn choice(&self, key: &str) -> Result<&str, ValidationError> {
        let field = self
            .get(key)
            .ok_or_else(|| ValidationError::new(format!("Unknown field: {key}")))?;
        match (&field.kind, &field.value) {
            (FieldKind::Choice { options }, FieldValue::Selected(index)) => options
                .get(*index)
                .map(|option| option.value.as_str())
                .ok_or_else(|| ValidationError::new(format!("No {} selected", field.label))),
            _ => Err(ValidationError::new(format!("{} is not a choice", field.label))),
        }
    }

    /// Overwrite a numeric field's text. Unknown keys and choice fields are ignored.
    pub fn set_text(&mut self, key: &str, text: impl Into<String>) {
        if let Some(field) = self.get_mut(key)
            && matches!(field.kind, FieldKind::Number { .. })
        {
            field.value = FieldValue::Text(text.into());
        }
    }

    pub fn clear(&mut self, key: &str) {
        self.set_text(key, String::new());
    }

    /// Select a choice option by value. Returns false if no such option exists.
    pub fn select(&mut self, key: &str, value: &str) -> bool {
        let Some(field) = self.get_mut(key) else {
            return false;
        };
        let FieldKind::Choice { options } = &field.kind else {
            return false;
        };
        match options.iter().position(|option| option.value == value) {
            Some(index) => {
                field.value = FieldValue::Selected(index);
                true
            }
            None => false,
        }
    }
}

/// What the handler is reacting to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// The field with this key was edited.
    Input(String),
    Submit,
}

/// `Ok(Some(lines))` replaces the result area, `Ok(None)` keeps it (clearing
/// any validation message), `Err` shows the validation message.
pub type HandlerResult = Result<Option<Vec<String>>, ValidationError>;

type Handler = Box<dyn FnMut(&FormEvent, &mut FormFields) -> HandlerResult + Send>;

/// Contents of the result area.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Output {
    #[default]
    Empty,
    Lines(Vec<String>),
    Invalid(String),
}

/// A titled block of static reference text (potency tables, staging ranges).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoSection {
    pub title: String,
    pub lines: Vec<String>,
}

#[derive(Default)]
pub struct Container {
    heading: String,
    intro: Vec<String>,
    fields: FormFields,
    submit_label: Option<String>,
    info: Vec<InfoSection>,
    output: Output,
    focus: usize,
    handler: Option<Handler>,
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("heading", &self.heading)
            .field("fields", &self.fields.len())
            .field("output", &self.output)
            .field("focus", &self.focus)
            .field("has_handler", &self.handler.is_some())
            .finish_non_exhaustive()
    }
}

impl Container {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Building (called from `Calculator::render`)
    // ------------------------------------------------------------------

    pub fn set_heading(&mut self, heading: impl Into<String>) {
        self.heading = heading.into();
    }

    pub fn push_intro(&mut self, paragraph: impl Into<String>) {
        self.intro.push(paragraph.into());
    }

    pub fn add_field(&mut self, field: Field) -> Result<(), RenderError> {
        if self.fields.get(&field.key).is_some() {
            return Err(RenderError::DuplicateField { key: field.key });
        }
        if let FieldKind::Choice { options } = &field.kind
            && options.is_empty()
        {
            return Err(RenderError::EmptyChoice { key: field.key });
        }
        self.fields.fields.push(field);
        Ok(())
    }

    /// Forms without a submit label recompute on every input.
    pub fn set_submit_label(&mut self, label: impl Into<String>) {
        self.submit_label = Some(label.into());
    }

    pub fn add_info(&mut self, title: impl Into<String>, lines: Vec<String>) {
        self.info.push(InfoSection {
            title: title.into(),
            lines,
        });
    }

    pub fn set_output(&mut self, output: Output) {
        self.output = output;
    }

    pub fn set_handler<F>(&mut self, handler: F)
    where
        F: FnMut(&FormEvent, &mut FormFields) -> HandlerResult + Send + 'static,
    {
        self.handler = Some(Box::new(handler));
    }

    // ------------------------------------------------------------------
    // Reading (renderers)
    // ------------------------------------------------------------------

    #[must_use]
    pub fn heading(&self) -> &str {
        &self.heading
    }

    #[must_use]
    pub fn intro(&self) -> &[String] {
        &self.intro
    }

    #[must_use]
    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    #[must_use]
    pub fn submit_label(&self) -> Option<&str> {
        self.submit_label.as_deref()
    }

    #[must_use]
    pub fn info(&self) -> &[InfoSection] {
        &self.info
    }

    #[must_use]
    pub fn output(&self) -> &Output {
        &self.output
    }

    #[must_use]
    pub fn focus(&self) -> usize {
        self.focus
    }

    #[must_use]
    pub fn focused_field(&self) -> Option<&Field> {
        self.fields.fields.get(self.focus)
    }

    // ------------------------------------------------------------------
    // Interaction
    // ------------------------------------------------------------------

    pub fn focus_next(&mut self) {
        let len = self.fields.len();
        if len > 0 {
            self.focus = (self.focus + 1) % len;
        }
    }

    pub fn focus_prev(&mut self) {
        let len = self.fields.len();
        if len > 0 {
            self.focus = (self.focus + len - 1) % len;
        }
    }

    /// Type into the focused numeric field. Non-numeric characters are dropped.
    pub fn insert_char(&mut self, c: char) {
        if !is_numeric_input(c) {
            return;
        }
        let Some(field) = self.fields.fields.get_mut(self.focus) else {
            return;
        };
        let FieldValue::Text(text) = &mut field.value else {
            return;
        };
        text.push(c);
        let key = field.key.clone();
        self.fire(&FormEvent::Input(key));
    }

    pub fn backspace(&mut self) {
        let Some(field) = self.fields.fields.get_mut(self.focus) else {
            return;
        };
        let FieldValue::Text(text) = &mut field.value else {
            return;
        };
        if text.pop().is_none() {
            return;
        }
        let key = field.key.clone();
        self.fire(&FormEvent::Input(key));
    }

    /// Move the focused choice field to the next (or previous) option, wrapping.
    pub fn cycle_choice(&mut self, forward: bool) {
        let Some(field) = self.fields.fields.get_mut(self.focus) else {
            return;
        };
        let (FieldKind::Choice { options }, FieldValue::Selected(index)) =
            (&field.kind, &mut field.value)
        else {
            return;
        };
        let len = options.len();
        *index = if forward {
            (*index + 1) % len
        } else {
            (*index + len - 1) % len
        };
        let key = field.key.clone();
        self.fire(&FormEvent::Input(key));
    }

    /// Replace a numeric field's text as if typed, firing one input event.
    pub fn set_value(&mut self, key: &str, text: &str) {
        if self.fields.get(key).is_none() {
            return;
        }
        self.fields.set_text(key, text);
        self.fire(&FormEvent::Input(key.to_string()));
    }

    /// Select a choice option by value, firing one input event.
    pub fn select(&mut self, key: &str, value: &str) {
        if self.fields.select(key, value) {
            self.fire(&FormEvent::Input(key.to_string()));
        }
    }

    pub fn submit(&mut self) {
        self.fire(&FormEvent::Submit);
    }

    /// Run the handler. A handler that panics is detached and its failure is
    /// shown in the result area; later events are ignored.
    fn fire(&mut self, event: &FormEvent) {
        let Some(handler) = self.handler.as_mut() else {
            return;
        };
        let fields = &mut self.fields;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler(event, fields)));
        match outcome {
            Ok(Ok(Some(lines))) => self.output = Output::Lines(lines),
            Ok(Ok(None)) => {
                if matches!(self.output, Output::Invalid(_)) {
                    self.output = Output::Empty;
                }
            }
            Ok(Err(err)) => self.output = Output::Invalid(err.message().to_string()),
            Err(payload) => {
                self.handler = None;
                self.output = Output::Invalid(format!(
                    "Calculation failed: {}",
                    panic_message(payload.as_ref())
                ));
            }
        }
    }

    /// Plain-text rendering of the whole subtree.
    ///
    /// Two containers with equal text are equivalent renders.
    #[must_use]
    pub fn text_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if !self.heading.is_empty() {
            lines.push(self.heading.clone());
        }
        lines.extend(self.intro.iter().cloned());
        for field in self.fields.iter() {
            let unit = match field.kind() {
                FieldKind::Number {
                    unit: Some(unit), ..
                } => format!(" {unit}"),
                _ => String::new(),
            };
            lines.push(format!(
                "{}: [{}]{}",
                field.label(),
                field.display_value(),
                unit
            ));
        }
        if let Some(label) = &self.submit_label {
            lines.push(format!("<{label}>"));
        }
        match &self.output {
            Output::Empty => {}
            Output::Lines(result) => lines.extend(result.iter().cloned()),
            Output::Invalid(message) => lines.push(format!("! {message}")),
        }
        for section in &self.info {
            lines.push(section.title.clone());
            lines.extend(section.lines.iter().map(|line| format!("  {line}")));
        }
        lines
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
