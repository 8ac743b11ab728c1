//! Create-task form state, validation and payload building.

use chrono::NaiveDate;
use thiserror::Error;

use crate::input::InputField;
use crate::models::{CreateTaskDto, Priority};

pub const TITLE_MIN_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Title is required")]
    TitleMissing,
    #[error("Title must be at least {min} characters (currently {actual})")]
    TitleTooShort { min: usize, actual: usize },
    #[error("Date must be a valid YYYY-MM-DD date, got '{0}'")]
    InvalidDate(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Title,
    Date,
    Description,
    Priority,
    Submit,
}

impl FormField {
    pub fn next(self) -> Option<Self> {
        match self {
            FormField::Title => Some(FormField::Date),
            FormField::Date => Some(FormField::Description),
            FormField::Description => Some(FormField::Priority),
            FormField::Priority => Some(FormField::Submit),
            FormField::Submit => None,
        }
    }

    pub fn previous(self) -> Option<Self> {
        match self {
            FormField::Title => None,
            FormField::Date => Some(FormField::Title),
            FormField::Description => Some(FormField::Date),
            FormField::Priority => Some(FormField::Description),
            FormField::Submit => Some(FormField::Priority),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskForm {
    pub title: InputField,
    pub date: InputField,
    pub description: InputField,
    pub priority: Priority,
}

impl TaskForm {
    pub fn field_mut(&mut self, field: FormField) -> Option<&mut InputField> {
        match field {
            FormField::Title => Some(&mut self.title),
            FormField::Date => Some(&mut self.date),
            FormField::Description => Some(&mut self.description),
            FormField::Priority | FormField::Submit => None,
        }
    }

    pub fn validate(&self) -> Result<(), FormError> {
        validate_title(self.title.value())?;
        validate_date(self.date.value())?;
        Ok(())
    }

    /// Validates and builds the create payload from the current field values.
    pub fn to_payload(&self) -> Result<CreateTaskDto, FormError> {
        self.validate()?;
        Ok(CreateTaskPayload::new(self.title.value(), self.priority)
            .date(self.date.value())
            .description(self.description.value())
            .build())
    }

    /// Reset applied after a successful create. Only title and date are
    /// cleared; description and priority carry over to the next task.
    pub fn reset_after_create(&mut self) {
        self.title.clear();
        self.date.clear();
    }
}

pub fn validate_title(title: &str) -> Result<(), FormError> {
    let actual = title.chars().count();
    if actual == 0 {
        return Err(FormError::TitleMissing);
    }
    if actual < TITLE_MIN_LEN {
        return Err(FormError::TitleTooShort {
            min: TITLE_MIN_LEN,
            actual,
        });
    }
    Ok(())
}

pub fn validate_date(date: &str) -> Result<(), FormError> {
    if date.is_empty() {
        return Ok(());
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| FormError::InvalidDate(date.to_string()))
}

/// Builder for [`CreateTaskDto`]. Empty optional values are dropped so they
/// never reach the wire as `""`.
#[derive(Debug, Clone)]
pub struct CreateTaskPayload {
    title: String,
    priority: Priority,
    date: Option<String>,
    description: Option<String>,
}

impl CreateTaskPayload {
    pub fn new(title: impl Into<String>, priority: Priority) -> Self {
        CreateTaskPayload {
            title: title.into(),
            priority,
            date: None,
            description: None,
        }
    }

    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = non_empty(date.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = non_empty(description.into());
        self
    }

    pub fn build(self) -> CreateTaskDto {
        CreateTaskDto {
            title: self.title,
            date: self.date,
            description: self.description,
            priority: self.priority,
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn form(title: &str, date: &str, description: &str, priority: Priority) -> TaskForm {
        TaskForm {
            title: InputField::new(title),
            date: InputField::new(date),
            description: InputField::new(description),
            priority,
        }
    }

    #[test]
    fn short_title_is_rejected() {
        let result = form("ab", "", "", Priority::Med).to_payload();
        assert_eq!(result, Err(FormError::TitleTooShort { min: 3, actual: 2 }));
        assert_eq!(
            form("", "", "", Priority::Med).to_payload(),
            Err(FormError::TitleMissing)
        );
    }

    #[test]
    fn empty_optionals_are_omitted_from_payload() {
        let payload = form("Buy milk", "", "", Priority::Med).to_payload().unwrap();
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"title": "Buy milk", "priority": "med"})
        );
    }

    #[test]
    fn filled_optionals_are_sent() {
        let payload = form("Pay rent", "2024-01-05", "before noon", Priority::High)
            .to_payload()
            .unwrap();
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "title": "Pay rent",
                "date": "2024-01-05",
                "description": "before noon",
                "priority": "high"
            })
        );
    }

    #[test]
    fn malformed_date_is_rejected() {
        assert_eq!(
            form("Pay rent", "2024-13-40", "", Priority::Low).to_payload(),
            Err(FormError::InvalidDate("2024-13-40".to_string()))
        );
    }

    #[test]
    fn reset_keeps_description_and_priority() {
        let mut form = form("Pay rent", "2024-01-05", "monthly", Priority::High);
        form.reset_after_create();

        assert!(form.title.is_empty());
        assert!(form.date.is_empty());
        assert_eq!(form.description.value(), "monthly");
        assert_eq!(form.priority, Priority::High);
    }

    #[test]
    fn field_order_stops_at_edges() {
        assert_eq!(FormField::Title.previous(), None);
        assert_eq!(FormField::Priority.next(), Some(FormField::Submit));
        assert_eq!(FormField::Submit.next(), None);
    }
}
