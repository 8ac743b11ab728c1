use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Task identifier as sent by the server. Some backends use numeric ids,
/// others strings; routing only ever needs the stringified form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Int(i64),
    Text(String),
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Int(id) => write!(f, "{}", id),
            TaskId::Text(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Med,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Med => "med",
            Priority::High => "high",
        }
    }

    /// Human label used by the priority selector.
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Med => "Medium",
            Priority::High => "High",
        }
    }

    pub fn badge(&self) -> String {
        self.as_str().to_uppercase()
    }

    pub fn next(self) -> Self {
        match self {
            Priority::Low => Priority::Med,
            Priority::Med => Priority::High,
            Priority::High => Priority::Low,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Priority::Low => Priority::High,
            Priority::Med => Priority::Low,
            Priority::High => Priority::Med,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
    pub id: TaskId,
    pub title: String,
    #[serde(
        default,
        deserialize_with = "lenient_priority",
        skip_serializing_if = "Option::is_none"
    )]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_done: bool,
}

impl TaskDto {
    /// The date to display, if any. Empty strings count as unset.
    pub fn shown_date(&self) -> Option<&str> {
        self.date.as_deref().filter(|d| !d.is_empty())
    }
}

/// Unknown or empty priorities read as unset so one odd row does not fail
/// the whole list.
fn lenient_priority<'de, D>(deserializer: D) -> Result<Option<Priority>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match value.as_str() {
        "low" => Some(Priority::Low),
        "med" => Some(Priority::Med),
        "high" => Some(Priority::High),
        other => {
            if !other.is_empty() {
                log::debug!("ignoring unknown priority '{}'", other);
            }
            None
        }
    }))
}

/// Body of `POST /tasks`. Absent optional fields are omitted from the JSON,
/// never sent as empty strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskDto {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: Priority,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn task_dto_accepts_numeric_and_string_ids() {
        let numeric: TaskDto =
            serde_json::from_value(json!({"id": 1, "title": "Buy milk", "isDone": false})).unwrap();
        assert_eq!(numeric.id, TaskId::Int(1));
        assert_eq!(numeric.id.to_string(), "1");

        let text: TaskDto =
            serde_json::from_value(json!({"id": "a7f", "title": "Buy milk"})).unwrap();
        assert_eq!(text.id.to_string(), "a7f");
        assert!(!text.is_done);
    }

    #[test]
    fn task_dto_reads_optional_fields() {
        let task: TaskDto = serde_json::from_value(json!({
            "id": 2,
            "title": "Pay rent",
            "priority": "high",
            "date": "2024-01-05",
            "isDone": true
        }))
        .unwrap();

        assert_eq!(task.priority, Some(Priority::High));
        assert_eq!(task.date.as_deref(), Some("2024-01-05"));
        assert_eq!(task.description, None);
        assert!(task.is_done);
    }

    #[test]
    fn unknown_or_empty_priority_reads_as_unset() {
        let tasks: Vec<TaskDto> = serde_json::from_value(json!([
            {"id": 1, "title": "Buy milk", "priority": ""},
            {"id": 2, "title": "Pay rent", "priority": "urgent"},
            {"id": 3, "title": "Call mom", "priority": null},
            {"id": 4, "title": "Walk dog", "priority": "low"}
        ]))
        .unwrap();

        let priorities: Vec<_> = tasks.iter().map(|t| t.priority).collect();
        assert_eq!(priorities, vec![None, None, None, Some(Priority::Low)]);
    }

    #[test]
    fn empty_date_is_not_shown() {
        let task: TaskDto =
            serde_json::from_value(json!({"id": 1, "title": "Buy milk", "date": ""})).unwrap();
        assert_eq!(task.shown_date(), None);
    }

    #[test]
    fn create_payload_omits_absent_fields() {
        let payload = CreateTaskDto {
            title: "Water plants".to_string(),
            date: None,
            description: None,
            priority: Priority::Med,
        };

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"title": "Water plants", "priority": "med"})
        );
    }

    #[test]
    fn priority_cycles_and_badges() {
        assert_eq!(Priority::default(), Priority::Med);
        assert_eq!(Priority::High.next(), Priority::Low);
        assert_eq!(Priority::Low.previous(), Priority::High);
        assert_eq!(Priority::High.badge(), "HIGH");
    }
}
