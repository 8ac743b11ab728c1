//! Non-interactive commands sharing the TUI's payload and row logic.

use anyhow::{Context, Result};

use crate::api::ApiService;
use crate::form::{validate_date, validate_title, CreateTaskPayload, FormError};
use crate::format::display_date;
use crate::models::{CreateTaskDto, Priority, TaskDto};
use crate::view::TaskRow;

pub async fn list_tasks(api: &ApiService, date_format: &str) -> Result<()> {
    let tasks = api.list_tasks().await.context("Failed to load tasks")?;
    if tasks.is_empty() {
        println!("No tasks");
        return Ok(());
    }
    for task in &tasks {
        let row = TaskRow::from_task(task, date_format);
        println!("{:>6}  {}", task.id, row.summary());
    }
    Ok(())
}

pub async fn add_task(
    api: &ApiService,
    title: &str,
    date: Option<&str>,
    description: Option<&str>,
    priority: Priority,
    date_format: &str,
) -> Result<()> {
    let payload = build_payload(title, date, description, priority)?;
    let task = api.create_task(&payload).await.context("Failed to create task")?;
    println!("Task {} created", task.id);
    print_task(&task, date_format);
    Ok(())
}

/// Validates command-line input the way the form does and builds the body of
/// `POST /tasks`.
pub fn build_payload(
    title: &str,
    date: Option<&str>,
    description: Option<&str>,
    priority: Priority,
) -> Result<CreateTaskDto, FormError> {
    validate_title(title)?;
    let date = date.unwrap_or_default();
    validate_date(date)?;

    Ok(CreateTaskPayload::new(title, priority)
        .date(date)
        .description(description.unwrap_or_default())
        .build())
}

pub async fn show_task(api: &ApiService, id: &str, date_format: &str) -> Result<()> {
    let task = api
        .get_task(id)
        .await
        .with_context(|| format!("Failed to load task {}", id))?;
    print_task(&task, date_format);
    Ok(())
}

fn print_task(task: &TaskDto, date_format: &str) {
    println!("Title:       {}", task.title);
    println!(
        "Priority:    {}",
        task.priority.map(|p| p.badge()).unwrap_or_else(|| "-".to_string())
    );
    println!(
        "Date:        {}",
        task.shown_date()
            .map(|d| display_date(d, date_format))
            .unwrap_or_else(|| "-".to_string())
    );
    println!("Status:      {}", if task.is_done { "Done" } else { "Open" });
    if let Some(description) = &task.description {
        println!("\n{}", description);
    }
}
