//! View state for the task list and task detail screens.
//!
//! Views never perform IO. They hand back [`Effect`]s for the caller to run
//! and are fed the results through their `*_loaded` / `*_created` methods.

use crate::form::{FormError, TaskForm};
use crate::format::display_date;
use crate::models::{CreateTaskDto, TaskDto};
use crate::request::{Generation, Mutation, Query, RequestState};
use crate::routes::Route;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchTasks(Generation),
    CreateTask(CreateTaskDto),
    FetchTask {
        id: String,
        view: ViewId,
        generation: Generation,
    },
}

/// Identifies one opened detail view, so responses for an earlier visit to
/// the same task are not applied to a later one.
pub type ViewId = u64;

/// One rendered line of the task list.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRow {
    pub link: Route,
    pub title: String,
    pub badge: Option<String>,
    pub date: Option<String>,
    pub done: bool,
}

impl TaskRow {
    pub fn from_task(task: &TaskDto, date_format: &str) -> Self {
        TaskRow {
            link: Route::task(&task.id),
            title: task.title.clone(),
            badge: task.priority.map(|p| p.badge()),
            date: task.shown_date().map(|d| display_date(d, date_format)),
            done: task.is_done,
        }
    }

    /// Plain-text form used by the `list` command.
    pub fn summary(&self) -> String {
        let mut line = self.title.clone();
        if let Some(badge) = &self.badge {
            line.push_str(&format!(" [{}]", badge));
        }
        if let Some(date) = &self.date {
            line.push_str(&format!(" {}", date));
        }
        if self.done {
            line.push_str(" [done]");
        }
        line
    }
}

#[derive(Debug, Default)]
pub struct TaskListView {
    pub form: TaskForm,
    pub form_error: Option<FormError>,
    tasks: Query<Vec<TaskDto>>,
    create: Mutation<TaskDto>,
}

impl TaskListView {
    pub fn mount(&mut self) -> Effect {
        self.refetch()
    }

    pub fn refetch(&mut self) -> Effect {
        Effect::FetchTasks(self.tasks.begin())
    }

    /// Validates the form and, if valid and no create is in flight, returns
    /// the create request to run.
    pub fn submit(&mut self) -> Option<Effect> {
        match self.form.to_payload() {
            Ok(payload) => {
                self.form_error = None;
                if !self.create.begin() {
                    log::debug!("submit ignored: create already pending");
                    return None;
                }
                log::info!("creating task '{}'", payload.title);
                Some(Effect::CreateTask(payload))
            }
            Err(err) => {
                log::debug!("form rejected: {}", err);
                self.form_error = Some(err);
                None
            }
        }
    }

    pub fn tasks_loaded(&mut self, generation: Generation, result: Result<Vec<TaskDto>, String>) {
        if let Err(message) = &result {
            log::warn!("loading tasks failed: {}", message);
        }
        self.tasks.resolve(generation, result);
    }

    /// On success clears title and date and asks for a refetch. Failures
    /// leave the form untouched.
    pub fn task_created(&mut self, result: Result<TaskDto, String>) -> Option<Effect> {
        let created = result.is_ok();
        match &result {
            Ok(task) => log::info!("created task {}", task.id),
            Err(message) => log::warn!("creating task failed: {}", message),
        }
        self.create.resolve(result);

        if created {
            self.form.reset_after_create();
            Some(self.refetch())
        } else {
            None
        }
    }

    pub fn tasks(&self) -> &[TaskDto] {
        self.tasks.data().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn error(&self) -> Option<&str> {
        self.tasks.error()
    }

    pub fn is_loading(&self) -> bool {
        self.tasks.is_loading()
    }

    pub fn is_fetching(&self) -> bool {
        self.tasks.is_fetching()
    }

    pub fn tasks_state(&self) -> RequestState<&Vec<TaskDto>> {
        self.tasks.state()
    }

    pub fn create_state(&self) -> &RequestState<TaskDto> {
        self.create.state()
    }

    pub fn submit_enabled(&self) -> bool {
        !self.create.is_pending()
    }

    pub fn rows(&self, date_format: &str) -> Vec<TaskRow> {
        self.tasks()
            .iter()
            .map(|task| TaskRow::from_task(task, date_format))
            .collect()
    }
}

#[derive(Debug)]
pub struct TaskDetailView {
    pub id: String,
    pub view: ViewId,
    task: Query<TaskDto>,
}

impl TaskDetailView {
    pub fn new(id: impl Into<String>, view: ViewId) -> Self {
        TaskDetailView {
            id: id.into(),
            view,
            task: Query::default(),
        }
    }

    pub fn mount(&mut self) -> Effect {
        Effect::FetchTask {
            id: self.id.clone(),
            view: self.view,
            generation: self.task.begin(),
        }
    }

    pub fn task_loaded(&mut self, generation: Generation, result: Result<TaskDto, String>) {
        if let Err(message) = &result {
            log::warn!("loading task {} failed: {}", self.id, message);
        }
        self.task.resolve(generation, result);
    }

    pub fn task(&self) -> Option<&TaskDto> {
        self.task.data()
    }

    pub fn error(&self) -> Option<&str> {
        self.task.error()
    }

    pub fn is_loading(&self) -> bool {
        self.task.is_loading()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputField;
    use crate::models::{Priority, TaskId};
    use pretty_assertions::assert_eq;

    const FORMAT: &str = "%-m/%-d/%Y";

    fn buy_milk() -> TaskDto {
        TaskDto {
            id: TaskId::Int(1),
            title: "Buy milk".to_string(),
            priority: None,
            date: None,
            description: None,
            is_done: false,
        }
    }

    fn pay_rent() -> TaskDto {
        TaskDto {
            id: TaskId::Int(2),
            title: "Pay rent".to_string(),
            priority: Some(Priority::High),
            date: Some("2024-01-05".to_string()),
            description: None,
            is_done: true,
        }
    }

    fn loaded(tasks: Vec<TaskDto>) -> TaskListView {
        let mut view = TaskListView::default();
        let Effect::FetchTasks(generation) = view.mount() else {
            panic!("mount should fetch tasks");
        };
        view.tasks_loaded(generation, Ok(tasks));
        view
    }

    fn fill(view: &mut TaskListView, title: &str, date: &str, description: &str) {
        view.form.title = InputField::new(title);
        view.form.date = InputField::new(date);
        view.form.description = InputField::new(description);
    }

    #[test]
    fn mount_starts_loading_with_empty_tasks() {
        let mut view = TaskListView::default();
        assert_eq!(view.mount(), Effect::FetchTasks(1));
        assert!(view.is_loading());
        assert!(view.tasks().is_empty());
        assert_eq!(view.error(), None);
    }

    #[test]
    fn plain_task_row_has_no_badge_or_date() {
        let view = loaded(vec![buy_milk()]);
        assert_eq!(
            view.rows(FORMAT),
            vec![TaskRow {
                link: Route::TaskDetail { id: "1".to_string() },
                title: "Buy milk".to_string(),
                badge: None,
                date: None,
                done: false,
            }]
        );
    }

    #[test]
    fn done_task_row_has_badge_and_date() {
        let view = loaded(vec![pay_rent()]);
        let row = &view.rows(FORMAT)[0];
        assert!(row.done);
        assert_eq!(row.badge.as_deref(), Some("HIGH"));
        assert_eq!(row.date.as_deref(), Some("1/5/2024"));
        assert_eq!(row.link.path(), "/example/tasks/2");
        assert_eq!(row.summary(), "Pay rent [HIGH] 1/5/2024 [done]");
    }

    #[test]
    fn empty_date_renders_no_date() {
        let mut milk = buy_milk();
        milk.date = Some(String::new());
        let view = loaded(vec![milk]);
        assert_eq!(view.rows(FORMAT)[0].date, None);
    }

    #[test]
    fn short_title_issues_no_request() {
        let mut view = loaded(vec![]);
        fill(&mut view, "ab", "", "");
        assert_eq!(view.submit(), None);
        assert!(matches!(view.form_error, Some(FormError::TitleTooShort { .. })));
        assert!(view.submit_enabled());
    }

    #[test]
    fn submit_omits_empty_optionals_and_disables_control() {
        let mut view = loaded(vec![]);
        fill(&mut view, "Buy milk", "", "");

        let Some(Effect::CreateTask(payload)) = view.submit() else {
            panic!("valid form should create");
        };
        assert_eq!(payload.date, None);
        assert_eq!(payload.description, None);
        assert_eq!(payload.priority, Priority::Med);

        assert!(!view.submit_enabled());
        assert!(view.create_state().is_loading());
        assert_eq!(view.submit(), None);
    }

    #[test]
    fn second_submit_while_pending_sends_nothing() {
        let mut view = loaded(vec![]);
        fill(&mut view, "Buy milk", "", "");
        assert!(matches!(view.submit(), Some(Effect::CreateTask(_))));

        fill(&mut view, "Pay rent", "", "");
        assert_eq!(view.submit(), None);
        assert!(view.create_state().is_loading());
        assert_eq!(view.form_error, None);

        view.task_created(Ok(buy_milk()));
        fill(&mut view, "Pay rent", "", "");
        assert!(matches!(view.submit(), Some(Effect::CreateTask(_))));
    }

    #[test]
    fn successful_create_resets_title_and_date_and_refetches() {
        let mut view = loaded(vec![]);
        fill(&mut view, "Pay rent", "2024-01-05", "monthly");
        view.form.priority = Priority::High;
        view.submit();

        let next = view.task_created(Ok(pay_rent()));
        assert_eq!(next, Some(Effect::FetchTasks(2)));

        assert_eq!(view.form.title.value(), "");
        assert_eq!(view.form.date.value(), "");
        assert_eq!(view.form.description.value(), "monthly");
        assert_eq!(view.form.priority, Priority::High);
        assert!(view.submit_enabled());
    }

    #[test]
    fn failed_create_keeps_form_silently() {
        let mut view = loaded(vec![buy_milk()]);
        fill(&mut view, "Pay rent", "2024-01-05", "");
        view.submit();

        assert_eq!(view.task_created(Err("500 Internal Server Error".to_string())), None);
        assert_eq!(view.form.title.value(), "Pay rent");
        assert_eq!(view.form.date.value(), "2024-01-05");
        assert_eq!(view.error(), None);
        assert_eq!(view.form_error, None);
        assert!(view.submit_enabled());
    }

    #[test]
    fn fetch_error_coexists_with_stale_tasks() {
        let mut view = loaded(vec![buy_milk()]);
        let Effect::FetchTasks(generation) = view.refetch() else {
            panic!("refetch should fetch tasks");
        };
        view.tasks_loaded(generation, Err("Network failure".to_string()));

        assert_eq!(view.error(), Some("Network failure"));
        assert_eq!(view.tasks().len(), 1);
        assert!(!view.is_loading());
    }

    #[test]
    fn detail_view_tracks_single_task() {
        let mut detail = TaskDetailView::new("2", 7);
        let Effect::FetchTask { id, view, generation } = detail.mount() else {
            panic!("detail should fetch its task");
        };
        assert_eq!(id, "2");
        assert_eq!(view, 7);
        assert!(detail.is_loading());

        detail.task_loaded(generation, Ok(pay_rent()));
        assert_eq!(detail.task().map(|t| t.title.as_str()), Some("Pay rent"));
    }
}
