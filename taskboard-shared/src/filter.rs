/// Task filter predicates
///
/// A list request carries up to four optional parameters. Each present
/// parameter becomes one [`Predicate`]; a [`TaskFilter`] is the conjunction of
/// all of them. No parameters means no predicates, which matches every task.
///
/// | parameter   | predicate                                    |
/// |-------------|----------------------------------------------|
/// | `titleCont` | case-insensitive substring of the task title |
/// | `assigneeId`| assignee id equals                           |
/// | `status`    | status slug equals                           |
/// | `labelId`   | label id is in the task's label set          |
///
/// Predicates are plain values. The in-memory store evaluates them with
/// [`TaskFilter::matches`]; the PostgreSQL store translates each variant into
/// a `WHERE` fragment.
///
/// # Example
///
/// ```
/// use taskboard_shared::filter::{Predicate, TaskFilter, TaskFilterParams};
///
/// let params = TaskFilterParams {
///     title_cont: Some("bug".to_string()),
///     status: Some("draft".to_string()),
///     ..Default::default()
/// };
///
/// let filter = TaskFilter::build(&params);
/// assert_eq!(filter.predicates().len(), 2);
/// assert!(TaskFilter::build(&TaskFilterParams::default()).is_empty());
/// ```

use crate::models::task::Task;
use serde::{Deserialize, Serialize};

/// Optional filter parameters of `GET /api/tasks`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFilterParams {
    pub title_cont: Option<String>,
    pub assignee_id: Option<i64>,
    pub status: Option<String>,
    pub label_id: Option<i64>,
}

/// A single constraint on a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Title contains the needle, ignoring case
    TitleContains(String),

    /// Task is assigned to this user
    AssigneeIs(i64),

    /// Task status has this slug
    StatusIs(String),

    /// Task carries this label
    HasLabel(i64),
}

impl Predicate {
    /// Evaluates the predicate against one task
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Predicate::TitleContains(needle) => task
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            Predicate::AssigneeIs(user_id) => task.assignee_id == Some(*user_id),
            Predicate::StatusIs(slug) => task.status_slug == *slug,
            Predicate::HasLabel(label_id) => task.has_label(*label_id),
        }
    }
}

/// Conjunction of predicates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    predicates: Vec<Predicate>,
}

impl TaskFilter {
    /// Filter without constraints
    pub fn all() -> Self {
        Self::default()
    }

    /// Builds the filter from request parameters; absent parameters add nothing
    pub fn build(params: &TaskFilterParams) -> Self {
        let mut filter = Self::all();

        if let Some(needle) = &params.title_cont {
            filter = filter.and(Predicate::TitleContains(needle.clone()));
        }
        if let Some(user_id) = params.assignee_id {
            filter = filter.and(Predicate::AssigneeIs(user_id));
        }
        if let Some(slug) = &params.status {
            filter = filter.and(Predicate::StatusIs(slug.clone()));
        }
        if let Some(label_id) = params.label_id {
            filter = filter.and(Predicate::HasLabel(label_id));
        }

        filter
    }

    /// Adds a predicate to the conjunction
    pub fn and(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// True if every predicate holds
    pub fn matches(&self, task: &Task) -> bool {
        self.predicates.iter().all(|p| p.matches(task))
    }

    /// Keeps the matching tasks, preserving order
    pub fn apply<I>(&self, tasks: I) -> Vec<Task>
    where
        I: IntoIterator<Item = Task>,
    {
        tasks.into_iter().filter(|t| self.matches(t)).collect()
    }
}

impl From<&TaskFilterParams> for TaskFilter {
    fn from(params: &TaskFilterParams) -> Self {
        TaskFilter::build(params)
    }
}
