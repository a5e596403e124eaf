use chrono::{DateTime, Local};
use tracing::trace;

use crate::task::Task;

/// Mutually exclusive list filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Upcoming,
    Completed,
}

impl Filter {
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Upcoming, Filter::Completed];

    pub fn label(&self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Upcoming => "Upcoming",
            Filter::Completed => "Completed",
        }
    }
}

/// Derive the visible tasks, in collection order.
///
/// Search text only narrows the `All` filter; `Upcoming` and `Completed` ignore it.
/// `now` decides which reminders are still in the future.
#[tracing::instrument(level = "trace", skip(tasks, now), fields(total = tasks.len()))]
pub fn visible_tasks<'a>(
    tasks: &'a [Task],
    filter: Filter,
    search: &str,
    now: DateTime<Local>,
) -> Vec<&'a Task> {
    let needle = search.to_lowercase();
    let visible: Vec<&Task> = tasks
        .iter()
        .filter(|task| match filter {
            Filter::Upcoming => task.is_upcoming(now),
            Filter::Completed => task.completed,
            Filter::All => needle.is_empty() || task.matches_search(&needle),
        })
        .collect();
    trace!(visible = visible.len(), "derived visible tasks");
    visible
}

/// The task the details pane shows: the selected one while it still exists
/// anywhere in the collection, else the first visible task.
pub fn resolve_selection<'a>(
    tasks: &'a [Task],
    visible: &[&'a Task],
    selected_id: Option<&str>,
) -> Option<&'a Task> {
    selected_id
        .and_then(|id| tasks.iter().find(|t| t.id == id))
        .or_else(|| visible.first().copied())
}
