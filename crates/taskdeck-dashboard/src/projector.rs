/*
[INPUT]:  Task snapshot + ViewState (search term, page)
[OUTPUT]: Visible page of tasks, page count, aggregate statistics
[POS]:    View layer - pure projection, never touches the store
[UPDATE]: When changing filter/sort/pagination rules or stat cards
*/

use std::cmp::Ordering;

use taskdeck_adapter::{Task, TaskStatus};

pub const PAGE_SIZE: usize = 10;

/// Client-only view context; survives snapshot refreshes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    search_term: String,
    page: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            page: 1,
        }
    }
}

impl ViewState {
    pub fn new(search_term: impl Into<String>, page: usize) -> Self {
        Self {
            search_term: search_term.into(),
            page: page.max(1),
        }
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// A new search starts from the first page
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.page = 1;
    }

    pub fn next_page(&mut self, total_pages: usize) {
        if self.page < total_pages {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    pub fn go_to(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Pull the page back into `[1, max(1, total_pages)]`
    pub fn clamp(&mut self, total_pages: usize) {
        self.page = clamp_page(self.page, total_pages);
    }
}

/// Stat cards, computed over the full unfiltered collection
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TaskStats {
    pub total: usize,
    pub success_count: usize,
    pub failed_count: usize,
    /// PENDING + SCHEDULED
    pub upcoming_count: usize,
    pub running_count: usize,
    pub cancelled_count: usize,
    /// Percentage, rounded to one decimal place; 0.0 for an empty collection
    pub success_rate: f64,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut stats = TaskStats {
            total: tasks.len(),
            ..TaskStats::default()
        };

        for task in tasks {
            if task.status.is_upcoming() {
                stats.upcoming_count += 1;
                continue;
            }
            match task.status {
                TaskStatus::Success => stats.success_count += 1,
                TaskStatus::Failed => stats.failed_count += 1,
                TaskStatus::Running => stats.running_count += 1,
                TaskStatus::Cancelled => stats.cancelled_count += 1,
                TaskStatus::Pending | TaskStatus::Scheduled => {}
            }
        }

        if stats.total > 0 {
            let rate = stats.success_count as f64 / stats.total as f64 * 100.0;
            stats.success_rate = (rate * 10.0).round() / 10.0;
        }
        stats
    }

    /// Everything not covered by the success / failed / upcoming cards
    pub fn other_count(&self) -> usize {
        self.running_count + self.cancelled_count
    }

    pub fn success_rate_label(&self) -> String {
        format!("{:.1}%", self.success_rate)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// At most PAGE_SIZE tasks, newest first
    pub tasks: Vec<Task>,
    /// Effective page after clamping
    pub page: usize,
    pub total_pages: usize,
    pub filtered_count: usize,
    pub stats: TaskStats,
}

/// Filter, sort and paginate `tasks` for `view`
pub fn project(tasks: &[Task], view: &ViewState) -> Projection {
    let needle = view.search_term.to_lowercase();

    let mut filtered: Vec<&Task> = tasks
        .iter()
        .filter(|task| task.matches_search(&needle))
        .collect();
    filtered.sort_by(|a, b| newest_first(a, b));

    let filtered_count = filtered.len();
    let total_pages = filtered_count.div_ceil(PAGE_SIZE);
    let page = clamp_page(view.page, total_pages);

    let visible = filtered
        .into_iter()
        .skip((page - 1) * PAGE_SIZE)
        .take(PAGE_SIZE)
        .cloned()
        .collect();

    Projection {
        tasks: visible,
        page,
        total_pages,
        filtered_count,
        stats: TaskStats::from_tasks(tasks),
    }
}

// created_at descending, ties by id ascending
fn newest_first(a: &Task, b: &Task) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| a.id.cmp(&b.id))
}

fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}
