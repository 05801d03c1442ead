// Query filtering for task listings

use crate::task::{Priority, Status, Task};

/// Filter for listing tasks.
///
/// An absent field means no restriction on that field, so the default value
/// matches everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskFilter {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
}

impl TaskFilter {
    /// Match everything.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        if let Some(status) = self.status
            && task.status != status
        {
            return false;
        }
        if let Some(priority) = self.priority
            && task.priority != priority
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn task(priority: Priority, status: Status) -> Task {
        Task {
            id: 1,
            description: "t".to_string(),
            priority,
            status,
            created_at: Utc::now(),
            completed_at: None,
            due_date: None,
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = TaskFilter::all();
        assert!(filter.matches(&task(Priority::Low, Status::Pending)));
        assert!(filter.matches(&task(Priority::High, Status::Completed)));
    }

    #[test]
    fn test_status_filter() {
        let filter = TaskFilter::with_status(Status::Completed);
        assert!(filter.matches(&task(Priority::Low, Status::Completed)));
        assert!(!filter.matches(&task(Priority::Low, Status::Pending)));
    }

    #[test]
    fn test_priority_filter() {
        let filter = TaskFilter {
            priority: Some(Priority::High),
            ..TaskFilter::default()
        };
        assert!(filter.matches(&task(Priority::High, Status::Pending)));
        assert!(!filter.matches(&task(Priority::Medium, Status::Pending)));
    }

    #[test]
    fn test_combined_filter() {
        let filter = TaskFilter {
            status: Some(Status::Pending),
            priority: Some(Priority::High),
        };
        assert!(filter.matches(&task(Priority::High, Status::Pending)));
        assert!(!filter.matches(&task(Priority::High, Status::Completed)));
        assert!(!filter.matches(&task(Priority::Low, Status::Pending)));
    }
}
