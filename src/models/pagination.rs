use serde::Deserialize;
use uuid::Uuid;

use super::{SubtaskFilter, TaskFilter, TaskStatus};
use crate::error::AppError;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PER_PAGE: i64 = 10;

/// A page window over a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl Pagination {
    /// Builds a window from raw query values. Missing, unparsable or
    /// non-positive values fall back to the defaults.
    pub fn from_raw(page: Option<&str>, per_page: Option<&str>) -> Self {
        Self {
            page: positive_or(page, DEFAULT_PAGE),
            per_page: positive_or(per_page, DEFAULT_PER_PAGE),
        }
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

fn positive_or(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|value| *value >= 1)
        .unwrap_or(default)
}

/// Query string accepted by the list endpoints.
///
/// Everything is taken as text so that a bad page number degrades to the
/// default instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub status: Option<String>,
    pub task_id: Option<String>,
}

impl ListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::from_raw(self.page.as_deref(), self.per_page.as_deref())
    }

    pub fn task_filter(&self) -> Result<TaskFilter, AppError> {
        Ok(TaskFilter {
            status: self.status()?,
        })
    }

    pub fn subtask_filter(&self) -> Result<SubtaskFilter, AppError> {
        let task_id = match non_empty(&self.task_id) {
            Some(raw) => Some(
                raw.parse::<Uuid>()
                    .map_err(|_| AppError::InvalidInput("task_id must be a UUID".into()))?,
            ),
            None => None,
        };
        Ok(SubtaskFilter {
            status: self.status()?,
            task_id,
        })
    }

    fn status(&self) -> Result<Option<TaskStatus>, AppError> {
        non_empty(&self.status)
            .map(|raw| raw.parse::<TaskStatus>().map_err(AppError::InvalidInput))
            .transpose()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
