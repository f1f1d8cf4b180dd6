//! Upstream Module
//!
//! The remote datasets the dashboard cache fronts, and the sources that fetch
//! them.

mod http;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::FetchError;

pub use http::HttpDashboardSource;

// == Dataset ==
/// Dashboard datasets served by the school API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Stats,
    GradeDistribution,
    AttendanceStats,
    TeacherWorkload,
    RecentActivities,
}

impl Dataset {
    pub const ALL: [Dataset; 5] = [
        Dataset::Stats,
        Dataset::GradeDistribution,
        Dataset::AttendanceStats,
        Dataset::TeacherWorkload,
        Dataset::RecentActivities,
    ];

    /// Fixed cache key of the dataset.
    pub fn cache_key(self) -> &'static str {
        match self {
            Dataset::Stats => "dashboard_stats",
            Dataset::GradeDistribution => "grade_distribution",
            Dataset::AttendanceStats => "attendance_stats",
            Dataset::TeacherWorkload => "teacher_workload",
            Dataset::RecentActivities => "recent_activities",
        }
    }

    /// Dataset served under `path`, relative to `/api/dashboard`.
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.trim_matches('/');
        Self::ALL.into_iter().find(|d| d.path() == path)
    }

    /// Path of the dataset relative to `/api/dashboard`.
    pub fn path(self) -> &'static str {
        match self {
            Dataset::Stats => "stats",
            Dataset::GradeDistribution => "grades/distribution",
            Dataset::AttendanceStats => "attendance/stats",
            Dataset::TeacherWorkload => "teachers/workload",
            Dataset::RecentActivities => "activities/recent",
        }
    }
}

// == Dashboard Source ==
/// Fetches the current value of a dataset from the remote API.
///
/// Calls are expected to be idempotent enough to cache.
#[async_trait]
pub trait DashboardSource: Send + Sync {
    async fn fetch(&self, dataset: Dataset) -> Result<Value, FetchError>;
}
