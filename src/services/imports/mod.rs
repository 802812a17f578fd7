//! Bulk spreadsheet imports for grades, attendance and the student roster.
//!
//! Every import runs in two phases. The first validates, resolves and
//! authorizes every row without writing anything; a batch-level failure
//! (missing column, forbidden course) returns before any row is committed.
//! The second phase upserts the ready rows one at a time in file order. Each
//! upsert is atomic on its own; there is no batch transaction, so a store
//! failure half way leaves the earlier rows committed. Concurrent uploads
//! that touch the same natural key race and the last writer wins.

pub(crate) mod attendance;
pub(crate) mod grades;
#[cfg(test)]
pub(crate) mod memory_store;
pub(crate) mod pg_store;
pub(crate) mod resolver;
pub(crate) mod roster;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use time::Date;

use crate::db::types::{Semester, UserRole};
use crate::repositories::UpsertOutcome;
use crate::services::spreadsheet::SpreadsheetError;

/// The user performing an upload.
#[derive(Debug, Clone)]
pub(crate) struct Principal {
    pub(crate) id: String,
    pub(crate) role: UserRole,
}

#[derive(Debug, Clone)]
pub(crate) struct CourseRef {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) code: String,
    pub(crate) semester: Semester,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UserRef {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) role: UserRole,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GradeWrite {
    pub(crate) student_id: String,
    pub(crate) course_id: String,
    pub(crate) score: Option<f64>,
    pub(crate) semester: Semester,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AttendanceWrite {
    pub(crate) student_id: String,
    pub(crate) course_id: String,
    pub(crate) attended_lectures: i32,
    pub(crate) total_lectures: i32,
    pub(crate) recorded_on: Option<Date>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StudentWrite {
    pub(crate) username: String,
    pub(crate) full_name: String,
    pub(crate) department_id: String,
    pub(crate) level_id: String,
    pub(crate) national_id: Option<String>,
}

/// Storage seen by the import pipeline.
#[async_trait]
pub(crate) trait ImportStore: Send + Sync {
    /// Case-insensitive match on course code, then on course name.
    async fn course_by_key(&self, key: &str) -> Result<Option<CourseRef>, sqlx::Error>;

    /// Case-insensitive match on department name or code. Returns the department id.
    async fn department_by_key(&self, key: &str) -> Result<Option<String>, sqlx::Error>;

    async fn level_by_name(&self, name: &str) -> Result<Option<String>, sqlx::Error>;

    async fn user_by_username(&self, username: &str) -> Result<Option<UserRef>, sqlx::Error>;

    async fn has_assignment(&self, doctor_id: &str, course_id: &str) -> Result<bool, sqlx::Error>;

    async fn upsert_grade(&self, write: &GradeWrite) -> Result<UpsertOutcome, sqlx::Error>;

    async fn upsert_attendance(&self, write: &AttendanceWrite)
        -> Result<UpsertOutcome, sqlx::Error>;

    /// `None` when the username belongs to an account that is not a student.
    async fn upsert_student(&self, write: &StudentWrite)
        -> Result<Option<UpsertOutcome>, sqlx::Error>;
}

#[derive(Debug, Error)]
pub(crate) enum ImportError {
    #[error(transparent)]
    Schema(#[from] SpreadsheetError),
    #[error("{0}")]
    Forbidden(String),
    #[error("store failure: {0}")]
    Store(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ImportKind {
    Grades,
    Attendance,
    Roster,
}

impl ImportKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            ImportKind::Grades => "grades",
            ImportKind::Attendance => "attendance",
            ImportKind::Roster => "roster",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum SkipReason {
    InvalidValue,
    CourseNotFound,
    DepartmentNotFound,
    LevelNotFound,
    StudentNotFound,
    NotAStudent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct SkippedRow {
    pub(crate) row: usize,
    pub(crate) reason: SkipReason,
    pub(crate) detail: String,
}

/// Result of the first phase for one row.
#[derive(Debug)]
pub(crate) enum RowOutcome<T> {
    Ready { row: usize, write: T },
    Skipped(SkippedRow),
}

impl<T> RowOutcome<T> {
    pub(crate) fn skip(row: usize, reason: SkipReason, detail: impl Into<String>) -> Self {
        RowOutcome::Skipped(SkippedRow { row, reason, detail: detail.into() })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub(crate) struct ImportSummary {
    pub(crate) created: usize,
    pub(crate) updated: usize,
    pub(crate) skipped_rows: Vec<SkippedRow>,
}

impl ImportSummary {
    pub(crate) fn processed(&self) -> usize {
        self.created + self.updated
    }

    pub(crate) fn skipped(&self) -> usize {
        self.skipped_rows.len()
    }

    fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Created => self.created += 1,
            UpsertOutcome::Updated => self.updated += 1,
        }
    }

    fn skip(&mut self, row: SkippedRow) {
        tracing::debug!(row = row.row, reason = ?row.reason, detail = %row.detail, "Import row skipped");
        self.skipped_rows.push(row);
    }

    fn emit_metrics(&self, kind: ImportKind) {
        let label = kind.as_str();
        metrics::counter!("import_rows_total", "kind" => label, "outcome" => "created")
            .increment(self.created as u64);
        metrics::counter!("import_rows_total", "kind" => label, "outcome" => "updated")
            .increment(self.updated as u64);
        metrics::counter!("import_rows_total", "kind" => label, "outcome" => "skipped")
            .increment(self.skipped() as u64);
    }
}

/// Second phase: applies ready rows in file order and aggregates the outcome.
async fn commit<T, F, Fut>(
    kind: ImportKind,
    outcomes: Vec<RowOutcome<T>>,
    mut apply: F,
) -> Result<ImportSummary, ImportError>
where
    F: FnMut(T) -> Fut,
    Fut: std::future::Future<Output = Result<Option<UpsertOutcome>, sqlx::Error>>,
{
    let mut summary = ImportSummary::default();
    for outcome in outcomes {
        match outcome {
            RowOutcome::Skipped(row) => summary.skip(row),
            RowOutcome::Ready { row, write } => {
                match apply(write).await? {
                    Some(outcome) => summary.record(outcome),
                    None => summary.skip(SkippedRow {
                        row,
                        reason: SkipReason::NotAStudent,
                        detail: "username belongs to an account that is not a student".into(),
                    }),
                }
            }
        }
    }

    summary.emit_metrics(kind);
    tracing::info!(
        kind = kind.as_str(),
        created = summary.created,
        updated = summary.updated,
        skipped = summary.skipped(),
        "Import finished"
    );
    Ok(summary)
}
