use serde::Serialize;

use crate::services::imports::{ImportSummary, SkippedRow};

/// Grade and attendance uploads report processed rows only.
#[derive(Debug, Serialize)]
pub(crate) struct RecordImportResponse {
    pub(crate) status: String,
    pub(crate) processed: usize,
    pub(crate) skipped: usize,
    pub(crate) skipped_rows: Vec<SkippedRow>,
}

impl RecordImportResponse {
    pub(crate) fn from_summary(subject: &str, summary: ImportSummary) -> Self {
        let processed = summary.processed();
        let skipped = summary.skipped();
        Self {
            status: format!("{subject} uploaded: {processed} processed, {skipped} skipped"),
            processed,
            skipped,
            skipped_rows: summary.skipped_rows,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RosterImportResponse {
    pub(crate) status: String,
    pub(crate) created: usize,
    pub(crate) updated: usize,
    pub(crate) skipped: usize,
    pub(crate) skipped_rows: Vec<SkippedRow>,
}

impl RosterImportResponse {
    pub(crate) fn from_summary(summary: ImportSummary) -> Self {
        let skipped = summary.skipped();
        Self {
            status: format!(
                "Students uploaded: {} created, {} updated, {skipped} skipped",
                summary.created, summary.updated
            ),
            created: summary.created,
            updated: summary.updated,
            skipped,
            skipped_rows: summary.skipped_rows,
        }
    }
}
