pub(crate) mod academic_years;
pub(crate) mod attendance;
pub(crate) mod certificates;
pub(crate) mod courses;
pub(crate) mod deletion_requests;
pub(crate) mod departments;
pub(crate) mod grades;
pub(crate) mod health;
pub(crate) mod levels;
pub(crate) mod materials;
pub(crate) mod news;
pub(crate) mod teaching_assignments;
pub(crate) mod users;

/// Whether an `ON CONFLICT` upsert inserted a new row or overwrote an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UpsertOutcome {
    Created,
    Updated,
}

impl UpsertOutcome {
    pub(crate) fn from_inserted(inserted: bool) -> Self {
        if inserted {
            UpsertOutcome::Created
        } else {
            UpsertOutcome::Updated
        }
    }
}
