//! Student roster import. New accounts are created without a password and
//! flagged for reset; staff hand out credentials through a separate call.

use std::collections::HashMap;

use super::resolver::Resolver;
use super::{
    commit, ImportError, ImportKind, ImportStore, ImportSummary, Principal, RowOutcome,
    SkipReason, StudentWrite,
};
use crate::db::types::UserRole;
use crate::services::authorization::can_manage_students;
use crate::services::spreadsheet::{RowView, Sheet};

pub(crate) const REQUIRED_COLUMNS: &[&str] = &["department", "level", "student_id", "student_name"];

const NATIONAL_ID_COLUMN: &str = "national_id";

pub(crate) async fn import<S: ImportStore + ?Sized>(
    store: &S,
    principal: &Principal,
    sheet: &Sheet,
) -> Result<ImportSummary, ImportError> {
    sheet.require(REQUIRED_COLUMNS)?;
    if !can_manage_students(principal.role) {
        return Err(ImportError::Forbidden("Only staff can upload the student roster".into()));
    }

    let mut resolver = Resolver::new(store, principal);
    // Usernames already seen in this file, so "S1" and "s1" land on one account.
    let mut spellings: HashMap<String, String> = HashMap::new();
    let mut outcomes = Vec::with_capacity(sheet.len());
    for row in sheet.rows() {
        outcomes.push(prepare_row(&mut resolver, &mut spellings, row).await?);
    }

    commit(ImportKind::Roster, outcomes, |write| async move { store.upsert_student(&write).await })
        .await
}

async fn prepare_row<S: ImportStore + ?Sized>(
    resolver: &mut Resolver<'_, S>,
    spellings: &mut HashMap<String, String>,
    row: RowView<'_>,
) -> Result<RowOutcome<StudentWrite>, ImportError> {
    let number = row.line();

    let Some(username) = row.optional_text("student_id") else {
        return Ok(RowOutcome::skip(number, SkipReason::InvalidValue, "student_id: value is required"));
    };
    let Some(full_name) = row.optional_text("student_name") else {
        return Ok(RowOutcome::skip(number, SkipReason::InvalidValue, "student_name: value is required"));
    };

    let department_key = row.text("department");
    let Some(department_id) = resolver.department(&department_key).await? else {
        return Ok(RowOutcome::skip(number, SkipReason::DepartmentNotFound, department_key));
    };
    let level_key = row.text("level");
    let Some(level_id) = resolver.level(&level_key).await? else {
        return Ok(RowOutcome::skip(number, SkipReason::LevelNotFound, level_key));
    };

    let username = match resolver.user(&username).await? {
        Some(existing) => match existing.role {
            UserRole::Student => existing.username,
            UserRole::Doctor | UserRole::StaffAffairs | UserRole::Admin => {
                return Ok(RowOutcome::skip(number, SkipReason::NotAStudent, username));
            }
        },
        None => spellings.entry(username.to_lowercase()).or_insert(username).clone(),
    };

    Ok(RowOutcome::Ready {
        row: number,
        write: StudentWrite {
            username,
            full_name,
            department_id,
            level_id,
            national_id: row.optional_text(NATIONAL_ID_COLUMN),
        },
    })
}
