//! In-memory [`ImportStore`] used to exercise the pipeline without Postgres.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{AttendanceWrite, CourseRef, GradeWrite, ImportStore, StudentWrite, UserRef};
use crate::db::types::{Semester, UserRole};
use crate::repositories::UpsertOutcome;

#[derive(Debug, Clone)]
pub(crate) struct StoredStudent {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) role: UserRole,
    pub(crate) full_name: String,
    pub(crate) department_id: Option<String>,
    pub(crate) level_id: Option<String>,
    pub(crate) national_id: Option<String>,
    pub(crate) has_password: bool,
    pub(crate) must_reset_password: bool,
}

#[derive(Default)]
struct Tables {
    departments: Vec<(String, String, String)>,
    levels: Vec<(String, String)>,
    courses: Vec<CourseRef>,
    users: Vec<StoredStudent>,
    assignments: Vec<(String, String)>,
    grades: HashMap<(String, String), GradeWrite>,
    attendance: HashMap<(String, String), AttendanceWrite>,
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    tables: Mutex<Tables>,
    course_queries: AtomicU64,
    writes: AtomicU64,
}

impl MemoryStore {
    pub(crate) async fn add_department(&self, name: &str, code: &str) -> String {
        let id = Uuid::new_v4().to_string();
        self.tables.lock().await.departments.push((id.clone(), name.into(), code.into()));
        id
    }

    pub(crate) async fn add_level(&self, name: &str) -> String {
        let id = Uuid::new_v4().to_string();
        self.tables.lock().await.levels.push((id.clone(), name.into()));
        id
    }

    pub(crate) async fn add_course(&self, name: &str, code: &str, _department_id: &str) -> String {
        let id = Uuid::new_v4().to_string();
        self.tables.lock().await.courses.push(CourseRef {
            id: id.clone(),
            name: name.into(),
            code: code.into(),
            semester: Semester::First,
        });
        id
    }

    pub(crate) async fn add_user(&self, username: &str, role: UserRole) -> String {
        let id = Uuid::new_v4().to_string();
        self.tables.lock().await.users.push(StoredStudent {
            id: id.clone(),
            username: username.into(),
            role,
            full_name: username.into(),
            department_id: None,
            level_id: None,
            national_id: None,
            has_password: true,
            must_reset_password: false,
        });
        id
    }

    pub(crate) async fn assign(&self, doctor_id: &str, course_id: &str) {
        self.tables.lock().await.assignments.push((doctor_id.into(), course_id.into()));
    }

    pub(crate) async fn grade(&self, student_id: &str, course_id: &str) -> Option<GradeWrite> {
        self.tables.lock().await.grades.get(&(student_id.into(), course_id.into())).cloned()
    }

    pub(crate) async fn grade_count(&self) -> usize {
        self.tables.lock().await.grades.len()
    }

    pub(crate) async fn attendance(
        &self,
        student_id: &str,
        course_id: &str,
    ) -> Option<AttendanceWrite> {
        self.tables.lock().await.attendance.get(&(student_id.into(), course_id.into())).cloned()
    }

    pub(crate) async fn user(&self, username: &str) -> Option<StoredStudent> {
        let tables = self.tables.lock().await;
        tables.users.iter().find(|user| user.username.eq_ignore_ascii_case(username)).cloned()
    }

    pub(crate) async fn user_count(&self) -> usize {
        self.tables.lock().await.users.len()
    }

    pub(crate) fn course_queries(&self) -> u64 {
        self.course_queries.load(Ordering::Relaxed)
    }

    pub(crate) fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ImportStore for MemoryStore {
    async fn course_by_key(&self, key: &str) -> Result<Option<CourseRef>, sqlx::Error> {
        self.course_queries.fetch_add(1, Ordering::Relaxed);
        let tables = self.tables.lock().await;
        let mut by_code: Vec<&CourseRef> =
            tables.courses.iter().filter(|c| c.code.eq_ignore_ascii_case(key)).collect();
        if by_code.is_empty() {
            by_code = tables.courses.iter().filter(|c| c.name.eq_ignore_ascii_case(key)).collect();
        }
        by_code.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(by_code.first().map(|course| (*course).clone()))
    }

    async fn department_by_key(&self, key: &str) -> Result<Option<String>, sqlx::Error> {
        let tables = self.tables.lock().await;
        Ok(tables
            .departments
            .iter()
            .find(|(_, name, code)| name.eq_ignore_ascii_case(key) || code.eq_ignore_ascii_case(key))
            .map(|(id, _, _)| id.clone()))
    }

    async fn level_by_name(&self, name: &str) -> Result<Option<String>, sqlx::Error> {
        let tables = self.tables.lock().await;
        Ok(tables
            .levels
            .iter()
            .find(|(_, level)| level.eq_ignore_ascii_case(name))
            .map(|(id, _)| id.clone()))
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<UserRef>, sqlx::Error> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .find(|user| user.username.eq_ignore_ascii_case(username))
            .map(|user| UserRef {
                id: user.id.clone(),
                username: user.username.clone(),
                role: user.role,
            }))
    }

    async fn has_assignment(&self, doctor_id: &str, course_id: &str) -> Result<bool, sqlx::Error> {
        let tables = self.tables.lock().await;
        Ok(tables
            .assignments
            .iter()
            .any(|(doctor, course)| doctor == doctor_id && course == course_id))
    }

    async fn upsert_grade(&self, write: &GradeWrite) -> Result<UpsertOutcome, sqlx::Error> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        let key = (write.student_id.clone(), write.course_id.clone());
        let previous = self.tables.lock().await.grades.insert(key, write.clone());
        Ok(UpsertOutcome::from_inserted(previous.is_none()))
    }

    async fn upsert_attendance(
        &self,
        write: &AttendanceWrite,
    ) -> Result<UpsertOutcome, sqlx::Error> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        let key = (write.student_id.clone(), write.course_id.clone());
        let mut tables = self.tables.lock().await;
        let mut stored = write.clone();
        if stored.recorded_on.is_none() {
            stored.recorded_on = tables.attendance.get(&key).and_then(|row| row.recorded_on);
        }
        let previous = tables.attendance.insert(key, stored);
        Ok(UpsertOutcome::from_inserted(previous.is_none()))
    }

    async fn upsert_student(
        &self,
        write: &StudentWrite,
    ) -> Result<Option<UpsertOutcome>, sqlx::Error> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        let mut tables = self.tables.lock().await;
        if let Some(user) = tables.users.iter_mut().find(|user| user.username == write.username) {
            if user.role != UserRole::Student {
                return Ok(None);
            }
            user.full_name = write.full_name.clone();
            user.department_id = Some(write.department_id.clone());
            user.level_id = Some(write.level_id.clone());
            if write.national_id.is_some() {
                user.national_id = write.national_id.clone();
            }
            return Ok(Some(UpsertOutcome::Updated));
        }

        tables.users.push(StoredStudent {
            id: Uuid::new_v4().to_string(),
            username: write.username.clone(),
            role: UserRole::Student,
            full_name: write.full_name.clone(),
            department_id: Some(write.department_id.clone()),
            level_id: Some(write.level_id.clone()),
            national_id: write.national_id.clone(),
            has_password: false,
            must_reset_password: true,
        });
        Ok(Some(UpsertOutcome::Created))
    }
}
