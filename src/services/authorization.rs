//! Role rules. Every site matches on `UserRole` exhaustively so a new role
//! cannot silently inherit access.

use sqlx::PgPool;

use crate::db::types::UserRole;
use crate::repositories;

/// How far a principal reaches into course-scoped data (grades, attendance, materials).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CourseScope {
    AllCourses,
    AssignedCourses,
    NoCourses,
}

pub(crate) fn course_scope(role: UserRole) -> CourseScope {
    match role {
        UserRole::Admin | UserRole::StaffAffairs => CourseScope::AllCourses,
        UserRole::Doctor => CourseScope::AssignedCourses,
        UserRole::Student => CourseScope::NoCourses,
    }
}

/// Checks course-scoped write access. Doctors need a teaching assignment to the course.
pub(crate) async fn can_manage_course(
    pool: &PgPool,
    user_id: &str,
    role: UserRole,
    course_id: &str,
) -> Result<bool, sqlx::Error> {
    match course_scope(role) {
        CourseScope::AllCourses => Ok(true),
        CourseScope::AssignedCourses => {
            repositories::teaching_assignments::exists_for(pool, user_id, course_id).await
        }
        CourseScope::NoCourses => Ok(false),
    }
}

/// Roster import, student management, credential issuance and certificates.
pub(crate) fn can_manage_students(role: UserRole) -> bool {
    match role {
        UserRole::Admin | UserRole::StaffAffairs => true,
        UserRole::Doctor | UserRole::Student => false,
    }
}

pub(crate) fn can_publish_news(role: UserRole) -> bool {
    match role {
        UserRole::Admin | UserRole::StaffAffairs => true,
        UserRole::Doctor | UserRole::Student => false,
    }
}

/// What destroying an academic year or level does for a given role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DestroyMode {
    Direct,
    Request,
    Forbidden,
}

pub(crate) fn structure_destroy_mode(role: UserRole) -> DestroyMode {
    match role {
        UserRole::Admin => DestroyMode::Direct,
        UserRole::StaffAffairs => DestroyMode::Request,
        UserRole::Doctor | UserRole::Student => DestroyMode::Forbidden,
    }
}

pub(crate) fn can_create_structure(role: UserRole) -> bool {
    match role {
        UserRole::Admin | UserRole::StaffAffairs => true,
        UserRole::Doctor | UserRole::Student => false,
    }
}
