use std::collections::HashMap;

use super::{CourseRef, ImportError, ImportStore, Principal, UserRef};
use crate::db::types::UserRole;
use crate::services::authorization::{course_scope, CourseScope};

/// Outcome of looking a student up by username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StudentLookup {
    Found(UserRef),
    NotFound,
    NotAStudent,
}

/// Per-batch lookup cache in front of an [`ImportStore`]. Misses are cached too,
/// so a file repeating one unknown course costs a single query.
pub(crate) struct Resolver<'a, S: ImportStore + ?Sized> {
    store: &'a S,
    principal: &'a Principal,
    courses: HashMap<String, Option<CourseRef>>,
    departments: HashMap<String, Option<String>>,
    levels: HashMap<String, Option<String>>,
    users: HashMap<String, Option<UserRef>>,
    authorized: HashMap<String, bool>,
}

fn cache_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

impl<'a, S: ImportStore + ?Sized> Resolver<'a, S> {
    pub(crate) fn new(store: &'a S, principal: &'a Principal) -> Self {
        Self {
            store,
            principal,
            courses: HashMap::new(),
            departments: HashMap::new(),
            levels: HashMap::new(),
            users: HashMap::new(),
            authorized: HashMap::new(),
        }
    }

    pub(crate) async fn course(&mut self, key: &str) -> Result<Option<CourseRef>, sqlx::Error> {
        let cache = cache_key(key);
        if cache.is_empty() {
            return Ok(None);
        }
        if let Some(hit) = self.courses.get(&cache) {
            return Ok(hit.clone());
        }
        let found = self.store.course_by_key(key.trim()).await?;
        self.courses.insert(cache, found.clone());
        Ok(found)
    }

    pub(crate) async fn department(&mut self, key: &str) -> Result<Option<String>, sqlx::Error> {
        let cache = cache_key(key);
        if cache.is_empty() {
            return Ok(None);
        }
        if let Some(hit) = self.departments.get(&cache) {
            return Ok(hit.clone());
        }
        let found = self.store.department_by_key(key.trim()).await?;
        self.departments.insert(cache, found.clone());
        Ok(found)
    }

    pub(crate) async fn level(&mut self, name: &str) -> Result<Option<String>, sqlx::Error> {
        let cache = cache_key(name);
        if cache.is_empty() {
            return Ok(None);
        }
        if let Some(hit) = self.levels.get(&cache) {
            return Ok(hit.clone());
        }
        let found = self.store.level_by_name(name.trim()).await?;
        self.levels.insert(cache, found.clone());
        Ok(found)
    }

    pub(crate) async fn user(&mut self, username: &str) -> Result<Option<UserRef>, sqlx::Error> {
        let cache = cache_key(username);
        if cache.is_empty() {
            return Ok(None);
        }
        if let Some(hit) = self.users.get(&cache) {
            return Ok(hit.clone());
        }
        let found = self.store.user_by_username(username.trim()).await?;
        self.users.insert(cache, found.clone());
        Ok(found)
    }

    pub(crate) async fn student(&mut self, username: &str) -> Result<StudentLookup, sqlx::Error> {
        Ok(match self.user(username).await? {
            None => StudentLookup::NotFound,
            Some(user) => match user.role {
                UserRole::Student => StudentLookup::Found(user),
                UserRole::Doctor | UserRole::StaffAffairs | UserRole::Admin => {
                    StudentLookup::NotAStudent
                }
            },
        })
    }

    /// Fails the whole batch when the principal may not touch this course.
    pub(crate) async fn authorize_course(&mut self, course: &CourseRef) -> Result<(), ImportError> {
        let allowed = match course_scope(self.principal.role) {
            CourseScope::AllCourses => true,
            CourseScope::NoCourses => false,
            CourseScope::AssignedCourses => match self.authorized.get(&course.id) {
                Some(allowed) => *allowed,
                None => {
                    let allowed =
                        self.store.has_assignment(&self.principal.id, &course.id).await?;
                    self.authorized.insert(course.id.clone(), allowed);
                    allowed
                }
            },
        };

        if allowed {
            Ok(())
        } else {
            tracing::warn!(
                user_id = %self.principal.id,
                course_id = %course.id,
                "Import rejected: no teaching assignment for course"
            );
            Err(ImportError::Forbidden(format!(
                "You are not assigned to teach {} ({})",
                course.name, course.code
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::imports::memory_store::MemoryStore;

    #[tokio::test]
    async fn lookups_are_case_insensitive_and_memoized() {
        let store = MemoryStore::default();
        let dept = store.add_department("Electrical Engineering", "EE").await;
        store.add_course("Circuits 1", "EE101", &dept).await;
        let principal = Principal { id: "admin".into(), role: UserRole::Admin };
        let mut resolver = Resolver::new(&store, &principal);

        let by_name = resolver.course("circuits 1").await.unwrap().expect("by name");
        let by_code = resolver.course(" ee101 ").await.unwrap().expect("by code");
        assert_eq!(by_name.id, by_code.id);
        assert!(resolver.course("Circuits 2").await.unwrap().is_none());
        assert!(resolver.course("CIRCUITS 2").await.unwrap().is_none());
        assert_eq!(resolver.department("ee").await.unwrap(), Some(dept.clone()));
        assert_eq!(resolver.department("electrical engineering").await.unwrap(), Some(dept));

        assert_eq!(store.course_queries(), 3);
    }

    #[tokio::test]
    async fn non_students_are_reported() {
        let store = MemoryStore::default();
        store.add_user("dr.ali", UserRole::Doctor).await;
        store.add_user("s1", UserRole::Student).await;
        let principal = Principal { id: "admin".into(), role: UserRole::Admin };
        let mut resolver = Resolver::new(&store, &principal);

        assert_eq!(resolver.student("DR.ALI").await.unwrap(), StudentLookup::NotAStudent);
        assert!(matches!(resolver.student("S1").await.unwrap(), StudentLookup::Found(_)));
        assert_eq!(resolver.student("nobody").await.unwrap(), StudentLookup::NotFound);
    }

    #[tokio::test]
    async fn doctors_need_an_assignment() {
        let store = MemoryStore::default();
        let dept = store.add_department("Electrical Engineering", "EE").await;
        let course_id = store.add_course("Circuits 1", "EE101", &dept).await;
        let doctor = store.add_user("dr.ali", UserRole::Doctor).await;
        let principal = Principal { id: doctor.clone(), role: UserRole::Doctor };

        let course = store.course_by_key("EE101").await.unwrap().expect("course");
        {
            let mut resolver = Resolver::new(&store, &principal);
            let err = resolver.authorize_course(&course).await.unwrap_err();
            assert!(matches!(err, ImportError::Forbidden(ref message) if message.contains("Circuits 1")));
        }

        store.assign(&doctor, &course_id).await;
        let mut resolver = Resolver::new(&store, &principal);
        resolver.authorize_course(&course).await.expect("assigned");
    }
}
