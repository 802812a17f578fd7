use super::resolver::{Resolver, StudentLookup};
use super::{
    commit, GradeWrite, ImportError, ImportKind, ImportStore, ImportSummary, Principal,
    RowOutcome, SkipReason,
};
use crate::db::types::Semester;
use crate::services::authorization::{course_scope, CourseScope};
use crate::services::spreadsheet::{RowView, Sheet};

pub(crate) const REQUIRED_COLUMNS: &[&str] =
    &["department", "level", "semester", "course_name", "student_id", "student_name", "score"];

const MAX_SCORE: f64 = 100.0;

pub(crate) async fn import<S: ImportStore + ?Sized>(
    store: &S,
    principal: &Principal,
    sheet: &Sheet,
) -> Result<ImportSummary, ImportError> {
    sheet.require(REQUIRED_COLUMNS)?;
    if course_scope(principal.role) == CourseScope::NoCourses {
        return Err(ImportError::Forbidden("Students cannot upload grades".into()));
    }

    let mut resolver = Resolver::new(store, principal);
    let mut outcomes = Vec::with_capacity(sheet.len());
    for row in sheet.rows() {
        outcomes.push(prepare_row(&mut resolver, row).await?);
    }

    commit(ImportKind::Grades, outcomes, |write| async move {
        store.upsert_grade(&write).await.map(Some)
    })
    .await
}

async fn prepare_row<S: ImportStore + ?Sized>(
    resolver: &mut Resolver<'_, S>,
    row: RowView<'_>,
) -> Result<RowOutcome<GradeWrite>, ImportError> {
    let number = row.line();

    // Authorization runs before any value check so a foreign course aborts the batch.
    let course_key = row.text("course_name");
    let Some(course) = resolver.course(&course_key).await? else {
        return Ok(RowOutcome::skip(number, SkipReason::CourseNotFound, course_key));
    };
    resolver.authorize_course(&course).await?;

    let score = match row.number("score") {
        Ok(score) => score,
        Err(err) => return Ok(RowOutcome::skip(number, SkipReason::InvalidValue, err.detail())),
    };
    if let Some(value) = score {
        if !(0.0..=MAX_SCORE).contains(&value) {
            return Ok(RowOutcome::skip(
                number,
                SkipReason::InvalidValue,
                format!("score: {value} is outside 0..={MAX_SCORE}"),
            ));
        }
    }

    let semester = match row.optional_text("semester") {
        None => None,
        Some(raw) => match Semester::parse_label(&raw) {
            Some(semester) => Some(semester),
            None => {
                return Ok(RowOutcome::skip(
                    number,
                    SkipReason::InvalidValue,
                    format!("semester: invalid value {raw:?}"),
                ))
            }
        },
    };

    if let Some(department) = row.optional_text("department") {
        if resolver.department(&department).await?.is_none() {
            return Ok(RowOutcome::skip(number, SkipReason::DepartmentNotFound, department));
        }
    }
    if let Some(level) = row.optional_text("level") {
        if resolver.level(&level).await?.is_none() {
            return Ok(RowOutcome::skip(number, SkipReason::LevelNotFound, level));
        }
    }

    let username = row.text("student_id");
    let student = match resolver.student(&username).await? {
        StudentLookup::Found(student) => student,
        StudentLookup::NotFound => {
            return Ok(RowOutcome::skip(number, SkipReason::StudentNotFound, username))
        }
        StudentLookup::NotAStudent => {
            return Ok(RowOutcome::skip(number, SkipReason::NotAStudent, username))
        }
    };

    Ok(RowOutcome::Ready {
        row: number,
        write: GradeWrite {
            student_id: student.id,
            course_id: course.id,
            score,
            semester: semester.unwrap_or(course.semester),
        },
    })
}

#[cfg(test)]
mod tests {
    use calamine::Data;

    use super::*;
    use crate::db::types::UserRole;
    use crate::services::grading::letter_grade;
    use crate::services::imports::memory_store::MemoryStore;
    use crate::services::imports::SkippedRow;
    use crate::services::spreadsheet::SpreadsheetError;

    fn s(value: &str) -> Data {
        Data::String(value.to_string())
    }

    fn header() -> Vec<Data> {
        REQUIRED_COLUMNS.iter().map(|column| s(column)).collect()
    }

    fn grade_row(student: &str, course: &str, score: Data) -> Vec<Data> {
        vec![s("EE"), s("First Year"), s("1"), s(course), s(student), s("Student"), score]
    }

    fn sheet(rows: Vec<Vec<Data>>) -> Sheet {
        let mut all = vec![header()];
        all.extend(rows);
        Sheet::from_rows(all, 100).expect("sheet")
    }

    struct Fixture {
        store: MemoryStore,
        course_id: String,
        student_id: String,
        staff: Principal,
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::default();
        let dept = store.add_department("Electrical Engineering", "EE").await;
        store.add_level("First Year").await;
        let course_id = store.add_course("Circuits 1", "EE101", &dept).await;
        let student_id = store.add_user("s1", UserRole::Student).await;
        let staff_id = store.add_user("affairs", UserRole::StaffAffairs).await;
        Fixture {
            store,
            course_id,
            student_id,
            staff: Principal { id: staff_id, role: UserRole::StaffAffairs },
        }
    }

    #[tokio::test]
    async fn unknown_student_is_skipped_and_known_one_is_graded() {
        let fx = fixture().await;
        let sheet = sheet(vec![
            grade_row("s1", "Circuits 1", Data::Float(91.0)),
            grade_row("unknown", "Circuits 1", Data::Float(50.0)),
        ]);

        let summary = import(&fx.store, &fx.staff, &sheet).await.expect("import");

        assert_eq!(summary.processed(), 1);
        assert_eq!(summary.skipped(), 1);
        assert_eq!(
            summary.skipped_rows,
            vec![SkippedRow {
                row: 3,
                reason: SkipReason::StudentNotFound,
                detail: "unknown".into()
            }]
        );
        let grade = fx.store.grade(&fx.student_id, &fx.course_id).await.expect("grade");
        assert_eq!(grade.score, Some(91.0));
        assert_eq!(grade.semester, Semester::First);
        assert_eq!(letter_grade(grade.score), "A");
    }

    #[tokio::test]
    async fn reupload_is_idempotent() {
        let fx = fixture().await;
        let rows = || sheet(vec![grade_row("s1", "EE101", Data::Int(77))]);

        let first = import(&fx.store, &fx.staff, &rows()).await.expect("first");
        let second = import(&fx.store, &fx.staff, &rows()).await.expect("second");

        assert_eq!((first.created, first.updated), (1, 0));
        assert_eq!((second.created, second.updated), (0, 1));
        assert_eq!(fx.store.grade_count().await, 1);
        let grade = fx.store.grade(&fx.student_id, &fx.course_id).await.expect("grade");
        assert_eq!(grade.score, Some(77.0));
    }

    #[tokio::test]
    async fn unknown_course_skips_only_that_row() {
        let fx = fixture().await;
        let sheet = sheet(vec![
            grade_row("s1", "NOPE404", Data::Int(60)),
            grade_row("s1", "circuits 1", Data::Int(61)),
        ]);

        let summary = import(&fx.store, &fx.staff, &sheet).await.expect("import");

        assert_eq!(summary.processed(), 1);
        assert_eq!(summary.skipped_rows[0].reason, SkipReason::CourseNotFound);
        assert_eq!(summary.skipped_rows[0].row, 2);
    }

    #[tokio::test]
    async fn doctor_without_assignment_commits_nothing() {
        let fx = fixture().await;
        let dept = fx.store.add_department("Computer Science", "CS").await;
        let other_course = fx.store.add_course("Algorithms", "CS201", &dept).await;
        let doctor_id = fx.store.add_user("dr.ali", UserRole::Doctor).await;
        fx.store.assign(&doctor_id, &other_course).await;
        let doctor = Principal { id: doctor_id, role: UserRole::Doctor };

        let sheet = sheet(vec![
            grade_row("s1", "Algorithms", Data::Int(80)),
            grade_row("s1", "Circuits 1", Data::Int(80)),
        ]);

        let err = import(&fx.store, &doctor, &sheet).await.unwrap_err();

        assert!(matches!(err, ImportError::Forbidden(_)));
        assert_eq!(fx.store.writes(), 0);
        assert_eq!(fx.store.grade_count().await, 0);
    }

    #[tokio::test]
    async fn foreign_course_with_bad_score_still_aborts_batch() {
        let fx = fixture().await;
        let dept = fx.store.add_department("Computer Science", "CS").await;
        fx.store.add_course("Algorithms", "CS201", &dept).await;
        let doctor_id = fx.store.add_user("dr.ali", UserRole::Doctor).await;
        fx.store.assign(&doctor_id, &fx.course_id).await;
        let doctor = Principal { id: doctor_id, role: UserRole::Doctor };

        let sheet = sheet(vec![
            grade_row("s1", "Algorithms", s("abc")),
            grade_row("s1", "Circuits 1", Data::Int(80)),
        ]);

        let err = import(&fx.store, &doctor, &sheet).await.unwrap_err();

        assert!(matches!(err, ImportError::Forbidden(_)));
        assert_eq!(fx.store.writes(), 0);
        assert_eq!(fx.store.grade_count().await, 0);
    }

    #[tokio::test]
    async fn assigned_doctor_can_upload() {
        let fx = fixture().await;
        let doctor_id = fx.store.add_user("dr.ali", UserRole::Doctor).await;
        fx.store.assign(&doctor_id, &fx.course_id).await;
        let doctor = Principal { id: doctor_id, role: UserRole::Doctor };

        let summary = import(&fx.store, &doctor, &sheet(vec![grade_row("s1", "EE101", Data::Int(88))]))
            .await
            .expect("import");

        assert_eq!(summary.created, 1);
    }

    #[tokio::test]
    async fn students_are_refused_before_reading_rows() {
        let fx = fixture().await;
        let student = Principal { id: fx.student_id.clone(), role: UserRole::Student };

        let err = import(&fx.store, &student, &sheet(vec![])).await.unwrap_err();

        assert!(matches!(err, ImportError::Forbidden(_)));
    }

    #[tokio::test]
    async fn missing_column_aborts_the_batch() {
        let fx = fixture().await;
        let rows = vec![
            vec![s("student_id"), s("course_name"), s("score")],
            vec![s("s1"), s("EE101"), Data::Int(90)],
        ];
        let sheet = Sheet::from_rows(rows, 100).expect("sheet");

        let err = import(&fx.store, &fx.staff, &sheet).await.unwrap_err();

        assert!(matches!(
            err,
            ImportError::Schema(SpreadsheetError::MissingColumn(ref column)) if column == "department"
        ));
        assert_eq!(fx.store.writes(), 0);
    }

    #[tokio::test]
    async fn bad_cells_and_unresolved_structure_skip_rows() {
        let fx = fixture().await;
        let mut unknown_level = grade_row("s1", "EE101", Data::Int(70));
        unknown_level[1] = s("Ninth Year");
        let mut bad_semester = grade_row("s1", "EE101", Data::Int(70));
        bad_semester[2] = s("Winter");
        let sheet = sheet(vec![
            grade_row("s1", "EE101", s("abc")),
            grade_row("s1", "EE101", Data::Int(140)),
            unknown_level,
            bad_semester,
            grade_row("affairs", "EE101", Data::Int(70)),
        ]);

        let summary = import(&fx.store, &fx.staff, &sheet).await.expect("import");

        let reasons: Vec<_> = summary.skipped_rows.iter().map(|row| row.reason).collect();
        assert_eq!(
            reasons,
            vec![
                SkipReason::InvalidValue,
                SkipReason::InvalidValue,
                SkipReason::LevelNotFound,
                SkipReason::InvalidValue,
                SkipReason::NotAStudent,
            ]
        );
        assert_eq!(summary.processed(), 0);
    }

    #[tokio::test]
    async fn empty_score_clears_the_grade_and_semester_is_taken_from_the_row() {
        let fx = fixture().await;
        let mut row = grade_row("s1", "EE101", Data::Empty);
        row[2] = s("Summer");

        import(&fx.store, &fx.staff, &sheet(vec![row])).await.expect("import");

        let grade = fx.store.grade(&fx.student_id, &fx.course_id).await.expect("grade");
        assert_eq!(grade.score, None);
        assert_eq!(grade.semester, Semester::Summer);
        assert_eq!(letter_grade(grade.score), "N/A");
    }
}
