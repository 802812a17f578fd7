use super::resolver::{Resolver, StudentLookup};
use super::{
    commit, AttendanceWrite, ImportError, ImportKind, ImportStore, ImportSummary, Principal,
    RowOutcome, SkipReason,
};
use crate::services::authorization::{course_scope, CourseScope};
use crate::services::spreadsheet::{RowView, Sheet};

pub(crate) const REQUIRED_COLUMNS: &[&str] =
    &["student_id", "course_name", "attended_lectures", "total_lectures"];

const DATE_COLUMN: &str = "date";

pub(crate) async fn import<S: ImportStore + ?Sized>(
    store: &S,
    principal: &Principal,
    sheet: &Sheet,
) -> Result<ImportSummary, ImportError> {
    sheet.require(REQUIRED_COLUMNS)?;
    if course_scope(principal.role) == CourseScope::NoCourses {
        return Err(ImportError::Forbidden("Students cannot upload attendance".into()));
    }

    let with_dates = sheet.has_column(DATE_COLUMN);
    let mut resolver = Resolver::new(store, principal);
    let mut outcomes = Vec::with_capacity(sheet.len());
    for row in sheet.rows() {
        outcomes.push(prepare_row(&mut resolver, row, with_dates).await?);
    }

    commit(ImportKind::Attendance, outcomes, |write| async move {
        store.upsert_attendance(&write).await.map(Some)
    })
    .await
}

fn lecture_count(row: &RowView<'_>, column: &str) -> Result<i32, String> {
    match row.integer(column) {
        Ok(Some(value)) if value >= 0 => i32::try_from(value).map_err(|_| {
            format!("{column}: {value} is too large")
        }),
        Ok(Some(value)) => Err(format!("{column}: {value} is negative")),
        Ok(None) => Err(format!("{column}: value is required")),
        Err(err) => Err(err.detail()),
    }
}

async fn prepare_row<S: ImportStore + ?Sized>(
    resolver: &mut Resolver<'_, S>,
    row: RowView<'_>,
    with_dates: bool,
) -> Result<RowOutcome<AttendanceWrite>, ImportError> {
    let number = row.line();

    let course_key = row.text("course_name");
    let Some(course) = resolver.course(&course_key).await? else {
        return Ok(RowOutcome::skip(number, SkipReason::CourseNotFound, course_key));
    };
    resolver.authorize_course(&course).await?;

    let attended = match lecture_count(&row, "attended_lectures") {
        Ok(value) => value,
        Err(detail) => return Ok(RowOutcome::skip(number, SkipReason::InvalidValue, detail)),
    };
    let total = match lecture_count(&row, "total_lectures") {
        Ok(value) => value,
        Err(detail) => return Ok(RowOutcome::skip(number, SkipReason::InvalidValue, detail)),
    };
    if attended > total {
        return Ok(RowOutcome::skip(
            number,
            SkipReason::InvalidValue,
            format!("attended_lectures: {attended} exceeds total_lectures {total}"),
        ));
    }

    let recorded_on = if with_dates {
        match row.date(DATE_COLUMN) {
            Ok(date) => date,
            Err(err) => {
                return Ok(RowOutcome::skip(number, SkipReason::InvalidValue, err.detail()))
            }
        }
    } else {
        None
    };

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
        write: AttendanceWrite {
            student_id: student.id,
            course_id: course.id,
            attended_lectures: attended,
            total_lectures: total,
            recorded_on,
        },
    })
}

#[cfg(test)]
mod tests {
    use calamine::Data;
    use time::{Date, Month};

    use super::*;
    use crate::db::types::UserRole;
    use crate::services::imports::memory_store::MemoryStore;

    fn s(value: &str) -> Data {
        Data::String(value.to_string())
    }

    #[tokio::test]
    async fn attendance_rows_upsert_and_validate_counts() {
        let store = MemoryStore::default();
        let dept = store.add_department("Electrical Engineering", "EE").await;
        let course_id = store.add_course("Circuits 1", "EE101", &dept).await;
        let student_id = store.add_user("s1", UserRole::Student).await;
        let admin = Principal { id: "admin".into(), role: UserRole::Admin };

        let rows = vec![
            vec![s("Student ID"), s("Course Name"), s("Attended Lectures"), s("Total Lectures"), s("Date")],
            vec![s("s1"), s("EE101"), Data::Float(9.0), Data::Int(12), s("2024-10-05")],
            vec![s("s1"), s("EE101"), Data::Int(13), Data::Int(12), Data::Empty],
            vec![s("s1"), s("EE101"), Data::Int(-1), Data::Int(12), Data::Empty],
            vec![s("s1"), s("EE101"), Data::Int(1), Data::Empty, Data::Empty],
            vec![s("ghost"), s("EE101"), Data::Int(1), Data::Int(2), Data::Empty],
        ];
        let sheet = Sheet::from_rows(rows, 100).expect("sheet");

        let summary = import(&store, &admin, &sheet).await.expect("import");

        assert_eq!(summary.created, 1);
        let reasons: Vec<_> = summary.skipped_rows.iter().map(|row| row.reason).collect();
        assert_eq!(
            reasons,
            vec![
                SkipReason::InvalidValue,
                SkipReason::InvalidValue,
                SkipReason::InvalidValue,
                SkipReason::StudentNotFound,
            ]
        );
        let stored = store.attendance(&student_id, &course_id).await.expect("attendance");
        assert_eq!((stored.attended_lectures, stored.total_lectures), (9, 12));
        assert_eq!(stored.recorded_on, Some(Date::from_calendar_date(2024, Month::October, 5).unwrap()));
    }

    #[tokio::test]
    async fn update_keeps_previous_date_when_cell_is_empty() {
        let store = MemoryStore::default();
        let dept = store.add_department("Electrical Engineering", "EE").await;
        let course_id = store.add_course("Circuits 1", "EE101", &dept).await;
        let student_id = store.add_user("s1", UserRole::Student).await;
        let staff = Principal { id: "staff".into(), role: UserRole::StaffAffairs };

        let dated = vec![
            vec![s("student_id"), s("course_name"), s("attended_lectures"), s("total_lectures"), s("date")],
            vec![s("s1"), s("Circuits 1"), Data::Int(3), Data::Int(4), s("2024-02-01")],
        ];
        let undated = vec![
            vec![s("student_id"), s("course_name"), s("attended_lectures"), s("total_lectures")],
            vec![s("s1"), s("Circuits 1"), Data::Int(4), Data::Int(5)],
        ];

        import(&store, &staff, &Sheet::from_rows(dated, 10).unwrap()).await.expect("first");
        let summary =
            import(&store, &staff, &Sheet::from_rows(undated, 10).unwrap()).await.expect("second");

        assert_eq!(summary.updated, 1);
        let stored = store.attendance(&student_id, &course_id).await.expect("attendance");
        assert_eq!((stored.attended_lectures, stored.total_lectures), (4, 5));
        assert_eq!(stored.recorded_on, Some(Date::from_calendar_date(2024, Month::February, 1).unwrap()));
    }

    #[tokio::test]
    async fn doctor_outside_course_is_forbidden() {
        let store = MemoryStore::default();
        let dept = store.add_department("Electrical Engineering", "EE").await;
        store.add_course("Circuits 1", "EE101", &dept).await;
        store.add_user("s1", UserRole::Student).await;
        let doctor_id = store.add_user("dr.ali", UserRole::Doctor).await;
        let doctor = Principal { id: doctor_id, role: UserRole::Doctor };

        let rows = vec![
            vec![s("student_id"), s("course_name"), s("attended_lectures"), s("total_lectures")],
            vec![s("s1"), s("EE101"), Data::Int(1), Data::Int(2)],
        ];
        let err = import(&store, &doctor, &Sheet::from_rows(rows, 10).unwrap()).await.unwrap_err();

        assert!(matches!(err, ImportError::Forbidden(_)));
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn foreign_course_with_bad_counts_still_aborts_batch() {
        let store = MemoryStore::default();
        let dept = store.add_department("Electrical Engineering", "EE").await;
        let own_course = store.add_course("Circuits 1", "EE101", &dept).await;
        store.add_course("Algorithms", "CS201", &dept).await;
        store.add_user("s1", UserRole::Student).await;
        let doctor_id = store.add_user("dr.ali", UserRole::Doctor).await;
        store.assign(&doctor_id, &own_course).await;
        let doctor = Principal { id: doctor_id, role: UserRole::Doctor };

        let rows = vec![
            vec![s("student_id"), s("course_name"), s("attended_lectures"), s("total_lectures")],
            vec![s("s1"), s("Algorithms"), Data::Int(5), Data::Int(2)],
            vec![s("s1"), s("EE101"), Data::Int(1), Data::Int(2)],
        ];
        let err = import(&store, &doctor, &Sheet::from_rows(rows, 10).unwrap()).await.unwrap_err();

        assert!(matches!(err, ImportError::Forbidden(_)));
        assert_eq!(store.writes(), 0);
    }
}
