/// Letter grade shown next to a numeric score.
pub(crate) fn letter_grade(score: Option<f64>) -> &'static str {
    let Some(score) = score else {
        return "N/A";
    };
    match score {
        s if s >= 90.0 => "A",
        s if s >= 85.0 => "A-",
        s if s >= 75.0 => "B",
        s if s >= 65.0 => "C",
        s if s >= 50.0 => "D",
        _ => "F",
    }
}

/// Attendance ratio in percent, rounded to one decimal. Zero lectures give 0.
pub(crate) fn attendance_percentage(attended: i32, total: i32) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    (f64::from(attended) * 1000.0 / f64::from(total)).round() / 10.0
}
