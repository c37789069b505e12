use chrono::NaiveDateTime;
use serde::Serialize;

/// One catalog offering. Identity is the (root number, serial number)
/// pair; `id` is assigned by the sink store on insert.
#[derive(Debug, Clone, Serialize)]
pub struct Course {
    pub id: Option<i64>,
    pub root_number: i32,
    pub serial_number: i32,
    pub title: String,
}

/// One scheduled session of a course, as extracted from its detail page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeetingTime {
    pub course_id: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub assessment: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Lecturer {
    pub id: i64,
    pub name: String,
}
