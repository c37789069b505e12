use std::path::Path;

use anyhow::Result;
use rusqlite::Connection;

use crate::model::{Course, Lecturer, MeetingTime};

/// Full-refresh schema: every run drops and recreates the tables, so
/// there is no update or delete path.
const SCHEMA_SQL: &str = r#"
    DROP TABLE IF EXISTS coursedate;
    DROP TABLE IF EXISTS lecturers;
    DROP TABLE IF EXISTS courses;

    CREATE TABLE lecturers (
        id   INTEGER PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    );

    CREATE TABLE courses (
        id         INTEGER PRIMARY KEY,
        rootNumber INTEGER NOT NULL,
        sn         INTEGER NOT NULL,
        title      TEXT NOT NULL
    );

    CREATE TABLE coursedate (
        id         INTEGER PRIMARY KEY,
        courseId   INTEGER NOT NULL REFERENCES courses(id),
        start      TEXT NOT NULL,
        "end"      TEXT NOT NULL,
        assessment BOOLEAN NOT NULL
    );
"#;

/// Write handle on the normalized catalog database.
pub struct SinkDb {
    conn: Connection,
}

impl SinkDb {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    pub fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    pub fn insert_lecturers(&self, names: &[String]) -> Result<Vec<Lecturer>> {
        let tx = self.conn.unchecked_transaction()?;
        let mut result = Vec::with_capacity(names.len());
        {
            let mut stmt = tx.prepare("INSERT INTO lecturers (name) VALUES (?1)")?;
            for name in names {
                stmt.execute([name])?;
                result.push(Lecturer {
                    id: tx.last_insert_rowid(),
                    name: name.clone(),
                });
            }
        }
        tx.commit()?;
        Ok(result)
    }

    /// Insert courses and capture the generated ids, which meeting-time
    /// rows reference as their foreign key.
    pub fn insert_courses(&self, courses: &[Course]) -> Result<Vec<Course>> {
        let tx = self.conn.unchecked_transaction()?;
        let mut result = Vec::with_capacity(courses.len());
        {
            let mut stmt =
                tx.prepare("INSERT INTO courses (rootNumber, sn, title) VALUES (?1, ?2, ?3)")?;
            for course in courses {
                stmt.execute(rusqlite::params![
                    course.root_number,
                    course.serial_number,
                    course.title
                ])?;
                result.push(Course {
                    id: Some(tx.last_insert_rowid()),
                    ..course.clone()
                });
            }
        }
        tx.commit()?;
        Ok(result)
    }

    pub fn insert_meetings(&self, meetings: &[MeetingTime]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"INSERT INTO coursedate (courseId, start, "end", assessment)
                   VALUES (?1, ?2, ?3, ?4)"#,
            )?;
            for meeting in meetings {
                stmt.execute(rusqlite::params![
                    meeting.course_id,
                    meeting.start,
                    meeting.end,
                    meeting.assessment
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn stats(&self) -> Result<SinkStats> {
        let count = |sql: &str| -> Result<usize> {
            Ok(self.conn.query_row(sql, [], |row| row.get(0))?)
        };
        Ok(SinkStats {
            lecturers: count("SELECT COUNT(*) FROM lecturers")?,
            courses: count("SELECT COUNT(*) FROM courses")?,
            meetings: count("SELECT COUNT(*) FROM coursedate")?,
            assessments: count("SELECT COUNT(*) FROM coursedate WHERE assessment")?,
        })
    }
}

pub struct SinkStats {
    pub lecturers: usize,
    pub courses: usize,
    pub meetings: usize,
    pub assessments: usize,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn sink() -> SinkDb {
        let db = SinkDb {
            conn: Connection::open_in_memory().unwrap(),
        };
        db.init_schema().unwrap();
        db
    }

    fn course(root: i32, sn: i32, title: &str) -> Course {
        Course {
            id: None,
            root_number: root,
            serial_number: sn,
            title: title.to_string(),
        }
    }

    #[test]
    fn courses_get_distinct_ids() {
        let db = sink();
        let saved = db
            .insert_courses(&[course(101, 1, "Algebra"), course(205, 1, "Logic")])
            .unwrap();
        let ids: Vec<i64> = saved.iter().map(|c| c.id.unwrap()).collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn meetings_round_trip_into_stats() {
        let db = sink();
        let saved = db.insert_courses(&[course(101, 1, "Algebra")]).unwrap();
        let id = saved[0].id.unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        db.insert_meetings(&[
            MeetingTime {
                course_id: id,
                start,
                end: start + chrono::Duration::hours(2),
                assessment: false,
            },
            MeetingTime {
                course_id: id,
                start,
                end: start + chrono::Duration::hours(3),
                assessment: true,
            },
        ])
        .unwrap();

        let stats = db.stats().unwrap();
        assert_eq!(stats.courses, 1);
        assert_eq!(stats.meetings, 2);
        assert_eq!(stats.assessments, 1);
    }

    #[test]
    fn init_schema_is_a_full_refresh() {
        let db = sink();
        db.insert_lecturers(&["A. Cohen".to_string()]).unwrap();
        db.init_schema().unwrap();
        assert_eq!(db.stats().unwrap().lecturers, 0);
    }

    #[test]
    fn lecturers_capture_ids() {
        let db = sink();
        let saved = db
            .insert_lecturers(&["A. Cohen".to_string(), "B. Levi".to_string()])
            .unwrap();
        assert_eq!(saved.len(), 2);
        assert_ne!(saved[0].id, saved[1].id);
        assert_eq!(saved[1].name, "B. Levi");
    }
}
