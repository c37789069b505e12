use std::path::Path;

use anyhow::Result;
use rusqlite::Connection;

use crate::model::Course;

/// Read-only handle on the scraped catalog database. Column names follow
/// the scraper's schema: `rootNumber`, `sn`, `title`, `lecturer`,
/// `rawDetail`.
pub struct SourceDb {
    conn: Connection,
}

impl SourceDb {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Every offering in the catalog, in source order.
    pub fn fetch_courses(&self) -> Result<Vec<Course>> {
        let mut stmt = self
            .conn
            .prepare("SELECT rootNumber, sn, title FROM courses")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Course {
                    id: None,
                    root_number: row.get(0)?,
                    serial_number: row.get(1)?,
                    title: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// The raw detail-page fragment stored with one offering.
    pub fn fetch_fragment(&self, root_number: i32, serial_number: i32) -> Result<String> {
        let fragment = self.conn.query_row(
            "SELECT rawDetail FROM courses WHERE rootNumber = ?1 AND sn = ?2",
            (root_number, serial_number),
            |row| row.get(0),
        )?;
        Ok(fragment)
    }

    /// Raw lecturer column values; blank fields are filtered in SQL.
    pub fn fetch_lecturer_fields(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT lecturer FROM courses WHERE lecturer != ''")?;
        let rows = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> SourceDb {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE courses (
                rootNumber INTEGER NOT NULL,
                sn         INTEGER NOT NULL,
                title      TEXT NOT NULL,
                lecturer   TEXT NOT NULL DEFAULT '',
                rawDetail  TEXT NOT NULL DEFAULT ''
            );
            INSERT INTO courses VALUES (101, 1, 'Algebra', 'A. Cohen, B. Levi', '<html></html>');
            INSERT INTO courses VALUES (101, 2, 'Algebra (retake)', '', '<table></table>');
            INSERT INTO courses VALUES (205, 1, 'Logic', 'A. Cohen', '');
            ",
        )
        .unwrap();
        SourceDb { conn }
    }

    #[test]
    fn fetches_courses_in_source_order() {
        let courses = seeded().fetch_courses().unwrap();
        assert_eq!(courses.len(), 3);
        assert_eq!(courses[0].root_number, 101);
        assert_eq!(courses[0].serial_number, 1);
        assert_eq!(courses[2].title, "Logic");
        assert!(courses.iter().all(|c| c.id.is_none()));
    }

    #[test]
    fn fetches_fragment_by_identity() {
        let fragment = seeded().fetch_fragment(101, 2).unwrap();
        assert_eq!(fragment, "<table></table>");
    }

    #[test]
    fn missing_course_is_an_error() {
        assert!(seeded().fetch_fragment(999, 1).is_err());
    }

    #[test]
    fn lecturer_fields_skip_blanks() {
        let fields = seeded().fetch_lecturer_fields().unwrap();
        assert_eq!(fields, vec!["A. Cohen, B. Levi", "A. Cohen"]);
    }
}
