pub mod lecturers;
pub mod schedule;

pub use schedule::extract_schedule;

use thiserror::Error;

/// Failures the schedule extractor can report. Each kind is distinct so
/// the caller can decide abort-vs-skip policy per course.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The fragment contains no markup at all.
    #[error("fragment is empty")]
    DocumentParse,

    /// No table declares both a border attribute and the column group the
    /// schedule grid is recognized by.
    #[error("no table matches the schedule grid fingerprint")]
    TableNotFound,

    /// A data row ended before the last cell the grid schema requires.
    #[error("row {row}: expected a cell at every schema position, found {found}")]
    RowTooShort { row: usize, found: usize },

    /// A composed date/time cell pair did not match `D/M/YYYY HH:MM`.
    #[error("row {row}: cannot parse {value:?} as a meeting time")]
    DateTimeParse {
        row: usize,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}
