use std::sync::LazyLock;

use chrono::NaiveDateTime;
use scraper::{ElementRef, Html, Selector};

use super::ExtractError;
use crate::model::MeetingTime;

/// Positional schema of the schedule grid. The layout carries no header
/// text, so cells are addressed by index within the row's data cells.
pub mod col {
    /// Weekday name. Reserved; redundant with DATE and not emitted.
    pub const WEEKDAY: usize = 1;
    pub const DATE: usize = 2;
    pub const BEGIN: usize = 3;
    pub const END: usize = 4;
    pub const ASSESSMENT: usize = 5;
}

/// Column definitions the target grid declares in its colgroup. Layout
/// tables on the same page never declare this many.
const SCHEDULE_COLUMNS: usize = 9;

const DATE_TIME_FORMAT: &str = "%d/%m/%Y %H:%M";

static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static COLGROUP: LazyLock<Selector> = LazyLock::new(|| Selector::parse("colgroup").unwrap());
static COL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("col").unwrap());
static TR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static TD: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());

/// Extract every meeting time from a course's detail-page fragment.
///
/// Pure function of its inputs. Selects the schedule grid by structural
/// fingerprint (border attribute + 9-column group), then parses each data
/// row positionally. Rows without data cells are header or spacer rows
/// and contribute nothing; any other row that does not parse fails the
/// whole invocation, so no partial rows are ever emitted.
pub fn extract_schedule(
    course_id: i64,
    fragment: &str,
) -> Result<Vec<MeetingTime>, ExtractError> {
    if fragment.trim().is_empty() {
        return Err(ExtractError::DocumentParse);
    }

    let doc = Html::parse_document(fragment);
    let table = select_schedule_table(&doc)?;

    let mut meetings = Vec::new();
    for (row, tr) in table.select(&TR).enumerate() {
        let cells: Vec<ElementRef> = tr.select(&TD).collect();
        if cells.is_empty() {
            continue;
        }
        meetings.push(parse_row(course_id, row, &cells)?);
    }

    Ok(meetings)
}

/// First table in document order that declares a border attribute (any
/// value) and a column group of exactly [`SCHEDULE_COLUMNS`] definitions.
fn select_schedule_table(doc: &Html) -> Result<ElementRef<'_>, ExtractError> {
    doc.select(&TABLE)
        .find(|table| {
            table.value().attr("border").is_some()
                && colgroup_width(*table) == SCHEDULE_COLUMNS
        })
        .ok_or(ExtractError::TableNotFound)
}

fn colgroup_width(table: ElementRef) -> usize {
    table
        .select(&COLGROUP)
        .next()
        .map(|group| group.select(&COL).count())
        .unwrap_or(0)
}

fn parse_row(
    course_id: i64,
    row: usize,
    cells: &[ElementRef],
) -> Result<MeetingTime, ExtractError> {
    let date = cell_text(cells, row, col::DATE)?;
    let begin = cell_text(cells, row, col::BEGIN)?;
    let end = cell_text(cells, row, col::END)?;
    // "No" is the one value that clears the flag; empty or anything else
    // marks an assessment.
    let assessment = cell_text(cells, row, col::ASSESSMENT)? != "No";

    Ok(MeetingTime {
        course_id,
        start: parse_date_time(row, &date, &begin)?,
        end: parse_date_time(row, &date, &end)?,
        assessment,
    })
}

/// Cell text is taken verbatim; the grid contract is exact, so trimming
/// would widen what the extractor accepts.
fn cell_text(
    cells: &[ElementRef],
    row: usize,
    index: usize,
) -> Result<String, ExtractError> {
    let cell = cells.get(index).ok_or(ExtractError::RowTooShort {
        row,
        found: cells.len(),
    })?;
    Ok(cell.text().collect())
}

/// Meetings start and end on the same calendar day, so both timestamps
/// compose the shared date cell with their own time cell.
fn parse_date_time(row: usize, date: &str, time: &str) -> Result<NaiveDateTime, ExtractError> {
    let composed = format!("{} {}", date, time);
    NaiveDateTime::parse_from_str(&composed, DATE_TIME_FORMAT).map_err(|source| {
        ExtractError::DateTimeParse {
            row,
            value: composed,
            source,
        }
    })
}

// ── Tests ──
