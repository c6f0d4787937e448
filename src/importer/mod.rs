//! Attendance sheet import/export
//!
//! Sheets arrive as CSV exports of the fingerprint terminal with a fixed
//! column order: employee identifier (NRIC), date, check-in, check-out.
//! Parsing is row-by-row with partial-success semantics: a bad row is
//! recorded with its number and reason and processing continues. One
//! malformed row never aborts the batch. This is deliberately the opposite
//! policy of the issue/return transitions, which are all-or-nothing.

use std::io::Read;

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::models::fingerprint::RowFailure;

/// Expected sheet header, also used for export
pub const SHEET_HEADER: [&str; 4] = ["nric", "date", "check_in", "check_out"];

/// Whole-sheet failures. Distinct from row failures: these abort the batch
/// before any row is processed and map to the `failed` /
/// `failed_validation` job statuses.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("failed to read attendance sheet: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid sheet data: {0}")]
    Csv(#[from] csv::Error),

    #[error("sheet header must be [{}]", SHEET_HEADER.join(", "))]
    BadHeader,

    #[error("sheet exceeds the {limit} row limit")]
    TooManyRows { limit: usize },
}

/// A validated sheet row ready for persistence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    /// 1-based data row number (header excluded)
    pub row: usize,
    pub user_id: i32,
    pub date: NaiveDate,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
}

/// Outcome of a parse pass: good rows plus the failure list
#[derive(Debug, Default)]
pub struct SheetOutcome {
    pub rows: Vec<ParsedRow>,
    pub failures: Vec<RowFailure>,
}

impl SheetOutcome {
    pub fn total(&self) -> usize {
        self.rows.len() + self.failures.len()
    }
}

/// Parse a sheet, resolving employee identifiers through `resolve`.
///
/// `resolve` maps the sheet's identifier column to a user id; returning
/// `None` fails that row only.
pub fn parse_sheet<R, F>(
    reader: R,
    max_rows: usize,
    resolve: F,
) -> Result<SheetOutcome, SheetError>
where
    R: Read,
    F: Fn(&str) -> Option<i32>,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?;
    let normalized: Vec<String> = headers
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_lowercase())
        .collect();
    if normalized.len() < SHEET_HEADER.len()
        || normalized[..SHEET_HEADER.len()] != SHEET_HEADER[..]
    {
        return Err(SheetError::BadHeader);
    }

    let mut outcome = SheetOutcome::default();

    for (index, record) in csv_reader.records().enumerate() {
        let row = index + 1;
        if outcome.total() >= max_rows {
            return Err(SheetError::TooManyRows { limit: max_rows });
        }

        let record = match record {
            Ok(record) => record,
            Err(e) => {
                outcome.failures.push(RowFailure {
                    row,
                    reason: format!("unreadable row: {}", e),
                });
                continue;
            }
        };

        match parse_record(row, &record, &resolve) {
            Ok(parsed) => outcome.rows.push(parsed),
            Err(reason) => outcome.failures.push(RowFailure { row, reason }),
        }
    }

    Ok(outcome)
}

fn parse_record<F>(row: usize, record: &csv::StringRecord, resolve: &F) -> Result<ParsedRow, String>
where
    F: Fn(&str) -> Option<i32>,
{
    if record.len() < SHEET_HEADER.len() {
        return Err(format!(
            "expected {} columns, found {}",
            SHEET_HEADER.len(),
            record.len()
        ));
    }

    let identifier = record.get(0).unwrap_or_default();
    if identifier.is_empty() {
        return Err("employee identifier is empty".to_string());
    }
    let user_id = resolve(identifier)
        .ok_or_else(|| format!("unknown employee identifier '{}'", identifier))?;

    let date = parse_date(record.get(1).unwrap_or_default())
        .ok_or_else(|| format!("invalid date '{}'", record.get(1).unwrap_or_default()))?;

    let check_in = parse_time_field(record.get(2).unwrap_or_default(), "check-in")?;
    let check_out = parse_time_field(record.get(3).unwrap_or_default(), "check-out")?;

    if let (Some(check_in), Some(check_out)) = (check_in, check_out) {
        if check_out <= check_in {
            return Err("check-out must be after check-in".to_string());
        }
    }

    Ok(ParsedRow {
        row,
        user_id,
        date,
        check_in,
        check_out,
    })
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    if value.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d/%m/%Y"))
        .ok()
}

fn parse_time_field(value: &str, label: &str) -> Result<Option<NaiveTime>, String> {
    if value.is_empty() {
        return Ok(None);
    }
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map(Some)
        .map_err(|_| format!("invalid {} time '{}'", label, value))
}

/// One export line: sheet column order matches the import contract
#[derive(Debug, Clone)]
pub struct ExportRow {
    pub nric: String,
    pub date: NaiveDate,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
}

/// Serialize export rows into sheet bytes
pub fn write_sheet(rows: &[ExportRow]) -> Result<Vec<u8>, SheetError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(SHEET_HEADER)?;
    for row in rows {
        writer.write_record([
            row.nric.as_str(),
            &row.date.format("%Y-%m-%d").to_string(),
            &row.check_in.map(|t| t.format("%H:%M:%S").to_string()).unwrap_or_default(),
            &row.check_out.map(|t| t.format("%H:%M:%S").to_string()).unwrap_or_default(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| SheetError::Io(std::io::Error::other(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn resolve(identifier: &str) -> Option<i32> {
        match identifier {
            "880101-14-5523" => Some(1),
            "900202-10-1234" => Some(2),
            _ => None,
        }
    }

    #[test]
    fn parses_a_clean_sheet() {
        let sheet = "nric,date,check_in,check_out\n\
880101-14-5523,2024-06-03,08:01:12,17:32:00\n\
900202-10-1234,03/06/2024,08:15,17:05\n";
        let outcome = parse_sheet(Cursor::new(sheet), 100, resolve).expect("parse");

        assert_eq!(outcome.rows.len(), 2);
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.rows[0].user_id, 1);
        assert_eq!(
            outcome.rows[1].date,
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
        );
    }

    #[test]
    fn bad_rows_are_reported_and_skipped() {
        // Ten rows; row 4 has an invalid date, row 7 has check-out before
        // check-in. Expect 8 successes and 2 numbered failures.
        let mut sheet = String::from("nric,date,check_in,check_out\n");
        for row in 1..=10 {
            let line = match row {
                4 => "880101-14-5523,not-a-date,08:00,17:00\n".to_string(),
                7 => "880101-14-5523,2024-06-07,17:00,08:00\n".to_string(),
                n => format!("880101-14-5523,2024-06-{:02},08:00,17:00\n", n),
            };
            sheet.push_str(&line);
        }

        let outcome = parse_sheet(Cursor::new(sheet.as_bytes()), 100, resolve).expect("parse");
        assert_eq!(outcome.rows.len(), 8);
        assert_eq!(outcome.failures.len(), 2);
        assert_eq!(outcome.failures[0].row, 4);
        assert!(outcome.failures[0].reason.contains("invalid date"));
        assert_eq!(outcome.failures[1].row, 7);
        assert!(outcome.failures[1].reason.contains("check-out"));
    }

    #[test]
    fn unknown_employee_fails_that_row_only() {
        let sheet = "nric,date,check_in,check_out\n\
999999-99-9999,2024-06-03,08:00,17:00\n\
880101-14-5523,2024-06-03,08:00,17:00\n";
        let outcome = parse_sheet(Cursor::new(sheet), 100, resolve).expect("parse");

        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].row, 1);
        assert!(outcome.failures[0].reason.contains("unknown employee"));
    }

    #[test]
    fn missing_times_are_an_absence_not_an_error() {
        let sheet = "nric,date,check_in,check_out\n880101-14-5523,2024-06-03,,\n";
        let outcome = parse_sheet(Cursor::new(sheet), 100, resolve).expect("parse");

        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.rows[0].check_in, None);
        assert_eq!(outcome.rows[0].check_out, None);
    }

    #[test]
    fn wrong_header_aborts_the_batch() {
        let sheet = "name,day,in,out\nA,2024-06-03,08:00,17:00\n";
        let err = parse_sheet(Cursor::new(sheet), 100, resolve).unwrap_err();
        assert!(matches!(err, SheetError::BadHeader));
    }

    #[test]
    fn row_limit_is_enforced() {
        let sheet = "nric,date,check_in,check_out\n\
880101-14-5523,2024-06-03,08:00,17:00\n\
880101-14-5523,2024-06-04,08:00,17:00\n";
        let err = parse_sheet(Cursor::new(sheet), 1, resolve).unwrap_err();
        assert!(matches!(err, SheetError::TooManyRows { limit: 1 }));
    }

    #[test]
    fn export_round_trips_the_column_order() {
        let rows = vec![ExportRow {
            nric: "880101-14-5523".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            check_in: NaiveTime::from_hms_opt(8, 0, 0),
            check_out: None,
        }];
        let bytes = write_sheet(&rows).expect("write");
        let text = String::from_utf8(bytes).expect("utf8");

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("nric,date,check_in,check_out"));
        assert_eq!(lines.next(), Some("880101-14-5523,2024-06-03,08:00:00,"));
    }
}
