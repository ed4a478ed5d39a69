use chrono::NaiveDate;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::bill::receipt::{
    is_receipt_file_name, parse_date_line, parse_total_line, write_atomic, CURRENCY,
    RECEIPT_MARKER,
};
use crate::error::{PosError, Result};

pub const REPORT_HEADER: &str = "Super-Saving Supermarket - Revenue Report";
pub const REPORT_PREFIX: &str = "Revenue_Report_";

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| PosError::InvalidDate(input.to_string()))
}

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(PosError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// A receipt file that could not be counted
#[derive(Debug)]
pub struct SkippedReceipt {
    pub path: PathBuf,
    pub error: PosError,
}

#[derive(Debug)]
pub struct RevenueSummary {
    pub range: DateRange,
    pub total: f64,
    /// Receipts dated inside the range whose totals were summed
    pub included: Vec<PathBuf>,
    pub skipped: Vec<SkippedReceipt>,
}

/// Sum the totals of every receipt in `dir` dated within `range`.
///
/// Files are visited in name order. A receipt that cannot be read or
/// parsed is recorded in [`RevenueSummary::skipped`] and does not stop the
/// scan. Only failing to list `dir` itself is an error.
pub fn aggregate_revenue(dir: &Path, range: &DateRange) -> Result<RevenueSummary> {
    let mut receipts: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .map(is_receipt_file_name)
                .unwrap_or(false)
        })
        .map(|entry| entry.path())
        .collect();
    receipts.sort();

    let mut summary = RevenueSummary {
        range: *range,
        total: 0.0,
        included: Vec::new(),
        skipped: Vec::new(),
    };

    for path in receipts {
        match read_receipt_total(&path, range) {
            Ok(Some(amount)) => {
                tracing::debug!(path = %path.display(), amount, "receipt counted");
                summary.total += amount;
                summary.included.push(path);
            }
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "skipped receipt");
                summary.skipped.push(SkippedReceipt { path, error });
            }
        }
    }

    Ok(summary)
}

/// Read one receipt. `Ok(None)` means it is dated outside `range`.
fn read_receipt_total(path: &Path, range: &DateRange) -> Result<Option<f64>> {
    let malformed = |reason: &str| PosError::MalformedReceipt {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    let mut lines = BufReader::new(File::open(path)?).lines();

    let header = lines.next().transpose()?.unwrap_or_default();
    if !header.contains(RECEIPT_MARKER) {
        return Err(malformed("not a bill receipt"));
    }

    let date_line = lines
        .next()
        .transpose()?
        .ok_or_else(|| malformed("missing date line"))?;
    let date = parse_date_line(&date_line).ok_or_else(|| malformed("unparsable date"))?;
    if !range.contains(date) {
        return Ok(None);
    }

    let mut last = None;
    for line in lines {
        let line = line?;
        if !line.trim().is_empty() {
            last = Some(line);
        }
    }
    let last = last.ok_or_else(|| malformed("missing total line"))?;
    parse_total_line(&last)
        .map(Some)
        .ok_or_else(|| malformed("unparsable total line"))
}

/// e.g. `Revenue_Report_2024-01-01_to_2024-01-31.txt`
pub fn report_file_name(range: &DateRange) -> String {
    format!("{}{}_to_{}.txt", REPORT_PREFIX, range.start, range.end)
}

pub fn render_report(summary: &RevenueSummary) -> String {
    format!(
        "{REPORT_HEADER}\nDate Range: {} to {}\nTotal Revenue: {CURRENCY}{:.2}\n",
        summary.range.start, summary.range.end, summary.total
    )
}

/// Write the summary report into `dir`, replacing any report for the same range
pub fn write_revenue_report(dir: &Path, summary: &RevenueSummary) -> Result<PathBuf> {
    let path = dir.join(report_file_name(&summary.range));
    write_atomic(&path, &render_report(summary)).map_err(|source| PosError::ReportWrite {
        path: path.clone(),
        source,
    })?;
    tracing::info!(
        path = %path.display(),
        total = summary.total,
        receipts = summary.included.len(),
        skipped = summary.skipped.len(),
        "revenue report written"
    );
    Ok(path)
}

/// Aggregate receipts in `dir` and write the report alongside them
pub fn generate_revenue_report(dir: &Path, range: &DateRange) -> Result<(RevenueSummary, PathBuf)> {
    let summary = aggregate_revenue(dir, range)?;
    let path = write_revenue_report(dir, &summary)?;
    Ok((summary, path))
}
