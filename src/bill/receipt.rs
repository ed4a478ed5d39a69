//! Receipt line format.
//!
//! Receipts are both the printed output of a finalized bill and the only
//! input to revenue aggregation, which reads them back by position: line 2
//! carries the date, the last non-empty line carries the total. Any change
//! to the layout must bump [`RECEIPT_FORMAT_VERSION`] and keep the parser
//! able to read older receipts.

use chrono::NaiveDate;
use std::fmt::Display;
use std::fs;
use std::path::Path;

use super::Bill;

pub const RECEIPT_FORMAT_VERSION: u32 = 1;

pub const RECEIPT_HEADER: &str = "Super-Saving Supermarket - Bill Receipt";
/// Substring of the first line that identifies a receipt
pub const RECEIPT_MARKER: &str = "Bill Receipt";
pub const RECEIPT_PREFIX: &str = "Bill_";
pub const RECEIPT_SUFFIX: &str = ".txt";
pub const CURRENCY: &str = "Rs.";

const DATE_LABEL: &str = "Date & Time: ";
const TOTAL_LABEL: &str = "Total Cost: ";
const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const SEPARATOR_WIDTH: usize = 52;

/// Render a bill in receipt format
pub fn render(bill: &Bill) -> String {
    let mut out = format!(
        "{RECEIPT_HEADER}\n\
         {DATE_LABEL}{}\n\
         Cashier: {}, Branch: {}, Customer: {}\n\
         \n\
         Item Details:\n\
         {}\n",
        bill.created_at.format(DATE_TIME_FORMAT),
        bill.cashier,
        bill.branch,
        bill.customer,
        "-".repeat(SEPARATOR_WIDTH),
    );
    for item in bill.items() {
        out.push_str(&format!(
            "{} - {CURRENCY}{:.2} (Discounted: {CURRENCY}{:.2})\n",
            item.name,
            item.price,
            item.discounted_price()
        ));
    }
    out.push_str(&format!("\n{TOTAL_LABEL}{CURRENCY}{:.2}\n", bill.total()));
    out
}

/// File name for a finalized receipt, e.g. `Bill_1001.txt`
pub fn receipt_file_name(token: impl Display) -> String {
    format!("{RECEIPT_PREFIX}{token}{RECEIPT_SUFFIX}")
}

pub fn is_receipt_file_name(name: &str) -> bool {
    name.starts_with(RECEIPT_PREFIX) && name.ends_with(RECEIPT_SUFFIX)
}

/// Extract the calendar date from a `Date & Time: yyyy-MM-dd HH:mm:ss` line
pub fn parse_date_line(line: &str) -> Option<NaiveDate> {
    let (_, value) = line.split_once(": ")?;
    let date = value.split(' ').next()?;
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()
}

/// Extract the amount from a `Total Cost: Rs.<amount>` line
pub fn parse_total_line(line: &str) -> Option<f64> {
    let rest = line.trim().strip_prefix(TOTAL_LABEL.trim_end())?;
    let (_, amount) = rest.split_once(CURRENCY)?;
    amount.trim().parse().ok()
}

/// Write `contents` to a sibling temp file, then rename it over `path`
pub(crate) fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sample_item;
    use chrono::NaiveDateTime;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, DATE_TIME_FORMAT).unwrap()
    }

    #[test]
    fn renders_full_receipt() {
        let mut bill = Bill::with_timestamp("Nimal", "Colombo", "Kamal", at("2024-03-05 14:07:09"));
        bill.add_item(sample_item("A1", "Soap", 50.0, 10.0));
        bill.add_item(sample_item("B2", "Rice", 320.0, 0.0));

        let expected = "\
Super-Saving Supermarket - Bill Receipt
Date & Time: 2024-03-05 14:07:09
Cashier: Nimal, Branch: Colombo, Customer: Kamal

Item Details:
----------------------------------------------------
Soap - Rs.50.00 (Discounted: Rs.45.00)
Rice - Rs.320.00 (Discounted: Rs.320.00)

Total Cost: Rs.365.00
";
        assert_eq!(render(&bill), expected);
    }

    #[test]
    fn empty_bill_has_no_item_lines() {
        let bill = Bill::with_timestamp("Nimal", "Colombo", "", at("2024-03-05 09:00:00"));
        let text = render(&bill);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[2], "Cashier: Nimal, Branch: Colombo, Customer: Guest");
        assert_eq!(lines[5], "-".repeat(52));
        assert_eq!(lines[6], "");
        assert_eq!(lines[7], "Total Cost: Rs.0.00");
        assert_eq!(lines.len(), 8);
    }

    #[test]
    fn parses_date_line() {
        assert_eq!(
            parse_date_line("Date & Time: 2024-03-05 14:07:09"),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
        assert_eq!(parse_date_line("Date & Time: yesterday"), None);
        assert_eq!(parse_date_line("no separator"), None);
    }

    #[test]
    fn parses_total_line() {
        assert_eq!(parse_total_line("Total Cost: Rs.365.00"), Some(365.0));
        assert_eq!(parse_total_line("Total Cost: Rs.90.0"), Some(90.0));
        assert_eq!(parse_total_line("Total Cost: Rs.abc"), None);
        assert_eq!(
            parse_total_line("Soap - Rs.50.00 (Discounted: Rs.45.00)"),
            None
        );
    }

    #[test]
    fn recognises_receipt_file_names() {
        assert_eq!(receipt_file_name(1001), "Bill_1001.txt");
        assert!(is_receipt_file_name("Bill_1700000000000.txt"));
        assert!(!is_receipt_file_name("Bill_1001.txt.tmp"));
        assert!(!is_receipt_file_name("Revenue_Report_2024-01-01_to_2024-01-31.txt"));
    }
}
