//! Interactive operator menu.
//!
//! The menu is a small state machine: each selection runs one flow to
//! completion and returns to the menu, except `Exit` or end of input,
//! which end the loop. Domain failures (unknown item, unknown bill id,
//! bad dates, write failures) are shown to the operator and never abort
//! the session; only I/O errors on the operator streams propagate.

use chrono::Local;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::bill::{receipt_file_name, Bill};
use crate::error::{PosError, Result};
use crate::report::{generate_revenue_report, DateRange};
use crate::session::PosSession;

const DONE_TOKEN: &str = "done";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    NewBill,
    RetrievePending,
    ListPending,
    RevenueReport,
    Exit,
}

impl MenuOption {
    pub fn from_input(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::NewBill),
            "2" => Some(Self::RetrievePending),
            "3" => Some(Self::ListPending),
            "4" => Some(Self::RevenueReport),
            "5" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Where a flow leaves the menu loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Menu,
    Exit,
}

pub struct Controller<R, W> {
    session: PosSession,
    output_dir: PathBuf,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Controller<R, W> {
    pub fn new(session: PosSession, output_dir: PathBuf, input: R, output: W) -> Self {
        Self {
            session,
            output_dir,
            input,
            output,
        }
    }

    pub fn into_session(self) -> PosSession {
        self.session
    }

    /// Run the menu until the operator exits or input ends
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.print_menu()?;
            let Some(choice) = self.prompt("Select an option: ")? else {
                tracing::debug!("input closed at menu");
                return Ok(());
            };

            let flow = match MenuOption::from_input(&choice) {
                Some(MenuOption::NewBill) => self.new_bill()?,
                Some(MenuOption::RetrievePending) => self.retrieve_pending()?,
                Some(MenuOption::ListPending) => {
                    self.show_pending()?;
                    Flow::Menu
                }
                Some(MenuOption::RevenueReport) => self.revenue_report()?,
                Some(MenuOption::Exit) => {
                    writeln!(self.output, "Exiting SuperSaver POS. Goodbye!")?;
                    Flow::Exit
                }
                None => {
                    writeln!(self.output, "Invalid option. Try again.")?;
                    Flow::Menu
                }
            };

            if flow == Flow::Exit {
                return Ok(());
            }
        }
    }

    fn print_menu(&mut self) -> Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "=== SuperSaver POS ===")?;
        writeln!(self.output, "1. New Bill")?;
        writeln!(self.output, "2. Retrieve Pending Bill")?;
        writeln!(self.output, "3. Show All Pending Bills")?;
        writeln!(self.output, "4. Generate Revenue Report")?;
        writeln!(self.output, "5. Exit")?;
        Ok(())
    }

    /// Print `text` and read one line. `None` on end of input.
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "{text}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn new_bill(&mut self) -> Result<Flow> {
        let Some(cashier) = self.prompt("Enter Cashier Name: ")? else {
            return Ok(Flow::Exit);
        };
        let Some(branch) = self.prompt("Enter Branch: ")? else {
            return Ok(Flow::Exit);
        };
        let Some(customer) = self.prompt("Enter Customer Name (or press Enter for Guest): ")?
        else {
            return Ok(Flow::Exit);
        };

        let mut bill = Bill::new(&cashier, &branch, &customer);

        if !self.collect_items(
            &mut bill,
            "Enter Item Code (or type 'done' to finish): ",
            "added to the bill.",
        )? {
            return Ok(abandon(bill));
        }

        writeln!(self.output)?;
        writeln!(self.output, "--- Bill Summary ---")?;
        writeln!(self.output, "Total Cost: Rs.{:.2}", bill.total())?;

        self.dispose(bill, "Save bill as pending? (yes/no): ", None)
    }

    fn retrieve_pending(&mut self) -> Result<Flow> {
        self.show_pending()?;
        let Some(raw) = self.prompt("Enter Bill ID to retrieve: ")? else {
            return Ok(Flow::Exit);
        };

        let id = match raw.trim().parse::<u32>() {
            Ok(id) => id,
            Err(_) => {
                writeln!(self.output, "{}", PosError::InvalidBillId(raw.trim().to_string()))?;
                return Ok(Flow::Menu);
            }
        };

        let mut bill = match self.session.retrieve_pending(id) {
            Ok(bill) => bill,
            Err(e) => {
                writeln!(self.output, "{e}")?;
                return Ok(Flow::Menu);
            }
        };

        writeln!(self.output)?;
        writeln!(self.output, "--- Retrieved Bill Summary ---")?;
        writeln!(self.output, "Customer: {}", bill.customer)?;
        writeln!(self.output, "Total Cost: Rs.{:.2}", bill.total())?;

        if !self.collect_items(
            &mut bill,
            "Enter Item Code to add (or type 'done' to finish): ",
            "added.",
        )? {
            return Ok(abandon(bill));
        }

        writeln!(self.output)?;
        writeln!(self.output, "Updated Total Cost: Rs.{:.2}", bill.total())?;

        self.dispose(bill, "Save updated bill as pending? (yes/no): ", Some(id))
    }

    /// Read item codes until `done`. Returns false if input ended first.
    fn collect_items(&mut self, bill: &mut Bill, prompt: &str, added: &str) -> Result<bool> {
        loop {
            let Some(code) = self.prompt(prompt)? else {
                return Ok(false);
            };
            let code = code.trim();
            if code.eq_ignore_ascii_case(DONE_TOKEN) {
                return Ok(true);
            }

            match self.session.lookup(code) {
                Ok(item) => {
                    let item = item.clone();
                    writeln!(self.output, "{} {added}", item.name)?;
                    bill.add_item(item);
                }
                Err(e) => writeln!(self.output, "{e}")?,
            }
        }
    }

    /// Park the bill on "yes", otherwise finalize it to a receipt.
    /// A bill retrieved from the pending table keeps its old id as the receipt token.
    fn dispose(&mut self, bill: Bill, question: &str, retained_id: Option<u32>) -> Result<Flow> {
        let Some(answer) = self.prompt(question)? else {
            return Ok(abandon(bill));
        };

        if answer.trim().eq_ignore_ascii_case("yes") {
            let id = self.session.save_pending(bill);
            writeln!(self.output, "Bill saved as pending with ID: {id}")?;
            return Ok(Flow::Menu);
        }

        let path = match retained_id {
            Some(id) => self.retained_receipt_path(id),
            None => self.fresh_receipt_path(),
        };
        match bill.finalize(&path) {
            Ok(()) => writeln!(
                self.output,
                "Bill finalized and saved to {}",
                path.display()
            )?,
            Err(e) => {
                tracing::error!(error = %e, "receipt not written");
                writeln!(self.output, "{e}")?;
            }
        }
        Ok(Flow::Menu)
    }

    /// Receipt path keyed by the current time in milliseconds, bumped past existing files
    fn fresh_receipt_path(&self) -> PathBuf {
        let mut token = Local::now().timestamp_millis();
        loop {
            let path = self.output_dir.join(receipt_file_name(token));
            if !path.exists() {
                return path;
            }
            token += 1;
        }
    }

    /// `Bill_<id>.txt`, or `Bill_<id>-<n>.txt` when an earlier session already
    /// finalized a bill under the same id
    fn retained_receipt_path(&self, id: u32) -> PathBuf {
        let path = self.output_dir.join(receipt_file_name(id));
        if !path.exists() {
            return path;
        }

        let mut suffix = 1u32;
        loop {
            let candidate = self.output_dir.join(receipt_file_name(format!("{id}-{suffix}")));
            if !candidate.exists() {
                tracing::warn!(
                    existing = %path.display(),
                    path = %candidate.display(),
                    "receipt name taken, writing under a suffixed name"
                );
                return candidate;
            }
            suffix += 1;
        }
    }

    fn show_pending(&mut self) -> Result<()> {
        if self.session.pending_count() == 0 {
            writeln!(self.output, "No pending bills.")?;
            return Ok(());
        }

        writeln!(self.output, "--- Pending Bills ---")?;
        for pending in self.session.list_pending() {
            writeln!(
                self.output,
                "ID: {} | Customer: {} | Total: Rs.{:.2}",
                pending.id, pending.customer, pending.total
            )?;
        }
        Ok(())
    }

    fn revenue_report(&mut self) -> Result<Flow> {
        let Some(start) = self.prompt("Enter Start Date (yyyy-MM-dd): ")? else {
            return Ok(Flow::Exit);
        };
        let Some(end) = self.prompt("Enter End Date (yyyy-MM-dd): ")? else {
            return Ok(Flow::Exit);
        };

        let range = match DateRange::parse(&start, &end) {
            Ok(range) => range,
            Err(e) => {
                writeln!(self.output, "{e}")?;
                return Ok(Flow::Menu);
            }
        };

        match generate_revenue_report(&self.output_dir, &range) {
            Ok((summary, path)) => {
                for skipped in &summary.skipped {
                    writeln!(
                        self.output,
                        "Error reading bill file {}: {}",
                        skipped.path.display(),
                        skipped.error
                    )?;
                }
                writeln!(
                    self.output,
                    "Total Revenue: Rs.{:.2} from {} receipt(s)",
                    summary.total,
                    summary.included.len()
                )?;
                writeln!(self.output, "Revenue Report generated: {}", path.display())?;
            }
            Err(e) => {
                tracing::error!(error = %e, "revenue report failed");
                writeln!(self.output, "{e}")?;
            }
        }
        Ok(Flow::Menu)
    }
}

fn abandon(bill: Bill) -> Flow {
    tracing::warn!(
        customer = %bill.customer,
        items = bill.items().len(),
        "input closed, discarding bill in progress"
    );
    Flow::Exit
}
