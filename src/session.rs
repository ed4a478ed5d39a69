use std::collections::BTreeMap;

use crate::bill::Bill;
use crate::catalog::{Catalog, Item};
use crate::error::{PosError, Result};

/// First id handed out to a pending bill
pub const FIRST_PENDING_ID: u32 = 1001;

/// One row of the pending-bill listing
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSummary<'a> {
    pub id: u32,
    pub customer: &'a str,
    pub total: f64,
}

/// Catalog plus the in-memory table of parked bills.
///
/// Pending bills live only for the lifetime of the process. Ids increase
/// by one per save and are never reused, even after retrieval.
#[derive(Debug)]
pub struct PosSession {
    catalog: Catalog,
    pending: BTreeMap<u32, Bill>,
    next_pending_id: u32,
}

impl PosSession {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            pending: BTreeMap::new(),
            next_pending_id: FIRST_PENDING_ID,
        }
    }

    pub fn lookup(&self, code: &str) -> Result<&Item> {
        self.catalog
            .get(code)
            .ok_or_else(|| PosError::ItemNotFound(code.to_string()))
    }

    /// Park a bill and return its new id
    pub fn save_pending(&mut self, bill: Bill) -> u32 {
        let id = self.next_pending_id;
        self.next_pending_id += 1;
        tracing::info!(id, customer = %bill.customer, "bill saved as pending");
        self.pending.insert(id, bill);
        id
    }

    /// Remove and return a parked bill. A second call with the same id fails.
    pub fn retrieve_pending(&mut self, id: u32) -> Result<Bill> {
        let bill = self
            .pending
            .remove(&id)
            .ok_or(PosError::PendingBillNotFound(id))?;
        tracing::info!(id, "pending bill retrieved");
        Ok(bill)
    }

    /// Parked bills in ascending id order
    pub fn list_pending(&self) -> impl Iterator<Item = PendingSummary<'_>> + '_ {
        self.pending.iter().map(|(id, bill)| PendingSummary {
            id: *id,
            customer: &bill.customer,
            total: bill.total(),
        })
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
