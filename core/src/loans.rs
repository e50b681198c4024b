//! The public loan listing.

use crate::connection::Connection;
use crate::error::ApiError;
use crate::normalize::{check_for_logical_error, normalize_collection, Record};
use crate::recipes::{LISTED_LOAN, LOAN_LISTING};
use crate::timestamp::ApiTimestamp;

const LISTING_RESOURCE: &str = "loans/listing";
const LOANS_KEY: &str = "loans";

/// A normalized snapshot of the listing.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanListing {
    /// Every top-level field of the response except `loans`.
    pub envelope: Record,
    pub loans: Vec<Record>,
}

impl LoanListing {
    /// When the API took the snapshot.
    pub fn as_of_date(&self) -> Option<ApiTimestamp> {
        self.envelope.timestamp("asOfDate")
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Loans<'a> {
    connection: &'a Connection,
}

impl<'a> Loans<'a> {
    pub fn new(connection: &'a Connection) -> Self {
        Self { connection }
    }

    /// Loans currently listed. Without `show_all` the API only returns loans
    /// listed in the most recent listing window.
    pub fn listed_loans(&self, show_all: bool) -> Result<LoanListing, ApiError> {
        let show_all = if show_all { "true" } else { "false" };
        tracing::debug!(resource = LISTING_RESOURCE, show_all, "retrieving listed loans");

        let mut payload = self
            .connection
            .get(LISTING_RESOURCE, &[("showAll", show_all)])?;
        check_for_logical_error(&payload)?;

        let loans = normalize_collection(&mut payload, LOANS_KEY, &LISTED_LOAN)?;
        if let Some(object) = payload.as_object_mut() {
            object.remove(LOANS_KEY);
        }
        let envelope = LOAN_LISTING.apply_value(payload)?;

        Ok(LoanListing { envelope, loans })
    }
}
