//! Timestamps as emitted by the investor API.
//!
//! The API writes ISO-8601 with an explicit offset, sometimes with a colon in
//! the offset (`-08:00`) and sometimes without (`-0800`). Both are accepted; the
//! original offset is kept.

use std::fmt::{Display, Formatter};

use serde::{Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

const COMPACT_OFFSET_SUBSECOND: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory][offset_minute]"
);

const COMPACT_OFFSET: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory][offset_minute]"
);

/// A point in time with the offset the API reported it in.
///
/// Equality and ordering compare instants, so `10:00-08:00` equals
/// `18:00Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiTimestamp(OffsetDateTime);

impl ApiTimestamp {
    /// Parses a timestamp, returning `None` if it matches no accepted form.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        OffsetDateTime::parse(input, &Rfc3339)
            .or_else(|_| OffsetDateTime::parse(input, COMPACT_OFFSET_SUBSECOND))
            .or_else(|_| OffsetDateTime::parse(input, COMPACT_OFFSET))
            .ok()
            .map(Self)
    }

    pub fn into_inner(self) -> OffsetDateTime {
        self.0
    }

    pub fn format_rfc3339(self) -> String {
        // Years outside 0..=9999 cannot come out of `parse`.
        self.0
            .format(&Rfc3339)
            .unwrap_or_else(|_| self.0.to_string())
    }
}

impl From<OffsetDateTime> for ApiTimestamp {
    fn from(value: OffsetDateTime) -> Self {
        Self(value)
    }
}

impl Display for ApiTimestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_rfc3339())
    }
}

impl Serialize for ApiTimestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_rfc3339())
    }
}
