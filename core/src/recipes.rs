//! Normalization tables for each resource the facades expose.

use crate::normalize::{EnumTable, FieldKind, Recipe};

/// Human-readable transfer frequencies mapped to the tokens the funds
/// endpoints accept.
pub static TRANSFER_FREQUENCY: EnumTable = EnumTable {
    name: "transfer frequency",
    entries: &[
        ("One Time", "LOAD_ONCE"),
        ("Weekly", "LOAD_WEEKLY"),
        ("Every Other Week", "LOAD_BIWEEKLY"),
        ("1st and 16th of each Month", "LOAD_ON_DAY_1_AND_16"),
        ("Monthly", "LOAD_MONTHLY"),
    ],
};

pub static LISTED_LOAN: Recipe = Recipe {
    resource: "listed loan",
    fields: &[
        ("ilsExpD", FieldKind::Timestamp),
        ("earliestCrLine", FieldKind::Timestamp),
        ("acceptD", FieldKind::Timestamp),
        ("expD", FieldKind::Timestamp),
        ("listD", FieldKind::Timestamp),
        ("creditPullD", FieldKind::Timestamp),
        ("reviewStatusD", FieldKind::Timestamp),
    ],
};

/// The listing envelope around `loans`.
pub static LOAN_LISTING: Recipe = Recipe {
    resource: "loan listing",
    fields: &[("asOfDate", FieldKind::Timestamp)],
};

/// `endDate` is null for open-ended transfers.
pub static PENDING_TRANSFER: Recipe = Recipe {
    resource: "pending transfer",
    fields: &[
        ("transferDate", FieldKind::Timestamp),
        ("endDate", FieldKind::Timestamp),
        ("frequency", FieldKind::Enum(&TRANSFER_FREQUENCY)),
    ],
};

pub static OWNED_NOTE: Recipe = Recipe {
    resource: "owned note",
    fields: &[
        ("loanStatusDate", FieldKind::Timestamp),
        ("orderDate", FieldKind::Timestamp),
        ("issueDate", FieldKind::Timestamp),
        ("nextPaymentDate", FieldKind::Timestamp),
    ],
};
