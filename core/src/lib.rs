//! Blocking client for the LendingClub investor API.
//!
//! # Overview
//! `Connection` owns the API key, keeps consecutive requests at least
//! `request_delay` apart, and maps HTTP statuses onto `ApiError`. The
//! `normalize` module turns decoded payloads into `Record`s, parsing the date
//! fields and remapping the enumerated fields each resource declares in
//! `recipes`. `Account` and `Loans` put the two together per endpoint.
//!
//! # Design
//! - Requests and responses are plain data (`http`); the network sits behind
//!   the `Transport` trait, with `UreqTransport` as the default.
//! - Normalization is a set of pure functions over explicit tables; there is
//!   no shared state besides a connection's throttle.
//! - A connection is `Send` but not `Sync`. Sharing one between threads
//!   needs external synchronization.
//!
//! ```rust,no_run
//! use lendingclub_core::{Account, Connection, Loans};
//!
//! let connection = Connection::new("my-api-key")?;
//! let listing = Loans::new(&connection).listed_loans(false)?;
//! let transfers = Account::new(&connection, 1234).pending_transfers()?;
//! # Ok::<(), lendingclub_core::ApiError>(())
//! ```

pub mod account;
pub mod config;
pub mod connection;
pub mod error;
pub mod http;
pub mod loans;
pub mod normalize;
pub mod order;
pub mod recipes;
pub mod throttle;
pub mod timestamp;
pub mod transport;

pub use account::Account;
pub use config::{ApiKey, ConnectionConfig, DEFAULT_API_VERSION, USER_AGENT};
pub use connection::{parse_response, Connection};
pub use error::{ApiError, ConfigError, NormalizeError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use loans::{LoanListing, Loans};
pub use normalize::{
    check_for_logical_error, convert_datetimes, normalize_collection, remap_enum, EnumTable,
    Field, FieldKind, Recipe, Record,
};
pub use order::Order;
pub use throttle::Throttle;
pub use timestamp::ApiTimestamp;
pub use transport::{Transport, UreqTransport};
