//! Account-scoped resources: `accounts/{id}/...`.

use serde_json::{json, Value};

use crate::connection::Connection;
use crate::error::{ApiError, NormalizeError};
use crate::normalize::{check_for_logical_error, normalize_collection, Record};
use crate::order::Order;
use crate::recipes::{OWNED_NOTE, PENDING_TRANSFER};

const PORTFOLIOS_KEY: &str = "myPortfolios";

/// One investor account, reached through a shared `Connection`.
#[derive(Debug, Clone, Copy)]
pub struct Account<'a> {
    connection: &'a Connection,
    account_id: u64,
}

impl<'a> Account<'a> {
    pub fn new(connection: &'a Connection, account_id: u64) -> Self {
        Self {
            connection,
            account_id,
        }
    }

    pub fn account_id(&self) -> u64 {
        self.account_id
    }

    pub fn account_summary(&self) -> Result<Value, ApiError> {
        self.resource_get("summary")
    }

    pub fn available_cash(&self) -> Result<Value, ApiError> {
        self.resource_get("availablecash")
    }

    /// Scheduled transfers with dates parsed and `frequency` replaced by its
    /// canonical token.
    pub fn pending_transfers(&self) -> Result<Vec<Record>, ApiError> {
        let mut payload = self.resource_get("funds/pending")?;
        Ok(normalize_collection(&mut payload, "transfers", &PENDING_TRANSFER)?)
    }

    /// Notes held by the account. `detailed` selects `detailednotes`, which
    /// carries more fields per note.
    pub fn owned_notes(&self, detailed: bool) -> Result<Vec<Record>, ApiError> {
        let resource = if detailed { "detailednotes" } else { "notes" };
        let mut payload = self.resource_get(resource)?;
        Ok(normalize_collection(&mut payload, "myNotes", &OWNED_NOTE)?)
    }

    pub fn portfolios(&self) -> Result<Vec<Value>, ApiError> {
        let mut payload = self.resource_get("portfolios")?;
        match payload.get_mut(PORTFOLIOS_KEY).map(Value::take) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(portfolios)) => Ok(portfolios),
            Some(_) => Err(NormalizeError::NotAnObject {
                context: PORTFOLIOS_KEY.to_string(),
            }
            .into()),
        }
    }

    /// Creates a portfolio. `name` must not be empty.
    pub fn create_portfolio(&self, name: &str, description: Option<&str>) -> Result<Value, ApiError> {
        if name.trim().is_empty() {
            return Err(ApiError::InvalidArgument(
                "portfolio name must be non-empty".to_string(),
            ));
        }

        let body = json!({
            "actorId": self.account_id,
            "portfolioName": name,
            "portfolioDescription": description,
        });
        self.resource_post("portfolios", &body)
    }

    /// Starts an order for `loan_id`; nothing is sent until `submit_orders`.
    pub fn order(&self, loan_id: u64, requested_amount: f64) -> Order {
        Order::new(loan_id, requested_amount)
    }

    /// Submits a batch of orders in one request.
    pub fn submit_orders(&self, orders: &[Order]) -> Result<Value, ApiError> {
        if orders.is_empty() {
            return Err(ApiError::InvalidArgument(
                "at least one order is required".to_string(),
            ));
        }
        for order in orders {
            order.validate()?;
        }

        let body = json!({
            "aid": self.account_id,
            "orders": orders.iter().map(Order::to_request_body).collect::<Vec<_>>(),
        });
        self.resource_post("orders", &body)
    }

    fn path(&self, resource: &str) -> String {
        format!("accounts/{}/{}", self.account_id, resource)
    }

    fn resource_get(&self, resource: &str) -> Result<Value, ApiError> {
        let payload = self.connection.get(&self.path(resource), &[])?;
        tracing::debug!(resource, payload = %payload, "account response");
        check_for_logical_error(&payload)?;
        Ok(payload)
    }

    fn resource_post(&self, resource: &str, body: &Value) -> Result<Value, ApiError> {
        let payload = self.connection.post(&self.path(resource), body, &[])?;
        tracing::debug!(resource, payload = %payload, "account response");
        check_for_logical_error(&payload)?;
        Ok(payload)
    }
}
