//! Note orders submitted through `Account::submit_orders`.

use serde_json::{Map, Value};

use crate::error::ApiError;

/// A request to buy a note in one listed loan.
///
/// Nothing is sent when an `Order` is built; `Account::submit_orders` turns a
/// batch into request bodies with `to_request_body`.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    loan_id: u64,
    requested_amount: f64,
    portfolio_id: Option<u64>,
}

impl Order {
    pub fn new(loan_id: u64, requested_amount: f64) -> Self {
        Self {
            loan_id,
            requested_amount,
            portfolio_id: None,
        }
    }

    /// Assigns the purchased note to a portfolio.
    pub fn in_portfolio(mut self, portfolio_id: u64) -> Self {
        self.portfolio_id = Some(portfolio_id);
        self
    }

    pub fn loan_id(&self) -> u64 {
        self.loan_id
    }

    pub fn requested_amount(&self) -> f64 {
        self.requested_amount
    }

    pub fn portfolio_id(&self) -> Option<u64> {
        self.portfolio_id
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if !self.requested_amount.is_finite() || self.requested_amount <= 0.0 {
            return Err(ApiError::InvalidArgument(format!(
                "requested amount for loan {} must be positive, got {}",
                self.loan_id, self.requested_amount
            )));
        }
        Ok(())
    }

    /// `{"loanId", "requestedAmount"}` plus `"portfolioId"` when set.
    pub fn to_request_body(&self) -> Value {
        let mut body = Map::new();
        body.insert("loanId".to_string(), Value::from(self.loan_id));
        body.insert(
            "requestedAmount".to_string(),
            Value::from(self.requested_amount),
        );
        if let Some(portfolio_id) = self.portfolio_id {
            body.insert("portfolioId".to_string(), Value::from(portfolio_id));
        }
        Value::Object(body)
    }
}
