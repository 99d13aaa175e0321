use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RelayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Success,
    Error,
}

/// Normalized webhook response. `code` mirrors the HTTP status of the reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderResult {
    pub status: ResultStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl OrderResult {
    pub fn success(order: Value) -> Self {
        Self {
            status: ResultStatus::Success,
            message: Some("Order placed successfully".to_string()),
            code: 200,
            order: Some(order),
            details: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResultStatus::Success
    }
}

impl From<&RelayError> for OrderResult {
    fn from(err: &RelayError) -> Self {
        Self {
            status: ResultStatus::Error,
            message: Some(err.public_message()),
            code: err.status_code(),
            order: None,
            details: err.details().cloned(),
        }
    }
}

impl From<RelayError> for OrderResult {
    fn from(err: RelayError) -> Self {
        Self::from(&err)
    }
}
