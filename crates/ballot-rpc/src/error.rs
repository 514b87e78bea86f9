//! RPC error types and codes.

use ballot_ledger::{LedgerError, ServiceError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON-RPC error codes.
pub mod error_codes {
    /// Parse error
    pub const PARSE_ERROR: i32 = -32700;
    /// Invalid request
    pub const INVALID_REQUEST: i32 = -32600;
    /// Method not found
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid params
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error
    pub const INTERNAL_ERROR: i32 = -32603;

    // Ledger rejections
    pub const ALREADY_REGISTERED: i32 = -32010;
    pub const UNKNOWN_VOTER: i32 = -32011;
    pub const ALREADY_VOTED: i32 = -32012;
    pub const ALREADY_DELEGATED: i32 = -32013;
    pub const SELF_DELEGATION: i32 = -32014;
    pub const CYCLE: i32 = -32015;
    pub const DELEGATE_ALREADY_VOTED: i32 = -32016;
    pub const INVALID_PROPOSAL: i32 = -32017;
    pub const NO_VOTING_POWER: i32 = -32018;
    pub const PROPOSALS_LOCKED: i32 = -32019;
}

/// JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RpcError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("{0}")]
    Ledger(LedgerError),
}

impl RpcError {
    pub fn code(&self) -> i32 {
        use error_codes::*;
        match self {
            RpcError::ParseError(_) => PARSE_ERROR,
            RpcError::InvalidRequest(_) => INVALID_REQUEST,
            RpcError::MethodNotFound(_) => METHOD_NOT_FOUND,
            RpcError::InvalidParams(_) => INVALID_PARAMS,
            RpcError::InternalError(_) => INTERNAL_ERROR,
            RpcError::Ledger(e) => match e {
                LedgerError::AlreadyRegistered(_) => ALREADY_REGISTERED,
                LedgerError::UnknownVoter(_) => UNKNOWN_VOTER,
                LedgerError::AlreadyVoted(_) => ALREADY_VOTED,
                LedgerError::AlreadyDelegated(_) => ALREADY_DELEGATED,
                LedgerError::SelfDelegation => SELF_DELEGATION,
                LedgerError::Cycle => CYCLE,
                LedgerError::DelegateAlreadyVoted(_) => DELEGATE_ALREADY_VOTED,
                LedgerError::InvalidProposal { .. } => INVALID_PROPOSAL,
                LedgerError::NoVotingPower(_) => NO_VOTING_POWER,
                LedgerError::ProposalsAlreadyInitialized | LedgerError::NoProposals => PROPOSALS_LOCKED,
            },
        }
    }

    pub fn to_error_object(&self) -> JsonRpcError {
        let data = match self {
            RpcError::Ledger(e) => Some(serde_json::json!({ "kind": e.kind() })),
            _ => None,
        };
        JsonRpcError {
            code: self.code(),
            message: self.to_string(),
            data,
        }
    }
}

impl From<ServiceError> for RpcError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Ledger(e) => RpcError::Ledger(e),
            other => RpcError::InternalError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_types::VoterId;

    #[test]
    fn test_error_codes() {
        assert_eq!(RpcError::ParseError("x".into()).code(), -32700);
        assert_eq!(RpcError::MethodNotFound("x".into()).code(), -32601);
        assert_eq!(RpcError::Ledger(LedgerError::Cycle).code(), error_codes::CYCLE);
    }

    #[test]
    fn test_ledger_error_object_carries_kind() {
        let err = RpcError::Ledger(LedgerError::AlreadyVoted(VoterId::from_index(1)));
        let obj = err.to_error_object();
        assert_eq!(obj.code, error_codes::ALREADY_VOTED);
        assert!(obj.message.contains("already voted"));
        assert_eq!(obj.data, Some(serde_json::json!({ "kind": "AlreadyVoted" })));
    }

    #[test]
    fn test_storage_failure_is_internal() {
        let err: RpcError = ServiceError::Codec("bad".into()).into();
        assert_eq!(err.code(), error_codes::INTERNAL_ERROR);
        assert!(err.to_error_object().data.is_none());
    }
}
