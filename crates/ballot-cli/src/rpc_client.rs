//! RPC client for CLI operations.
//!
//! HTTP client for making JSON-RPC calls to a ballot node.

use ballot_types::{ProposalIndex, ProposalView, VoterId, VoterView};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// RPC client.
#[derive(Debug, Clone)]
pub struct RpcClient {
    url: String,
    client: reqwest::Client,
}

/// RPC request.
#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'a str,
    method: &'a str,
    params: Value,
    id: u64,
}

/// RPC response.
#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i32,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

/// Health summary returned by `ballot_health`.
#[derive(Debug, Clone, Deserialize)]
pub struct Health {
    pub status: String,
    pub voters: usize,
    pub proposals: usize,
}

fn decode_response<T: DeserializeOwned>(response: RpcResponse) -> anyhow::Result<T> {
    if let Some(error) = response.error {
        match error.data.as_ref().and_then(|d| d.get("kind")).and_then(|k| k.as_str()) {
            Some(kind) => anyhow::bail!("{} ({}): {}", kind, error.code, error.message),
            None => anyhow::bail!("RPC error {}: {}", error.code, error.message),
        }
    }

    // A null result is a valid answer for optional lookups
    let result = response.result.unwrap_or(Value::Null);
    serde_json::from_value(result).map_err(|e| anyhow::anyhow!("Unexpected RPC result: {}", e))
}

impl RpcClient {
    /// Create a new RPC client.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Make an RPC call.
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> anyhow::Result<T> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: 1,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to reach {}: {}", self.url, e))?;

        let rpc_response: RpcResponse = response.json().await?;
        decode_response(rpc_response)
    }

    pub async fn register(&self, id: &VoterId, name: &str) -> anyhow::Result<bool> {
        self.call("ballot_register", json!([id.to_string(), name])).await
    }

    pub async fn delegate(&self, caller: &VoterId, target: &VoterId) -> anyhow::Result<bool> {
        self.call("ballot_delegate", json!([caller.to_string(), target.to_string()])).await
    }

    pub async fn vote(&self, caller: &VoterId, proposal: ProposalIndex) -> anyhow::Result<bool> {
        self.call("ballot_vote", json!([caller.to_string(), proposal])).await
    }

    pub async fn get_all_voters(&self) -> anyhow::Result<Vec<VoterView>> {
        self.call("ballot_getAllVoters", json!([])).await
    }

    pub async fn get_voter(&self, id: &VoterId) -> anyhow::Result<Option<VoterView>> {
        self.call("ballot_getVoter", json!([id.to_string()])).await
    }

    pub async fn proposals(&self) -> anyhow::Result<Vec<ProposalView>> {
        self.call("ballot_proposals", json!([])).await
    }

    pub async fn winning_proposal(&self) -> anyhow::Result<ProposalIndex> {
        self.call("ballot_winningProposal", json!([])).await
    }

    pub async fn winner_name(&self) -> anyhow::Result<String> {
        self.call("ballot_winnerName", json!([])).await
    }

    pub async fn health(&self) -> anyhow::Result<Health> {
        self.call("ballot_health", json!([])).await
    }
}
