//! Ballot RPC Server - JSON-RPC 2.0 over HTTP for the voting ledger.
//!
//! Every call carries the caller identity as a plain parameter; callers are
//! authenticated upstream.

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use ballot_ledger::LedgerService;
use ballot_types::{ProposalIndex, VoterId};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub mod error;

pub use error::{error_codes, JsonRpcError, RpcError};

/// RPC configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub http_addr: SocketAddr,
    pub cors: bool,
    pub max_body_size: usize,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([127, 0, 0, 1], 8545)),
            cors: true,
            max_body_size: 1024 * 1024,
        }
    }
}

/// JSON-RPC Request
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Vec<Value>,
    pub id: Option<Value>,
}

/// JSON-RPC Response
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Option<Value>,
}

impl JsonRpcResponse {
    fn from_result(id: Option<Value>, result: Result<Value, RpcError>) -> Self {
        match result {
            Ok(value) => Self {
                jsonrpc: "2.0".to_string(),
                result: Some(value),
                error: None,
                id,
            },
            Err(e) => Self {
                jsonrpc: "2.0".to_string(),
                result: None,
                error: Some(e.to_error_object()),
                id,
            },
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    service: Arc<LedgerService>,
    local_addr: Option<SocketAddr>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, service: Arc<LedgerService>) -> Self {
        Self { config, service, local_addr: None, shutdown_tx: None }
    }

    /// Bind and serve in the background. Returns the bound address.
    pub async fn start(&mut self) -> anyhow::Result<SocketAddr> {
        let service = self.service.clone();
        let config = self.config.clone();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        self.shutdown_tx = Some(shutdown_tx);

        let builder = hyper::Server::try_bind(&self.config.http_addr)
            .map_err(|e| anyhow::anyhow!("Failed to bind RPC server on {}: {}", self.config.http_addr, e))?;

        let server = builder.serve(hyper::service::make_service_fn(move |_| {
            let service = service.clone();
            let config = config.clone();
            async move {
                Ok::<_, hyper::Error>(hyper::service::service_fn(move |req| {
                    let service = service.clone();
                    let config = config.clone();
                    async move { handle_rpc_request(req, service, &config).await }
                }))
            }
        }));

        let addr = server.local_addr();
        self.local_addr = Some(addr);

        let server = server.with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        });

        tokio::spawn(async move {
            if let Err(e) = server.await {
                tracing::error!("RPC server error: {}", e);
            }
        });

        tracing::info!("Ballot RPC server listening on {}", addr);
        Ok(addr)
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("RPC server stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some()
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}

fn with_cors(builder: hyper::http::response::Builder, cors: bool) -> hyper::http::response::Builder {
    if cors {
        builder
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "POST, OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type")
    } else {
        builder
    }
}

fn plain_response(status: hyper::StatusCode, body: &'static str, cors: bool) -> hyper::Response<hyper::Body> {
    with_cors(hyper::Response::builder().status(status), cors)
        .body(hyper::Body::from(body))
        .unwrap_or_else(|_| hyper::Response::new(hyper::Body::from(body)))
}

/// Read the body chunk by chunk. `None` as soon as it passes `limit` bytes.
async fn read_body(mut body: hyper::Body, limit: usize) -> Result<Option<Vec<u8>>, hyper::Error> {
    use hyper::body::HttpBody;

    if body.size_hint().lower() > limit as u64 {
        return Ok(None);
    }

    let mut buf = Vec::new();
    while let Some(chunk) = body.data().await {
        let chunk = chunk?;
        if buf.len() + chunk.len() > limit {
            return Ok(None);
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(Some(buf))
}

async fn handle_rpc_request(
    req: hyper::Request<hyper::Body>,
    service: Arc<LedgerService>,
    config: &RpcServerConfig,
) -> Result<hyper::Response<hyper::Body>, hyper::Error> {
    if req.method() == hyper::Method::OPTIONS {
        return Ok(plain_response(hyper::StatusCode::OK, "", config.cors));
    }

    if req.method() != hyper::Method::POST {
        return Ok(plain_response(
            hyper::StatusCode::METHOD_NOT_ALLOWED,
            "Only POST allowed",
            config.cors,
        ));
    }

    let body_bytes = match read_body(req.into_body(), config.max_body_size).await? {
        Some(bytes) => bytes,
        None => {
            return Ok(plain_response(
                hyper::StatusCode::PAYLOAD_TOO_LARGE,
                "Request body too large",
                config.cors,
            ))
        }
    };

    // Commands take the ledger lock and write the journal
    let response = tokio::task::spawn_blocking(move || handle_raw(&body_bytes, &service))
        .await
        .unwrap_or_else(|e| {
            tracing::error!("RPC handler task failed: {}", e);
            JsonRpcResponse::from_result(None, Err(RpcError::InternalError("handler failed".to_string())))
        });

    let body = serde_json::to_string(&response).unwrap_or_else(|_| {
        r#"{"jsonrpc":"2.0","error":{"code":-32603,"message":"Internal error"},"id":null}"#.to_string()
    });
    Ok(with_cors(hyper::Response::builder().status(hyper::StatusCode::OK), config.cors)
        .header("Content-Type", "application/json")
        .body(hyper::Body::from(body.clone()))
        .unwrap_or_else(|_| hyper::Response::new(hyper::Body::from(body))))
}

/// Decode a request body and dispatch it.
pub fn handle_raw(body: &[u8], service: &LedgerService) -> JsonRpcResponse {
    match serde_json::from_slice::<JsonRpcRequest>(body) {
        Ok(req) if req.jsonrpc != "2.0" => JsonRpcResponse::from_result(
            req.id,
            Err(RpcError::InvalidRequest(format!("unsupported jsonrpc version '{}'", req.jsonrpc))),
        ),
        Ok(req) => handle_method(&req, service),
        Err(e) => JsonRpcResponse::from_result(None, Err(RpcError::ParseError(e.to_string()))),
    }
}

pub fn handle_method(req: &JsonRpcRequest, service: &LedgerService) -> JsonRpcResponse {
    let result = dispatch(req, service);
    if let Err(e) = &result {
        tracing::debug!(method = %req.method, code = e.code(), "RPC call failed: {}", e);
    }
    JsonRpcResponse::from_result(req.id.clone(), result)
}

fn dispatch(req: &JsonRpcRequest, service: &LedgerService) -> Result<Value, RpcError> {
    match req.method.as_str() {
        "ballot_register" | "register" => {
            let id = voter_param(req, 0)?;
            let name = match req.params.get(1) {
                None | Some(Value::Null) => "",
                Some(Value::String(name)) => name.as_str(),
                Some(_) => return Err(RpcError::InvalidParams("voter name must be a string".to_string())),
            };
            service.register(id, name)?;
            Ok(Value::Bool(true))
        }

        "ballot_delegate" | "delegate" => {
            let caller = voter_param(req, 0)?;
            let target = voter_param(req, 1)?;
            service.delegate(caller, target)?;
            Ok(Value::Bool(true))
        }

        "ballot_vote" | "vote" => {
            let caller = voter_param(req, 0)?;
            let proposal = proposal_param(req, 1)?;
            service.vote(caller, proposal)?;
            Ok(Value::Bool(true))
        }

        "ballot_getAllVoters" | "getAllVoters" => Ok(json!(service.get_all_voters())),

        "ballot_getVoter" => {
            let id = voter_param(req, 0)?;
            Ok(json!(service.voter(&id)))
        }

        "ballot_proposals" => Ok(json!(service.proposals())),

        "ballot_winningProposal" | "winningProposal" => Ok(json!(service.winning_proposal())),

        "ballot_winnerName" | "winnerName" => Ok(json!(service.winner_name())),

        "ballot_health" => Ok(json!({
            "status": "ok",
            "voters": service.voter_count(),
            "proposals": service.proposals().len(),
            "journal": service.journal_len(),
        })),

        other => Err(RpcError::MethodNotFound(other.to_string())),
    }
}

fn voter_param(req: &JsonRpcRequest, index: usize) -> Result<VoterId, RpcError> {
    let raw = req
        .params
        .get(index)
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::InvalidParams(format!("missing voter id at position {}", index)))?;
    parse_voter_id(raw).map_err(|_| RpcError::InvalidParams(format!("invalid voter id '{}'", raw)))
}

fn proposal_param(req: &JsonRpcRequest, index: usize) -> Result<ProposalIndex, RpcError> {
    let invalid = || RpcError::InvalidParams(format!("invalid proposal index at position {}", index));
    match req.params.get(index) {
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(invalid),
        Some(Value::String(s)) => parse_u64(s)
            .ok()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

fn parse_voter_id(s: &str) -> Result<VoterId, ()> {
    VoterId::from_str(s).map_err(|_| ())
}

fn parse_u64(s: &str) -> Result<u64, ()> {
    if let Some(hex_part) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if hex_part.is_empty() {
            return Err(());
        }
        u64::from_str_radix(hex_part, 16).map_err(|_| ())
    } else {
        s.parse().map_err(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_ledger::LedgerConfig;

    const ALICE: &str = "0x0000000000000000000000000000000000000001";
    const BOB: &str = "0x0000000000000000000000000000000000000002";

    fn service() -> LedgerService {
        LedgerService::in_memory(vec!["A".to_string(), "B".to_string()], LedgerConfig::default())
            .unwrap()
    }

    fn call(service: &LedgerService, method: &str, params: Vec<Value>) -> JsonRpcResponse {
        let req = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: Some(json!(1)),
        };
        handle_method(&req, service)
    }

    #[test]
    fn test_rpc_config_default() {
        let config = RpcServerConfig::default();
        assert_eq!(config.http_addr.port(), 8545);
        assert!(config.cors);
    }

    #[test]
    fn test_register_delegate_vote_flow() {
        let service = service();
        assert_eq!(call(&service, "ballot_register", vec![json!(ALICE), json!("alice")]).result, Some(json!(true)));
        assert_eq!(call(&service, "ballot_register", vec![json!(BOB), json!("bob")]).result, Some(json!(true)));
        assert_eq!(call(&service, "delegate", vec![json!(BOB), json!(ALICE)]).result, Some(json!(true)));
        assert_eq!(call(&service, "ballot_vote", vec![json!(ALICE), json!(1)]).result, Some(json!(true)));

        let voters = call(&service, "getAllVoters", vec![]).result.unwrap();
        assert_eq!(voters[0]["name"], "alice");
        assert_eq!(voters[1]["name"], "bob");
        assert_eq!(voters[1]["delegate"], ALICE);
        assert_eq!(voters[1]["weight"], 0);

        assert_eq!(call(&service, "ballot_winningProposal", vec![]).result, Some(json!(1)));
        assert_eq!(call(&service, "winnerName", vec![]).result, Some(json!("B")));

        let proposals = call(&service, "ballot_proposals", vec![]).result.unwrap();
        assert_eq!(proposals[1]["voteCount"], 2);
    }

    #[test]
    fn test_ledger_errors_are_structured() {
        let service = service();
        call(&service, "ballot_register", vec![json!(ALICE)]);

        let resp = call(&service, "ballot_register", vec![json!(ALICE)]);
        let err = resp.error.unwrap();
        assert_eq!(err.code, error_codes::ALREADY_REGISTERED);
        assert_eq!(err.data.unwrap()["kind"], "AlreadyRegistered");
        assert!(resp.result.is_none());

        let err = call(&service, "ballot_delegate", vec![json!(ALICE), json!(ALICE)]).error.unwrap();
        assert_eq!(err.code, error_codes::SELF_DELEGATION);

        let err = call(&service, "ballot_vote", vec![json!(ALICE), json!(9)]).error.unwrap();
        assert_eq!(err.code, error_codes::INVALID_PROPOSAL);
    }

    #[test]
    fn test_cycle_over_rpc() {
        let service = service();
        call(&service, "ballot_register", vec![json!(ALICE)]);
        call(&service, "ballot_register", vec![json!(BOB)]);
        call(&service, "ballot_delegate", vec![json!(ALICE), json!(BOB)]);

        let err = call(&service, "ballot_delegate", vec![json!(BOB), json!(ALICE)]).error.unwrap();
        assert_eq!(err.code, error_codes::CYCLE);
    }

    #[test]
    fn test_invalid_params() {
        let service = service();
        let err = call(&service, "ballot_register", vec![]).error.unwrap();
        assert_eq!(err.code, error_codes::INVALID_PARAMS);

        let err = call(&service, "ballot_register", vec![json!("0x12")]).error.unwrap();
        assert_eq!(err.code, error_codes::INVALID_PARAMS);

        let err = call(&service, "ballot_vote", vec![json!(ALICE), json!(-1)]).error.unwrap();
        assert_eq!(err.code, error_codes::INVALID_PARAMS);
    }

    #[test]
    fn test_proposal_param_accepts_strings() {
        let service = service();
        call(&service, "ballot_register", vec![json!(ALICE)]);
        let resp = call(&service, "ballot_vote", vec![json!(ALICE), json!("0x1")]);
        assert_eq!(resp.result, Some(json!(true)));
        assert_eq!(service.proposals()[1].vote_count, 1);
    }

    #[test]
    fn test_register_name_must_be_a_string() {
        let service = service();
        let err = call(&service, "ballot_register", vec![json!(ALICE), json!(123)]).error.unwrap();
        assert_eq!(err.code, error_codes::INVALID_PARAMS);
        assert!(!service.is_registered(&VoterId::from_index(1)));

        let resp = call(&service, "register", vec![json!(ALICE), Value::Null]);
        assert_eq!(resp.result, Some(json!(true)));
        assert_eq!(service.voter(&VoterId::from_index(1)).unwrap().name, "");
    }

    #[tokio::test]
    async fn test_read_body_stops_past_limit() {
        let (mut tx, body) = hyper::Body::channel();
        tokio::spawn(async move {
            for _ in 0..3 {
                if tx.send_data(hyper::body::Bytes::from(vec![b'x'; 40])).await.is_err() {
                    break;
                }
            }
        });
        assert_eq!(read_body(body, 100).await.unwrap(), None);

        let body = hyper::Body::from(vec![b'y'; 100]);
        assert_eq!(read_body(body, 100).await.unwrap().map(|b| b.len()), Some(100));
        let body = hyper::Body::from(vec![b'y'; 101]);
        assert_eq!(read_body(body, 100).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let service = Arc::new(service());
        let config = RpcServerConfig {
            http_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            max_body_size: 64,
            ..RpcServerConfig::default()
        };
        let mut server = RpcServer::new(config, service.clone());
        let addr = server.start().await.unwrap();

        let padding = "x".repeat(1024);
        let body = json!({
            "jsonrpc": "2.0",
            "method": "ballot_register",
            "params": [ALICE, padding],
            "id": 1
        });
        let req = hyper::Request::builder()
            .method(hyper::Method::POST)
            .uri(format!("http://{}", addr))
            .header("Content-Type", "application/json")
            .body(hyper::Body::from(body.to_string()))
            .unwrap();

        let resp = hyper::Client::new().request(req).await.unwrap();
        assert_eq!(resp.status(), hyper::StatusCode::PAYLOAD_TOO_LARGE);
        assert!(!service.is_registered(&VoterId::from_index(1)));

        server.stop();
    }

    #[test]
    fn test_unknown_method() {
        let service = service();
        let err = call(&service, "eth_blockNumber", vec![]).error.unwrap();
        assert_eq!(err.code, error_codes::METHOD_NOT_FOUND);
    }

    #[test]
    fn test_get_voter() {
        let service = service();
        assert_eq!(call(&service, "ballot_getVoter", vec![json!(ALICE)]).result, Some(Value::Null));
        call(&service, "ballot_register", vec![json!(ALICE), json!("alice")]);
        let voter = call(&service, "ballot_getVoter", vec![json!(ALICE)]).result.unwrap();
        assert_eq!(voter["weight"], 1);
        assert_eq!(voter["voted"], false);
    }

    #[test]
    fn test_handle_raw_parse_errors() {
        let service = service();
        let resp = handle_raw(b"{not json", &service);
        assert_eq!(resp.error.unwrap().code, error_codes::PARSE_ERROR);

        let resp = handle_raw(br#"{"jsonrpc":"1.0","method":"ballot_health","id":3}"#, &service);
        assert_eq!(resp.error.unwrap().code, error_codes::INVALID_REQUEST);
        assert_eq!(resp.id, Some(json!(3)));
    }

    #[test]
    fn test_health() {
        let service = service();
        let health = call(&service, "ballot_health", vec![]).result.unwrap();
        assert_eq!(health["status"], "ok");
        assert_eq!(health["proposals"], 2);
        assert_eq!(health["voters"], 0);
    }

    #[test]
    fn test_parse_u64() {
        assert_eq!(parse_u64("0xFF"), Ok(255));
        assert_eq!(parse_u64("12"), Ok(12));
        assert!(parse_u64("0x").is_err());
        assert!(parse_u64("abc").is_err());
    }

    #[tokio::test]
    async fn test_http_roundtrip() {
        let service = Arc::new(service());
        let config = RpcServerConfig {
            http_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            ..RpcServerConfig::default()
        };
        let mut server = RpcServer::new(config, service.clone());
        let addr = server.start().await.unwrap();
        assert!(server.is_running());

        let body = json!({
            "jsonrpc": "2.0",
            "method": "ballot_register",
            "params": [ALICE, "alice"],
            "id": 7
        });
        let req = hyper::Request::builder()
            .method(hyper::Method::POST)
            .uri(format!("http://{}", addr))
            .header("Content-Type", "application/json")
            .body(hyper::Body::from(body.to_string()))
            .unwrap();

        let resp = hyper::Client::new().request(req).await.unwrap();
        assert_eq!(resp.status(), hyper::StatusCode::OK);
        let bytes = hyper::body::to_bytes(resp.into_body()).await.unwrap();
        let parsed: JsonRpcResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed.result, Some(json!(true)));
        assert_eq!(parsed.id, Some(json!(7)));
        assert!(service.is_registered(&VoterId::from_index(1)));

        let get = hyper::Request::builder()
            .method(hyper::Method::GET)
            .uri(format!("http://{}", addr))
            .body(hyper::Body::empty())
            .unwrap();
        let resp = hyper::Client::new().request(get).await.unwrap();
        assert_eq!(resp.status(), hyper::StatusCode::METHOD_NOT_ALLOWED);

        server.stop();
        assert!(!server.is_running());
    }
}
