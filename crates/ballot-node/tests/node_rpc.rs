//! Node served over HTTP, restarted against the same data directory.

use std::net::SocketAddr;

use ballot_node::{BallotNode, NodeConfig};
use serde_json::{json, Value};
use tempfile::TempDir;

const ALICE: &str = "0x0000000000000000000000000000000000000001";
const BOB: &str = "0x0000000000000000000000000000000000000002";
const CAROL: &str = "0x0000000000000000000000000000000000000003";

fn config(dir: &TempDir) -> NodeConfig {
    let mut config = NodeConfig::default();
    config.storage.data_dir = dir.path().to_path_buf();
    config.rpc.http_addr = SocketAddr::from(([127, 0, 0, 1], 0));
    config.ledger.proposals = vec!["Keep".to_string(), "Change".to_string()];
    config
}

async fn call(addr: SocketAddr, method: &str, params: Value) -> Value {
    let body = json!({ "jsonrpc": "2.0", "method": method, "params": params, "id": 1 });
    let req = hyper::Request::builder()
        .method(hyper::Method::POST)
        .uri(format!("http://{}", addr))
        .header("Content-Type", "application/json")
        .body(hyper::Body::from(body.to_string()))
        .unwrap();
    let resp = hyper::Client::new().request(req).await.unwrap();
    let bytes = hyper::body::to_bytes(resp.into_body()).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn ledger_survives_node_restart() {
    let dir = TempDir::new().unwrap();

    {
        let mut node = BallotNode::new(config(&dir)).unwrap();
        let addr = node.start().await.unwrap().unwrap();

        for (id, name) in [(ALICE, "alice"), (BOB, "bob"), (CAROL, "carol")] {
            let resp = call(addr, "ballot_register", json!([id, name])).await;
            assert_eq!(resp["result"], true);
        }
        assert_eq!(call(addr, "delegate", json!([BOB, ALICE])).await["result"], true);
        assert_eq!(call(addr, "ballot_vote", json!([ALICE, 1])).await["result"], true);

        let self_delegation = call(addr, "ballot_delegate", json!([CAROL, CAROL])).await;
        assert_eq!(self_delegation["error"]["code"], -32014);

        node.stop();
    }

    let mut node = BallotNode::new(config(&dir)).unwrap();
    let addr = node.start().await.unwrap().unwrap();

    assert_eq!(call(addr, "winningProposal", json!([])).await["result"], 1);
    assert_eq!(call(addr, "ballot_winnerName", json!([])).await["result"], "Change");

    let voters = call(addr, "getAllVoters", json!([])).await["result"].clone();
    let names: Vec<&str> = voters
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["alice", "bob", "carol"]);
    assert_eq!(voters[1]["weight"], 0);

    let again = call(addr, "ballot_vote", json!([ALICE, 0])).await;
    assert_eq!(again["error"]["data"]["kind"], "AlreadyVoted");

    let health = call(addr, "ballot_health", json!([])).await;
    assert_eq!(health["result"]["voters"], 3);

    node.stop();
}
