//! Thin JSON-RPC 2.0 stdio carrier for the tool surface.

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use dk_engine::Deck;

use crate::dispatch::{call_tool, error_envelope, ToolError};
use crate::tools::tool_definitions;

/// Serve requests line-by-line from stdin until EOF.
pub async fn serve_stdio(deck: &Deck) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let msg: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(_) => continue,
        };
        if let Some(reply) = dispatch_jsonrpc(deck, &msg).await {
            stdout.write_all(reply.to_string().as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}

/// Process one JSON-RPC request. Returns `None` for notifications.
///
/// Tool failures become `isError` envelopes inside a successful JSON-RPC
/// response; only unknown methods and unknown tools surface as protocol
/// errors.
pub async fn dispatch_jsonrpc(deck: &Deck, msg: &Value) -> Option<Value> {
    let method = msg["method"].as_str().unwrap_or("");
    let id = msg.get("id").cloned();
    if id.is_none() || method.starts_with("notifications/") {
        return None;
    }

    let response = match method {
        "initialize" => json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": {
                "protocolVersion": msg["params"]["protocolVersion"].clone(),
                "capabilities": { "tools": { "listChanged": false } },
                "serverInfo": {
                    "name": "deckard",
                    "version": env!("CARGO_PKG_VERSION")
                },
                "instructions": "Deckard — design cards as a queryable graph. Use card_create/card_update to author cards, card_search and card_graph to explore, card_sync/card_validate to reconcile the index with the files."
            }
        }),
        "tools/list" => json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": { "tools": tool_definitions() }
        }),
        "tools/call" => {
            let tool_name = msg["params"]["name"].as_str().unwrap_or("");
            let args = msg["params"]
                .get("arguments")
                .cloned()
                .unwrap_or_else(|| json!({}));
            match call_tool(deck, tool_name, args).await {
                Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
                Err(ToolError::UnknownTool(name)) => json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": { "code": -32601, "message": format!("unknown tool: {name}") }
                }),
                Err(ToolError::Failed(text)) => json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "result": error_envelope(&text)
                }),
            }
        }
        "ping" => json!({ "jsonrpc": "2.0", "id": id, "result": {} }),
        _ => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": -32601, "message": "Method not found" }
        }),
    };

    Some(response)
}
