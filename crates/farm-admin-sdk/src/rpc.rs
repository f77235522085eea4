// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! JSON-RPC 2.0 framing for the node's WebSocket endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize)]
pub struct JsonRpcRequest<'a> {
    pub jsonrpc: &'a str,
    pub id: u64,
    pub method: &'a str,
    pub params: Value,
}

impl<'a> JsonRpcRequest<'a> {
    pub fn new(id: u64, method: &'a str, params: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse {
    pub id: Option<u64>,
    pub result: Option<Value>,
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)?;
        if let Some(data) = &self.data {
            write!(f, ": {data}")?;
        }
        Ok(())
    }
}

/// Outcome of matching one incoming frame against the request id we wait for.
#[derive(Debug)]
pub enum Frame {
    /// Response to our request.
    Reply(Result<Value, JsonRpcError>),
    /// Subscription notification or a reply to another id.
    Unrelated,
}

pub fn parse_frame(text: &str, want_id: u64) -> serde_json::Result<Frame> {
    let resp: JsonRpcResponse = serde_json::from_str(text)?;
    if resp.id != Some(want_id) {
        return Ok(Frame::Unrelated);
    }
    Ok(Frame::Reply(match (resp.result, resp.error) {
        (_, Some(err)) => Err(err),
        (Some(result), None) => Ok(result),
        (None, None) => Ok(Value::Null),
    }))
}

#[derive(Debug, Deserialize)]
struct Notification {
    params: NotificationParams,
}

#[derive(Debug, Deserialize)]
struct NotificationParams {
    subscription: Value,
    result: Value,
}

/// Payload of a notification for `subscription`, or `None` for any other frame.
pub fn subscription_update(text: &str, subscription: &str) -> Option<Value> {
    let note: Notification = serde_json::from_str(text).ok()?;
    let id = match &note.params.subscription {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    (id == subscription).then_some(note.params.result)
}

/// Subscription ids arrive as strings or numbers depending on the node.
pub fn subscription_id(reply: &Value) -> Option<String> {
    match reply {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_as_jsonrpc_2() {
        let req = JsonRpcRequest::new(7, "system_chain", serde_json::json!([]));
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"jsonrpc": "2.0", "id": 7, "method": "system_chain", "params": []})
        );
    }

    #[test]
    fn matches_reply_by_id() {
        let frame = parse_frame(r#"{"jsonrpc":"2.0","id":3,"result":"Aleph Zero"}"#, 3).unwrap();
        match frame {
            Frame::Reply(Ok(v)) => assert_eq!(v, "Aleph Zero"),
            other => panic!("unexpected {other:?}"),
        }
        let frame = parse_frame(r#"{"jsonrpc":"2.0","id":4,"result":1}"#, 3).unwrap();
        assert!(matches!(frame, Frame::Unrelated));
    }

    #[test]
    fn notification_is_unrelated() {
        let text = r#"{"jsonrpc":"2.0","method":"chain_newHead","params":{"subscription":"x","result":{}}}"#;
        assert!(matches!(parse_frame(text, 1).unwrap(), Frame::Unrelated));
    }

    #[test]
    fn updates_are_matched_by_subscription() {
        let text = r#"{"jsonrpc":"2.0","method":"author_extrinsicUpdate",
            "params":{"subscription":"abc","result":{"inBlock":"0x01"}}}"#;
        assert_eq!(
            subscription_update(text, "abc"),
            Some(serde_json::json!({"inBlock": "0x01"}))
        );
        assert_eq!(subscription_update(text, "xyz"), None);

        let numeric = r#"{"jsonrpc":"2.0","method":"author_extrinsicUpdate",
            "params":{"subscription":7,"result":"ready"}}"#;
        assert_eq!(subscription_update(numeric, "7"), Some(serde_json::json!("ready")));

        let reply = r#"{"jsonrpc":"2.0","id":3,"result":"abc"}"#;
        assert_eq!(subscription_update(reply, "abc"), None);
        assert_eq!(subscription_id(&serde_json::json!(7)), Some("7".into()));
        assert_eq!(subscription_id(&serde_json::json!(null)), None);
    }

    #[test]
    fn error_object_is_surfaced() {
        let text = r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"Method not found"}}"#;
        match parse_frame(text, 1).unwrap() {
            Frame::Reply(Err(e)) => assert_eq!(e.to_string(), "Method not found (code -32601)"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
