//! JSON-RPC response envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// Methods served by [`crate::QueueApi`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiMethod {
    QueueList,
    QueueSearch,
    QueueSearchAdv,
    QueueRmSongIds,
    QueueAppendUris,
    QueueInsertUris,
    QueueReplaceUris,
    QueueAppendPlaylists,
    QueueInsertPlaylists,
    QueueReplacePlaylists,
    QueuePrioSet,
    QueuePrioSetHighest,
    QueueMoveRelative,
    QueueCrop,
    QueueCropOrClear,
}

impl ApiMethod {
    /// Facility reported in responses: searches are database operations,
    /// everything else belongs to the queue.
    pub fn facility(&self) -> Facility {
        match self {
            ApiMethod::QueueSearch | ApiMethod::QueueSearchAdv => Facility::Database,
            _ => Facility::Queue,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facility {
    Queue,
    Database,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
    Error,
}

/// A human-readable outcome, used both as a result and as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub method: ApiMethod,
    pub facility: Facility,
    pub severity: Severity,
    pub message: String,
}

/// One page of rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage {
    pub data: Vec<Value>,
    /// Sum of the durations of the returned rows, in seconds.
    pub total_time: u64,
    /// Size of the whole result, `-1` when unknown.
    pub total_entities: i64,
    pub offset: u32,
    pub returned_entities: u32,
}

impl ListPage {
    pub const UNKNOWN_TOTAL: i64 = -1;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResult {
    pub method: ApiMethod,
    #[serde(flatten)]
    pub page: ListPage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultBody {
    List(ListResult),
    Message(Message),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultBody>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Message>,
}

impl Response {
    fn with_result(id: u64, result: ResultBody) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn ok(id: u64, method: ApiMethod) -> Self {
        Self::message(id, method, Severity::Info, "ok")
    }

    pub fn message(
        id: u64,
        method: ApiMethod,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self::with_result(
            id,
            ResultBody::Message(Message {
                method,
                facility: method.facility(),
                severity,
                message: message.into(),
            }),
        )
    }

    pub fn list(id: u64, method: ApiMethod, page: ListPage) -> Self {
        Self::with_result(id, ResultBody::List(ListResult { method, page }))
    }

    pub fn error(id: u64, method: ApiMethod, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(Message {
                method,
                facility: method.facility(),
                severity: Severity::Error,
                message: message.into(),
            }),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn page(&self) -> Option<&ListPage> {
        match &self.result {
            Some(ResultBody::List(list)) => Some(&list.page),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|err| {
            tracing::error!(error = %err, "failed to serialize response");
            Value::Null
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_response_shape() {
        let page = ListPage {
            data: vec![json!({"id": 1})],
            total_time: 180,
            total_entities: 30,
            offset: 0,
            returned_entities: 1,
        };
        let json = Response::list(7, ApiMethod::QueueList, page).to_json();
        assert_eq!(
            json,
            json!({
                "jsonrpc": "2.0",
                "id": 7,
                "result": {
                    "method": "QUEUE_LIST",
                    "data": [{"id": 1}],
                    "totalTime": 180,
                    "totalEntities": 30,
                    "offset": 0,
                    "returnedEntities": 1
                }
            })
        );
    }

    #[test]
    fn error_response_carries_facility() {
        let json = Response::error(3, ApiMethod::QueueSearchAdv, "bad expression").to_json();
        assert_eq!(json["error"]["facility"], "database");
        assert_eq!(json["error"]["severity"], "error");
        assert_eq!(json["error"]["method"], "QUEUE_SEARCH_ADV");
        assert!(json.get("result").is_none());
    }

    #[test]
    fn ok_response_is_info() {
        let response = Response::ok(1, ApiMethod::QueueCrop);
        assert!(!response.is_error());
        let json = response.to_json();
        assert_eq!(json["result"]["message"], "ok");
        assert_eq!(json["result"]["facility"], "queue");
        assert_eq!(json["result"]["severity"], "info");
    }
}
