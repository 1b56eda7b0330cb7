//! JSON-RPC requests and their typed parameters.

use crate::jsonrpc::ApiMethod;
use mpdctl_core::{SongId, Whence};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

/// A decoded request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub id: u64,
    pub call: ApiCall,
}

/// Method plus parameters, as sent by the web frontend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiCall {
    QueueList {
        offset: u32,
        limit: u32,
        #[serde(default)]
        cols: Vec<String>,
    },
    /// `filter` is a tag name, or `any` to match every tag.
    QueueSearch {
        filter: String,
        searchstr: String,
        offset: u32,
        limit: u32,
        #[serde(default)]
        cols: Vec<String>,
    },
    QueueSearchAdv {
        #[serde(default)]
        expression: String,
        #[serde(default)]
        sort: String,
        #[serde(default)]
        sortdesc: bool,
        offset: u32,
        limit: u32,
        #[serde(default)]
        cols: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    QueueRmSongIds { song_ids: Vec<SongId> },
    QueueAppendUris {
        uris: Vec<String>,
        #[serde(default)]
        play: bool,
    },
    QueueInsertUris {
        uris: Vec<String>,
        to: u32,
        #[serde(default)]
        whence: Whence,
        #[serde(default)]
        play: bool,
    },
    QueueReplaceUris {
        uris: Vec<String>,
        #[serde(default)]
        play: bool,
    },
    QueueAppendPlaylists {
        plists: Vec<String>,
        #[serde(default)]
        play: bool,
    },
    QueueInsertPlaylists {
        plists: Vec<String>,
        to: u32,
        #[serde(default)]
        whence: Whence,
        #[serde(default)]
        play: bool,
    },
    QueueReplacePlaylists {
        plists: Vec<String>,
        #[serde(default)]
        play: bool,
    },
    #[serde(rename_all = "camelCase")]
    QueuePrioSet { song_ids: Vec<SongId>, priority: u32 },
    #[serde(rename_all = "camelCase")]
    QueuePrioSetHighest { song_ids: Vec<SongId> },
    #[serde(rename_all = "camelCase")]
    QueueMoveRelative {
        song_ids: Vec<SongId>,
        to: u32,
        whence: Whence,
    },
    QueueCrop {},
    QueueCropOrClear {},
}

impl ApiCall {
    pub fn method(&self) -> ApiMethod {
        match self {
            ApiCall::QueueList { .. } => ApiMethod::QueueList,
            ApiCall::QueueSearch { .. } => ApiMethod::QueueSearch,
            ApiCall::QueueSearchAdv { .. } => ApiMethod::QueueSearchAdv,
            ApiCall::QueueRmSongIds { .. } => ApiMethod::QueueRmSongIds,
            ApiCall::QueueAppendUris { .. } => ApiMethod::QueueAppendUris,
            ApiCall::QueueInsertUris { .. } => ApiMethod::QueueInsertUris,
            ApiCall::QueueReplaceUris { .. } => ApiMethod::QueueReplaceUris,
            ApiCall::QueueAppendPlaylists { .. } => ApiMethod::QueueAppendPlaylists,
            ApiCall::QueueInsertPlaylists { .. } => ApiMethod::QueueInsertPlaylists,
            ApiCall::QueueReplacePlaylists { .. } => ApiMethod::QueueReplacePlaylists,
            ApiCall::QueuePrioSet { .. } => ApiMethod::QueuePrioSet,
            ApiCall::QueuePrioSetHighest { .. } => ApiMethod::QueuePrioSetHighest,
            ApiCall::QueueMoveRelative { .. } => ApiMethod::QueueMoveRelative,
            ApiCall::QueueCrop {} => ApiMethod::QueueCrop,
            ApiCall::QueueCropOrClear {} => ApiMethod::QueueCropOrClear,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("malformed request: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("unknown method {method:?}")]
    UnknownMethod { id: u64, method: String },
    #[error("invalid params for {method:?}: {source}")]
    InvalidParams {
        id: u64,
        method: ApiMethod,
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Request id, when the envelope was readable.
    pub fn id(&self) -> Option<u64> {
        match self {
            ApiError::Malformed(_) => None,
            ApiError::UnknownMethod { id, .. } | ApiError::InvalidParams { id, .. } => Some(*id),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawRequest {
    #[serde(default)]
    id: u64,
    method: String,
    #[serde(default)]
    params: Value,
}

impl ApiRequest {
    pub fn from_json(input: &str) -> Result<Self, ApiError> {
        let raw: RawRequest = serde_json::from_str(input).map_err(ApiError::Malformed)?;
        Self::from_raw(raw)
    }

    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        let raw: RawRequest = serde_json::from_value(value).map_err(ApiError::Malformed)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawRequest) -> Result<Self, ApiError> {
        let method: ApiMethod = serde_json::from_value(Value::String(raw.method.clone()))
            .map_err(|_| ApiError::UnknownMethod {
                id: raw.id,
                method: raw.method.clone(),
            })?;
        let params = match raw.params {
            Value::Null => json!({}),
            params => params,
        };
        let call: ApiCall = serde_json::from_value(json!({
            "method": raw.method,
            "params": params,
        }))
        .map_err(|source| ApiError::InvalidParams {
            id: raw.id,
            method,
            source,
        })?;
        Ok(Self { id: raw.id, call })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_list_request() {
        let request = ApiRequest::from_json(
            r#"{"jsonrpc":"2.0","id":4,"method":"QUEUE_LIST","params":{"offset":50,"limit":10,"cols":["Title","Artist"]}}"#,
        )
        .unwrap();
        assert_eq!(request.id, 4);
        assert_eq!(
            request.call,
            ApiCall::QueueList {
                offset: 50,
                limit: 10,
                cols: vec!["Title".into(), "Artist".into()],
            }
        );
        assert_eq!(request.call.method(), ApiMethod::QueueList);
    }

    #[test]
    fn decodes_camel_case_params_and_whence() {
        let request = ApiRequest::from_json(
            r#"{"id":1,"method":"QUEUE_MOVE_RELATIVE","params":{"songIds":[3,4],"to":0,"whence":1}}"#,
        )
        .unwrap();
        assert_eq!(
            request.call,
            ApiCall::QueueMoveRelative {
                song_ids: vec![SongId(3), SongId(4)],
                to: 0,
                whence: Whence::AfterCurrent,
            }
        );
    }

    #[test]
    fn params_may_be_omitted_for_crop() {
        let request = ApiRequest::from_json(r#"{"id":9,"method":"QUEUE_CROP_OR_CLEAR"}"#).unwrap();
        assert_eq!(request.call, ApiCall::QueueCropOrClear {});
    }

    #[test]
    fn unknown_method_keeps_id() {
        let err = ApiRequest::from_json(r#"{"id":5,"method":"PLAYER_PLAY","params":{}}"#)
            .unwrap_err();
        assert!(matches!(err, ApiError::UnknownMethod { id: 5, .. }));
        assert_eq!(err.id(), Some(5));
    }

    #[test]
    fn invalid_params_are_reported() {
        let err = ApiRequest::from_json(
            r#"{"id":6,"method":"QUEUE_INSERT_URIS","params":{"uris":["a"],"to":0,"whence":7}}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ApiError::InvalidParams {
                method: ApiMethod::QueueInsertUris,
                ..
            }
        ));
    }

    #[test]
    fn malformed_json_has_no_id() {
        let err = ApiRequest::from_json("{not json").unwrap_err();
        assert_eq!(err.id(), None);
    }
}
