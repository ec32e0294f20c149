use crate::error::BridgeError;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable error code, the [`BridgeError`] variant name.
    pub code: String,
    pub message: String,
}

/// What `call` hands back, serialized as JSON.
///
/// `{"id": "...", "ok": true, "result": ...}` or
/// `{"id": "...", "ok": false, "error": {"code": "Timeout", "message": "..."}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallResponse {
    pub id: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Json>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl CallResponse {
    #[must_use]
    pub const fn success(id: String, result: Json) -> Self {
        Self { id, ok: true, result: Some(result), error: None }
    }

    #[must_use]
    pub fn failure(id: String, error: &BridgeError) -> Self {
        Self {
            id,
            ok: false,
            result: None,
            error: Some(ErrorBody { code: error.kind().to_owned(), message: error.to_string() }),
        }
    }

    #[must_use]
    pub fn from_outcome(id: String, outcome: Result<Json, BridgeError>) -> Self {
        match outcome {
            Ok(result) => Self::success(id, result),
            Err(e) => Self::failure(id, &e),
        }
    }

    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            serde_json::json!({
                "id": self.id,
                "ok": false,
                "error": { "code": "Internal", "message": e.to_string() },
            })
            .to_string()
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, BridgeError> {
        serde_json::from_str(raw).map_err(|e| BridgeError::validation(e.to_string()))
    }

    /// Error code, when the call failed.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.code.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_carries_kind_as_code() {
        let response = CallResponse::failure("r1".into(), &BridgeError::validation("bad"));
        let json: Json = serde_json::from_str(&response.to_json()).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["error"]["code"], "Validation");
        assert!(json.get("result").is_none());
    }

    #[test]
    fn success_round_trips() {
        let response = CallResponse::success("r2".into(), serde_json::json!({ "id": 7 }));
        assert_eq!(CallResponse::from_json(&response.to_json()).unwrap(), response);
    }
}
