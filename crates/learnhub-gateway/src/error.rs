//! Error types for gateway operations.
//!
//! Every failure that reaches a caller is a [`GatewayError`]: a classified
//! [`ErrorKind`], a human-readable message, and the resource/operation the
//! call was made for. [`TransportError`] is the raw failure produced by the
//! transport layer before normalization.

use serde_json::Value;

use crate::resources::Operation;

/// Classification of a failed gateway call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The backend could not be reached (DNS, refused connection, timeout).
    Network,
    /// The backend rejected the credential (HTTP 401).
    Authorization,
    /// The backend rejected the request (4xx other than 401).
    Validation,
    /// The backend failed while handling the request (5xx).
    Server,
    /// Anything that does not fit the categories above.
    Unknown,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network failure",
            Self::Authorization => "authorization failure",
            Self::Validation => "validation failure",
            Self::Server => "server failure",
            Self::Unknown => "unknown failure",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps an HTTP status code to an error kind.
pub fn classify_status(status: u16) -> ErrorKind {
    match status {
        401 => ErrorKind::Authorization,
        400..=499 => ErrorKind::Validation,
        500..=599 => ErrorKind::Server,
        _ => ErrorKind::Unknown,
    }
}

/// Failure produced by a [`Transport`](crate::transport::Transport).
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// The request never got a response.
    #[error("Request to {url} failed: {message}")]
    Network {
        url: String,
        message: String,
        timed_out: bool,
    },

    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}: {raw}")]
    Status {
        status: u16,
        /// Decoded JSON error body, when the body was JSON.
        body: Option<Value>,
        /// Raw response body text.
        raw: String,
    },

    /// A 2xx response whose body is not valid JSON.
    #[error("Failed to decode response JSON: {0}")]
    Decode(String),
}

impl TransportError {
    /// HTTP status carried by the failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

/// The single error shape surfaced to gateway callers.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{operation} {resource} failed ({kind}): {message}")]
pub struct GatewayError {
    pub kind: ErrorKind,
    pub message: String,
    /// Logical resource (or endpoint) name the call targeted.
    pub resource: &'static str,
    pub operation: Operation,
    /// HTTP status, when the backend answered.
    pub status: Option<u16>,
}

impl GatewayError {
    pub fn new(
        kind: ErrorKind,
        message: impl Into<String>,
        resource: &'static str,
        operation: Operation,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            resource,
            operation,
            status: None,
        }
    }

    /// Normalizes a transport failure, tagging it with call context.
    pub fn from_transport(err: TransportError, resource: &'static str, operation: Operation) -> Self {
        match err {
            TransportError::Network {
                url,
                message,
                timed_out,
            } => {
                let message = if timed_out {
                    format!("request to {url} timed out")
                } else {
                    format!("could not reach {url}: {message}")
                };
                Self::new(ErrorKind::Network, message, resource, operation)
            }
            TransportError::Status { status, body, raw } => Self {
                kind: classify_status(status),
                message: extract_message(body.as_ref(), &raw, status),
                resource,
                operation,
                status: Some(status),
            },
            TransportError::Decode(message) => {
                Self::new(ErrorKind::Unknown, message, resource, operation)
            }
        }
    }

    /// Error for an operation the resource descriptor does not list.
    pub fn unsupported(resource: &'static str, operation: Operation) -> Self {
        Self::new(
            ErrorKind::Validation,
            format!("{resource} does not support {operation}"),
            resource,
            operation,
        )
    }

    pub fn is_network(&self) -> bool {
        self.kind == ErrorKind::Network
    }

    pub fn is_authorization(&self) -> bool {
        self.kind == ErrorKind::Authorization
    }

    pub fn is_validation(&self) -> bool {
        self.kind == ErrorKind::Validation
    }

    pub fn is_server(&self) -> bool {
        self.kind == ErrorKind::Server
    }
}

/// Pulls a readable message out of an error response.
///
/// Looks at `error`, `detail` and `message` string fields first, then
/// field-level validation errors (`{"name": ["This field is required."]}`),
/// then the raw body, then the status code.
pub fn extract_message(body: Option<&Value>, raw: &str, status: u16) -> String {
    if let Some(body) = body {
        for key in ["error", "detail", "message"] {
            if let Some(msg) = body.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }

        if let Some(fields) = body.as_object() {
            let msgs: Vec<String> = fields
                .iter()
                .filter_map(|(field, value)| field_message(value).map(|m| format!("{field}: {m}")))
                .collect();
            if !msgs.is_empty() {
                return msgs.join("; ");
            }
        }

        if let Some(msg) = body.as_str() {
            return msg.to_string();
        }
    }

    let raw = raw.trim();
    if raw.is_empty() {
        format!("HTTP {status}")
    } else {
        raw.to_string()
    }
}

fn field_message(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(|i| i.as_str()).collect();
            (!parts.is_empty()).then(|| parts.join(" "))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(401), ErrorKind::Authorization);
        assert_eq!(classify_status(400), ErrorKind::Validation);
        assert_eq!(classify_status(403), ErrorKind::Validation);
        assert_eq!(classify_status(404), ErrorKind::Validation);
        assert_eq!(classify_status(500), ErrorKind::Server);
        assert_eq!(classify_status(503), ErrorKind::Server);
        assert_eq!(classify_status(302), ErrorKind::Unknown);
    }

    #[test]
    fn test_extract_message_prefers_error_field() {
        let body = json!({"error": "name required", "detail": "ignored"});
        assert_eq!(extract_message(Some(&body), "", 400), "name required");

        let body = json!({"detail": "Not found."});
        assert_eq!(extract_message(Some(&body), "", 404), "Not found.");
    }

    #[test]
    fn test_extract_message_field_errors() {
        let body = json!({"name": ["This field is required."], "start_date": "Invalid date."});
        let msg = extract_message(Some(&body), "", 400);
        assert!(msg.contains("name: This field is required."));
        assert!(msg.contains("start_date: Invalid date."));
    }

    #[test]
    fn test_extract_message_fallbacks() {
        assert_eq!(extract_message(None, "Bad Gateway\n", 502), "Bad Gateway");
        assert_eq!(extract_message(None, "", 500), "HTTP 500");
        assert_eq!(extract_message(Some(&json!({})), "", 418), "HTTP 418");
    }

    #[test]
    fn test_from_transport_status() {
        let err = GatewayError::from_transport(
            TransportError::Status {
                status: 400,
                body: Some(json!({"error": "name required"})),
                raw: r#"{"error":"name required"}"#.into(),
            },
            "course",
            Operation::Create,
        );
        assert!(err.is_validation());
        assert_eq!(err.message, "name required");
        assert_eq!(err.status, Some(400));
        assert_eq!(err.resource, "course");
        assert_eq!(err.operation, Operation::Create);
        assert_eq!(
            err.to_string(),
            "create course failed (validation failure): name required"
        );
    }

    #[test]
    fn test_from_transport_network() {
        let err = GatewayError::from_transport(
            TransportError::Network {
                url: "http://localhost:1/api/hello/".into(),
                message: "connection refused".into(),
                timed_out: false,
            },
            "health",
            Operation::Get,
        );
        assert!(err.is_network());
        assert!(err.message.contains("connection refused"));
        assert_eq!(err.status, None);

        let err = GatewayError::from_transport(
            TransportError::Network {
                url: "http://slow".into(),
                message: "operation timed out".into(),
                timed_out: true,
            },
            "course",
            Operation::List,
        );
        assert!(err.is_network());
        assert!(err.message.contains("timed out"));
    }

    #[test]
    fn test_from_transport_decode_is_unknown() {
        let err = GatewayError::from_transport(
            TransportError::Decode("expected value".into()),
            "team",
            Operation::List,
        );
        assert_eq!(err.kind, ErrorKind::Unknown);
    }

    #[test]
    fn test_unsupported() {
        let err = GatewayError::unsupported("analytics", Operation::Delete);
        assert!(err.is_validation());
        assert_eq!(err.message, "analytics does not support delete");
    }
}
