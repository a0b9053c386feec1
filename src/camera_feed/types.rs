//! Camera stream types: fetch strategy, failure classification, scan
//! outcomes

use serde::{Deserialize, Serialize};

/// How the controller reaches the operator-supplied stream URL.
///
/// Proxied fetch routes through the camera-image proxy to bypass
/// cross-origin restrictions; the choice is configuration, not URL
/// patching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStrategy {
    Direct,
    Proxied,
}

impl FetchStrategy {
    /// Parse from config ("direct" / "proxied"), defaulting to direct
    pub fn from_config(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "proxied" => Self::Proxied,
            _ => Self::Direct,
        }
    }
}

/// Classified stream connection failure kinds, each with a distinct
/// remediation hint for the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamErrorKind {
    PermissionDenied,
    Timeout,
    Refused,
    Reset,
    HostNotFound,
    CrossOrigin,
    Other,
}

impl StreamErrorKind {
    /// Stable diagnostic code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::Timeout => "TIMEOUT",
            Self::Refused => "CONNECTION_REFUSED",
            Self::Reset => "CONNECTION_RESET",
            Self::HostNotFound => "HOST_NOT_FOUND",
            Self::CrossOrigin => "CROSS_ORIGIN",
            Self::Other => "FETCH_FAILED",
        }
    }

    /// Short human-readable message
    pub fn message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "Camera access denied",
            Self::Timeout => "Connection timeout",
            Self::Refused => "Connection refused",
            Self::Reset => "Connection reset",
            Self::HostNotFound => "Host not found",
            Self::CrossOrigin => "Cross-origin request blocked",
            Self::Other => "Failed to fetch camera stream",
        }
    }

    /// Remediation hint surfaced to the operator
    pub fn hint(&self) -> &'static str {
        match self {
            Self::PermissionDenied => {
                "The camera rejected the request. Check the stream credentials and permissions."
            }
            Self::Timeout => {
                "Cannot reach camera. Verify the camera is online and accessible from this server."
            }
            Self::Refused => {
                "Camera refused the connection. Check if the camera service is running."
            }
            Self::Reset => {
                "Camera connection was reset. The camera may be offline or not accessible."
            }
            Self::HostNotFound => "Cannot resolve hostname. Check if the camera URL is correct.",
            Self::CrossOrigin => {
                "The stream blocks cross-origin access. Switch to the proxied fetch strategy."
            }
            Self::Other => "Retry the connection. If the problem persists, check the stream URL.",
        }
    }
}

/// A classified stream failure with operator-facing details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamError {
    pub kind: StreamErrorKind,
    pub details: String,
}

impl StreamError {
    /// Build from a kind, using its remediation hint as details
    pub fn from_kind(kind: StreamErrorKind) -> Self {
        Self {
            kind,
            details: kind.hint().to_string(),
        }
    }

    pub fn with_details(kind: StreamErrorKind, details: impl Into<String>) -> Self {
        Self {
            kind,
            details: details.into(),
        }
    }
}

/// Classify a fetch failure by walking the error source chain.
///
/// DNS failures surface as io errors whose message mentions the lookup;
/// everything else maps from the io error kind.
pub fn classify_fetch_error(err: &reqwest::Error) -> StreamErrorKind {
    if err.is_timeout() {
        return StreamErrorKind::Timeout;
    }

    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            return match io.kind() {
                std::io::ErrorKind::ConnectionRefused => StreamErrorKind::Refused,
                std::io::ErrorKind::ConnectionReset
                | std::io::ErrorKind::ConnectionAborted
                | std::io::ErrorKind::BrokenPipe => StreamErrorKind::Reset,
                std::io::ErrorKind::TimedOut => StreamErrorKind::Timeout,
                _ => {
                    let text = io.to_string();
                    if text.contains("lookup") || text.contains("dns") {
                        StreamErrorKind::HostNotFound
                    } else {
                        StreamErrorKind::Other
                    }
                }
            };
        }
        let text = cause.to_string();
        if text.contains("dns error") || text.contains("failed to lookup") {
            return StreamErrorKind::HostNotFound;
        }
        source = cause.source();
    }

    if err.is_connect() {
        return StreamErrorKind::Refused;
    }

    StreamErrorKind::Other
}

/// Result of a manual or automatic plate scan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScanOutcome {
    /// Plate matched a vehicle outside campus; entry was invoked
    Entered { plate: String },
    /// Plate matched a vehicle inside campus; exit was invoked
    Exited { plate: String },
    /// Plate identified but no registered vehicle matches
    NotRegistered { plate: String },
    /// Capture or identification failed
    Failed { message: String },
    /// A scan was already in flight
    Busy,
    /// No active stream to capture from
    NotConnected,
}

/// Live-feed controller status for the dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraFeedStatus {
    pub connected: bool,
    pub url: Option<String>,
    pub autoscan: bool,
    pub scanning: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<StreamError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_outcome: Option<ScanOutcome>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_strategy_from_config() {
        assert_eq!(FetchStrategy::from_config("proxied"), FetchStrategy::Proxied);
        assert_eq!(FetchStrategy::from_config("PROXIED"), FetchStrategy::Proxied);
        assert_eq!(FetchStrategy::from_config("direct"), FetchStrategy::Direct);
        assert_eq!(FetchStrategy::from_config(""), FetchStrategy::Direct);
    }

    #[test]
    fn test_error_kinds_have_distinct_codes_and_hints() {
        let kinds = [
            StreamErrorKind::PermissionDenied,
            StreamErrorKind::Timeout,
            StreamErrorKind::Refused,
            StreamErrorKind::Reset,
            StreamErrorKind::HostNotFound,
            StreamErrorKind::CrossOrigin,
            StreamErrorKind::Other,
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in kinds.iter().skip(i + 1) {
                assert_ne!(a.code(), b.code());
                assert_ne!(a.hint(), b.hint());
            }
        }
    }

    #[test]
    fn test_scan_outcome_wire_format() {
        let outcome = ScanOutcome::NotRegistered {
            plate: "XYZ 99999".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "not_registered");
        assert_eq!(json["plate"], "XYZ 99999");
    }

    #[test]
    fn test_stream_error_defaults_to_hint() {
        let err = StreamError::from_kind(StreamErrorKind::Refused);
        assert_eq!(err.details, StreamErrorKind::Refused.hint());
    }
}
