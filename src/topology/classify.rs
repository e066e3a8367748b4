use serde::{Deserialize, Serialize};
use url::Url;

/// Prefix marking an internal hub path, e.g. `http-/orders/inbound`.
pub const LOCAL_ENDPOINT_PREFIX: &str = "http-/";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointKind {
    Local,
    External,
    Middleware,
}

impl EndpointKind {
    /// Classifies a raw endpoint label. Total and deterministic: unrecognised
    /// or empty labels fall back to `Middleware`.
    pub fn classify(label: &str) -> Self {
        if label.starts_with(LOCAL_ENDPOINT_PREFIX) {
            return Self::Local;
        }

        match Url::parse(label) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::External,
            _ => Self::Middleware,
        }
    }

    pub fn probe_eligible(self) -> bool {
        matches!(self, Self::External)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::External => "external",
            Self::Middleware => "middleware",
        }
    }
}
