//! Origin check for WebSocket upgrades.

use std::sync::Arc;

use axum::http::HeaderValue;

/// Which browser origins may open a relay connection.
///
/// An empty list accepts every origin. Requests without an `Origin` header
/// come from non-browser clients and are always accepted.
#[derive(Debug, Clone, Default)]
pub struct OriginPolicy {
    allowed: Arc<[String]>,
}

impl OriginPolicy {
    /// Accept any origin.
    pub fn permissive() -> Self {
        Self::default()
    }

    /// Accept only the listed origins, compared without trailing slashes.
    pub fn allow_list(origins: Vec<String>) -> Self {
        let allowed: Vec<String> = origins
            .into_iter()
            .map(|o| o.trim().trim_end_matches('/').to_string())
            .filter(|o| !o.is_empty())
            .collect();
        Self {
            allowed: allowed.into(),
        }
    }

    pub fn is_permissive(&self) -> bool {
        self.allowed.is_empty()
    }

    /// Returns true if a request carrying `origin` may upgrade.
    pub fn allows(&self, origin: Option<&HeaderValue>) -> bool {
        if self.is_permissive() {
            return true;
        }
        let Some(origin) = origin else {
            return true;
        };
        match origin.to_str() {
            Ok(origin) => {
                let origin = origin.trim_end_matches('/');
                self.allowed.iter().any(|allowed| allowed == origin)
            }
            Err(_) => false,
        }
    }
}
