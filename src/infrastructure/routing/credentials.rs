//! Shared routing access token

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

/// Bearer token used by every routing client.
///
/// Acquiring and refreshing the token happens outside this service; whoever
/// owns the refresh calls [`RoutingCredentials::replace`]. In-flight requests
/// keep the token they started with.
#[derive(Clone, Default)]
pub struct RoutingCredentials {
    token: Arc<RwLock<String>>,
}

impl RoutingCredentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Arc::new(RwLock::new(token.into())),
        }
    }

    pub async fn current(&self) -> String {
        self.token.read().await.clone()
    }

    pub async fn replace(&self, token: impl Into<String>) {
        *self.token.write().await = token.into();
        info!("🔑 Routing access token replaced");
    }
}

impl std::fmt::Debug for RoutingCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingCredentials").finish_non_exhaustive()
    }
}
