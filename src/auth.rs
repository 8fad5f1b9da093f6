use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

/// Supplies the opaque credential attached to remote calls.
///
/// The core never interprets the token; it only needs to know whether one
/// is present.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> Option<String>;
}

/// A fixed credential, or none.
#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// A credential an external login flow can set or clear at runtime.
#[derive(Debug, Clone, Default)]
pub struct SharedToken {
    token: Arc<Mutex<Option<String>>>,
}

impl SharedToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, token: impl Into<String>) {
        *self.token.lock().await = Some(token.into());
    }

    pub async fn clear(&self) {
        *self.token.lock().await = None;
    }
}

#[async_trait]
impl TokenProvider for SharedToken {
    async fn token(&self) -> Option<String> {
        self.token.lock().await.clone()
    }
}
