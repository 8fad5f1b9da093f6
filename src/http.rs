use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::auth::TokenProvider;

/// Non-success response from the remote service.
#[derive(Debug, Error)]
#[error("{method} {path} failed: {status} - {body}")]
pub struct StatusError {
    pub method: Method,
    pub path: String,
    pub status: StatusCode,
    pub body: String,
}

/// True when `err` is a [`StatusError`] with status 404.
pub fn is_not_found(err: &anyhow::Error) -> bool {
    err.downcast_ref::<StatusError>()
        .is_some_and(|e| e.status == StatusCode::NOT_FOUND)
}

/// JSON client for the food log and goals services.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: Arc<dyn TokenProvider>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, auth: Arc<dyn TokenProvider>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
            auth,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let req = self.client.request(method, &url);
        match self.auth.token().await {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(&self, method: Method, path: &str, req: RequestBuilder) -> Result<Response> {
        let resp = req
            .send()
            .await
            .with_context(|| format!("{method} {path}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(StatusError {
                method,
                path: path.to_string(),
                status,
                body,
            }
            .into());
        }

        Ok(resp)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let req = self.request(Method::GET, path).await;
        let resp = self.send(Method::GET, path, req).await?;
        resp.json()
            .await
            .with_context(|| format!("decoding GET {path} response"))
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self.request(Method::POST, path).await.json(body);
        let resp = self.send(Method::POST, path, req).await?;
        resp.json()
            .await
            .with_context(|| format!("decoding POST {path} response"))
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self.request(Method::PUT, path).await.json(body);
        let resp = self.send(Method::PUT, path, req).await?;
        resp.json()
            .await
            .with_context(|| format!("decoding PUT {path} response"))
    }

    /// PUT where only the status matters.
    pub async fn put_unit<B>(&self, path: &str, body: &B) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let req = self.request(Method::PUT, path).await.json(body);
        self.send(Method::PUT, path, req).await?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        let req = self.request(Method::DELETE, path).await;
        self.send(Method::DELETE, path, req).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticToken;
    use httpmock::prelude::*;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn attaches_bearer_token_when_present() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/ping")
                .header("authorization", "Bearer secret");
            then.status(200).json_body(json!({"ok": true}));
        });

        let api = ApiClient::new(server.base_url(), Arc::new(StaticToken::new("secret")));
        let body: Value = api.get("/ping").await.unwrap();
        assert_eq!(body, json!({"ok": true}));
        mock.assert();
    }

    #[tokio::test]
    async fn non_success_status_is_a_status_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(DELETE).path("/api/food/log/missing");
            then.status(404).body("Food log not found");
        });
        server.mock(|when, then| {
            when.method(DELETE).path("/api/food/log/broken");
            then.status(500).body("boom");
        });

        let api = ApiClient::new(format!("{}/", server.base_url()), Arc::new(StaticToken::none()));

        let err = api.delete("/api/food/log/missing").await.unwrap_err();
        assert!(is_not_found(&err));
        assert!(err.to_string().contains("Food log not found"));

        let err = api.delete("/api/food/log/broken").await.unwrap_err();
        assert!(!is_not_found(&err));
        assert!(err.to_string().contains("500"));
    }
}
