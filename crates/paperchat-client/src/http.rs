use std::sync::Arc;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

/// HTTP adapter: one base URL, one shared cookie jar. The auth credential is
/// a cookie the jar carries on every request; nothing token-shaped lives in
/// application memory.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

/// `{ "data": ... }` — the envelope most resource endpoints use.
#[derive(Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

/// Lists arrive either bare or enveloped depending on the endpoint.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum ListBody<T> {
    Wrapped { data: Vec<T> },
    Bare(Vec<T>),
}

impl<T> ListBody<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListBody::Wrapped { data } => data,
            ListBody::Bare(items) => items,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        let client = Client::builder()
            .cookie_provider(Arc::new(reqwest::cookie::Jar::default()))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map a non-2xx response into `ClientError::Server`, pulling the
    /// backend's `{ "message": ... }` when it sent one.
    async fn check(resp: Response) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| default_status_message(status));
        Err(ClientError::Server {
            status: status.as_u16(),
            message,
        })
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self.client.get(self.url(path)).send().await?;
        let resp = Self::check(resp).await?;
        Ok(resp.json::<T>().await?)
    }

    pub(crate) async fn get_empty(&self, path: &str) -> Result<()> {
        let resp = self.client.get(self.url(path)).send().await?;
        Self::check(resp).await?;
        Ok(())
    }

    pub(crate) async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let resp = self.client.post(self.url(path)).json(body).send().await?;
        let resp = Self::check(resp).await?;
        Ok(resp.json::<T>().await?)
    }

    pub(crate) async fn post_empty<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        let resp = self.client.post(self.url(path)).json(body).send().await?;
        Self::check(resp).await?;
        Ok(())
    }

    pub(crate) async fn post_no_body(&self, path: &str) -> Result<()> {
        let resp = self.client.post(self.url(path)).send().await?;
        Self::check(resp).await?;
        Ok(())
    }

    pub(crate) async fn put_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let resp = self.client.put(self.url(path)).json(body).send().await?;
        let resp = Self::check(resp).await?;
        Ok(resp.json::<T>().await?)
    }

    pub(crate) async fn put_empty<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        let resp = self.client.put(self.url(path)).json(body).send().await?;
        Self::check(resp).await?;
        Ok(())
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        let resp = self.client.delete(self.url(path)).send().await?;
        Self::check(resp).await?;
        Ok(())
    }

    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T> {
        let resp = self
            .client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await?;
        let resp = Self::check(resp).await?;
        Ok(resp.json::<T>().await?)
    }

    pub(crate) async fn post_multipart_empty(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<()> {
        let resp = self
            .client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }
}

fn default_status_message(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("Server error: {}", reason),
        None => format!("Server error: {}", status.as_u16()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = ApiClient::new("https://api.example.com/").unwrap();
        assert_eq!(client.url("/api/plan"), "https://api.example.com/api/plan");
    }

    #[test]
    fn list_body_accepts_bare_and_enveloped() {
        let bare: ListBody<u32> = serde_json::from_str("[1,2,3]").unwrap();
        assert_eq!(bare.into_vec(), vec![1, 2, 3]);

        let wrapped: ListBody<u32> = serde_json::from_str(r#"{"data":[4,5]}"#).unwrap();
        assert_eq!(wrapped.into_vec(), vec![4, 5]);
    }
}
