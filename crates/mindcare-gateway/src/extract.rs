//! Lenient body extractors. A body that cannot be read yields an empty value and the
//! orchestrator reports the missing input.

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Form,
};
use serde_json::Value;
use std::collections::HashMap;
use std::convert::Infallible;

fn content_type(req: &Request) -> String {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// Reads a named text field from a JSON object body.
pub fn json_field(body: &[u8], name: &str) -> Option<String> {
    serde_json::from_slice::<Value>(body)
        .ok()?
        .get(name)?
        .as_str()
        .map(str::to_string)
}

async fn multipart_field<S: Send + Sync>(req: Request, state: &S, name: &str) -> Option<Bytes> {
    let mut multipart = Multipart::from_request(req, state).await.ok()?;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some(name) {
            return field.bytes().await.ok();
        }
    }
    None
}

/// `statement` from a form (urlencoded or multipart) or a JSON body.
pub struct Statement(pub String);

#[async_trait]
impl<S> FromRequest<S> for Statement
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let ct = content_type(&req);
        let statement = if ct.starts_with("multipart/form-data") {
            multipart_field(req, state, "statement")
                .await
                .map(|b| String::from_utf8_lossy(&b).into_owned())
        } else if ct.starts_with("application/x-www-form-urlencoded") {
            Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .ok()
                .and_then(|Form(mut fields)| fields.remove("statement"))
        } else if ct.contains("json") {
            Bytes::from_request(req, state)
                .await
                .ok()
                .and_then(|body| json_field(&body, "statement"))
        } else {
            None
        };
        Ok(Statement(statement.unwrap_or_default()))
    }
}

/// `image` file from a multipart upload; `None` when absent.
pub struct ImageUpload(pub Option<Vec<u8>>);

#[async_trait]
impl<S> FromRequest<S> for ImageUpload
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !content_type(&req).starts_with("multipart/form-data") {
            return Ok(ImageUpload(None));
        }
        let image = multipart_field(req, state, "image").await.map(|b| b.to_vec());
        Ok(ImageUpload(image))
    }
}

/// Optional JSON body, read regardless of content type. Empty or malformed -> `None`.
pub struct LenientJson(pub Option<Value>);

#[async_trait]
impl<S> FromRequest<S> for LenientJson
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state).await.unwrap_or_default();
        if body.is_empty() {
            return Ok(LenientJson(None));
        }
        match serde_json::from_slice(&body) {
            Ok(value) => Ok(LenientJson(Some(value))),
            Err(e) => {
                tracing::warn!("[SYSTEM] Ignoring malformed JSON body: {}", e);
                Ok(LenientJson(None))
            }
        }
    }
}
