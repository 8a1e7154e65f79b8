//! Replayable request descriptions
//!
//! A `reqwest::RequestBuilder` is consumed when sent and cannot be cloned once
//! it carries a multipart body, so the client keeps a plain description of
//! each call and builds a fresh request for every attempt.

use super::error::ClientError;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, header};
use serde::Serialize;

/// Request body
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<FilePart>),
}

/// A file sent as one field of a multipart form
#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

/// Description of one API call
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// Set a JSON body
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ClientError> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Append a query parameter
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Add a file to the multipart body
    pub fn file(mut self, part: FilePart) -> Self {
        match &mut self.body {
            RequestBody::Multipart(parts) => parts.push(part),
            body => *body = RequestBody::Multipart(vec![part]),
        }
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Build a sendable request, attaching `access` as a bearer token
    pub(crate) fn build(
        &self,
        client: &Client,
        base_url: &str,
        access: Option<&str>,
    ) -> Result<RequestBuilder, ClientError> {
        let url = format!("{}{}", base_url, self.path);
        let mut request = client.request(self.method.clone(), url);

        if !self.query.is_empty() {
            request = request.query(&self.query);
        }

        if let Some(token) = access {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        request = match &self.body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(value),
            RequestBody::Multipart(parts) => {
                let mut form = Form::new();
                for part in parts {
                    let mut file = Part::bytes(part.bytes.clone()).file_name(part.file_name.clone());
                    if let Some(mime) = &part.mime {
                        file = file.mime_str(mime)?;
                    }
                    form = form.part(part.field.clone(), file);
                }
                request.multipart(form)
            }
        };

        Ok(request)
    }
}
