use serde_json::{Map, Value};

use crate::utils::value::value_to_string;

/// HTTP methods accepted by the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// GET and DELETE carry their data in the query string, never the body.
    pub fn sends_query(&self) -> bool {
        matches!(self, Method::Get | Method::Delete)
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// How the executor should handle the Authorization header for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDirective {
    /// No override: attach a bearer token when one is available.
    Ambient,
    /// Caller supplied an empty Authorization header: do not authenticate.
    Suppressed,
    /// Caller supplied the full header value.
    Explicit(String),
}

/// A single call to the remote API. Constructed fresh per invocation and
/// immutable once handed to the executor.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub endpoint: String,
    pub method: Method,
    pub data: Map<String, Value>,
    /// Raw body override: skips JSON serialization of `data`, e.g. for
    /// url-encoded token exchange bodies.
    pub body: Option<String>,
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        ApiRequest {
            endpoint: endpoint.into(),
            method,
            data: Map::new(),
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Get, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Post, endpoint)
    }

    /// Replaces the request data with the fields of a JSON object.
    /// Non-object values are ignored.
    pub fn data(mut self, data: Value) -> Self {
        if let Value::Object(map) = data {
            self.data = map;
        }
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(name.into(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Substitutes `{name}` placeholders in an endpoint template with
    /// URL-encoded values.
    pub fn path(template: &str, params: &[(&str, &str)]) -> String {
        let mut endpoint = template.to_string();
        for (name, value) in params {
            let placeholder = format!("{{{}}}", name);
            endpoint = endpoint.replace(&placeholder, &urlencoding::encode(value));
        }
        endpoint
    }

    /// The data map flattened into query-string pairs.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.data
            .iter()
            .map(|(k, v)| (k.clone(), value_to_string(v.clone())))
            .collect()
    }

    /// The data map as a JSON object for body serialization.
    pub fn data_value(&self) -> Value {
        Value::Object(self.data.clone())
    }

    /// Resolves the caller's intent for the Authorization header.
    pub fn auth_directive(&self) -> AuthDirective {
        for (name, value) in &self.headers {
            if name.eq_ignore_ascii_case("authorization") {
                if value.is_empty() {
                    return AuthDirective::Suppressed;
                }
                return AuthDirective::Explicit(value.clone());
            }
        }
        AuthDirective::Ambient
    }

    /// Headers to forward as-is, excluding the Authorization override which
    /// the executor handles separately.
    pub fn extra_headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .filter(|(name, _)| !name.eq_ignore_ascii_case("authorization"))
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}
