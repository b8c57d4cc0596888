// HTTP call descriptors
//
// An `ApiRequest` is a plain value describing one backend call. Keeping the
// description separate from its execution lets the dispatch layer replay the
// exact same call after a token refresh.

use serde::Serialize;
use serde_json::Value;

use crate::error::Error;

/// HTTP verbs used by the SoulSeer backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single backend call: method, path under the API root, query string,
/// optional JSON body, and whether the auth header is required.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub auth: bool,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            auth: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Mark the call as public: no auth header, no refresh on 401.
    pub fn public(mut self) -> Self {
        self.auth = false;
        self
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: &(impl Serialize + ?Sized)) -> Result<Self, Error> {
        let value = serde_json::to_value(body).map_err(|e| Error::Deserialization {
            message: format!("failed to encode request body: {e}"),
            body: String::new(),
        })?;
        self.body = Some(value);
        Ok(self)
    }

    /// Attach an already-encoded JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Append one query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append every non-empty filter value as a query parameter.
    ///
    /// Empty strings are dropped so callers can pass optional form fields
    /// straight through.
    pub fn filters<'a, I>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (key, value) in filters {
            if !value.is_empty() {
                self.query.push((key.to_owned(), value.to_owned()));
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_default_to_authenticated() {
        let req = ApiRequest::get("messages");
        assert!(req.auth);
        assert!(!req.public().auth);
    }

    #[test]
    fn filters_skip_empty_values() {
        let req = ApiRequest::get("products").filters([("type", "reading"), ("search", "")]);
        assert_eq!(req.query, vec![("type".to_owned(), "reading".to_owned())]);
    }
}
