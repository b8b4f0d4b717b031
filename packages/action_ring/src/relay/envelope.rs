use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use super::RelayError;

/// A validated relay request, ready to be sent.
#[derive(Debug, Clone)]
pub struct RelayEnvelope {
    pub method: Method,
    pub origin: String,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl RelayEnvelope {
    /// Validate the JSON envelope `{protocol, origin, path, method, headers, body}`.
    ///
    /// `protocol`, `origin`, `path` and `method` must be non-empty strings and
    /// `headers` must be present. A string `body` is sent verbatim; any other
    /// JSON body is serialized.
    pub fn from_value(value: &Value) -> Result<Self, RelayError> {
        let field = |name: &str| {
            value
                .get(name)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        };

        let (Some(protocol), Some(origin), Some(path), Some(method)) = (
            field("protocol"),
            field("origin"),
            field("path"),
            field("method"),
        ) else {
            return Err(RelayError::MissingFields);
        };
        let headers = match value.get("headers") {
            None | Some(Value::Null) => return Err(RelayError::MissingFields),
            Some(headers) => parse_headers(headers)?,
        };

        let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
            .map_err(|_| RelayError::InvalidMethod(method.to_string()))?;

        let body = match value.get("body") {
            None => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        };

        Ok(Self {
            method,
            origin: origin.to_string(),
            url: format!(
                "{protocol}://{origin}/{}",
                path.strip_prefix('/').unwrap_or(path)
            ),
            headers,
            body,
        })
    }
}

fn parse_headers(value: &Value) -> Result<HeaderMap, RelayError> {
    let Value::Object(map) = value else {
        return Err(RelayError::InvalidHeader(
            "headers must be an object".to_string(),
        ));
    };

    let mut headers = HeaderMap::with_capacity(map.len());
    for (name, value) in map {
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Number(_) | Value::Bool(_) => value.to_string(),
            _ => return Err(RelayError::InvalidHeader(name.clone())),
        };
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| RelayError::InvalidHeader(name.clone()))?;
        let value = HeaderValue::from_str(&text)
            .map_err(|_| RelayError::InvalidHeader(name.to_string()))?;
        headers.append(name, value);
    }
    Ok(headers)
}
