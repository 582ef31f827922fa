//! HTTP request building and execution.
//!
//! One `Executor` is built per invocation from the resolved settings. It
//! assembles the URL, query string and JSON body for a request template,
//! sends the request with the configured timeout and classifies failures
//! into the client error taxonomy.

use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::{Client, Method, StatusCode};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, trace};

use crate::params::{coerce_value, ListModifiers};
use crate::routes::RequestTemplate;
use crate::settings::Settings;

/// KEY whose value is a file path substituted with base64-encoded content.
pub const IMAGE_KEY: &str = "image";

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("API error: {status}: {body}")]
    Api { status: u16, body: String },
    #[error("request timed out")]
    Timeout,
    #[error("connection error: {0}")]
    Transport(String),
    #[error("image file not found: {0}")]
    ImageFile(PathBuf),
    #[error("failed to read image file '{path}': {source}")]
    ImageRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid response body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),
}

impl RequestError {
    /// Whether the server rejected the bearer token.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, RequestError::Api { status: 401 | 403, .. })
    }
}

fn classify(error: reqwest::Error) -> RequestError {
    if error.is_timeout() {
        RequestError::Timeout
    } else if error.is_connect() {
        RequestError::Transport(error.to_string())
    } else {
        RequestError::Http(error)
    }
}

/// HTTP executor bound to one server and timeout.
pub struct Executor {
    client: Client,
    server: String,
}

impl Executor {
    pub fn new(settings: &Settings) -> Result<Self, RequestError> {
        let client = Client::builder()
            .user_agent(crate::settings::DEFAULT_APPLICATION_ID)
            .timeout(settings.timeout)
            .build()
            .map_err(RequestError::Http)?;

        Ok(Self {
            client,
            server: settings.server_str().to_string(),
        })
    }

    /// Compose the endpoint URL for a template and optional id.
    pub fn url_for(&self, template: &RequestTemplate, id: Option<i64>) -> String {
        let mut url = format!("{}/{}/", self.server, template.resource.path());
        if let Some(id) = id {
            url.push_str(&id.to_string());
            if let Some(suffix) = template.suffix {
                url.push('/');
                url.push_str(suffix);
            }
        }

        url
    }

    /// URL for a non-resource endpoint such as `login` or `register`.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}/", self.server, endpoint.trim_matches('/'))
    }

    /// Execute a resolved resource request and return the decoded response.
    pub async fn execute(
        &self,
        template: &RequestTemplate,
        token: &str,
        id: Option<i64>,
        pairs: &[(String, String)],
        modifiers: &ListModifiers,
    ) -> Result<Value, RequestError> {
        let url = self.url_for(template, id);
        debug!("{} {}", template.method, url);

        let query = if template.allows_modifiers {
            build_query(modifiers, if template.allows_data { pairs } else { &[] })
        } else {
            Vec::new()
        };

        let body = if template.allows_data && !template.allows_modifiers {
            Some(build_body(pairs)?)
        } else {
            None
        };

        self.send(template.method.clone(), &url, &query, body.as_ref(), Some(token))
            .await
    }

    /// Send a single request and decode the JSON response.
    ///
    /// Shared by the resource path and the authentication exchanges.
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        query: &[(String, String)],
        body: Option<&Map<String, Value>>,
        token: Option<&str>,
    ) -> Result<Value, RequestError> {
        let mut request = self
            .client
            .request(method, url)
            .header("Accept", "application/json");

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(classify)?;
        let status = response.status();
        let text = response.text().await.map_err(classify)?;
        trace!("Response status {}: {}", status, text);

        if !status.is_success() {
            return Err(RequestError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        // A bodyless 204 is still a success
        if text.is_empty() || status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&text)?)
    }
}

/// Build the query string for list and query actions.
///
/// Modifiers are forwarded verbatim; for query, the KEY=VALUE filter pairs
/// ride along as additional query parameters.
pub fn build_query(
    modifiers: &ListModifiers,
    filter_pairs: &[(String, String)],
) -> Vec<(String, String)> {
    let mut query = Vec::new();
    if let Some(limit) = modifiers.limit {
        query.push(("limit".to_string(), limit.to_string()));
    }
    if let Some(offset) = modifiers.offset {
        query.push(("offset".to_string(), offset.to_string()));
    }
    if let Some(order_by) = &modifiers.order_by {
        query.push(("order_by".to_string(), order_by.to_string()));
    }
    for (key, value) in filter_pairs {
        query.push((key.clone(), value.clone()));
    }

    query
}

/// Build a JSON body from KEY=VALUE pairs.
///
/// The `image` key is a value-level transform, independent of resource or
/// action: its value names a file whose bytes are substituted base64-encoded.
pub fn build_body(pairs: &[(String, String)]) -> Result<Map<String, Value>, RequestError> {
    let mut body = Map::new();
    for (key, value) in pairs {
        if key == IMAGE_KEY {
            body.insert(key.clone(), Value::String(encode_image(value)?));
        } else {
            body.insert(key.clone(), coerce_value(value));
        }
    }

    Ok(body)
}

fn encode_image(path: &str) -> Result<String, RequestError> {
    let path = PathBuf::from(path);
    let bytes = std::fs::read(&path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RequestError::ImageFile(path.clone())
        } else {
            RequestError::ImageRead { path: path.clone(), source: e }
        }
    })?;

    Ok(BASE64.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::OrderBy;
    use crate::routes::{resolve, Action, Resource};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn executor() -> Executor {
        let settings = Settings::new(
            "http://localhost:8000",
            "a@b.com",
            10,
            Some(PathBuf::from("unused")),
        )
        .unwrap();
        Executor::new(&settings).unwrap()
    }

    #[test]
    fn test_url_for_list() {
        let template = resolve(Resource::Requests, Action::List).unwrap();
        assert_eq!(
            executor().url_for(&template, None),
            "http://localhost:8000/requests/"
        );
    }

    #[test]
    fn test_url_for_get_with_id() {
        let template = resolve(Resource::Resources, Action::Get).unwrap();
        assert_eq!(
            executor().url_for(&template, Some(42)),
            "http://localhost:8000/resources/42"
        );
    }

    #[test]
    fn test_url_for_approve() {
        let template = resolve(Resource::Requests, Action::Approve).unwrap();
        assert_eq!(
            executor().url_for(&template, Some(7)),
            "http://localhost:8000/requests/7/approve"
        );
    }

    #[test]
    fn test_endpoint_url() {
        assert_eq!(
            executor().endpoint_url("login"),
            "http://localhost:8000/login/"
        );
    }

    #[test]
    fn test_build_query_forwards_modifiers() {
        let modifiers = ListModifiers {
            limit: Some(10),
            offset: Some(5),
            order_by: Some("name,-created_at".parse::<OrderBy>().unwrap()),
        };
        let query = build_query(&modifiers, &[]);
        assert_eq!(
            query,
            vec![
                ("limit".to_string(), "10".to_string()),
                ("offset".to_string(), "5".to_string()),
                ("order_by".to_string(), "name,-created_at".to_string()),
            ]
        );
    }

    #[test]
    fn test_build_query_appends_filters() {
        let pairs = vec![("name".to_string(), "gpu".to_string())];
        let query = build_query(&ListModifiers::default(), &pairs);
        assert_eq!(query, vec![("name".to_string(), "gpu".to_string())]);
    }

    #[test]
    fn test_build_body_coerces_scalars() {
        let pairs = vec![
            ("name".to_string(), "web".to_string()),
            ("capacity".to_string(), "4".to_string()),
            ("active".to_string(), "true".to_string()),
        ];
        let body = build_body(&pairs).unwrap();
        assert_eq!(body["name"], Value::from("web"));
        assert_eq!(body["capacity"], Value::from(4));
        assert_eq!(body["active"], Value::Bool(true));
    }

    #[test]
    fn test_image_value_is_base64_of_file_bytes() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0xDE, 0xAD, 0xBE, 0xEF]).unwrap();

        let pairs = vec![(
            IMAGE_KEY.to_string(),
            file.path().to_string_lossy().to_string(),
        )];
        let body = build_body(&pairs).unwrap();
        assert_eq!(body[IMAGE_KEY], Value::from(BASE64.encode([0xDE, 0xAD, 0xBE, 0xEF])));
    }

    #[test]
    fn test_missing_image_file() {
        let pairs = vec![(IMAGE_KEY.to_string(), "/no/such/file.png".to_string())];
        let err = build_body(&pairs).unwrap_err();
        assert!(matches!(err, RequestError::ImageFile(_)));
    }

    #[test]
    fn test_auth_rejection_detection() {
        let unauthorized = RequestError::Api {
            status: 401,
            body: String::new(),
        };
        assert!(unauthorized.is_auth_rejection());

        let server_error = RequestError::Api {
            status: 500,
            body: String::new(),
        };
        assert!(!server_error.is_auth_rejection());
    }
}
