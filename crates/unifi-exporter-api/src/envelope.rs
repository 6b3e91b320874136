// Response unwrapping.
//
// Stat endpoints answer `{ "meta": { "rc": "ok" }, "data": [...] }`.
// Failures come back three ways: an HTTP status, `meta.rc != "ok"` with a
// message code in `meta.msg`, or (UniFi OS only) HTTP 200 with an
// `{ "error": { "code", "message" } }` object instead of the envelope.
//
// Records inside `data` are decoded one by one: a record whose fields do
// not fit the model is logged and dropped, the rest of the list survives.

use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::error::Error;

/// `meta.msg` when the session cookie is no longer accepted.
pub const LOGIN_REQUIRED: &str = "api.err.LoginRequired";

/// Longest body excerpt carried in an error message.
const EXCERPT_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub meta: Meta,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct Meta {
    pub rc: String,
    #[serde(default)]
    pub msg: Option<String>,
}

#[derive(Deserialize)]
struct ConsoleFailure {
    error: Option<ConsoleError>,
}

#[derive(Deserialize)]
struct ConsoleError {
    code: u16,
    message: Option<String>,
}

/// Turn a controller response into the `data` array, or the matching [`Error`].
pub async fn unwrap<T: DeserializeOwned>(resp: reqwest::Response) -> Result<Vec<T>, Error> {
    let status = resp.status();
    match status {
        StatusCode::UNAUTHORIZED => {
            return Err(Error::Authentication {
                message: "session expired or invalid credentials (HTTP 401)".into(),
            });
        }
        StatusCode::FORBIDDEN => {
            return Err(Error::Controller {
                message: "account lacks access to this resource (HTTP 403)".into(),
            });
        }
        s if !s.is_success() => {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Controller {
                message: format!("HTTP {status}: {}", excerpt(&body)),
            });
        }
        _ => {}
    }

    let body = resp.text().await?;
    decode(&body)
}

/// Decode an already-read body. Split out so the rules can be tested
/// without a server.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, Error> {
    if let Ok(ConsoleFailure { error: Some(err) }) = serde_json::from_str(body) {
        let message = err.message.unwrap_or_default();
        return Err(match err.code {
            401 => Error::Authentication { message },
            code => Error::Controller {
                message: format!("UniFi OS error {code}: {message}"),
            },
        });
    }

    let envelope: Envelope<Value> = serde_json::from_str(body).map_err(|e| Error::Decode {
        message: format!("{e}; body starts with {:?}", excerpt(body)),
        body: body.to_owned(),
    })?;

    if envelope.meta.rc == "ok" {
        return Ok(records(envelope.data));
    }
    Err(match envelope.meta.msg.as_deref() {
        Some(LOGIN_REQUIRED) => Error::SessionExpired,
        Some(msg) => Error::Controller {
            message: msg.to_owned(),
        },
        None => Error::Controller {
            message: format!("rc={}", envelope.meta.rc),
        },
    })
}

fn records<T: DeserializeOwned>(data: Vec<Value>) -> Vec<T> {
    data.into_iter()
        .filter_map(|raw| {
            let id = raw.get("_id").and_then(Value::as_str).map(str::to_owned);
            match serde_json::from_value(raw) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(id = id.as_deref().unwrap_or("?"), error = %e, "skipping undecodable record");
                    None
                }
            }
        })
        .collect()
}

fn excerpt(body: &str) -> &str {
    body.char_indices()
        .nth(EXCERPT_CHARS)
        .map_or(body, |(end, _)| &body[..end])
}
