//! HTTP/JSON session registry adapter.
//!
//! Implements [`SessionRegistry`] against the Drinkmon registry API:
//!
//! | Operation | Request                                  | Success body            |
//! |-----------|------------------------------------------|-------------------------|
//! | start     | `POST {base}/start_session` `{"color":…}`| `{"guid":"…"}`          |
//! | end       | `POST {base}/close_session` `{"guid":…}` | ignored                 |
//! | list      | `GET {base}/friend_sessions`             | `[{"color":{r,g,b}},…]` |
//!
//! Anything but HTTP 200 is a failure.  One attempt per call; the request
//! timeout lives in the [`HttpTransport`].
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: [`EspHttpTransport`] over `esp_idf_svc::http::client`.
//! - **all targets**: the JSON binding, tested on the host with a mock transport.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::app::ports::SessionRegistry;
use crate::app::state::{Rgb, SessionId};
use crate::error::RemoteError;

/// Largest response body accepted.
pub const MAX_BODY_BYTES: usize = 8 * 1024;

// ───────────────────────────────────────────────────────────────
// Transport
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Minimal blocking HTTP client.  Implementations must enforce a request
/// timeout and map it to [`RemoteError::Timeout`].
pub trait HttpTransport {
    fn get(&mut self, url: &str) -> Result<HttpResponse, RemoteError>;
    fn post_json(&mut self, url: &str, body: &[u8]) -> Result<HttpResponse, RemoteError>;
}

// ───────────────────────────────────────────────────────────────
// Wire types
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Default, Serialize, Deserialize)]
struct ColorDto {
    #[serde(default)]
    r: u8,
    #[serde(default)]
    g: u8,
    #[serde(default)]
    b: u8,
}

impl From<Rgb> for ColorDto {
    fn from((r, g, b): Rgb) -> Self {
        Self { r, g, b }
    }
}

impl From<ColorDto> for Rgb {
    fn from(c: ColorDto) -> Self {
        (c.r, c.g, c.b)
    }
}

#[derive(Serialize)]
struct StartRequest {
    color: ColorDto,
}

#[derive(Deserialize)]
struct StartResponse {
    #[serde(default)]
    guid: Option<String>,
}

#[derive(Serialize)]
struct CloseRequest<'a> {
    guid: &'a str,
}

#[derive(Deserialize)]
struct ActiveSession {
    #[serde(default)]
    color: ColorDto,
}

// ───────────────────────────────────────────────────────────────
// Registry
// ───────────────────────────────────────────────────────────────

pub struct HttpSessionRegistry<T: HttpTransport> {
    transport: T,
    base_url: String,
}

impl<T: HttpTransport> HttpSessionRegistry<T> {
    pub fn new(transport: T, base_url: &str) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn post(&mut self, path: &str, body: &impl Serialize) -> Result<HttpResponse, RemoteError> {
        let url = self.url(path);
        let payload = serde_json::to_vec(body).map_err(|_| RemoteError::Malformed)?;
        let resp = self.transport.post_json(&url, &payload)?;
        debug!("POST {} -> {}", url, resp.status);
        expect_ok(resp)
    }
}

fn expect_ok(resp: HttpResponse) -> Result<HttpResponse, RemoteError> {
    if resp.status == 200 {
        Ok(resp)
    } else {
        Err(RemoteError::Status(resp.status))
    }
}

impl<T: HttpTransport> SessionRegistry for HttpSessionRegistry<T> {
    fn start(&mut self, color: Rgb) -> Result<SessionId, RemoteError> {
        let resp = self.post(
            "start_session",
            &StartRequest {
                color: color.into(),
            },
        )?;
        let parsed: StartResponse =
            serde_json::from_slice(&resp.body).map_err(|_| RemoteError::Malformed)?;
        parsed
            .guid
            .as_deref()
            .and_then(SessionId::new)
            .ok_or(RemoteError::Malformed)
    }

    fn end(&mut self, id: &SessionId) -> Result<(), RemoteError> {
        self.post("close_session", &CloseRequest { guid: id.as_str() })?;
        Ok(())
    }

    fn list_active_peers(&mut self) -> Result<Vec<Rgb>, RemoteError> {
        let url = self.url("friend_sessions");
        let resp = expect_ok(self.transport.get(&url)?)?;
        let sessions: Vec<ActiveSession> =
            serde_json::from_slice(&resp.body).map_err(|_| RemoteError::Malformed)?;
        Ok(sessions.into_iter().map(|s| s.color.into()).collect())
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF transport
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use esp_impl::EspHttpTransport;

#[cfg(target_os = "espidf")]
mod esp_impl {
    use core::time::Duration;

    use esp_idf_svc::http::Method;
    use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
    use esp_idf_svc::sys::{ESP_ERR_HTTP_EAGAIN, ESP_ERR_TIMEOUT, EspError};

    use super::{HttpResponse, HttpTransport, MAX_BODY_BYTES};
    use crate::error::RemoteError;

    /// One fresh connection per request, TLS via the built-in CA bundle.
    pub struct EspHttpTransport {
        timeout: Duration,
    }

    impl EspHttpTransport {
        pub fn new(timeout: Duration) -> Self {
            Self { timeout }
        }

        fn exchange(
            &mut self,
            method: Method,
            url: &str,
            body: Option<&[u8]>,
        ) -> Result<HttpResponse, RemoteError> {
            let mut conn = EspHttpConnection::new(&Configuration {
                timeout: Some(self.timeout),
                crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
                ..Default::default()
            })
            .map_err(map_esp_err)?;

            match body {
                Some(payload) => {
                    let len = payload.len().to_string();
                    let headers = [
                        ("content-type", "application/json"),
                        ("content-length", len.as_str()),
                    ];
                    conn.initiate_request(method, url, &headers)
                        .map_err(map_esp_err)?;
                    let mut sent = 0;
                    while sent < payload.len() {
                        match conn.write(&payload[sent..]).map_err(map_esp_err)? {
                            0 => return Err(RemoteError::Transport),
                            n => sent += n,
                        }
                    }
                }
                None => conn.initiate_request(method, url, &[]).map_err(map_esp_err)?,
            }

            conn.initiate_response().map_err(map_esp_err)?;
            let status = conn.status();

            let mut body = Vec::new();
            let mut buf = [0u8; 256];
            loop {
                let n = conn.read(&mut buf).map_err(map_esp_err)?;
                if n == 0 {
                    break;
                }
                if body.len() + n > MAX_BODY_BYTES {
                    return Err(RemoteError::Malformed);
                }
                body.extend_from_slice(&buf[..n]);
            }

            Ok(HttpResponse { status, body })
        }
    }

    fn map_esp_err(e: EspError) -> RemoteError {
        let code = e.code();
        if code == ESP_ERR_TIMEOUT as i32 || code == ESP_ERR_HTTP_EAGAIN as i32 {
            RemoteError::Timeout
        } else {
            RemoteError::Transport
        }
    }

    impl HttpTransport for EspHttpTransport {
        fn get(&mut self, url: &str) -> Result<HttpResponse, RemoteError> {
            self.exchange(Method::Get, url, None)
        }

        fn post_json(&mut self, url: &str, body: &[u8]) -> Result<HttpResponse, RemoteError> {
            self.exchange(Method::Post, url, Some(body))
        }
    }
}
