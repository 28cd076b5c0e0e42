//! Network seam: a request source the control loop drains one request at a time.

/// HTTP method of an incoming request, reduced to what the command API routes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Other,
}

/// A request as seen by the command API: method, path (query stripped), raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetRequest {
    pub method: HttpMethod,
    pub path: String,
    pub body: Vec<u8>,
}

impl NetRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        let path: String = path.into();
        let path = match path.split_once('?') {
            Some((p, _query)) => p.to_string(),
            None => path,
        };
        Self {
            method,
            path,
            body: body.into(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path, Vec::new())
    }

    pub fn post(path: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self::new(HttpMethod::Post, path, body)
    }
}

/// A fully rendered response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl NetResponse {
    pub fn json(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: "application/json",
            body,
        }
    }
}

/// Source of HTTP requests serviced from inside the control loop.
pub trait Network {
    /// Take at most one pending request without blocking and answer it with `handler`.
    ///
    /// Returns `Ok(true)` when a request was serviced, `Ok(false)` when none was pending.
    fn service_one(
        &mut self,
        handler: &mut dyn FnMut(&NetRequest) -> NetResponse,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    /// Link signal strength in dBm, when the link layer reports one.
    fn signal_strength(&self) -> Option<i32> {
        None
    }
}

impl<T: Network + ?Sized> Network for Box<T> {
    fn service_one(
        &mut self,
        handler: &mut dyn FnMut(&NetRequest) -> NetResponse,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        (**self).service_one(handler)
    }

    fn signal_strength(&self) -> Option<i32> {
        (**self).signal_strength()
    }
}
