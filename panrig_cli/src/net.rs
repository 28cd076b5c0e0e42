//! HTTP command server over `tiny_http`, drained one request per tick.

use std::io::Read;

use panrig_traits::{HttpMethod, NetRequest, NetResponse, Network};
use serde_json::json;
use tiny_http::{Header, Method, Response, Server, StatusCode};
use tracing::debug;

use crate::error_fmt::CliError;

/// Largest request body accepted.
pub const MAX_BODY: usize = 4096;

pub struct HttpNetwork {
    server: Server,
}

impl HttpNetwork {
    /// Listen on `addr`. The listener accepts on its own thread; requests are
    /// only handled from `service_one`.
    pub fn bind(addr: &str) -> Result<Self, CliError> {
        let server = Server::http(addr).map_err(|e| CliError::Bind {
            addr: addr.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { server })
    }

    pub fn local_addr(&self) -> Option<std::net::SocketAddr> {
        self.server.server_addr().to_ip()
    }
}

fn error_response(status: u16, msg: &str) -> NetResponse {
    NetResponse::json(status, json!({ "error": msg }).to_string())
}

impl Network for HttpNetwork {
    fn service_one(
        &mut self,
        handler: &mut dyn FnMut(&NetRequest) -> NetResponse,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let Some(mut request) = self.server.try_recv()? else {
            return Ok(false);
        };
        let method = match request.method() {
            Method::Get => HttpMethod::Get,
            Method::Post => HttpMethod::Post,
            _ => HttpMethod::Other,
        };
        let mut body = Vec::new();
        let read = request
            .as_reader()
            .take(MAX_BODY as u64 + 1)
            .read_to_end(&mut body);
        let resp = match read {
            Err(e) => error_response(400, &format!("read body: {e}")),
            Ok(_) if body.len() > MAX_BODY => error_response(413, "Body too large"),
            Ok(_) => handler(&NetRequest::new(method, request.url(), body)),
        };
        debug!(url = request.url(), status = resp.status, "http request served");

        let header = Header::from_bytes("Content-Type", resp.content_type)
            .map_err(|()| "invalid content-type header")?;
        request.respond(
            Response::from_string(resp.body)
                .with_status_code(StatusCode(resp.status))
                .with_header(header),
        )?;
        Ok(true)
    }
}
