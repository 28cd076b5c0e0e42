//! Command API: routes requests, validates bodies and renders JSON replies.
//!
//! Every reply is JSON. Errors carry a single `error` field. Requests are
//! handled on the control thread between two ticks, so a command and the
//! engines never observe each other half-applied.

use panrig_traits::{HttpMethod, NetRequest, NetResponse};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::ScanCfg;
use crate::error::Result;
use crate::machine::{self, Trigger};
use crate::outputs::Outputs;
use crate::state::{ANGLE_CENTER, ControllerState, CycleBudget, clamp_angle};

pub const STATUS_PATH: &str = "/api/status";
pub const ANGLE_PATH: &str = "/api/angle";
pub const SCAN_PATH: &str = "/api/scan";
pub const STOP_PATH: &str = "/api/stop";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Invalid JSON")]
    InvalidJson,
    #[error("{0}")]
    InvalidField(&'static str),
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Not found")]
    NotFound,
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            Self::InvalidJson | Self::InvalidField(_) => 400,
            Self::NotFound => 404,
            Self::MethodNotAllowed => 405,
            Self::Internal(_) => 500,
        }
    }

    pub fn to_response(&self) -> NetResponse {
        NetResponse::json(self.status(), serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

/// A parsed, not yet applied, command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Status,
    SetAngle { angle: i64 },
    StartScan { speed: Option<i64>, cycles: u32 },
    Stop,
}

#[derive(Debug, Deserialize)]
struct AngleBody {
    #[serde(default)]
    angle: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ScanBody {
    #[serde(default)]
    speed: Option<i64>,
    #[serde(default)]
    cycles: Option<i64>,
}

fn body<'a, T: Deserialize<'a>>(raw: &'a [u8]) -> std::result::Result<T, ApiError> {
    serde_json::from_slice(raw).map_err(|e| {
        debug!(error = %e, "rejecting request body");
        ApiError::InvalidJson
    })
}

/// Route and validate a request without touching any state.
pub fn parse(req: &NetRequest) -> std::result::Result<Command, ApiError> {
    let expected = match req.path.as_str() {
        STATUS_PATH => HttpMethod::Get,
        ANGLE_PATH | SCAN_PATH | STOP_PATH => HttpMethod::Post,
        _ => return Err(ApiError::NotFound),
    };
    if req.method != expected {
        return Err(ApiError::MethodNotAllowed);
    }
    match req.path.as_str() {
        ANGLE_PATH => {
            let b: AngleBody = body(&req.body)?;
            Ok(Command::SetAngle {
                angle: b.angle.unwrap_or(i64::from(ANGLE_CENTER)),
            })
        }
        SCAN_PATH => {
            let b: ScanBody = body(&req.body)?;
            let cycles = match b.cycles {
                None => 0,
                Some(c) if c < 0 => return Err(ApiError::InvalidField("cycles must be >= 0")),
                Some(c) => u32::try_from(c).unwrap_or(u32::MAX),
            };
            Ok(Command::StartScan {
                speed: b.speed,
                cycles,
            })
        }
        STOP_PATH => Ok(Command::Stop),
        _ => Ok(Command::Status),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReply {
    pub status: &'static str,
    pub mode: &'static str,
    pub angle: u8,
    pub scan_speed: u64,
    pub uptime: u64,
    pub rssi: Option<i32>,
    pub commands: u64,
    pub indicator: bool,
}

impl StatusReply {
    pub fn snapshot(state: &ControllerState, now_ms: u64, rssi: Option<i32>) -> Self {
        Self {
            status: "ok",
            mode: state.mode().as_str(),
            angle: state.current_angle(),
            scan_speed: state.scan_period_ms(),
            uptime: state.uptime_ms(now_ms) / 1000,
            rssi,
            commands: state.commands_served(),
            indicator: state.indicator_on(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Status(StatusReply),
    Angle { status: &'static str, angle: u8 },
    Scanning { status: &'static str, speed: u64, cycles: u32 },
    Standby { status: &'static str },
}

/// Apply a parsed command. Hardware failures surface as errors; the state
/// reflects only the writes that succeeded.
pub fn execute(
    cmd: Command,
    state: &mut ControllerState,
    outputs: &mut Outputs,
    scan: &ScanCfg,
    now_ms: u64,
    rssi: Option<i32>,
) -> Result<Reply> {
    match cmd {
        Command::Status => Ok(Reply::Status(StatusReply::snapshot(state, now_ms, rssi))),
        Command::SetAngle { angle } => {
            let clamped = clamp_angle(angle);
            if i64::from(clamped) != angle {
                info!(requested = angle, applied = clamped, "angle clamped");
            }
            outputs.move_to(state, clamped)?;
            state.commands_served += 1;
            Ok(Reply::Angle {
                status: "ok",
                angle: clamped,
            })
        }
        Command::StartScan { speed, cycles } => {
            let requested = speed.unwrap_or_else(|| i64::try_from(scan.default_period_ms).unwrap_or(i64::MAX));
            let period = scan.clamp_period(requested);
            if i64::try_from(period).ok() != Some(requested) {
                info!(requested, applied = period, "scan period clamped");
            }
            machine::apply(state, outputs, Trigger::StartScan, now_ms)?;
            state.scan_period_ms = period;
            state.scan_cycles = (cycles > 0).then(|| CycleBudget::new(cycles));
            state.commands_served += 1;
            Ok(Reply::Scanning {
                status: "scanning",
                speed: period,
                cycles,
            })
        }
        Command::Stop => {
            machine::apply(state, outputs, Trigger::Stop, now_ms)?;
            state.commands_served += 1;
            Ok(Reply::Standby { status: "standby" })
        }
    }
}

/// Parse, apply and render one request.
pub fn handle(
    req: &NetRequest,
    state: &mut ControllerState,
    outputs: &mut Outputs,
    scan: &ScanCfg,
    now_ms: u64,
    rssi: Option<i32>,
) -> NetResponse {
    let cmd = match parse(req) {
        Ok(cmd) => cmd,
        Err(e) => {
            warn!(path = %req.path, method = ?req.method, status = e.status(), error = %e, "request rejected");
            return e.to_response();
        }
    };
    debug!(?cmd, "command accepted");
    let reply = match execute(cmd, state, outputs, scan, now_ms, rssi) {
        Ok(reply) => reply,
        Err(report) => {
            error!(path = %req.path, error = %format!("{report:#}"), "command failed");
            return ApiError::Internal(format!("{report:#}")).to_response();
        }
    };
    match serde_json::to_string(&reply) {
        Ok(body) => NetResponse::json(200, body),
        Err(e) => ApiError::Internal(e.to_string()).to_response(),
    }
}
