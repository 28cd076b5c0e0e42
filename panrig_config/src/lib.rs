#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the pan platform controller.
//!
//! - `Config` and its sections are deserialized from TOML; every section is
//!   optional and falls back to the defaults of the reference rig.
//! - `validate()` rejects values that would break the controller's invariants
//!   (period bounds, deadzones) or its non-blocking timing budget.
use serde::Deserialize;
use std::path::Path;

/// Longest pause a single tick may spend in a deliberate sleep.
pub const MAX_BLOCKING_MS: u64 = 50;
/// Longest gap allowed between the two button samples.
pub const MAX_SETTLE_MS: u64 = 20;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Pins {
    /// Hardware PWM channel driving the servo (0 or 1).
    pub servo_pwm_channel: u8,
    /// BCM pin of the status lamp.
    pub lamp: u8,
    /// BCM pin of the joystick push button (pulled up, pressed = low).
    pub button: u8,
    /// SPI bus of the MCP3208 joystick converter.
    pub spi_bus: u8,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            servo_pwm_channel: 0,
            lamp: 17,
            button: 27,
            spi_bus: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Joystick {
    /// ADC channel of the X axis (scan speed feedback).
    pub speed_channel: u8,
    /// ADC channel of the Y axis (manual pan).
    pub pan_channel: u8,
    /// Full-scale ADC count.
    pub full_scale: u16,
    /// Below this reading the scan speeds up.
    pub speed_low: u16,
    /// Above this reading the scan slows down.
    pub speed_high: u16,
    /// Resting center of the pan axis.
    pub center: u16,
    /// Offset from center treated as "no intent".
    pub pan_deadzone: u16,
    /// Resting reading used by the simulated joystick.
    pub rest: u16,
}

impl Default for Joystick {
    fn default() -> Self {
        Self {
            speed_channel: 0,
            pan_channel: 1,
            full_scale: 4095,
            speed_low: 1800,
            speed_high: 1900,
            center: 2048,
            pan_deadzone: 300,
            rest: 1850,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Button {
    /// Minimum spacing between accepted clicks (ms).
    pub debounce_ms: u64,
    /// Gap between the two samples of one read (ms).
    pub settle_ms: u64,
}

impl Default for Button {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            settle_ms: 5,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Scan {
    pub default_period_ms: u64,
    pub min_period_ms: u64,
    pub max_period_ms: u64,
    /// Period change per tick while the speed axis is deflected.
    pub period_step_ms: u64,
    /// Lamp toggle interval while scanning.
    pub blink_ms: u64,
}

impl Default for Scan {
    fn default() -> Self {
        Self {
            default_period_ms: 300,
            min_period_ms: 100,
            max_period_ms: 500,
            period_step_ms: 50,
            blink_ms: 500,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Manual {
    /// Settle pause after each one-degree step.
    pub step_delay_ms: u64,
}

impl Default for Manual {
    fn default() -> Self {
        Self { step_delay_ms: 15 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Scheduler {
    /// Yield at the end of every tick.
    pub tick_ms: u64,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self { tick_ms: 10 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    /// Listen address of the command API.
    pub bind: String,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub pins: Pins,
    pub joystick: Joystick,
    pub button: Button,
    pub scan: Scan,
    pub manual: Manual,
    pub scheduler: Scheduler,
    pub server: Server,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))?;
    cfg.validate()?;
    Ok(cfg)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Pins
        if self.pins.servo_pwm_channel > 1 {
            eyre::bail!("pins.servo_pwm_channel must be 0 or 1");
        }

        // Joystick
        let js = &self.joystick;
        if js.speed_channel > 7 || js.pan_channel > 7 {
            eyre::bail!("joystick channels must be in 0..=7");
        }
        if js.speed_channel == js.pan_channel {
            eyre::bail!("joystick.speed_channel and joystick.pan_channel must differ");
        }
        if js.full_scale == 0 {
            eyre::bail!("joystick.full_scale must be > 0");
        }
        if js.speed_low > js.speed_high {
            eyre::bail!("joystick.speed_low must be <= joystick.speed_high");
        }
        if js.speed_high > js.full_scale || js.center > js.full_scale || js.rest > js.full_scale {
            eyre::bail!("joystick readings must not exceed joystick.full_scale");
        }
        if js.pan_deadzone == 0 || js.pan_deadzone >= js.center {
            eyre::bail!("joystick.pan_deadzone must be in 1..center");
        }

        // Button
        if self.button.debounce_ms == 0 {
            eyre::bail!("button.debounce_ms must be >= 1");
        }
        if self.button.settle_ms > MAX_SETTLE_MS {
            eyre::bail!("button.settle_ms must be <= {MAX_SETTLE_MS}");
        }

        // Scan
        let scan = &self.scan;
        if scan.min_period_ms == 0 {
            eyre::bail!("scan.min_period_ms must be >= 1");
        }
        if scan.min_period_ms > scan.max_period_ms {
            eyre::bail!("scan.min_period_ms must be <= scan.max_period_ms");
        }
        if !(scan.min_period_ms..=scan.max_period_ms).contains(&scan.default_period_ms) {
            eyre::bail!("scan.default_period_ms must lie within [min_period_ms, max_period_ms]");
        }
        if scan.period_step_ms == 0 {
            eyre::bail!("scan.period_step_ms must be >= 1");
        }
        if scan.blink_ms == 0 {
            eyre::bail!("scan.blink_ms must be >= 1");
        }

        // Timing budget
        if self.manual.step_delay_ms > MAX_BLOCKING_MS {
            eyre::bail!("manual.step_delay_ms must be <= {MAX_BLOCKING_MS}");
        }
        if self.scheduler.tick_ms > MAX_BLOCKING_MS {
            eyre::bail!("scheduler.tick_ms must be <= {MAX_BLOCKING_MS}");
        }

        // Server
        if self.server.bind.trim().is_empty() {
            eyre::bail!("server.bind must not be empty");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}
