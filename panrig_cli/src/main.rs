#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod cli;
mod error_fmt;
mod net;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::{Result, WrapErr};
use panrig_config::Config;
use panrig_core::Controller;
use panrig_core::mocks::LoopbackNetwork;
use panrig_traits::NetRequest;
use tracing::{error, info, warn};

use crate::cli::{Cli, Commands, DEFAULT_CONFIG, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{CliError, exit_code_for_error, format_error_json, humanize};
use crate::net::HttpNetwork;

/// Ticks run by `self-check`.
const SELF_CHECK_TICKS: u64 = 5;

fn main() {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(err) = real_main(cli) {
        tracing::debug!(error = ?err, "command failed");
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}

fn real_main(cli: Cli) -> Result<()> {
    let cfg = load_config(cli.config.as_deref())?;
    init_tracing(cli.json, cli.log_level.as_deref(), &cfg.logging)?;

    match cli.cmd {
        Commands::Run {
            bind,
            no_self_test,
            max_ticks,
        } => run(&cfg, bind, no_self_test, max_ticks),
        Commands::SelfCheck => self_check(&cfg, cli.json),
        Commands::Health => health(&cfg),
    }
}

/// Explicit paths must load; the default path is optional.
fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let (path, required) = match explicit {
        Some(p) => (p, true),
        None => (Path::new(DEFAULT_CONFIG), false),
    };
    if !required && !path.exists() {
        return Ok(Config::default());
    }
    panrig_config::load_file(path).map_err(|e| eyre::Report::new(CliError::Config(format!("{e:#}"))))
}

fn init_tracing(json: bool, cli_level: Option<&str>, logging: &panrig_config::Logging) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let level = cli_level.or(logging.level.as_deref()).unwrap_or("info");
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(level).wrap_err_with(|| format!("invalid log level {level:?}"))?,
    };

    let (json_layer, pretty_layer) = if json {
        (Some(fmt::layer().json().with_writer(std::io::stderr)), None)
    } else {
        (None, Some(fmt::layer().with_target(false).with_writer(std::io::stderr)))
    };

    let file_layer = match logging.file.as_deref() {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file must name a file: {file}"))?;
            let appender = match logging.rotation.as_deref().unwrap_or("never") {
                "daily" => tracing_appender::rolling::daily(dir, name),
                "hourly" => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(fmt::layer().json().with_ansi(false).with_writer(writer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(pretty_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| eyre::eyre!("install logger: {e}"))
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn build_controller(cfg: &Config) -> Result<Controller> {
    use panrig_hardware::rpi::RpiDevices;

    let dev = RpiDevices::open(
        cfg.pins.servo_pwm_channel,
        cfg.pins.lamp,
        cfg.pins.button,
        cfg.pins.spi_bus,
        cfg.joystick.speed_channel,
        cfg.joystick.pan_channel,
    )
    .wrap_err("open devices")?;
    Controller::builder()
        .with_config(cfg)
        .with_actuator(dev.servo)
        .with_indicator(dev.lamp)
        .with_inputs(dev.button, dev.speed_axis, dev.pan_axis)
        .build()
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
fn build_controller(cfg: &Config) -> Result<Controller> {
    use panrig_hardware::{SimulatedAxis, SimulatedButton, SimulatedLamp, SimulatedServo};

    info!("using simulated devices");
    Controller::builder()
        .with_config(cfg)
        .with_actuator(SimulatedServo::new())
        .with_indicator(SimulatedLamp::new())
        .with_inputs(
            SimulatedButton::new(),
            SimulatedAxis::new(cfg.joystick.rest),
            SimulatedAxis::new(cfg.joystick.center),
        )
        .build()
}

fn run(cfg: &Config, bind: Option<String>, no_self_test: bool, max_ticks: Option<u64>) -> Result<()> {
    let mut ctrl = build_controller(cfg)?;
    ctrl.begin()?;

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&shutdown);
        ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
            .wrap_err("install Ctrl-C handler")?;
    }

    let addr = bind.unwrap_or_else(|| cfg.server.bind.clone());
    let mut network = match HttpNetwork::bind(&addr) {
        Ok(n) => n,
        Err(e) => {
            error!(%addr, error = %e, "command server failed to start");
            ctrl.halt(&shutdown, max_ticks)?;
            return Err(eyre::Report::new(e));
        }
    };
    match network.local_addr() {
        Some(local) => info!(addr = %local, "command server listening"),
        None => warn!(%addr, "command server listening on a non-IP address"),
    }

    if !no_self_test {
        ctrl.self_test()?;
    }
    let ticks = ctrl.run(&mut network, &shutdown, max_ticks)?;
    info!(ticks, "shutting down");
    Ok(())
}

fn status_line(ctrl: &mut Controller) -> Result<String> {
    let resp = ctrl.handle_request(&NetRequest::get(panrig_core::api::STATUS_PATH), None);
    if resp.status != 200 {
        eyre::bail!("status request failed ({}): {}", resp.status, resp.body);
    }
    Ok(resp.body)
}

fn self_check(cfg: &Config, json: bool) -> Result<()> {
    let mut ctrl = build_controller(cfg)?;
    ctrl.begin()?;
    let mut net = LoopbackNetwork::new();
    net.push(NetRequest::get(panrig_core::api::STATUS_PATH));
    for _ in 0..SELF_CHECK_TICKS {
        ctrl.tick(Some(&mut net))?;
    }
    match net.last_response() {
        Some(resp) if resp.status == 200 => {}
        Some(resp) => eyre::bail!("status request failed ({}): {}", resp.status, resp.body),
        None => eyre::bail!("status request was never served"),
    }
    if json {
        println!("{}", serde_json::json!({ "status": "ok", "ticks": ctrl.ticks() }));
    } else {
        println!("ok");
    }
    Ok(())
}

fn health(cfg: &Config) -> Result<()> {
    let mut ctrl = build_controller(cfg)?;
    ctrl.begin()?;
    println!("{}", status_line(&mut ctrl)?);
    Ok(())
}
