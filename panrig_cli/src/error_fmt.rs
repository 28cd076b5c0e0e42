//! Human-readable error descriptions, exit codes and structured JSON errors.

use panrig_core::error::{BuildError, ControllerError};
use thiserror::Error;

/// Failures owned by the CLI layer itself.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("cannot bind command server to {addr}: {reason}")]
    Bind { addr: String, reason: String },
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(ce) = err.downcast_ref::<CliError>() {
        return match ce {
            CliError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing file, TOML syntax error or out-of-range values.\nHow to fix: Edit the config file (see etc/panrig.toml), then rerun."
            ),
            CliError::Bind { addr, reason } => format!(
                "What happened: The command server could not listen on {addr} ({reason}).\nLikely causes: Address already in use, malformed address, or no permission for a low port.\nHow to fix: Pick another --bind address or stop the process holding the port. Press Ctrl-C to leave the halt blink."
            ),
        };
    }

    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingActuator => {
                "What happened: No servo was provided to the controller.\nLikely causes: The PWM channel failed to initialize.\nHow to fix: Check [pins].servo_pwm_channel and that hardware PWM is enabled in the boot config.".to_string()
            }
            BuildError::MissingIndicator => {
                "What happened: No status lamp was provided to the controller.\nLikely causes: The lamp GPIO failed to initialize.\nHow to fix: Check [pins].lamp and GPIO permissions.".to_string()
            }
            BuildError::MissingInputs => {
                "What happened: Joystick inputs were not provided to the controller.\nLikely causes: The button GPIO or the SPI converter failed to initialize.\nHow to fix: Check [pins].button, [pins].spi_bus and that SPI is enabled.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(ce) = err.downcast_ref::<ControllerError>() {
        return match ce {
            ControllerError::Hardware(_) | ControllerError::HardwareFault(_) => format!(
                "What happened: A device stopped responding ({ce}).\nLikely causes: Loose servo or lamp wiring, missing power, or the GPIO/PWM/SPI device is busy.\nHow to fix: Check wiring and power, then rerun with --log-level=debug."
            ),
            ControllerError::Config(_) => format!(
                "What happened: {ce}.\nLikely causes: A joystick channel outside 0..=7.\nHow to fix: Fix [joystick] channels in the config."
            ),
        };
    }

    // String-based heuristics for errors coming from device setup
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("permission denied") {
        return "What happened: Access to a device was denied.\nLikely causes: The user is not in the gpio/spi groups.\nHow to fix: Add the user to the gpio and spi groups or run with the needed privileges.".to_string();
    }

    if lower.contains("open devices") {
        return format!(
            "What happened: Failed to initialize hardware ({msg}).\nLikely causes: Incorrect pin numbers, PWM or SPI not enabled.\nHow to fix: Fix the [pins] values in the config and enable the PWM and SPI overlays."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Cause: {msg}"
    )
}

/// Stable exit codes: 2 configuration, 3 network, 4 hardware, 1 anything else.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(ce) = err.downcast_ref::<CliError>() {
        return match ce {
            CliError::Config(_) => 2,
            CliError::Bind { .. } => 3,
        };
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return 2;
    }
    if let Some(ce) = err.downcast_ref::<ControllerError>() {
        return match ce {
            ControllerError::Config(_) => 2,
            ControllerError::Hardware(_) | ControllerError::HardwareFault(_) => 4,
        };
    }
    1
}

fn reason_name(err: &eyre::Report) -> &'static str {
    match exit_code_for_error(err) {
        2 => "Config",
        3 => "Network",
        4 => "Hardware",
        _ => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(eyre::Report::new(CliError::Config("x".into())), 2)]
    #[case(eyre::Report::new(CliError::Bind { addr: "a".into(), reason: "b".into() }), 3)]
    #[case(eyre::Report::new(BuildError::MissingInputs), 2)]
    #[case(eyre::Report::new(ControllerError::HardwareFault("pwm".into())), 4)]
    #[case(eyre::eyre!("boom"), 1)]
    fn exit_codes(#[case] err: eyre::Report, #[case] code: i32) {
        assert_eq!(exit_code_for_error(&err), code);
    }

    #[test]
    fn wrapped_hardware_errors_keep_their_code() {
        let err = eyre::Report::new(ControllerError::Hardware("stuck".into()))
            .wrap_err("actuator write 90");
        assert_eq!(exit_code_for_error(&err), 4);
        assert!(humanize(&err).contains("A device stopped responding"));
    }

    #[test]
    fn json_errors_carry_reason_and_message() {
        let err = eyre::Report::new(CliError::Config("scan.blink_ms must be >= 1".into()));
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "Config");
        assert_eq!(v["exit_code"], 2);
        assert!(v["message"].as_str().unwrap().contains("blink_ms"));
    }
}
