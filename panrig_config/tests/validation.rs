use panrig_config::{Config, load_file, load_toml};
use rstest::rstest;
use std::fs;
use tempfile::tempdir;

#[test]
fn empty_document_yields_reference_defaults() {
    let cfg = load_toml("").expect("parse TOML");
    cfg.validate().expect("defaults are valid");
    assert_eq!(cfg.scan.default_period_ms, 300);
    assert_eq!(cfg.scan.min_period_ms, 100);
    assert_eq!(cfg.scan.max_period_ms, 500);
    assert_eq!(cfg.joystick.speed_low, 1800);
    assert_eq!(cfg.joystick.speed_high, 1900);
    assert_eq!(cfg.button.debounce_ms, 300);
    assert_eq!(cfg.manual.step_delay_ms, 15);
    assert_eq!(cfg.scheduler.tick_ms, 10);
}

#[test]
fn partial_sections_keep_other_defaults() {
    let toml = r#"
[scan]
default_period_ms = 200

[server]
bind = "127.0.0.1:9000"
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.scan.default_period_ms, 200);
    assert_eq!(cfg.scan.blink_ms, 500);
    assert_eq!(cfg.server.bind, "127.0.0.1:9000");
}

#[rstest]
#[case("[scan]\nmin_period_ms = 0", "scan.min_period_ms must be >= 1")]
#[case("[scan]\nmin_period_ms = 600", "scan.min_period_ms must be <= scan.max_period_ms")]
#[case("[scan]\ndefault_period_ms = 50", "default_period_ms must lie within")]
#[case("[scan]\nperiod_step_ms = 0", "period_step_ms must be >= 1")]
#[case("[joystick]\nspeed_low = 2000", "speed_low must be <= joystick.speed_high")]
#[case("[joystick]\npan_deadzone = 3000", "pan_deadzone must be in 1..center")]
#[case("[joystick]\npan_channel = 0", "must differ")]
#[case("[button]\nsettle_ms = 100", "button.settle_ms must be <=")]
#[case("[button]\ndebounce_ms = 0", "button.debounce_ms must be >= 1")]
#[case("[manual]\nstep_delay_ms = 500", "manual.step_delay_ms must be <=")]
#[case("[scheduler]\ntick_ms = 1000", "scheduler.tick_ms must be <=")]
#[case("[server]\nbind = \"  \"", "server.bind must not be empty")]
#[case("[logging]\nrotation = \"weekly\"", "never|daily|hourly")]
#[case("[pins]\nservo_pwm_channel = 3", "servo_pwm_channel must be 0 or 1")]
fn rejects_invalid_values(#[case] toml: &str, #[case] needle: &str) {
    let cfg: Config = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should be rejected");
    let msg = format!("{err}");
    assert!(msg.contains(needle), "'{msg}' should contain '{needle}'");
}

#[test]
fn rejects_wrong_types_at_parse_time() {
    let err = load_toml("[scan]\nblink_ms = \"fast\"").expect_err("type mismatch");
    assert!(format!("{err}").contains("blink_ms"));
}

#[test]
fn load_file_parses_and_validates() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("good.toml");
    fs::write(&good, "[scheduler]\ntick_ms = 5\n").unwrap();
    let cfg = load_file(&good).expect("load good config");
    assert_eq!(cfg.scheduler.tick_ms, 5);

    let bad = dir.path().join("bad.toml");
    fs::write(&bad, "[scan]\nmin_period_ms = 0\n").unwrap();
    let err = load_file(&bad).expect_err("invalid config");
    assert!(format!("{err}").contains("min_period_ms"));

    let missing = dir.path().join("missing.toml");
    let err = load_file(&missing).expect_err("missing file");
    assert!(format!("{err}").contains("read config"));
}
