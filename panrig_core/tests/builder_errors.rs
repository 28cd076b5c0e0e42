use panrig_core::{BuildError, Controller, ScanCfg};
use panrig_hardware::{SimulatedAxis, SimulatedButton, SimulatedLamp, SimulatedServo};
use rstest::rstest;

fn inputs() -> (SimulatedButton, SimulatedAxis, SimulatedAxis) {
    (
        SimulatedButton::new(),
        SimulatedAxis::new(1850),
        SimulatedAxis::new(2048),
    )
}

#[test]
fn try_build_reports_missing_actuator() {
    let (b, s, p) = inputs();
    let err = Controller::builder()
        .with_indicator(SimulatedLamp::new())
        .with_inputs(b, s, p)
        .try_build()
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingActuator)
    ));
}

#[test]
fn try_build_reports_missing_inputs() {
    let err = Controller::builder()
        .with_actuator(SimulatedServo::new())
        .with_indicator(SimulatedLamp::new())
        .try_build()
        .unwrap_err();
    assert_eq!(err.to_string(), "missing joystick inputs");
}

#[rstest]
#[case(ScanCfg { min_period_ms: 0, ..ScanCfg::default() })]
#[case(ScanCfg { min_period_ms: 600, ..ScanCfg::default() })]
#[case(ScanCfg { default_period_ms: 900, ..ScanCfg::default() })]
#[case(ScanCfg { period_step_ms: 0, ..ScanCfg::default() })]
#[case(ScanCfg { blink_ms: 0, ..ScanCfg::default() })]
fn invalid_scan_cfg_is_rejected(#[case] scan: ScanCfg) {
    let (b, s, p) = inputs();
    let err = Controller::builder()
        .with_actuator(SimulatedServo::new())
        .with_indicator(SimulatedLamp::new())
        .with_inputs(b, s, p)
        .with_scan(scan)
        .build()
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::InvalidConfig(_))
    ));
}

#[test]
fn loaded_config_builds() {
    let cfg = panrig_config::load_toml("[scan]\ndefault_period_ms = 250\n").unwrap();
    cfg.validate().unwrap();
    let (b, s, p) = inputs();
    let ctrl = Controller::builder()
        .with_config(&cfg)
        .with_actuator(SimulatedServo::new())
        .with_indicator(SimulatedLamp::new())
        .with_inputs(b, s, p)
        .build()
        .unwrap();
    assert_eq!(ctrl.state().scan_period_ms(), 250);
}
