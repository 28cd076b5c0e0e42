#![no_main]
use libfuzzer_sys::fuzz_target;
use panrig_core::Controller;
use panrig_hardware::{SimulatedAxis, SimulatedButton, SimulatedLamp, SimulatedServo};
use panrig_traits::NetRequest;

fuzz_target!(|data: &[u8]| {
    let Ok(mut ctrl) = Controller::builder()
        .with_actuator(SimulatedServo::new())
        .with_indicator(SimulatedLamp::new())
        .with_inputs(
            SimulatedButton::new(),
            SimulatedAxis::new(1850),
            SimulatedAxis::new(2048),
        )
        .build()
    else {
        return;
    };
    if ctrl.begin().is_err() {
        return;
    }
    for path in ["/api/angle", "/api/scan", "/api/stop"] {
        let resp = ctrl.handle_request(&NetRequest::post(path, data.to_vec()), None);
        assert!(matches!(resp.status, 200 | 400));
        assert!(ctrl.state().current_angle() <= 180);
    }
});
