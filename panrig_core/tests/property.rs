use panrig_core::{Controller, Mode};
use panrig_hardware::{SimulatedAxis, SimulatedButton, SimulatedLamp, SimulatedServo};
use panrig_traits::NetRequest;
use panrig_traits::clock::test_clock::TestClock;
use proptest::prelude::*;

fn controller() -> Controller {
    let mut ctrl = Controller::builder()
        .with_actuator(SimulatedServo::new())
        .with_indicator(SimulatedLamp::new())
        .with_inputs(
            SimulatedButton::new(),
            SimulatedAxis::new(1850),
            SimulatedAxis::new(2048),
        )
        .with_clock(Box::new(TestClock::new()))
        .build()
        .unwrap();
    ctrl.begin().unwrap();
    ctrl
}

proptest! {
    #[test]
    fn set_angle_stores_clamped_value(angle in any::<i64>()) {
        let mut ctrl = controller();
        let resp = ctrl.handle_request(
            &NetRequest::post("/api/angle", format!(r#"{{"angle":{angle}}}"#)),
            None,
        );
        let want = angle.clamp(0, 180);
        prop_assert_eq!(resp.status, 200);
        prop_assert_eq!(i64::from(ctrl.state().current_angle()), want);
    }

    #[test]
    fn start_scan_stores_clamped_period(speed in any::<i64>()) {
        let mut ctrl = controller();
        let resp = ctrl.handle_request(
            &NetRequest::post("/api/scan", format!(r#"{{"speed":{speed}}}"#)),
            None,
        );
        prop_assert_eq!(resp.status, 200);
        prop_assert_eq!(ctrl.state().mode(), Mode::AutoScan);
        let period = i64::try_from(ctrl.state().scan_period_ms()).unwrap();
        prop_assert_eq!(period, speed.clamp(100, 500));
    }

    #[test]
    fn arbitrary_bodies_never_panic(body in proptest::collection::vec(any::<u8>(), 0..64)) {
        let mut ctrl = controller();
        for path in ["/api/angle", "/api/scan", "/api/stop"] {
            let resp = ctrl.handle_request(&NetRequest::post(path, body.clone()), None);
            prop_assert!(matches!(resp.status, 200 | 400));
            prop_assert!(ctrl.state().current_angle() <= 180);
        }
    }
}
