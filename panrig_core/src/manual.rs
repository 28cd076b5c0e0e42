//! Joystick-driven pan: one degree per tick toward the deflected side.

use std::time::Duration;

use panrig_traits::Clock;

use crate::conditioner::PanIntent;
use crate::config::ManualCfg;
use crate::error::Result;
use crate::outputs::Outputs;
use crate::state::{ANGLE_MAX, ANGLE_MIN, ControllerState};

/// Advance the manual pan by one step. Returns the new angle when it moved.
///
/// The lamp is held on for the whole mode. After each move the loop pauses
/// `step_delay_ms` so the servo can follow.
pub fn step(
    state: &mut ControllerState,
    outputs: &mut Outputs,
    intent: PanIntent,
    cfg: &ManualCfg,
    clock: &dyn Clock,
) -> Result<Option<u8>> {
    if !state.indicator_on {
        outputs.lamp(state, true)?;
    }
    let angle = state.current_angle;
    let next = match intent {
        PanIntent::TowardMin if angle > ANGLE_MIN => angle - 1,
        PanIntent::TowardMax if angle < ANGLE_MAX => angle + 1,
        _ => return Ok(None),
    };
    outputs.move_to(state, next)?;
    clock.sleep(Duration::from_millis(cfg.step_delay_ms));
    Ok(Some(next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use panrig_hardware::{SimulatedLamp, SimulatedServo};
    use panrig_traits::clock::test_clock::TestClock;

    #[test]
    fn steps_pause_and_stop_at_extremes() {
        let clock = TestClock::new();
        let servo = SimulatedServo::new();
        let lamp = SimulatedLamp::new();
        let mut outputs = Outputs::new(Box::new(servo.clone()), Box::new(lamp.clone()));
        let mut state = ControllerState::new(300);
        state.current_angle = 1;
        let cfg = ManualCfg::default();

        let moved = step(&mut state, &mut outputs, PanIntent::TowardMin, &cfg, &clock).unwrap();
        assert_eq!(moved, Some(0));
        assert_eq!(clock.elapsed_ms(), 15);
        assert!(lamp.is_on());

        let moved = step(&mut state, &mut outputs, PanIntent::TowardMin, &cfg, &clock).unwrap();
        assert_eq!(moved, None);
        assert_eq!(clock.elapsed_ms(), 15);
        assert_eq!(servo.moves(), vec![0]);
    }
}
