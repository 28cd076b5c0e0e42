//! Actuator and lamp sinks. State mirrors a device only after a successful write.

use eyre::WrapErr;
use panrig_traits::{Actuator, Indicator};
use tracing::trace;

use crate::error::Result;
use crate::hw_error::map_hw_error;
use crate::state::ControllerState;

pub struct Outputs {
    actuator: Box<dyn Actuator>,
    lamp: Box<dyn Indicator>,
}

impl Outputs {
    pub fn new(actuator: Box<dyn Actuator>, lamp: Box<dyn Indicator>) -> Self {
        Self { actuator, lamp }
    }

    /// Command `angle` and record it as the current angle.
    pub fn move_to(&mut self, state: &mut ControllerState, angle: u8) -> Result<()> {
        self.actuator
            .set_angle(angle)
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err_with(|| format!("actuator write {angle}"))?;
        trace!(angle, "actuator moved");
        state.current_angle = angle;
        Ok(())
    }

    pub fn lamp(&mut self, state: &mut ControllerState, on: bool) -> Result<()> {
        self.lamp
            .set_lamp(on)
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("indicator write")?;
        state.indicator_on = on;
        Ok(())
    }
}

impl std::fmt::Debug for Outputs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Outputs").finish_non_exhaustive()
    }
}
