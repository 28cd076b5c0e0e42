pub mod error;
pub mod util;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod rpi;

use panrig_traits::{Actuator, AnalogInput, DigitalInput, Indicator, Level};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::trace;

use crate::error::HwError;

/// Simulated servo. Clones share the same command log, so a test can keep a
/// handle while the controller owns the device.
#[derive(Debug, Clone, Default)]
pub struct SimulatedServo {
    log: Rc<RefCell<Vec<u8>>>,
    fail_next: Rc<Cell<bool>>,
}

impl SimulatedServo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last commanded angle, if any.
    pub fn last_angle(&self) -> Option<u8> {
        self.log.borrow().last().copied()
    }

    /// Every angle commanded so far, oldest first.
    pub fn moves(&self) -> Vec<u8> {
        self.log.borrow().clone()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }

    /// Make the next `set_angle` fail with a GPIO error.
    pub fn fail_next(&self) {
        self.fail_next.set(true);
    }
}

impl Actuator for SimulatedServo {
    fn set_angle(&mut self, degrees: u8) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.fail_next.replace(false) {
            return Err(Box::new(HwError::Gpio("servo line fault (simulated)".into())));
        }
        let pulse = util::angle_to_pulse_us(degrees)?;
        trace!(degrees, pulse_us = pulse, "servo write (simulated)");
        self.log.borrow_mut().push(degrees);
        Ok(())
    }
}

/// Simulated status lamp; counts every write.
#[derive(Debug, Clone, Default)]
pub struct SimulatedLamp {
    on: Rc<Cell<bool>>,
    writes: Rc<Cell<u32>>,
}

impl SimulatedLamp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_on(&self) -> bool {
        self.on.get()
    }

    pub fn writes(&self) -> u32 {
        self.writes.get()
    }
}

impl Indicator for SimulatedLamp {
    fn set_lamp(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        trace!(on, "lamp write (simulated)");
        self.on.set(on);
        self.writes.set(self.writes.get().saturating_add(1));
        Ok(())
    }
}

/// Simulated push button on a pulled-up line: released reads High, pressed reads Low.
#[derive(Debug, Clone)]
pub struct SimulatedButton {
    level: Rc<Cell<Level>>,
}

impl Default for SimulatedButton {
    fn default() -> Self {
        Self {
            level: Rc::new(Cell::new(Level::High)),
        }
    }
}

impl SimulatedButton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self) {
        self.level.set(Level::Low);
    }

    pub fn release(&self) {
        self.level.set(Level::High);
    }
}

impl DigitalInput for SimulatedButton {
    fn read_level(&mut self) -> Result<Level, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.level.get())
    }
}

/// Simulated joystick axis holding a raw 12-bit reading.
#[derive(Debug, Clone)]
pub struct SimulatedAxis {
    raw: Rc<Cell<u16>>,
}

impl SimulatedAxis {
    pub fn new(rest: u16) -> Self {
        Self {
            raw: Rc::new(Cell::new(rest.min(util::ADC_FULL_SCALE))),
        }
    }

    pub fn set(&self, raw: u16) {
        self.raw.set(raw.min(util::ADC_FULL_SCALE));
    }

    pub fn get(&self) -> u16 {
        self.raw.get()
    }
}

impl AnalogInput for SimulatedAxis {
    fn read_raw(&mut self) -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.raw.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_servo_records_moves() {
        let servo = SimulatedServo::new();
        let mut dev = servo.clone();
        dev.set_angle(0).unwrap();
        dev.set_angle(180).unwrap();
        assert_eq!(servo.moves(), vec![0, 180]);
        assert_eq!(servo.last_angle(), Some(180));
    }

    #[test]
    fn test_simulated_servo_rejects_out_of_range() {
        let mut servo = SimulatedServo::new();
        let err = servo.set_angle(200).unwrap_err();
        assert!(err.to_string().contains("out of range"));
        assert!(servo.moves().is_empty());
    }

    #[test]
    fn test_simulated_button_is_active_low() {
        let button = SimulatedButton::new();
        let mut dev = button.clone();
        assert_eq!(dev.read_level().unwrap(), Level::High);
        button.press();
        assert_eq!(dev.read_level().unwrap(), Level::Low);
    }
}
