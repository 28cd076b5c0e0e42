pub mod clock;
pub mod net;

pub use clock::{Clock, MonotonicClock};
pub use net::{HttpMethod, NetRequest, NetResponse, Network};

/// Logic level of a digital input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

/// Positional actuator driven in whole degrees (0..=180).
pub trait Actuator {
    fn set_angle(&mut self, degrees: u8) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Single on/off status lamp.
pub trait Indicator {
    fn set_lamp(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

pub trait DigitalInput {
    fn read_level(&mut self) -> Result<Level, Box<dyn std::error::Error + Send + Sync>>;
}

/// Analog channel sampled as a raw ADC count (0..=4095 for a 12-bit converter).
pub trait AnalogInput {
    fn read_raw(&mut self) -> Result<u16, Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: Actuator + ?Sized> Actuator for Box<T> {
    fn set_angle(&mut self, degrees: u8) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).set_angle(degrees)
    }
}

impl<T: Indicator + ?Sized> Indicator for Box<T> {
    fn set_lamp(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).set_lamp(on)
    }
}

impl<T: DigitalInput + ?Sized> DigitalInput for Box<T> {
    fn read_level(&mut self) -> Result<Level, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read_level()
    }
}

impl<T: AnalogInput + ?Sized> AnalogInput for Box<T> {
    fn read_raw(&mut self) -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read_raw()
    }
}
