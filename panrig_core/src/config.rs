//! Configuration types for the controller.
//!
//! These are the runtime structs consumed by `Controller`. They are separate
//! from the TOML-deserialized config in `panrig_config`.

/// Push button sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonCfg {
    /// Minimum spacing between two accepted clicks.
    pub debounce_ms: u64,
    /// Gap between the two samples of one read. A level change shorter than
    /// this gap is rejected as contact noise.
    pub settle_ms: u64,
}

impl Default for ButtonCfg {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            settle_ms: 5,
        }
    }
}

/// Joystick thresholds in raw ADC counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoystickCfg {
    /// Speed axis below this value shortens the scan period.
    pub speed_low: u16,
    /// Speed axis above this value lengthens the scan period.
    pub speed_high: u16,
    /// Pan axis rest position.
    pub center: u16,
    /// Half-width of the pan band ignored around `center`.
    pub pan_deadzone: u16,
}

impl Default for JoystickCfg {
    fn default() -> Self {
        Self {
            speed_low: 1800,
            speed_high: 1900,
            center: 2048,
            pan_deadzone: 300,
        }
    }
}

/// Autonomous sweep timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanCfg {
    pub default_period_ms: u64,
    pub min_period_ms: u64,
    pub max_period_ms: u64,
    pub period_step_ms: u64,
    pub blink_ms: u64,
}

impl Default for ScanCfg {
    fn default() -> Self {
        Self {
            default_period_ms: 300,
            min_period_ms: 100,
            max_period_ms: 500,
            period_step_ms: 50,
            blink_ms: 500,
        }
    }
}

impl ScanCfg {
    /// Clamp a requested period into `[min_period_ms, max_period_ms]`.
    pub fn clamp_period(&self, requested: i64) -> u64 {
        let lo = i64::try_from(self.min_period_ms).unwrap_or(i64::MAX);
        let hi = i64::try_from(self.max_period_ms).unwrap_or(i64::MAX);
        // lo >= 1 after validation, so the clamped value is non-negative
        u64::try_from(requested.clamp(lo, hi)).unwrap_or(self.min_period_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManualCfg {
    /// Pause after each one-degree step.
    pub step_delay_ms: u64,
}

impl Default for ManualCfg {
    fn default() -> Self {
        Self { step_delay_ms: 15 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerCfg {
    /// Sleep at the end of every tick.
    pub tick_ms: u64,
}

impl Default for SchedulerCfg {
    fn default() -> Self {
        Self { tick_ms: 10 }
    }
}
