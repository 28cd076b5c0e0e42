//! `From` implementations bridging `panrig_config` sections to runtime configs.

use crate::config::{ButtonCfg, JoystickCfg, ManualCfg, ScanCfg, SchedulerCfg};

impl From<&panrig_config::Button> for ButtonCfg {
    fn from(c: &panrig_config::Button) -> Self {
        Self {
            debounce_ms: c.debounce_ms,
            settle_ms: c.settle_ms,
        }
    }
}

impl From<&panrig_config::Joystick> for JoystickCfg {
    fn from(c: &panrig_config::Joystick) -> Self {
        Self {
            speed_low: c.speed_low,
            speed_high: c.speed_high,
            center: c.center,
            pan_deadzone: c.pan_deadzone,
        }
    }
}

impl From<&panrig_config::Scan> for ScanCfg {
    fn from(c: &panrig_config::Scan) -> Self {
        Self {
            default_period_ms: c.default_period_ms,
            min_period_ms: c.min_period_ms,
            max_period_ms: c.max_period_ms,
            period_step_ms: c.period_step_ms,
            blink_ms: c.blink_ms,
        }
    }
}

impl From<&panrig_config::Manual> for ManualCfg {
    fn from(c: &panrig_config::Manual) -> Self {
        Self {
            step_delay_ms: c.step_delay_ms,
        }
    }
}

impl From<&panrig_config::Scheduler> for SchedulerCfg {
    fn from(c: &panrig_config::Scheduler) -> Self {
        Self { tick_ms: c.tick_ms }
    }
}
