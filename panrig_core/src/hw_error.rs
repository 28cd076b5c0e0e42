//! Maps `Box<dyn Error>` from trait boundaries to typed `ControllerError`.
//!
//! The traits in `panrig_traits` use `Box<dyn Error + Send + Sync>`; this module
//! converts those to our typed error enum, with an optional feature-gated path
//! for `panrig_hardware::HwError` downcasting.

use crate::error::ControllerError;

/// Map a trait-boundary error to a typed `ControllerError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> ControllerError {
    #[cfg(feature = "hardware-errors")]
    {
        use panrig_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::AdcChannel(_) => ControllerError::Config(hw.to_string()),
                other => ControllerError::HardwareFault(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("channel") {
        ControllerError::Config(s)
    } else {
        ControllerError::Hardware(s)
    }
}
