//! Mode machine: resolves triggers to a destination mode and runs entry actions.

use tracing::info;

use crate::error::Result;
use crate::outputs::Outputs;
use crate::state::{ANGLE_CENTER, ControllerState, Mode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Debounced button press.
    Click,
    /// API scan command.
    StartScan,
    /// API stop command.
    Stop,
    /// Bounded scan reached its cycle budget.
    CyclesDone,
}

/// Destination of `trigger` when fired in `from`.
pub fn target(from: Mode, trigger: Trigger) -> Mode {
    match trigger {
        Trigger::Click => from.next(),
        Trigger::StartScan => Mode::AutoScan,
        Trigger::Stop | Trigger::CyclesDone => Mode::Standby,
    }
}

/// Fire `trigger`. Returns the new mode when one was entered.
///
/// Stop always re-runs the Standby entry actions, so repeated stops leave the
/// rig parked. Other triggers that resolve to the current mode do nothing.
/// The mode only changes once every entry action has succeeded.
pub fn apply(
    state: &mut ControllerState,
    outputs: &mut Outputs,
    trigger: Trigger,
    now_ms: u64,
) -> Result<Option<Mode>> {
    let from = state.mode;
    let to = target(from, trigger);
    if to == from && trigger != Trigger::Stop {
        return Ok(None);
    }
    on_enter(state, outputs, to, now_ms)?;
    state.mode = to;
    if to != from {
        info!(from = %from, to = %to, cause = ?trigger, "mode transition");
    }
    Ok(Some(to))
}

/// Entry actions of `mode`. Device writes go first; state is only touched
/// after they all succeed.
pub fn on_enter(
    state: &mut ControllerState,
    outputs: &mut Outputs,
    mode: Mode,
    now_ms: u64,
) -> Result<()> {
    match mode {
        Mode::Standby => {
            outputs.move_to(state, ANGLE_CENTER)?;
            outputs.lamp(state, false)?;
            state.scan_cycles = None;
        }
        Mode::ManualPan => {
            outputs.lamp(state, true)?;
        }
        Mode::AutoScan => {
            outputs.lamp(state, false)?;
            state.scan_forward = true;
            state.scan_cycles = None;
            state.last_scan_move_ms = now_ms;
            state.last_indicator_toggle_ms = now_ms;
        }
    }
    Ok(())
}
