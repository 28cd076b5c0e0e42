//! Autonomous sweep: lamp blink, alternating extreme moves and cycle counting.

use tracing::{debug, info};

use crate::conditioner::{SpeedIntent, adjust_period};
use crate::config::ScanCfg;
use crate::error::Result;
use crate::outputs::Outputs;
use crate::state::{ANGLE_MAX, ANGLE_MIN, ControllerState};

/// What one scan step did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStep {
    pub moved_to: Option<u8>,
    /// The cycle budget is spent; the caller must return to Standby.
    pub finished: bool,
}

/// Nudge the period from the speed axis. Returns the new period when it changed.
pub fn retune(state: &mut ControllerState, intent: SpeedIntent, cfg: &ScanCfg) -> Option<u64> {
    let next = adjust_period(state.scan_period_ms, intent, cfg);
    if next == state.scan_period_ms {
        return None;
    }
    debug!(from = state.scan_period_ms, to = next, "scan period adjusted");
    state.scan_period_ms = next;
    Some(next)
}

/// Advance the sweep as of `now_ms`.
pub fn step(
    state: &mut ControllerState,
    outputs: &mut Outputs,
    cfg: &ScanCfg,
    now_ms: u64,
) -> Result<ScanStep> {
    let mut out = ScanStep::default();

    if now_ms.saturating_sub(state.last_indicator_toggle_ms) >= cfg.blink_ms {
        outputs.lamp(state, !state.indicator_on)?;
        state.last_indicator_toggle_ms = now_ms;
    }

    if now_ms.saturating_sub(state.last_scan_move_ms) >= state.scan_period_ms {
        let angle = if state.scan_forward {
            ANGLE_MAX
        } else {
            ANGLE_MIN
        };
        outputs.move_to(state, angle)?;
        state.scan_forward = !state.scan_forward;
        state.last_scan_move_ms = now_ms;
        out.moved_to = Some(angle);

        if angle == ANGLE_MIN
            && let Some(budget) = state.scan_cycles.as_mut()
        {
            budget.completed = budget.completed.saturating_add(1);
            debug!(completed = budget.completed, target = budget.target, "scan cycle done");
            if budget.is_spent() {
                info!(cycles = budget.target, "scan cycle budget reached");
                out.finished = true;
            }
        }
    }

    Ok(out)
}
