//! Structured observability hooks for dashboard workflow events.
//!
//! Lifecycle events are emitted at `info!`; rejections, discarded responses
//! and expiries at `debug!` so they stay out of default operator logs.

use tracing::field::Empty;
use tracing::{debug, info, Span};

use crate::state::{ActionOutcome, BusyAction};

/// Span wrapping one triggered action.
///
/// `epoch` is filled in by [`record_action_epoch`] once the action has taken
/// the busy flag; rejected actions leave it empty.
pub fn action_span(action: BusyAction) -> Span {
    tracing::info_span!("secaudit.action", action = %action, epoch = Empty)
}

/// Record the epoch an action was issued under on the current action span.
pub fn record_action_epoch(epoch: u64) {
    Span::current().record("epoch", epoch);
}

/// Emit event: action took the busy flag and issued its request.
pub fn emit_action_started(action: BusyAction, epoch: u64) {
    info!(event = "action.started", action = %action, epoch = epoch);
}

/// Emit event: action finished with the given outcome.
pub fn emit_action_finished(action: BusyAction, epoch: u64, outcome: ActionOutcome) {
    info!(
        event = "action.finished",
        action = %action,
        epoch = epoch,
        outcome = %outcome,
    );
}

/// Emit event: action refused because another one is in flight.
pub fn emit_action_rejected(action: BusyAction, busy: BusyAction) {
    debug!(event = "action.rejected", action = %action, busy = %busy);
}

/// Emit event: response dropped because a reset happened after it was issued.
pub fn emit_response_discarded(action: BusyAction, issued_epoch: u64, current_epoch: u64) {
    debug!(
        event = "response.discarded",
        action = %action,
        issued_epoch = issued_epoch,
        current_epoch = current_epoch,
    );
}

/// Emit event: dashboard reset to its load-time state.
pub fn emit_dashboard_reset(epoch: u64) {
    info!(event = "dashboard.reset", epoch = epoch);
}

/// Emit event: a status message reached its TTL.
pub fn emit_message_expired(generation: u64) {
    debug!(event = "message.expired", generation = generation);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_span_create() {
        let span = action_span(BusyAction::Auditing);
        let _entered = span.enter();
        record_action_epoch(3);
    }
}
