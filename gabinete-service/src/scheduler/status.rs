//! Time-driven interaction status.

use chrono::{DateTime, Utc};

use crate::models::{InteractionStatus, ScheduleWindow};

/// Status an interaction should have at `now`.
///
/// Inside the window an interaction is `em_progresso`, past its end it is
/// `concluido`. Terminal statuses are kept and a status never moves
/// backwards, so applying the result again changes nothing.
pub fn desired_status(
    now: DateTime<Utc>,
    window: ScheduleWindow,
    current: InteractionStatus,
) -> InteractionStatus {
    if current.is_terminal() {
        return current;
    }

    let target = if window.end.is_some_and(|end| now >= end) {
        InteractionStatus::Concluido
    } else if window.start.is_some_and(|start| now >= start) {
        InteractionStatus::EmProgresso
    } else {
        return current;
    };

    if target.rank() > current.rank() {
        target
    } else {
        current
    }
}
