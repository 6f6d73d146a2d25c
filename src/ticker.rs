use std::time::Duration;

/// Interval for the runtime-owned event update tick, in milliseconds.
/// The owning runtime drives [`DataModel::event_update_tick`] at this rate
/// so views can refresh elapsed durations of running events.
///
/// [`DataModel::event_update_tick`]: crate::model::DataModel::event_update_tick
pub const DEFAULT_TICK_MS: u64 = 1000;

/// The tick interval as a std `Duration`, ready for a scheduler
pub fn tick_duration() -> Duration {
    Duration::from_millis(DEFAULT_TICK_MS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_duration() {
        let duration = tick_duration();
        assert_eq!(duration, Duration::from_millis(1000));
    }
}
