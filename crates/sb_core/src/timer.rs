//! Virtual-clock timer service.
//!
//! Timers are scheduled against a session clock that only moves when the
//! owner calls `advance()`, never against wall time. Delays use integer
//! microseconds so the same sequence of steps fires the same timers on every
//! platform.
//!
//! Rather than storing closures, each timer carries a payload. `advance()`
//! returns the payloads of every timer that came due, in due-time order, and
//! the owner dispatches them. A canceled handle never fires again.

/// Opaque identifier of a scheduled timer. Handles are never reused within a
/// service, so a stale handle cannot cancel a newer timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct FiredTimer<T> {
    pub handle: TimerHandle,
    pub due_us: u64,
    pub payload: T,
}

#[derive(Debug, Clone)]
struct ScheduledTimer<T> {
    handle: TimerHandle,
    due_us: u64,
    interval_us: Option<u64>,
    payload: T,
}

#[derive(Debug, Clone)]
pub struct TimerService<T> {
    now_us: u64,
    next_handle: u64,
    timers: Vec<ScheduledTimer<T>>,
}

impl<T: Clone> TimerService<T> {
    pub fn new() -> Self {
        Self {
            now_us: 0,
            next_handle: 1,
            timers: Vec::new(),
        }
    }

    pub fn now_us(&self) -> u64 {
        self.now_us
    }

    /// Fire `payload` once, `delay_us` after the current clock.
    pub fn schedule_once(&mut self, delay_us: u64, payload: T) -> TimerHandle {
        self.insert(delay_us, None, payload)
    }

    /// Fire `payload` every `interval_us`, first firing one interval from now.
    /// A zero interval is bumped to 1us so `advance()` always terminates.
    pub fn schedule_repeating(&mut self, interval_us: u64, payload: T) -> TimerHandle {
        let interval_us = interval_us.max(1);
        self.insert(interval_us, Some(interval_us), payload)
    }

    /// Returns false if the handle was already fired (one-shot) or canceled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.handle != handle);
        self.timers.len() != before
    }

    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.timers.iter().any(|t| t.handle == handle)
    }

    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    /// Drop every pending timer. The clock and handle counter keep running.
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    /// Move the clock forward and collect everything that came due. A
    /// repeating timer spanned several times by one large step fires once per
    /// period.
    pub fn advance(&mut self, dt_us: u64) -> Vec<FiredTimer<T>> {
        let target = self.now_us.saturating_add(dt_us);
        let mut fired = Vec::new();

        loop {
            let next = self
                .timers
                .iter()
                .enumerate()
                .filter(|(_, t)| t.due_us <= target)
                .min_by_key(|(_, t)| (t.due_us, t.handle))
                .map(|(index, _)| index);
            let Some(index) = next else {
                break;
            };

            let timer = &mut self.timers[index];
            fired.push(FiredTimer {
                handle: timer.handle,
                due_us: timer.due_us,
                payload: timer.payload.clone(),
            });
            let interval_us = timer.interval_us;
            match interval_us {
                Some(interval) => timer.due_us += interval,
                None => {
                    self.timers.swap_remove(index);
                }
            }
        }

        self.now_us = target;
        fired
    }

    fn insert(&mut self, delay_us: u64, interval_us: Option<u64>, payload: T) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.timers.push(ScheduledTimer {
            handle,
            due_us: self.now_us.saturating_add(delay_us),
            interval_us,
            payload,
        });
        handle
    }
}

impl<T: Clone> Default for TimerService<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_fires_exactly_at_delay() {
        let mut timers = TimerService::new();
        let handle = timers.schedule_once(1_000, "respawn");

        assert!(timers.advance(999).is_empty());
        assert!(timers.is_active(handle));

        let fired = timers.advance(1);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].payload, "respawn");
        assert_eq!(fired[0].due_us, 1_000);
        assert!(!timers.is_active(handle));
        assert!(timers.advance(10_000).is_empty());
    }

    #[test]
    fn repeating_fires_each_period() {
        let mut timers = TimerService::new();
        let handle = timers.schedule_repeating(300, 7u32);

        assert!(timers.advance(299).is_empty());
        assert_eq!(timers.advance(1).len(), 1);
        assert_eq!(timers.advance(300).len(), 1);
        assert!(timers.is_active(handle));
    }

    #[test]
    fn large_step_fires_repeating_once_per_period() {
        let mut timers = TimerService::new();
        timers.schedule_repeating(100, ());
        let fired = timers.advance(350);
        assert_eq!(fired.len(), 3);
        assert_eq!(
            fired.iter().map(|f| f.due_us).collect::<Vec<_>>(),
            vec![100, 200, 300]
        );
    }

    #[test]
    fn canceled_timer_never_fires() {
        let mut timers = TimerService::new();
        let handle = timers.schedule_repeating(50, 'x');
        assert!(timers.cancel(handle));
        assert!(!timers.cancel(handle));
        assert!(timers.advance(1_000).is_empty());
        assert_eq!(timers.active_count(), 0);
    }

    #[test]
    fn fired_in_due_order_across_timers() {
        let mut timers = TimerService::new();
        timers.schedule_once(500, "late");
        timers.schedule_once(100, "early");
        timers.schedule_repeating(200, "tick");

        let order: Vec<_> = timers.advance(500).into_iter().map(|f| f.payload).collect();
        assert_eq!(order, vec!["early", "tick", "tick", "late"]);
    }

    #[test]
    fn delays_are_relative_to_current_clock() {
        let mut timers = TimerService::new();
        timers.advance(1_000);
        timers.schedule_once(10, ());
        assert!(timers.advance(9).is_empty());
        let fired = timers.advance(1);
        assert_eq!(fired[0].due_us, 1_010);
        assert_eq!(timers.now_us(), 1_010);
    }

    #[test]
    fn handles_are_not_reused_after_clear() {
        let mut timers = TimerService::new();
        let first = timers.schedule_once(10, ());
        timers.clear();
        let second = timers.schedule_once(10, ());
        assert_ne!(first, second);
        assert!(!timers.cancel(first));
        assert!(timers.is_active(second));
    }
}
