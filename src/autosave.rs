use std::time::{Duration, Instant};

/// Debounce timer for saves: every change pushes the deadline back
///
/// Time is passed in by the caller so the event loop owns the clock.
#[derive(Debug, Clone)]
pub struct Autosave {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Autosave {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// A change happened at `now`; replaces any pending deadline
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True once the quiet period has elapsed; clears the deadline
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_delay() {
        let start = Instant::now();
        let mut autosave = Autosave::new(Duration::from_millis(1000));

        assert!(!autosave.poll(start));
        autosave.schedule(start);
        assert!(autosave.is_pending());
        assert!(!autosave.poll(start + Duration::from_millis(999)));
        assert!(autosave.poll(start + Duration::from_millis(1000)));
        assert!(!autosave.is_pending());
        assert!(!autosave.poll(start + Duration::from_millis(2000)));
    }

    #[test]
    fn test_burst_coalesces() {
        let start = Instant::now();
        let mut autosave = Autosave::new(Duration::from_millis(1000));

        for ms in [0, 300, 600, 900] {
            autosave.schedule(start + Duration::from_millis(ms));
        }

        assert!(!autosave.poll(start + Duration::from_millis(1500)));
        assert_eq!(
            autosave.deadline(),
            Some(start + Duration::from_millis(1900))
        );
        assert!(autosave.poll(start + Duration::from_millis(1900)));
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut autosave = Autosave::new(Duration::from_millis(10));
        autosave.schedule(start);
        autosave.cancel();
        assert!(!autosave.poll(start + Duration::from_secs(1)));
    }
}
