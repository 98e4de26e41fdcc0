/// Latest value of one upstream input, plus whether it arrived since the last
/// processed cycle.
#[derive(Clone, Debug)]
pub struct InputLatch<T> {
    pub name: String,
    value: Option<T>,
    fresh: bool,
    updates: u64,
    consumed: u64,
}

impl<T> InputLatch<T> {
    pub fn new(name: &str) -> Self {
        InputLatch {
            name: name.to_string(),
            value: None,
            fresh: false,
            updates: 0,
            consumed: 0,
        }
    }

    pub fn update(&mut self, value: T) {
        self.value = Some(value);
        self.fresh = true;
        self.updates += 1;
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    pub fn ever_received(&self) -> bool {
        self.updates > 0
    }

    /// Mark the current value as processed.
    pub fn consume(&mut self) {
        if self.fresh {
            self.fresh = false;
            self.consumed += 1;
        }
    }

    pub fn update_count(&self) -> u64 {
        self.updates
    }

    /// Samples overwritten before any cycle processed them.
    pub fn dropped_count(&self) -> u64 {
        self.updates - self.consumed - u64::from(self.fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_latch_is_empty() {
        let latch: InputLatch<bool> = InputLatch::new("robot_moving");
        assert!(!latch.ever_received());
        assert!(!latch.is_fresh());
        assert!(latch.get().is_none());
    }

    #[test]
    fn test_update_then_consume() {
        let mut latch = InputLatch::new("scan");
        latch.update(3);
        assert!(latch.is_fresh());
        assert_eq!(latch.get(), Some(&3));

        latch.consume();
        assert!(!latch.is_fresh());
        // The value stays readable after consumption
        assert_eq!(latch.get(), Some(&3));
        assert!(latch.ever_received());
    }

    #[test]
    fn test_overwritten_samples_count_as_dropped() {
        let mut latch = InputLatch::new("scan");
        latch.update(1);
        latch.update(2);
        latch.update(3);
        assert_eq!(latch.dropped_count(), 2);

        latch.consume();
        assert_eq!(latch.update_count(), 3);
        assert_eq!(latch.dropped_count(), 2);
    }
}
