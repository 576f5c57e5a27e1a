/// Delayed or repeating callback trigger driven by frame time.
#[derive(Clone, Debug, PartialEq)]
pub struct TimerEvent {
    delay_ms: f64,
    looping: bool,
    elapsed_ms: f64,
    fired: u64,
    cancelled: bool,
}

impl TimerEvent {
    pub fn new(delay_ms: f64, looping: bool) -> Self {
        Self {
            delay_ms,
            looping,
            elapsed_ms: 0.0,
            fired: 0,
            cancelled: false,
        }
    }

    pub fn looping(delay_ms: f64) -> Self {
        Self::new(delay_ms, true)
    }

    /// Advance the clock and return how many times the timer fired.
    pub fn advance(&mut self, dt_ms: f64) -> u32 {
        if self.is_done() || self.delay_ms <= 0.0 {
            return 0;
        }

        self.elapsed_ms += dt_ms;
        let mut ticks = 0;

        while self.elapsed_ms >= self.delay_ms {
            self.elapsed_ms -= self.delay_ms;
            self.fired += 1;
            ticks += 1;

            if !self.looping {
                self.elapsed_ms = 0.0;
                break;
            }
        }

        ticks
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Cancelled, or a one-shot that already fired
    pub fn is_done(&self) -> bool {
        self.cancelled || (!self.looping && self.fired > 0)
    }

    pub fn fired(&self) -> u64 {
        self.fired
    }

    /// Progress towards the next tick in `[0, 1)`
    pub fn progress(&self) -> f64 {
        if self.delay_ms <= 0.0 {
            return 0.0;
        }
        self.elapsed_ms / self.delay_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looping_timer_fires_once_per_delay() {
        let mut timer = TimerEvent::looping(1000.0);
        assert_eq!(timer.advance(400.0), 0);
        assert_eq!(timer.advance(700.0), 1);
        assert!((timer.progress() - 0.1).abs() < 1e-9);
        assert_eq!(timer.advance(2000.0), 2);
        assert_eq!(timer.fired(), 3);
    }

    #[test]
    fn one_shot_fires_once() {
        let mut timer = TimerEvent::new(100.0, false);
        assert_eq!(timer.advance(500.0), 1);
        assert!(timer.is_done());
        assert_eq!(timer.advance(500.0), 0);
    }

    #[test]
    fn cancelled_timer_is_silent() {
        let mut timer = TimerEvent::looping(10.0);
        timer.cancel();
        assert_eq!(timer.advance(100.0), 0);
        assert!(timer.is_cancelled());
    }
}
