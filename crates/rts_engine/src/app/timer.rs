/// Countdown primitive behind every timed transition.
///
/// A timer never resets itself: once `elapsed >= target` it reports a timeout until
/// the owner calls [`Timer::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    target_millis: u32,
    elapsed_millis: u32,
    running: bool,
}

impl Timer {
    pub const fn new(target_millis: u32) -> Self {
        Self {
            target_millis,
            elapsed_millis: 0,
            running: false,
        }
    }

    pub fn started(target_millis: u32) -> Self {
        let mut timer = Self::new(target_millis);
        timer.start();
        timer
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn reset(&mut self) {
        self.elapsed_millis = 0;
    }

    pub fn update(&mut self, delta_millis: u32) {
        if self.running {
            self.elapsed_millis = self.elapsed_millis.saturating_add(delta_millis);
        }
    }

    pub fn timeout(&self) -> bool {
        self.elapsed_millis >= self.target_millis
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn elapsed_millis(&self) -> u32 {
        self.elapsed_millis
    }

    pub fn target_millis(&self) -> u32 {
        self.target_millis
    }

    /// Completed fraction in `0.0..=1.0`, for progress bars.
    pub fn progress(&self) -> f32 {
        if self.target_millis == 0 {
            return 1.0;
        }
        (self.elapsed_millis as f32 / self.target_millis as f32).min(1.0)
    }
}
