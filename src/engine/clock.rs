//! Sample-counting audio clock

/// Whether the clock advances when samples are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Suspended,
    Running,
}

/// Audio clock driven by rendered frames
#[derive(Debug, Clone)]
pub struct AudioClock {
    sample_rate: f64,
    frame: u64,
    state: ClockState,
}

impl AudioClock {
    /// New clock, suspended at frame zero
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            frame: 0,
            state: ClockState::Suspended,
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    pub fn resume(&mut self) {
        self.state = ClockState::Running;
    }

    pub fn suspend(&mut self) {
        self.state = ClockState::Suspended;
    }

    /// Frames rendered so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Current time in seconds
    pub fn current_time(&self) -> f64 {
        self.frame as f64 / self.sample_rate
    }

    /// Time of the current frame, then move on to the next one
    pub fn tick(&mut self) -> f64 {
        let now = self.current_time();
        self.frame += 1;
        now
    }
}
