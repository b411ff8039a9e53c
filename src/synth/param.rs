//! Scheduled parameter automation
//!
//! A [`Param`] holds a timeline of automation events expressed against the
//! audio clock (seconds). Control code schedules ramps; the render loop reads
//! the value at the current sample time. Values never jump unless a caller
//! explicitly asks for it with [`Param::set_value_at_time`].

/// One scheduled automation event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Automation {
    /// Jump to `value` at `time`
    SetValue { time: f64, value: f64 },
    /// Linear ramp from the previous event, reaching `value` at `end_time`
    LinearRamp { end_time: f64, value: f64 },
    /// Exponential ramp from the previous event, reaching `value` at `end_time`
    ExponentialRamp { end_time: f64, value: f64 },
    /// Approach `target` exponentially from `start_time` with time constant `time_constant`
    SetTarget {
        start_time: f64,
        target: f64,
        time_constant: f64,
    },
}

impl Automation {
    /// Time at which this event is positioned on the timeline
    pub fn time(&self) -> f64 {
        match *self {
            Automation::SetValue { time, .. } => time,
            Automation::LinearRamp { end_time, .. } => end_time,
            Automation::ExponentialRamp { end_time, .. } => end_time,
            Automation::SetTarget { start_time, .. } => start_time,
        }
    }

    fn is_ramp(&self) -> bool {
        matches!(
            self,
            Automation::LinearRamp { .. } | Automation::ExponentialRamp { .. }
        )
    }
}

/// Curve in effect after the last applied event
#[derive(Debug, Clone, Copy, PartialEq)]
enum Segment {
    Hold(f64),
    Target {
        from: f64,
        start: f64,
        target: f64,
        time_constant: f64,
    },
}

impl Segment {
    fn value_at(&self, time: f64) -> f64 {
        match *self {
            Segment::Hold(value) => value,
            Segment::Target {
                from,
                start,
                target,
                time_constant,
            } => {
                if time <= start {
                    from
                } else if time_constant <= 0.0 {
                    target
                } else {
                    target + (from - target) * (-(time - start) / time_constant).exp()
                }
            }
        }
    }
}

/// An automatable audio parameter
#[derive(Debug, Clone)]
pub struct Param {
    base: Segment,
    base_time: f64,
    events: Vec<Automation>,
}

impl Param {
    /// Create a parameter holding `value`
    pub fn new(value: f64) -> Self {
        Self {
            base: Segment::Hold(value),
            base_time: 0.0,
            events: Vec::new(),
        }
    }

    /// Number of events still pending on the timeline
    pub fn pending(&self) -> usize {
        self.events.len()
    }

    /// Jump to `value` at `time`
    pub fn set_value_at_time(&mut self, value: f64, time: f64) {
        self.insert(Automation::SetValue { time, value });
    }

    /// Ramp linearly from the previous event to `value` at `end_time`
    pub fn linear_ramp_to_value_at_time(&mut self, value: f64, end_time: f64) {
        self.insert(Automation::LinearRamp { end_time, value });
    }

    /// Ramp exponentially from the previous event to `value` at `end_time`.
    ///
    /// Exponential curves cannot cross or reach zero; when either end is zero
    /// or the signs differ the value holds and jumps at `end_time`.
    pub fn exponential_ramp_to_value_at_time(&mut self, value: f64, end_time: f64) {
        self.insert(Automation::ExponentialRamp { end_time, value });
    }

    /// Glide toward `target` from `start_time` with the given time constant
    pub fn set_target_at_time(&mut self, target: f64, start_time: f64, time_constant: f64) {
        self.insert(Automation::SetTarget {
            start_time,
            target,
            time_constant: time_constant.max(0.0),
        });
    }

    /// Drop every event at or after `time`
    pub fn cancel_scheduled_values(&mut self, time: f64) {
        self.events.retain(|e| e.time() < time);
    }

    /// Freeze the curve at its value at `time` and drop later events
    pub fn cancel_and_hold_at_time(&mut self, time: f64) {
        let held = self.value_at(time);
        self.cancel_scheduled_values(time);
        self.set_value_at_time(held, time);
    }

    /// Value of the parameter at `time` without touching the timeline
    pub fn value_at(&self, time: f64) -> f64 {
        let mut segment = self.base;
        let mut segment_time = self.base_time;

        for event in &self.events {
            if event.time() > time {
                return match *event {
                    Automation::LinearRamp { end_time, value } => {
                        let start = segment.value_at(segment_time);
                        linear(start, segment_time, value, end_time, time)
                    }
                    Automation::ExponentialRamp { end_time, value } => {
                        let start = segment.value_at(segment_time);
                        exponential(start, segment_time, value, end_time, time)
                    }
                    _ => segment.value_at(time),
                };
            }
            (segment, segment_time) = apply(segment, segment_time, event);
        }

        segment.value_at(time)
    }

    /// Value at `time`, folding events that are fully in the past.
    ///
    /// Render loops call this once per sample with a non-decreasing time.
    pub fn advance(&mut self, time: f64) -> f64 {
        let mut folded = 0;
        for (i, event) in self.events.iter().enumerate() {
            if event.time() > time {
                break;
            }
            // A ramp after this event still needs its start point.
            let next_is_open_ramp = self
                .events
                .get(i + 1)
                .is_some_and(|next| next.is_ramp() && next.time() > time);
            (self.base, self.base_time) = apply(self.base, self.base_time, event);
            folded = i + 1;
            if next_is_open_ramp {
                break;
            }
        }
        if folded > 0 {
            self.events.drain(..folded);
        }
        self.value_at(time)
    }

    /// Sort-stable insert keeping events ordered by time
    fn insert(&mut self, event: Automation) {
        let time = event.time();
        let idx = self.events.partition_point(|e| e.time() <= time);
        self.events.insert(idx, event);
    }
}

impl Default for Param {
    fn default() -> Self {
        Self::new(0.0)
    }
}

fn apply(segment: Segment, segment_time: f64, event: &Automation) -> (Segment, f64) {
    match *event {
        Automation::SetValue { time, value } => (Segment::Hold(value), time),
        Automation::LinearRamp { end_time, value } => (Segment::Hold(value), end_time),
        Automation::ExponentialRamp { end_time, value } => (Segment::Hold(value), end_time),
        Automation::SetTarget {
            start_time,
            target,
            time_constant,
        } => {
            let from = segment.value_at(start_time.max(segment_time));
            (
                Segment::Target {
                    from,
                    start: start_time,
                    target,
                    time_constant,
                },
                start_time,
            )
        }
    }
}

fn linear(v0: f64, t0: f64, v1: f64, t1: f64, t: f64) -> f64 {
    if t <= t0 || t1 <= t0 {
        return v0;
    }
    v0 + (v1 - v0) * (t - t0) / (t1 - t0)
}

fn exponential(v0: f64, t0: f64, v1: f64, t1: f64, t: f64) -> f64 {
    if t <= t0 || t1 <= t0 || v0 == 0.0 || v1 == 0.0 || v0.signum() != v1.signum() {
        return v0;
    }
    v0 * (v1 / v0).powf((t - t0) / (t1 - t0))
}
