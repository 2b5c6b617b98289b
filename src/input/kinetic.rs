use crate::core::{
    constants::{
        KINETIC_DECELERATION, KINETIC_INTERVAL_MS, KINETIC_MAX_SPEED, KINETIC_MAX_STEPS,
        KINETIC_TIMEFRAME_MS,
    },
    geo::Point,
};
use std::collections::VecDeque;

/// Configuration for inertial panning
#[derive(Debug, Clone)]
pub struct KineticConfig {
    /// Deceleration in pixels per ms²
    pub deceleration: f64,
    /// Only pointer samples this recent (ms) count towards the release speed
    pub timeframe_ms: f64,
    /// Step length of the simulated movement (ms)
    pub interval_ms: f64,
    /// Release speeds below this (px/ms) start no movement
    pub threshold: f64,
    /// Release speeds above this (px/ms) are clamped
    pub max_speed: f64,
}

impl Default for KineticConfig {
    fn default() -> Self {
        Self {
            deceleration: KINETIC_DECELERATION,
            timeframe_ms: KINETIC_TIMEFRAME_MS,
            interval_ms: KINETIC_INTERVAL_MS,
            threshold: 0.0,
            max_speed: KINETIC_MAX_SPEED,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    position: Point,
    time_ms: f64,
}

/// Tracks pointer samples during a drag and computes the release velocity
#[derive(Debug, Clone, Default)]
pub struct Kinetic {
    config: KineticConfig,
    /// Most recent first
    samples: VecDeque<Sample>,
}

impl Kinetic {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: KineticConfig) -> Self {
        Self {
            config,
            samples: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &KineticConfig {
        &self.config
    }

    /// Starts a new gesture
    pub fn begin(&mut self, position: Point, time_ms: f64) {
        self.samples.clear();
        self.update(position, time_ms);
    }

    /// Records a pointer sample, dropping ones outside the timeframe
    pub fn update(&mut self, position: Point, time_ms: f64) {
        self.samples.push_front(Sample { position, time_ms });
        while self
            .samples
            .back()
            .is_some_and(|oldest| time_ms - oldest.time_ms > self.config.timeframe_ms)
        {
            self.samples.pop_back();
        }
    }

    /// Ends the gesture, returning the movement to continue with if the
    /// pointer was still moving at release
    pub fn end(&mut self, position: Point, time_ms: f64) -> Option<KineticMove> {
        let samples = std::mem::take(&mut self.samples);
        let oldest = samples
            .iter()
            .take_while(|sample| time_ms - sample.time_ms <= self.config.timeframe_ms)
            .last()?;

        let elapsed = time_ms - oldest.time_ms;
        let offset = position.subtract(&oldest.position);
        let distance = offset.distance_to(&Point::default());
        if elapsed <= 0.0 || distance == 0.0 {
            return None;
        }

        let speed = (distance / elapsed).min(self.config.max_speed);
        if !speed.is_finite() || speed <= self.config.threshold {
            return None;
        }

        Some(KineticMove {
            speed,
            direction: offset.multiply(1.0 / distance),
            deceleration: self.config.deceleration,
            interval_ms: self.config.interval_ms,
        })
    }
}

/// A decelerating movement in pointer space
#[derive(Debug, Clone, PartialEq)]
pub struct KineticMove {
    /// Initial speed in px/ms
    pub speed: f64,
    /// Unit vector in the drag direction
    pub direction: Point,
    pub deceleration: f64,
    pub interval_ms: f64,
}

impl KineticMove {
    /// Time until the movement stops
    pub fn duration_ms(&self) -> f64 {
        self.speed / self.deceleration
    }

    /// Total distance travelled: v0² / 2a
    pub fn distance(&self) -> f64 {
        self.speed * self.speed / (2.0 * self.deceleration)
    }

    /// Incremental pointer offsets, one per interval, until the speed hits zero.
    ///
    /// Long glides stretch the interval so there are at most
    /// `KINETIC_MAX_STEPS` steps.
    pub fn steps(&self) -> Vec<Point> {
        let duration = self.duration_ms();
        if !duration.is_finite() || duration <= 0.0 {
            return Vec::new();
        }
        if self.interval_ms <= 0.0 {
            return vec![self.displacement()];
        }
        let ideal_count = (duration / self.interval_ms).ceil();
        let (count, interval) = if ideal_count > KINETIC_MAX_STEPS as f64 {
            (KINETIC_MAX_STEPS, duration / KINETIC_MAX_STEPS as f64)
        } else {
            (ideal_count.max(1.0) as usize, self.interval_ms)
        };

        let mut steps = Vec::with_capacity(count);
        let mut travelled = 0.0;
        for i in 1..=count {
            let t = if i == count {
                duration
            } else {
                (i as f64 * interval).min(duration)
            };
            let position = self.speed * t - self.deceleration * t * t / 2.0;
            steps.push(self.direction.multiply(position - travelled));
            travelled = position;
        }
        steps
    }

    /// Sum of all steps
    pub fn displacement(&self) -> Point {
        self.direction.multiply(self.distance())
    }
}
