//! Offline performance: held chords plus timed controller moves

use std::str::FromStr;

use anyhow::Result;
use thiserror::Error;
use tracing::debug;

use super::Engine;
use crate::config::ChordBinding;
use crate::control::{ModulationVector, XyController};

/// Error parsing a `t:x,y` move
#[derive(Debug, Error, PartialEq)]
pub enum ScoreError {
    #[error("move '{0}' must look like TIME:X,Y")]
    Syntax(String),

    #[error("move '{input}': {reason}")]
    Value { input: String, reason: String },
}

/// Steer the controller toward `target` from `at` seconds on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreMove {
    pub at: f64,
    pub target: ModulationVector,
}

impl FromStr for ScoreMove {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let syntax = || ScoreError::Syntax(s.to_string());
        let (at, point) = s.split_once(':').ok_or_else(syntax)?;
        let (x, y) = point.split_once(',').ok_or_else(syntax)?;

        let number = |field: &str, text: &str| {
            text.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ScoreError::Value {
                    input: s.to_string(),
                    reason: format!("{} is not a number", field),
                })
        };
        let at = number("time", at)?;
        if at < 0.0 {
            return Err(ScoreError::Value {
                input: s.to_string(),
                reason: "time must not be negative".to_string(),
            });
        }
        Ok(Self {
            at,
            target: ModulationVector::new(number("x", x)?, number("y", y)?),
        })
    }
}

/// What to play when rendering without a keyboard.
///
/// Chords are attacked at time zero and released so their tails end with
/// the render. Moves are applied in time order at controller rate.
#[derive(Debug, Clone, Default)]
pub struct Score {
    duration: f64,
    chords: Vec<ChordBinding>,
    moves: Vec<ScoreMove>,
}

impl Score {
    pub fn new(duration: f64) -> Self {
        Self {
            duration: duration.max(0.0),
            ..Self::default()
        }
    }

    pub fn with_chord(mut self, chord: ChordBinding) -> Self {
        self.chords.push(chord);
        self
    }

    pub fn with_move(mut self, step: ScoreMove) -> Self {
        let idx = self.moves.partition_point(|m| m.at <= step.at);
        self.moves.insert(idx, step);
        self
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn chords(&self) -> &[ChordBinding] {
        &self.chords
    }

    pub fn moves(&self) -> &[ScoreMove] {
        &self.moves
    }

    /// Render through `engine`, handing every sample to `sink`.
    ///
    /// Returns the number of samples written.
    pub fn render<F>(&self, engine: &mut Engine, mut sink: F) -> Result<u64>
    where
        F: FnMut(f32) -> Result<()>,
    {
        let sample_rate = engine.sample_rate();
        let total = (self.duration * sample_rate).round() as u64;
        let tick_every = (sample_rate / f64::from(engine.config().controller.rate_hz.max(1)))
            .round()
            .max(1.0) as u64;
        let voice = &engine.config().voice;
        // Short takes still hold through the attack and the gain glide.
        let release_at =
            (self.duration - voice.release - voice.stop_margin).max(voice.attack + voice.glide);

        let mut controller = XyController::new(&engine.config().controller);
        let mut pending = self.moves.iter().peekable();
        let mut released = false;

        engine.activate();
        for chord in &self.chords {
            engine.attack(&chord.trigger_key(), chord.frequency, chord.quality);
        }

        for frame in 0..total {
            let t = frame as f64 / sample_rate;
            if frame % tick_every == 0 {
                while let Some(step) = pending.next_if(|m| m.at <= t) {
                    debug!(at = step.at, target = %step.target, "score move");
                    controller.set_target(step.target);
                }
                controller.drive(engine);
            }
            if !released && t >= release_at {
                for chord in &self.chords {
                    engine.release(&chord.trigger_key());
                }
                released = true;
            }
            sink(engine.process() as f32)?;
        }

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SynthConfig;
    use crate::mapping::Zone;

    fn binding(config: &SynthConfig, key: char) -> ChordBinding {
        config.chord(key).unwrap().clone()
    }

    #[test]
    fn test_parse_move() {
        let step: ScoreMove = "1.5:0.9,-0.9".parse().unwrap();
        assert_eq!(step.at, 1.5);
        assert_eq!(step.target, ModulationVector::new(0.9, -0.9));
    }

    #[test]
    fn test_parse_move_clamps_target() {
        let step: ScoreMove = "0:3,-3".parse().unwrap();
        assert_eq!(step.target, ModulationVector::new(1.0, -1.0));
    }

    #[test]
    fn test_parse_move_errors() {
        assert!(matches!("1.5".parse::<ScoreMove>(), Err(ScoreError::Syntax(_))));
        assert!(matches!("1:0.5".parse::<ScoreMove>(), Err(ScoreError::Syntax(_))));
        assert!(matches!("x:0,0".parse::<ScoreMove>(), Err(ScoreError::Value { .. })));
        assert!(matches!("-1:0,0".parse::<ScoreMove>(), Err(ScoreError::Value { .. })));
        assert!(matches!("1:nan,0".parse::<ScoreMove>(), Err(ScoreError::Value { .. })));
    }

    #[test]
    fn test_moves_kept_in_time_order() {
        let score = Score::new(2.0)
            .with_move("1:0,1".parse().unwrap())
            .with_move("0.5:1,0".parse().unwrap());
        let times: Vec<f64> = score.moves().iter().map(|m| m.at).collect();
        assert_eq!(times, vec![0.5, 1.0]);
    }

    #[test]
    fn test_render_writes_every_sample() {
        let config = SynthConfig::default();
        let score = Score::new(0.5).with_chord(binding(&config, 'j'));
        let mut engine = Engine::new(config);

        let mut samples = Vec::new();
        let written = score
            .render(&mut engine, |s| {
                samples.push(s);
                Ok(())
            })
            .unwrap();

        assert_eq!(written, 22050);
        assert_eq!(samples.len(), 22050);
        assert!(samples.iter().any(|s| s.abs() > 0.01));
        // Released so the tail stops right at the end
        assert_eq!(engine.active_count(), 0);
        assert_eq!(engine.tail_count(), 1);
        engine.process();
        assert_eq!(engine.tail_count(), 0);
    }

    #[test]
    fn test_short_take_holds_before_release() {
        let config = SynthConfig::default();
        let score = Score::new(0.1).with_chord(binding(&config, 'u'));
        let mut engine = Engine::new(config);

        let mut held = Vec::new();
        score
            .render(&mut engine, |s| {
                held.push(s);
                Ok(())
            })
            .unwrap();

        assert_eq!(held.len(), 4410);
        assert!(held.iter().any(|s| s.abs() > 0.01));
        // Held past the attack, released before the take ends
        assert_eq!(engine.active_count(), 0);
        assert_eq!(engine.tail_count(), 1);
    }

    #[test]
    fn test_render_follows_moves() {
        let config = SynthConfig::default();
        let score = Score::new(1.0).with_move("0.1:0.9,0.9".parse().unwrap());
        let mut engine = Engine::new(config);
        score.render(&mut engine, |_| Ok(())).unwrap();
        assert_eq!(engine.modulation().zone(), Some(Zone::UpRight));
    }

    #[test]
    fn test_render_stops_on_sink_error() {
        let config = SynthConfig::default();
        let score = Score::new(1.0);
        let mut engine = Engine::new(config);
        let mut count = 0;
        let result = score.render(&mut engine, |_| {
            count += 1;
            if count == 10 {
                anyhow::bail!("disk full");
            }
            Ok(())
        });
        assert!(result.is_err());
        assert_eq!(count, 10);
    }
}
