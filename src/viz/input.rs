//! Keyboard performance: chord keys, steering keys and the sub toggle

use std::collections::HashSet;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::debug;

use crate::config::{ChordBinding, SynthConfig};
use crate::control::{Direction, XyController};
use crate::engine::Engine;

/// Key toggling the sub generator
pub const SUB_KEY: char = 'b';

/// How key presses map to note lifetimes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Press starts, release stops; needs key release events
    Held,
    /// Each press flips the key on or off
    Latched,
}

/// What the event loop should do after a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Translates key events into engine calls
#[derive(Debug)]
pub struct Performer {
    bindings: Vec<ChordBinding>,
    mode: InputMode,
    controller: XyController,
    sounding: HashSet<char>,
}

impl Performer {
    pub fn new(config: &SynthConfig, mode: InputMode) -> Self {
        Self {
            bindings: config.chords.clone(),
            mode,
            controller: XyController::new(&config.controller),
            sounding: HashSet::new(),
        }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn bindings(&self) -> &[ChordBinding] {
        &self.bindings
    }

    pub fn controller(&self) -> &XyController {
        &self.controller
    }

    /// Whether the chord bound to `key` is down
    pub fn is_sounding(&self, key: char) -> bool {
        self.sounding.contains(&key)
    }

    /// Advance the controller one frame and forward movement to the engine
    pub fn tick(&mut self, engine: &mut Engine) -> bool {
        self.controller.drive(engine)
    }

    /// Apply one key event
    pub fn handle(&mut self, key: KeyEvent, engine: &mut Engine) -> Flow {
        if key.kind == KeyEventKind::Repeat {
            return Flow::Continue;
        }
        let pressed = key.kind == KeyEventKind::Press;

        match key.code {
            KeyCode::Esc if pressed => return Flow::Quit,
            KeyCode::Char('c') if pressed && key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Flow::Quit
            }
            KeyCode::Char(c) => {
                let c = c.to_ascii_lowercase();
                if c == SUB_KEY {
                    if pressed {
                        engine.set_sub_enabled(!engine.sub_enabled());
                    }
                } else if let Some(direction) = Direction::from_key(c) {
                    self.steer(direction, pressed);
                } else if let Some(binding) = self.binding(c) {
                    self.play(binding, pressed, engine);
                }
            }
            _ => {}
        }
        Flow::Continue
    }

    /// Stop every chord this performer started
    pub fn release_all(&mut self, engine: &mut Engine) {
        for key in self.sounding.drain() {
            engine.release(&key.to_string());
        }
    }

    fn binding(&self, key: char) -> Option<ChordBinding> {
        self.bindings.iter().find(|b| b.key == key).cloned()
    }

    fn steer(&mut self, direction: Direction, pressed: bool) {
        match (self.mode, pressed) {
            (InputMode::Held, true) => self.controller.press(direction),
            (InputMode::Held, false) => self.controller.release(direction),
            (InputMode::Latched, true) => self.controller.toggle(direction),
            (InputMode::Latched, false) => {}
        }
    }

    fn play(&mut self, binding: ChordBinding, pressed: bool, engine: &mut Engine) {
        let start = match (self.mode, pressed) {
            (InputMode::Held, pressed) => pressed,
            (InputMode::Latched, true) => !self.sounding.contains(&binding.key),
            (InputMode::Latched, false) => return,
        };
        let trigger = binding.trigger_key();
        if start {
            if engine.attack(&trigger, binding.frequency, binding.quality) {
                debug!(key = %binding.key, chord = %binding.name, "chord on");
            }
            self.sounding.insert(binding.key);
        } else {
            engine.release(&trigger);
            self.sounding.remove(&binding.key);
        }
    }
}
