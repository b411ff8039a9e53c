//! Smoothed XY controller driven by held directions

use super::{ModulationPort, ModulationVector};
use crate::config::ControllerConfig;

/// One of the four steering directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// w/a/s/d binding
    pub fn from_key(key: char) -> Option<Direction> {
        match key.to_ascii_lowercase() {
            'w' => Some(Direction::Up),
            's' => Some(Direction::Down),
            'a' => Some(Direction::Left),
            'd' => Some(Direction::Right),
            _ => None,
        }
    }

    fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }
}

/// Position that eases toward a target on every tick
#[derive(Debug, Clone)]
pub struct XyController {
    position: ModulationVector,
    held: [bool; 4],
    explicit: Option<ModulationVector>,
    smoothing: f64,
    snap: f64,
}

impl XyController {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            position: ModulationVector::CENTER,
            held: [false; 4],
            explicit: None,
            smoothing: config.smoothing,
            snap: config.snap,
        }
    }

    pub fn position(&self) -> ModulationVector {
        self.position
    }

    pub fn is_held(&self, direction: Direction) -> bool {
        self.held[direction.index()]
    }

    /// Hold a direction; clears any explicit target
    pub fn press(&mut self, direction: Direction) {
        self.explicit = None;
        self.held[direction.index()] = true;
    }

    pub fn release(&mut self, direction: Direction) {
        self.explicit = None;
        self.held[direction.index()] = false;
    }

    /// Flip a direction, for terminals without key release events
    pub fn toggle(&mut self, direction: Direction) {
        if self.is_held(direction) {
            self.release(direction);
        } else {
            self.press(direction);
        }
    }

    /// Steer toward a fixed point instead of the held directions
    pub fn set_target(&mut self, target: ModulationVector) {
        self.held = [false; 4];
        self.explicit = Some(target);
    }

    /// Point the position is easing toward
    pub fn target(&self) -> ModulationVector {
        if let Some(target) = self.explicit {
            return target;
        }
        let axis = |neg: Direction, pos: Direction| {
            f64::from(u8::from(self.is_held(pos))) - f64::from(u8::from(self.is_held(neg)))
        };
        ModulationVector::new(
            axis(Direction::Left, Direction::Right),
            axis(Direction::Down, Direction::Up),
        )
    }

    /// Step once. Returns the new position only when it moved.
    pub fn tick(&mut self) -> Option<ModulationVector> {
        let target = self.target();
        let x = self.ease(self.position.x(), target.x());
        let y = self.ease(self.position.y(), target.y());
        let next = ModulationVector::new(x, y);
        if next == self.position {
            return None;
        }
        self.position = next;
        Some(next)
    }

    /// Tick and forward any movement to `port`
    pub fn drive<P: ModulationPort + ?Sized>(&mut self, port: &mut P) -> bool {
        match self.tick() {
            Some(vector) => {
                port.push_modulation(vector);
                true
            }
            None => false,
        }
    }

    fn ease(&self, current: f64, target: f64) -> f64 {
        let next = current + (target - current) * self.smoothing;
        if (target - next).abs() < self.snap {
            target
        } else {
            next
        }
    }
}
