/// Keyboard events and their mapping to per-entity velocity.
///
/// Hosts translate their native events into `KeyEvent` and feed them to
/// `InputState::handle`. The state never touches the scene; the frame
/// driver reads it once per frame.
use std::collections::HashSet;

use nalgebra::Vector3;

/// Keys known to the input mapper; anything else arrives as `Other`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Tab,
    Escape,
    /// A printable key, lowercase
    Char(char),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press,
    Repeat,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub action: KeyAction,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key, action: KeyAction) -> Self {
        Self {
            key,
            action,
            modifiers: Modifiers::default(),
        }
    }

    pub fn press(key: Key) -> Self {
        Self::new(key, KeyAction::Press)
    }

    pub fn release(key: Key) -> Self {
        Self::new(key, KeyAction::Release)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Linear,
    Angular,
}

/// A pair of opposing keys driving one velocity component
struct AxisBinding {
    channel: Channel,
    axis: usize,
    negative: Key,
    positive: Key,
}

static BINDINGS: [AxisBinding; 5] = [
    AxisBinding {
        channel: Channel::Angular,
        axis: 1,
        negative: Key::Left,
        positive: Key::Right,
    },
    AxisBinding {
        channel: Channel::Angular,
        axis: 0,
        negative: Key::Up,
        positive: Key::Down,
    },
    AxisBinding {
        channel: Channel::Linear,
        axis: 0,
        negative: Key::Char('a'),
        positive: Key::Char('d'),
    },
    AxisBinding {
        channel: Channel::Linear,
        axis: 1,
        negative: Key::Char('q'),
        positive: Key::Char('e'),
    },
    AxisBinding {
        channel: Channel::Linear,
        axis: 2,
        negative: Key::Char('w'),
        positive: Key::Char('s'),
    },
];

fn binding_for(key: Key) -> Option<(&'static AxisBinding, f32)> {
    BINDINGS.iter().find_map(|b| {
        if b.negative == key {
            Some((b, -1.0))
        } else if b.positive == key {
            Some((b, 1.0))
        } else {
            None
        }
    })
}

/// Held keys, the velocity they produce and the current target entity
#[derive(Debug, Clone)]
pub struct InputState {
    held: HashSet<Key>,
    linear: Vector3<f32>,
    angular: Vector3<f32>,
    target: usize,
    entity_count: usize,
    close_requested: bool,
    linear_step: f32,
    angular_step: f32,
}

impl InputState {
    /// `entity_count` is the number of entities the target can cycle through
    pub fn new(entity_count: usize, linear_step: f32, angular_step: f32) -> Self {
        Self {
            held: HashSet::new(),
            linear: Vector3::zeros(),
            angular: Vector3::zeros(),
            target: 0,
            entity_count: entity_count.max(1),
            close_requested: false,
            linear_step,
            angular_step,
        }
    }

    pub fn handle(&mut self, event: KeyEvent) {
        let key = match event.key {
            Key::Char(c) => Key::Char(c.to_ascii_lowercase()),
            key => key,
        };

        match event.action {
            KeyAction::Press | KeyAction::Repeat => {
                if let Some((binding, sign)) = binding_for(key) {
                    self.held.insert(key);
                    self.set_component(binding, sign);
                }
                match key {
                    Key::Tab if event.action == KeyAction::Press => self.cycle_target(),
                    Key::Escape => self.close_requested = true,
                    Key::Char('c') if event.modifiers.control => self.close_requested = true,
                    _ => {}
                }
            }
            KeyAction::Release => {
                if let Some((binding, sign)) = binding_for(key) {
                    self.held.remove(&key);
                    let opposite = if sign < 0.0 {
                        binding.positive
                    } else {
                        binding.negative
                    };
                    let remaining = if self.held.contains(&opposite) { -sign } else { 0.0 };
                    self.set_component(binding, remaining);
                }
            }
        }
    }

    /// Release every held key, for hosts that never report releases
    pub fn release_all_taps(&mut self) {
        self.held.clear();
        self.linear = Vector3::zeros();
        self.angular = Vector3::zeros();
    }

    fn set_component(&mut self, binding: &AxisBinding, sign: f32) {
        match binding.channel {
            Channel::Linear => self.linear[binding.axis] = sign * self.linear_step,
            Channel::Angular => self.angular[binding.axis] = sign * self.angular_step,
        }
    }

    fn cycle_target(&mut self) {
        self.target = (self.target + 1) % self.entity_count;
        tracing::debug!(entity = self.target, "input target changed");
    }

    pub fn linear_velocity(&self) -> Vector3<f32> {
        self.linear
    }

    pub fn angular_velocity(&self) -> Vector3<f32> {
        self.angular
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn close_requested(&self) -> bool {
        self.close_requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(entities: usize) -> InputState {
        InputState::new(entities, 0.01, 1.0)
    }

    #[test]
    fn test_release_keeps_opposite_held_key() {
        let mut input = state(3);
        input.handle(KeyEvent::press(Key::Right));
        input.handle(KeyEvent::press(Key::Left));
        assert_eq!(input.angular_velocity().y, -1.0);

        input.handle(KeyEvent::release(Key::Left));
        assert_eq!(input.angular_velocity().y, 1.0);

        input.handle(KeyEvent::release(Key::Right));
        assert_eq!(input.angular_velocity().y, 0.0);
    }

    #[test]
    fn test_release_without_opposite_zeroes_axis() {
        let mut input = state(3);
        input.handle(KeyEvent::press(Key::Char('w')));
        assert_eq!(input.linear_velocity(), Vector3::new(0.0, 0.0, -0.01));
        input.handle(KeyEvent::new(Key::Char('w'), KeyAction::Repeat));
        assert_eq!(input.linear_velocity(), Vector3::new(0.0, 0.0, -0.01));
        input.handle(KeyEvent::release(Key::Char('w')));
        assert_eq!(input.linear_velocity(), Vector3::zeros());
    }

    #[test]
    fn test_axes_are_independent() {
        let mut input = state(3);
        input.handle(KeyEvent::press(Key::Char('D')));
        input.handle(KeyEvent::press(Key::Char('e')));
        input.handle(KeyEvent::press(Key::Down));
        assert_eq!(input.linear_velocity(), Vector3::new(0.01, 0.01, 0.0));
        assert_eq!(input.angular_velocity(), Vector3::new(1.0, 0.0, 0.0));

        input.handle(KeyEvent::release(Key::Char('d')));
        assert_eq!(input.linear_velocity(), Vector3::new(0.0, 0.01, 0.0));
    }

    #[test]
    fn test_target_cycles_and_wraps() {
        let mut input = state(3);
        input.handle(KeyEvent::press(Key::Tab));
        input.handle(KeyEvent::press(Key::Tab));
        assert_eq!(input.target(), 2);

        input.handle(KeyEvent::press(Key::Tab));
        assert_eq!(input.target(), 0);

        // Auto-repeat of the cycle key does not skip entities
        input.handle(KeyEvent::new(Key::Tab, KeyAction::Repeat));
        assert_eq!(input.target(), 0);
    }

    #[test]
    fn test_close_requests() {
        let mut input = state(1);
        input.handle(KeyEvent::press(Key::Char('c')));
        assert!(!input.close_requested());

        let mut ctrl_c = KeyEvent::press(Key::Char('c'));
        ctrl_c.modifiers.control = true;
        input.handle(ctrl_c);
        assert!(input.close_requested());

        let mut input = state(1);
        input.handle(KeyEvent::press(Key::Escape));
        assert!(input.close_requested());
    }

    #[test]
    fn test_release_all_taps() {
        let mut input = state(2);
        input.handle(KeyEvent::press(Key::Left));
        input.handle(KeyEvent::press(Key::Char('a')));
        input.release_all_taps();
        assert_eq!(input.linear_velocity(), Vector3::zeros());
        assert_eq!(input.angular_velocity(), Vector3::zeros());

        // A later release of a tapped key is harmless
        input.handle(KeyEvent::release(Key::Left));
        assert_eq!(input.angular_velocity(), Vector3::zeros());
    }
}
