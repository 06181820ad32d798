/// Platform-agnostic input handling system
use std::cell::RefCell;
use std::rc::Rc;

/// Platform-independent input events
#[derive(Debug, Clone)]
pub enum InputEvent {
    // Keyboard events
    KeyDown(String),
    KeyUp(String),

    // Mouse events
    MouseMove { dx: f32, dy: f32 },
    MouseDown(MouseButton),
    MouseUp(MouseButton),

    // Window events
    FocusLost,
    PointerLockChanged { locked: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub fn from_web_button(button: i16) -> Self {
        match button {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            _ => MouseButton::Left,
        }
    }
}

/// The five logical actions the game recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Forward,
    Backward,
    Left,
    Right,
    Sprint,
}

/// Fixed key mapping. Matching is case-insensitive; keys outside the map are
/// ignored.
#[derive(Clone)]
pub struct KeyMap {
    pub forward: &'static str,
    pub backward: &'static str,
    pub left: &'static str,
    pub right: &'static str,
    pub sprint: &'static str,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            forward: "w",
            backward: "s",
            left: "a",
            right: "d",
            sprint: "shift",
        }
    }
}

impl KeyMap {
    pub fn action(&self, key: &str) -> Option<Action> {
        if key.eq_ignore_ascii_case(self.forward) {
            Some(Action::Forward)
        } else if key.eq_ignore_ascii_case(self.backward) {
            Some(Action::Backward)
        } else if key.eq_ignore_ascii_case(self.left) {
            Some(Action::Left)
        } else if key.eq_ignore_ascii_case(self.right) {
            Some(Action::Right)
        } else if key.eq_ignore_ascii_case(self.sprint) {
            Some(Action::Sprint)
        } else {
            None
        }
    }
}

/// Held-action flags plus the per-frame mouse state. Written only by
/// `process_event`, read once per frame by the frame loop.
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub sprint: bool,
    pub look_delta: (f32, f32),
    pub pointer_locked: bool,
    keymap: KeyMap,
    fire_pending: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            forward: false,
            backward: false,
            left: false,
            right: false,
            sprint: false,
            look_delta: (0.0, 0.0),
            pointer_locked: false,
            keymap: KeyMap::default(),
            fire_pending: false,
        }
    }

    /// Process an input event and update state. Last write wins per key.
    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => {
                if let Some(action) = self.keymap.action(key) {
                    self.set_held(action, true);
                }
            }
            InputEvent::KeyUp(key) => {
                if let Some(action) = self.keymap.action(key) {
                    self.set_held(action, false);
                }
            }
            InputEvent::MouseMove { dx, dy } => {
                if self.pointer_locked {
                    self.look_delta.0 += dx;
                    self.look_delta.1 += dy;
                }
            }
            InputEvent::MouseDown(MouseButton::Left) => {
                self.fire_pending = true;
            }
            InputEvent::MouseDown(_) | InputEvent::MouseUp(_) => {}
            InputEvent::FocusLost => {
                self.clear_actions();
            }
            InputEvent::PointerLockChanged { locked } => {
                self.pointer_locked = *locked;
            }
        }
    }

    fn set_held(&mut self, action: Action, held: bool) {
        match action {
            Action::Forward => self.forward = held,
            Action::Backward => self.backward = held,
            Action::Left => self.left = held,
            Action::Right => self.right = held,
            Action::Sprint => self.sprint = held,
        }
    }

    pub fn is_held(&self, action: Action) -> bool {
        match action {
            Action::Forward => self.forward,
            Action::Backward => self.backward,
            Action::Left => self.left,
            Action::Right => self.right,
            Action::Sprint => self.sprint,
        }
    }

    pub fn clear_actions(&mut self) {
        self.forward = false;
        self.backward = false;
        self.left = false;
        self.right = false;
        self.sprint = false;
    }

    /// Accumulated mouse-look delta since the last frame.
    pub fn consume_look(&mut self) -> (f32, f32) {
        let result = self.look_delta;
        self.look_delta = (0.0, 0.0);
        result
    }

    /// True if a fire press arrived since the last call.
    pub fn take_fire(&mut self) -> bool {
        std::mem::take(&mut self.fire_pending)
    }
}

/// Event queue owned by the session. Listeners push into it from their
/// callbacks; the frame loop drains it exactly once per frame, so all state
/// mutation happens inside the update pass.
#[derive(Clone)]
pub struct EventQueue {
    inner: Rc<RefCell<Vec<InputEvent>>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn push(&self, event: InputEvent) {
        self.inner.borrow_mut().push(event);
    }

    pub fn drain_into(&self, state: &mut InputState) {
        for event in self.inner.borrow_mut().drain(..) {
            state.process_event(&event);
        }
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_w_press_release_touches_only_forward() {
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown("w".into()));
        assert!(input.forward);
        assert!(!input.backward && !input.left && !input.right && !input.sprint);

        input.process_event(&InputEvent::KeyUp("w".into()));
        assert!(!input.forward);
    }

    #[test]
    fn test_key_matching_is_case_insensitive() {
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown("W".into()));
        assert!(input.forward);
        input.process_event(&InputEvent::KeyDown("Shift".into()));
        assert!(input.sprint);
        input.process_event(&InputEvent::KeyUp("SHIFT".into()));
        assert!(!input.sprint);
    }

    #[test]
    fn test_unrecognized_keys_are_ignored() {
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown("Escape".into()));
        input.process_event(&InputEvent::KeyDown("x".into()));
        input.process_event(&InputEvent::KeyDown(" ".into()));
        assert!(!input.forward && !input.backward && !input.left && !input.right && !input.sprint);
    }

    #[test]
    fn test_last_write_wins_per_key() {
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown("a".into()));
        input.process_event(&InputEvent::KeyDown("a".into()));
        input.process_event(&InputEvent::KeyUp("a".into()));
        assert!(!input.left);
    }

    #[test]
    fn test_focus_loss_clears_held_actions() {
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown("w".into()));
        input.process_event(&InputEvent::KeyDown("d".into()));
        input.process_event(&InputEvent::FocusLost);
        assert!(!input.forward && !input.right);
    }

    #[test]
    fn test_look_delta_accumulates_only_while_locked() {
        let mut input = InputState::new();
        input.process_event(&InputEvent::MouseMove { dx: 3.0, dy: -1.0 });
        assert_eq!(input.consume_look(), (0.0, 0.0));

        input.process_event(&InputEvent::PointerLockChanged { locked: true });
        input.process_event(&InputEvent::MouseMove { dx: 3.0, dy: -1.0 });
        input.process_event(&InputEvent::MouseMove { dx: 2.0, dy: 2.0 });
        assert_eq!(input.consume_look(), (5.0, 1.0));
        assert_eq!(input.consume_look(), (0.0, 0.0), "consume resets the accumulator");
    }

    #[test]
    fn test_fire_edge_is_taken_once() {
        let mut input = InputState::new();
        assert!(!input.take_fire());
        input.process_event(&InputEvent::MouseDown(MouseButton::Left));
        assert!(input.take_fire());
        assert!(!input.take_fire());

        // Right button does not fire
        input.process_event(&InputEvent::MouseDown(MouseButton::Right));
        assert!(!input.take_fire());
    }

    #[test]
    fn test_queue_drains_in_order() {
        let queue = EventQueue::new();
        let mut input = InputState::new();
        queue.push(InputEvent::KeyDown("w".into()));
        queue.push(InputEvent::KeyUp("w".into()));
        queue.push(InputEvent::KeyDown("s".into()));
        queue.drain_into(&mut input);
        assert!(!input.forward);
        assert!(input.backward);
    }
}
