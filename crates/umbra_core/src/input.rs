use std::collections::HashSet;

/// Re-exported key and mouse enums from `winit` for convenience.
// winit 0.30 moved `KeyCode` under `winit::keyboard`.  We keep the simple
// alias so callers don't need to know about the upstream layout.
pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;

/// State of the keyboard and mouse at a given moment.
///
/// The app runner drives this structure by feeding it the events coming
/// from `winit`.  Once populated, the renderer and the viewer query it with
/// the helpers below.  Edge-triggered state (`just_pressed`, wheel, mouse
/// delta) is cleared by [`InputState::end_frame`].
#[derive(Default)]
pub struct InputState {
    keys_down: HashSet<KeyCode>,
    keys_pressed_this_frame: HashSet<KeyCode>,
    mouse_buttons: HashSet<MouseButton>,
    mouse_pos: (f64, f64),
    /// movement since last time `consume_mouse_delta` was called
    mouse_delta: (f32, f32),
    /// accumulated wheel movement in "lines" since the last `consume_scroll`
    scroll: f32,
}

impl InputState {
    /// Creates a fresh, empty input state.
    pub fn new() -> Self {
        Default::default()
    }

    /// Called by the event loop when a keyboard event arrives.
    ///
    /// OS key-repeat events for a key that is already down do not count as a
    /// new press.
    pub fn update_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            if self.keys_down.insert(key) {
                self.keys_pressed_this_frame.insert(key);
            }
        } else {
            self.keys_down.remove(&key);
        }
    }

    /// Returns true if the given key is currently pressed down.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns true only on the frame the key went down.
    pub fn just_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed_this_frame.contains(&key)
    }

    /// Called by the event loop when a mouse button event arrives.
    pub fn update_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            self.mouse_buttons.insert(button);
        } else {
            self.mouse_buttons.remove(&button);
        }
    }

    /// Returns true if the given mouse button is currently held.
    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.mouse_buttons.contains(&button)
    }

    /// Update the current mouse cursor position (window coordinates).
    ///
    /// Movement accumulates until consumed so that several cursor events in
    /// one frame are not lost.
    pub fn set_mouse_position(&mut self, x: f64, y: f64) {
        let (px, py) = self.mouse_pos;
        self.mouse_pos = (x, y);
        self.mouse_delta.0 += (x - px) as f32;
        self.mouse_delta.1 += (y - py) as f32;
    }

    /// Retrieve the last recorded mouse position.
    pub fn mouse_position(&self) -> (f64, f64) {
        self.mouse_pos
    }

    /// Retrieve and reset the mouse movement delta (in pixels) since the
    /// last call. This is useful for applying camera rotations.
    pub fn consume_mouse_delta(&mut self) -> (f32, f32) {
        let d = self.mouse_delta;
        self.mouse_delta = (0.0, 0.0);
        d
    }

    /// Accumulates wheel movement.  Positive values scroll away from the user.
    pub fn add_scroll(&mut self, lines: f32) {
        self.scroll += lines;
    }

    /// Retrieve and reset the accumulated wheel movement.
    pub fn consume_scroll(&mut self) -> f32 {
        std::mem::take(&mut self.scroll)
    }

    /// Clears per-frame edge state.  Call once after all systems have read
    /// the input for the current frame.
    pub fn end_frame(&mut self) {
        self.keys_pressed_this_frame.clear();
        self.mouse_delta = (0.0, 0.0);
        self.scroll = 0.0;
    }
}

// simple unit tests for the input state implementation
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_tracking() {
        let mut state = InputState::new();
        assert!(!state.is_key_pressed(KeyCode::KeyA));
        state.update_key(KeyCode::KeyA, true);
        assert!(state.is_key_pressed(KeyCode::KeyA));
        state.update_key(KeyCode::KeyA, false);
        assert!(!state.is_key_pressed(KeyCode::KeyA));
    }

    #[test]
    fn just_pressed_is_edge_triggered() {
        let mut state = InputState::new();
        state.update_key(KeyCode::Space, true);
        assert!(state.just_pressed(KeyCode::Space));
        state.end_frame();
        assert!(!state.just_pressed(KeyCode::Space));
        // key repeat while held is not a new press
        state.update_key(KeyCode::Space, true);
        assert!(!state.just_pressed(KeyCode::Space));
        assert!(state.is_key_pressed(KeyCode::Space));
    }

    #[test]
    fn mouse_tracking() {
        let mut state = InputState::new();
        assert!(!state.is_button_down(MouseButton::Left));
        state.update_mouse_button(MouseButton::Left, true);
        assert!(state.is_button_down(MouseButton::Left));
        state.update_mouse_button(MouseButton::Left, false);
        assert!(!state.is_button_down(MouseButton::Left));
        state.set_mouse_position(10.0, 20.0);
        assert_eq!(state.mouse_position(), (10.0, 20.0));
        state.consume_mouse_delta();
        // delta should reflect movement
        state.set_mouse_position(15.0, 25.0);
        assert_eq!(state.consume_mouse_delta(), (5.0, 5.0));
        // consumption resets
        assert_eq!(state.consume_mouse_delta(), (0.0, 0.0));
    }

    #[test]
    fn scroll_accumulates_until_consumed() {
        let mut state = InputState::new();
        state.add_scroll(1.0);
        state.add_scroll(2.0);
        assert_eq!(state.consume_scroll(), 3.0);
        assert_eq!(state.consume_scroll(), 0.0);
    }
}
