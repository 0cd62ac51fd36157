use std::collections::HashMap;

use crate::input::KeyCode;
use glam::Vec3;

/// Maps keys to movement directions and stores all camera-motion parameters.
///
/// This is the **user-facing** configuration struct.  Place it on a `Camera`
/// and the renderer's orbit state picks up every setting automatically.
///
/// # Example
/// ```rust,ignore
/// use umbra_core::scene::Controller;
/// use umbra_core::input::KeyCode;
/// use glam::Vec3;
///
/// let mut controller = Controller::new();
/// controller.bind(KeyCode::ArrowUp,   Vec3::new(0.0, 0.0,  1.0));
/// controller.bind(KeyCode::ArrowDown, Vec3::new(0.0, 0.0, -1.0));
/// controller.pan_speed = 4.0;
/// ```
#[derive(Debug, Clone)]
pub struct Controller {
    /// Key → camera-space direction mappings (+Z forward, +X right).
    mappings: HashMap<KeyCode, Vec3>,

    /// Point-of-interest translation speed in world-units per second.
    ///
    /// Default: `2.0`
    pub pan_speed: f32,

    /// Orbit angle swept by a drag across the full viewport width (radians).
    ///
    /// Default: `2π`
    pub orbit_speed: f32,

    /// Orbit radius change per wheel line.
    ///
    /// Default: `1.2`
    pub zoom_per_line: f32,

    /// Closest the eye may get to the point of interest.
    ///
    /// Default: `1.0`
    pub min_distance: f32,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    /// Creates an empty controller with no key bindings and default parameters.
    pub fn new() -> Self {
        Self {
            mappings:      HashMap::new(),
            pan_speed:     2.0,
            orbit_speed:   std::f32::consts::TAU,
            zoom_per_line: 1.2,
            min_distance:  1.0,
        }
    }

    /// WASD layout with default parameters.
    pub fn with_default_wasd() -> Self {
        let mut ctl = Self::new();
        ctl.bind(KeyCode::KeyW, Vec3::new( 0.0, 0.0,  1.0));
        ctl.bind(KeyCode::KeyS, Vec3::new( 0.0, 0.0, -1.0));
        ctl.bind(KeyCode::KeyA, Vec3::new(-1.0, 0.0,  0.0));
        ctl.bind(KeyCode::KeyD, Vec3::new( 1.0, 0.0,  0.0));
        ctl
    }

    /// Binds `key` to a camera-space direction.  Rebinding overwrites.
    pub fn bind(&mut self, key: KeyCode, dir: Vec3) {
        self.mappings.insert(key, dir);
    }

    /// Removes the binding for `key`, if any.
    pub fn unbind(&mut self, key: KeyCode) {
        self.mappings.remove(&key);
    }

    /// Returns the combined movement direction for the keys currently held.
    ///
    /// The result is the sum of bound directions whose keys are pressed and
    /// is not normalised, so holding W and D pans diagonally faster, exactly
    /// like two independent axes.
    pub fn direction(&self, input: &crate::input::InputState) -> Vec3 {
        let mut out = Vec3::ZERO;
        for (key, dir) in &self.mappings {
            if input.is_key_pressed(*key) {
                out += *dir;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputState;

    #[test]
    fn opposite_keys_cancel() {
        let ctl = Controller::with_default_wasd();
        let mut input = InputState::new();
        input.update_key(KeyCode::KeyW, true);
        assert_eq!(ctl.direction(&input), Vec3::Z);
        input.update_key(KeyCode::KeyS, true);
        assert_eq!(ctl.direction(&input), Vec3::ZERO);
    }

    #[test]
    fn unbound_key_is_ignored() {
        let mut ctl = Controller::with_default_wasd();
        ctl.unbind(KeyCode::KeyD);
        let mut input = InputState::new();
        input.update_key(KeyCode::KeyD, true);
        assert_eq!(ctl.direction(&input), Vec3::ZERO);
    }
}
