/// Orbit camera driven by a [`umbra_core::scene::Controller`].
///
/// The eye sits on a sphere of radius `radius` around the point of interest
/// `poi`.  `phi` is the angle in the XZ plane, `theta` the elevation above
/// it.  WASD pans `poi` along the camera's ground-projected axes, a
/// right-drag orbits and the wheel zooms.  Tunables live in
/// `camera.controller`.
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use glam::Vec3;
use umbra_core::input::{InputState, MouseButton};
use umbra_core::scene::Camera;

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitState {
    pub poi: Vec3,
    pub radius: f32,
    pub phi: f32,
    pub theta: f32,
}

impl Default for OrbitState {
    fn default() -> Self {
        Self {
            poi: Vec3::ZERO,
            radius: 5.0,
            phi: -FRAC_PI_4,
            theta: FRAC_PI_4,
        }
    }
}

fn spherical(theta: f32, phi: f32) -> Vec3 {
    Vec3::new(theta.cos() * phi.cos(), theta.sin(), theta.cos() * phi.sin())
}

impl OrbitState {
    /// Unit vector from the point of interest to the eye.
    pub fn offset_dir(&self) -> Vec3 {
        spherical(self.theta, self.phi)
    }

    /// Camera up vector, perpendicular to the view direction.
    pub fn up(&self) -> Vec3 {
        spherical(self.theta + FRAC_PI_2, self.phi)
    }

    /// Forward and right for panning, flattened onto the ground plane.
    ///
    /// Looking straight down, the view direction has no horizontal part, so
    /// forward falls back to the flattened up vector.
    pub fn ground_axes(&self) -> (Vec3, Vec3) {
        let dir = -self.offset_dir();
        let up = self.up();
        let right = (dir.cross(up) * Vec3::new(1.0, 0.0, 1.0)).normalize_or_zero();
        let forward = if dir.x.abs() > 1e-5 || dir.z.abs() > 1e-5 {
            Vec3::new(dir.x, 0.0, dir.z)
        } else {
            Vec3::new(up.x, 0.0, up.z)
        };
        (forward.normalize_or_zero(), right)
    }

    /// Writes eye / target / up into `camera`.
    pub fn apply(&self, camera: &mut Camera) {
        camera.target = self.poi;
        camera.eye = self.poi + self.offset_dir() * self.radius;
        camera.up = self.up();
    }

    /// Applies one frame of input to the orbit and then to `camera`.
    ///
    /// `dt` is elapsed seconds, `viewport_width` scales drag deltas so a drag
    /// across the whole window turns by `controller.orbit_speed`.
    pub fn update(&mut self, camera: &mut Camera, input: &mut InputState, dt: f32, viewport_width: u32) {
        let ctl = &camera.controller;

        // WASD pan of the point of interest
        let pan = ctl.direction(input);
        if pan.length_squared() > 1e-6 {
            let (forward, right) = self.ground_axes();
            self.poi += (forward * pan.z + right * pan.x) * ctl.pan_speed * dt;
        }

        // right-drag orbit
        let (dx, dy) = input.consume_mouse_delta();
        if input.is_button_down(MouseButton::Right) && viewport_width > 0 {
            let scale = ctl.orbit_speed / viewport_width as f32;
            self.phi -= dx * scale;
            self.theta = (self.theta + dy * scale).clamp(-FRAC_PI_2, FRAC_PI_2);
        }

        // wheel zoom
        let lines = input.consume_scroll();
        if lines != 0.0 {
            self.radius = (self.radius - lines * ctl.zoom_per_line).max(ctl.min_distance);
        }

        self.apply(camera);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_core::input::KeyCode;

    #[test]
    fn default_eye_is_radius_away_from_poi() {
        let orbit = OrbitState::default();
        let mut cam = Camera::default();
        orbit.apply(&mut cam);
        assert!(((cam.eye - cam.target).length() - 5.0).abs() < 1e-5);
        assert!(cam.up.dot(cam.eye - cam.target).abs() < 1e-5);
    }

    #[test]
    fn zoom_clamps_at_min_distance() {
        let mut orbit = OrbitState::default();
        let mut cam = Camera::default();
        let mut input = InputState::new();
        input.add_scroll(100.0);
        orbit.update(&mut cam, &mut input, 0.016, 800);
        assert_eq!(orbit.radius, cam.controller.min_distance);
    }

    #[test]
    fn full_width_drag_turns_a_full_circle() {
        let mut orbit = OrbitState::default();
        let before = orbit.phi;
        let mut cam = Camera::default();
        let mut input = InputState::new();
        input.update_mouse_button(MouseButton::Right, true);
        input.set_mouse_position(0.0, 0.0);
        input.consume_mouse_delta();
        input.set_mouse_position(800.0, 0.0);
        orbit.update(&mut cam, &mut input, 0.016, 800);
        assert!((before - orbit.phi - std::f32::consts::TAU).abs() < 1e-4);
    }

    #[test]
    fn elevation_is_clamped() {
        let mut orbit = OrbitState::default();
        let mut cam = Camera::default();
        let mut input = InputState::new();
        input.update_mouse_button(MouseButton::Right, true);
        input.set_mouse_position(0.0, 10_000.0);
        orbit.update(&mut cam, &mut input, 0.016, 100);
        assert_eq!(orbit.theta, FRAC_PI_2);
    }

    #[test]
    fn forward_pan_moves_poi_horizontally_towards_view() {
        let mut orbit = OrbitState::default();
        let mut cam = Camera::default();
        let mut input = InputState::new();
        input.update_key(KeyCode::KeyW, true);
        orbit.update(&mut cam, &mut input, 1.0, 800);
        assert_eq!(orbit.poi.y, 0.0);
        assert!((orbit.poi.length() - cam.controller.pan_speed).abs() < 1e-4);
        // moved away from the eye's side
        assert!(orbit.poi.dot(orbit.offset_dir()) < 0.0);
    }

    #[test]
    fn right_axis_matches_view_matrix() {
        let orbit = OrbitState::default();
        let mut cam = Camera::default();
        orbit.apply(&mut cam);
        let (_, right) = orbit.ground_axes();
        // +X in view space maps to the camera's right
        let view_right = cam.view_matrix().inverse().transform_vector3(Vec3::X);
        assert!(right.dot(view_right) > 0.99);
    }
}
