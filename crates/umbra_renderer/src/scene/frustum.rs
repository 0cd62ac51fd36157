/// Frustum culling: visibility test for instance bounding boxes.
///
/// ## Algorithm
///
/// Given the combined `view_proj` matrix `M`, the six frustum planes can be
/// extracted analytically (Gribb-Hartmann method).  Each plane is stored as a
/// `Vec4(nx, ny, nz, d)` in world space with the inside on the positive side.
///
/// A box is culled when, for at least one plane, all eight of its
/// world-space corners lie strictly behind that plane.  The test never culls
/// a visible box but may keep a box that wraps around a frustum edge.
/// `cull.wgsl` runs the same loop on the GPU.
use glam::{Mat4, Vec3, Vec4};

use crate::scene::bounds::Aabb;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Culled,
}

/// Index of each plane in [`Frustum::planes`].
pub mod plane {
    pub const LEFT: usize = 0;
    pub const RIGHT: usize = 1;
    pub const TOP: usize = 2;
    pub const BOTTOM: usize = 3;
    pub const NEAR: usize = 4;
    pub const FAR: usize = 5;
}

/// Six clip planes extracted from a `view_proj` matrix.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Frustum {
    planes: [Vec4; 6],
}

impl Frustum {
    /// Builds a frustum from explicit planes (`dot(n, p) + d >= 0` inside).
    pub fn from_planes(planes: [Vec4; 6]) -> Self {
        Self { planes }
    }

    /// Extracts the six frustum planes from `view_proj` (column-major).
    ///
    /// Assumes wgpu's `[0, 1]` clip depth, so the near plane is row 2 alone.
    /// Degenerate planes (normal length ≤ 1e-6) are left unnormalised.
    pub fn from_view_proj(vp: &Mat4) -> Self {
        let r0 = vp.row(0);
        let r1 = vp.row(1);
        let r2 = vp.row(2);
        let r3 = vp.row(3);

        let mut planes = [
            r3 + r0, // left
            r3 - r0, // right
            r3 - r1, // top
            r3 + r1, // bottom
            r2,      // near
            r3 - r2, // far
        ];

        for p in &mut planes {
            let len = p.truncate().length();
            if len > 1e-6 {
                *p /= len;
            }
        }

        Self { planes }
    }

    #[inline]
    pub fn planes(&self) -> &[Vec4; 6] {
        &self.planes
    }

    /// Planes in the layout the cull shader's uniform block expects.
    pub fn to_gpu(&self) -> [[f32; 4]; 6] {
        self.planes.map(|p| p.to_array())
    }

    /// Signed distance of `point` to plane `index`; positive is inside.
    #[inline]
    pub fn distance(&self, index: usize, point: Vec3) -> f32 {
        let p = self.planes[index];
        p.truncate().dot(point) + p.w
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        (0..6).all(|i| self.distance(i, point) >= 0.0)
    }

    /// Conservative 8-corner test of a local-space box under `model`.
    pub fn test_box(&self, aabb: &Aabb, model: &Mat4) -> Visibility {
        if aabb.is_empty() {
            return Visibility::Culled;
        }
        let corners = aabb.corners().map(|c| model.transform_point3(c));
        for i in 0..6 {
            if corners.iter().all(|&c| self.distance(i, c) < 0.0) {
                return Visibility::Culled;
            }
        }
        Visibility::Visible
    }

    #[inline]
    pub fn is_box_visible(&self, aabb: &Aabb, model: &Mat4) -> bool {
        self.test_box(aabb, model) == Visibility::Visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn camera_frustum() -> Frustum {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_3, 16.0 / 9.0, 0.1, 100.0);
        Frustum::from_view_proj(&(proj * view))
    }

    fn unit_box() -> Aabb {
        Aabb::new(Vec3::splat(-0.5), Vec3::splat(0.5))
    }

    #[test]
    fn planes_are_normalised_and_point_inward() {
        let f = camera_frustum();
        for p in f.planes() {
            assert!((p.truncate().length() - 1.0).abs() < 1e-4);
        }
        // the look-at target sits inside every plane
        assert!(f.contains_point(Vec3::ZERO));
        // camera looks down -Z: the near plane normal points that way too
        assert!(f.planes()[plane::NEAR].z < 0.0);
        assert!(f.planes()[plane::FAR].z > 0.0);
        assert!(f.planes()[plane::LEFT].x > 0.0);
        assert!(f.planes()[plane::RIGHT].x < 0.0);
        assert!(f.planes()[plane::TOP].y < 0.0);
        assert!(f.planes()[plane::BOTTOM].y > 0.0);
    }

    #[test]
    fn near_and_far_distances_match_projection() {
        let f = camera_frustum();
        // eye at z = 5 looking at -Z: near plane at z = 4.9, far at z = -95
        assert!(f.distance(plane::NEAR, Vec3::new(0.0, 0.0, 4.9)).abs() < 1e-3);
        assert!(f.distance(plane::FAR, Vec3::new(0.0, 0.0, -95.0)).abs() < 1e-2);
    }

    #[test]
    fn box_at_origin_is_visible() {
        let f = camera_frustum();
        assert_eq!(f.test_box(&unit_box(), &Mat4::IDENTITY), Visibility::Visible);
    }

    #[test]
    fn box_behind_distant_near_plane_is_culled() {
        // inside-half-space is z <= -100: near plane 100 units down the view axis
        let mut planes = [Vec4::new(0.0, 0.0, 0.0, 1.0e6); 6];
        planes[plane::NEAR] = Vec4::new(0.0, 0.0, -1.0, -100.0);
        let f = Frustum::from_planes(planes);
        assert_eq!(f.test_box(&unit_box(), &Mat4::IDENTITY), Visibility::Culled);
    }

    #[test]
    fn far_away_box_is_culled() {
        let f = camera_frustum();
        let model = Mat4::from_translation(Vec3::new(0.0, 0.0, -10_000.0));
        assert_eq!(f.test_box(&unit_box(), &model), Visibility::Culled);
        let behind = Mat4::from_translation(Vec3::new(0.0, 0.0, 50.0));
        assert_eq!(f.test_box(&unit_box(), &behind), Visibility::Culled);
    }

    #[test]
    fn straddling_box_is_kept() {
        let f = camera_frustum();
        // centre just outside the left plane but the box reaches inside
        let x = -5.0 * (std::f32::consts::FRAC_PI_6).tan() * 16.0 / 9.0 - 0.3;
        let model = Mat4::from_translation(Vec3::new(x, 0.0, 0.0));
        assert!(f.distance(plane::LEFT, Vec3::new(x, 0.0, 0.0)) < 0.0);
        assert_eq!(f.test_box(&unit_box(), &model), Visibility::Visible);
    }

    #[test]
    fn empty_box_is_never_visible() {
        let f = camera_frustum();
        assert_eq!(f.test_box(&Aabb::EMPTY, &Mat4::IDENTITY), Visibility::Culled);
    }

    #[test]
    fn boxes_with_centre_inside_are_never_culled() {
        let f = camera_frustum();
        let mut rng = StdRng::seed_from_u64(11);
        let mut checked = 0;
        while checked < 500 {
            let centre = Vec3::new(
                rng.gen_range(-40.0..40.0),
                rng.gen_range(-40.0..40.0),
                rng.gen_range(-95.0..5.0),
            );
            if !f.contains_point(centre) {
                continue;
            }
            let half = Vec3::new(
                rng.gen_range(0.01..3.0),
                rng.gen_range(0.01..3.0),
                rng.gen_range(0.01..3.0),
            );
            let model = Mat4::from_translation(centre)
                * Mat4::from_rotation_y(rng.gen_range(0.0..std::f32::consts::TAU));
            let aabb = Aabb::new(-half, half);
            assert_eq!(f.test_box(&aabb, &model), Visibility::Visible, "centre {centre}");
            checked += 1;
        }
    }
}
