/// Local-space axis-aligned bounding boxes.
///
/// A box is built once per instance from the mesh vertices and never
/// recomputed; the world-space test transforms its corners at cull time.
use glam::Vec3;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Aabb {
    /// Box containing nothing.  Growing it by any point yields that point.
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    #[inline]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Tightest box around `points`.  Returns [`Aabb::EMPTY`] for no points.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Vec3>,
    {
        points.into_iter().fold(Self::EMPTY, |mut b, p| {
            b.grow(p);
            b
        })
    }

    #[inline]
    pub fn grow(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// True when `min > max` on any axis.  Empty boxes are never visible.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Corner `index` in `0..8`: bit 0 selects max x, bit 1 max y, bit 2 max z.
    #[inline]
    pub fn corner(&self, index: usize) -> Vec3 {
        debug_assert!(index < 8);
        Vec3::new(
            if index & 1 != 0 { self.max.x } else { self.min.x },
            if index & 2 != 0 { self.max.y } else { self.min.y },
            if index & 4 != 0 { self.max.z } else { self.min.z },
        )
    }

    pub fn corners(&self) -> [Vec3; 8] {
        std::array::from_fn(|i| self.corner(i))
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// GPU layout of [`Aabb`], matching `Bounds` in `cull.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuAabb {
    pub min: [f32; 4],
    pub max: [f32; 4],
}

impl From<&Aabb> for GpuAabb {
    fn from(b: &Aabb) -> Self {
        Self {
            min: b.min.extend(0.0).to_array(),
            max: b.max.extend(0.0).to_array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_box_is_empty() {
        assert!(Aabb::EMPTY.is_empty());
        assert!(Aabb::default().is_empty());
        assert!(Aabb::from_points(std::iter::empty()).is_empty());
    }

    #[test]
    fn from_points_is_tight() {
        let b = Aabb::from_points([
            Vec3::new(-0.5, 0.0, 2.0),
            Vec3::new(0.5, -1.0, 1.0),
            Vec3::new(0.0, 1.0, 3.0),
        ]);
        assert_eq!(b.min, Vec3::new(-0.5, -1.0, 1.0));
        assert_eq!(b.max, Vec3::new(0.5, 1.0, 3.0));
        assert!(!b.is_empty());
    }

    #[test]
    fn single_point_box_is_not_empty() {
        let b = Aabb::from_points([Vec3::ONE]);
        assert!(!b.is_empty());
        assert_eq!(b.center(), Vec3::ONE);
    }

    #[test]
    fn corners_cover_all_sign_combinations() {
        let b = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let corners = b.corners();
        assert_eq!(corners[0], Vec3::splat(-1.0));
        assert_eq!(corners[7], Vec3::splat(1.0));
        assert_eq!(corners[1], Vec3::new(1.0, -1.0, -1.0));
        assert_eq!(corners[6], Vec3::new(-1.0, 1.0, 1.0));
        for i in 0..8 {
            for j in (i + 1)..8 {
                assert_ne!(corners[i], corners[j]);
            }
        }
    }

    #[test]
    fn gpu_layout_pads_to_vec4() {
        assert_eq!(std::mem::size_of::<GpuAabb>(), 32);
        let g = GpuAabb::from(&Aabb::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)));
        assert_eq!(g.min, [1.0, 2.0, 3.0, 0.0]);
        assert_eq!(g.max, [4.0, 5.0, 6.0, 0.0]);
    }
}
