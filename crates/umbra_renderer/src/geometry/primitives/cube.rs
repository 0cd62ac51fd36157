/// Unit cube primitive centred at the origin, edge length 1.
///
/// 24 unique vertices (4 per face, so every face has its own normal and
/// UVs) and 36 indices, counter-clockwise when seen from outside.
use glam::Vec3;

use crate::geometry::{Mesh, Vertex};
use crate::resources::buffer;
use crate::scene::Aabb;

const fn v(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Vertex {
    Vertex { position, normal, uv }
}

const PX: [f32; 3] = [ 1.0,  0.0,  0.0];
const NX: [f32; 3] = [-1.0,  0.0,  0.0];
const PY: [f32; 3] = [ 0.0,  1.0,  0.0];
const NY: [f32; 3] = [ 0.0, -1.0,  0.0];
const PZ: [f32; 3] = [ 0.0,  0.0,  1.0];
const NZ: [f32; 3] = [ 0.0,  0.0, -1.0];

#[rustfmt::skip]
pub const CUBE_VERTICES: [Vertex; 24] = [
    // bottom (y-)
    v([-0.5, -0.5,  0.5], NY, [0.0, 1.0]), v([ 0.5, -0.5,  0.5], NY, [1.0, 1.0]),
    v([ 0.5, -0.5, -0.5], NY, [1.0, 0.0]), v([-0.5, -0.5, -0.5], NY, [0.0, 0.0]),
    // top (y+)
    v([-0.5,  0.5, -0.5], PY, [0.0, 1.0]), v([ 0.5,  0.5, -0.5], PY, [1.0, 1.0]),
    v([ 0.5,  0.5,  0.5], PY, [1.0, 0.0]), v([-0.5,  0.5,  0.5], PY, [0.0, 0.0]),
    // right (x+)
    v([ 0.5, -0.5,  0.5], PX, [0.0, 1.0]), v([ 0.5, -0.5, -0.5], PX, [1.0, 1.0]),
    v([ 0.5,  0.5, -0.5], PX, [1.0, 0.0]), v([ 0.5,  0.5,  0.5], PX, [0.0, 0.0]),
    // left (x-)
    v([-0.5, -0.5, -0.5], NX, [0.0, 1.0]), v([-0.5, -0.5,  0.5], NX, [1.0, 1.0]),
    v([-0.5,  0.5,  0.5], NX, [1.0, 0.0]), v([-0.5,  0.5, -0.5], NX, [0.0, 0.0]),
    // front (z+)
    v([-0.5, -0.5,  0.5], PZ, [0.0, 1.0]), v([ 0.5, -0.5,  0.5], PZ, [1.0, 1.0]),
    v([ 0.5,  0.5,  0.5], PZ, [1.0, 0.0]), v([-0.5,  0.5,  0.5], PZ, [0.0, 0.0]),
    // back (z-)
    v([ 0.5, -0.5, -0.5], NZ, [0.0, 1.0]), v([-0.5, -0.5, -0.5], NZ, [1.0, 1.0]),
    v([-0.5,  0.5, -0.5], NZ, [1.0, 0.0]), v([ 0.5,  0.5, -0.5], NZ, [0.0, 0.0]),
];

#[rustfmt::skip]
pub const CUBE_INDICES: [u16; 36] = [
     0,  2,  1,  0,  3,  2, // bottom
     4,  6,  5,  4,  7,  6, // top
     8,  9, 10,  8, 10, 11, // right
    12, 13, 14, 12, 14, 15, // left
    16, 17, 18, 16, 18, 19, // front
    20, 21, 22, 20, 22, 23, // back
];

pub fn cube(device: &wgpu::Device) -> Mesh {
    Mesh {
        vertex_buffer: buffer::create_init(device, "Cube VB", &CUBE_VERTICES, wgpu::BufferUsages::VERTEX),
        index_buffer:  buffer::create_init(device, "Cube IB", &CUBE_INDICES, wgpu::BufferUsages::INDEX),
        index_count:   CUBE_INDICES.len() as u32,
        index_format:  wgpu::IndexFormat::Uint16,
        bounds:        cube_bounds(),
    }
}

/// Local box derived from the vertex positions.
pub fn cube_bounds() -> Aabb {
    Aabb::from_points(CUBE_VERTICES.iter().map(|v| Vec3::from_array(v.position)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_half_unit() {
        let b = cube_bounds();
        assert_eq!(b.min, Vec3::splat(-0.5));
        assert_eq!(b.max, Vec3::splat(0.5));
    }

    #[test]
    fn triangles_wind_counter_clockwise_outward() {
        for tri in CUBE_INDICES.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| CUBE_VERTICES[i as usize]);
            let (pa, pb, pc) = (
                Vec3::from_array(a.position),
                Vec3::from_array(b.position),
                Vec3::from_array(c.position),
            );
            let face_normal = (pb - pa).cross(pc - pa).normalize();
            assert!(face_normal.dot(Vec3::from_array(a.normal)) > 0.99);
        }
    }
}
