use glam::Vec3;

use crate::utils::{create_box_mesh, create_plane_mesh, rgb, Mesh};

/// Geometric primitive kinds the level is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Horizontal plane, `dims.x` by `dims.z`, facing up.
    Plane,
    /// Axis-aligned box, full extents in `dims`.
    Box,
}

/// One immutable level primitive. Built once at composition time, never
/// mutated for the lifetime of the session.
#[derive(Debug, Clone, Copy)]
pub struct Primitive {
    pub shape: Shape,
    pub dims: Vec3,
    pub position: Vec3,
    pub color: [f32; 4],
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Primitive {
    fn plane(width: f32, depth: f32, position: Vec3, color: u32) -> Self {
        Self {
            shape: Shape::Plane,
            dims: Vec3::new(width, 0.0, depth),
            position,
            color: rgb(color),
            cast_shadow: false,
            receive_shadow: true,
        }
    }

    fn cover(dims: Vec3, position: Vec3, color: u32) -> Self {
        Self {
            shape: Shape::Box,
            dims,
            position,
            color: rgb(color),
            cast_shadow: true,
            receive_shadow: true,
        }
    }

    /// World-space mesh for this primitive.
    pub fn to_mesh(&self) -> Mesh {
        let mut mesh = match self.shape {
            Shape::Plane => create_plane_mesh(self.dims.x, self.dims.z, self.color),
            Shape::Box => create_box_mesh(self.dims, self.color),
        };
        mesh.translate(self.position);
        mesh
    }
}

/// The arena: a declarative, order-independent list of primitives.
pub struct Level {
    pub primitives: Vec<Primitive>,
}

const GROUND: u32 = 0x2a5934;
const WALL: u32 = 0x8b7355;
const CRATE: u32 = 0x654321;
const BLOCK: u32 = 0x696969;

impl Level {
    /// Square arena: 100x100 ground, wall perimeter at ±20, four cover
    /// boxes, one central block.
    pub fn arena() -> Self {
        let mut primitives = vec![
            Primitive::plane(100.0, 100.0, Vec3::ZERO, GROUND),
        ];

        // Walls, axis-aligned, 5 high and 1 thick
        primitives.push(Primitive::cover(Vec3::new(40.0, 5.0, 1.0), Vec3::new(0.0, 2.5, -20.0), WALL));
        primitives.push(Primitive::cover(Vec3::new(40.0, 5.0, 1.0), Vec3::new(0.0, 2.5, 20.0), WALL));
        primitives.push(Primitive::cover(Vec3::new(1.0, 5.0, 40.0), Vec3::new(-20.0, 2.5, 0.0), WALL));
        primitives.push(Primitive::cover(Vec3::new(1.0, 5.0, 40.0), Vec3::new(20.0, 2.5, 0.0), WALL));

        // Cover boxes
        primitives.push(Primitive::cover(Vec3::new(2.0, 2.0, 2.0), Vec3::new(5.0, 1.0, 5.0), CRATE));
        primitives.push(Primitive::cover(Vec3::new(2.0, 2.0, 2.0), Vec3::new(-5.0, 1.0, -5.0), CRATE));
        primitives.push(Primitive::cover(Vec3::new(3.0, 2.0, 3.0), Vec3::new(10.0, 1.0, -10.0), CRATE));
        primitives.push(Primitive::cover(Vec3::new(3.0, 2.0, 3.0), Vec3::new(-10.0, 1.0, 10.0), CRATE));

        // Central block
        primitives.push(Primitive::cover(Vec3::new(4.0, 4.0, 4.0), Vec3::new(0.0, 2.0, 0.0), BLOCK));

        Self { primitives }
    }

    /// Bake every primitive into a single world-space mesh.
    pub fn to_mesh(&self) -> Mesh {
        let mut mesh = Mesh::empty();
        for p in &self.primitives {
            mesh.extend(&p.to_mesh());
        }
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_inventory() {
        let level = Level::arena();
        assert_eq!(level.primitives.len(), 10);

        let planes: Vec<_> = level.primitives.iter().filter(|p| p.shape == Shape::Plane).collect();
        assert_eq!(planes.len(), 1, "exactly one ground plane");
        assert_eq!(planes[0].dims.x, 100.0);
        assert_eq!(planes[0].dims.z, 100.0);
    }

    #[test]
    fn test_walls_form_square_perimeter() {
        let level = Level::arena();
        let walls: Vec<_> = level
            .primitives
            .iter()
            .filter(|p| p.shape == Shape::Box && p.dims.y == 5.0)
            .collect();
        assert_eq!(walls.len(), 4);

        for wall in &walls {
            // Each wall sits at ±20 on exactly one horizontal axis
            let on_z = wall.position.z.abs() == 20.0 && wall.position.x == 0.0;
            let on_x = wall.position.x.abs() == 20.0 && wall.position.z == 0.0;
            assert!(on_z || on_x, "wall at unexpected position {:?}", wall.position);
            assert_eq!(wall.dims.min_element(), 1.0, "walls are 1 unit thick");
            assert_eq!(wall.position.y, 2.5);
        }
    }

    #[test]
    fn test_central_block_at_origin() {
        let level = Level::arena();
        let central = level
            .primitives
            .iter()
            .find(|p| p.dims == Vec3::new(4.0, 4.0, 4.0))
            .expect("central block present");
        assert_eq!(central.position, Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_ground_receives_but_does_not_cast() {
        let level = Level::arena();
        let ground = &level.primitives[0];
        assert!(ground.receive_shadow && !ground.cast_shadow);
        assert!(level.primitives[1..].iter().all(|p| p.cast_shadow && p.receive_shadow));
    }

    #[test]
    fn test_baked_mesh_is_world_space() {
        let level = Level::arena();
        let mesh = level.to_mesh();
        assert!(!mesh.is_empty());
        // 1 plane (4 verts) + 9 boxes (24 verts each)
        assert_eq!(mesh.vertices.len(), 4 + 9 * 24);

        // Ground reaches z = ±50, far wall straddles z = -20
        let min_z = mesh.vertices.iter().map(|v| v.pos[2]).fold(f32::INFINITY, f32::min);
        assert_eq!(min_z, -50.0);
        assert!(mesh.vertices.iter().any(|v| v.pos[2] == -20.5), "far wall back face baked in place");
    }
}
