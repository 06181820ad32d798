use bytemuck::NoUninit;
use glam::Vec3;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Debug, Clone, Copy, NoUninit)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.indices.is_empty()
    }

    /// Append another mesh, rebasing its indices.
    pub fn extend(&mut self, other: &Mesh) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    pub fn translate(&mut self, offset: Vec3) {
        for v in self.vertices.iter_mut() {
            v.pos[0] += offset.x;
            v.pos[1] += offset.y;
            v.pos[2] += offset.z;
        }
    }

    pub fn upload(&self, device: &wgpu::Device) -> MeshBuffer {
        let vertices = bytemuck::cast_slice(&self.vertices);
        let indices = bytemuck::cast_slice(&self.indices);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: vertices,
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: indices,
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            index_count: self.indices.len() as u32,
        }
    }
}

/// Convert a packed 0xRRGGBB color to linear-ish RGBA the shader expects.
pub fn rgb(hex: u32) -> [f32; 4] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
        1.0,
    ]
}

/// Flat-shaded axis-aligned cuboid centered at the origin.
///
/// 4 vertices per face so each face keeps its own normal.
pub fn create_box_mesh(dims: Vec3, color: [f32; 4]) -> Mesh {
    let (hx, hy, hz) = (dims.x / 2.0, dims.y / 2.0, dims.z / 2.0);

    // (normal, four corners counter-clockwise seen from outside)
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        // +X
        ([1.0, 0.0, 0.0], [[hx, -hy, hz], [hx, -hy, -hz], [hx, hy, -hz], [hx, hy, hz]]),
        // -X
        ([-1.0, 0.0, 0.0], [[-hx, -hy, -hz], [-hx, -hy, hz], [-hx, hy, hz], [-hx, hy, -hz]]),
        // +Y
        ([0.0, 1.0, 0.0], [[-hx, hy, hz], [hx, hy, hz], [hx, hy, -hz], [-hx, hy, -hz]]),
        // -Y
        ([0.0, -1.0, 0.0], [[-hx, -hy, -hz], [hx, -hy, -hz], [hx, -hy, hz], [-hx, -hy, hz]]),
        // +Z
        ([0.0, 0.0, 1.0], [[-hx, -hy, hz], [hx, -hy, hz], [hx, hy, hz], [-hx, hy, hz]]),
        // -Z
        ([0.0, 0.0, -1.0], [[hx, -hy, -hz], [-hx, -hy, -hz], [-hx, hy, -hz], [hx, hy, -hz]]),
    ];

    let mut mesh = Mesh::empty();
    for (normal, corners) in faces.iter() {
        let base = mesh.vertices.len() as u32;
        for pos in corners.iter() {
            mesh.vertices.push(Vertex { pos: *pos, normal: *normal, color });
        }
        mesh.indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}

/// Horizontal plane in the XZ axes at y = 0, facing up.
pub fn create_plane_mesh(width: f32, depth: f32, color: [f32; 4]) -> Mesh {
    let (hw, hd) = (width / 2.0, depth / 2.0);
    let normal = [0.0, 1.0, 0.0];

    let vertices = vec![
        Vertex { pos: [-hw, 0.0, hd], normal, color },
        Vertex { pos: [hw, 0.0, hd], normal, color },
        Vertex { pos: [hw, 0.0, -hd], normal, color },
        Vertex { pos: [-hw, 0.0, -hd], normal, color },
    ];
    let indices = vec![0, 1, 2, 0, 2, 3];

    Mesh { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_mesh_shape() {
        let mesh = create_box_mesh(Vec3::new(2.0, 4.0, 6.0), rgb(0x654321));
        assert_eq!(mesh.vertices.len(), 24, "4 vertices per face");
        assert_eq!(mesh.indices.len(), 36, "2 triangles per face");

        // All corners sit on the half-extent envelope
        for v in &mesh.vertices {
            assert!(v.pos[0].abs() == 1.0 && v.pos[1].abs() == 2.0 && v.pos[2].abs() == 3.0);
        }
    }

    #[test]
    fn test_plane_mesh_faces_up() {
        let mesh = create_plane_mesh(100.0, 100.0, rgb(0x2a5934));
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices.len(), 6);
        for v in &mesh.vertices {
            assert_eq!(v.normal, [0.0, 1.0, 0.0]);
            assert_eq!(v.pos[1], 0.0);
        }
    }

    #[test]
    fn test_extend_rebases_indices() {
        let mut a = create_plane_mesh(1.0, 1.0, rgb(0xffffff));
        let b = create_plane_mesh(1.0, 1.0, rgb(0xffffff));
        a.extend(&b);
        assert_eq!(a.vertices.len(), 8);
        assert_eq!(a.indices[6..], [4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn test_rgb_unpacks_channels() {
        let c = rgb(0x2a5934);
        assert!((c[0] - 42.0 / 255.0).abs() < 1e-6);
        assert!((c[1] - 89.0 / 255.0).abs() < 1e-6);
        assert!((c[2] - 52.0 / 255.0).abs() < 1e-6);
        assert_eq!(c[3], 1.0);
    }
}
