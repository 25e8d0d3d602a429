use glam::Vec3;

use super::vertex::{MeshData, Vertex};
use crate::model::{Model, UNITS_PER_BLOCK};

/// Per-face index offsets: two triangles sharing the 0-2 diagonal.
pub(crate) const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Box faces in emission order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Face {
    South,
    East,
    North,
    West,
    Up,
    Down,
}

impl Face {
    pub const ALL: [Face; 6] = [Face::South, Face::East, Face::North, Face::West, Face::Up, Face::Down];

    pub const fn normal(self) -> [f32; 3] {
        match self {
            Face::South => [0.0, 0.0, -1.0],
            Face::East => [1.0, 0.0, 0.0],
            Face::North => [0.0, 0.0, 1.0],
            Face::West => [-1.0, 0.0, 0.0],
            Face::Up => [0.0, 1.0, 0.0],
            Face::Down => [0.0, -1.0, 0.0],
        }
    }
}

/// Corner positions of every face of the box spanning `origin..origin+size`.
///
/// Corner order per face is (bottom-left, top-left, top-right, bottom-right)
/// as seen from outside; texture mapping relies on it.
pub(crate) fn cuboid_faces(origin: Vec3, size: Vec3) -> [(Face, [[f32; 3]; 4]); 6] {
    let (x0, y0, z0) = (origin.x, origin.y, origin.z);
    let max = origin + size;
    let (x1, y1, z1) = (max.x, max.y, max.z);

    [
        (Face::South, [[x0, y0, z0], [x0, y1, z0], [x1, y1, z0], [x1, y0, z0]]),
        (Face::East, [[x1, y0, z0], [x1, y1, z0], [x1, y1, z1], [x1, y0, z1]]),
        (Face::North, [[x1, y0, z1], [x1, y1, z1], [x0, y1, z1], [x0, y0, z1]]),
        (Face::West, [[x0, y0, z1], [x0, y1, z1], [x0, y1, z0], [x0, y0, z0]]),
        (Face::Up, [[x0, y1, z0], [x0, y1, z1], [x1, y1, z1], [x1, y1, z0]]),
        (Face::Down, [[x0, y0, z1], [x0, y0, z0], [x1, y0, z0], [x1, y0, z1]]),
    ]
}

/// Accumulates flat-shaded cuboids into one indexed triangle list.
///
/// Faces never share vertices, so each face is lit independently.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(cuboids: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(cuboids * 24),
            indices: Vec::with_capacity(cuboids * 36),
        }
    }

    /// Appends the 6 faces of an axis-aligned box: 24 vertices, 36 indices.
    ///
    /// Zero extents are not skipped; they produce degenerate triangles.
    pub fn add_cuboid(&mut self, origin: Vec3, size: Vec3) {
        for (face, corners) in cuboid_faces(origin, size) {
            let base = self.vertices.len() as u32;
            self.indices.extend(QUAD_INDICES.iter().map(|i| base + i));
            self.vertices.extend(corners.iter().map(|&p| Vertex::new(p, face.normal())));
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn finish(self) -> MeshData<Vertex> {
        MeshData { vertices: self.vertices, indices: self.indices }
    }
}

/// Builds world-space geometry for every rendered bone of `model`.
///
/// Bones and cuboids are visited in declaration order; `neverRender` bones
/// are skipped and `inflate` is applied before conversion to world units.
pub fn build_model_mesh(model: &Model) -> MeshData<Vertex> {
    let mut builder = MeshBuilder::with_capacity(model.rendered_cuboid_count());
    for bone in model.bones().iter().filter(|b| !b.never_render) {
        for cube in &bone.cubes {
            let (origin, size) = cube.inflated();
            builder.add_cuboid(origin / UNITS_PER_BLOCK, size / UNITS_PER_BLOCK);
        }
    }
    let mesh = builder.finish();
    log::debug!(
        "built model mesh: {} vertices, {} indices",
        mesh.vertices.len(),
        mesh.indices.len()
    );
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bone, Cuboid};

    fn triangle_area(mesh: &MeshData<Vertex>, tri: &[u32]) -> f32 {
        let p = |i: u32| Vec3::from(mesh.vertices[i as usize].position);
        let (a, b, c) = (p(tri[0]), p(tri[1]), p(tri[2]));
        (b - a).cross(c - a).length() * 0.5
    }

    #[test]
    fn cuboid_emits_24_vertices_36_indices() {
        let mut b = MeshBuilder::new();
        b.add_cuboid(Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(b.vertex_count(), 24);
        assert_eq!(b.index_count(), 36);

        let mesh = b.finish();
        for tri in mesh.indices.chunks(3) {
            assert!(triangle_area(&mesh, tri) > 0.0, "collinear triangle {tri:?}");
        }
    }

    #[test]
    fn indices_offset_by_running_vertex_count() {
        let mut b = MeshBuilder::new();
        b.add_cuboid(Vec3::ZERO, Vec3::ONE);
        b.add_cuboid(Vec3::splat(2.0), Vec3::ONE);
        let mesh = b.finish();

        assert_eq!(&mesh.indices[36..42], &[24, 25, 26, 24, 26, 27]);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
        assert_eq!(mesh.indices.len() % 3, 0);
    }

    #[test]
    fn face_order_and_normals() {
        let mut b = MeshBuilder::new();
        b.add_cuboid(Vec3::ZERO, Vec3::ONE);
        let mesh = b.finish();

        for (i, face) in Face::ALL.iter().enumerate() {
            for v in &mesh.vertices[i * 4..i * 4 + 4] {
                assert_eq!(v.normal, face.normal());
            }
        }
        // First south vertex sits at the origin, first east vertex at +x.
        assert_eq!(mesh.vertices[0].position, [0.0, 0.0, 0.0]);
        assert_eq!(mesh.vertices[4].position, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn normals_point_outward() {
        let mut b = MeshBuilder::new();
        b.add_cuboid(Vec3::ZERO, Vec3::ONE);
        let mesh = b.finish();
        let center = Vec3::splat(0.5);
        for v in &mesh.vertices {
            let outward = Vec3::from(v.position) - center;
            assert!(outward.dot(Vec3::from(v.normal)) > 0.0);
        }
    }

    #[test]
    fn triangles_wind_counter_clockwise_from_outside() {
        let mut b = MeshBuilder::new();
        b.add_cuboid(Vec3::new(-1.0, 0.5, 2.0), Vec3::new(2.0, 3.0, 0.5));
        let mesh = b.finish();

        for tri in mesh.indices.chunks(3) {
            let p = |i: u32| Vec3::from(mesh.vertices[i as usize].position);
            let (a, b, c) = (p(tri[0]), p(tri[1]), p(tri[2]));
            let normal = Vec3::from(mesh.vertices[tri[0] as usize].normal);
            assert!((b - a).cross(c - a).dot(normal) > 0.0, "clockwise triangle {tri:?}");
        }
    }

    #[test]
    fn zero_extent_still_emits_degenerate_faces() {
        let mut b = MeshBuilder::new();
        b.add_cuboid(Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0));
        let mesh = b.finish();
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
    }

    #[test]
    fn never_render_bones_contribute_nothing() {
        let mut body = Bone::new("body", Vec3::new(0.0, 24.0, 0.0));
        body.cubes.push(Cuboid::new(Vec3::new(-4.0, 12.0, -2.0), Vec3::new(8.0, 12.0, 4.0)));
        let mut waist = Bone::new("waist", Vec3::new(0.0, 12.0, 0.0));
        waist.never_render = true;

        let model = Model::from_bones(vec![body, waist]).unwrap();
        let mesh = build_model_mesh(&model);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
    }

    #[test]
    fn model_units_are_sixteenths() {
        let mut body = Bone::new("body", Vec3::ZERO);
        body.cubes.push(Cuboid::new(Vec3::new(-4.0, 12.0, -2.0), Vec3::new(8.0, 12.0, 4.0)));
        let mesh = build_model_mesh(&Model::from_bones(vec![body]).unwrap());
        assert_eq!(mesh.vertices[0].position, [-0.25, 0.75, -0.125]);
        assert_eq!(mesh.vertices[2].position, [0.25, 1.5, -0.125]);
    }
}
