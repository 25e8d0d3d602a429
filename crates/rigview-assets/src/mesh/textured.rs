use glam::{Vec2, Vec3};

use super::builder::{Face, QUAD_INDICES, cuboid_faces};
use super::vertex::{MeshData, TexturedVertex};
use crate::model::{Model, UNITS_PER_BLOCK};

/// Texel rectangle `(u, v, width, height)` of `face` in the box-UV net of a
/// box with texel extents `size` whose net starts at `uv`.
///
/// ```text
///        d    w    d    w
///     +----+----+----+----+
///   d |    | up |down|    |
///     +----+----+----+----+
///   h |east|sth |west|nth |
///     +----+----+----+----+
/// ```
pub fn box_uv_rect(face: Face, uv: Vec2, size: Vec3) -> [f32; 4] {
    let (u, v) = (uv.x, uv.y);
    let (w, h, d) = (size.x, size.y, size.z);
    match face {
        Face::South => [u + d, v + d, w, h],
        Face::East => [u, v + d, d, h],
        Face::West => [u + d + w, v + d, d, h],
        Face::North => [u + 2.0 * d + w, v + d, w, h],
        Face::Up => [u + d, v, w, d],
        Face::Down => [u + d + w, v, w, d],
    }
}

/// Like [`super::MeshBuilder`], but emits box-UV texture coordinates
/// normalized to a texture of `texture_size` texels.
#[derive(Debug)]
pub struct TexturedMeshBuilder {
    texture_size: Vec2,
    vertices: Vec<TexturedVertex>,
    indices: Vec<u32>,
}

impl TexturedMeshBuilder {
    pub fn new(texture_width: u32, texture_height: u32) -> Self {
        Self {
            texture_size: Vec2::new(texture_width.max(1) as f32, texture_height.max(1) as f32),
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Appends a box at `origin..origin+size` (world units) whose faces sample
    /// the net of a `texel_size` box starting at `uv`. `mirror` flips U.
    pub fn add_cuboid(&mut self, origin: Vec3, size: Vec3, uv: Vec2, texel_size: Vec3, mirror: bool) {
        for (face, corners) in cuboid_faces(origin, size) {
            let [fu, fv, fw, fh] = box_uv_rect(face, uv, texel_size);
            let (mut u0, mut u1) = (fu / self.texture_size.x, (fu + fw) / self.texture_size.x);
            let (v0, v1) = (fv / self.texture_size.y, (fv + fh) / self.texture_size.y);
            if mirror {
                std::mem::swap(&mut u0, &mut u1);
            }
            // bottom-left, top-left, top-right, bottom-right
            let uvs = [[u0, v1], [u0, v0], [u1, v0], [u1, v1]];

            let base = self.vertices.len() as u32;
            self.indices.extend(QUAD_INDICES.iter().map(|i| base + i));
            for (p, uv) in corners.iter().zip(uvs) {
                self.vertices.push(TexturedVertex { position: *p, normal: face.normal(), uv });
            }
        }
    }

    pub fn finish(self) -> MeshData<TexturedVertex> {
        MeshData { vertices: self.vertices, indices: self.indices }
    }
}

/// Textured counterpart of [`super::build_model_mesh`].
///
/// UV nets use the un-inflated cuboid size, so inflated overlays sample the
/// same texels as their base box.
pub fn build_textured_model_mesh(
    model: &Model,
    texture_width: u32,
    texture_height: u32,
) -> MeshData<TexturedVertex> {
    let mut builder = TexturedMeshBuilder::new(texture_width, texture_height);
    for bone in model.bones().iter().filter(|b| !b.never_render) {
        for cube in &bone.cubes {
            let (origin, size) = cube.inflated();
            builder.add_cuboid(
                origin / UNITS_PER_BLOCK,
                size / UNITS_PER_BLOCK,
                cube.uv,
                cube.size,
                bone.is_mirrored(cube),
            );
        }
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bone, Cuboid};

    #[test]
    fn net_layout_for_body_box() {
        let uv = Vec2::new(16.0, 16.0);
        let size = Vec3::new(8.0, 12.0, 4.0);
        assert_eq!(box_uv_rect(Face::South, uv, size), [20.0, 20.0, 8.0, 12.0]);
        assert_eq!(box_uv_rect(Face::East, uv, size), [16.0, 20.0, 4.0, 12.0]);
        assert_eq!(box_uv_rect(Face::West, uv, size), [28.0, 20.0, 4.0, 12.0]);
        assert_eq!(box_uv_rect(Face::North, uv, size), [32.0, 20.0, 8.0, 12.0]);
        assert_eq!(box_uv_rect(Face::Up, uv, size), [20.0, 16.0, 8.0, 4.0]);
        assert_eq!(box_uv_rect(Face::Down, uv, size), [28.0, 16.0, 8.0, 4.0]);
    }

    #[test]
    fn uvs_are_normalized_and_in_range() {
        let mut b = TexturedMeshBuilder::new(64, 32);
        b.add_cuboid(Vec3::ZERO, Vec3::ONE, Vec2::new(16.0, 16.0), Vec3::new(8.0, 12.0, 4.0), false);
        let mesh = b.finish();
        assert_eq!(mesh.vertices.len(), 24);
        for v in &mesh.vertices {
            assert!((0.0..=1.0).contains(&v.uv[0]) && (0.0..=1.0).contains(&v.uv[1]), "{v:?}");
        }
        // South face: bottom-left corner samples (u0, v1).
        assert_eq!(mesh.vertices[0].uv, [20.0 / 64.0, 32.0 / 32.0]);
        assert_eq!(mesh.vertices[1].uv, [20.0 / 64.0, 20.0 / 32.0]);
    }

    #[test]
    fn mirror_flips_u() {
        let mut plain = TexturedMeshBuilder::new(64, 64);
        plain.add_cuboid(Vec3::ZERO, Vec3::ONE, Vec2::ZERO, Vec3::splat(4.0), false);
        let mut mirrored = TexturedMeshBuilder::new(64, 64);
        mirrored.add_cuboid(Vec3::ZERO, Vec3::ONE, Vec2::ZERO, Vec3::splat(4.0), true);

        let (p, m) = (plain.finish(), mirrored.finish());
        assert_eq!(p.vertices[0].uv[0], m.vertices[3].uv[0]);
        assert_eq!(p.vertices[3].uv[0], m.vertices[0].uv[0]);
        assert_eq!(p.vertices[0].uv[1], m.vertices[0].uv[1]);
    }

    #[test]
    fn model_mesh_honours_bone_mirror() {
        let mut arm = Bone::new("leftArm", Vec3::ZERO);
        arm.mirror = true;
        let mut cube = Cuboid::new(Vec3::new(4.0, 12.0, -2.0), Vec3::new(4.0, 12.0, 4.0));
        cube.uv = Vec2::new(40.0, 16.0);
        arm.cubes.push(cube);

        let model = Model::from_bones(vec![arm]).unwrap();
        let mesh = build_textured_model_mesh(&model, 64, 64);
        assert_eq!(mesh.indices.len(), 36);
        // Mirrored south face: bottom-left corner takes the right edge of the rect.
        assert_eq!(mesh.vertices[0].uv[0], (44.0 + 4.0) / 64.0);
    }
}
