//! Bone/cuboid model descriptions.
//!
//! A model is a forest of named bones. Parents are referenced by name and
//! resolved through [`Model::bone`] when a hierarchy is needed; static
//! geometry emission never looks at them.

use std::collections::HashMap;

use glam::{Vec2, Vec3};
use serde::Deserialize;

use crate::error::ModelError;

/// Model-space units per world unit.
pub const UNITS_PER_BLOCK: f32 = 16.0;

/// Axis-aligned box primitive, in model-space units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cuboid {
    pub origin: Vec3,
    pub size: Vec3,
    /// Top-left corner of the box-UV net, in texels.
    pub uv: Vec2,
    /// Grows the box by this amount on every side.
    pub inflate: f32,
    /// Per-cuboid override of the bone's `mirror` flag.
    pub mirror: Option<bool>,
}

impl Cuboid {
    pub fn new(origin: Vec3, size: Vec3) -> Self {
        Self { origin, size, uv: Vec2::ZERO, inflate: 0.0, mirror: None }
    }

    /// Origin and size after applying `inflate`.
    pub fn inflated(&self) -> (Vec3, Vec3) {
        let grow = Vec3::splat(self.inflate);
        (self.origin - grow, self.size + grow * 2.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub name: String,
    pub pivot: Vec3,
    pub parent: Option<String>,
    /// Structural/attachment bones: never emit geometry.
    pub never_render: bool,
    pub mirror: bool,
    pub cubes: Vec<Cuboid>,
}

impl Bone {
    pub fn new(name: impl Into<String>, pivot: Vec3) -> Self {
        Self {
            name: name.into(),
            pivot,
            parent: None,
            never_render: false,
            mirror: false,
            cubes: Vec::new(),
        }
    }

    /// Whether `cube` is mirrored, taking the per-cuboid override into account.
    pub fn is_mirrored(&self, cube: &Cuboid) -> bool {
        cube.mirror.unwrap_or(self.mirror)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleBounds {
    pub width: f32,
    pub height: f32,
    pub offset: Vec3,
}

/// A parsed model: bones in declaration order plus a name index.
#[derive(Debug, Clone, Default)]
pub struct Model {
    bones: Vec<Bone>,
    index: HashMap<String, usize>,
    visible_bounds: Option<VisibleBounds>,
}

// ── wire format ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RawModel {
    #[serde(default)]
    bones: Vec<RawBone>,
    visible_bounds_width: Option<f32>,
    visible_bounds_height: Option<f32>,
    visible_bounds_offset: Option<[f32; 3]>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBone {
    name: String,
    #[serde(default)]
    pivot: [f32; 3],
    parent: Option<String>,
    #[serde(default)]
    never_render: bool,
    #[serde(default)]
    mirror: bool,
    #[serde(default)]
    cubes: Vec<RawCube>,
}

#[derive(Deserialize)]
struct RawCube {
    origin: [f32; 3],
    size: [f32; 3],
    #[serde(default)]
    uv: [f32; 2],
    #[serde(default)]
    inflate: f32,
    mirror: Option<bool>,
}

impl Model {
    /// Parses a model document.
    pub fn from_json_str(src: &str) -> Result<Self, ModelError> {
        let raw: RawModel =
            serde_json::from_str(src).map_err(|e| ModelError::Parse(e.to_string()))?;
        Self::from_raw(raw)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ModelError> {
        let raw: RawModel =
            serde_json::from_slice(bytes).map_err(|e| ModelError::Parse(e.to_string()))?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawModel) -> Result<Self, ModelError> {
        let visible_bounds = match (raw.visible_bounds_width, raw.visible_bounds_height) {
            (Some(width), Some(height)) => Some(VisibleBounds {
                width,
                height,
                offset: raw.visible_bounds_offset.map(Vec3::from).unwrap_or(Vec3::ZERO),
            }),
            _ => None,
        };

        let bones = raw
            .bones
            .into_iter()
            .map(|b| Bone {
                name: b.name,
                pivot: Vec3::from(b.pivot),
                parent: b.parent,
                never_render: b.never_render,
                mirror: b.mirror,
                cubes: b
                    .cubes
                    .into_iter()
                    .map(|c| Cuboid {
                        origin: Vec3::from(c.origin),
                        size: Vec3::from(c.size),
                        uv: Vec2::from(c.uv),
                        inflate: c.inflate,
                        mirror: c.mirror,
                    })
                    .collect(),
            })
            .collect();

        let mut model = Self::from_bones(bones)?;
        model.visible_bounds = visible_bounds;
        Ok(model)
    }

    /// Builds a model from bones in declaration order.
    ///
    /// Rejects duplicate names and negative cuboid extents. Dangling parent
    /// references are accepted here and reported by [`Model::validate`].
    pub fn from_bones(bones: Vec<Bone>) -> Result<Self, ModelError> {
        let mut index = HashMap::with_capacity(bones.len());
        for (i, bone) in bones.iter().enumerate() {
            if index.insert(bone.name.clone(), i).is_some() {
                return Err(ModelError::DuplicateBone(bone.name.clone()));
            }
            for (ci, cube) in bone.cubes.iter().enumerate() {
                // A negative inflate may not shrink the box past zero.
                let (_, inflated) = cube.inflated();
                if cube.size.min_element() < 0.0 || inflated.min_element() < 0.0 {
                    return Err(ModelError::NegativeSize { bone: bone.name.clone(), cuboid: ci });
                }
            }
        }
        Ok(Self { bones, index, visible_bounds: None })
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn bone(&self, name: &str) -> Option<&Bone> {
        self.index.get(name).map(|&i| &self.bones[i])
    }

    pub fn visible_bounds(&self) -> Option<VisibleBounds> {
        self.visible_bounds
    }

    /// Resolved parent of `name`, if it has one and it exists.
    pub fn parent_of(&self, name: &str) -> Option<&Bone> {
        let parent = self.bone(name)?.parent.as_deref()?;
        self.bone(parent)
    }

    /// Direct children of `name`, in declaration order.
    pub fn children_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Bone> + 'a {
        self.bones.iter().filter(move |b| b.parent.as_deref() == Some(name))
    }

    /// Bones without a (resolvable) parent.
    pub fn roots(&self) -> impl Iterator<Item = &Bone> + '_ {
        self.bones.iter().filter(|b| match b.parent.as_deref() {
            None => true,
            Some(p) => !self.index.contains_key(p),
        })
    }

    /// Walks parent links from `name` upwards, nearest first.
    ///
    /// Stops at the first missing parent or when a cycle would repeat a bone.
    pub fn ancestors(&self, name: &str) -> Vec<&Bone> {
        let mut out: Vec<&Bone> = Vec::new();
        let mut current = name;
        while let Some(parent) = self.parent_of(current) {
            if parent.name == name || out.iter().any(|b| b.name == parent.name) {
                break;
            }
            out.push(parent);
            current = &parent.name;
        }
        out
    }

    /// Non-fatal structural problems: dangling parents and parent cycles.
    pub fn validate(&self) -> Vec<ModelError> {
        let mut problems = Vec::new();
        for bone in &self.bones {
            if let Some(parent) = bone.parent.as_deref() {
                if !self.index.contains_key(parent) {
                    problems.push(ModelError::UnknownParent {
                        bone: bone.name.clone(),
                        parent: parent.to_string(),
                    });
                    continue;
                }
            }
            if self.has_cycle(&bone.name) {
                problems.push(ModelError::ParentCycle { bone: bone.name.clone() });
            }
        }
        problems
    }

    fn has_cycle(&self, name: &str) -> bool {
        let mut current = name;
        for _ in 0..self.bones.len() {
            match self.parent_of(current) {
                Some(p) if p.name == name => return true,
                Some(p) => current = &p.name,
                None => return false,
            }
        }
        false
    }

    /// Number of cuboids that will emit geometry.
    pub fn rendered_cuboid_count(&self) -> usize {
        self.bones.iter().filter(|b| !b.never_render).map(|b| b.cubes.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HUMANOID_SUBSET: &str = r#"{
        "visible_bounds_width": 1,
        "visible_bounds_height": 1,
        "visible_bounds_offset": [ 0, 0.5, 0 ],
        "bones": [
            { "name": "body", "pivot": [ 0.0, 24.0, 0.0 ],
              "cubes": [ { "origin": [ -4.0, 12.0, -2.0 ], "size": [ 8, 12, 4 ], "uv": [ 16, 16 ] } ] },
            { "name": "waist", "neverRender": true, "pivot": [ 0.0, 12.0, 0.0 ] },
            { "name": "hat", "pivot": [ 0.0, 24.0, 0.0 ], "neverRender": true,
              "cubes": [ { "origin": [ -4.0, 24.0, -4.0 ], "size": [ 8, 8, 8 ], "uv": [ 32, 0 ], "inflate": 0.5 } ] },
            { "name": "rightArm", "pivot": [ -5.0, 22.0, 0.0 ] },
            { "name": "rightItem", "pivot": [ -6, 15, 1 ], "neverRender": true, "parent": "rightArm" },
            { "name": "leftArm", "pivot": [ 5.0, 22.0, 0.0 ], "mirror": true }
        ]
    }"#;

    #[test]
    fn parses_fields() {
        let model = Model::from_json_str(HUMANOID_SUBSET).unwrap();
        assert_eq!(model.bones().len(), 6);

        let body = model.bone("body").unwrap();
        assert_eq!(body.pivot, Vec3::new(0.0, 24.0, 0.0));
        assert_eq!(body.cubes[0].size, Vec3::new(8.0, 12.0, 4.0));
        assert_eq!(body.cubes[0].uv, Vec2::new(16.0, 16.0));
        assert!(!body.never_render);

        assert!(model.bone("waist").unwrap().never_render);
        assert_eq!(model.bone("hat").unwrap().cubes[0].inflate, 0.5);
        assert!(model.bone("leftArm").unwrap().mirror);

        let vb = model.visible_bounds().unwrap();
        assert_eq!(vb.offset, Vec3::new(0.0, 0.5, 0.0));
        assert_eq!(model.rendered_cuboid_count(), 1);
    }

    #[test]
    fn hierarchy_is_name_keyed() {
        let model = Model::from_json_str(HUMANOID_SUBSET).unwrap();
        assert_eq!(model.parent_of("rightItem").unwrap().name, "rightArm");
        assert!(model.parent_of("body").is_none());

        let kids: Vec<_> = model.children_of("rightArm").map(|b| b.name.as_str()).collect();
        assert_eq!(kids, ["rightItem"]);

        let roots: Vec<_> = model.roots().map(|b| b.name.as_str()).collect();
        assert!(!roots.contains(&"rightItem"));
        assert_eq!(roots.len(), 5);
        assert!(model.validate().is_empty());
    }

    #[test]
    fn duplicate_bone_rejected() {
        let err = Model::from_bones(vec![
            Bone::new("a", Vec3::ZERO),
            Bone::new("a", Vec3::ONE),
        ])
        .unwrap_err();
        assert_eq!(err, ModelError::DuplicateBone("a".into()));
    }

    #[test]
    fn negative_size_rejected() {
        let mut bone = Bone::new("a", Vec3::ZERO);
        bone.cubes.push(Cuboid::new(Vec3::ZERO, Vec3::new(1.0, -1.0, 1.0)));
        let err = Model::from_bones(vec![bone]).unwrap_err();
        assert_eq!(err, ModelError::NegativeSize { bone: "a".into(), cuboid: 0 });
    }

    #[test]
    fn unknown_parent_and_cycle_reported() {
        let mut a = Bone::new("a", Vec3::ZERO);
        a.parent = Some("b".into());
        let mut b = Bone::new("b", Vec3::ZERO);
        b.parent = Some("a".into());
        let mut c = Bone::new("c", Vec3::ZERO);
        c.parent = Some("ghost".into());

        let model = Model::from_bones(vec![a, b, c]).unwrap();
        let problems = model.validate();
        assert!(problems.contains(&ModelError::UnknownParent {
            bone: "c".into(),
            parent: "ghost".into()
        }));
        assert!(problems.contains(&ModelError::ParentCycle { bone: "a".into() }));

        // Cycle-guarded: terminates and never repeats.
        let chain: Vec<_> = model.ancestors("a").iter().map(|b| b.name.clone()).collect();
        assert_eq!(chain, ["b"]);
    }

    #[test]
    fn inflate_grows_every_side() {
        let mut cube = Cuboid::new(Vec3::new(-4.0, 24.0, -4.0), Vec3::splat(8.0));
        cube.inflate = 0.5;
        let (o, s) = cube.inflated();
        assert_eq!(o, Vec3::new(-4.5, 23.5, -4.5));
        assert_eq!(s, Vec3::splat(9.0));
    }

    #[test]
    fn inflate_may_not_turn_a_box_inside_out() {
        let src = r#"{ "bones": [ { "name": "head", "pivot": [0, 0, 0],
            "cubes": [ { "origin": [0, 0, 0], "size": [1, 1, 1], "uv": [0, 0], "inflate": -1 } ] } ] }"#;
        assert_eq!(
            Model::from_json_str(src).unwrap_err(),
            ModelError::NegativeSize { bone: "head".into(), cuboid: 0 }
        );

        // Shrinking exactly to zero is still a valid (flat) box.
        let mut bone = Bone::new("a", Vec3::ZERO);
        let mut cube = Cuboid::new(Vec3::ZERO, Vec3::new(2.0, 4.0, 2.0));
        cube.inflate = -1.0;
        bone.cubes.push(cube);
        let model = Model::from_bones(vec![bone]).unwrap();
        assert_eq!(model.bones()[0].cubes[0].inflated().1, Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn malformed_document_is_parse_error() {
        assert!(matches!(Model::from_json_str("{ \"bones\": 3 }"), Err(ModelError::Parse(_))));
    }
}
