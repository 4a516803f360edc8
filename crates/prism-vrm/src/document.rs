//! Avatar document loading and cross-referencing

use crate::path::{Region, VRM_EXTENSION};
use crate::types::{GltfRoot, VrmExtension};
use prism_core::{PrismError, Result};
use std::borrow::Cow;

const GLB_MAGIC: &[u8; 4] = b"glTF";

/// A primitive addressed by mesh and primitive index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrimitiveRef {
    pub mesh: usize,
    pub primitive: usize,
}

/// An immutable, parsed avatar document.
///
/// Keeps both the raw JSON tree, which the document browser walks with
/// JSON pointers, and a typed view used to build the scene.
#[derive(Debug, Clone)]
pub struct VrmDocument {
    json: serde_json::Value,
    root: GltfRoot,
    binary_len: usize,
}

impl VrmDocument {
    /// Parse a `.vrm`/`.glb` binary container or a `.gltf` JSON document
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.starts_with(GLB_MAGIC) {
            let glb = gltf::Glb::from_slice(bytes)
                .map_err(|e| PrismError::ImportError(format!("Failed to read GLB: {}", e)))?;
            let json: serde_json::Value = serde_json::from_slice(&glb.json)?;
            let binary_len = glb.bin.as_ref().map(|bin| bin.len()).unwrap_or(0);
            Self::build(json, binary_len)
        } else {
            let json: serde_json::Value = serde_json::from_slice(bytes)?;
            Self::build(json, 0)
        }
    }

    /// Wrap an already-parsed JSON document
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        Self::build(json, 0)
    }

    fn build(json: serde_json::Value, binary_len: usize) -> Result<Self> {
        if !json.is_object() {
            return Err(PrismError::ParseError(
                "document root must be a JSON object".to_string(),
            ));
        }
        let root: GltfRoot = serde_json::from_value(json.clone())?;
        validate(&root)?;
        log::debug!(
            "Parsed document: {} nodes, {} meshes, {} materials, vrm: {}",
            root.nodes.len(),
            root.meshes.len(),
            root.materials.len(),
            root.extensions.vrm.is_some()
        );
        Ok(Self {
            json,
            root,
            binary_len,
        })
    }

    /// The raw JSON tree
    pub fn json(&self) -> &serde_json::Value {
        &self.json
    }

    /// The typed glTF view
    pub fn root(&self) -> &GltfRoot {
        &self.root
    }

    /// Size of the GLB binary chunk, 0 for JSON documents
    pub fn binary_len(&self) -> usize {
        self.binary_len
    }

    pub fn vrm(&self) -> Option<&VrmExtension> {
        self.root.extensions.vrm.as_ref()
    }

    /// The VRM extension, or an error for plain glTF documents
    pub fn require_vrm(&self) -> Result<&VrmExtension> {
        self.vrm()
            .ok_or_else(|| PrismError::MissingExtension(VRM_EXTENSION.to_string()))
    }

    /// Look up a value by document path (JSON pointer)
    pub fn pointer(&self, path: &str) -> Option<&serde_json::Value> {
        self.json.pointer(path)
    }

    pub fn title(&self) -> Option<&str> {
        self.vrm().and_then(|vrm| vrm.meta.title.as_deref())
    }

    /// Every primitive whose material is `material`, in document order
    pub fn primitives_using_material(&self, material: usize) -> Vec<PrimitiveRef> {
        self.root
            .meshes
            .iter()
            .enumerate()
            .flat_map(|(mesh, def)| {
                def.primitives
                    .iter()
                    .enumerate()
                    .filter(move |(_, p)| p.material == Some(material))
                    .map(move |(primitive, _)| PrimitiveRef { mesh, primitive })
            })
            .collect()
    }

    /// Semantic bone name of the `index`-th declared humanoid bone
    pub fn human_bone_name(&self, index: usize) -> Result<&str> {
        self.require_vrm()?
            .humanoid
            .human_bones
            .get(index)
            .and_then(|b| b.bone.as_deref())
            .ok_or_else(|| PrismError::out_of_range("humanBones", index))
    }

    /// Name of the `index`-th blend shape group, as the blend shape
    /// runtime registers it
    pub fn blend_shape_group_name(&self, index: usize) -> Result<Cow<'_, str>> {
        self.require_vrm()?
            .blend_shape_master
            .blend_shape_groups
            .get(index)
            .map(|g| g.name_or_default(index))
            .ok_or_else(|| PrismError::out_of_range("blendShapeGroups", index))
    }

    /// All paths this document can highlight, in document order
    pub fn highlightable_paths(&self) -> Vec<String> {
        let mut regions = Vec::new();

        regions.extend((0..self.root.nodes.len()).map(|node| Region::Node { node }));
        for (mesh, def) in self.root.meshes.iter().enumerate() {
            regions.push(Region::Mesh { mesh });
            regions.extend(
                (0..def.primitives.len()).map(|primitive| Region::Primitive { mesh, primitive }),
            );
        }
        regions.extend(
            (0..self.root.materials.len()).map(|material| Region::Material { material }),
        );

        if let Some(vrm) = self.vrm() {
            regions.extend(
                (0..vrm.humanoid.human_bones.len()).map(|index| Region::HumanBone { index }),
            );
            regions.push(Region::FirstPerson);
            regions.extend(
                (0..vrm.first_person.mesh_annotations.len())
                    .map(|i| Region::MeshAnnotation { index: Some(i) }),
            );
            regions.extend(
                (0..vrm.blend_shape_master.blend_shape_groups.len())
                    .map(|index| Region::BlendShapeGroup { index }),
            );
            regions.extend(
                (0..vrm.secondary_animation.bone_groups.len())
                    .map(|index| Region::BoneGroup { index }),
            );
        }

        regions
            .iter()
            .map(|r| r.to_path(VRM_EXTENSION))
            .collect()
    }
}

/// Reject dangling node/mesh/material references
fn validate(root: &GltfRoot) -> Result<()> {
    let node_count = root.nodes.len();
    for (i, node) in root.nodes.iter().enumerate() {
        if let Some(&child) = node.children.iter().find(|&&c| c >= node_count) {
            return Err(PrismError::ParseError(format!(
                "node {} references missing child {}",
                i, child
            )));
        }
        if let Some(mesh) = node.mesh.filter(|&m| m >= root.meshes.len()) {
            return Err(PrismError::ParseError(format!(
                "node {} references missing mesh {}",
                i, mesh
            )));
        }
    }
    for (i, mesh) in root.meshes.iter().enumerate() {
        for (j, primitive) in mesh.primitives.iter().enumerate() {
            if let Some(material) = primitive.material.filter(|&m| m >= root.materials.len()) {
                return Err(PrismError::ParseError(format!(
                    "mesh {} primitive {} references missing material {}",
                    i, j, material
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample;

    fn glb_from_json(json: &serde_json::Value) -> Vec<u8> {
        let mut chunk = serde_json::to_vec(json).unwrap();
        while chunk.len() % 4 != 0 {
            chunk.push(b' ');
        }
        let total = 12 + 8 + chunk.len();
        let mut bytes = Vec::with_capacity(total);
        bytes.extend_from_slice(b"glTF");
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&(total as u32).to_le_bytes());
        bytes.extend_from_slice(&(chunk.len() as u32).to_le_bytes());
        bytes.extend_from_slice(b"JSON");
        bytes.extend_from_slice(&chunk);
        bytes
    }

    #[test]
    fn test_parse_json_document() {
        let bytes = serde_json::to_vec(&sample::sample_avatar()).unwrap();
        let doc = VrmDocument::from_slice(&bytes).unwrap();
        assert_eq!(doc.root().nodes.len(), sample::NODE_COUNT);
        assert_eq!(doc.title(), Some("Prism Sample"));
        assert_eq!(doc.binary_len(), 0);
    }

    #[test]
    fn test_parse_glb_document() {
        let bytes = glb_from_json(&sample::sample_avatar());
        let doc = VrmDocument::from_slice(&bytes).unwrap();
        assert_eq!(doc.root().meshes.len(), 3);
        assert!(doc.vrm().is_some());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(VrmDocument::from_slice(b"not json").is_err());
        assert!(VrmDocument::from_slice(b"glTF\x02\x00\x00\x00").is_err());
        assert!(VrmDocument::from_json(serde_json::json!([1, 2])).is_err());
    }

    #[test]
    fn test_rejects_dangling_child() {
        let json = serde_json::json!({ "nodes": [ { "children": [5] } ] });
        assert!(matches!(
            VrmDocument::from_json(json),
            Err(PrismError::ParseError(_))
        ));
    }

    #[test]
    fn test_primitives_using_material() {
        let doc = VrmDocument::from_json(sample::sample_avatar()).unwrap();
        assert_eq!(
            doc.primitives_using_material(0),
            vec![
                PrimitiveRef {
                    mesh: 0,
                    primitive: 0
                },
                PrimitiveRef {
                    mesh: 0,
                    primitive: 2
                },
            ]
        );
        assert!(doc.primitives_using_material(99).is_empty());
    }

    #[test]
    fn test_named_lookups() {
        let doc = VrmDocument::from_json(sample::sample_avatar()).unwrap();
        assert_eq!(doc.human_bone_name(0).unwrap(), "hips");
        assert_eq!(doc.blend_shape_group_name(1).unwrap(), "A");
        assert!(matches!(
            doc.blend_shape_group_name(3),
            Err(PrismError::IndexOutOfRange { .. })
        ));
        assert!(matches!(
            doc.human_bone_name(100),
            Err(PrismError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_unnamed_blend_shape_group_gets_fallback_name() {
        let mut json = sample::sample_avatar();
        json["extensions"]["VRM"]["blendShapeMaster"]["blendShapeGroups"][0]
            .as_object_mut()
            .unwrap()
            .remove("name");
        let doc = VrmDocument::from_json(json).unwrap();
        assert_eq!(doc.blend_shape_group_name(0).unwrap(), "group_0");
    }

    #[test]
    fn test_plain_gltf_has_no_vrm() {
        let doc = VrmDocument::from_json(serde_json::json!({ "nodes": [ {} ] })).unwrap();
        assert!(matches!(
            doc.require_vrm(),
            Err(PrismError::MissingExtension(_))
        ));
        assert_eq!(doc.highlightable_paths(), vec!["/nodes/0".to_string()]);
    }

    #[test]
    fn test_pointer_and_paths_agree() {
        let doc = VrmDocument::from_json(sample::sample_avatar()).unwrap();
        let paths = doc.highlightable_paths();
        assert!(paths.contains(&"/extensions/VRM/firstPerson".to_string()));
        for path in &paths {
            assert!(doc.pointer(path).is_some(), "{} not in document", path);
            assert!(Region::parse(path).is_some());
        }
    }
}
