//! Typed view of a glTF document and its VRM 0.x extension
//!
//! Only the fields the inspector reads are modelled; everything else stays
//! reachable through the raw JSON tree kept by [`crate::VrmDocument`].

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// glTF root object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GltfRoot {
    pub scene: Option<usize>,
    pub scenes: Vec<SceneDef>,
    pub nodes: Vec<NodeDef>,
    pub meshes: Vec<MeshDef>,
    pub materials: Vec<MaterialDef>,
    pub extensions_used: Vec<String>,
    pub extensions: RootExtensions,
}

/// Root-level extensions block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RootExtensions {
    #[serde(rename = "VRM", skip_serializing_if = "Option::is_none")]
    pub vrm: Option<VrmExtension>,
    /// Any other extension, kept untyped
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDef {
    pub name: Option<String>,
    pub nodes: Vec<usize>,
}

/// A glTF node: either TRS or a column-major matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeDef {
    pub name: Option<String>,
    pub children: Vec<usize>,
    pub mesh: Option<usize>,
    pub skin: Option<usize>,
    pub translation: [f32; 3],
    pub rotation: [f32; 4], // quaternion [x, y, z, w]
    pub scale: [f32; 3],
    pub matrix: Option<[f32; 16]>,
}

impl Default for NodeDef {
    fn default() -> Self {
        Self {
            name: None,
            children: Vec::new(),
            mesh: None,
            skin: None,
            translation: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: [1.0, 1.0, 1.0],
            matrix: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshDef {
    pub name: Option<String>,
    pub primitives: Vec<PrimitiveDef>,
    /// Default morph target weights
    pub weights: Vec<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimitiveDef {
    pub material: Option<usize>,
    pub mode: Option<u32>,
    /// Morph targets; only their count matters here
    pub targets: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MaterialDef {
    pub name: Option<String>,
    pub pbr_metallic_roughness: Option<PbrMetallicRoughness>,
    pub alpha_mode: Option<String>,
    pub double_sided: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PbrMetallicRoughness {
    pub base_color_factor: [f32; 4],
}

impl Default for PbrMetallicRoughness {
    fn default() -> Self {
        Self {
            base_color_factor: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

// --- VRM 0.x extension ---

/// `extensions.VRM`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VrmExtension {
    pub exporter_version: Option<String>,
    pub meta: Meta,
    pub humanoid: Humanoid,
    pub first_person: FirstPerson,
    pub blend_shape_master: BlendShapeMaster,
    pub secondary_animation: SecondaryAnimation,
    pub material_properties: Vec<MaterialProperties>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Meta {
    pub title: Option<String>,
    pub version: Option<String>,
    pub author: Option<String>,
    pub contact_information: Option<String>,
    pub allowed_user_name: Option<String>,
    pub license_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Humanoid {
    pub human_bones: Vec<HumanBone>,
}

/// One declared humanoid bone: a semantic name bound to a node
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HumanBone {
    pub bone: Option<String>,
    pub node: Option<usize>,
    pub use_default_values: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonVec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl JsonVec3 {
    pub fn to_array(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FirstPerson {
    /// Node index, `-1` or absent when unset
    pub first_person_bone: Option<i64>,
    pub first_person_bone_offset: Option<JsonVec3>,
    pub mesh_annotations: Vec<MeshAnnotation>,
    pub look_at_type_name: Option<String>,
}

impl FirstPerson {
    pub fn first_person_bone_index(&self) -> Option<usize> {
        self.first_person_bone
            .and_then(|i| usize::try_from(i).ok())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MeshAnnotation {
    pub mesh: Option<usize>,
    pub first_person_flag: Option<String>,
}

impl MeshAnnotation {
    pub fn flag(&self) -> FirstPersonFlag {
        self.first_person_flag
            .as_deref()
            .map(FirstPersonFlag::parse)
            .unwrap_or(FirstPersonFlag::Auto)
    }
}

/// Which camera a mesh renders for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstPersonFlag {
    Auto,
    Both,
    ThirdPersonOnly,
    FirstPersonOnly,
}

impl FirstPersonFlag {
    pub fn parse(s: &str) -> Self {
        match s {
            "Both" => Self::Both,
            "ThirdPersonOnly" => Self::ThirdPersonOnly,
            "FirstPersonOnly" => Self::FirstPersonOnly,
            _ => Self::Auto,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlendShapeMaster {
    pub blend_shape_groups: Vec<BlendShapeGroup>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlendShapeGroup {
    pub name: Option<String>,
    pub preset_name: Option<String>,
    pub binds: Vec<BlendShapeBind>,
    pub is_binary: bool,
}

impl BlendShapeGroup {
    /// Group name, or `group_{index}` when the document leaves it out
    pub fn name_or_default(&self, index: usize) -> Cow<'_, str> {
        match &self.name {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(format!("group_{}", index)),
        }
    }
}

/// Morph target binding; `weight` is in the 0..=100 range
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendShapeBind {
    pub mesh: Option<usize>,
    pub index: Option<usize>,
    pub weight: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SecondaryAnimation {
    pub bone_groups: Vec<BoneGroup>,
    pub collider_groups: Vec<ColliderGroup>,
}

/// A spring bone group. `stiffiness` is the format's own spelling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoneGroup {
    pub comment: Option<String>,
    pub stiffiness: f32,
    pub gravity_power: f32,
    pub gravity_dir: JsonVec3,
    pub drag_force: f32,
    /// Node index, `-1` when unset
    pub center: Option<i64>,
    pub hit_radius: f32,
    pub bones: Vec<usize>,
    pub collider_groups: Vec<usize>,
}

impl Default for BoneGroup {
    fn default() -> Self {
        Self {
            comment: None,
            stiffiness: 1.0,
            gravity_power: 0.0,
            gravity_dir: JsonVec3 {
                x: 0.0,
                y: -1.0,
                z: 0.0,
            },
            drag_force: 0.4,
            center: None,
            hit_radius: 0.02,
            bones: Vec::new(),
            collider_groups: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColliderGroup {
    pub node: Option<usize>,
    pub colliders: Vec<Collider>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Collider {
    pub offset: JsonVec3,
    pub radius: f32,
}

/// Per-material shader settings (MToon and friends)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MaterialProperties {
    pub name: Option<String>,
    pub shader: Option<String>,
    pub render_queue: Option<i32>,
    pub float_properties: BTreeMap<String, f32>,
    pub vector_properties: BTreeMap<String, Vec<f32>>,
    pub texture_properties: BTreeMap<String, usize>,
    pub keyword_map: BTreeMap<String, bool>,
    pub tag_map: BTreeMap<String, String>,
}

impl MaterialProperties {
    /// Shader name meaning "use the plain glTF material"
    pub const GLTF_SHADER: &'static str = "VRM_USE_GLTFSHADER";

    pub fn uses_vrm_shader(&self) -> bool {
        matches!(self.shader.as_deref(), Some(s) if s != Self::GLTF_SHADER)
    }

    pub fn has_outline(&self) -> bool {
        self.uses_vrm_shader()
            && self
                .float_properties
                .get("_OutlineWidthMode")
                .is_some_and(|mode| *mode > 0.0)
    }
}
