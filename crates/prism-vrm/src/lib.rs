//! Prism VRM - Avatar document model
//!
//! Parses glTF/GLB avatars carrying the `VRM` extension into an immutable
//! [`VrmDocument`], and maps document paths (JSON pointers) onto the
//! closed set of highlightable [`Region`]s.

mod document;
mod path;
pub mod sample;
mod types;

pub use document::{PrimitiveRef, VrmDocument};
pub use path::{Region, VRM_EXTENSION};
pub use types::{
    BlendShapeBind, BlendShapeGroup, BlendShapeMaster, BoneGroup, Collider, ColliderGroup,
    FirstPerson, FirstPersonFlag, GltfRoot, HumanBone, Humanoid, JsonVec3, MaterialDef,
    MaterialProperties, MeshAnnotation, MeshDef, Meta, NodeDef, PrimitiveDef, RootExtensions,
    SceneDef, SecondaryAnimation, VrmExtension,
};
