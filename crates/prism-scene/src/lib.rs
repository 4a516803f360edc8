//! Prism Scene - Live scene host for the Prism avatar inspector
//!
//! This crate owns everything that exists at runtime once an avatar is loaded:
//! - `SceneGraph` - hecs world with parent/child hierarchy and render layers
//! - `SceneHost` - avatar loading, dependency resolution, view layer mode, frames
//! - VRM runtimes - humanoid bones, first person, blend shapes, spring bones

mod blend_shape;
mod builder;
mod camera;
mod event_bus;
mod first_person;
mod frame;
mod graph;
mod host;
mod humanoid;
mod material;
mod resolver;
mod spring_bone;

pub use blend_shape::BlendShapeProxy;
pub use builder::{instantiate, InstantiatedAvatar};
pub use camera::{Camera, ViewLayerMode};
pub use event_bus::{EventBus, HostEvent};
pub use first_person::FirstPerson;
pub use frame::{DrawItem, DrawKind, Frame};
pub use graph::{
    Children, Gizmo, GizmoShape, Helper, Layers, MaterialSlots, MeshRenderer, Name, Parent,
    SceneGraph, Transform,
};
pub use host::{Avatar, AvatarInfo, AvatarSource, HostState, SceneHost, WeakSceneHost};
pub use humanoid::Humanoid;
pub use material::{Material, MaterialId, MaterialKind, MaterialLibrary};
pub use resolver::{DependencyFuture, DependencyKind, DependencyResolver, LiveObject, ResolveError};
pub use spring_bone::{GizmoStyle, SpringBone, SpringBoneManager, GIZMO_COLOR};
