//! Scene graph stored in a hecs world
//!
//! Hierarchy is expressed with [`Parent`] / [`Children`] components.
//! Entities are generational, so a handle to a despawned object fails
//! every lookup instead of aliasing a newer one.

use glam::{Mat4, Quat, Vec3};
use hecs::{Entity, World};
use prism_core::{Color, PrismError, Result};

use crate::material::MaterialId;

/// Display name of a scene object
#[derive(Debug, Clone)]
pub struct Name(pub String);

/// Local transform relative to the parent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn from_matrix(matrix: Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Parent(pub Entity);

#[derive(Debug, Clone, Default)]
pub struct Children(pub Vec<Entity>);

/// Render layer membership, one bit per layer. New objects are on layer 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layers(pub u32);

impl Default for Layers {
    fn default() -> Self {
        Self(1)
    }
}

impl Layers {
    /// Membership of exactly one layer
    pub fn only(layer: u8) -> Self {
        Self(1 << layer)
    }

    pub fn set(&mut self, layer: u8) {
        self.0 = 1 << layer;
    }

    pub fn enable(&mut self, layer: u8) {
        self.0 |= 1 << layer;
    }

    pub fn disable(&mut self, layer: u8) {
        self.0 &= !(1 << layer);
    }

    pub fn is_enabled(&self, layer: u8) -> bool {
        self.0 & (1 << layer) != 0
    }

    pub fn intersects(&self, other: Layers) -> bool {
        self.0 & other.0 != 0
    }
}

/// Material assignment of a renderable primitive.
///
/// VRM shader materials are instantiated as an array (surface, optional
/// outline); plain glTF materials as a single material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterialSlots {
    Single(MaterialId),
    Multi(Vec<MaterialId>),
}

impl MaterialSlots {
    pub fn as_slice(&self) -> &[MaterialId] {
        match self {
            MaterialSlots::Single(id) => std::slice::from_ref(id),
            MaterialSlots::Multi(ids) => ids,
        }
    }
}

/// A renderable primitive
#[derive(Debug, Clone)]
pub struct MeshRenderer {
    pub mesh_index: usize,
    pub primitive_index: usize,
    pub materials: MaterialSlots,
    /// Morph target influences, written by the blend shape proxy
    pub morph_weights: Vec<f32>,
    pub frustum_culled: bool,
    pub render_order: i32,
}

/// Shape of a debug gizmo
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GizmoShape {
    Sphere { radius: f32 },
    Arrow { direction: Vec3, length: f32 },
}

/// A debug gizmo, drawn on top of the avatar in a fixed wireframe style
#[derive(Debug, Clone)]
pub struct Gizmo {
    pub shape: GizmoShape,
    pub color: Color,
    pub material: MaterialId,
    pub frustum_culled: bool,
    pub render_order: i32,
}

/// Marker for non-avatar scene furniture (light, grid, axes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Helper {
    DirectionalLight,
    Grid,
    Axes,
}

/// Hecs world with a single scene root
pub struct SceneGraph {
    world: World,
    root: Entity,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        let mut world = World::new();
        let root = world.spawn((
            Name("Scene".to_string()),
            Transform::IDENTITY,
            Children::default(),
        ));
        Self { world, root }
    }

    /// The scene root; never despawned
    pub fn root(&self) -> Entity {
        self.root
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Spawn a detached object
    pub fn spawn(&mut self, name: impl Into<String>, transform: Transform) -> Entity {
        self.world.spawn((
            Name(name.into()),
            transform,
            Children::default(),
            Layers::default(),
        ))
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.world.contains(entity)
    }

    pub fn name(&self, entity: Entity) -> Option<String> {
        self.world.get::<&Name>(entity).ok().map(|n| n.0.clone())
    }

    pub fn parent(&self, entity: Entity) -> Option<Entity> {
        self.world.get::<&Parent>(entity).ok().map(|p| p.0)
    }

    pub fn children(&self, entity: Entity) -> Vec<Entity> {
        self.world
            .get::<&Children>(entity)
            .map(|c| c.0.clone())
            .unwrap_or_default()
    }

    /// Attach `child` under `parent`, detaching it from any previous parent
    pub fn add_child(&mut self, parent: Entity, child: Entity) -> Result<()> {
        if !self.contains(parent) || !self.contains(child) {
            return Err(PrismError::SceneError(format!(
                "cannot attach {:?} to {:?}: object no longer exists",
                child, parent
            )));
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(PrismError::SceneError(format!(
                "attaching {:?} to {:?} would create a cycle",
                child, parent
            )));
        }
        self.detach(child);

        let pushed = match self.world.get::<&mut Children>(parent) {
            Ok(mut children) => {
                children.0.push(child);
                true
            }
            Err(_) => false,
        };
        if !pushed {
            self.world
                .insert_one(parent, Children(vec![child]))
                .map_err(|e| PrismError::SceneError(e.to_string()))?;
        }
        self.world
            .insert_one(child, Parent(parent))
            .map_err(|e| PrismError::SceneError(e.to_string()))?;
        Ok(())
    }

    /// Remove `child` from `parent`. Returns false if it was not a child.
    pub fn remove_child(&mut self, parent: Entity, child: Entity) -> bool {
        if self.parent(child) != Some(parent) {
            return false;
        }
        self.detach(child);
        true
    }

    /// Detach an object from its parent, keeping it alive
    pub fn detach(&mut self, entity: Entity) {
        let Some(parent) = self.parent(entity) else {
            return;
        };
        if let Ok(mut children) = self.world.get::<&mut Children>(parent) {
            children.0.retain(|&c| c != entity);
        }
        let _ = self.world.remove_one::<Parent>(entity);
    }

    /// Detach and despawn an object with its whole subtree
    pub fn despawn_recursive(&mut self, entity: Entity) {
        if entity == self.root || !self.contains(entity) {
            return;
        }
        self.detach(entity);
        for e in self.descendants(entity) {
            let _ = self.world.despawn(e);
        }
    }

    /// `entity` and all objects below it, depth first, parents first
    pub fn descendants(&self, entity: Entity) -> Vec<Entity> {
        let mut out = Vec::new();
        let mut stack = vec![entity];
        while let Some(e) = stack.pop() {
            if !self.contains(e) {
                continue;
            }
            out.push(e);
            let children = self.children(e);
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Whether `ancestor` is above `entity` in the hierarchy
    pub fn is_ancestor(&self, ancestor: Entity, entity: Entity) -> bool {
        let mut current = self.parent(entity);
        while let Some(e) = current {
            if e == ancestor {
                return true;
            }
            current = self.parent(e);
        }
        false
    }

    /// Whether the object is attached (directly or not) to the scene root
    pub fn is_in_scene(&self, entity: Entity) -> bool {
        entity == self.root || (self.contains(entity) && self.is_ancestor(self.root, entity))
    }

    pub fn transform(&self, entity: Entity) -> Option<Transform> {
        self.world.get::<&Transform>(entity).ok().map(|t| *t)
    }

    pub fn set_transform(&mut self, entity: Entity, transform: Transform) {
        if let Ok(mut t) = self.world.get::<&mut Transform>(entity) {
            *t = transform;
        }
    }

    /// World matrix, accumulated root to leaf along the parent chain
    pub fn world_matrix(&self, entity: Entity) -> Mat4 {
        let local = self
            .transform(entity)
            .map(|t| t.to_matrix())
            .unwrap_or(Mat4::IDENTITY);
        match self.parent(entity) {
            Some(parent) => self.world_matrix(parent) * local,
            None => local,
        }
    }

    pub fn world_position(&self, entity: Entity) -> Vec3 {
        self.world_matrix(entity).transform_point3(Vec3::ZERO)
    }

    pub fn world_rotation(&self, entity: Entity) -> Quat {
        let (_, rotation, _) = self.world_matrix(entity).to_scale_rotation_translation();
        rotation
    }

    pub fn layers(&self, entity: Entity) -> Layers {
        self.world
            .get::<&Layers>(entity)
            .map(|l| *l)
            .unwrap_or_default()
    }

    pub fn set_layers(&mut self, entity: Entity, layers: Layers) {
        // insert_one replaces an existing component
        let _ = self.world.insert_one(entity, layers);
    }
}
