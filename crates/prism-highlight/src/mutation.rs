//! Reversible scene mutations
//!
//! Every change a highlight makes is recorded together with the value it
//! replaced. A [`MutationSet`] is undone exactly once, in reverse order of
//! application, and only against the avatar load it was applied to.

use crate::style::HighlightStyle;
use glam::Vec3;
use hecs::Entity;
use prism_core::{Color, PrismError, Result};
use prism_scene::{
    Gizmo, GizmoShape, HostState, MaterialId, MaterialSlots, MeshRenderer, SceneGraph, Transform,
    ViewLayerMode,
};

/// One applied change and what it replaced
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Slot 0 of a multi-material mesh was swapped for the highlight material
    MaterialSlot { entity: Entity, previous: MaterialId },
    /// A gizmo was attached under an avatar node
    AttachedGizmo { gizmo: Entity },
    /// A gizmo was added directly to the scene, outside the avatar
    SceneGizmo { gizmo: Entity },
    /// A gizmo was recolored
    GizmoColor { gizmo: Entity, previous: Color },
    /// A blend shape group weight was overridden
    BlendShapeWeight { group: String, previous: f32 },
    /// The view layer mode was changed; undo sets `restore`
    ViewLayerMode { restore: ViewLayerMode },
}

impl Mutation {
    fn undo(self, state: &mut HostState, current: bool) {
        match self {
            // Scene gizmos do not belong to any avatar, so they go away
            // even after a reload
            Mutation::SceneGizmo { gizmo } => state.graph_mut().despawn_recursive(gizmo),
            _ if !current => {}
            Mutation::MaterialSlot { entity, previous } => {
                if let Ok(mut renderer) = state.graph_mut().world_mut().get::<&mut MeshRenderer>(entity) {
                    if let MaterialSlots::Multi(ids) = &mut renderer.materials {
                        if let Some(slot) = ids.first_mut() {
                            *slot = previous;
                        }
                    }
                }
            }
            Mutation::AttachedGizmo { gizmo } => state.graph_mut().despawn_recursive(gizmo),
            Mutation::GizmoColor { gizmo, previous } => {
                if let Ok(mut g) = state.graph_mut().world_mut().get::<&mut Gizmo>(gizmo) {
                    g.color = previous;
                }
            }
            Mutation::BlendShapeWeight { group, previous } => {
                if let Some(avatar) = state.avatar_mut() {
                    avatar.blend_shapes_mut().set_value(&group, previous);
                }
            }
            Mutation::ViewLayerMode { restore } => {
                if let Err(e) = state.set_view_layer_mode(restore) {
                    log::warn!("cannot restore view layer mode: {}", e);
                }
            }
        }
    }
}

/// The mutations of one highlight, tied to the avatar generation they
/// were applied against
#[derive(Debug, Clone, PartialEq)]
pub struct MutationSet {
    generation: u64,
    mutations: Vec<Mutation>,
}

impl MutationSet {
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            mutations: Vec::new(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn push(&mut self, mutation: Mutation) {
        self.mutations.push(mutation);
    }

    pub fn extend(&mut self, mutations: impl IntoIterator<Item = Mutation>) {
        self.mutations.extend(mutations);
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Undo every mutation, last applied first. Mutations of a replaced
    /// avatar are skipped; scene gizmos are always removed.
    pub fn undo(self, state: &mut HostState) {
        let current = state.is_current(self.generation);
        if !current {
            log::debug!(
                "avatar generation {} was replaced; skipping {} mutation(s)",
                self.generation,
                self.mutations.len()
            );
        }
        for mutation in self.mutations.into_iter().rev() {
            mutation.undo(state, current);
        }
    }
}

/// Swap slot 0 of a multi-material mesh for the highlight material.
/// Single-material meshes and non-meshes are left alone.
pub fn swap_material(graph: &mut SceneGraph, entity: Entity) -> Option<Mutation> {
    let mut renderer = graph.world_mut().get::<&mut MeshRenderer>(entity).ok()?;
    let MaterialSlots::Multi(ids) = &mut renderer.materials else {
        return None;
    };
    let slot = ids.first_mut()?;
    let previous = std::mem::replace(slot, MaterialId::HIGHLIGHT);
    Some(Mutation::MaterialSlot { entity, previous })
}

/// Swap slot 0 on every mesh in the subtree of `entity`
pub fn swap_materials_below(graph: &mut SceneGraph, entity: Entity) -> Vec<Mutation> {
    graph
        .descendants(entity)
        .into_iter()
        .filter_map(|e| swap_material(graph, e))
        .collect()
}

fn spawn_sphere(graph: &mut SceneGraph, name: &str, position: Vec3, style: &HighlightStyle) -> Result<Entity> {
    let gizmo = graph.spawn(name, Transform::from_translation(position));
    graph
        .world_mut()
        .insert_one(
            gizmo,
            Gizmo {
                shape: GizmoShape::Sphere {
                    radius: style.gizmo_radius,
                },
                color: style.color,
                material: MaterialId::GIZMO_WIREFRAME,
                frustum_culled: false,
                render_order: style.render_order,
            },
        )
        .map_err(|e| PrismError::SceneError(e.to_string()))?;
    Ok(gizmo)
}

/// Attach a sphere gizmo at the origin of `parent`
pub fn attach_sphere(graph: &mut SceneGraph, parent: Entity, style: &HighlightStyle) -> Result<Mutation> {
    let gizmo = spawn_sphere(graph, "highlight", Vec3::ZERO, style)?;
    if let Err(e) = graph.add_child(parent, gizmo) {
        graph.despawn_recursive(gizmo);
        return Err(e);
    }
    Ok(Mutation::AttachedGizmo { gizmo })
}

/// Add a sphere gizmo to the scene root at a world position
pub fn scene_sphere(graph: &mut SceneGraph, position: Vec3, style: &HighlightStyle) -> Result<Mutation> {
    let gizmo = spawn_sphere(graph, "highlight", position, style)?;
    let root = graph.root();
    graph.add_child(root, gizmo)?;
    Ok(Mutation::SceneGizmo { gizmo })
}

/// Recolor a gizmo, remembering its current color
pub fn recolor_gizmo(graph: &mut SceneGraph, gizmo: Entity, color: Color) -> Option<Mutation> {
    let mut g = graph.world_mut().get::<&mut Gizmo>(gizmo).ok()?;
    let previous = std::mem::replace(&mut g.color, color);
    Some(Mutation::GizmoColor { gizmo, previous })
}
