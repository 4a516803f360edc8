//! Per-frame draw list

use crate::camera::Camera;
use crate::graph::{Gizmo, GizmoShape, Helper, MeshRenderer, SceneGraph};
use crate::material::MaterialId;
use hecs::Entity;
use prism_core::Color;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawKind {
    Mesh { materials: Vec<MaterialId> },
    Gizmo { shape: GizmoShape, color: Color },
    Helper(Helper),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub entity: Entity,
    pub kind: DrawKind,
    pub render_order: i32,
    pub frustum_culled: bool,
}

/// Everything the camera would draw this frame, in draw order
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub index: u64,
    pub draws: Vec<DrawItem>,
}

impl Frame {
    /// Walk the scene from the root, keep objects on an enabled camera
    /// layer and sort them by render order. Ties keep traversal order.
    pub fn collect(graph: &SceneGraph, camera: &Camera, index: u64) -> Self {
        let world = graph.world();
        let mut draws = Vec::new();

        for entity in graph.descendants(graph.root()) {
            if !graph.layers(entity).intersects(camera.layers) {
                continue;
            }
            if let Ok(renderer) = world.get::<&MeshRenderer>(entity) {
                draws.push(DrawItem {
                    entity,
                    kind: DrawKind::Mesh {
                        materials: renderer.materials.as_slice().to_vec(),
                    },
                    render_order: renderer.render_order,
                    frustum_culled: renderer.frustum_culled,
                });
            }
            if let Ok(gizmo) = world.get::<&Gizmo>(entity) {
                draws.push(DrawItem {
                    entity,
                    kind: DrawKind::Gizmo {
                        shape: gizmo.shape,
                        color: gizmo.color,
                    },
                    render_order: gizmo.render_order,
                    frustum_culled: gizmo.frustum_culled,
                });
            }
            if let Ok(helper) = world.get::<&Helper>(entity) {
                draws.push(DrawItem {
                    entity,
                    kind: DrawKind::Helper(*helper),
                    render_order: 0,
                    frustum_culled: false,
                });
            }
        }

        draws.sort_by_key(|d| d.render_order);
        Self { index, draws }
    }

    pub fn get(&self, entity: Entity) -> Option<&DrawItem> {
        self.draws.iter().find(|d| d.entity == entity)
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.get(entity).is_some()
    }

    pub fn gizmos(&self) -> impl Iterator<Item = &DrawItem> {
        self.draws
            .iter()
            .filter(|d| matches!(d.kind, DrawKind::Gizmo { .. }))
    }

    pub fn meshes(&self) -> impl Iterator<Item = &DrawItem> {
        self.draws
            .iter()
            .filter(|d| matches!(d.kind, DrawKind::Mesh { .. }))
    }
}
