//! Spring bone secondary animation
//!
//! Each bone simulates the tip of a virtual tail with verlet integration,
//! pulled back toward its rest direction by stiffness, damped by drag,
//! pushed by gravity and kept outside sphere colliders. The resulting
//! direction is written back as the bone's local rotation.

use crate::graph::{Gizmo, GizmoShape, SceneGraph, Transform};
use crate::material::MaterialId;
use glam::{Quat, Vec3};
use hecs::Entity;
use prism_core::{Color, PrismError, Result};
use prism_vrm::{BoneGroup, SecondaryAnimation};
use std::collections::HashSet;

/// Tail length used for bones without children
const LEAF_TAIL_LENGTH: f32 = 0.07;

/// Default color of the spring bone debug arrows
pub const GIZMO_COLOR: Color = Color::YELLOW;

/// How spring bone gizmos are drawn
#[derive(Debug, Clone, Copy)]
pub struct GizmoStyle {
    pub color: Color,
    pub render_order: i32,
}

impl Default for GizmoStyle {
    fn default() -> Self {
        Self {
            color: GIZMO_COLOR,
            render_order: 10_000,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SphereCollider {
    node: Entity,
    offset: Vec3,
    radius: f32,
}

#[derive(Debug, Clone)]
pub struct SpringBone {
    node: Entity,
    gizmo: Entity,
    initial_local_rotation: Quat,
    /// Unit rest direction of the tail in the bone's local space
    bone_axis: Vec3,
    length: f32,
    current_tail: Vec3,
    prev_tail: Vec3,
}

impl SpringBone {
    /// `child` is the next bone of the chain, `None` for a leaf
    fn new(graph: &SceneGraph, node: Entity, child: Option<Entity>, gizmo: Entity) -> Self {
        let transform = graph.transform(node).unwrap_or_default();
        let local_tail = match child {
            Some(child) => graph.transform(child).unwrap_or_default().translation,
            None => {
                let dir = transform.translation.normalize_or_zero();
                if dir == Vec3::ZERO {
                    Vec3::Y * LEAF_TAIL_LENGTH
                } else {
                    dir * LEAF_TAIL_LENGTH
                }
            }
        };
        let bone_axis = local_tail.try_normalize().unwrap_or(Vec3::Y);
        let world = graph.world_matrix(node);
        let length = world.transform_vector3(local_tail).length();
        let tail = world.transform_point3(local_tail);

        Self {
            node,
            gizmo,
            initial_local_rotation: transform.rotation,
            bone_axis,
            length,
            current_tail: tail,
            prev_tail: tail,
        }
    }

    pub fn node(&self) -> Entity {
        self.node
    }

    pub fn gizmo(&self) -> Entity {
        self.gizmo
    }

    fn step(&mut self, graph: &mut SceneGraph, settings: &BoneSettings, colliders: &[SphereCollider], dt: f32) {
        if !graph.contains(self.node) {
            return;
        }
        let parent_rotation = graph
            .parent(self.node)
            .map(|p| graph.world_rotation(p))
            .unwrap_or(Quat::IDENTITY);
        let rest_rotation = parent_rotation * self.initial_local_rotation;
        let head = graph.world_position(self.node);

        let inertia = (self.current_tail - self.prev_tail) * (1.0 - settings.drag);
        let stiffness = rest_rotation * self.bone_axis * settings.stiffness * dt;
        let external = settings.gravity_dir * settings.gravity_power * dt;
        let mut next_tail = self.current_tail + inertia + stiffness + external;

        next_tail = head + (next_tail - head).normalize_or_zero() * self.length;

        for collider in colliders {
            if !graph.contains(collider.node) {
                continue;
            }
            let center = graph.world_matrix(collider.node).transform_point3(collider.offset);
            let reach = collider.radius + settings.hit_radius;
            let offset = next_tail - center;
            if offset.length_squared() <= reach * reach {
                next_tail = center + offset.normalize_or_zero() * reach;
                next_tail = head + (next_tail - head).normalize_or_zero() * self.length;
            }
        }

        self.prev_tail = self.current_tail;
        self.current_tail = next_tail;

        if let Some(to) = (rest_rotation.inverse() * (next_tail - head)).try_normalize() {
            let rotation = self.initial_local_rotation * Quat::from_rotation_arc(self.bone_axis, to);
            if let Some(mut t) = graph.transform(self.node) {
                t.rotation = rotation;
                graph.set_transform(self.node, t);
            }
        }

        self.sync_gizmo(graph);
    }

    /// Place the arrow gizmo at the bone head, pointing at the tail
    fn sync_gizmo(&self, graph: &mut SceneGraph) {
        let Some(parent) = graph.parent(self.gizmo) else {
            return;
        };
        let to_local = graph.world_matrix(parent).inverse();
        let head = graph.world_position(self.node);
        let translation = to_local.transform_point3(head);
        let direction = to_local
            .transform_vector3(self.current_tail - head)
            .normalize_or_zero();

        graph.set_transform(self.gizmo, Transform::from_translation(translation));
        if let Ok(mut gizmo) = graph.world_mut().get::<&mut Gizmo>(self.gizmo) {
            gizmo.shape = GizmoShape::Arrow {
                direction,
                length: self.length,
            };
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct BoneSettings {
    stiffness: f32,
    gravity_power: f32,
    gravity_dir: Vec3,
    drag: f32,
    hit_radius: f32,
}

impl From<&BoneGroup> for BoneSettings {
    fn from(def: &BoneGroup) -> Self {
        Self {
            stiffness: def.stiffiness,
            gravity_power: def.gravity_power,
            gravity_dir: Vec3::from_array(def.gravity_dir.to_array()),
            drag: def.drag_force.clamp(0.0, 1.0),
            hit_radius: def.hit_radius,
        }
    }
}

#[derive(Debug, Clone)]
struct SpringBoneGroup {
    settings: BoneSettings,
    bones: Vec<SpringBone>,
    collider_groups: Vec<usize>,
}

/// All spring bone groups of an avatar, in document order
#[derive(Debug, Clone, Default)]
pub struct SpringBoneManager {
    groups: Vec<SpringBoneGroup>,
    collider_groups: Vec<Vec<SphereCollider>>,
}

impl SpringBoneManager {
    /// Build the runtime and spawn one arrow gizmo per bone under
    /// `gizmo_parent`. Each listed bone is the root of a chain: it and
    /// every node below it are simulated, mesh objects excluded.
    pub fn from_def(
        def: &SecondaryAnimation,
        nodes: &[Entity],
        graph: &mut SceneGraph,
        gizmo_parent: Entity,
        style: GizmoStyle,
    ) -> Result<Self> {
        let collider_groups = def
            .collider_groups
            .iter()
            .map(|group| -> Vec<SphereCollider> {
                let Some(&node) = group.node.and_then(|n| nodes.get(n)) else {
                    log::warn!("collider group references missing node {:?}", group.node);
                    return Vec::new();
                };
                group
                    .colliders
                    .iter()
                    .map(|c| SphereCollider {
                        node,
                        offset: Vec3::from_array(c.offset.to_array()),
                        radius: c.radius,
                    })
                    .collect()
            })
            .collect();

        let node_set: HashSet<Entity> = nodes.iter().copied().collect();
        let mut groups = Vec::with_capacity(def.bone_groups.len());
        for (i, group) in def.bone_groups.iter().enumerate() {
            let mut bones = Vec::with_capacity(group.bones.len());
            for &bone in &group.bones {
                let Some(&root) = nodes.get(bone) else {
                    log::warn!("spring bone group {} references missing node {}", i, bone);
                    continue;
                };
                // Pre-order, so a parent always steps before its children
                let chain: Vec<Entity> = graph
                    .descendants(root)
                    .into_iter()
                    .filter(|e| node_set.contains(e))
                    .collect();
                for node in chain {
                    let child = graph
                        .children(node)
                        .into_iter()
                        .find(|c| node_set.contains(c));
                    let gizmo = spawn_gizmo(graph, gizmo_parent, node, style)?;
                    let spring = SpringBone::new(graph, node, child, gizmo);
                    spring.sync_gizmo(graph);
                    bones.push(spring);
                }
            }
            groups.push(SpringBoneGroup {
                settings: BoneSettings::from(group),
                bones,
                collider_groups: group.collider_groups.clone(),
            });
        }

        Ok(Self {
            groups,
            collider_groups,
        })
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Bones of group `index`, `None` if out of range
    pub fn group(&self, index: usize) -> Option<&[SpringBone]> {
        self.groups.get(index).map(|g| g.bones.as_slice())
    }

    /// Gizmo entities of group `index`, `None` if out of range
    pub fn gizmos(&self, index: usize) -> Option<Vec<Entity>> {
        self.group(index)
            .map(|bones| bones.iter().map(SpringBone::gizmo).collect())
    }

    /// Advance every bone by `dt` seconds
    pub fn update(&mut self, graph: &mut SceneGraph, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        for group in &mut self.groups {
            let colliders: Vec<SphereCollider> = group
                .collider_groups
                .iter()
                .filter_map(|&i| self.collider_groups.get(i))
                .flatten()
                .copied()
                .collect();
            for bone in &mut group.bones {
                bone.step(graph, &group.settings, &colliders, dt);
            }
        }
    }
}

fn spawn_gizmo(graph: &mut SceneGraph, parent: Entity, node: Entity, style: GizmoStyle) -> Result<Entity> {
    let name = format!("{} (spring)", graph.name(node).unwrap_or_default());
    let gizmo = graph.spawn(name, Transform::IDENTITY);
    graph
        .world_mut()
        .insert_one(
            gizmo,
            Gizmo {
                shape: GizmoShape::Arrow {
                    direction: Vec3::Y,
                    length: 0.0,
                },
                color: style.color,
                material: MaterialId::GIZMO_WIREFRAME,
                frustum_culled: false,
                render_order: style.render_order,
            },
        )
        .map_err(|e| PrismError::SceneError(e.to_string()))?;
    graph.add_child(parent, gizmo)?;
    Ok(gizmo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::instantiate;
    use crate::material::MaterialLibrary;
    use prism_vrm::sample::{self, nodes};
    use prism_vrm::VrmDocument;

    fn setup(doc: &VrmDocument) -> (SceneGraph, Vec<Entity>, Entity, SpringBoneManager) {
        let mut graph = SceneGraph::new();
        let mut library = MaterialLibrary::new(Color::WHITE);
        let avatar = instantiate(doc, &mut graph, &mut library).unwrap();
        graph.add_child(graph.root(), avatar.root).unwrap();
        let manager = SpringBoneManager::from_def(
            &doc.vrm().unwrap().secondary_animation,
            &avatar.nodes,
            &mut graph,
            avatar.root,
            GizmoStyle::default(),
        )
        .unwrap();
        (graph, avatar.nodes, avatar.root, manager)
    }

    #[test]
    fn test_one_gizmo_per_bone() {
        let doc = VrmDocument::from_json(sample::sample_avatar()).unwrap();
        let (graph, _, root, manager) = setup(&doc);

        assert_eq!(manager.group_count(), 2);
        assert_eq!(manager.gizmos(1).unwrap().len(), 1);
        let gizmos = manager.gizmos(0).unwrap();
        assert_eq!(gizmos.len(), 2);
        assert!(manager.gizmos(2).is_none());

        for g in gizmos {
            assert_eq!(graph.parent(g), Some(root));
            let gizmo = graph.world().get::<&Gizmo>(g).unwrap();
            assert_eq!(gizmo.color, GIZMO_COLOR);
            assert!(!gizmo.frustum_culled);
            assert_eq!(gizmo.render_order, 10_000);
        }
    }

    #[test]
    fn test_listed_bone_simulates_whole_chain() {
        let doc = VrmDocument::from_json(sample::sample_avatar()).unwrap();
        let (graph, nodes, _, manager) = setup(&doc);

        let hair: Vec<Entity> = manager.group(0).unwrap().iter().map(SpringBone::node).collect();
        assert_eq!(hair, vec![nodes[nodes::HAIR_ROOT], nodes[nodes::HAIR_TIP]]);

        // The accessory's mesh object sits below its node but is not a bone
        let accessory = manager.group(1).unwrap();
        assert_eq!(accessory.len(), 1);
        assert_eq!(accessory[0].node(), nodes[nodes::ACCESSORY]);
        assert!(!graph.children(nodes[nodes::ACCESSORY]).is_empty());
        assert!((accessory[0].length - LEAF_TAIL_LENGTH).abs() < 1e-5);

        // Root tail points at the next bone of the chain
        let root = &manager.group(0).unwrap()[0];
        assert!((root.current_tail - graph.world_position(nodes[nodes::HAIR_TIP])).length() < 1e-5);
    }

    #[test]
    fn test_gizmo_follows_bone() {
        let doc = VrmDocument::from_json(sample::sample_avatar()).unwrap();
        let (mut graph, nodes, _, mut manager) = setup(&doc);

        let hair = nodes[nodes::HAIR_ROOT];
        let gizmo = manager.gizmos(0).unwrap()[0];
        let mut t = graph.transform(nodes[nodes::HIPS]).unwrap();
        t.translation += Vec3::new(0.5, 0.0, 0.0);
        graph.set_transform(nodes[nodes::HIPS], t);

        manager.update(&mut graph, 1.0 / 60.0);

        let head = graph.world_position(hair);
        let placed = graph.world_position(gizmo);
        assert!((head - placed).length() < 1e-4);
    }

    #[test]
    fn test_gravity_bends_tail() {
        let mut json = sample::sample_avatar();
        json["extensions"]["VRM"]["secondaryAnimation"]["boneGroups"][0]["gravityPower"] =
            serde_json::json!(2.0);
        json["extensions"]["VRM"]["secondaryAnimation"]["boneGroups"][0]["stiffiness"] =
            serde_json::json!(0.0);
        let doc = VrmDocument::from_json(json).unwrap();
        let (mut graph, nodes, _, mut manager) = setup(&doc);
        let hair = nodes[nodes::HAIR_ROOT];
        let before = graph.transform(hair).unwrap().rotation;

        for _ in 0..30 {
            manager.update(&mut graph, 1.0 / 60.0);
        }

        let after = graph.transform(hair).unwrap().rotation;
        assert!(before.angle_between(after) > 1e-3);
        let bone = &manager.group(0).unwrap()[0];
        assert_eq!(bone.node(), hair);
        // Tail keeps its length
        let tail_len = (bone.current_tail - graph.world_position(hair)).length();
        assert!((tail_len - bone.length).abs() < 1e-4);
    }

    #[test]
    fn test_zero_dt_is_noop() {
        let doc = VrmDocument::from_json(sample::sample_avatar()).unwrap();
        let (mut graph, nodes, _, mut manager) = setup(&doc);
        let hair = nodes[nodes::HAIR_ROOT];
        let before = graph.transform(hair).unwrap();
        manager.update(&mut graph, 0.0);
        assert_eq!(graph.transform(hair).unwrap(), before);
    }
}
