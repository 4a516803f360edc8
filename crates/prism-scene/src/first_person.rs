//! First-person camera anchor and mesh layer annotations

use crate::graph::{Layers, SceneGraph};
use crate::humanoid::{Humanoid, HEAD};
use glam::Vec3;
use hecs::Entity;
use prism_core::LayerConfig;
use prism_vrm::{FirstPerson as FirstPersonDef, FirstPersonFlag};

/// Offset used when the document declares none
pub const DEFAULT_OFFSET: Vec3 = Vec3::new(0.0, 0.06, 0.0);

#[derive(Debug, Clone)]
pub struct FirstPerson {
    bone: Option<Entity>,
    offset: Vec3,
    first_person_only_layer: u8,
    third_person_only_layer: u8,
    annotations: Vec<(usize, FirstPersonFlag)>,
}

impl FirstPerson {
    pub fn from_def(
        def: &FirstPersonDef,
        nodes: &[Entity],
        humanoid: &Humanoid,
        layers: &LayerConfig,
    ) -> Self {
        let bone = def
            .first_person_bone_index()
            .and_then(|i| nodes.get(i).copied())
            .or_else(|| humanoid.bone_node(HEAD));

        // VRM 0.x stores the offset with Z flipped
        let offset = def
            .first_person_bone_offset
            .map(|o| Vec3::new(o.x, o.y, -o.z))
            .unwrap_or(DEFAULT_OFFSET);

        let annotations = def
            .mesh_annotations
            .iter()
            .filter_map(|a| a.mesh.map(|mesh| (mesh, a.flag())))
            .collect();

        Self {
            bone,
            offset,
            first_person_only_layer: layers.first_person_only,
            third_person_only_layer: layers.third_person_only,
            annotations,
        }
    }

    pub fn first_person_only_layer(&self) -> u8 {
        self.first_person_only_layer
    }

    pub fn third_person_only_layer(&self) -> u8 {
        self.third_person_only_layer
    }

    pub fn bone(&self) -> Option<Entity> {
        self.bone
    }

    /// Put annotated meshes on their person-specific layer
    pub fn setup(&self, graph: &mut SceneGraph, mesh_instances: &[Vec<Entity>]) {
        for &(mesh, flag) in &self.annotations {
            let layers = match flag {
                FirstPersonFlag::Both => continue,
                FirstPersonFlag::FirstPersonOnly => Layers::only(self.first_person_only_layer),
                // No headless first-person copy is generated for `Auto`
                // meshes; they are only hidden from the first-person view
                FirstPersonFlag::ThirdPersonOnly | FirstPersonFlag::Auto => {
                    Layers::only(self.third_person_only_layer)
                }
            };
            let Some(instances) = mesh_instances.get(mesh) else {
                log::warn!("mesh annotation references missing mesh {}", mesh);
                continue;
            };
            for &instance in instances {
                for entity in graph.descendants(instance) {
                    graph.set_layers(entity, layers);
                }
            }
        }
    }

    /// World position of the first-person viewpoint
    pub fn world_position(&self, graph: &SceneGraph) -> Vec3 {
        match self.bone.filter(|&b| graph.contains(b)) {
            Some(bone) => graph.world_matrix(bone).transform_point3(self.offset),
            None => self.offset,
        }
    }
}
