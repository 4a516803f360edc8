//! Blend shape proxy: named expression weights driving morph targets

use crate::graph::{MeshRenderer, SceneGraph};
use hecs::Entity;
use prism_vrm::BlendShapeMaster;

#[derive(Debug, Clone, Copy)]
struct Bind {
    mesh: usize,
    morph: usize,
    /// 0..=1
    weight: f32,
}

#[derive(Debug, Clone)]
struct Group {
    name: String,
    preset: Option<String>,
    binds: Vec<Bind>,
    is_binary: bool,
    value: f32,
}

impl Group {
    fn matches(&self, name: &str) -> bool {
        self.name == name
            || self
                .preset
                .as_deref()
                .is_some_and(|p| p != "unknown" && p == name)
    }

    fn effective_value(&self) -> f32 {
        if self.is_binary {
            if self.value > 0.5 {
                1.0
            } else {
                0.0
            }
        } else {
            self.value
        }
    }
}

/// Expression weights per blend shape group.
///
/// Groups are looked up by name first, then by preset name. Weights are
/// applied to morph targets once per frame by [`BlendShapeProxy::apply`].
#[derive(Debug, Clone, Default)]
pub struct BlendShapeProxy {
    groups: Vec<Group>,
}

impl BlendShapeProxy {
    pub fn from_def(def: &BlendShapeMaster) -> Self {
        let groups = def
            .blend_shape_groups
            .iter()
            .enumerate()
            .map(|(i, g)| Group {
                name: g.name_or_default(i).into_owned(),
                preset: g.preset_name.clone(),
                binds: g
                    .binds
                    .iter()
                    .filter_map(|b| {
                        Some(Bind {
                            mesh: b.mesh?,
                            morph: b.index?,
                            weight: b.weight / 100.0,
                        })
                    })
                    .collect(),
                is_binary: g.is_binary,
                value: 0.0,
            })
            .collect();
        Self { groups }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.groups
            .iter()
            .position(|g| g.name == name)
            .or_else(|| self.groups.iter().position(|g| g.matches(name)))
    }

    /// Current weight of a group, `None` if no group has that name or preset
    pub fn get_value(&self, name: &str) -> Option<f32> {
        self.find(name).map(|i| self.groups[i].value)
    }

    /// Set a group's weight. Returns false if no group matched.
    pub fn set_value(&mut self, name: &str, value: f32) -> bool {
        match self.find(name) {
            Some(i) => {
                self.groups[i].value = value.clamp(0.0, 1.0);
                true
            }
            None => false,
        }
    }

    /// Write accumulated group weights into the morph targets of every
    /// bound mesh. Meshes with no binds keep their own weights.
    pub fn apply(&self, graph: &mut SceneGraph, mesh_instances: &[Vec<Entity>]) {
        let mut bound: Vec<usize> = self
            .groups
            .iter()
            .flat_map(|g| g.binds.iter().map(|b| b.mesh))
            .collect();
        bound.sort_unstable();
        bound.dedup();

        for mesh in bound {
            let Some(instances) = mesh_instances.get(mesh) else {
                continue;
            };
            let targets: Vec<Entity> = instances
                .iter()
                .flat_map(|&i| graph.descendants(i))
                .collect();

            for entity in targets {
                let Ok(mut renderer) = graph.world_mut().get::<&mut MeshRenderer>(entity) else {
                    continue;
                };
                renderer.morph_weights.iter_mut().for_each(|w| *w = 0.0);
                for group in &self.groups {
                    let value = group.effective_value();
                    if value == 0.0 {
                        continue;
                    }
                    for bind in group.binds.iter().filter(|b| b.mesh == mesh) {
                        if bind.morph >= renderer.morph_weights.len() {
                            renderer.morph_weights.resize(bind.morph + 1, 0.0);
                        }
                        renderer.morph_weights[bind.morph] += bind.weight * value;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::instantiate;
    use crate::material::MaterialLibrary;
    use prism_core::Color;
    use prism_vrm::{sample, VrmDocument};

    fn proxy() -> BlendShapeProxy {
        let doc = VrmDocument::from_json(sample::sample_avatar()).unwrap();
        BlendShapeProxy::from_def(&doc.vrm().unwrap().blend_shape_master)
    }

    #[test]
    fn test_lookup_by_name_and_preset() {
        let mut proxy = proxy();
        assert_eq!(proxy.get_value("A"), Some(0.0));
        assert!(proxy.set_value("joy", 0.5));
        assert_eq!(proxy.get_value("Joy"), Some(0.5));
        assert_eq!(proxy.get_value("nope"), None);
        assert!(!proxy.set_value("nope", 1.0));
    }

    #[test]
    fn test_set_value_clamps() {
        let mut proxy = proxy();
        proxy.set_value("A", 3.0);
        assert_eq!(proxy.get_value("A"), Some(1.0));
    }

    #[test]
    fn test_apply_writes_morph_weights() {
        let doc = VrmDocument::from_json(sample::sample_avatar()).unwrap();
        let mut graph = SceneGraph::new();
        let mut library = MaterialLibrary::new(Color::WHITE);
        let avatar = instantiate(&doc, &mut graph, &mut library).unwrap();
        let mut proxy = BlendShapeProxy::from_def(&doc.vrm().unwrap().blend_shape_master);

        proxy.set_value("A", 1.0);
        proxy.set_value("Joy", 0.5);
        proxy.apply(&mut graph, &avatar.mesh_instances);

        let face = avatar.meshes[1];
        let weights = graph
            .world()
            .get::<&MeshRenderer>(face)
            .unwrap()
            .morph_weights
            .clone();
        assert!((weights[0] - 1.0).abs() < 1e-6);
        assert!((weights[1] - 0.25).abs() < 1e-6);

        proxy.set_value("A", 0.0);
        proxy.apply(&mut graph, &avatar.mesh_instances);
        let weights = graph
            .world()
            .get::<&MeshRenderer>(face)
            .unwrap()
            .morph_weights
            .clone();
        assert_eq!(weights[0], 0.0);
    }
}
