//! Semantic humanoid bone lookup

use hecs::Entity;
use prism_vrm::Humanoid as HumanoidDef;
use std::collections::HashMap;

/// Name of the bone that receives the 180° yaw correction on load
pub const HIPS: &str = "hips";
/// Default first-person bone
pub const HEAD: &str = "head";

/// Semantic bone name → live node objects.
///
/// A name may be declared more than once, so it can map to several nodes.
#[derive(Debug, Clone, Default)]
pub struct Humanoid {
    bones: HashMap<String, Vec<Entity>>,
}

impl Humanoid {
    pub fn from_def(def: &HumanoidDef, nodes: &[Entity]) -> Self {
        let mut bones: HashMap<String, Vec<Entity>> = HashMap::new();
        for bone in &def.human_bones {
            let (Some(name), Some(node)) = (bone.bone.as_ref(), bone.node) else {
                continue;
            };
            match nodes.get(node) {
                Some(&entity) => bones.entry(name.clone()).or_default().push(entity),
                None => log::warn!("humanoid bone '{}' references missing node {}", name, node),
            }
        }
        Self { bones }
    }

    /// All nodes bound to a semantic bone name
    pub fn bone_nodes(&self, name: &str) -> &[Entity] {
        self.bones.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The first node bound to a semantic bone name
    pub fn bone_node(&self, name: &str) -> Option<Entity> {
        self.bone_nodes(name).first().copied()
    }

    pub fn bone_count(&self) -> usize {
        self.bones.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_vrm::HumanBone;

    #[test]
    fn test_repeated_name_maps_to_all_nodes() {
        let mut world = hecs::World::new();
        let nodes: Vec<Entity> = (0..3).map(|_| world.spawn(())).collect();
        let def = HumanoidDef {
            human_bones: vec![
                HumanBone {
                    bone: Some("spine".into()),
                    node: Some(0),
                    use_default_values: None,
                },
                HumanBone {
                    bone: Some("spine".into()),
                    node: Some(2),
                    use_default_values: None,
                },
                HumanBone {
                    bone: Some("head".into()),
                    node: Some(7),
                    use_default_values: None,
                },
            ],
        };

        let humanoid = Humanoid::from_def(&def, &nodes);

        assert_eq!(humanoid.bone_nodes("spine"), &[nodes[0], nodes[2]]);
        assert!(humanoid.bone_nodes("head").is_empty());
        assert_eq!(humanoid.bone_node("spine"), Some(nodes[0]));
        assert_eq!(humanoid.bone_count(), 2);
    }
}
