//! Instantiates a document into live scene objects

use crate::graph::{MaterialSlots, MeshRenderer, SceneGraph, Transform};
use crate::material::{Material, MaterialKind, MaterialLibrary};
use glam::{Mat4, Quat, Vec3};
use hecs::Entity;
use prism_core::{Color, Result};
use prism_vrm::{MeshDef, NodeDef, VrmDocument};

/// Live objects created for one avatar
#[derive(Debug, Clone)]
pub struct InstantiatedAvatar {
    /// Parent of every scene root node of the avatar
    pub root: Entity,
    /// One object per document node
    pub nodes: Vec<Entity>,
    /// Primary object of each document mesh: the primitive itself, or a
    /// group whose children are the primitives
    pub meshes: Vec<Entity>,
    /// Every placed copy of each mesh, primary first
    pub mesh_instances: Vec<Vec<Entity>>,
}

pub fn instantiate(
    document: &VrmDocument,
    graph: &mut SceneGraph,
    materials: &mut MaterialLibrary,
) -> Result<InstantiatedAvatar> {
    let gltf = document.root();
    let slots = create_materials(document, materials);
    let mut default_material = None;

    let title = document.title().unwrap_or("VRM").to_string();
    let root = graph.spawn(title, Transform::IDENTITY);

    let meshes: Vec<Entity> = gltf
        .meshes
        .iter()
        .enumerate()
        .map(|(i, def)| build_mesh(graph, materials, &slots, &mut default_material, i, def))
        .collect();
    let mut mesh_instances: Vec<Vec<Entity>> = vec![Vec::new(); meshes.len()];

    let nodes: Vec<Entity> = gltf
        .nodes
        .iter()
        .enumerate()
        .map(|(i, def)| {
            let name = def.name.clone().unwrap_or_else(|| format!("node_{}", i));
            graph.spawn(name, node_transform(def))
        })
        .collect();

    for (i, def) in gltf.nodes.iter().enumerate() {
        for &child in &def.children {
            graph.add_child(nodes[i], nodes[child])?;
        }

        if let Some(mesh) = def.mesh {
            let object = if mesh_instances[mesh].is_empty() {
                meshes[mesh]
            } else {
                build_mesh(
                    graph,
                    materials,
                    &slots,
                    &mut default_material,
                    mesh,
                    &gltf.meshes[mesh],
                )
            };
            mesh_instances[mesh].push(object);
            graph.add_child(nodes[i], object)?;
        }
    }

    for node in scene_roots(document) {
        graph.add_child(root, nodes[node])?;
    }

    Ok(InstantiatedAvatar {
        root,
        nodes,
        meshes,
        mesh_instances,
    })
}

/// Material slots per document material. VRM shader materials become
/// arrays (surface plus optional outline); others stay single.
fn create_materials(document: &VrmDocument, library: &mut MaterialLibrary) -> Vec<MaterialSlots> {
    let properties = document
        .vrm()
        .map(|vrm| vrm.material_properties.as_slice())
        .unwrap_or(&[]);

    document
        .root()
        .materials
        .iter()
        .enumerate()
        .map(|(i, def)| {
            let name = def.name.clone().unwrap_or_else(|| format!("material_{}", i));
            match properties.get(i).filter(|p| p.uses_vrm_shader()) {
                Some(props) => {
                    let shader = props.shader.clone().unwrap_or_default();
                    let surface = library.add(Material::opaque(
                        name.clone(),
                        MaterialKind::VrmShader { shader },
                    ));
                    let mut ids = vec![surface];
                    if props.has_outline() {
                        ids.push(library.add(Material::opaque(
                            format!("{} (Outline)", name),
                            MaterialKind::Outline,
                        )));
                    }
                    MaterialSlots::Multi(ids)
                }
                None => {
                    let base_color = def
                        .pbr_metallic_roughness
                        .as_ref()
                        .map(|pbr| Color::from_array(pbr.base_color_factor))
                        .unwrap_or(Color::WHITE);
                    MaterialSlots::Single(
                        library.add(Material::opaque(name, MaterialKind::Standard { base_color })),
                    )
                }
            }
        })
        .collect()
}

fn build_mesh(
    graph: &mut SceneGraph,
    library: &mut MaterialLibrary,
    slots: &[MaterialSlots],
    default_material: &mut Option<MaterialSlots>,
    index: usize,
    def: &MeshDef,
) -> Entity {
    let name = def.name.clone().unwrap_or_else(|| format!("mesh_{}", index));

    let mut primitive = |graph: &mut SceneGraph, name: String, j: usize| {
        let p = &def.primitives[j];
        let materials = match p.material {
            Some(m) => slots[m].clone(),
            None => default_material
                .get_or_insert_with(|| {
                    MaterialSlots::Single(library.add(Material::opaque(
                        "default",
                        MaterialKind::Standard {
                            base_color: Color::WHITE,
                        },
                    )))
                })
                .clone(),
        };
        let mut morph_weights = vec![0.0; p.targets.len()];
        for (w, default) in morph_weights.iter_mut().zip(&def.weights) {
            *w = *default;
        }
        let entity = graph.spawn(name, Transform::IDENTITY);
        let _ = graph.world_mut().insert_one(
            entity,
            MeshRenderer {
                mesh_index: index,
                primitive_index: j,
                materials,
                morph_weights,
                frustum_culled: true,
                render_order: 0,
            },
        );
        entity
    };

    if def.primitives.len() == 1 {
        return primitive(graph, name, 0);
    }

    let group = graph.spawn(name.clone(), Transform::IDENTITY);
    for j in 0..def.primitives.len() {
        let child = primitive(graph, format!("{}_{}", name, j), j);
        // Both objects were just spawned, attaching cannot fail
        let _ = graph.add_child(group, child);
    }
    group
}

fn node_transform(def: &NodeDef) -> Transform {
    match def.matrix {
        Some(m) => Transform::from_matrix(Mat4::from_cols_array(&m)),
        None => Transform {
            translation: Vec3::from_array(def.translation),
            rotation: Quat::from_array(def.rotation).normalize(),
            scale: Vec3::from_array(def.scale),
        },
    }
}

/// Root nodes of the default scene, or every parentless node without scenes
fn scene_roots(document: &VrmDocument) -> Vec<usize> {
    let gltf = document.root();
    let scene = gltf.scene.unwrap_or(0);
    if let Some(def) = gltf.scenes.get(scene) {
        return def
            .nodes
            .iter()
            .copied()
            .filter(|&n| n < gltf.nodes.len())
            .collect();
    }

    let mut has_parent = vec![false; gltf.nodes.len()];
    for node in &gltf.nodes {
        for &child in &node.children {
            has_parent[child] = true;
        }
    }
    (0..gltf.nodes.len()).filter(|&n| !has_parent[n]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_vrm::sample::{self, nodes};

    fn build() -> (SceneGraph, MaterialLibrary, InstantiatedAvatar) {
        let doc = VrmDocument::from_json(sample::sample_avatar()).unwrap();
        let mut graph = SceneGraph::new();
        let mut library = MaterialLibrary::new(Color::WHITE);
        let avatar = instantiate(&doc, &mut graph, &mut library).unwrap();
        (graph, library, avatar)
    }

    #[test]
    fn test_multi_primitive_mesh_is_group() {
        let (graph, _, avatar) = build();
        let body = avatar.meshes[0];
        assert_eq!(graph.children(body).len(), 3);
        assert!(graph.world().get::<&MeshRenderer>(body).is_err());

        let face = avatar.meshes[1];
        assert!(graph.children(face).is_empty());
        let renderer = graph.world().get::<&MeshRenderer>(face).unwrap();
        assert_eq!(renderer.morph_weights.len(), 2);
    }

    #[test]
    fn test_material_slots() {
        let (graph, library, avatar) = build();
        let body_prim0 = graph.children(avatar.meshes[0])[0];
        let renderer = graph.world().get::<&MeshRenderer>(body_prim0).unwrap();
        match &renderer.materials {
            MaterialSlots::Multi(ids) => {
                assert_eq!(ids.len(), 2);
                assert_eq!(library.get(ids[1]).unwrap().kind, MaterialKind::Outline);
            }
            other => panic!("expected multi-material, got {:?}", other),
        }

        let accessory = graph.world().get::<&MeshRenderer>(avatar.meshes[2]).unwrap();
        assert!(matches!(accessory.materials, MaterialSlots::Single(_)));
    }

    #[test]
    fn test_hierarchy_and_roots() {
        let (graph, _, avatar) = build();
        assert_eq!(avatar.nodes.len(), sample::NODE_COUNT);
        assert_eq!(graph.parent(avatar.nodes[nodes::ARMATURE]), Some(avatar.root));
        assert_eq!(
            graph.parent(avatar.nodes[nodes::HEAD]),
            Some(avatar.nodes[nodes::SPINE])
        );
        assert_eq!(graph.parent(avatar.meshes[0]), Some(avatar.nodes[nodes::BODY]));

        let head = graph.world_position(avatar.nodes[nodes::HEAD]);
        assert!((head - Vec3::new(0.0, 1.5, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_shared_mesh_gets_copies() {
        let mut json = sample::sample_avatar();
        json["nodes"][nodes::SPINE_TWIST]["mesh"] = serde_json::json!(1);
        let doc = VrmDocument::from_json(json).unwrap();
        let mut graph = SceneGraph::new();
        let mut library = MaterialLibrary::new(Color::WHITE);
        let avatar = instantiate(&doc, &mut graph, &mut library).unwrap();

        let instances = &avatar.mesh_instances[1];
        assert_eq!(instances.len(), 2);
        assert_ne!(instances[0], instances[1]);
        assert!(instances.contains(&avatar.meshes[1]));
    }
}
