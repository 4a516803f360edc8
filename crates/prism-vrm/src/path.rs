//! Document path grammar
//!
//! A document path is a JSON pointer into the avatar document, e.g.
//! `/meshes/1/primitives/2`. Only a closed set of shapes can be
//! highlighted; [`Region::parse`] maps a path onto one of them. The number
//! of segments is part of every pattern, so a container path such as
//! `/extensions/VRM/secondaryAnimation/boneGroups` never matches the
//! per-group rule.

use std::fmt;

/// Extension name used by VRM 0.x documents
pub const VRM_EXTENSION: &str = "VRM";

/// A highlightable region of the avatar document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// `/nodes/{node}`
    Node { node: usize },
    /// `/meshes/{mesh}`
    Mesh { mesh: usize },
    /// `/meshes/{mesh}/primitives/{primitive}`
    Primitive { mesh: usize, primitive: usize },
    /// `/materials/{material}` or `/extensions/<EXT>/materialProperties/{material}`
    Material { material: usize },
    /// `/extensions/<EXT>/humanoid/humanBones/{index}`
    HumanBone { index: usize },
    /// `/extensions/<EXT>/firstPerson`
    FirstPerson,
    /// `/extensions/<EXT>/firstPerson/meshAnnotations[/{index}]`
    MeshAnnotation { index: Option<usize> },
    /// `/extensions/<EXT>/blendShapeMaster/blendShapeGroups/{index}`
    BlendShapeGroup { index: usize },
    /// `/extensions/<EXT>/secondaryAnimation/boneGroups/{index}`
    BoneGroup { index: usize },
}

impl Region {
    /// Match a path against the region patterns.
    ///
    /// Returns `None` for any path that is not highlightable, including
    /// paths whose index segment is not a non-negative integer.
    pub fn parse(path: &str) -> Option<Region> {
        let segments: Vec<&str> = path.split('/').collect();

        match segments.as_slice() {
            ["", "nodes", node] => Some(Region::Node {
                node: index(node)?,
            }),
            ["", "meshes", mesh] => Some(Region::Mesh {
                mesh: index(mesh)?,
            }),
            ["", "meshes", mesh, "primitives", primitive] => Some(Region::Primitive {
                mesh: index(mesh)?,
                primitive: index(primitive)?,
            }),
            ["", "materials", material]
            | ["", "extensions", _, "materialProperties", material] => Some(Region::Material {
                material: index(material)?,
            }),
            ["", "extensions", _, "humanoid", "humanBones", i] => {
                Some(Region::HumanBone { index: index(i)? })
            }
            ["", "extensions", _, "firstPerson"] => Some(Region::FirstPerson),
            ["", "extensions", _, "firstPerson", "meshAnnotations"] => {
                Some(Region::MeshAnnotation { index: None })
            }
            ["", "extensions", _, "firstPerson", "meshAnnotations", i] => {
                Some(Region::MeshAnnotation {
                    index: Some(index(i)?),
                })
            }
            ["", "extensions", _, "blendShapeMaster", "blendShapeGroups", i] => {
                Some(Region::BlendShapeGroup { index: index(i)? })
            }
            ["", "extensions", _, "secondaryAnimation", "boneGroups", i] => {
                Some(Region::BoneGroup { index: index(i)? })
            }
            _ => None,
        }
    }

    /// Canonical path of this region, using `extension` for extension paths
    pub fn to_path(&self, extension: &str) -> String {
        match self {
            Region::Node { node } => format!("/nodes/{}", node),
            Region::Mesh { mesh } => format!("/meshes/{}", mesh),
            Region::Primitive { mesh, primitive } => {
                format!("/meshes/{}/primitives/{}", mesh, primitive)
            }
            Region::Material { material } => format!("/materials/{}", material),
            Region::HumanBone { index } => {
                format!("/extensions/{}/humanoid/humanBones/{}", extension, index)
            }
            Region::FirstPerson => format!("/extensions/{}/firstPerson", extension),
            Region::MeshAnnotation { index: None } => {
                format!("/extensions/{}/firstPerson/meshAnnotations", extension)
            }
            Region::MeshAnnotation { index: Some(i) } => {
                format!("/extensions/{}/firstPerson/meshAnnotations/{}", extension, i)
            }
            Region::BlendShapeGroup { index } => format!(
                "/extensions/{}/blendShapeMaster/blendShapeGroups/{}",
                extension, index
            ),
            Region::BoneGroup { index } => format!(
                "/extensions/{}/secondaryAnimation/boneGroups/{}",
                extension, index
            ),
        }
    }

    /// Whether the live objects for this region come from the async resolver
    pub fn needs_resolution(&self) -> bool {
        matches!(
            self,
            Region::Node { .. }
                | Region::Mesh { .. }
                | Region::Primitive { .. }
                | Region::Material { .. }
        )
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path(VRM_EXTENSION))
    }
}

fn index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_core_regions() {
        assert_eq!(Region::parse("/nodes/3"), Some(Region::Node { node: 3 }));
        assert_eq!(Region::parse("/meshes/1"), Some(Region::Mesh { mesh: 1 }));
        assert_eq!(
            Region::parse("/meshes/1/primitives/2"),
            Some(Region::Primitive {
                mesh: 1,
                primitive: 2
            })
        );
        assert_eq!(
            Region::parse("/materials/4"),
            Some(Region::Material { material: 4 })
        );
    }

    #[test]
    fn test_parse_extension_regions_any_name() {
        assert_eq!(
            Region::parse("/extensions/VRM/materialProperties/2"),
            Some(Region::Material { material: 2 })
        );
        assert_eq!(
            Region::parse("/extensions/X/humanoid/humanBones/5"),
            Some(Region::HumanBone { index: 5 })
        );
        assert_eq!(
            Region::parse("/extensions/X/firstPerson"),
            Some(Region::FirstPerson)
        );
        assert_eq!(
            Region::parse("/extensions/X/firstPerson/meshAnnotations/0"),
            Some(Region::MeshAnnotation { index: Some(0) })
        );
        assert_eq!(
            Region::parse("/extensions/X/firstPerson/meshAnnotations"),
            Some(Region::MeshAnnotation { index: None })
        );
        assert_eq!(
            Region::parse("/extensions/X/blendShapeMaster/blendShapeGroups/7"),
            Some(Region::BlendShapeGroup { index: 7 })
        );
        assert_eq!(
            Region::parse("/extensions/X/secondaryAnimation/boneGroups/1"),
            Some(Region::BoneGroup { index: 1 })
        );
    }

    #[test]
    fn test_segment_count_rejects() {
        assert_eq!(Region::parse("/nodes"), None);
        assert_eq!(Region::parse("/nodes/"), None);
        assert_eq!(Region::parse("/nodes/1/children"), None);
        assert_eq!(Region::parse("/meshes/1/primitives"), None);
        assert_eq!(Region::parse("/extensions/VRM/secondaryAnimation/boneGroups"), None);
        assert_eq!(Region::parse("/extensions/VRM/humanoid/humanBones"), None);
        assert_eq!(Region::parse("/extensions/VRM/firstPerson/firstPersonBone"), None);
    }

    #[test]
    fn test_unknown_and_malformed() {
        assert_eq!(Region::parse("/unknown/7"), None);
        assert_eq!(Region::parse(""), None);
        assert_eq!(Region::parse("nodes/1"), None);
        assert_eq!(Region::parse("/nodes/-1"), None);
        assert_eq!(Region::parse("/nodes/x1"), None);
        assert_eq!(Region::parse("/extensions/VRM/firstPersonBone"), None);
    }

    #[test]
    fn test_needs_resolution() {
        assert!(Region::Node { node: 0 }.needs_resolution());
        assert!(Region::Material { material: 1 }.needs_resolution());
        assert!(!Region::FirstPerson.needs_resolution());
        assert!(!Region::BoneGroup { index: 0 }.needs_resolution());
    }

    #[test]
    fn test_to_path_matches_parse() {
        let regions = [
            Region::Node { node: 2 },
            Region::Primitive {
                mesh: 0,
                primitive: 1,
            },
            Region::FirstPerson,
            Region::MeshAnnotation { index: Some(3) },
            Region::BoneGroup { index: 0 },
        ];
        for region in regions {
            assert_eq!(Region::parse(&region.to_path(VRM_EXTENSION)), Some(region));
        }
    }
}
