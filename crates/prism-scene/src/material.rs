//! Material library
//!
//! Materials are referenced by [`MaterialId`]. The first ids are built-in
//! materials that survive avatar reloads; everything after them belongs
//! to the loaded avatar and is dropped on reload.

use prism_core::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(u32);

impl MaterialId {
    /// Normal-shaded, depth-test-free material swapped in by highlights
    pub const HIGHLIGHT: Self = Self(0);
    /// Wireframe material shared by all gizmos
    pub const GIZMO_WIREFRAME: Self = Self(1);

    pub fn raw(&self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MaterialKind {
    /// glTF metallic-roughness material
    Standard { base_color: Color },
    /// VRM shader surface (MToon, unlit, ...)
    VrmShader { shader: String },
    /// Inverted-hull outline pass of a VRM shader material
    Outline,
    /// Surface normals as color
    Normal,
    /// Flat color
    Basic { color: Color, wireframe: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub kind: MaterialKind,
    pub transparent: bool,
    pub depth_test: bool,
    pub depth_write: bool,
}

impl Material {
    pub fn opaque(name: impl Into<String>, kind: MaterialKind) -> Self {
        Self {
            name: name.into(),
            kind,
            transparent: false,
            depth_test: true,
            depth_write: true,
        }
    }

    /// Transparent overlay that ignores the depth buffer
    pub fn overlay(name: impl Into<String>, kind: MaterialKind) -> Self {
        Self {
            name: name.into(),
            kind,
            transparent: true,
            depth_test: false,
            depth_write: false,
        }
    }
}

pub struct MaterialLibrary {
    materials: Vec<Material>,
    builtin_count: usize,
}

impl MaterialLibrary {
    /// Library holding only the built-in materials
    pub fn new(gizmo_color: Color) -> Self {
        let materials = vec![
            Material::overlay("highlight", MaterialKind::Normal),
            Material::overlay(
                "gizmo_wireframe",
                MaterialKind::Basic {
                    color: gizmo_color,
                    wireframe: true,
                },
            ),
        ];
        let builtin_count = materials.len();
        Self {
            materials,
            builtin_count,
        }
    }

    pub fn add(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId((self.materials.len() - 1) as u32)
    }

    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn is_builtin(&self, id: MaterialId) -> bool {
        (id.0 as usize) < self.builtin_count
    }

    /// Drop all avatar materials, keeping the built-ins
    pub fn reset(&mut self) {
        self.materials.truncate(self.builtin_count);
    }
}
