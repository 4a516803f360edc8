//! Document path → reversible scene highlight

use crate::mutation::{
    attach_sphere, recolor_gizmo, scene_sphere, swap_material, swap_materials_below, Mutation,
    MutationSet,
};
use crate::revert::RevertHandle;
use crate::style::HighlightStyle;
use futures::Future;
use hecs::Entity;
use prism_core::{PrismError, Result};
use prism_scene::{
    DependencyKind, HostState, LiveObject, MeshRenderer, ResolveError, SceneGraph, SceneHost,
    ViewLayerMode,
};
use prism_vrm::Region;

/// Turns selected document paths into highlights on a [`SceneHost`].
///
/// Regions backed by nodes or meshes wait for the host's dependency
/// resolver and are applied when the host is next pumped. Every other
/// region is applied before `highlight` returns.
pub struct HighlightResolver {
    host: SceneHost,
    style: HighlightStyle,
}

impl HighlightResolver {
    /// Resolver using the host's configured highlight style
    pub fn new(host: SceneHost) -> Result<Self> {
        let style = HighlightStyle::from_config(&host.state().config().highlight)?;
        Ok(Self::with_style(host, style))
    }

    pub fn with_style(host: SceneHost, style: HighlightStyle) -> Self {
        Self { host, style }
    }

    pub fn host(&self) -> &SceneHost {
        &self.host
    }

    pub fn style(&self) -> &HighlightStyle {
        &self.style
    }

    /// Highlight the element at `path`.
    ///
    /// Returns `Ok(None)` when the path is not highlightable, and
    /// `Err(NoAvatarLoaded)` when it is but nothing is loaded.
    pub fn highlight(&self, path: &str) -> Result<Option<RevertHandle>> {
        let Some(region) = Region::parse(path) else {
            log::trace!("{} is not highlightable", path);
            return Ok(None);
        };
        let generation = self.host.generation().ok_or(PrismError::NoAvatarLoaded)?;
        let style = self.style;

        let handle = match region {
            Region::Node { node } => {
                let request = self.host.resolve_dependency(DependencyKind::Node, node);
                self.apply_later(path, request, move |state, object: LiveObject| {
                    let mut set = live_set(state, object.generation)?;
                    set.push(attach_sphere(state.graph_mut(), object.entity, &style)?);
                    Ok(set)
                })?
            }
            Region::Mesh { mesh } => {
                let request = self.host.resolve_dependency(DependencyKind::Mesh, mesh);
                self.apply_later(path, request, move |state, object: LiveObject| {
                    let mut set = live_set(state, object.generation)?;
                    set.extend(swap_materials_below(state.graph_mut(), object.entity));
                    Ok(set)
                })?
            }
            Region::Primitive { mesh, primitive } => {
                let request = self.host.resolve_dependency(DependencyKind::Mesh, mesh);
                self.apply_later(path, request, move |state, object: LiveObject| {
                    let mut set = live_set(state, object.generation)?;
                    let target = primitive_object(state.graph(), object.entity, primitive)
                        .ok_or_else(|| PrismError::out_of_range("primitives", primitive))?;
                    set.extend(swap_material(state.graph_mut(), target));
                    Ok(set)
                })?
            }
            Region::Material { material } => {
                let document = self.host.document().ok_or(PrismError::NoAvatarLoaded)?;
                let in_range = material < document.root().materials.len();
                let primitives = document.primitives_using_material(material);
                let request = self.host.resolve_dependencies(DependencyKind::Mesh);
                self.apply_later(path, request, move |state, meshes: Vec<LiveObject>| {
                    if !in_range {
                        return Err(PrismError::out_of_range("materials", material));
                    }
                    let mut set = live_set(state, generation)?;
                    for p in &primitives {
                        let Some(mesh) = meshes.get(p.mesh) else {
                            continue;
                        };
                        if let Some(target) = primitive_object(state.graph(), mesh.entity, p.primitive) {
                            set.extend(swap_material(state.graph_mut(), target));
                        }
                    }
                    Ok(set)
                })?
            }
            Region::HumanBone { index } => self.apply_now(path, generation, |state, set| {
                let avatar = state.avatar().ok_or(PrismError::NoAvatarLoaded)?;
                let name = avatar.document().human_bone_name(index)?;
                let bones = avatar.humanoid().bone_nodes(name).to_vec();
                for bone in bones {
                    set.push(attach_sphere(state.graph_mut(), bone, &style)?);
                }
                Ok(())
            })?,
            Region::FirstPerson => self.apply_now(path, generation, |state, set| {
                let avatar = state.avatar().ok_or(PrismError::NoAvatarLoaded)?;
                let position = avatar.first_person().world_position(state.graph());
                set.push(scene_sphere(state.graph_mut(), position, &style)?);
                Ok(())
            })?,
            Region::MeshAnnotation { index } => self.apply_now(path, generation, |state, set| {
                let avatar = state.avatar().ok_or(PrismError::NoAvatarLoaded)?;
                if let Some(i) = index {
                    let count = avatar
                        .document()
                        .vrm()
                        .map(|vrm| vrm.first_person.mesh_annotations.len())
                        .unwrap_or(0);
                    if i >= count {
                        return Err(PrismError::out_of_range("meshAnnotations", i));
                    }
                }
                state.set_view_layer_mode(ViewLayerMode::FirstPerson)?;
                set.push(Mutation::ViewLayerMode {
                    restore: ViewLayerMode::ThirdPerson,
                });
                Ok(())
            })?,
            Region::BlendShapeGroup { index } => self.apply_now(path, generation, |state, set| {
                let avatar = state.avatar_mut().ok_or(PrismError::NoAvatarLoaded)?;
                let document = std::rc::Rc::clone(avatar.document());
                let name = document.blend_shape_group_name(index)?;
                let proxy = avatar.blend_shapes_mut();
                let previous = proxy.get_value(&name).unwrap_or(0.0);
                proxy.set_value(&name, 1.0);
                set.push(Mutation::BlendShapeWeight {
                    group: name.to_string(),
                    previous,
                });
                Ok(())
            })?,
            Region::BoneGroup { index } => self.apply_now(path, generation, |state, set| {
                let avatar = state.avatar().ok_or(PrismError::NoAvatarLoaded)?;
                let gizmos = avatar
                    .spring_bones()
                    .gizmos(index)
                    .ok_or_else(|| PrismError::out_of_range("boneGroups", index))?;
                for gizmo in gizmos {
                    set.extend(recolor_gizmo(state.graph_mut(), gizmo, style.color));
                }
                Ok(())
            })?,
        };

        Ok(Some(handle))
    }

    /// Apply a highlight right away. A partial application is rolled back
    /// before the error is returned.
    fn apply_now<F>(&self, path: &str, generation: u64, apply: F) -> Result<RevertHandle>
    where
        F: FnOnce(&mut HostState, &mut MutationSet) -> Result<()>,
    {
        let mut set = MutationSet::new(generation);
        {
            let mut state = self.host.state_mut();
            if let Err(e) = apply(&mut state, &mut set) {
                set.undo(&mut state);
                return Err(e);
            }
        }
        log::debug!("highlighted {} ({} mutation(s))", path, set.len());
        Ok(RevertHandle::applied(path, self.host.downgrade(), set))
    }

    /// Apply a highlight once `request` resolves, on the host's task pool
    fn apply_later<Req, T, F>(&self, path: &str, request: Req, apply: F) -> Result<RevertHandle>
    where
        Req: Future<Output = std::result::Result<T, ResolveError>> + 'static,
        T: 'static,
        F: FnOnce(&mut HostState, T) -> Result<MutationSet> + 'static,
    {
        let handle = RevertHandle::resolving(path, self.host.downgrade());
        let task_handle = handle.clone();
        let host = self.host.downgrade();

        self.host.spawn_local(async move {
            let resolved = request.await;
            task_handle.complete(|| {
                let value = resolved?;
                let host = host
                    .upgrade()
                    .ok_or_else(|| PrismError::SceneError("scene host dropped".into()))?;
                let mut state = host.state_mut();
                apply(&mut state, value)
            });
        })?;
        Ok(handle)
    }
}

/// Empty mutation set for `generation`, or an error if that avatar has
/// been replaced since the request was made
fn live_set(state: &HostState, generation: u64) -> Result<MutationSet> {
    if !state.is_current(generation) {
        return Err(ResolveError::AvatarReplaced.into());
    }
    Ok(MutationSet::new(generation))
}

/// Primitive `index` of a mesh object: the object itself for a single
/// primitive mesh, otherwise its `index`-th child
fn primitive_object(graph: &SceneGraph, mesh: Entity, index: usize) -> Option<Entity> {
    if graph.world().get::<&MeshRenderer>(mesh).is_ok() {
        return Some(mesh);
    }
    graph.children(mesh).get(index).copied()
}
