//! Scene host: owns the scene graph, the loaded avatar and the local task pool
//!
//! All state lives behind one `Rc<RefCell<HostState>>`. Work that waits on
//! dependency resolution runs as local tasks on the host's pool; the pool
//! is driven by [`SceneHost::pump`] and [`SceneHost::update`], never
//! concurrently with a caller holding the state borrowed.

use crate::blend_shape::BlendShapeProxy;
use crate::builder::{self, InstantiatedAvatar};
use crate::camera::{Camera, ViewLayerMode};
use crate::event_bus::{EventBus, HostEvent};
use crate::first_person::FirstPerson;
use crate::frame::Frame;
use crate::graph::{Helper, SceneGraph, Transform};
use crate::humanoid::{Humanoid, HIPS};
use crate::material::MaterialLibrary;
use crate::resolver::{DependencyFuture, DependencyKind, DependencyResolver, LiveObject, ResolveError};
use crate::spring_bone::{GizmoStyle, SpringBoneManager, GIZMO_COLOR};
use futures::executor::{LocalPool, LocalSpawner};
use futures::future::{self, LocalBoxFuture};
use futures::task::LocalSpawnExt;
use futures::{Future, FutureExt};
use glam::{EulerRot, Quat, Vec3};
use hecs::Entity;
use prism_core::{PrismConfig, PrismError, Result};
use prism_vrm::{VrmDocument, VrmExtension};
use std::cell::{Ref, RefCell, RefMut};
use std::f32::consts::PI;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::rc::{Rc, Weak};

/// Bytes read per progress step when loading from disk
const CHUNK_SIZE: usize = 64 * 1024;

/// Where an avatar is loaded from
#[derive(Debug, Clone)]
pub enum AvatarSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// Summary of a loaded avatar
#[derive(Debug, Clone, PartialEq)]
pub struct AvatarInfo {
    pub generation: u64,
    pub title: Option<String>,
    pub nodes: usize,
    pub meshes: usize,
    pub materials: usize,
    pub human_bones: usize,
    pub blend_shape_groups: usize,
    pub spring_bone_groups: usize,
}

/// The loaded avatar and its runtimes
pub struct Avatar {
    generation: u64,
    document: Rc<VrmDocument>,
    instantiated: InstantiatedAvatar,
    humanoid: Humanoid,
    first_person: FirstPerson,
    blend_shapes: BlendShapeProxy,
    spring_bones: SpringBoneManager,
}

impl Avatar {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn document(&self) -> &Rc<VrmDocument> {
        &self.document
    }

    /// Object every scene root node of the avatar hangs from
    pub fn root(&self) -> Entity {
        self.instantiated.root
    }

    pub fn nodes(&self) -> &[Entity] {
        &self.instantiated.nodes
    }

    pub fn meshes(&self) -> &[Entity] {
        &self.instantiated.meshes
    }

    pub fn mesh_instances(&self) -> &[Vec<Entity>] {
        &self.instantiated.mesh_instances
    }

    pub fn humanoid(&self) -> &Humanoid {
        &self.humanoid
    }

    pub fn first_person(&self) -> &FirstPerson {
        &self.first_person
    }

    pub fn blend_shapes(&self) -> &BlendShapeProxy {
        &self.blend_shapes
    }

    pub fn blend_shapes_mut(&mut self) -> &mut BlendShapeProxy {
        &mut self.blend_shapes
    }

    pub fn spring_bones(&self) -> &SpringBoneManager {
        &self.spring_bones
    }

    fn info(&self, materials: usize) -> AvatarInfo {
        AvatarInfo {
            generation: self.generation,
            title: self.document.title().map(str::to_string),
            nodes: self.instantiated.nodes.len(),
            meshes: self.instantiated.meshes.len(),
            materials,
            human_bones: self.humanoid.bone_count(),
            blend_shape_groups: self.blend_shapes.len(),
            spring_bone_groups: self.spring_bones.group_count(),
        }
    }
}

/// Everything the host owns
pub struct HostState {
    config: PrismConfig,
    graph: SceneGraph,
    materials: MaterialLibrary,
    camera: Camera,
    layer_mode: ViewLayerMode,
    avatar: Option<Avatar>,
    resolver: DependencyResolver,
    events: EventBus<HostEvent>,
    next_generation: u64,
    frame_index: u64,
}

impl HostState {
    fn new(config: &PrismConfig) -> Result<Self> {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let helpers = [
            ("DirectionalLight", Helper::DirectionalLight, Vec3::new(1.0, 1.0, 1.0)),
            ("Grid", Helper::Grid, Vec3::ZERO),
            ("Axes", Helper::Axes, Vec3::ZERO),
        ];
        for (name, helper, position) in helpers {
            let entity = graph.spawn(name, Transform::from_translation(position));
            graph
                .world_mut()
                .insert_one(entity, helper)
                .map_err(|e| PrismError::SceneError(e.to_string()))?;
            graph.add_child(root, entity)?;
        }

        let layer_mode = ViewLayerMode::default();
        let mut camera = Camera::from_config(&config.camera);
        camera.apply_layer_mode(
            layer_mode,
            config.layers.first_person_only,
            config.layers.third_person_only,
        );

        Ok(Self {
            config: config.clone(),
            graph,
            materials: MaterialLibrary::new(GIZMO_COLOR),
            camera,
            layer_mode,
            avatar: None,
            resolver: DependencyResolver::new(),
            events: EventBus::new(),
            next_generation: 0,
            frame_index: 0,
        })
    }

    pub fn config(&self) -> &PrismConfig {
        &self.config
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    pub fn materials(&self) -> &MaterialLibrary {
        &self.materials
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn layer_mode(&self) -> ViewLayerMode {
        self.layer_mode
    }

    pub fn avatar(&self) -> Option<&Avatar> {
        self.avatar.as_ref()
    }

    pub fn avatar_mut(&mut self) -> Option<&mut Avatar> {
        self.avatar.as_mut()
    }

    /// Generation of the loaded avatar
    pub fn generation(&self) -> Option<u64> {
        self.avatar.as_ref().map(|a| a.generation)
    }

    /// Whether `generation` is the avatar currently loaded
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation() == Some(generation)
    }

    /// Switch the camera between first- and third-person layers
    pub fn set_view_layer_mode(&mut self, mode: ViewLayerMode) -> Result<()> {
        if self.avatar.is_none() {
            return Err(PrismError::NoAvatarLoaded);
        }
        self.layer_mode = mode;
        let layers = &self.config.layers;
        self.camera
            .apply_layer_mode(mode, layers.first_person_only, layers.third_person_only);
        log::debug!("view layer mode: {}", mode.label());
        Ok(())
    }

    /// Fulfil pending dependency requests. Returns how many were sent.
    fn flush_pending(&mut self) -> usize {
        if !self.resolver.has_pending() {
            return 0;
        }
        let avatar = self.avatar.as_ref();
        self.resolver.flush(|kind, index| lookup(avatar, kind, index))
    }

    /// Tear down the loaded avatar and cancel its pending requests
    fn unload(&mut self) {
        self.resolver.reset();
        if let Some(avatar) = self.avatar.take() {
            self.graph.despawn_recursive(avatar.instantiated.root);
            self.materials.reset();
            self.events.push(HostEvent::Disposed {
                generation: avatar.generation,
            });
            log::info!("disposed avatar (generation {})", avatar.generation);
        }
    }

    fn install(&mut self, document: VrmDocument) -> Result<AvatarInfo> {
        self.unload();
        self.next_generation += 1;
        let generation = self.next_generation;
        let document = Rc::new(document);

        let fallback = VrmExtension::default();
        let vrm = match document.vrm() {
            Some(vrm) => vrm,
            None => {
                log::warn!("document has no VRM extension; loading as plain glTF");
                &fallback
            }
        };

        let instantiated = builder::instantiate(&document, &mut self.graph, &mut self.materials)?;
        let root = self.graph.root();
        self.graph.add_child(root, instantiated.root)?;

        let humanoid = Humanoid::from_def(&vrm.humanoid, &instantiated.nodes);
        for &hips in humanoid.bone_nodes(HIPS) {
            face_forward(&mut self.graph, hips);
        }

        let first_person = FirstPerson::from_def(
            &vrm.first_person,
            &instantiated.nodes,
            &humanoid,
            &self.config.layers,
        );
        first_person.setup(&mut self.graph, &instantiated.mesh_instances);

        let blend_shapes = BlendShapeProxy::from_def(&vrm.blend_shape_master);
        let spring_bones = SpringBoneManager::from_def(
            &vrm.secondary_animation,
            &instantiated.nodes,
            &mut self.graph,
            instantiated.root,
            GizmoStyle {
                color: GIZMO_COLOR,
                render_order: self.config.highlight.render_order,
            },
        )?;

        let layers = &self.config.layers;
        self.camera.apply_layer_mode(
            self.layer_mode,
            layers.first_person_only,
            layers.third_person_only,
        );

        let avatar = Avatar {
            generation,
            document: Rc::clone(&document),
            instantiated,
            humanoid,
            first_person,
            blend_shapes,
            spring_bones,
        };
        let info = avatar.info(document.root().materials.len());
        self.avatar = Some(avatar);
        Ok(info)
    }
}

fn lookup(avatar: Option<&Avatar>, kind: DependencyKind, index: usize) -> std::result::Result<LiveObject, ResolveError> {
    let avatar = avatar.ok_or(ResolveError::NoAvatar)?;
    let objects = match kind {
        DependencyKind::Node => avatar.nodes(),
        DependencyKind::Mesh => avatar.meshes(),
    };
    objects
        .get(index)
        .map(|&entity| LiveObject {
            entity,
            generation: avatar.generation,
        })
        .ok_or(ResolveError::OutOfRange { kind, index })
}

/// VRM 0.x avatars face -Z; turn the hips half a revolution about Y
fn face_forward(graph: &mut SceneGraph, hips: Entity) {
    if let Some(mut t) = graph.transform(hips) {
        let (x, _, z) = t.rotation.to_euler(EulerRot::XYZ);
        t.rotation = Quat::from_euler(EulerRot::XYZ, x, PI, z);
        graph.set_transform(hips, t);
    }
}

fn read_source(source: AvatarSource, events: &mut EventBus<HostEvent>) -> Result<Vec<u8>> {
    match source {
        AvatarSource::Bytes(bytes) => {
            let len = bytes.len() as u64;
            events.push(HostEvent::Progress {
                loaded: len,
                total: Some(len),
            });
            Ok(bytes)
        }
        AvatarSource::Path(path) => {
            let mut file = File::open(&path)?;
            let total = file.metadata().ok().map(|m| m.len());
            let mut bytes = Vec::with_capacity(total.unwrap_or(0) as usize);
            let mut chunk = vec![0u8; CHUNK_SIZE];
            loop {
                let n = file.read(&mut chunk)?;
                if n == 0 {
                    break;
                }
                bytes.extend_from_slice(&chunk[..n]);
                events.push(HostEvent::Progress {
                    loaded: bytes.len() as u64,
                    total,
                });
            }
            Ok(bytes)
        }
    }
}

/// Handle to the scene host. Clones share the same scene.
#[derive(Clone)]
pub struct SceneHost {
    state: Rc<RefCell<HostState>>,
    pool: Rc<RefCell<LocalPool>>,
    spawner: LocalSpawner,
}

/// Non-owning handle held by tasks running on the host's pool
#[derive(Clone)]
pub struct WeakSceneHost {
    state: Weak<RefCell<HostState>>,
    pool: Weak<RefCell<LocalPool>>,
    spawner: LocalSpawner,
}

impl WeakSceneHost {
    pub fn upgrade(&self) -> Option<SceneHost> {
        Some(SceneHost {
            state: self.state.upgrade()?,
            pool: self.pool.upgrade()?,
            spawner: self.spawner.clone(),
        })
    }
}

impl SceneHost {
    /// Empty scene with a light, a grid and axes
    pub fn new(config: &PrismConfig) -> Result<Self> {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Ok(Self {
            state: Rc::new(RefCell::new(HostState::new(config)?)),
            pool: Rc::new(RefCell::new(pool)),
            spawner,
        })
    }

    pub fn downgrade(&self) -> WeakSceneHost {
        WeakSceneHost {
            state: Rc::downgrade(&self.state),
            pool: Rc::downgrade(&self.pool),
            spawner: self.spawner.clone(),
        }
    }

    /// Borrow the host state. Panics if it is mutably borrowed.
    pub fn state(&self) -> Ref<'_, HostState> {
        self.state.borrow()
    }

    /// Mutably borrow the host state. Panics if it is already borrowed.
    pub fn state_mut(&self) -> RefMut<'_, HostState> {
        self.state.borrow_mut()
    }

    /// Run `task` on the host's pool at the next pump
    pub fn spawn_local<F>(&self, task: F) -> Result<()>
    where
        F: Future<Output = ()> + 'static,
    {
        self.spawner
            .spawn_local(task)
            .map_err(|e| PrismError::SceneError(format!("cannot spawn task: {}", e)))
    }

    /// Load an avatar, replacing the current one.
    ///
    /// Emits `Progress` while reading, then `Load` on success or `Error`
    /// on failure. A failed load leaves the previous avatar in place.
    pub fn load_avatar(&self, source: AvatarSource) -> Result<AvatarInfo> {
        let mut state = self.state.borrow_mut();
        let result = read_source(source, &mut state.events)
            .and_then(|bytes| VrmDocument::from_slice(&bytes))
            .and_then(|document| state.install(document));

        match result {
            Ok(info) => {
                log::info!(
                    "loaded avatar '{}' (generation {}, {} nodes, {} meshes)",
                    info.title.as_deref().unwrap_or("untitled"),
                    info.generation,
                    info.nodes,
                    info.meshes
                );
                state.events.push(HostEvent::Load {
                    generation: info.generation,
                    title: info.title.clone(),
                });
                Ok(info)
            }
            Err(e) => {
                log::error!("failed to load avatar: {}", e);
                state.events.push(HostEvent::Error(e.to_string()));
                Err(e)
            }
        }
    }

    /// Unload the current avatar, if any
    pub fn dispose(&self) {
        self.state.borrow_mut().unload();
    }

    /// Live object for a document index of the loaded avatar.
    ///
    /// Every request for the same `(kind, index)` shares one future. It
    /// resolves at the next pump, or to `AvatarReplaced` if the avatar is
    /// reloaded or disposed first.
    pub fn resolve_dependency(&self, kind: DependencyKind, index: usize) -> DependencyFuture {
        let mut state = self.state.borrow_mut();
        if state.avatar.is_none() {
            return DependencyResolver::failed(ResolveError::NoAvatar);
        }
        state.resolver.request(kind, index)
    }

    /// Live objects for every index of `kind`, in document order
    pub fn resolve_dependencies(
        &self,
        kind: DependencyKind,
    ) -> LocalBoxFuture<'static, std::result::Result<Vec<LiveObject>, ResolveError>> {
        let mut state = self.state.borrow_mut();
        let count = match (&state.avatar, kind) {
            (None, _) => return future::ready(Err(ResolveError::NoAvatar)).boxed_local(),
            (Some(avatar), DependencyKind::Node) => avatar.nodes().len(),
            (Some(avatar), DependencyKind::Mesh) => avatar.meshes().len(),
        };
        let requests: Vec<DependencyFuture> = (0..count)
            .map(|index| state.resolver.request(kind, index))
            .collect();
        future::try_join_all(requests).boxed_local()
    }

    pub fn view_layer_mode(&self) -> ViewLayerMode {
        self.state.borrow().layer_mode
    }

    pub fn set_view_layer_mode(&self, mode: ViewLayerMode) -> Result<()> {
        self.state.borrow_mut().set_view_layer_mode(mode)
    }

    pub fn document(&self) -> Option<Rc<VrmDocument>> {
        self.state
            .borrow()
            .avatar
            .as_ref()
            .map(|a| Rc::clone(&a.document))
    }

    pub fn generation(&self) -> Option<u64> {
        self.state.borrow().generation()
    }

    pub fn drain_events(&self) -> Vec<HostEvent> {
        self.state.borrow_mut().events.drain()
    }

    /// Run local tasks and fulfil dependency requests until nothing is
    /// left to do
    pub fn pump(&self) {
        let Ok(mut pool) = self.pool.try_borrow_mut() else {
            log::warn!("pump called from inside a host task; ignored");
            return;
        };
        loop {
            pool.run_until_stalled();
            if self.state.borrow_mut().flush_pending() == 0 {
                break;
            }
        }
    }

    /// Advance one frame: settle pending work, then animate blend shapes
    /// and spring bones, then collect the draw list
    pub fn update(&self, dt: f32) -> Frame {
        self.pump();

        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        state.frame_index += 1;
        if let Some(avatar) = state.avatar.as_mut() {
            avatar
                .blend_shapes
                .apply(&mut state.graph, &avatar.instantiated.mesh_instances);
            avatar.spring_bones.update(&mut state.graph, dt);
        }
        Frame::collect(&state.graph, &state.camera, state.frame_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::DrawKind;
    use crate::graph::{Layers, MeshRenderer};
    use prism_vrm::sample::{self, nodes};
    use std::cell::Cell;

    fn sample_bytes() -> Vec<u8> {
        serde_json::to_vec(&sample::sample_avatar()).unwrap()
    }

    fn loaded_host() -> SceneHost {
        let host = SceneHost::new(&PrismConfig::default()).unwrap();
        host.load_avatar(AvatarSource::Bytes(sample_bytes())).unwrap();
        host
    }

    #[test]
    fn test_new_scene_has_helpers() {
        let host = SceneHost::new(&PrismConfig::default()).unwrap();
        let frame = host.update(0.0);
        let helpers = frame
            .draws
            .iter()
            .filter(|d| matches!(d.kind, DrawKind::Helper(_)))
            .count();
        assert_eq!(helpers, 3);
        assert!(host.generation().is_none());
    }

    #[test]
    fn test_load_emits_events() {
        let host = SceneHost::new(&PrismConfig::default()).unwrap();
        let info = host.load_avatar(AvatarSource::Bytes(sample_bytes())).unwrap();

        assert_eq!(info.generation, 1);
        assert_eq!(info.title.as_deref(), Some("Prism Sample"));
        assert_eq!(info.nodes, sample::NODE_COUNT);
        assert_eq!(info.spring_bone_groups, 2);

        let events = host.drain_events();
        assert!(matches!(events[0], HostEvent::Progress { .. }));
        assert_eq!(
            events.last(),
            Some(&HostEvent::Load {
                generation: 1,
                title: Some("Prism Sample".into())
            })
        );
    }

    #[test]
    fn test_load_from_path_reports_progress() {
        let dir = std::env::temp_dir().join(format!("prism_scene_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sample.gltf");
        std::fs::write(&path, sample_bytes()).unwrap();

        let host = SceneHost::new(&PrismConfig::default()).unwrap();
        host.load_avatar(AvatarSource::Path(path)).unwrap();
        let progress: Vec<_> = host
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::Progress { loaded, total } => Some((loaded, total)),
                _ => None,
            })
            .collect();
        let (loaded, total) = *progress.last().unwrap();
        assert_eq!(Some(loaded), total);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_failed_load_keeps_previous_avatar() {
        let host = loaded_host();
        host.drain_events();

        let err = host.load_avatar(AvatarSource::Bytes(b"not json".to_vec()));
        assert!(err.is_err());
        assert_eq!(host.generation(), Some(1));
        assert!(matches!(host.drain_events().last(), Some(HostEvent::Error(_))));
    }

    #[test]
    fn test_set_view_layer_mode_requires_avatar() {
        let host = SceneHost::new(&PrismConfig::default()).unwrap();
        let result = host.set_view_layer_mode(ViewLayerMode::FirstPerson);
        assert!(matches!(result, Err(PrismError::NoAvatarLoaded)));
        assert_eq!(host.view_layer_mode(), ViewLayerMode::ThirdPerson);
    }

    #[test]
    fn test_view_layer_mode_filters_meshes() {
        let host = loaded_host();
        let face = host.state().avatar().unwrap().meshes()[1];
        assert_eq!(host.state().graph().layers(face), Layers::only(10));

        assert!(host.update(0.0).contains(face));
        host.set_view_layer_mode(ViewLayerMode::FirstPerson).unwrap();
        assert!(!host.update(0.0).contains(face));
    }

    #[test]
    fn test_hips_turned_around() {
        let host = loaded_host();
        let state = host.state();
        let hips = state.avatar().unwrap().nodes()[nodes::HIPS];
        let rotation = state.graph().transform(hips).unwrap().rotation;
        let forward = rotation * Vec3::Z;
        assert!((forward - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn test_dependency_shared_between_requests() {
        let host = loaded_host();
        let a = host.resolve_dependency(DependencyKind::Node, nodes::HEAD);
        let b = host.resolve_dependency(DependencyKind::Node, nodes::HEAD);

        let seen = Rc::new(Cell::new(None));
        let sink = Rc::clone(&seen);
        host.spawn_local(async move {
            let first = a.await;
            let second = b.await;
            assert_eq!(first, second);
            sink.set(first.ok());
        })
        .unwrap();
        assert!(seen.get().is_none());

        host.pump();

        let object = seen.get().unwrap();
        assert_eq!(object.generation, 1);
        assert_eq!(object.entity, host.state().avatar().unwrap().nodes()[nodes::HEAD]);
    }

    #[test]
    fn test_resolve_all_meshes() {
        let host = loaded_host();
        let all = host.resolve_dependencies(DependencyKind::Mesh);
        let out = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&out);
        host.spawn_local(async move {
            *sink.borrow_mut() = all.await.unwrap();
        })
        .unwrap();
        host.pump();
        assert_eq!(out.borrow().len(), 3);
    }

    #[test]
    fn test_out_of_range_dependency() {
        let host = loaded_host();
        let fut = host.resolve_dependency(DependencyKind::Mesh, 99);
        host.pump();
        assert_eq!(
            fut.now_or_never(),
            Some(Err(ResolveError::OutOfRange {
                kind: DependencyKind::Mesh,
                index: 99
            }))
        );
    }

    #[test]
    fn test_reload_cancels_pending_requests() {
        let host = loaded_host();
        let old_head = host.state().avatar().unwrap().nodes()[nodes::HEAD];
        let pending = host.resolve_dependency(DependencyKind::Node, nodes::HEAD);

        host.load_avatar(AvatarSource::Bytes(sample_bytes())).unwrap();
        host.pump();

        assert_eq!(pending.now_or_never(), Some(Err(ResolveError::AvatarReplaced)));
        assert!(!host.state().graph().contains(old_head));
        assert_eq!(host.generation(), Some(2));
    }

    #[test]
    fn test_no_avatar_dependency_fails() {
        let host = SceneHost::new(&PrismConfig::default()).unwrap();
        let fut = host.resolve_dependency(DependencyKind::Node, 0);
        assert_eq!(fut.now_or_never(), Some(Err(ResolveError::NoAvatar)));
    }

    #[test]
    fn test_dispose() {
        let host = loaded_host();
        let root = host.state().avatar().unwrap().root();
        host.drain_events();

        host.dispose();

        assert!(host.state().avatar().is_none());
        assert!(!host.state().graph().contains(root));
        assert_eq!(host.drain_events(), vec![HostEvent::Disposed { generation: 1 }]);
    }

    #[test]
    fn test_update_drives_blend_shapes() {
        let host = loaded_host();
        host.state_mut()
            .avatar_mut()
            .unwrap()
            .blend_shapes_mut()
            .set_value("A", 1.0);

        host.update(1.0 / 60.0);

        let state = host.state();
        let face = state.avatar().unwrap().meshes()[1];
        let renderer = state.graph().world().get::<&MeshRenderer>(face).unwrap();
        assert!((renderer.morph_weights[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_weak_host_does_not_keep_scene_alive() {
        let host = SceneHost::new(&PrismConfig::default()).unwrap();
        let weak = host.downgrade();
        assert!(weak.upgrade().is_some());
        drop(host);
        assert!(weak.upgrade().is_none());
    }
}
