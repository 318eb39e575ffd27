use std::any::Any;
use std::collections::{BTreeMap, BTreeSet};

use anyhow::{anyhow, bail, Result};
use glam::Vec3;
use tracing::debug;

use mamba_config::EnvironmentConfig;
use mamba_core::host::ContentHost;
use mamba_core::module::{ContainerId, ContentRef, InstanceId};

use crate::environment;
use crate::scene::{NodeId, NodeKind, Scene};

/// Content host backed by the in-memory [`Scene`].
///
/// Content references name prefabs; instantiating one generates its
/// environment under the container node (created on first use).
pub struct SceneHost {
    scene: Scene,
    prefabs: BTreeMap<String, EnvironmentConfig>,
    live: BTreeSet<InstanceId>,
}

impl SceneHost {
    pub fn new(prefabs: BTreeMap<String, EnvironmentConfig>) -> Self {
        Self {
            scene: Scene::new(),
            prefabs,
            live: BTreeSet::new(),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Number of instantiated, not yet destroyed content instances.
    pub fn live_instances(&self) -> usize {
        self.live.len()
    }

    pub fn instance_root(instance: InstanceId) -> NodeId {
        NodeId(instance.0)
    }

    fn container_node(&mut self, container: &ContainerId) -> NodeId {
        match self.scene.find_child(None, container.name()) {
            Some(id) => id,
            None => self
                .scene
                .spawn(container.name(), NodeKind::Group, None, Vec3::ZERO, Vec3::ONE),
        }
    }
}

impl ContentHost for SceneHost {
    fn instantiate(&mut self, content: &ContentRef, container: &ContainerId) -> Result<InstanceId> {
        let prefab = self
            .prefabs
            .get(content.key())
            .ok_or_else(|| anyhow!("unknown prefab {:?}", content.key()))?;
        // Light placement samples within the floor extent, which must be finite.
        let half = environment::half_extent(prefab);
        if !half.is_finite() {
            bail!("prefab {:?} floor extent is not finite", content.key());
        }
        let layout = environment::generate(prefab);

        let parent = self.container_node(container);
        let root = layout.spawn(&mut self.scene, Some(parent), content.key());
        let instance = InstanceId(root.0);
        self.live.insert(instance);

        debug!(
            prefab = %content,
            container = %container,
            nodes = self.scene.subtree(root).len(),
            lights = layout.neon_lights.len(),
            "instantiated prefab"
        );
        Ok(instance)
    }

    fn destroy(&mut self, instance: InstanceId) {
        let removed = self.scene.despawn(Self::instance_root(instance));
        self.live.remove(&instance);
        debug!(instance = instance.0, removed, "destroyed instance");
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
