use std::collections::BTreeMap;

use glam::{EulerRot, Quat, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// Surface parameters for a metallic primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Vec3,
    pub metallic: f32,
    pub gloss: f32,
    pub emission: Option<Vec3>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: Vec3,
    pub intensity: f32,
    pub range: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Empty transform used to parent other nodes.
    Group,
    Floor { material: Material, tiling: f32 },
    Wall { material: Material },
    NeonLight(PointLight),
    /// Decorative emissive sphere, no collider.
    Glow { material: Material },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    /// Position relative to the parent.
    pub position: Vec3,
    pub scale: Vec3,
}

/// Scene-wide render settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Atmosphere {
    pub ambient: Vec3,
    pub fog_color: Vec3,
    pub fog_density: f32,
    pub fog_enabled: bool,
}

impl Default for Atmosphere {
    fn default() -> Self {
        Self {
            ambient: Vec3::splat(0.2),
            fog_color: Vec3::splat(0.5),
            fog_density: 0.0,
            fog_enabled: false,
        }
    }
}

/// The directional light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sun {
    pub color: Vec3,
    pub intensity: f32,
    pub pitch_deg: f32,
    pub yaw_deg: f32,
}

impl Default for Sun {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 1.0,
            pitch_deg: 50.0,
            yaw_deg: -30.0,
        }
    }
}

impl Sun {
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            self.yaw_deg.to_radians(),
            self.pitch_deg.to_radians(),
            0.0,
        )
    }

    /// Direction the light travels in.
    pub fn direction(&self) -> Vec3 {
        self.rotation() * Vec3::Z
    }

    /// Whether the light comes from above the horizon.
    pub fn is_up(&self) -> bool {
        self.direction().y < 0.0
    }
}

/// Flat arena of nodes with parent links.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: BTreeMap<NodeId, Node>,
    next_id: u64,
    pub atmosphere: Atmosphere,
    pub sun: Sun,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(
        &mut self,
        name: impl Into<String>,
        kind: NodeKind,
        parent: Option<NodeId>,
        position: Vec3,
        scale: Vec3,
    ) -> NodeId {
        self.next_id += 1;
        let id = NodeId(self.next_id);
        self.nodes.insert(
            id,
            Node {
                name: name.into(),
                kind,
                parent,
                position,
                scale,
            },
        );
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// First node (in creation order) with the given name and parent.
    pub fn find_child(&self, parent: Option<NodeId>, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, n)| n.parent == parent && n.name == name)
            .map(|(&id, _)| id)
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .filter(move |(_, n)| n.parent == Some(id))
            .map(|(&child, _)| child)
    }

    /// `id` and everything below it, parents before children.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        if !self.contains(id) {
            return Vec::new();
        }
        let mut out = vec![id];
        let mut i = 0;
        while i < out.len() {
            let children: Vec<NodeId> = self.children(out[i]).collect();
            out.extend(children);
            i += 1;
        }
        out
    }

    /// Remove a node with its whole subtree. Returns how many nodes went away.
    pub fn despawn(&mut self, id: NodeId) -> usize {
        let doomed = self.subtree(id);
        for node in &doomed {
            self.nodes.remove(node);
        }
        doomed.len()
    }

    /// Position after applying every ancestor's translation and scale.
    pub fn world_position(&self, id: NodeId) -> Option<Vec3> {
        let mut node = self.get(id)?;
        let mut pos = node.position;
        while let Some(parent) = node.parent.and_then(|p| self.get(p)) {
            pos = parent.position + pos * parent.scale;
            node = parent;
        }
        Some(pos)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().map(|(&id, n)| (id, n))
    }

    pub fn lights(&self) -> impl Iterator<Item = (NodeId, &PointLight)> {
        self.nodes.iter().filter_map(|(&id, n)| match &n.kind {
            NodeKind::NeonLight(light) => Some((id, light)),
            _ => None,
        })
    }

    pub fn lights_mut(&mut self) -> impl Iterator<Item = &mut PointLight> {
        self.nodes.values_mut().filter_map(|n| match &mut n.kind {
            NodeKind::NeonLight(light) => Some(light),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
