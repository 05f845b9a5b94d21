use std::fmt::{self, Display, Formatter};

use glam::Mat4;

use crate::core::geometry::{Mesh, PointCloud};
use crate::core::{DirectionalLight, PointsMaterial, StandardMaterial, Transform};

/// Index of a node in its [`Scene`]. Nodes are never removed, so ids stay valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Pure transform, used to pivot its children.
    Group,
    Mesh {
        mesh: Mesh,
        material: StandardMaterial,
    },
    Points {
        cloud: PointCloud,
        material: PointsMaterial,
    },
    Light(DirectionalLight),
}

impl NodeKind {
    fn label(&self) -> &'static str {
        match self {
            NodeKind::Group => "Group",
            NodeKind::Mesh { .. } => "Mesh",
            NodeKind::Points { .. } => "Points",
            NodeKind::Light(_) => "DirectionalLight",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub name: String,
    pub kind: NodeKind,
    pub transform: Transform,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Entity {
    pub fn new(name: &str, kind: NodeKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            transform: Transform::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

impl Display for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.kind.label(), self.name)
    }
}

/// Scene graph: a flat arena of entities linked into a tree of parent/child
/// transforms. Root entities have no parent.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    entities: Vec<Entity>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity at the root.
    pub fn add(&mut self, entity: Entity) -> NodeId {
        self.insert(entity, None)
    }

    /// Add an entity under `parent`; its transform becomes relative to the parent.
    pub fn add_child(&mut self, parent: NodeId, entity: Entity) -> NodeId {
        self.insert(entity, Some(parent))
    }

    fn insert(&mut self, mut entity: Entity, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.entities.len());
        entity.parent = parent;
        self.entities.push(entity);
        if let Some(p) = parent {
            self.entities[p.0].children.push(id);
        }
        id
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: NodeId) -> &Entity {
        &self.entities[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Entity {
        &mut self.entities[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Entity)> {
        self.entities.iter().enumerate().map(|(i, e)| (NodeId(i), e))
    }

    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.iter()
            .filter(|(_, e)| e.parent.is_none())
            .map(|(id, _)| id)
    }

    /// Local-to-world matrix: every ancestor's local matrix applied outermost first.
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let entity = self.get(id);
        match entity.parent {
            Some(parent) => entity.transform.compose(&self.world_matrix(parent)),
            None => entity.transform.local_matrix(),
        }
    }

    pub fn lights(&self) -> Vec<&DirectionalLight> {
        self.entities
            .iter()
            .filter_map(|e| match &e.kind {
                NodeKind::Light(light) => Some(light),
                _ => None,
            })
            .collect()
    }

    pub fn count_kind(&self, pred: impl Fn(&NodeKind) -> bool) -> usize {
        self.entities.iter().filter(|e| pred(&e.kind)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn nested_world_matrix_composes_parent_first() {
        let mut scene = Scene::new();
        let mut pivot = Transform::new();
        pivot.rot.y = std::f32::consts::PI;
        let group = scene.add(Entity::new("pivot", NodeKind::Group).with_transform(pivot));
        let child = scene.add_child(
            group,
            Entity::new("child", NodeKind::Group)
                .with_transform(Transform::from_translation(Vec3::new(50.0, 0.0, 0.0))),
        );

        let p = scene.world_matrix(child).transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(-50.0, 0.0, 0.0)).length() < 1e-3);
        assert_eq!(scene.get(child).parent(), Some(group));
        assert_eq!(scene.get(group).children(), &[child]);
        assert_eq!(scene.roots().collect::<Vec<_>>(), vec![group]);
    }

    #[test]
    fn lights_are_collected() {
        let mut scene = Scene::new();
        scene.add(Entity::new("g", NodeKind::Group));
        scene.add(Entity::new("sun", NodeKind::Light(DirectionalLight::default())));
        assert_eq!(scene.lights().len(), 1);
        assert_eq!(scene.count_kind(|k| matches!(k, NodeKind::Group)), 1);
    }
}
