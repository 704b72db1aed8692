use glam::DVec3;

use super::{NodeId, NodePayload, SceneGraph};

/// Axis-aligned bounding box in world space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    pub fn from_sphere(center: DVec3, radius: f64) -> Self {
        let r = DVec3::splat(radius.abs());
        Self {
            min: center - r,
            max: center + r,
        }
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }

    pub fn intersects_sphere(&self, center: DVec3, radius: f64) -> bool {
        let closest = center.clamp(self.min, self.max);
        closest.distance_squared(center) <= radius * radius
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SpatialKind {
    Object,
    Light,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SpatialEntry {
    pub node: NodeId,
    pub kind: SpatialKind,
    pub bounds: Aabb,
}

/// Flat world-space bounds of every mesh and light node.
///
/// Cameras and grouping nodes are not indexed. Entries are rebuilt from cached
/// global transforms, so the graph must be propagated first.
#[derive(Debug, Default)]
pub struct SpatialIndex {
    entries: Vec<SpatialEntry>,
    bounds: Option<Aabb>,
    built_revision: Option<u64>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[SpatialEntry] {
        &self.entries
    }

    /// Union of all entries, `None` when empty.
    pub fn bounds(&self) -> Option<Aabb> {
        self.bounds
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rebuilds if the graph changed since the last build. Returns true when
    /// a rebuild happened. Payload-only edits need an explicit `rebuild`.
    pub fn update(&mut self, graph: &SceneGraph) -> bool {
        if self.built_revision == Some(graph.revision()) {
            return false;
        }
        self.rebuild(graph);
        true
    }

    pub fn rebuild(&mut self, graph: &SceneGraph) {
        self.entries.clear();
        for (node, scene_node) in graph.iter() {
            let center = scene_node.global_transform().translation;
            let (kind, radius) = match scene_node.payload() {
                NodePayload::Mesh(mesh) => (SpatialKind::Object, mesh.bound_radius),
                NodePayload::Light(light) => (SpatialKind::Light, light.radius as f64),
                NodePayload::Camera(_) | NodePayload::Empty => continue,
            };
            self.entries.push(SpatialEntry {
                node,
                kind,
                bounds: Aabb::from_sphere(center, radius),
            });
        }
        self.bounds = self
            .entries
            .iter()
            .map(|e| e.bounds)
            .reduce(|a, b| a.union(&b));
        self.built_revision = Some(graph.revision());
    }

    pub fn query_aabb<'a>(&'a self, area: &'a Aabb) -> impl Iterator<Item = &'a SpatialEntry> + 'a {
        self.entries.iter().filter(move |e| e.bounds.intersects(area))
    }

    pub fn query_sphere(&self, center: DVec3, radius: f64) -> impl Iterator<Item = &SpatialEntry> + '_ {
        self.entries
            .iter()
            .filter(move |e| e.bounds.intersects_sphere(center, radius))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Camera, Light, MaterialId, MeshHandle, MeshObject, Transform};

    fn mesh(radius: f64) -> NodePayload {
        NodePayload::Mesh(MeshObject {
            mesh: MeshHandle(0),
            material: MaterialId::default(),
            bound_radius: radius,
        })
    }

    fn graph() -> (SceneGraph, NodeId, NodeId) {
        let mut g = SceneGraph::new();
        g.insert(None, "camera", NodePayload::Camera(Camera::default()), Transform::IDENTITY)
            .unwrap();
        let near = g
            .insert(None, "near", mesh(1.0), Transform::from_translation(DVec3::new(2.0, 0.0, 0.0)))
            .unwrap();
        let far = g
            .insert(
                None,
                "lamp",
                NodePayload::Light(Light { radius: 2.0, ..Light::default() }),
                Transform::from_translation(DVec3::new(50.0, 0.0, 0.0)),
            )
            .unwrap();
        g.propagate();
        (g, near, far)
    }

    #[test]
    fn indexes_meshes_and_lights_only() {
        let (g, _, _) = graph();
        let mut index = SpatialIndex::new();
        assert!(index.update(&g));
        assert_eq!(index.len(), 2);

        let bounds = index.bounds().unwrap();
        assert_eq!(bounds.min, DVec3::new(1.0, -2.0, -2.0));
        assert_eq!(bounds.max, DVec3::new(52.0, 2.0, 2.0));
    }

    #[test]
    fn update_is_keyed_on_graph_revision() {
        let (mut g, near, _) = graph();
        let mut index = SpatialIndex::new();
        assert!(index.update(&g));
        assert!(!index.update(&g));

        g.set_local_transform(near, Transform::from_translation(DVec3::new(-10.0, 0.0, 0.0)))
            .unwrap();
        g.propagate();
        assert!(index.update(&g));
        let entry = index.entries().iter().find(|e| e.node == near).unwrap();
        assert_eq!(entry.bounds.center(), DVec3::new(-10.0, 0.0, 0.0));
    }

    #[test]
    fn queries_filter_by_overlap() {
        let (g, near, far) = graph();
        let mut index = SpatialIndex::new();
        index.rebuild(&g);

        let hits: Vec<_> = index.query_sphere(DVec3::ZERO, 1.5).map(|e| e.node).collect();
        assert_eq!(hits, vec![near]);

        let area = Aabb { min: DVec3::new(40.0, -1.0, -1.0), max: DVec3::new(60.0, 1.0, 1.0) };
        let hits: Vec<_> = index.query_aabb(&area).map(|e| (e.node, e.kind)).collect();
        assert_eq!(hits, vec![(far, SpatialKind::Light)]);
    }
}
