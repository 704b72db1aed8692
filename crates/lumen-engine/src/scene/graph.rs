use slotmap::SlotMap;

use crate::error::SceneError;

use super::{NodeId, NodePayload, SceneNode, Transform};

/// Tree of spatial nodes.
///
/// Edits only mark nodes dirty; `propagate` re-derives global transforms
/// top-down. The dispatch pipeline calls it before any stage reads globals.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: SlotMap<NodeId, SceneNode>,
    roots: Vec<NodeId>,
    revision: u64,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Bumped whenever global placements or the node set change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter()
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.name == name)
            .map(|(id, _)| id)
    }

    pub fn insert(
        &mut self,
        parent: Option<NodeId>,
        name: impl Into<String>,
        payload: NodePayload,
        local: Transform,
    ) -> Result<NodeId, SceneError> {
        if let Some(p) = parent {
            if !self.nodes.contains_key(p) {
                return Err(SceneError::UnknownNode(p));
            }
        }

        let id = self.nodes.insert(SceneNode {
            name: name.into(),
            local,
            global: local,
            parent,
            children: Vec::new(),
            payload,
            dirty: true,
        });

        match parent.and_then(|p| self.nodes.get_mut(p)) {
            Some(p) => p.children.push(id),
            None => self.roots.push(id),
        }
        Ok(id)
    }

    /// Removes `id` and its whole subtree. Returns the number of nodes removed.
    pub fn remove(&mut self, id: NodeId) -> Result<usize, SceneError> {
        let parent = self.node(id)?.parent;
        self.detach(id, parent);

        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(next) {
                stack.extend(node.children);
                removed += 1;
            }
        }
        self.revision += 1;
        Ok(removed)
    }

    /// Moves `child` under `parent` (or to the root level). The local transform
    /// is kept, so the global placement changes with the new parent.
    pub fn set_parent(&mut self, child: NodeId, parent: Option<NodeId>) -> Result<(), SceneError> {
        let old_parent = self.node(child)?.parent;
        if let Some(p) = parent {
            self.node(p)?;
            let mut cursor = Some(p);
            while let Some(c) = cursor {
                if c == child {
                    return Err(SceneError::Cycle { child, parent: p });
                }
                cursor = self.nodes.get(c).and_then(|n| n.parent);
            }
        }

        self.detach(child, old_parent);
        match parent.and_then(|p| self.nodes.get_mut(p)) {
            Some(p) => p.children.push(child),
            None => self.roots.push(child),
        }
        let node = self.node_mut(child)?;
        node.parent = parent;
        node.dirty = true;
        Ok(())
    }

    pub fn set_local_transform(&mut self, id: NodeId, local: Transform) -> Result<(), SceneError> {
        let node = self.node_mut(id)?;
        node.local = local;
        node.dirty = true;
        Ok(())
    }

    /// Sets the world placement of `id`; the local transform is re-derived
    /// from the parent chain as it stands now.
    pub fn set_global_transform(&mut self, id: NodeId, global: Transform) -> Result<(), SceneError> {
        let parent_global = match self.node(id)?.parent {
            Some(p) => self.resolve_global(p)?,
            None => Transform::IDENTITY,
        };
        let node = self.node_mut(id)?;
        node.local = parent_global.inverse() * global;
        node.global = global;
        node.dirty = true;
        Ok(())
    }

    /// Cached global transform. Stale until `propagate` if the node is dirty.
    pub fn global_transform(&self, id: NodeId) -> Option<Transform> {
        self.nodes.get(id).map(|n| n.global)
    }

    /// Global transform computed from the parent chain, ignoring the cache.
    pub fn resolve_global(&self, id: NodeId) -> Result<Transform, SceneError> {
        let mut node = self.node(id)?;
        let mut global = node.local;
        while let Some(p) = node.parent {
            node = self.node(p)?;
            global = node.local * global;
        }
        Ok(global)
    }

    /// Re-derives global transforms of dirty nodes and their descendants.
    /// Returns the number of nodes updated.
    pub fn propagate(&mut self) -> usize {
        let mut updated = 0;
        let mut stack: Vec<(NodeId, Transform, bool)> = self
            .roots
            .iter()
            .rev()
            .map(|&id| (id, Transform::IDENTITY, false))
            .collect();

        while let Some((id, parent_global, forced)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(id) else {
                continue;
            };
            let recompute = forced || node.dirty;
            if recompute {
                node.global = parent_global * node.local;
                node.dirty = false;
                updated += 1;
            }
            let global = node.global;
            stack.extend(node.children.iter().rev().map(|&c| (c, global, recompute)));
        }

        if updated > 0 {
            self.revision += 1;
        }
        updated
    }

    pub fn is_clean(&self) -> bool {
        self.nodes.values().all(|n| !n.dirty)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
        self.revision += 1;
    }

    fn node(&self, id: NodeId) -> Result<&SceneNode, SceneError> {
        self.nodes.get(id).ok_or(SceneError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut SceneNode, SceneError> {
        self.nodes.get_mut(id).ok_or(SceneError::UnknownNode(id))
    }

    fn detach(&mut self, id: NodeId, parent: Option<NodeId>) {
        match parent.and_then(|p| self.nodes.get_mut(p)) {
            Some(p) => p.children.retain(|&c| c != id),
            None => self.roots.retain(|&c| c != id),
        }
    }
}
