//! In-memory property-graph storage.
//!
//! Arena-backed node and edge storage with adjacency lists plus label and
//! edge-type indexes for O(1) typed lookups. This is the query surface the
//! catalog and the engines are written against; it knows nothing about
//! recommendations.

use super::edge::Edge;
use super::node::Node;
use super::property::PropertyMap;
use super::types::{EdgeId, EdgeType, Label, NodeId};
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

/// Errors that can occur during graph operations.
#[derive(Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("edge {0} not found")]
    EdgeNotFound(EdgeId),

    #[error("invalid edge: source node {0} does not exist")]
    InvalidEdgeSource(NodeId),

    #[error("invalid edge: target node {0} does not exist")]
    InvalidEdgeTarget(NodeId),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// In-memory graph store.
///
/// Storage layout:
/// - `nodes` / `edges`: arenas indexed by id, `None` marks a freed slot
/// - `outgoing` / `incoming`: adjacency lists per node
/// - `label_index`: label -> node ids
/// - `edge_type_index`: relationship type -> edge ids
#[derive(Debug)]
pub struct GraphStore {
    nodes: Vec<Option<Node>>,
    edges: Vec<Option<Edge>>,
    outgoing: Vec<Vec<EdgeId>>,
    incoming: Vec<Vec<EdgeId>>,
    free_node_ids: Vec<u64>,
    free_edge_ids: Vec<u64>,
    label_index: FxHashMap<Label, FxHashSet<NodeId>>,
    edge_type_index: FxHashMap<EdgeType, FxHashSet<EdgeId>>,
    next_node_id: u64,
    next_edge_id: u64,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphStore {
    /// Create a new empty graph store.
    pub fn new() -> Self {
        GraphStore {
            nodes: Vec::with_capacity(1024),
            edges: Vec::with_capacity(4096),
            outgoing: Vec::with_capacity(1024),
            incoming: Vec::with_capacity(1024),
            free_node_ids: Vec::new(),
            free_edge_ids: Vec::new(),
            label_index: FxHashMap::default(),
            edge_type_index: FxHashMap::default(),
            next_node_id: 1,
            next_edge_id: 1,
        }
    }

    fn allocate_node_id(&mut self) -> NodeId {
        let id = self.free_node_ids.pop().unwrap_or_else(|| {
            let id = self.next_node_id;
            self.next_node_id += 1;
            id
        });
        NodeId::new(id)
    }

    fn allocate_edge_id(&mut self) -> EdgeId {
        let id = self.free_edge_ids.pop().unwrap_or_else(|| {
            let id = self.next_edge_id;
            self.next_edge_id += 1;
            id
        });
        EdgeId::new(id)
    }

    /// Create a node with no properties.
    pub fn create_node(&mut self, label: impl Into<Label>) -> NodeId {
        self.create_node_with_properties(label, PropertyMap::new())
    }

    /// Create a node with initial properties.
    pub fn create_node_with_properties(
        &mut self,
        label: impl Into<Label>,
        properties: PropertyMap,
    ) -> NodeId {
        let node_id = self.allocate_node_id();
        let idx = node_id.as_u64() as usize;

        let label = label.into();
        let node = Node::with_properties(node_id, label.clone(), properties);

        self.label_index.entry(label).or_default().insert(node_id);

        if idx >= self.nodes.len() {
            self.nodes.resize(idx + 1, None);
            self.outgoing.resize(idx + 1, Vec::new());
            self.incoming.resize(idx + 1, Vec::new());
        }
        self.nodes[idx] = Some(node);
        self.outgoing[idx].clear();
        self.incoming[idx].clear();

        node_id
    }

    /// Get a node by id.
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.as_u64() as usize).and_then(|n| n.as_ref())
    }

    /// Get a mutable node by id.
    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes
            .get_mut(id.as_u64() as usize)
            .and_then(|n| n.as_mut())
    }

    /// Check if a node exists.
    pub fn has_node(&self, id: NodeId) -> bool {
        self.get_node(id).is_some()
    }

    /// Set a property on a node.
    pub fn set_node_property(
        &mut self,
        id: NodeId,
        key: impl Into<String>,
        value: impl Into<super::property::PropertyValue>,
    ) -> GraphResult<()> {
        let node = self.get_node_mut(id).ok_or(GraphError::NodeNotFound(id))?;
        node.set_property(key, value);
        Ok(())
    }

    /// Delete a node and all edges touching it (cascade).
    pub fn delete_node(&mut self, id: NodeId) -> GraphResult<Node> {
        let idx = id.as_u64() as usize;
        let node = self
            .nodes
            .get_mut(idx)
            .and_then(|slot| slot.take())
            .ok_or(GraphError::NodeNotFound(id))?;

        if let Some(set) = self.label_index.get_mut(&node.label) {
            set.remove(&id);
        }
        self.free_node_ids.push(id.as_u64());

        let mut touching: Vec<EdgeId> = std::mem::take(&mut self.outgoing[idx]);
        touching.extend(std::mem::take(&mut self.incoming[idx]));
        for edge_id in touching {
            // A self-loop appears in both lists; the second delete is a no-op.
            let _ = self.delete_edge(edge_id);
        }

        Ok(node)
    }

    /// Create an edge with no properties.
    pub fn create_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        edge_type: impl Into<EdgeType>,
    ) -> GraphResult<EdgeId> {
        self.create_edge_with_properties(source, target, edge_type, PropertyMap::new())
    }

    /// Create an edge with initial properties.
    pub fn create_edge_with_properties(
        &mut self,
        source: NodeId,
        target: NodeId,
        edge_type: impl Into<EdgeType>,
        properties: PropertyMap,
    ) -> GraphResult<EdgeId> {
        if !self.has_node(source) {
            return Err(GraphError::InvalidEdgeSource(source));
        }
        if !self.has_node(target) {
            return Err(GraphError::InvalidEdgeTarget(target));
        }

        let edge_id = self.allocate_edge_id();
        let idx = edge_id.as_u64() as usize;

        let edge_type = edge_type.into();
        let edge = Edge::with_properties(edge_id, source, target, edge_type.clone(), properties);

        self.outgoing[source.as_u64() as usize].push(edge_id);
        self.incoming[target.as_u64() as usize].push(edge_id);
        self.edge_type_index
            .entry(edge_type)
            .or_default()
            .insert(edge_id);

        if idx >= self.edges.len() {
            self.edges.resize(idx + 1, None);
        }
        self.edges[idx] = Some(edge);

        Ok(edge_id)
    }

    /// Find the edge of a given type between two specific endpoints.
    ///
    /// Absence is a normal outcome, not an error: callers use this to check
    /// for an existing relationship before deciding how to proceed.
    pub fn find_edge(&self, source: NodeId, target: NodeId, edge_type: &EdgeType) -> Option<&Edge> {
        self.outgoing
            .get(source.as_u64() as usize)?
            .iter()
            .filter_map(|&id| self.get_edge(id))
            .find(|e| e.target == target && e.edge_type == *edge_type)
    }

    /// Create-or-update the edge of a given type between two endpoints.
    ///
    /// Guarantees at most one edge per (type, source, target): when the edge
    /// already exists its properties are merged in place and its update
    /// timestamp bumped; otherwise a new edge is created. The check and the
    /// write happen under one `&mut self`, so no concurrent caller can
    /// observe the gap between them.
    pub fn upsert_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        edge_type: impl Into<EdgeType>,
        properties: PropertyMap,
    ) -> GraphResult<EdgeId> {
        let edge_type = edge_type.into();
        match self.find_edge(source, target, &edge_type).map(|e| e.id) {
            Some(id) => {
                let edge = self.get_edge_mut(id).ok_or(GraphError::EdgeNotFound(id))?;
                for (key, value) in properties {
                    edge.set_property(key, value);
                }
                Ok(id)
            }
            None => self.create_edge_with_properties(source, target, edge_type, properties),
        }
    }

    /// Get an edge by id.
    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.as_u64() as usize).and_then(|e| e.as_ref())
    }

    /// Get a mutable edge by id.
    pub fn get_edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges
            .get_mut(id.as_u64() as usize)
            .and_then(|e| e.as_mut())
    }

    /// Delete an edge.
    pub fn delete_edge(&mut self, id: EdgeId) -> GraphResult<Edge> {
        let edge = self
            .edges
            .get_mut(id.as_u64() as usize)
            .and_then(|slot| slot.take())
            .ok_or(GraphError::EdgeNotFound(id))?;

        self.free_edge_ids.push(id.as_u64());
        if let Some(set) = self.edge_type_index.get_mut(&edge.edge_type) {
            set.remove(&id);
        }
        if let Some(adj) = self.outgoing.get_mut(edge.source.as_u64() as usize) {
            adj.retain(|&eid| eid != id);
        }
        if let Some(adj) = self.incoming.get_mut(edge.target.as_u64() as usize) {
            adj.retain(|&eid| eid != id);
        }

        Ok(edge)
    }

    /// Delete every edge of the given type, returning how many were removed.
    pub fn delete_edges_by_type(&mut self, edge_type: &EdgeType) -> usize {
        let ids: Vec<EdgeId> = self
            .edge_type_index
            .get(edge_type)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();

        let mut removed = 0;
        for id in ids {
            if self.delete_edge(id).is_ok() {
                removed += 1;
            }
        }
        removed
    }

    /// All outgoing edges from a node.
    pub fn get_outgoing_edges(&self, node_id: NodeId) -> Vec<&Edge> {
        self.outgoing
            .get(node_id.as_u64() as usize)
            .map(|ids| ids.iter().filter_map(|&id| self.get_edge(id)).collect())
            .unwrap_or_default()
    }

    /// Outgoing edges of one relationship type, in creation order.
    pub fn get_outgoing_edges_by_type(&self, node_id: NodeId, edge_type: &EdgeType) -> Vec<&Edge> {
        self.outgoing
            .get(node_id.as_u64() as usize)
            .map(|ids| {
                ids.iter()
                    .filter_map(|&id| self.get_edge(id))
                    .filter(|e| e.edge_type == *edge_type)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All incoming edges to a node.
    pub fn get_incoming_edges(&self, node_id: NodeId) -> Vec<&Edge> {
        self.incoming
            .get(node_id.as_u64() as usize)
            .map(|ids| ids.iter().filter_map(|&id| self.get_edge(id)).collect())
            .unwrap_or_default()
    }

    /// Incoming edges of one relationship type, in creation order.
    pub fn get_incoming_edges_by_type(&self, node_id: NodeId, edge_type: &EdgeType) -> Vec<&Edge> {
        self.incoming
            .get(node_id.as_u64() as usize)
            .map(|ids| {
                ids.iter()
                    .filter_map(|&id| self.get_edge(id))
                    .filter(|e| e.edge_type == *edge_type)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All nodes carrying a label (bulk scan of one collection).
    pub fn get_nodes_by_label(&self, label: &Label) -> Vec<&Node> {
        self.label_index
            .get(label)
            .map(|ids| ids.iter().filter_map(|&id| self.get_node(id)).collect())
            .unwrap_or_default()
    }

    /// All edges of a relationship type.
    pub fn get_edges_by_type(&self, edge_type: &EdgeType) -> Vec<&Edge> {
        self.edge_type_index
            .get(edge_type)
            .map(|ids| ids.iter().filter_map(|&id| self.get_edge(id)).collect())
            .unwrap_or_default()
    }

    /// All live nodes.
    pub fn all_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter_map(|n| n.as_ref())
    }

    /// Total number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Total number of live edges.
    pub fn edge_count(&self) -> usize {
        self.edges.iter().filter(|e| e.is_some()).count()
    }

    /// Number of edges of one relationship type.
    pub fn edge_count_by_type(&self, edge_type: &EdgeType) -> usize {
        self.edge_type_index
            .get(edge_type)
            .map(|set| set.len())
            .unwrap_or(0)
    }

    /// Drop all nodes and edges.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.outgoing.clear();
        self.incoming.clear();
        self.free_node_ids.clear();
        self.free_edge_ids.clear();
        self.label_index.clear();
        self.edge_type_index.clear();
        self.next_node_id = 1;
        self.next_edge_id = 1;
    }
}
