//! Property-graph storage layer.
//!
//! Nodes carry a label and a property map; edges are directed, typed, and
//! also carry properties. The store keeps adjacency lists plus label and
//! edge-type indexes so the catalog and engines can traverse without
//! scanning.

pub mod edge;
pub mod node;
pub mod property;
pub mod store;
pub mod types;

pub use edge::Edge;
pub use node::Node;
pub use property::{PropertyMap, PropertyValue};
pub use store::{GraphError, GraphResult, GraphStore};
pub use types::{EdgeId, EdgeType, Label, NodeId};
