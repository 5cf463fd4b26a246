//! # Core Data Models
//!
//! This module defines the fundamental data model for the graph.
//! It uses `SlotMap` for efficient, safe, and stable entity storage without pointers.
//!
//! The graph is generic over `T: NodeData` to allow consumers to embed their own payload.
//! Port types are plain strings so the graph stays decoupled from any type system
//! built on top of it.

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use slotmap::new_key_type;
use std::collections::HashMap;

/// Input-side sentinel: the port accepts anything.
pub const ANY_TYPE: &str = "any";
/// Output-side sentinel: the port may produce anything.
pub const ALL_TYPE: &str = "all";

/// Trait that user data must implement to be stored in the graph.
pub trait NodeData: std::fmt::Debug {
    /// Returns the registry ID (type string) for this node, used by the engine.
    fn node_type(&self) -> String;
}

impl NodeData for String {
    fn node_type(&self) -> String {
        "Default".to_string()
    }
}

impl NodeData for () {
    fn node_type(&self) -> String {
        "Default".to_string()
    }
}

new_key_type! {
    /// Unique identifier for a Node.
    pub struct NodeId;
    /// Unique identifier for a Port.
    pub struct PortId;
    /// Unique identifier for a Connection.
    pub struct ConnectionId;
}

use bitflags::bitflags;

bitflags! {
    /// Bitflags representing various boolean states of a Node.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct NodeFlags: u8 {
        /// The node cannot be removed from the graph.
        const LOCKED = 1 << 0;
    }
}

// Manual Serialize/Deserialize implementation for bitflags to be friendly
impl Serialize for NodeFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.bits())
    }
}

impl<'de> Deserialize<'de> for NodeFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(Self::from_bits_truncate(bits))
    }
}

pub use uuid::Uuid;

/// A Node in the graph.
///
/// Nodes are the primary entities. They own a list of input/output ports
/// and carry user-defined `data`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Node<T> {
    /// Self-reference ID.
    pub id: NodeId,
    /// Stable UUID for persistence.
    pub uuid: Uuid,
    /// Display name.
    pub name: String,
    /// List of input port IDs.
    pub inputs: Vec<PortId>,
    /// List of output port IDs.
    pub outputs: Vec<PortId>,
    /// User-defined payload.
    pub data: T,
    /// State flags.
    pub flags: NodeFlags,
}

/// Which side of a node a port sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    Input,
    Output,
}

/// A Port on a Node.
///
/// Ports are the anchors for Connections. Inputs advertise `accepted_types`,
/// outputs advertise `produced_type`. Both are mutable so nodes can republish
/// them as the graph around them changes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Port {
    /// Self-reference ID.
    pub id: PortId,
    /// ID of the Node this port belongs to.
    pub node: NodeId,
    /// Name, unique per node and direction.
    pub name: String,
    pub direction: PortDirection,
    /// Types this input is willing to receive.
    #[serde(default)]
    pub accepted_types: Vec<String>,
    /// Type this output produces.
    #[serde(default)]
    pub produced_type: Option<String>,
    /// The output feeds at most one input. Inputs are always single.
    #[serde(default)]
    pub exclusive: bool,
}

impl Port {
    /// The type this port offers to a consumer.
    ///
    /// Falls back to the first accepted type, then to the output sentinel.
    pub fn offered_type(&self) -> &str {
        self.produced_type
            .as_deref()
            .or_else(|| self.accepted_types.first().map(String::as_str))
            .unwrap_or(ALL_TYPE)
    }
}

/// A Connection between two Ports.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Source (output) Port ID.
    pub from: PortId,
    /// Target (input) Port ID.
    pub to: PortId,
}

/// Returns true when a producer of `produced` may feed an input accepting `accepted`.
pub fn types_compatible(produced: &str, accepted: &[String]) -> bool {
    if produced == ALL_TYPE || produced == ANY_TYPE {
        return true;
    }
    accepted
        .iter()
        .any(|t| t == ANY_TYPE || t == ALL_TYPE || t == produced)
}

/// The entire state of the Graph.
///
/// This struct holds all entities (Nodes, Ports, Connections) in flat Arenas (`SlotMap`).
/// It is responsible for data storage, but not for validation or event dispatch.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphState<T> {
    /// Arena for Nodes.
    pub nodes: SlotMap<NodeId, Node<T>>,
    /// Arena for Ports.
    pub ports: SlotMap<PortId, Port>,
    /// Arena for Connections.
    pub connections: SlotMap<ConnectionId, Connection>,
    /// Index for O(1) UUID to NodeId lookup.
    #[serde(default, skip)]
    pub uuid_index: HashMap<Uuid, NodeId>,
}

impl<T> Default for GraphState<T> {
    fn default() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            ports: SlotMap::with_key(),
            connections: SlotMap::with_key(),
            uuid_index: HashMap::new(),
        }
    }
}

impl<T: NodeData> GraphState<T> {
    /// Inserts a node and updates the UUID index.
    pub fn insert_node(&mut self, mut node: Node<T>) -> NodeId {
        let id = self.nodes.insert_with_key(|key| {
            node.id = key;
            node
        });
        let uuid = self.nodes[id].uuid;
        self.uuid_index.insert(uuid, id);
        id
    }

    /// Removes a node, its ports and the UUID index entry.
    ///
    /// Connections are not touched; callers are expected to detach them first.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node<T>> {
        let node = self.nodes.remove(id)?;
        self.uuid_index.remove(&node.uuid);
        for port in node.inputs.iter().chain(node.outputs.iter()) {
            self.ports.remove(*port);
        }
        Some(node)
    }

    /// Looks a node up by its stable UUID.
    pub fn node_by_uuid(&self, uuid: &Uuid) -> Option<NodeId> {
        self.uuid_index.get(uuid).copied()
    }

    /// Adds a port to an existing node. Returns `None` if the node is gone.
    pub fn add_port(
        &mut self,
        node: NodeId,
        name: impl Into<String>,
        direction: PortDirection,
        accepted_types: Vec<String>,
        produced_type: Option<String>,
    ) -> Option<PortId> {
        if !self.nodes.contains_key(node) {
            return None;
        }
        let name = name.into();
        let id = self.ports.insert_with_key(|key| Port {
            id: key,
            node,
            name,
            direction,
            accepted_types,
            produced_type,
            exclusive: false,
        });
        let owner = &mut self.nodes[node];
        match direction {
            PortDirection::Input => owner.inputs.push(id),
            PortDirection::Output => owner.outputs.push(id),
        }
        Some(id)
    }

    /// Finds a port on `node` by name, searching inputs then outputs.
    pub fn find_port(&self, node: NodeId, name: &str) -> Option<PortId> {
        let node = self.nodes.get(node)?;
        node.inputs
            .iter()
            .chain(node.outputs.iter())
            .copied()
            .find(|id| self.ports.get(*id).is_some_and(|p| p.name == name))
    }

    /// Connections arriving at an input port.
    pub fn incoming(&self, port: PortId) -> Vec<ConnectionId> {
        self.connections
            .iter()
            .filter(|(_, c)| c.to == port)
            .map(|(id, _)| id)
            .collect()
    }

    /// Connections leaving an output port.
    pub fn outgoing(&self, port: PortId) -> Vec<ConnectionId> {
        self.connections
            .iter()
            .filter(|(_, c)| c.from == port)
            .map(|(id, _)| id)
            .collect()
    }

    /// Every connection touching any port of `node`.
    pub fn connections_of(&self, node: NodeId) -> Vec<ConnectionId> {
        self.connections
            .iter()
            .filter(|(_, c)| {
                self.ports.get(c.from).is_some_and(|p| p.node == node)
                    || self.ports.get(c.to).is_some_and(|p| p.node == node)
            })
            .map(|(id, _)| id)
            .collect()
    }
}
