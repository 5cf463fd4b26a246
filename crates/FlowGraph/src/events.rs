//! # Connection Events
//!
//! Typed notifications fired synchronously by [`crate::FlowGraph`] whenever a
//! connection touching a subscribed node is added or removed.

use crate::model::{NodeId, Port, PortDirection, PortId};
use slotmap::SlotMap;

/// Snapshot of the port on the other end of a connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeerPort {
    pub node: NodeId,
    pub port: PortId,
    pub name: String,
    pub accepted_types: Vec<String>,
    pub produced_type: Option<String>,
}

impl PeerPort {
    pub(crate) fn snapshot(port: &Port) -> Self {
        Self {
            node: port.node,
            port: port.id,
            name: port.name.clone(),
            accepted_types: port.accepted_types.clone(),
            produced_type: port.produced_type.clone(),
        }
    }

    /// The type a producer delivers: its produced type, else its first accepted type.
    pub fn offered_type(&self) -> Option<&str> {
        self.produced_type
            .as_deref()
            .or_else(|| self.accepted_types.first().map(String::as_str))
    }
}

/// A structural change around one node.
///
/// `port` is always the name of the receiving node's own port.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionEvent {
    IncomingAdded { port: String, source: PeerPort },
    IncomingRemoved { port: String, source: PeerPort },
    OutgoingAdded { port: String, target: PeerPort },
    OutgoingRemoved { port: String, target: PeerPort },
}

impl ConnectionEvent {
    /// Name of the local port the event concerns.
    pub fn port(&self) -> &str {
        match self {
            Self::IncomingAdded { port, .. }
            | Self::IncomingRemoved { port, .. }
            | Self::OutgoingAdded { port, .. }
            | Self::OutgoingRemoved { port, .. } => port,
        }
    }
}

/// Mutable view onto the ports of a single node.
///
/// Handed to observers so they can republish the types their ports advertise.
/// Lookups never reach ports belonging to other nodes.
pub struct NodePorts<'a> {
    pub(crate) arena: &'a mut SlotMap<PortId, Port>,
    pub(crate) ids: Vec<PortId>,
}

impl<'a> NodePorts<'a> {
    fn find(&self, name: &str, direction: PortDirection) -> Option<PortId> {
        self.ids.iter().copied().find(|id| {
            self.arena
                .get(*id)
                .is_some_and(|p| p.name == name && p.direction == direction)
        })
    }

    /// Replaces the accepted types of the named input. Returns false if no such input exists.
    pub fn set_accepted_types(&mut self, name: &str, types: Vec<String>) -> bool {
        match self.find(name, PortDirection::Input) {
            Some(id) => {
                self.arena[id].accepted_types = types;
                true
            }
            None => false,
        }
    }

    /// Replaces the produced type of the named output. Returns false if no such output exists.
    pub fn set_produced_type(&mut self, name: &str, ty: Option<String>) -> bool {
        match self.find(name, PortDirection::Output) {
            Some(id) => {
                self.arena[id].produced_type = ty;
                true
            }
            None => false,
        }
    }

    pub fn accepted_types(&self, name: &str) -> Option<&[String]> {
        self.find(name, PortDirection::Input)
            .map(|id| self.arena[id].accepted_types.as_slice())
    }

    pub fn produced_type(&self, name: &str) -> Option<&str> {
        self.find(name, PortDirection::Output)
            .and_then(|id| self.arena[id].produced_type.as_deref())
    }
}

/// Handler for connection lifecycle events.
///
/// Only nodes registered through [`crate::FlowGraph::subscribe`] are notified.
pub trait ConnectionObserver {
    fn on_connection_event(&mut self, event: &ConnectionEvent, ports: &mut NodePorts<'_>);
}
