use crate::error::GraphError;
use crate::events::{ConnectionEvent, ConnectionObserver, NodePorts, PeerPort};
use crate::model::{
    ANY_TYPE, Connection, ConnectionId, GraphState, Node, NodeData, NodeFlags, NodeId, Port,
    PortDirection, PortId, Uuid, types_compatible,
};
use std::collections::HashSet;

/// A graph that validates structural changes and notifies subscribed nodes.
///
/// All mutation goes through one `&mut self` call path, so events are
/// delivered synchronously and in the order the changes are made.
#[derive(Debug)]
pub struct FlowGraph<T> {
    state: GraphState<T>,
    subscribers: HashSet<NodeId>,
}

impl<T> Default for FlowGraph<T> {
    fn default() -> Self {
        Self {
            state: GraphState::default(),
            subscribers: HashSet::new(),
        }
    }
}

impl<T: NodeData + ConnectionObserver> FlowGraph<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the underlying arenas.
    pub fn state(&self) -> &GraphState<T> {
        &self.state
    }

    pub fn node(&self, id: NodeId) -> Option<&Node<T>> {
        self.state.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<T>> {
        self.state.nodes.get_mut(id)
    }

    pub fn port(&self, id: PortId) -> Option<&Port> {
        self.state.ports.get(id)
    }

    pub fn find_port(&self, node: NodeId, name: &str) -> Option<PortId> {
        self.state.find_port(node, name)
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.state.connections.get(id)
    }

    /// Adds a node with no ports.
    pub fn add_node(&mut self, name: impl Into<String>, data: T) -> NodeId {
        let name = name.into();
        tracing::info!(node = %name, kind = %data.node_type(), "Added node");
        self.state.insert_node(Node {
            id: NodeId::default(),
            uuid: Uuid::new_v4(),
            name,
            inputs: Vec::new(),
            outputs: Vec::new(),
            data,
            flags: NodeFlags::default(),
        })
    }

    /// Adds an input port. An empty `accepted` list means the input accepts anything.
    pub fn add_input(
        &mut self,
        node: NodeId,
        name: impl Into<String>,
        accepted: Vec<String>,
    ) -> Result<PortId, GraphError> {
        let accepted = if accepted.is_empty() {
            vec![ANY_TYPE.to_string()]
        } else {
            accepted
        };
        self.state
            .add_port(node, name, PortDirection::Input, accepted, None)
            .ok_or(GraphError::UnknownNode(node))
    }

    pub fn add_output(
        &mut self,
        node: NodeId,
        name: impl Into<String>,
        produced: Option<String>,
    ) -> Result<PortId, GraphError> {
        self.state
            .add_port(node, name, PortDirection::Output, Vec::new(), produced)
            .ok_or(GraphError::UnknownNode(node))
    }

    /// Limits an output to a single outgoing connection.
    ///
    /// Existing connections are kept; the limit applies to later `connect` calls.
    pub fn set_exclusive(&mut self, port: PortId, exclusive: bool) -> Result<(), GraphError> {
        let port = self
            .state
            .ports
            .get_mut(port)
            .ok_or(GraphError::UnknownPort(port))?;
        if port.direction != PortDirection::Output {
            return Err(GraphError::InvalidDirection);
        }
        port.exclusive = exclusive;
        Ok(())
    }

    /// Registers `node` to receive connection events.
    pub fn subscribe(&mut self, node: NodeId) -> Result<(), GraphError> {
        if !self.state.nodes.contains_key(node) {
            return Err(GraphError::UnknownNode(node));
        }
        if self.subscribers.insert(node) {
            tracing::debug!(node = ?node, "Subscribed to connection events");
        }
        Ok(())
    }

    /// Stops delivering events to `node`. Returns whether it was subscribed.
    pub fn unsubscribe(&mut self, node: NodeId) -> bool {
        self.subscribers.remove(&node)
    }

    pub fn is_subscribed(&self, node: NodeId) -> bool {
        self.subscribers.contains(&node)
    }

    /// Checks whether `from -> to` would be accepted by [`FlowGraph::connect`].
    pub fn can_connect(&self, from: PortId, to: PortId) -> Result<(), GraphError> {
        let source = self
            .state
            .ports
            .get(from)
            .ok_or(GraphError::UnknownPort(from))?;
        let target = self
            .state
            .ports
            .get(to)
            .ok_or(GraphError::UnknownPort(to))?;

        if source.direction != PortDirection::Output || target.direction != PortDirection::Input {
            return Err(GraphError::InvalidDirection);
        }
        if source.node == target.node {
            return Err(GraphError::SelfConnection);
        }
        if self.state.connections.values().any(|c| c.to == to) {
            return Err(GraphError::InputAlreadyConnected {
                port: target.name.clone(),
            });
        }
        if source.exclusive && self.state.connections.values().any(|c| c.from == from) {
            return Err(GraphError::OutputAlreadyConnected {
                port: source.name.clone(),
            });
        }

        let produced = source.offered_type();
        if !types_compatible(produced, &target.accepted_types) {
            return Err(GraphError::IncompatibleConnection {
                produced: produced.to_string(),
                accepted: target.accepted_types.clone(),
            });
        }
        Ok(())
    }

    /// Connects an output to an input.
    ///
    /// The target node is notified first (`IncomingAdded`), then the source
    /// node (`OutgoingAdded`) with a snapshot of the target taken after the
    /// target had the chance to republish its types.
    #[tracing::instrument(skip(self))]
    pub fn connect(&mut self, from: PortId, to: PortId) -> Result<ConnectionId, GraphError> {
        if let Err(e) = self.can_connect(from, to) {
            tracing::warn!(error = %e, "Rejected connection");
            return Err(e);
        }

        let id = self.state.connections.insert(Connection { from, to });
        let source = PeerPort::snapshot(&self.state.ports[from]);
        let target = PeerPort::snapshot(&self.state.ports[to]);
        tracing::info!(from = %source.name, to = %target.name, "Connected");

        self.dispatch(
            target.node,
            ConnectionEvent::IncomingAdded {
                port: target.name.clone(),
                source: source.clone(),
            },
        );
        let target = PeerPort::snapshot(&self.state.ports[to]);
        self.dispatch(
            source.node,
            ConnectionEvent::OutgoingAdded {
                port: source.name,
                target,
            },
        );
        Ok(id)
    }

    /// Removes a connection and notifies both endpoints.
    #[tracing::instrument(skip(self))]
    pub fn disconnect(&mut self, id: ConnectionId) -> Result<Connection, GraphError> {
        let conn = self
            .state
            .connections
            .remove(id)
            .ok_or(GraphError::UnknownConnection(id))?;

        let source = self.state.ports.get(conn.from).map(PeerPort::snapshot);
        let target = self.state.ports.get(conn.to).map(PeerPort::snapshot);
        if let (Some(source), Some(target)) = (source, target) {
            tracing::info!(from = %source.name, to = %target.name, "Disconnected");
            self.dispatch(
                target.node,
                ConnectionEvent::IncomingRemoved {
                    port: target.name.clone(),
                    source: source.clone(),
                },
            );
            self.dispatch(
                source.node,
                ConnectionEvent::OutgoingRemoved {
                    port: source.name,
                    target,
                },
            );
        }
        Ok(conn)
    }

    /// Detaches every connection of `id` (firing events for each) and removes the node.
    #[tracing::instrument(skip(self))]
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node<T>, GraphError> {
        let node = self.state.nodes.get(id).ok_or(GraphError::UnknownNode(id))?;
        if node.flags.contains(NodeFlags::LOCKED) {
            return Err(GraphError::NodeLocked(id));
        }

        for conn in self.state.connections_of(id) {
            self.disconnect(conn)?;
        }
        self.subscribers.remove(&id);
        self.state.remove_node(id).ok_or(GraphError::UnknownNode(id))
    }

    fn dispatch(&mut self, node: NodeId, event: ConnectionEvent) {
        if !self.subscribers.contains(&node) {
            return;
        }
        let GraphState { nodes, ports, .. } = &mut self.state;
        let Some(owner) = nodes.get_mut(node) else {
            return;
        };
        let ids = owner
            .inputs
            .iter()
            .chain(owner.outputs.iter())
            .copied()
            .collect();
        let mut view = NodePorts { arena: ports, ids };
        tracing::debug!(node = %owner.name, event = ?event, "Dispatching connection event");
        owner.data.on_connection_event(&event, &mut view);
    }
}

impl<T: NodeData + ConnectionObserver + crate::eval::Process> FlowGraph<T> {
    /// Starts a fresh evaluation run over the current graph.
    pub fn evaluator(&self) -> crate::eval::Evaluator<'_, T> {
        crate::eval::Evaluator::new(&self.state)
    }
}
