use flow_graph::model::NodeData;
use flow_graph::{
    ConnectionEvent, ConnectionObserver, FlowGraph, GraphError, NodePorts, PortId,
};

/// Node payload that records every event it receives.
#[derive(Debug, Default)]
struct Recorder {
    events: Vec<ConnectionEvent>,
    relabel_to: Option<String>,
}

impl NodeData for Recorder {
    fn node_type(&self) -> String {
        "Recorder".to_string()
    }
}

impl ConnectionObserver for Recorder {
    fn on_connection_event(&mut self, event: &ConnectionEvent, ports: &mut NodePorts<'_>) {
        self.events.push(event.clone());
        if let (Some(ty), ConnectionEvent::IncomingAdded { port, .. }) = (&self.relabel_to, event)
        {
            ports.set_accepted_types(port, vec![ty.clone()]);
        }
    }
}

fn build() -> (FlowGraph<Recorder>, PortId, PortId) {
    let mut graph = FlowGraph::new();
    let a = graph.add_node("Producer", Recorder::default());
    let b = graph.add_node("Consumer", Recorder::default());
    let out = graph.add_output(a, "out", Some("str".into())).unwrap();
    let input = graph
        .add_input(b, "in", vec!["str".into(), "int".into()])
        .unwrap();
    graph.subscribe(a).unwrap();
    graph.subscribe(b).unwrap();
    (graph, out, input)
}

#[test]
fn test_connect_notifies_both_endpoints() {
    let (mut graph, out, input) = build();
    let a = graph.port(out).unwrap().node;
    let b = graph.port(input).unwrap().node;

    graph.connect(out, input).unwrap();

    let consumer = &graph.node(b).unwrap().data.events;
    assert_eq!(consumer.len(), 1);
    match &consumer[0] {
        ConnectionEvent::IncomingAdded { port, source } => {
            assert_eq!(port, "in");
            assert_eq!(source.produced_type.as_deref(), Some("str"));
        }
        other => panic!("Unexpected event: {:?}", other),
    }

    let producer = &graph.node(a).unwrap().data.events;
    assert_eq!(producer.len(), 1);
    match &producer[0] {
        ConnectionEvent::OutgoingAdded { port, target } => {
            assert_eq!(port, "out");
            assert_eq!(target.accepted_types, vec!["str", "int"]);
        }
        other => panic!("Unexpected event: {:?}", other),
    }
}

#[test]
fn test_outgoing_event_sees_republished_target_types() {
    let mut graph = FlowGraph::new();
    let a = graph.add_node("Producer", Recorder::default());
    let b = graph.add_node(
        "Consumer",
        Recorder {
            relabel_to: Some("str".into()),
            ..Default::default()
        },
    );
    let out = graph.add_output(a, "out", Some("str".into())).unwrap();
    let input = graph.add_input(b, "in", vec![]).unwrap();
    graph.subscribe(a).unwrap();
    graph.subscribe(b).unwrap();

    graph.connect(out, input).unwrap();

    match &graph.node(a).unwrap().data.events[0] {
        ConnectionEvent::OutgoingAdded { target, .. } => {
            assert_eq!(target.accepted_types, vec!["str"]);
        }
        other => panic!("Unexpected event: {:?}", other),
    }
}

#[test]
fn test_unsubscribed_nodes_receive_nothing() {
    let (mut graph, out, input) = build();
    let b = graph.port(input).unwrap().node;
    assert!(graph.unsubscribe(b));

    graph.connect(out, input).unwrap();
    assert!(graph.node(b).unwrap().data.events.is_empty());
}

#[test]
fn test_rejects_incompatible_types() {
    let mut graph = FlowGraph::new();
    let a = graph.add_node("Producer", Recorder::default());
    let b = graph.add_node("Consumer", Recorder::default());
    let out = graph.add_output(a, "out", Some("float".into())).unwrap();
    let input = graph.add_input(b, "in", vec!["str".into()]).unwrap();
    graph.subscribe(b).unwrap();

    let err = graph.connect(out, input).unwrap_err();
    assert_eq!(
        err,
        GraphError::IncompatibleConnection {
            produced: "float".into(),
            accepted: vec!["str".into()],
        }
    );
    assert!(graph.node(b).unwrap().data.events.is_empty());
    assert!(graph.state().connections.is_empty());
}

#[test]
fn test_structural_validation() {
    let (mut graph, out, input) = build();
    assert_eq!(
        graph.connect(input, out).unwrap_err(),
        GraphError::InvalidDirection
    );

    graph.connect(out, input).unwrap();
    assert!(matches!(
        graph.connect(out, input).unwrap_err(),
        GraphError::InputAlreadyConnected { .. }
    ));

    let a = graph.port(out).unwrap().node;
    let own_input = graph.add_input(a, "loop", vec![]).unwrap();
    assert_eq!(
        graph.connect(out, own_input).unwrap_err(),
        GraphError::SelfConnection
    );
}

#[test]
fn test_exclusive_output_takes_one_connection() {
    let (mut graph, out, input) = build();
    let a = graph.port(out).unwrap().node;
    let c = graph.add_node("Second", Recorder::default());
    let other = graph.add_input(c, "in", vec!["str".into()]).unwrap();

    graph.set_exclusive(out, true).unwrap();
    let first = graph.connect(out, input).unwrap();
    assert_eq!(
        graph.connect(out, other).unwrap_err(),
        GraphError::OutputAlreadyConnected { port: "out".into() }
    );
    assert_eq!(graph.node(a).unwrap().data.events.len(), 1);

    graph.disconnect(first).unwrap();
    graph.connect(out, other).unwrap();

    assert_eq!(
        graph.set_exclusive(input, true).unwrap_err(),
        GraphError::InvalidDirection
    );
}

#[test]
fn test_disconnect_fires_removal_events_in_order() {
    let (mut graph, out, input) = build();
    let a = graph.port(out).unwrap().node;
    let b = graph.port(input).unwrap().node;

    let id = graph.connect(out, input).unwrap();
    graph.disconnect(id).unwrap();

    assert!(matches!(
        graph.node(b).unwrap().data.events[1],
        ConnectionEvent::IncomingRemoved { .. }
    ));
    assert!(matches!(
        graph.node(a).unwrap().data.events[1],
        ConnectionEvent::OutgoingRemoved { .. }
    ));
    assert_eq!(
        graph.disconnect(id).unwrap_err(),
        GraphError::UnknownConnection(id)
    );
}

#[test]
fn test_remove_node_detaches_connections_first() {
    let (mut graph, out, input) = build();
    let a = graph.port(out).unwrap().node;
    let b = graph.port(input).unwrap().node;
    graph.connect(out, input).unwrap();

    graph.remove_node(a).unwrap();

    assert!(graph.node(a).is_none());
    assert!(graph.port(out).is_none());
    assert!(graph.state().connections.is_empty());
    let events = &graph.node(b).unwrap().data.events;
    assert!(matches!(
        events.last(),
        Some(ConnectionEvent::IncomingRemoved { .. })
    ));
}

#[test]
fn test_locked_node_cannot_be_removed() {
    let (mut graph, out, _) = build();
    let a = graph.port(out).unwrap().node;
    graph.node_mut(a).unwrap().flags |= flow_graph::model::NodeFlags::LOCKED;

    assert_eq!(graph.remove_node(a).unwrap_err(), GraphError::NodeLocked(a));
}
