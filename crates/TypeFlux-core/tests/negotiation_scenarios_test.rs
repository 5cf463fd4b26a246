use typeflux_core::{Mode, PortRole, PortTypes, TypeNegotiator, TypeTag};

fn tags(names: &[&str]) -> Vec<TypeTag> {
    names.iter().map(|n| TypeTag::new(*n)).collect()
}

fn assert_inputs_accept(n: &TypeNegotiator, expected: &[&str]) {
    let ports = n.port_types();
    assert_eq!(ports.input_a.accepted, tags(expected));
    assert_eq!(ports.input_b.accepted, tags(expected));
}

#[test]
fn test_fresh_node_defaults() {
    let n = TypeNegotiator::default();
    assert_inputs_accept(&n, &["any"]);
    assert_eq!(n.port_types().output, TypeTag::all());
    assert_eq!(n.port_types(), &PortTypes::default());
}

#[test]
fn test_output_to_single_type_consumer() {
    let mut n = TypeNegotiator::default();
    n.on_outgoing_connection_added(tags(&["string"]));

    assert_eq!(n.mode(), Mode::Possibility);
    assert_inputs_accept(&n, &["string"]);
    assert_eq!(n.port_types().output, TypeTag::all());
    assert!(n.state().output_connected());
}

#[test]
fn test_output_to_multi_type_consumer() {
    let mut n = TypeNegotiator::default();
    n.on_outgoing_connection_added(tags(&["string", "int"]));

    assert_inputs_accept(&n, &["string", "int"]);
    assert_eq!(n.port_types().input_a.declared, TypeTag::any());
    assert_eq!(n.port_types().output, TypeTag::all());
}

#[test]
fn test_input_locks_after_output() {
    let mut n = TypeNegotiator::default();
    n.on_outgoing_connection_added(tags(&["string"]));
    n.on_incoming_connection_added(PortRole::InputA, TypeTag::new("string"));

    assert_eq!(n.mode(), Mode::Locked);
    assert_eq!(n.state().locked_type(), Some(&TypeTag::new("string")));
    assert_inputs_accept(&n, &["string"]);
    assert_eq!(n.port_types().output, TypeTag::new("string"));
}

#[test]
fn test_incompatible_input_is_tracked_without_changing_lock() {
    let mut n = TypeNegotiator::default();
    n.on_outgoing_connection_added(tags(&["string"]));
    n.on_incoming_connection_added(PortRole::InputA, TypeTag::new("string"));
    assert!(!n.can_accept(&TypeTag::new("int")));

    n.on_incoming_connection_added(PortRole::InputB, TypeTag::new("int"));

    assert_eq!(n.state().locked_type(), Some(&TypeTag::new("string")));
    assert!(n.state().is_input_connected(PortRole::InputB));
    assert_eq!(n.port_types().output, TypeTag::new("string"));
}

#[test]
fn test_unlock_restores_possibility_space() {
    let mut n = TypeNegotiator::default();
    n.on_outgoing_connection_added(tags(&["string", "int"]));
    n.on_incoming_connection_added(PortRole::InputA, TypeTag::new("string"));
    assert!(n.state().possibility_space().is_empty());

    n.on_incoming_connection_removed(PortRole::InputA);

    assert_eq!(n.mode(), Mode::Possibility);
    assert!(n.state().locked_type().is_none());
    assert_inputs_accept(&n, &["string", "int"]);
    assert_eq!(n.port_types().output, TypeTag::all());
}

#[test]
fn test_output_removal_returns_to_default() {
    let mut n = TypeNegotiator::default();
    n.on_outgoing_connection_added(tags(&["string"]));
    n.on_outgoing_connection_removed();

    assert_eq!(n.mode(), Mode::Default);
    assert!(n.state().possibility_space().is_empty());
    assert!(!n.state().output_connected());
    assert_eq!(n.port_types(), &PortTypes::default());
}

#[test]
fn test_input_first_lock_survives_multi_type_consumer() {
    let mut n = TypeNegotiator::default();
    n.on_incoming_connection_added(PortRole::InputA, TypeTag::new("string"));
    n.on_outgoing_connection_added(tags(&["string", "int"]));

    assert_eq!(n.mode(), Mode::Locked);
    assert_inputs_accept(&n, &["string"]);
    assert_eq!(n.port_types().output, TypeTag::new("string"));
}

#[test]
fn test_lock_held_until_last_input_leaves() {
    let mut n = TypeNegotiator::default();
    n.on_incoming_connection_added(PortRole::InputA, TypeTag::new("string"));
    n.on_incoming_connection_added(PortRole::InputB, TypeTag::new("string"));

    n.on_incoming_connection_removed(PortRole::InputA);
    assert_eq!(n.state().locked_type(), Some(&TypeTag::new("string")));
    assert_inputs_accept(&n, &["string"]);

    n.on_incoming_connection_removed(PortRole::InputB);
    assert!(n.state().locked_type().is_none());
    assert_eq!(n.port_types(), &PortTypes::default());
}

#[test]
fn test_output_removal_while_locked_keeps_lock() {
    let mut n = TypeNegotiator::default();
    n.on_outgoing_connection_added(tags(&["string", "int"]));
    n.on_incoming_connection_added(PortRole::InputB, TypeTag::new("int"));
    n.on_outgoing_connection_removed();

    assert_eq!(n.mode(), Mode::Locked);
    assert_eq!(n.port_types().output, TypeTag::new("int"));

    // Without a consumer, unlocking goes straight back to default.
    n.on_incoming_connection_removed(PortRole::InputB);
    assert_eq!(n.mode(), Mode::Default);
}

#[test]
fn test_reconnecting_behaves_like_fresh_node() {
    let mut n = TypeNegotiator::default();
    n.on_outgoing_connection_added(tags(&["string"]));
    n.on_incoming_connection_added(PortRole::InputA, TypeTag::new("string"));
    n.on_incoming_connection_removed(PortRole::InputA);
    n.on_outgoing_connection_removed();

    n.on_incoming_connection_added(PortRole::InputB, TypeTag::new("int"));
    n.on_outgoing_connection_added(tags(&["int", "float"]));

    let mut fresh = TypeNegotiator::default();
    fresh.on_incoming_connection_added(PortRole::InputB, TypeTag::new("int"));
    fresh.on_outgoing_connection_added(tags(&["int", "float"]));

    assert_eq!(n.state(), fresh.state());
    assert_eq!(n.port_types(), fresh.port_types());
}

#[test]
fn test_first_input_outside_possibility_space_still_locks() {
    let mut n = TypeNegotiator::default();
    n.on_outgoing_connection_added(tags(&["string"]));
    assert!(!n.can_accept(&TypeTag::new("int")));

    n.on_incoming_connection_added(PortRole::InputA, TypeTag::new("int"));

    // The input is recorded and becomes the lock, so a lock exists exactly
    // when an input is connected.
    assert_eq!(n.mode(), Mode::Locked);
    assert_eq!(n.state().locked_type(), Some(&TypeTag::new("int")));
    assert!(n.state().is_input_connected(PortRole::InputA));
    assert_inputs_accept(&n, &["int"]);
    assert_eq!(n.port_types().output, TypeTag::new("int"));

    n.on_incoming_connection_removed(PortRole::InputA);
    assert_eq!(n.mode(), Mode::Possibility);
    assert_inputs_accept(&n, &["string"]);
}
