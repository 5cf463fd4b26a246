use super::state::{ConnectedInputs, Mode, NegotiationState, PortRole};
use crate::compat::CompatibilityTable;
use crate::types::TypeTag;
use serde::{Deserialize, Serialize};

/// What one input port currently advertises.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputTypes {
    /// Kinds an incoming connection may carry.
    pub accepted: Vec<TypeTag>,
    /// The single kind shown for the port: the lock, or `any`.
    pub declared: TypeTag,
}

impl InputTypes {
    fn unconstrained() -> Self {
        Self {
            accepted: vec![TypeTag::any()],
            declared: TypeTag::any(),
        }
    }
}

/// Advertised types of all three ports.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortTypes {
    pub input_a: InputTypes,
    pub input_b: InputTypes,
    pub output: TypeTag,
}

impl Default for PortTypes {
    fn default() -> Self {
        Self {
            input_a: InputTypes::unconstrained(),
            input_b: InputTypes::unconstrained(),
            output: TypeTag::all(),
        }
    }
}

impl PortTypes {
    /// Types for an input role. `None` for the output.
    pub fn input(&self, role: PortRole) -> Option<&InputTypes> {
        match role {
            PortRole::InputA => Some(&self.input_a),
            PortRole::InputB => Some(&self.input_b),
            PortRole::Output => None,
        }
    }
}

/// Decides which types the ports of a two-input conditional merge may carry.
///
/// Driven by the four connection lifecycle operations. Every operation is
/// total: no state/event combination is an error.
#[derive(Clone, Debug)]
pub struct TypeNegotiator {
    table: CompatibilityTable,
    state: NegotiationState,
    ports: PortTypes,
}

impl Default for TypeNegotiator {
    fn default() -> Self {
        Self::new(CompatibilityTable::default())
    }
}

impl TypeNegotiator {
    pub fn new(table: CompatibilityTable) -> Self {
        Self {
            table,
            state: NegotiationState::default(),
            ports: PortTypes::default(),
        }
    }

    pub fn state(&self) -> &NegotiationState {
        &self.state
    }

    pub fn port_types(&self) -> &PortTypes {
        &self.ports
    }

    pub fn compatibility(&self) -> &CompatibilityTable {
        &self.table
    }

    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    /// Whether an incoming connection producing `proposed` fits the current constraints.
    pub fn can_accept(&self, proposed: &TypeTag) -> bool {
        if let Some(locked) = &self.state.locked_type {
            return self.table.compatible(locked, proposed);
        }
        let space = self.state.possibility_space();
        if !space.is_empty() {
            return space.iter().any(|t| t == proposed || t.is_universal());
        }
        true
    }

    /// A producer of `source_type` was attached to `role`.
    ///
    /// The first input to connect sets the lock. A connection that does not
    /// fit is still tracked: the host is expected to have refused it already.
    pub fn on_incoming_connection_added(&mut self, role: PortRole, source_type: TypeTag) {
        let Some(flag) = ConnectedInputs::for_role(role) else {
            tracing::warn!(role = ?role, "Ignoring incoming connection on a non-input role");
            return;
        };

        if !self.can_accept(&source_type) {
            tracing::warn!(
                role = ?role,
                source_type = %source_type,
                locked = ?self.state.locked_type,
                "Tracking incoming connection outside the accepted types"
            );
        }

        if self.state.locked_type.is_none() {
            tracing::debug!(locked = %source_type, "Locking port types");
            self.state.locked_type = Some(source_type);
        }
        self.state.connected_inputs |= flag;
        self.recompute_port_types();
    }

    pub fn on_incoming_connection_removed(&mut self, role: PortRole) {
        let Some(flag) = ConnectedInputs::for_role(role) else {
            tracing::warn!(role = ?role, "Ignoring incoming removal on a non-input role");
            return;
        };

        self.state.connected_inputs.remove(flag);
        if self.state.connected_inputs.is_empty() && self.state.locked_type.take().is_some() {
            tracing::debug!("Last input disconnected, releasing lock");
        }
        self.recompute_port_types();
    }

    /// The output was connected to a consumer accepting `consumer_types`.
    pub fn on_outgoing_connection_added(&mut self, consumer_types: Vec<TypeTag>) {
        tracing::debug!(consumer_types = ?consumer_types, "Output connected");
        self.state.consumer_types = consumer_types;
        self.state.output_connected = true;
        self.recompute_port_types();
    }

    pub fn on_outgoing_connection_removed(&mut self) {
        tracing::debug!("Output disconnected");
        self.state.consumer_types.clear();
        self.state.output_connected = false;
        self.recompute_port_types();
    }

    /// Re-derives the advertised port types from the current state.
    pub fn recompute_port_types(&mut self) -> &PortTypes {
        self.ports = match (&self.state.locked_type, self.state.mode()) {
            (Some(locked), _) => {
                let input = InputTypes {
                    accepted: self.table.group(locked),
                    declared: locked.clone(),
                };
                PortTypes {
                    input_a: input.clone(),
                    input_b: input,
                    output: locked.clone(),
                }
            }
            (None, Mode::Possibility) => {
                let input = InputTypes {
                    accepted: self.state.consumer_types.clone(),
                    declared: TypeTag::any(),
                };
                PortTypes {
                    input_a: input.clone(),
                    input_b: input,
                    output: TypeTag::all(),
                }
            }
            _ => PortTypes::default(),
        };
        &self.ports
    }

    /// Rebuilds the state from the complete set of current connections.
    ///
    /// `inputs` lists connected input roles with their producers' types, in
    /// the order they were connected; `consumer` holds the accepted types of
    /// the output's consumer, if any.
    pub fn reconcile(
        &mut self,
        inputs: impl IntoIterator<Item = (PortRole, TypeTag)>,
        consumer: Option<Vec<TypeTag>>,
    ) -> &PortTypes {
        self.state = NegotiationState::default();
        if let Some(types) = consumer {
            self.state.consumer_types = types;
            self.state.output_connected = true;
        }
        for (role, ty) in inputs {
            let Some(flag) = ConnectedInputs::for_role(role) else {
                continue;
            };
            if self.state.locked_type.is_none() {
                self.state.locked_type = Some(ty);
            }
            self.state.connected_inputs |= flag;
        }
        self.recompute_port_types()
    }
}
