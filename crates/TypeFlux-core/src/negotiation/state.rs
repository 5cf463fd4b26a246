use crate::types::TypeTag;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// The three ports taking part in negotiation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortRole {
    InputA,
    InputB,
    Output,
}

impl PortRole {
    pub fn is_input(self) -> bool {
        matches!(self, PortRole::InputA | PortRole::InputB)
    }
}

bitflags! {
    /// Which of the two alternative inputs currently have an incoming connection.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ConnectedInputs: u8 {
        const INPUT_A = 1 << 0;
        const INPUT_B = 1 << 1;
    }
}

impl ConnectedInputs {
    /// Flag for an input role. `None` for the output.
    pub fn for_role(role: PortRole) -> Option<Self> {
        match role {
            PortRole::InputA => Some(Self::INPUT_A),
            PortRole::InputB => Some(Self::INPUT_B),
            PortRole::Output => None,
        }
    }
}

/// Which rule currently drives the advertised port types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// An input connection pinned every port to one kind.
    Locked,
    /// No lock yet; inputs are limited to what the output's consumer accepts.
    Possibility,
    /// No constraints.
    Default,
}

/// Runtime bookkeeping of a negotiator. Recomputable from the connection graph.
///
/// The consumer's accepted types are remembered while a lock is held so the
/// possibility space comes back once the last input disconnects, but
/// [`NegotiationState::possibility_space`] reports nothing while locked.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NegotiationState {
    pub(crate) locked_type: Option<TypeTag>,
    pub(crate) consumer_types: Vec<TypeTag>,
    pub(crate) connected_inputs: ConnectedInputs,
    pub(crate) output_connected: bool,
}

impl NegotiationState {
    /// The lock wins over the possibility space.
    pub fn mode(&self) -> Mode {
        if self.locked_type.is_some() {
            Mode::Locked
        } else if !self.consumer_types.is_empty() {
            Mode::Possibility
        } else {
            Mode::Default
        }
    }

    pub fn locked_type(&self) -> Option<&TypeTag> {
        self.locked_type.as_ref()
    }

    /// Types acceptable to the output's consumer. Empty while locked.
    pub fn possibility_space(&self) -> &[TypeTag] {
        if self.locked_type.is_some() {
            &[]
        } else {
            &self.consumer_types
        }
    }

    pub fn connected_inputs(&self) -> ConnectedInputs {
        self.connected_inputs
    }

    pub fn output_connected(&self) -> bool {
        self.output_connected
    }

    pub fn is_input_connected(&self, role: PortRole) -> bool {
        ConnectedInputs::for_role(role).is_some_and(|flag| self.connected_inputs.contains(flag))
    }
}
