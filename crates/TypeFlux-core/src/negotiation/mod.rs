//! # Type Negotiation
//!
//! Connection-driven type constraints for a node with two alternative inputs
//! and one output.
//!
//! Priority: a lock set by an input connection wins, then the possibility
//! space reported by the output's consumer, then no constraint at all.
//!
//! ```text
//! DEFAULT     -> POSSIBILITY  output connected
//! DEFAULT     -> LOCKED       input connected
//! POSSIBILITY -> LOCKED       input connected
//! LOCKED      -> POSSIBILITY  last input removed, output still connected
//! LOCKED      -> DEFAULT      last input removed, output not connected
//! POSSIBILITY -> DEFAULT      output removed
//! ```

mod negotiator;
mod state;

pub use negotiator::{InputTypes, PortTypes, TypeNegotiator};
pub use state::{ConnectedInputs, Mode, NegotiationState, PortRole};
