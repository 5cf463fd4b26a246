//! # TypeFlux Core Library
//!
//! Connection-driven type negotiation for conditional-merge nodes, the
//! `IfElse` node built on it, and the supporting node kinds that plug into
//! a [`flow_graph::FlowGraph`].
//!

pub mod compat;
pub mod condition;
pub mod config;
pub mod error;
pub mod negotiation;
pub mod nodes;
pub mod types;

pub use compat::CompatibilityTable;
pub use config::TypeFluxConfig;
pub use error::EvaluationError;
pub use negotiation::{Mode, NegotiationState, PortRole, PortTypes, TypeNegotiator};
pub use types::TypeTag;
