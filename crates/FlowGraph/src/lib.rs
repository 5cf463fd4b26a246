//! # FlowGraph
//!
//! `flow_graph` is a headless connection-graph library.
//! It stores nodes, ports and connections, validates structural edits and
//! tells subscribed nodes about them, leaving the meaning of port types to
//! the host application.
//!
//! ## Core Architecture
//! - **Model (`src/model.rs`)**: Stores the graph state in a flat arena (SlotMap).
//! - **Events (`src/events.rs`)**: Typed connection lifecycle events and the observer trait.
//! - **Graph (`src/graph.rs`)**: Validated mutation and synchronous event dispatch.
//! - **Eval (`src/eval.rs`)**: Lazy, pull-based node evaluation.

pub mod error;
pub mod eval;
pub mod events;
pub mod graph;
pub mod model;

// Re-exports for convenience
pub use error::{GraphError, ProcessError};
pub use eval::{Evaluator, InputSource, NodeOutput, Process};
pub use events::{ConnectionEvent, ConnectionObserver, NodePorts, PeerPort};
pub use graph::FlowGraph;
pub use model::{ALL_TYPE, ANY_TYPE, ConnectionId, NodeId, PortDirection, PortId};
