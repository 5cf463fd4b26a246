use flow_graph::{FlowGraph, NodeId, PortId};
use serde_json::json;
use typeflux_core::TypeFluxConfig;
use typeflux_core::nodes::if_else::{EVALUATE, OUTPUT, OUTPUT_IF_FALSE, OUTPUT_IF_TRUE};
use typeflux_core::nodes::{
    ConstantNode, DisplayNode, IfElseNode, StandardNode, constant, display, spawn,
};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    println!("=== TypeFlux IfElse Demo ===");

    let config = TypeFluxConfig::from_env()?;
    let mut graph = FlowGraph::new();

    let branch = spawn(&mut graph, "Branch", IfElseNode::from_config(&config))?;
    let yes = spawn(&mut graph, "Yes", ConstantNode::new(json!("took the true branch")))?;
    let no = spawn(&mut graph, "No", ConstantNode::new(json!("took the false branch")))?;
    let cond = spawn(&mut graph, "Condition", ConstantNode::new(json!("no")))?;
    let sink = spawn(&mut graph, "Sink", DisplayNode::new(["str", "int"]))?;

    // Output first: the branch inputs narrow to what the sink accepts.
    graph.connect(port(&graph, branch, OUTPUT)?, port(&graph, sink, display::INPUT)?)?;
    print_ports(&graph, branch);

    graph.connect(port(&graph, yes, constant::VALUE)?, port(&graph, branch, OUTPUT_IF_TRUE)?)?;
    print_ports(&graph, branch);

    graph.connect(port(&graph, no, constant::VALUE)?, port(&graph, branch, OUTPUT_IF_FALSE)?)?;
    graph.connect(port(&graph, cond, constant::VALUE)?, port(&graph, branch, EVALUATE)?)?;

    let mut eval = graph.evaluator();
    let out = eval.run(sink)?;
    println!("Sink received: {:?}", out.get(display::OUTPUT));
    println!("True branch evaluated: {}", eval.was_evaluated(yes));
    println!("False branch evaluated: {}", eval.was_evaluated(no));

    Ok(())
}

fn port(graph: &FlowGraph<StandardNode>, node: NodeId, name: &str) -> anyhow::Result<PortId> {
    graph
        .find_port(node, name)
        .ok_or_else(|| anyhow::anyhow!("missing port {name}"))
}

fn print_ports(graph: &FlowGraph<StandardNode>, node: NodeId) {
    let Some(entry) = graph.node(node) else {
        return;
    };
    for id in entry.inputs.iter().chain(entry.outputs.iter()) {
        if let Some(port) = graph.port(*id) {
            println!(
                "  {:<16} accepts {:?} produces {:?}",
                port.name, port.accepted_types, port.produced_type
            );
        }
    }
    if let Some(n) = entry.data.as_if_else() {
        println!("  mode: {:?}", n.negotiator().mode());
    }
}
