//! Flowchart rendering of a workflow definition for dashboards.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::WorkflowDefinition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiagramFormat {
    #[default]
    Mermaid,
    Graphviz,
}

impl DiagramFormat {
    pub fn label(self) -> &'static str {
        match self {
            DiagramFormat::Mermaid => "mermaid",
            DiagramFormat::Graphviz => "graphviz",
        }
    }

    pub fn render(self, definition: &WorkflowDefinition) -> String {
        match self {
            DiagramFormat::Mermaid => render_mermaid(definition),
            DiagramFormat::Graphviz => render_graphviz(definition),
        }
    }
}

impl std::str::FromStr for DiagramFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mermaid" => Ok(DiagramFormat::Mermaid),
            "graphviz" | "dot" => Ok(DiagramFormat::Graphviz),
            other => Err(format!("unknown diagram format '{other}'")),
        }
    }
}

/// User input, then one node per step in declared order, then final output.
pub fn render_mermaid(definition: &WorkflowDefinition) -> String {
    if definition.steps.is_empty() {
        return "graph TD;\n    %% workflow has no steps\n".to_string();
    }

    let mut nodes = vec!["input[\"User Input\"]".to_string()];
    for (idx, step) in definition.steps.iter().enumerate() {
        nodes.push(format!(
            "step{}[\"{}\"]",
            idx + 1,
            sanitize_mermaid(&step.agent)
        ));
    }
    nodes.push("output[\"Final Output\"]".to_string());

    let mut output = String::from("graph TD;\n");
    for pair in nodes.windows(2) {
        let _ = writeln!(output, "    {} --> {};", pair[0], pair[1]);
    }
    output
}

pub fn render_graphviz(definition: &WorkflowDefinition) -> String {
    if definition.steps.is_empty() {
        return "digraph Workflow {\n  // workflow has no steps\n}\n".to_string();
    }

    let mut output = String::from("digraph Workflow {\n  rankdir=TD;\n  node [shape=box];\n");
    let _ = writeln!(output, "  input [label=\"User Input\"];");
    for (idx, step) in definition.steps.iter().enumerate() {
        let _ = writeln!(
            output,
            "  step{} [label=\"{}\"];",
            idx + 1,
            escape_graphviz(&step.agent)
        );
    }
    let _ = writeln!(output, "  output [label=\"Final Output\"];");

    let mut previous = "input".to_string();
    for idx in 1..=definition.steps.len() {
        let current = format!("step{idx}");
        let _ = writeln!(output, "  {previous} -> {current};");
        previous = current;
    }
    let _ = writeln!(output, "  {previous} -> output;");

    output.push_str("}\n");
    output
}

fn sanitize_mermaid(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "#quot;")
        .replace('[', "(")
        .replace(']', ")")
        .replace('\n', "<br/>")
}

fn escape_graphviz(text: &str) -> String {
    text.replace('"', "\\\"").replace('\n', " ")
}
