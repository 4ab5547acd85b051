//! DOT format utilities for graph rendering.

use std::fmt::Write;

/// Escape special characters for quoted DOT strings.
pub fn escape_label(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Escape text placed inside an HTML-like label.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Write indentation to output.
pub fn write_indent(output: &mut String, level: usize) {
    for _ in 0..level {
        output.push_str("  ");
    }
}

fn write_attrs(output: &mut String, attrs: &[(&str, &str)]) {
    for (i, (key, value)) in attrs.iter().enumerate() {
        if i > 0 {
            output.push(' ');
        }
        let _ = write!(output, "{}=\"{}\"", key, escape_label(value));
    }
}

/// A DOT graph builder for constructing valid DOT output.
pub struct DotBuilder {
    output: String,
    indent: usize,
}

impl DotBuilder {
    /// Create a new DOT digraph with the given name.
    pub fn new(name: &str) -> Self {
        let mut output = String::with_capacity(4096);
        let _ = writeln!(output, "digraph \"{}\" {{", escape_label(name));
        Self { output, indent: 1 }
    }

    fn defaults(&mut self, target: &str, attrs: &[(&str, &str)]) -> &mut Self {
        write_indent(&mut self.output, self.indent);
        let _ = write!(self.output, "{target} [");
        write_attrs(&mut self.output, attrs);
        self.output.push_str("];\n");
        self
    }

    /// Graph level attributes.
    pub fn graph_style(&mut self, attrs: &[(&str, &str)]) -> &mut Self {
        self.defaults("graph", attrs)
    }

    /// Default node attributes.
    pub fn node_style(&mut self, attrs: &[(&str, &str)]) -> &mut Self {
        self.defaults("node", attrs)
    }

    /// Default edge attributes.
    pub fn edge_style(&mut self, attrs: &[(&str, &str)]) -> &mut Self {
        self.defaults("edge", attrs)
    }

    /// Add a blank line for readability.
    pub fn blank(&mut self) -> &mut Self {
        self.output.push('\n');
        self
    }

    /// Add a node whose label is an HTML-like label. `html` is written as is.
    pub fn html_node(&mut self, id: &str, html: &str, attrs: &[(&str, &str)]) -> &mut Self {
        write_indent(&mut self.output, self.indent);
        let _ = write!(self.output, "\"{}\" [label=<{}>", escape_label(id), html);
        if !attrs.is_empty() {
            self.output.push(' ');
            write_attrs(&mut self.output, attrs);
        }
        self.output.push_str("];\n");
        self
    }

    /// Add an edge leaving a port of the source node.
    pub fn port_edge(&mut self, from: &str, port: &str, to: &str) -> &mut Self {
        write_indent(&mut self.output, self.indent);
        let _ = writeln!(
            self.output,
            "\"{}\":\"{}\" -> \"{}\";",
            escape_label(from),
            escape_label(port),
            escape_label(to)
        );
        self
    }

    /// Finish building and return the DOT string.
    pub fn build(mut self) -> String {
        self.output.push_str("}\n");
        self.output
    }
}
