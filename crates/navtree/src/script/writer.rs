use serde_json::Value;

use crate::model::{NavNode, NavTreeIndex};

/// Appends `var <var> = [...];` laid out the way the generator writes it, one
/// entry per line and two spaces of indentation per level.
pub(crate) fn write_nodes(out: &mut String, var: &str, nodes: &[NavNode]) {
    out.push_str(&format!("var {} =\n[\n", var));
    write_entries(out, nodes, 1);

    if !nodes.is_empty() {
        out.push('\n');
    }

    out.push_str("];\n");
}

fn write_entries(out: &mut String, nodes: &[NavNode], depth: usize) {
    let indent = "  ".repeat(depth);

    for (position, node) in nodes.iter().enumerate() {
        if position > 0 {
            out.push_str(",\n");
        }

        out.push_str(&format!(
            "{}[ {}, {}, ",
            indent,
            quote(&node.label),
            quote(&node.target)
        ));

        match &node.subtree {
            _ if !node.children.is_empty() => {
                out.push_str("[\n");
                write_entries(out, &node.children, depth + 1);
                out.push_str(&format!("\n{}] ]", indent));
            }
            Some(key) => out.push_str(&format!("{} ]", quote(key))),
            None => out.push_str("null ]"),
        }
    }
}

pub(crate) fn write_index(out: &mut String, var: &str, index: &NavTreeIndex) {
    let keys: Vec<_> = index.keys().iter().map(|key| quote(key)).collect();

    out.push_str(&format!("var {} =\n[\n", var));

    if !keys.is_empty() {
        out.push_str(&keys.join(",\n"));
        out.push('\n');
    }

    out.push_str("];\n");
}

pub(crate) fn write_message(out: &mut String, var: &str, message: &str) {
    let escaped = message
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n");

    out.push_str(&format!("var {} = '{}';\n", var, escaped));
}

fn quote(text: &str) -> String {
    Value::String(text.to_owned()).to_string()
}
