//! Serializes the structured script into text.
//!
//! Every field is written with a trailing separator; the trailing-comma
//! pass removes the ones that end up before a closing brace or paren.

use super::ir::{Field, FieldValue, Node, Script};
use super::text::{compress, strip_trailing_commas};

/// Render a script to text, then apply compression (optional) and
/// trailing-comma cleanup, in that order.
pub fn serialize(script: &Script, compress_output: bool) -> String {
    let raw = write_script(script);
    let text = if compress_output { compress(&raw) } else { raw };
    strip_trailing_commas(&text)
}

/// Render without the whole-text passes.
pub fn write_script(script: &Script) -> String {
    let id = &script.map_id;
    let mut out = String::new();

    out.push_str(&format!("var {};\n", id));
    out.push_str(&format!("function mapscript_{}() {{\n\n", id));
    out.push_str("this.initialize = function() {\n\n");
    out.push_str("\tvar self = this;\n");
    for section in script.sections.iter().filter(|s| s.kind.in_initializer()) {
        write_nodes(&section.nodes, 1, &mut out);
    }
    out.push_str("\n};\n\n}\n");

    for section in script.sections.iter().filter(|s| !s.kind.in_initializer()) {
        write_nodes(&section.nodes, 0, &mut out);
    }
    out
}

fn indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push('\t');
    }
}

fn write_nodes(nodes: &[Node], depth: usize, out: &mut String) {
    for node in nodes {
        match node {
            Node::Line(text) => {
                indent(depth, out);
                out.push_str(text);
                out.push('\n');
            }
            Node::Object { head, fields, tail } => {
                indent(depth, out);
                out.push_str(head);
                out.push('\n');
                write_fields(fields, depth + 1, out);
                indent(depth, out);
                out.push_str(tail);
                out.push('\n');
            }
            Node::Block { head, body, tail } => {
                indent(depth, out);
                out.push_str(head);
                out.push('\n');
                write_nodes(body, depth + 1, out);
                indent(depth, out);
                out.push_str(tail);
                out.push('\n');
            }
            Node::Blank => out.push('\n'),
        }
    }
}

fn write_fields(fields: &[Field], depth: usize, out: &mut String) {
    for field in fields {
        indent(depth, out);
        if let Some(key) = &field.key {
            out.push_str(key);
            out.push_str(": ");
        }
        match &field.value {
            FieldValue::Expr(expr) => out.push_str(expr),
            FieldValue::Object(nested) => {
                out.push_str("{\n");
                write_fields(nested, depth + 1, out);
                indent(depth, out);
                out.push('}');
            }
        }
        out.push_str(",\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::ir::{Section, SectionKind};
    use pretty_assertions::assert_eq;

    fn script(sections: Vec<Section>) -> Script {
        Script {
            map_id: "map".to_string(),
            sections,
        }
    }

    #[test]
    fn test_object_fields_and_cleanup() {
        let mut section = Section::new(SectionKind::MapOptions);
        section.push(Node::object(
            "this.map_options = {",
            vec![
                Field::expr("zoom", "7"),
                Field::object("scaleControlOptions", vec![]),
            ],
            "};",
        ));
        let text = serialize(&script(vec![section]), false);

        assert_eq!(
            text,
            "var map;\nfunction mapscript_map() {\n\nthis.initialize = function() {\n\n\tvar self = this;\n\tthis.map_options = {\n\t\tzoom: 7,\n\t\tscaleControlOptions: {\n\t\t}\n\t};\n\n};\n\n}\n"
        );
    }

    #[test]
    fn test_bootstrap_outside_initializer() {
        let mut boot = Section::new(SectionKind::Bootstrap);
        boot.push(Node::line("google.maps.event.addDomListener(window, \"load\", initialize_map );"));
        let text = write_script(&script(vec![boot]));
        assert!(text.ends_with("}\ngoogle.maps.event.addDomListener(window, \"load\", initialize_map );\n"));
    }

    #[test]
    fn test_call_arguments() {
        let mut section = Section::new(SectionKind::MarkerIcons);
        section.push(Node::object(
            "this.marker_icons[0] = new google.maps.MarkerImage(",
            vec![Field::arg("\"pin.png\""), Field::arg("new google.maps.Size(20, 32)")],
            ");",
        ));
        let text = serialize(&script(vec![section]), true);
        assert!(text.contains("this.marker_icons[0]=new google.maps.MarkerImage(\"pin.png\",new google.maps.Size(20,32));"));
    }
}
