//! Structured script representation.
//!
//! Sections hold statement nodes; the serializer turns them into text.
//! Tests can assert on this form without caring about formatting.

use std::fmt;

/// Script sections, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionKind {
    MapOptions,
    MapStyles,
    Shapes,
    Polys,
    Directions,
    MarkerIcons,
    MarkerShapes,
    Bounds,
    InfoWindow,
    MarkerGroups,
    Markers,
    GroundOverlays,
    KmlLayers,
    FusionTables,
    Binds,
    Layers,
    Center,
    EventListeners,
    CustomControls,
    StreetView,
    Bootstrap,
}

impl SectionKind {
    /// Whether the section belongs inside the scene's initializer function.
    pub fn in_initializer(&self) -> bool {
        !matches!(self, SectionKind::Bootstrap)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SectionKind::MapOptions => "map_options",
            SectionKind::MapStyles => "map_styles",
            SectionKind::Shapes => "shapes",
            SectionKind::Polys => "polys",
            SectionKind::Directions => "directions",
            SectionKind::MarkerIcons => "marker_icons",
            SectionKind::MarkerShapes => "marker_shapes",
            SectionKind::Bounds => "bounds",
            SectionKind::InfoWindow => "info_window",
            SectionKind::MarkerGroups => "marker_groups",
            SectionKind::Markers => "markers",
            SectionKind::GroundOverlays => "ground_overlays",
            SectionKind::KmlLayers => "kml_layers",
            SectionKind::FusionTables => "fusion_tables",
            SectionKind::Binds => "binds",
            SectionKind::Layers => "layers",
            SectionKind::Center => "center",
            SectionKind::EventListeners => "event_listeners",
            SectionKind::CustomControls => "custom_controls",
            SectionKind::StreetView => "street_view",
            SectionKind::Bootstrap => "bootstrap",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The value of an object field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A rendered script expression.
    Expr(String),
    /// A nested object literal.
    Object(Vec<Field>),
}

/// One field of an object literal, or one argument of a call when `key` is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: Option<String>,
    pub value: FieldValue,
}

impl Field {
    pub fn expr(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            value: FieldValue::Expr(value.into()),
        }
    }

    pub fn object(key: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            key: Some(key.into()),
            value: FieldValue::Object(fields),
        }
    }

    /// A positional call argument.
    pub fn arg(value: impl Into<String>) -> Self {
        Self {
            key: None,
            value: FieldValue::Expr(value.into()),
        }
    }

    /// The rendered expression, for non-nested fields.
    pub fn as_expr(&self) -> Option<&str> {
        match &self.value {
            FieldValue::Expr(expr) => Some(expr),
            FieldValue::Object(_) => None,
        }
    }
}

/// A statement-level node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A single statement line.
    Line(String),
    /// A multi-line literal: `head`, one field per line, then `tail`.
    Object {
        head: String,
        fields: Vec<Field>,
        tail: String,
    },
    /// A braced block: `head`, indented body, then `tail`.
    Block {
        head: String,
        body: Vec<Node>,
        tail: String,
    },
    /// An empty separator line.
    Blank,
}

impl Node {
    pub fn line(text: impl Into<String>) -> Self {
        Node::Line(text.into())
    }

    pub fn object(head: impl Into<String>, fields: Vec<Field>, tail: impl Into<String>) -> Self {
        Node::Object {
            head: head.into(),
            fields,
            tail: tail.into(),
        }
    }

    pub fn block(head: impl Into<String>, body: Vec<Node>, tail: impl Into<String>) -> Self {
        Node::Block {
            head: head.into(),
            body,
            tail: tail.into(),
        }
    }

    /// Find a field by key in an object node.
    pub fn field(&self, key: &str) -> Option<&Field> {
        match self {
            Node::Object { fields, .. } => fields.iter().find(|f| f.key.as_deref() == Some(key)),
            _ => None,
        }
    }
}

/// One emitted section.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub kind: SectionKind,
    pub nodes: Vec<Node>,
}

impl Section {
    pub fn new(kind: SectionKind) -> Self {
        Self {
            kind,
            nodes: Vec::new(),
        }
    }

    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All object nodes whose head starts with `prefix`, searching blocks too.
    pub fn objects_with_head<'a>(&'a self, prefix: &'a str) -> Vec<&'a Node> {
        fn walk<'a>(nodes: &'a [Node], prefix: &str, out: &mut Vec<&'a Node>) {
            for node in nodes {
                match node {
                    Node::Object { head, .. } if head.starts_with(prefix) => out.push(node),
                    Node::Block { body, .. } => walk(body, prefix, out),
                    _ => {}
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.nodes, prefix, &mut out);
        out
    }
}

/// The full structured script: a map id plus its non-empty sections in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub map_id: String,
    pub sections: Vec<Section>,
}

impl Script {
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    pub fn kinds(&self) -> Vec<SectionKind> {
        self.sections.iter().map(|s| s.kind).collect()
    }
}
