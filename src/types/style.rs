//! Custom map styles and DOM controls.

use serde::Serialize;

use super::{normalize_variable, Options};

/// A styled map type that can be selected alongside the built-in types.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapStyle {
    /// Label shown in the map type control.
    pub name: String,
    /// Script identifier, derived from the name.
    pub var_name: String,
    /// Style rules, emitted verbatim as a JSON array.
    pub style: serde_json::Value,
}

impl MapStyle {
    pub fn new(name: impl Into<String>, style: serde_json::Value) -> Self {
        let name = name.into();
        let var_name = normalize_variable(&name);
        Self {
            name,
            var_name,
            style,
        }
    }
}

/// A DOM event handler attached to a custom control.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlListener {
    pub event: String,
    pub function: String,
}

/// A custom control: an outer element wrapping an inner element.
///
/// Property keys are dotted paths set on the element, e.g.
/// `style.backgroundColor` or `innerHTML`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomControl {
    pub outer: Options,
    pub inner: Options,
    /// A control position name such as `bottom_left`.
    pub position: String,
    pub listeners: Vec<ControlListener>,
}

impl CustomControl {
    pub fn new(outer: Options, inner: Options, position: impl Into<String>) -> Self {
        Self {
            outer,
            inner,
            position: position.into(),
            listeners: Vec::new(),
        }
    }

    pub fn add_listener(&mut self, event: impl Into<String>, function: impl Into<String>) {
        self.listeners.push(ControlListener {
            event: event.into(),
            function: function.into(),
        });
    }
}
