//! Event listeners and property bindings.

use serde::Serialize;

use crate::registry::EntityRef;

/// What an event listener is attached to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenerTarget {
    /// The map widget itself.
    Map,
    /// A DOM element, looked up by id.
    Element(String),
    /// Another registered object in the same scene.
    Object(EntityRef),
}

/// A script callback bound to an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventListener {
    pub target: ListenerTarget,
    pub event: String,
    /// Raw script source of the handler function.
    pub function: String,
    /// Detach after the first call.
    pub once: bool,
}

impl EventListener {
    /// Listen on the map.
    pub fn new(event: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            target: ListenerTarget::Map,
            event: event.into(),
            function: function.into(),
            once: false,
        }
    }

    /// Listen on a DOM element.
    pub fn dom(element_id: impl Into<String>, event: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            target: ListenerTarget::Element(element_id.into()),
            ..Self::new(event, function)
        }
    }

    /// Listen on a registered object.
    pub fn on(object: EntityRef, event: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            target: ListenerTarget::Object(object),
            ..Self::new(event, function)
        }
    }

    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }

    pub fn is_dom(&self) -> bool {
        matches!(self.target, ListenerTarget::Element(_))
    }
}

/// Keeps `bindee.bindee_property` in sync with `binder.binder_property`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bind {
    pub binder: EntityRef,
    pub binder_property: String,
    pub bindee: EntityRef,
    pub bindee_property: String,
}

impl Bind {
    pub fn new(
        binder: EntityRef,
        binder_property: impl Into<String>,
        bindee: EntityRef,
        bindee_property: impl Into<String>,
    ) -> Self {
        Self {
            binder,
            binder_property: binder_property.into(),
            bindee,
            bindee_property: bindee_property.into(),
        }
    }
}
