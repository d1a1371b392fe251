//! Map-level settings.
//!
//! These are plain values with no invariants of their own; the emitter
//! interprets them. Every field has a default so a scene file only needs
//! to mention what it changes.

use serde::{Deserialize, Serialize};

use super::{Coordinate, MarkerIcon, Options, Units};

/// Visibility, style and position of one built-in control.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSettings {
    pub enabled: Option<bool>,
    pub style: Option<String>,
    pub position: Option<String>,
}

impl ControlSettings {
    pub fn is_enabled(&self, default: bool) -> bool {
        self.enabled.unwrap_or(default)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Controls {
    /// Shown by default.
    pub navigation: ControlSettings,
    /// Shown by default.
    pub map_type: ControlSettings,
    /// Hidden by default.
    pub scale: ControlSettings,
}

/// Browser geolocation request settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeolocationSettings {
    pub enabled: bool,
    /// Milliseconds the browser may spend locating the user.
    pub timeout: u32,
    pub high_accuracy: bool,
    /// Script function called after a successful fix.
    pub success_callback: Option<String>,
    /// Script function called when geolocation fails.
    pub fail_callback: Option<String>,
    /// Center used when centering on the user fails.
    pub backup: Option<Coordinate>,
}

impl Default for GeolocationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout: 6000,
            high_accuracy: false,
            success_callback: None,
            fail_callback: None,
            backup: None,
        }
    }
}

/// Street view panorama position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StreetViewPosition {
    At(Coordinate),
    Live(LiveLocation),
}

/// The `geolocation` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiveLocation {
    Geolocation,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreetView {
    /// DOM element id for the panorama; the map container when unset.
    pub container: Option<String>,
    pub position: Option<StreetViewPosition>,
    /// Panorama options, merged over the defaults.
    pub options: Options,
}

impl StreetView {
    pub fn uses_geolocation(&self) -> bool {
        matches!(self.position, Some(StreetViewPosition::Live(_)))
    }
}

/// All map-level settings of a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapSettings {
    /// Container element id and script variable name.
    pub id: String,
    pub zoom: u32,
    pub map_type: String,
    /// Fit the viewport to all markers.
    pub auto_encompass: bool,
    pub units: Option<Units>,
    pub width: String,
    pub height: String,
    pub center: Option<Coordinate>,
    pub center_on_user: bool,
    pub controls: Controls,
    /// Selectable map types; entries may name a registered map style.
    pub map_types: Vec<String>,
    pub scrollable: bool,
    pub draggable: bool,
    /// Delay in milliseconds between staggered marker creations.
    pub stagger_markers: Option<u32>,
    pub traffic_layer: bool,
    pub bicycle_layer: bool,
    pub street_view: Option<StreetView>,
    pub info_windows: bool,
    pub compress_output: bool,
    pub geolocation: GeolocationSettings,
    pub mobile: bool,
    pub language: Option<String>,
    pub region: Option<String>,
    pub sensor: bool,
    pub api_version: String,
    pub default_icon: Option<MarkerIcon>,
    pub default_shadow: Option<MarkerIcon>,
    /// Extra options copied into the map options object.
    pub options: Options,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            id: "map".to_string(),
            zoom: 7,
            map_type: "roadmap".to_string(),
            auto_encompass: true,
            units: None,
            width: "500px".to_string(),
            height: "500px".to_string(),
            center: None,
            center_on_user: false,
            controls: Controls::default(),
            map_types: Vec::new(),
            scrollable: true,
            draggable: true,
            stagger_markers: None,
            traffic_layer: false,
            bicycle_layer: false,
            street_view: None,
            info_windows: true,
            compress_output: false,
            geolocation: GeolocationSettings::default(),
            mobile: false,
            language: None,
            region: None,
            sensor: false,
            api_version: "3".to_string(),
            default_icon: None,
            default_shadow: None,
            options: Options::new(),
        }
    }
}

impl MapSettings {
    /// Stagger interval, treating zero as disabled.
    pub fn stagger_interval(&self) -> Option<u32> {
        self.stagger_markers.filter(|ms| *ms > 0)
    }
}
