//! Geolocation bootstrap and marker staggering.
//!
//! When live location is needed the initializer is not called on page load
//! directly. Instead the page asks the browser for a position first and runs
//! the initializer from both the success and the failure callback, so the
//! map renders either way.

use crate::registry::Scene;

use super::ir::{Node, Section, SectionKind};

/// Whether the script needs the geolocation bootstrap.
///
/// True when geolocation is enabled explicitly, the map centers on the
/// user, any marker is placed at the user's location, or the street view
/// panorama follows the user.
pub fn geolocation_required(scene: &Scene) -> bool {
    let settings = scene.settings();
    settings.geolocation.enabled
        || settings.center_on_user
        || scene.markers().any(|(_, marker)| marker.is_geolocated())
        || settings
            .street_view
            .as_ref()
            .is_some_and(|view| view.uses_geolocation())
}

/// The section that starts the map once the page has loaded.
pub fn bootstrap_section(scene: &Scene, geolocation: bool) -> Section {
    let id = scene.map_id();
    let settings = scene.settings();
    let mut section = Section::new(SectionKind::Bootstrap);

    section.push(Node::block(
        format!("function initialize_{}() {{", id),
        vec![
            Node::line(format!("{} = new mapscript_{}();", id, id)),
            Node::line(format!("{}.initialize();", id)),
        ],
        "}",
    ));
    section.push(Node::Blank);

    if !geolocation {
        section.push(Node::line(format!(
            "google.maps.event.addDomListener(window, \"load\", initialize_{} );",
            id
        )));
        return section;
    }

    let geo = &settings.geolocation;
    section.push(Node::line(
        "var geolocation, geolocation_status, geolocation_error, geolocation_lat, geolocation_lng;",
    ));
    section.push(Node::block(
        "function get_geolocation() {",
        vec![Node::line(format!(
            "navigator.geolocation.getCurrentPosition( geolocation_success_init, geolocation_error_init, {{enableHighAccuracy: {}, timeout: {}}} );",
            geo.high_accuracy, geo.timeout
        ))],
        "}",
    ));

    let mut success = vec![
        Node::line("geolocation_status=1;"),
        Node::line("geolocation_lat = position.coords.latitude;"),
        Node::line("geolocation_lng = position.coords.longitude;"),
        Node::line(
            "geolocation = new google.maps.LatLng(position.coords.latitude,position.coords.longitude);",
        ),
    ];
    if let Some(callback) = &geo.success_callback {
        success.push(Node::line(format!("{}();", callback)));
    }
    success.push(Node::line(format!("initialize_{}();", id)));
    section.push(Node::block(
        "function geolocation_success_init( position ) {",
        success,
        "}",
    ));

    let mut failure = vec![
        Node::line("geolocation_status=0;"),
        Node::line("geolocation_error = error.code;"),
    ];
    if let Some(callback) = &geo.fail_callback {
        failure.push(Node::line(format!("{}();", callback)));
    }
    failure.push(Node::line(format!("initialize_{}();", id)));
    section.push(Node::block(
        "function geolocation_error_init( error ) {",
        failure,
        "}",
    ));

    section.push(Node::block(
        "if ( navigator.geolocation ) {",
        vec![Node::line(
            "google.maps.event.addDomListener(window, \"load\", get_geolocation );",
        )],
        "}",
    ));
    section.push(Node::block(
        "else {",
        vec![
            Node::line("geolocation_status = 0;"),
            Node::line("geolocation_error = -1;"),
            Node::line(format!(
                "google.maps.event.addDomListener(window, \"load\", initialize_{} );",
                id
            )),
        ],
        "}",
    ));
    section
}

/// The idle listener that promotes staggered marker placeholders.
///
/// Markers `0..count-1` are scheduled in a loop at `i * interval`; the last
/// one gets its own timeout at `(count - 1) * interval`.
pub fn stagger_listener(count: usize, interval: u32, info_windows: bool) -> Node {
    let last = count.saturating_sub(1);
    let mut promote = vec![
        Node::line("if ( typeof self.markers[i] == 'undefined' ) return;"),
        Node::line("self.markers[i] = new google.maps.Marker(self.markers[i]);"),
    ];
    if info_windows {
        promote.push(Node::block(
            "if ( self.markers[i].content ) {",
            vec![Node::line(
                "google.maps.event.addListener(self.markers[i], 'click', function() { self.open_info_window(self.markers[i]); });",
            )],
            "}",
        ));
    }

    Node::block(
        "google.maps.event.addListenerOnce(this.map, 'idle', function() {",
        vec![
            Node::block(
                "var promote = function(i) {",
                vec![Node::block("return function() {", promote, "};")],
                "};",
            ),
            Node::block(
                format!("for (var i = 0; i < {}; i++) {{", last),
                vec![Node::line(format!("setTimeout(promote(i), i * {});", interval))],
                "}",
            ),
            Node::line(format!(
                "setTimeout(promote({}), {});",
                last,
                last as u64 * u64::from(interval)
            )),
        ],
        "});",
    )
}
