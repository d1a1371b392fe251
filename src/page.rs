//! HTML fragments around a generated script.
//!
//! The generator exposes the container markup, the API header tag and the
//! script separately. `compose` is a minimal page used by `build --html`;
//! real sites are expected to place the fragments themselves.

use crate::registry::Scene;
use crate::types::MapSettings;

/// Base URL of the widget API loader.
const API_URL: &str = "https://maps.google.com/maps/api/js";

/// The `<div>` the map renders into.
pub fn container_html(settings: &MapSettings) -> String {
    let mut style = String::new();
    if !settings.width.is_empty() {
        style.push_str(&format!("width:{};", settings.width));
    }
    if !settings.height.is_empty() {
        style.push_str(&format!("height:{};", settings.height));
    }
    format!("<div id=\"{}\" style=\"{}\"></div>", settings.id, escape(&style))
}

/// The API loader tag, preceded by a viewport meta tag on mobile maps.
pub fn header_html(settings: &MapSettings) -> String {
    let mut query = format!("sensor={}&v={}", settings.sensor, settings.api_version);
    if let Some(language) = &settings.language {
        query.push_str(&format!("&language={}", language));
    }
    if let Some(region) = &settings.region {
        query.push_str(&format!("&region={}", region));
    }

    let mut html = String::new();
    if settings.mobile {
        html.push_str("<meta name=\"viewport\" content=\"initial-scale=1.0, user-scalable=no\">\n");
    }
    html.push_str(&format!(
        "<script type=\"text/javascript\" src=\"{}?{}\"></script>\n",
        API_URL,
        escape(&query)
    ));
    html
}

/// Wrap generated script text in a script element.
pub fn script_tag(script: &str) -> String {
    format!("<script type=\"text/javascript\">\n\n{}\n\n</script>\n", script)
}

/// A clickable list of marker titles that open each marker's info window.
///
/// `template` may use `{title}`, `{content}` and `{icon}` placeholders; by
/// default each item is the marker title in a paragraph.
pub fn sidebar_html(scene: &Scene, template: Option<&str>) -> String {
    let id = scene.map_id();
    let mut html = format!("<div id=\"{}_sidebar\">\n\t<ul class=\"sidebar\">\n", id);
    for (index, marker) in scene.markers() {
        let title = marker.title.as_deref().unwrap_or_default();
        let item = match template {
            Some(template) => template
                .replace("{title}", title)
                .replace("{content}", marker.content.as_deref().unwrap_or_default())
                .replace("{icon}", marker.icon.as_ref().map_or("", |icon| icon.url.as_str())),
            None => format!("<p>{}</p>", escape(title)),
        };
        html.push_str(&format!(
            "\t\t<li onclick=\"google.maps.event.trigger({}.markers[{}], 'click')\">\n\t\t\t{}\n\t\t</li>\n",
            id, index, item
        ));
    }
    html.push_str("\t</ul>\n</div>\n");
    html
}

/// A minimal standalone page holding one map.
pub fn compose(scene: &Scene, script: &str) -> String {
    let settings = scene.settings();
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n{}{}</head>\n<body>\n{}\n</body>\n</html>\n",
        escape(&settings.id),
        header_html(settings),
        script_tag(script),
        container_html(settings)
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
