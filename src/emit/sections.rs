//! Section builders.
//!
//! Each builder turns one part of a scene into statement nodes. Builders
//! only read the scene; marker data comes from a snapshot extracted before
//! building starts.

use serde_json::Value;

use crate::error::{MapError, Result};
use crate::extract::MarkerData;
use crate::options::{encode_string, enum_literal, Normalizer};
use crate::registry::{EntityKind, Scene};
use crate::types::{
    format_number, ControlSettings, Coordinate, Entity, Layer, ListenerTarget, MarkerPosition,
    Options, Poly, Shape, StreetViewPosition,
};

use super::bootstrap::stagger_listener;
use super::ir::{Field, Node, Section, SectionKind};

const GEOLOCATION_GUARD: &str = "if ( navigator.geolocation && typeof geolocation != 'undefined' ) {";

/// Builds every initializer section of one scene.
pub(crate) struct SectionBuilder<'a> {
    scene: &'a Scene,
    data: &'a MarkerData,
    normalizer: Normalizer,
}

impl<'a> SectionBuilder<'a> {
    pub fn new(scene: &'a Scene, data: &'a MarkerData) -> Self {
        Self {
            scene,
            data,
            normalizer: Normalizer::new(),
        }
    }

    /// Build all initializer sections in emission order, empty ones included.
    pub fn build(&self) -> Result<Vec<Section>> {
        Ok(vec![
            self.map_options(),
            self.map_styles()?,
            self.shapes()?,
            self.polys()?,
            self.directions(),
            self.marker_icons(),
            self.marker_shapes(),
            self.bounds(),
            self.info_window(),
            self.marker_groups(),
            self.markers(),
            self.ground_overlays()?,
            self.kml_layers()?,
            self.fusion_tables(),
            self.binds()?,
            self.layers(),
            self.center()?,
            self.event_listeners()?,
            self.custom_controls()?,
            self.street_view(),
        ])
    }

    fn option_fields(&self, options: &Options) -> Vec<Field> {
        self.normalizer
            .normalize(options)
            .into_iter()
            .map(|(key, value)| Field::expr(key, value))
            .collect()
    }

    fn has_markers(&self) -> bool {
        self.scene.count(EntityKind::Marker) > 0
    }

    fn auto_fit(&self) -> bool {
        self.scene.settings().auto_encompass && self.has_markers()
    }

    fn map_type_id(&self, name: &str) -> String {
        match self.scene.map_style(name) {
            Some(style) => format!("'{}'", style.var_name),
            None => enum_literal("MapTypeId", name),
        }
    }

    fn control_fields(&self, control: &ControlSettings, style_namespace: &str) -> Vec<Field> {
        let mut fields = Vec::new();
        if let Some(style) = &control.style {
            fields.push(Field::expr("style", enum_literal(style_namespace, style)));
        }
        if let Some(position) = &control.position {
            fields.push(Field::expr("position", enum_literal("ControlPosition", position)));
        }
        fields
    }

    fn map_options(&self) -> Section {
        let settings = self.scene.settings();
        let controls = &settings.controls;
        let mut section = Section::new(SectionKind::MapOptions);

        let mut fields = vec![Field::expr("zoom", settings.zoom.to_string())];
        if !settings.scrollable {
            fields.push(Field::expr("scrollwheel", "false"));
        }
        if settings.street_view.is_none() {
            fields.push(Field::expr("streetViewControl", "false"));
        }
        if !settings.draggable {
            fields.push(Field::expr("draggable", "false"));
        }
        fields.push(Field::expr(
            "navigationControl",
            controls.navigation.is_enabled(true).to_string(),
        ));
        fields.push(Field::expr(
            "mapTypeControl",
            controls.map_type.is_enabled(true).to_string(),
        ));
        fields.push(Field::expr(
            "scaleControl",
            controls.scale.is_enabled(false).to_string(),
        ));

        fields.push(Field::object(
            "navigationControlOptions",
            self.control_fields(&controls.navigation, "NavigationControlStyle"),
        ));
        let mut map_type_fields = self.control_fields(&controls.map_type, "MapTypeControlStyle");
        if !settings.map_types.is_empty() {
            let ids: Vec<String> = settings.map_types.iter().map(|t| self.map_type_id(t)).collect();
            map_type_fields.push(Field::expr("mapTypeIds", format!("[{}]", ids.join(","))));
        }
        fields.push(Field::object("mapTypeControlOptions", map_type_fields));
        fields.push(Field::object(
            "scaleControlOptions",
            self.control_fields(&controls.scale, "ScaleControlStyle"),
        ));
        fields.push(Field::expr("mapTypeId", self.map_type_id(&settings.map_type)));
        fields.extend(self.option_fields(&settings.options));

        section.push(Node::object("this.map_options = {", fields, "};"));
        section.push(Node::Blank);
        section.push(Node::line(format!(
            "this.map = new google.maps.Map(document.getElementById({}), this.map_options);",
            encode_string(self.scene.map_id())
        )));
        section
    }

    fn map_styles(&self) -> Result<Section> {
        let mut section = Section::new(SectionKind::MapStyles);
        for handle in self.scene.handles(EntityKind::MapStyle) {
            let Entity::MapStyle(style) = handle.entity() else {
                continue;
            };
            let var = &style.var_name;
            if var.is_empty() {
                return Err(MapError::Render {
                    message: format!("map style '{}' has no usable script name", style.name),
                    help: Some("include at least one letter or digit in the style name".to_string()),
                });
            }
            section.push(Node::line(format!("var {}MapStyle = {};", var, style.style)));
            section.push(Node::line(format!(
                "var {}StyleOptions = {{ name: {} }};",
                var,
                encode_string(&style.name)
            )));
            section.push(Node::line(format!(
                "var {v}MapType = new google.maps.StyledMapType({v}MapStyle, {v}StyleOptions);",
                v = var
            )));
            section.push(Node::line(format!(
                "this.map.mapTypes.set('{v}', {v}MapType);",
                v = var
            )));
        }
        Ok(section)
    }

    fn shapes(&self) -> Result<Section> {
        let mut section = Section::new(SectionKind::Shapes);
        if self.scene.count(EntityKind::Shape) == 0 {
            return Ok(section);
        }
        section.push(Node::Blank);
        section.push(Node::line("this.shapes = [];"));

        for handle in self.scene.handles(EntityKind::Shape) {
            let Entity::Shape(shape) = handle.entity() else {
                continue;
            };
            let i = handle.index();
            let (head, mut fields) = match shape {
                Shape::Circle(circle) => {
                    if !circle.radius.is_finite() || circle.radius <= 0.0 {
                        return Err(MapError::Render {
                            message: format!("circle {} has invalid radius {}", i, circle.radius),
                            help: Some("radius is in metres and must be positive".to_string()),
                        });
                    }
                    (
                        format!("this.shapes[{}] = new google.maps.Circle({{", i),
                        vec![
                            Field::expr("center", circle.center.to_js()),
                            Field::expr("radius", format_number(circle.radius)),
                        ],
                    )
                }
                Shape::Rectangle(rect) => (
                    format!("this.shapes[{}] = new google.maps.Rectangle({{", i),
                    vec![Field::expr("bounds", bounds_js(&rect.southwest, &rect.northeast))],
                ),
            };
            fields.extend(self.option_fields(shape.options()));
            fields.push(Field::expr("map", "this.map"));
            section.push(Node::object(head, fields, "});"));
        }
        Ok(section)
    }

    fn polys(&self) -> Result<Section> {
        let mut section = Section::new(SectionKind::Polys);
        if self.scene.count(EntityKind::Poly) == 0 {
            return Ok(section);
        }
        section.push(Node::Blank);
        section.push(Node::line("this.polys = [];"));

        for handle in self.scene.handles(EntityKind::Poly) {
            let Entity::Poly(poly) = handle.entity() else {
                continue;
            };
            let i = handle.index();
            let (class, key) = match poly {
                Poly::Polygon(_) => ("Polygon", "paths"),
                Poly::Polyline(_) => ("Polyline", "path"),
            };
            if poly.points().len() < poly.min_points() {
                return Err(MapError::Render {
                    message: format!(
                        "{} {} has {} point(s), needs at least {}",
                        poly.kind_name(),
                        i,
                        poly.points().len(),
                        poly.min_points()
                    ),
                    help: None,
                });
            }

            let mut fields = self.option_fields(poly.options());
            fields.push(Field::expr(key, points_js(poly.points())));
            fields.push(Field::expr("map", "this.map"));
            section.push(Node::object(
                format!("this.polys[{}] = new google.maps.{}({{", i, class),
                fields,
                "});",
            ));
        }
        Ok(section)
    }

    fn directions(&self) -> Section {
        let mut section = Section::new(SectionKind::Directions);
        let Some(request) = self.scene.directions() else {
            return section;
        };

        let renderer_fields = request
            .renderer_options
            .iter()
            .map(|(key, value)| match (key.as_str(), value) {
                ("panel", Value::String(id)) => Field::expr(
                    "panel",
                    format!("document.getElementById({})", encode_string(id)),
                ),
                _ => Field::expr(key.clone(), self.normalizer.render_field(key, value)),
            })
            .collect();

        let mut request_fields = vec![
            Field::expr("origin", request.origin.to_js()),
            Field::expr("destination", request.destination.to_js()),
        ];
        if !request.waypoints.is_empty() {
            let waypoints: Vec<String> = request
                .waypoints
                .iter()
                .map(|w| format!("{{location: {}, stopover: {}}}", w.location.to_js(), w.stopover))
                .collect();
            request_fields.push(Field::expr("waypoints", format!("[{}]", waypoints.join(","))));
        }
        request_fields.push(Field::expr(
            "travelMode",
            enum_literal("DirectionsTravelMode", request.travel_mode.name()),
        ));
        if let Some(units) = request.units.or(self.scene.settings().units) {
            request_fields.push(Field::expr(
                "unitSystem",
                enum_literal("DirectionsUnitSystem", units.name()),
            ));
        }
        const RESERVED: &[&str] = &["origin", "destination", "waypoints", "travelMode", "unitSystem"];
        for (key, value) in &request.request_options {
            if !RESERVED.contains(&key.as_str()) {
                request_fields.push(Field::expr(key.clone(), self.normalizer.render_field(key, value)));
            }
        }

        section.push(Node::line("this.directions = {};"));
        section.push(Node::object("this.directions.renderer_options = {", renderer_fields, "};"));
        section.push(Node::Blank);
        section.push(Node::line(
            "this.directions.renderer = new google.maps.DirectionsRenderer(this.directions.renderer_options);",
        ));
        section.push(Node::line("this.directions.service = new google.maps.DirectionsService();"));
        section.push(Node::line("this.directions.renderer.setMap(this.map);"));
        section.push(Node::Blank);
        section.push(Node::object("this.directions.request_options = {", request_fields, "};"));
        section.push(Node::block(
            "this.directions.service.route(this.directions.request_options, function(response, status) {",
            vec![
                Node::block(
                    "if (status == google.maps.DirectionsStatus.OK) {",
                    vec![
                        Node::line("self.directions.success = response;"),
                        Node::line("self.directions.renderer.setDirections(response);"),
                    ],
                    "}",
                ),
                Node::block(
                    "else {",
                    vec![Node::line("self.directions.error = status;")],
                    "}",
                ),
            ],
            "});",
        ));
        section.push(Node::Blank);
        section
    }

    fn marker_icons(&self) -> Section {
        let mut section = Section::new(SectionKind::MarkerIcons);
        if self.data.icons.is_empty() {
            return section;
        }
        section.push(Node::Blank);
        section.push(Node::line("this.marker_icons = [];"));
        for (i, icon) in self.data.icons.iter().enumerate() {
            let (ax, ay) = icon.anchor_point();
            section.push(Node::object(
                format!("this.marker_icons[{}] = new google.maps.MarkerImage(", i),
                vec![
                    Field::arg(encode_string(&icon.url)),
                    Field::arg(format!("new google.maps.Size({}, {})", icon.width, icon.height)),
                    Field::arg(format!("new google.maps.Point({}, {})", icon.origin.0, icon.origin.1)),
                    Field::arg(format!("new google.maps.Point({}, {})", ax, ay)),
                ],
                ");",
            ));
        }
        section
    }

    fn marker_shapes(&self) -> Section {
        let mut section = Section::new(SectionKind::MarkerShapes);
        if self.data.shapes.is_empty() {
            return section;
        }
        section.push(Node::Blank);
        section.push(Node::line("this.marker_shapes = [];"));
        for (i, shape) in self.data.shapes.iter().enumerate() {
            let coords: Vec<String> = shape.coords.iter().map(|c| c.to_string()).collect();
            section.push(Node::object(
                format!("this.marker_shapes[{}] = {{", i),
                vec![
                    Field::expr("type", encode_string(shape.kind.name())),
                    Field::expr("coord", format!("[{}]", coords.join(","))),
                ],
                "};",
            ));
        }
        section
    }

    fn bounds(&self) -> Section {
        let mut section = Section::new(SectionKind::Bounds);
        if self.auto_fit() {
            section.push(Node::Blank);
            section.push(Node::line("this.bounds = new google.maps.LatLngBounds();"));
        }
        section
    }

    fn info_window(&self) -> Section {
        let mut section = Section::new(SectionKind::InfoWindow);
        if !self.scene.settings().info_windows {
            return section;
        }
        section.push(Node::line("this.info_window = new google.maps.InfoWindow();"));
        section.push(Node::block(
            "this.open_info_window = function(marker) {",
            vec![
                Node::line("if ( !marker.getVisible() ) return;"),
                Node::line("self.info_window.setContent(marker.content);"),
                Node::line("self.info_window.open(self.map, marker);"),
            ],
            "};",
        ));
        section
    }

    fn marker_groups(&self) -> Section {
        let mut section = Section::new(SectionKind::MarkerGroups);
        if self.data.groups.is_empty() {
            return section;
        }
        section.push(Node::Blank);
        section.push(Node::line("this.marker_groups = {};"));
        section.push(Node::block(
            "this.marker_group_toggle = function(group_name) {",
            vec![
                Node::line("var members = self.marker_groups[group_name].markers;"),
                Node::block(
                    "for (var i = 0; i < members.length; i++) {",
                    vec![
                        Node::line("var marker = self.markers[members[i]];"),
                        Node::line("if ( typeof marker == 'undefined' || !marker.setVisible ) continue;"),
                        Node::line("marker.setVisible( !marker.getVisible() );"),
                    ],
                    "}",
                ),
            ],
            "};",
        ));
        for group in &self.data.groups {
            let members: Vec<String> = group.members.iter().map(|m| m.to_string()).collect();
            section.push(Node::line(format!(
                "this.marker_groups[\"{}\"] = {{name: {}, markers: [{}]}};",
                group.var_name,
                encode_string(&group.name),
                members.join(",")
            )));
        }
        section
    }

    fn markers(&self) -> Section {
        let settings = self.scene.settings();
        let mut section = Section::new(SectionKind::Markers);
        if !self.has_markers() {
            return section;
        }
        let stagger = settings.stagger_interval();
        let auto_fit = self.auto_fit();

        section.push(Node::Blank);
        section.push(Node::line("this.markers = [];"));

        let mut any_geolocated = false;
        let mut last_index = 0;
        for (i, marker) in self.scene.markers() {
            last_index = i;
            let refs = self.data.refs(i);

            let mut fields = vec![
                Field::expr(
                    "position",
                    match &marker.position {
                        MarkerPosition::At(coord) => coord.to_js(),
                        MarkerPosition::Geolocation => "geolocation".to_string(),
                    },
                ),
                Field::expr("map", "this.map"),
            ];
            if let Some(title) = &marker.title {
                fields.push(Field::expr("title", encode_string(title)));
            }
            if let Some(content) = &marker.content {
                fields.push(Field::expr("content", encode_string(content)));
            }
            if let Some(refs) = refs {
                if let Some(icon) = refs.icon {
                    fields.push(Field::expr("icon", format!("this.marker_icons[{}]", icon)));
                }
                if let Some(shadow) = refs.shadow {
                    fields.push(Field::expr("shadow", format!("this.marker_icons[{}]", shadow)));
                }
                if let Some(shape) = refs.shape {
                    fields.push(Field::expr("shape", format!("this.marker_shapes[{}]", shape)));
                }
                if !refs.groups.is_empty() {
                    let groups: Vec<String> = refs.groups.iter().map(|g| g.to_string()).collect();
                    fields.push(Field::expr("groups", format!("[{}]", groups.join(","))));
                }
            }
            fields.extend(self.option_fields(&marker.options));

            let mut nodes = Vec::new();
            if stagger.is_some() {
                nodes.push(Node::object(format!("this.markers[{}] = {{", i), fields, "};"));
            } else {
                nodes.push(Node::object(
                    format!("this.markers[{}] = new google.maps.Marker({{", i),
                    fields,
                    "});",
                ));
                if settings.info_windows && marker.content.is_some() {
                    nodes.push(Node::line(format!(
                        "google.maps.event.addListener(this.markers[{i}], 'click', function() {{ self.open_info_window(self.markers[{i}]); }});",
                        i = i
                    )));
                }
            }
            if auto_fit {
                nodes.push(Node::line(format!("this.bounds.extend(this.markers[{}].position);", i)));
            }

            if marker.is_geolocated() {
                any_geolocated = true;
                section.push(Node::block(GEOLOCATION_GUARD, nodes, "}"));
            } else {
                section.nodes.extend(nodes);
            }
        }

        if auto_fit {
            if any_geolocated {
                section.push(Node::line(
                    "if ( !this.bounds.isEmpty() ) this.map.fitBounds(this.bounds);",
                ));
            } else {
                section.push(Node::line("this.map.fitBounds(this.bounds);"));
            }
        }
        if let Some(interval) = stagger {
            section.push(stagger_listener(last_index + 1, interval, settings.info_windows));
        }
        section
    }

    fn ground_overlays(&self) -> Result<Section> {
        let mut section = Section::new(SectionKind::GroundOverlays);
        if self.scene.count(EntityKind::GroundOverlay) == 0 {
            return Ok(section);
        }
        section.push(Node::line("this.ground_overlays = [];"));
        for handle in self.scene.handles(EntityKind::GroundOverlay) {
            let Entity::Layer(Layer::GroundOverlay(overlay)) = handle.entity() else {
                continue;
            };
            let i = handle.index();
            require_url(&overlay.url, "ground overlay", i)?;
            section.push(Node::line(format!(
                "this.ground_overlays[{}] = new google.maps.GroundOverlay({}, {}, {});",
                i,
                encode_string(&overlay.url),
                bounds_js(&overlay.southwest, &overlay.northeast),
                self.normalizer.render_object(&overlay.options)
            )));
            section.push(Node::line(format!("this.ground_overlays[{}].setMap(this.map);", i)));
            section.push(Node::Blank);
        }
        Ok(section)
    }

    fn kml_layers(&self) -> Result<Section> {
        let mut section = Section::new(SectionKind::KmlLayers);
        if self.scene.count(EntityKind::KmlLayer) == 0 {
            return Ok(section);
        }
        section.push(Node::line("this.kml_layers = [];"));
        for handle in self.scene.handles(EntityKind::KmlLayer) {
            let Entity::Layer(Layer::Kml(layer)) = handle.entity() else {
                continue;
            };
            let i = handle.index();
            require_url(&layer.url, "KML layer", i)?;
            section.push(Node::line(format!(
                "this.kml_layers[{}] = new google.maps.KmlLayer({}, {});",
                i,
                encode_string(&layer.url),
                self.normalizer.render_object(&layer.options)
            )));
            section.push(Node::line(format!("this.kml_layers[{}].setMap(this.map);", i)));
            section.push(Node::Blank);
        }
        Ok(section)
    }

    fn fusion_tables(&self) -> Section {
        let mut section = Section::new(SectionKind::FusionTables);
        if self.scene.count(EntityKind::FusionTable) == 0 {
            return section;
        }
        section.push(Node::line("this.fusion_tables = [];"));
        for handle in self.scene.handles(EntityKind::FusionTable) {
            let Entity::Layer(Layer::FusionTable(table)) = handle.entity() else {
                continue;
            };
            let i = handle.index();
            let fields = table
                .options
                .iter()
                .map(|(key, value)| match (key.as_str(), value) {
                    ("query", Value::String(query)) => {
                        Field::expr(encode_string(key), encode_string(&query.replace('"', "'")))
                    }
                    _ => Field::expr(encode_string(key), self.normalizer.render_field(key, value)),
                })
                .collect();
            section.push(Node::object(
                format!(
                    "this.fusion_tables[{}] = new google.maps.FusionTablesLayer({}, {{",
                    i,
                    self.normalizer.render_value(&table.table_id)
                ),
                fields,
                "});",
            ));
            section.push(Node::line(format!("this.fusion_tables[{}].setMap(this.map);", i)));
            section.push(Node::Blank);
        }
        section
    }

    fn binds(&self) -> Result<Section> {
        let mut section = Section::new(SectionKind::Binds);
        for handle in self.scene.handles(EntityKind::Bind) {
            let Entity::Bind(bind) = handle.entity() else {
                continue;
            };
            require_identifier(&bind.bindee_property, "bind property")?;
            require_identifier(&bind.binder_property, "bind property")?;
            section.push(Node::line(format!(
                "{}.bindTo('{}', {}, '{}');",
                self.scene.js_var(bind.bindee)?,
                bind.bindee_property,
                self.scene.js_var(bind.binder)?,
                bind.binder_property
            )));
        }
        Ok(section)
    }

    fn layers(&self) -> Section {
        let settings = self.scene.settings();
        let mut section = Section::new(SectionKind::Layers);
        if settings.traffic_layer {
            section.push(Node::line("this.traffic_layer = new google.maps.TrafficLayer();"));
            section.push(Node::line("this.traffic_layer.setMap(this.map);"));
            section.push(Node::Blank);
        }
        if settings.bicycle_layer {
            section.push(Node::line("this.bicycle_layer = new google.maps.BicyclingLayer();"));
            section.push(Node::line("this.bicycle_layer.setMap(this.map);"));
            section.push(Node::Blank);
        }
        section
    }

    fn center(&self) -> Result<Section> {
        let settings = self.scene.settings();
        let mut section = Section::new(SectionKind::Center);

        if settings.center_on_user {
            let fallback = settings.geolocation.backup.or(settings.center);
            section.push(Node::block(
                "if ( typeof geolocation != 'undefined' ) {",
                vec![Node::line("this.map.setCenter( geolocation );")],
                "}",
            ));
            if let Some(fallback) = fallback {
                section.push(Node::block(
                    "else {",
                    vec![Node::line(format!("this.map.setCenter( {} );", fallback.to_js()))],
                    "}",
                ));
            }
            section.push(Node::Blank);
        } else if let Some(center) = settings.center {
            section.push(Node::line(format!("this.map.setCenter( {} );", center.to_js())));
        } else if !super::has_viewport(self.scene) {
            return Err(MapError::Render {
                message: format!("map '{}' has nothing to center on", self.scene.map_id()),
                help: Some(
                    "set `center`, enable `center_on_user`, or add markers with `auto_encompass`"
                        .to_string(),
                ),
            });
        }
        Ok(section)
    }

    fn event_listeners(&self) -> Result<Section> {
        let mut section = Section::new(SectionKind::EventListeners);
        if self.scene.count(EntityKind::EventListener) == 0 {
            return Ok(section);
        }
        section.push(Node::line("this.event_listeners = [];"));
        for handle in self.scene.handles(EntityKind::EventListener) {
            let Entity::EventListener(listener) = handle.entity() else {
                continue;
            };
            require_identifier(&listener.event, "event name")?;
            let target = match &listener.target {
                ListenerTarget::Map => "this.map".to_string(),
                ListenerTarget::Element(id) => {
                    format!("document.getElementById({})", encode_string(id))
                }
                ListenerTarget::Object(reference) => self.scene.js_var(*reference)?,
            };
            section.push(Node::line(format!(
                "this.event_listeners[{}] = google.maps.event.add{}Listener{}({}, '{}', {});",
                handle.index(),
                if listener.is_dom() { "Dom" } else { "" },
                if listener.once { "Once" } else { "" },
                target,
                listener.event,
                listener.function
            )));
        }
        Ok(section)
    }

    fn custom_controls(&self) -> Result<Section> {
        let mut section = Section::new(SectionKind::CustomControls);
        if self.scene.count(EntityKind::Control) == 0 {
            return Ok(section);
        }
        section.push(Node::line("this.custom_controls = [];"));
        for handle in self.scene.handles(EntityKind::Control) {
            let Entity::Control(control) = handle.entity() else {
                continue;
            };
            let i = handle.index();
            let outer = format!("this.custom_controls[{}]", i);
            let inner = format!("custom_control_{}_inner", i);

            section.push(Node::line(format!("{} = document.createElement('DIV');", outer)));
            for (key, value) in &control.outer {
                require_property_path(key)?;
                section.push(Node::line(format!(
                    "{}.{} = {};",
                    outer,
                    key,
                    self.normalizer.render_value(value)
                )));
            }
            section.push(Node::line(format!("var {} = document.createElement('DIV');", inner)));
            for (key, value) in &control.inner {
                require_property_path(key)?;
                section.push(Node::line(format!(
                    "{}.{} = {};",
                    inner,
                    key,
                    self.normalizer.render_value(value)
                )));
            }
            section.push(Node::line(format!("{}.appendChild({});", outer, inner)));
            for listener in &control.listeners {
                require_identifier(&listener.event, "event name")?;
                section.push(Node::line(format!(
                    "google.maps.event.addDomListener({}, '{}', {});",
                    outer, listener.event, listener.function
                )));
            }
            section.push(Node::line(format!(
                "this.map.controls[{}].push({});",
                enum_literal("ControlPosition", &control.position),
                outer
            )));
        }
        Ok(section)
    }

    fn street_view(&self) -> Section {
        let mut section = Section::new(SectionKind::StreetView);
        let Some(view) = &self.scene.settings().street_view else {
            return section;
        };

        let mut fields = Vec::new();
        match &view.position {
            Some(StreetViewPosition::At(coord)) => fields.push(Field::expr("position", coord.to_js())),
            Some(StreetViewPosition::Live(_)) => fields.push(Field::expr("position", "geolocation")),
            None => {}
        }
        fields.extend(self.option_fields(&view.options));

        let container = view.container.as_deref().unwrap_or(self.scene.map_id());
        section.push(Node::object(
            format!(
                "this.streetview = new google.maps.StreetViewPanorama(document.getElementById({}), {{",
                encode_string(container)
            ),
            fields,
            "});",
        ));
        section.push(Node::line("this.map.setStreetView(this.streetview);"));
        section
    }
}

fn bounds_js(southwest: &Coordinate, northeast: &Coordinate) -> String {
    format!(
        "new google.maps.LatLngBounds({},{})",
        southwest.to_js(),
        northeast.to_js()
    )
}

fn points_js(points: &[Coordinate]) -> String {
    let points: Vec<String> = points.iter().map(Coordinate::to_js).collect();
    format!("[{}]", points.join(","))
}

fn require_url(url: &str, what: &str, index: usize) -> Result<()> {
    if url.trim().is_empty() {
        return Err(MapError::Render {
            message: format!("{} {} has no URL", what, index),
            help: None,
        });
    }
    Ok(())
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn require_identifier(name: &str, what: &str) -> Result<()> {
    if !is_identifier(name) {
        return Err(MapError::Render {
            message: format!("invalid {} '{}'", what, name),
            help: Some("use letters, digits and underscores only".to_string()),
        });
    }
    Ok(())
}

fn require_property_path(path: &str) -> Result<()> {
    if !path.split('.').all(is_identifier) {
        return Err(MapError::Render {
            message: format!("invalid control property '{}'", path),
            help: Some("use dotted property paths such as `style.backgroundColor`".to_string()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::{build, emit, EmitOptions, Script};
    use crate::geocode::PlaceTable;
    use crate::parser::parse_scene;
    use crate::registry::RegistrationPolicy;
    use crate::types::{Bind, EventListener, MapSettings, Marker, MarkerIcon, Polygon};

    const FULL_SCENE: &str = r#"
map:
  id: tour
  center: [32.7157, -117.1611]
  traffic_layer: true
  street_view: {position: [32.71, -117.17]}
  map_types: [roadmap, Dusk]

entities:
  - type: marker_group
    name: Stops
  - type: marker
    id: start
    position: [32.71, -117.17]
    title: Start
    content: "<b>Start</b>"
    icon: {url: pin.png, width: 20, height: 32}
    shadow: {url: shadow.png, width: 40, height: 32}
    shape: {type: poly, coords: [1, 1, 20, 1, 10, 32]}
    groups: [Stops]
  - type: marker
    position: [32.72, -117.16]
    title: Finish
    icon: {url: pin.png, width: 20, height: 32}
    groups: [Stops]
  - type: circle
    id: area
    center: [32.7157, -117.1611]
    radius: 250
  - type: polyline
    path: [[32.71, -117.17], [32.72, -117.16]]
  - type: directions
    origin: [32.71, -117.17]
    destination: [32.72, -117.16]
  - type: ground_overlay
    url: overlay.png
    southwest: [32.70, -117.18]
    northeast: [32.73, -117.15]
  - type: kml_layer
    url: https://example.com/route.kml
  - type: fusion_table
    table_id: 12345
  - type: bind
    binder: start
    binder_property: position
    bindee: area
    bindee_property: center
  - type: event_listener
    object: start
    event: click
    function: "function() {}"
  - type: control
    position: top_right
    inner: {innerHTML: Reset}
    listeners:
      - {event: click, function: "function() { tour.map.setZoom(12); }"}
  - type: map_style
    name: Dusk
    style: []
"#;

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    fn parse(source: &str) -> Scene {
        parse_scene(source, &PlaceTable::new(), RegistrationPolicy::Strict).unwrap()
    }

    fn centered() -> Scene {
        Scene::new(MapSettings {
            center: Some(coord(10.0, 20.0)),
            ..Default::default()
        })
    }

    fn render_message(scene: &mut Scene) -> String {
        match build(scene) {
            Err(MapError::Render { message, .. }) => message,
            other => panic!("expected a render error, got {:?}", other),
        }
    }

    fn section(script: &Script, kind: SectionKind) -> &Section {
        script
            .section(kind)
            .unwrap_or_else(|| panic!("missing section {}", kind))
    }

    #[test]
    fn test_sections_follow_emission_order() {
        let script = build(&mut parse(FULL_SCENE)).unwrap();
        let kinds = script.kinds();

        assert_eq!(kinds.len(), 21, "every section should be present: {:?}", kinds);
        assert!(kinds.windows(2).all(|pair| pair[0] < pair[1]), "out of order: {:?}", kinds);
        assert_eq!(kinds.first(), Some(&SectionKind::MapOptions));
        assert_eq!(kinds.last(), Some(&SectionKind::Bootstrap));
    }

    #[test]
    fn test_empty_sections_are_dropped() {
        let mut scene = centered();
        scene.register(Marker::new(coord(1.0, 2.0)));
        let kinds = build(&mut scene).unwrap().kinds();

        assert!(kinds.contains(&SectionKind::Markers));
        assert!(!kinds.contains(&SectionKind::Shapes));
        assert!(!kinds.contains(&SectionKind::MarkerIcons));
        assert!(kinds.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_marker_fields_reference_shared_data() {
        let script = build(&mut parse(FULL_SCENE)).unwrap();
        let markers = section(&script, SectionKind::Markers).objects_with_head("this.markers[");
        assert_eq!(markers.len(), 2);

        let expr = |node: &Node, key: &str| node.field(key).and_then(Field::as_expr).map(str::to_string);
        assert_eq!(expr(markers[0], "title").as_deref(), Some("\"Start\""));
        assert_eq!(expr(markers[0], "icon").as_deref(), Some("this.marker_icons[0]"));
        assert_eq!(expr(markers[0], "shadow").as_deref(), Some("this.marker_icons[1]"));
        assert_eq!(expr(markers[0], "shape").as_deref(), Some("this.marker_shapes[0]"));
        assert_eq!(expr(markers[1], "icon").as_deref(), Some("this.marker_icons[0]"));
        assert_eq!(expr(markers[1], "shadow"), None);

        let icons = section(&script, SectionKind::MarkerIcons).objects_with_head("this.marker_icons[");
        assert_eq!(icons.len(), 2);
    }

    #[test]
    fn test_circle_radius_must_be_positive() {
        let mut scene = centered();
        scene.register(Shape::circle(coord(1.0, 1.0), 0.0));
        assert!(render_message(&mut scene).contains("invalid radius"));

        let mut scene = centered();
        scene.register(Shape::circle(coord(1.0, 1.0), f64::NAN));
        assert!(render_message(&mut scene).contains("invalid radius"));
    }

    #[test]
    fn test_polygon_needs_three_points() {
        let mut scene = centered();
        scene.register(Poly::Polygon(Polygon::new(vec![coord(0.0, 0.0), coord(1.0, 1.0)])));
        let message = render_message(&mut scene);
        assert!(message.contains("has 2 point(s), needs at least 3"), "{}", message);
    }

    #[test]
    fn test_layers_need_urls() {
        let mut scene = centered();
        scene.register(Layer::kml("  "));
        assert_eq!(render_message(&mut scene), "KML layer 0 has no URL");

        let mut scene = centered();
        scene.register(Layer::ground_overlay("", coord(0.0, 0.0), coord(1.0, 1.0)));
        assert_eq!(render_message(&mut scene), "ground overlay 0 has no URL");
    }

    #[test]
    fn test_event_name_must_be_identifier() {
        let mut scene = centered();
        scene.register(EventListener::new("click'); alert(1", "function() {}"));
        assert!(render_message(&mut scene).starts_with("invalid event name"));
    }

    #[test]
    fn test_bind_property_must_be_identifier() {
        let mut scene = centered();
        let marker = scene.register(Marker::new(coord(1.0, 1.0))).reference();
        let circle = scene.register(Shape::circle(coord(1.0, 1.0), 50.0)).reference();
        scene.register(Bind::new(marker, "position", circle, "center x"));
        assert_eq!(render_message(&mut scene), "invalid bind property 'center x'");
    }

    #[test]
    fn test_nothing_to_center_on() {
        let mut scene = Scene::default();
        assert_eq!(render_message(&mut scene), "map 'map' has nothing to center on");

        // Markers fitted into view are enough
        scene.register(Marker::new(coord(1.0, 1.0)));
        assert!(build(&mut scene).is_ok());
    }

    #[test]
    fn test_geolocated_markers_are_guarded() {
        let mut scene = centered();
        scene.register(Marker::new(coord(1.0, 1.0)));
        scene.register(Marker::geolocated().with_title("You"));
        let script = build(&mut scene).unwrap();
        let markers = section(&script, SectionKind::Markers);

        let guarded: Vec<&Node> = markers
            .nodes
            .iter()
            .filter(|node| matches!(node, Node::Block { head, .. } if head == GEOLOCATION_GUARD))
            .collect();
        assert_eq!(guarded.len(), 1);
        let Node::Block { body, .. } = guarded[0] else {
            unreachable!()
        };
        assert_eq!(
            body[0],
            Node::object(
                "this.markers[1] = new google.maps.Marker({",
                vec![
                    Field::expr("position", "geolocation"),
                    Field::expr("map", "this.map"),
                    Field::expr("title", "\"You\""),
                ],
                "});",
            )
        );
        assert!(body.contains(&Node::line("this.bounds.extend(this.markers[1].position);")));

        assert_eq!(markers.objects_with_head("this.markers[").len(), 2);
        assert_eq!(
            markers.nodes.last(),
            Some(&Node::line("if ( !this.bounds.isEmpty() ) this.map.fitBounds(this.bounds);"))
        );
        assert!(!markers.nodes.contains(&Node::line("this.map.fitBounds(this.bounds);")));
    }

    #[test]
    fn test_fit_bounds_unguarded_without_geolocation() {
        let mut scene = centered();
        scene.register(Marker::new(coord(1.0, 1.0)));
        let script = build(&mut scene).unwrap();
        let markers = section(&script, SectionKind::Markers);

        assert_eq!(markers.nodes.last(), Some(&Node::line("this.map.fitBounds(this.bounds);")));
        assert!(!markers
            .nodes
            .iter()
            .any(|node| matches!(node, Node::Block { head, .. } if head == GEOLOCATION_GUARD)));
    }

    #[test]
    fn test_center_on_user_falls_back_to_backup_then_center() {
        let user_block = Node::block(
            "if ( typeof geolocation != 'undefined' ) {",
            vec![Node::line("this.map.setCenter( geolocation );")],
            "}",
        );
        let fallback = |lat: f64, lng: f64| {
            Node::block(
                "else {",
                vec![Node::line(format!("this.map.setCenter( {} );", coord(lat, lng).to_js()))],
                "}",
            )
        };
        let center_nodes = |settings: MapSettings| {
            let mut scene = Scene::new(settings);
            let script = build(&mut scene).unwrap();
            section(&script, SectionKind::Center).nodes.clone()
        };

        let mut settings = MapSettings {
            center_on_user: true,
            center: Some(coord(10.0, 20.0)),
            ..Default::default()
        };
        settings.geolocation.backup = Some(coord(-5.0, 7.5));
        assert_eq!(
            center_nodes(settings.clone()),
            vec![user_block.clone(), fallback(-5.0, 7.5), Node::Blank]
        );

        settings.geolocation.backup = None;
        assert_eq!(
            center_nodes(settings.clone()),
            vec![user_block.clone(), fallback(10.0, 20.0), Node::Blank]
        );

        settings.center = None;
        assert_eq!(center_nodes(settings), vec![user_block, Node::Blank]);
    }

    #[test]
    fn test_leading_digit_identifiers_are_prefixed() {
        let source = r#"
map:
  id: 2024-tour
  center: [0, 0]
  map_types: [80s]
entities:
  - type: map_style
    name: 80s
    style: []
"#;
        let mut scene = parse(source);
        assert_eq!(scene.map_id(), "_2024tour");

        let script = emit(&mut scene, &EmitOptions::default()).unwrap();
        assert!(script.starts_with("var _2024tour;"));
        assert!(script.contains("var _80sMapStyle = [];"));
        assert!(script.contains("mapTypeIds: ['_80s']"));
    }

    #[test]
    fn test_style_name_without_word_characters() {
        let mut scene = centered();
        scene.register(crate::types::MapStyle::new("!!", serde_json::json!([])));
        assert_eq!(
            render_message(&mut scene),
            "map style '!!' has no usable script name"
        );
    }

    #[test]
    fn test_default_icon_is_shared() {
        let mut scene = Scene::new(MapSettings {
            center: Some(coord(0.0, 0.0)),
            default_icon: Some(MarkerIcon::new("dot.png", 8, 8)),
            ..Default::default()
        });
        scene.register(Marker::new(coord(1.0, 1.0)));
        scene.register(Marker::new(coord(2.0, 2.0)));
        let script = build(&mut scene).unwrap();

        let icons = section(&script, SectionKind::MarkerIcons).objects_with_head("this.marker_icons[");
        assert_eq!(icons.len(), 1);
        let Node::Object { fields, .. } = icons[0] else {
            unreachable!()
        };
        assert_eq!(fields[3].as_expr(), Some("new google.maps.Point(4, 8)"));
    }
}
