use roxmltree::Node;

use super::Parser;
use super::Requirement::{Mandatory, Optional};
use crate::data::{self, Compression, DataFormat};
use crate::{
    Cell, Diagnostic, DrawOrder, ImageLayer, Layer, LayerKind, Map, Object, ObjectKind,
    ObjectLayer, Orientation, Point, RenderOrder, StaggerAxis, StaggerIndex, TileLayer, TmxError,
};

impl Parser<'_> {
    pub(crate) fn parse_map(&mut self, node: Node) -> Result<Map, TmxError> {
        let mut map = Map {
            version: self.string_attr(node, "version", Optional, "1.0"),
            orientation: self.enum_attr(
                node,
                "orientation",
                Mandatory,
                &[
                    ("orthogonal", Orientation::Orthogonal),
                    ("isometric", Orientation::Isometric),
                    ("staggered", Orientation::Staggered),
                    ("hexagonal", Orientation::Hexagonal),
                ],
                Orientation::Unknown,
            ),
            width: self.number_attr(node, "width", Mandatory, 0),
            height: self.number_attr(node, "height", Mandatory, 0),
            tile_width: self.number_attr(node, "tilewidth", Mandatory, 0),
            tile_height: self.number_attr(node, "tileheight", Mandatory, 0),
            background_color: self.string_attr(node, "backgroundcolor", Optional, "#FFFFFF"),
            render_order: self.enum_attr(
                node,
                "renderorder",
                Optional,
                &[
                    ("right-down", RenderOrder::RightDown),
                    ("right-up", RenderOrder::RightUp),
                    ("left-down", RenderOrder::LeftDown),
                    ("left-up", RenderOrder::LeftUp),
                ],
                RenderOrder::RightDown,
            ),
            hex_side_length: self.number_attr(node, "hexsidelength", Optional, 0),
            stagger_axis: self.enum_attr(
                node,
                "staggeraxis",
                Optional,
                &[("x", StaggerAxis::X), ("y", StaggerAxis::Y)],
                StaggerAxis::Y,
            ),
            stagger_index: self.enum_attr(
                node,
                "staggerindex",
                Optional,
                &[("odd", StaggerIndex::Odd), ("even", StaggerIndex::Even)],
                StaggerIndex::Odd,
            ),
            next_object_id: self.number_attr(node, "nextobjectid", Optional, 0),
            ..Map::default()
        };
        map.properties = self.parse_properties(node);

        for child in node.children().filter(|child| child.has_tag_name("tileset")) {
            let tileset = self.parse_tileset(child)?;
            map.tilesets.push(tileset);
        }
        map.tilesets.sort_by_key(|tileset| tileset.first_gid);

        let cell_count = map.width as usize * map.height as usize;
        for child in node.children() {
            match child.tag_name().name() {
                "layer" => {
                    let layer = self.parse_tile_layer(child, cell_count)?;
                    map.layers.push(layer);
                }
                "objectgroup" => {
                    let layer = self.parse_object_layer(child)?;
                    map.layers.push(layer);
                }
                "imagelayer" => {
                    let layer = self.parse_image_layer(child)?;
                    map.layers.push(layer);
                }
                _ => {}
            }
        }

        Ok(map)
    }

    fn parse_tile_layer(&mut self, node: Node, expected_cells: usize) -> Result<Layer, TmxError> {
        let name = self.string_attr(node, "name", Mandatory, "");
        let opacity = self.number_attr(node, "opacity", Optional, 1.0);
        let visible = self.bool_attr(node, "visible", Optional, true);
        let properties = self.parse_properties(node);

        let mut cells = Vec::new();
        if let Some(data) = self.one_child(node, "data") {
            cells = self.parse_data(data)?;
        }
        if cells.len() != expected_cells {
            self.sink.report(Diagnostic::UnexpectedCellCount {
                expected: expected_cells,
                actual: cells.len(),
            });
        }

        Ok(Layer {
            name,
            opacity,
            visible,
            properties,
            kind: LayerKind::Tile(TileLayer { cells }),
        })
    }

    fn parse_data(&mut self, node: Node) -> Result<Vec<Cell>, TmxError> {
        let encoding = node.attribute("encoding");
        let compression = node.attribute("compression");
        self.check_vocabulary(node, "encoding", encoding, &["csv", "base64"]);
        self.check_vocabulary(node, "compression", compression, &["zlib", "gzip"]);

        match DataFormat::detect(encoding, compression) {
            DataFormat::Base64(compression) => {
                let bytes = data::decode_base64(&data_text(node))?;
                let bytes = match compression {
                    Compression::None => bytes,
                    Compression::Zlib | Compression::Gzip => data::inflate(&bytes)?,
                };
                data::cells_from_bytes(&bytes)
            }
            DataFormat::Csv => data::cells_from_csv(&data_text(node)),
            DataFormat::Xml => {
                let mut cells = Vec::new();
                for tile in node.children().filter(|child| child.has_tag_name("tile")) {
                    let raw = self.number_attr(tile, "gid", Mandatory, 0);
                    cells.push(Cell::from_raw_gid(raw));
                }
                Ok(cells)
            }
        }
    }

    fn check_vocabulary(&mut self, node: Node, name: &str, value: Option<&str>, vocabulary: &[&str]) {
        if let Some(value) = value {
            if !value.is_empty() && !vocabulary.contains(&value) {
                self.sink.report(Diagnostic::InvalidAttribute {
                    element: String::from(node.tag_name().name()),
                    attribute: String::from(name),
                    value: String::from(value),
                });
            }
        }
    }

    fn parse_object_layer(&mut self, node: Node) -> Result<Layer, TmxError> {
        let name = self.string_attr(node, "name", Mandatory, "");
        let opacity = self.number_attr(node, "opacity", Optional, 1.0);
        let visible = self.bool_attr(node, "visible", Optional, true);
        let color = node.attribute("color").map(String::from);
        let draw_order = self.enum_attr(
            node,
            "draworder",
            Optional,
            &[("topdown", DrawOrder::TopDown), ("index", DrawOrder::Index)],
            DrawOrder::TopDown,
        );
        let properties = self.parse_properties(node);

        let mut objects = Vec::new();
        for child in node.children().filter(|child| child.has_tag_name("object")) {
            objects.push(self.parse_object(child)?);
        }

        Ok(Layer {
            name,
            opacity,
            visible,
            properties,
            kind: LayerKind::Object(ObjectLayer { color, draw_order, objects }),
        })
    }

    fn parse_image_layer(&mut self, node: Node) -> Result<Layer, TmxError> {
        let name = self.string_attr(node, "name", Mandatory, "");
        let opacity = self.number_attr(node, "opacity", Optional, 1.0);
        let visible = self.bool_attr(node, "visible", Optional, true);
        let properties = self.parse_properties(node);

        let mut image = None;
        if let Some(image_node) = self.one_child(node, "image") {
            image = Some(self.parse_image(image_node));
        }

        Ok(Layer {
            name,
            opacity,
            visible,
            properties,
            kind: LayerKind::Image(ImageLayer { image }),
        })
    }

    fn parse_object(&mut self, node: Node) -> Result<Object, TmxError> {
        let id = self.number_attr(node, "id", Optional, 0);
        let name = self.string_attr(node, "name", Optional, "");
        let object_type = self.string_attr(node, "type", Optional, "");
        let x = self.number_attr(node, "x", Mandatory, 0);
        let y = self.number_attr(node, "y", Mandatory, 0);
        let rotation = self.number_attr(node, "rotation", Optional, 0.0);
        let visible = self.bool_attr(node, "visible", Optional, true);
        let properties = self.parse_properties(node);

        // Kind dispatch order is fixed by the format: polygon, polyline,
        // placed tile, ellipse, rectangle.
        let kind = if let Some(polygon) = self.one_child(node, "polygon") {
            let points = self.string_attr(polygon, "points", Mandatory, "");
            ObjectKind::Polygon { points: parse_points(&points)? }
        } else if let Some(polyline) = self.one_child(node, "polyline") {
            let points = self.string_attr(polyline, "points", Mandatory, "");
            ObjectKind::Polyline { points: parse_points(&points)? }
        } else if node.has_attribute("gid") {
            let raw = self.number_attr(node, "gid", Mandatory, 0);
            let (gid, flags) = data::decode_gid(raw);
            ObjectKind::Tile { gid, flags }
        } else {
            let width = self.number_attr(node, "width", Optional, 0);
            let height = self.number_attr(node, "height", Optional, 0);
            if node.children().any(|child| child.has_tag_name("ellipse")) {
                ObjectKind::Ellipse { width, height }
            } else {
                ObjectKind::Rectangle { width, height }
            }
        };

        Ok(Object {
            id,
            name,
            object_type,
            x,
            y,
            rotation,
            visible,
            properties,
            kind,
        })
    }
}

/// The full text payload of a `<data>` node. Comments split the text into
/// several children, so all of them are joined.
fn data_text(node: Node) -> String {
    node.children()
        .filter(|child| child.is_text())
        .filter_map(|child| child.text())
        .collect()
}

/// Parses a "x1,y1 x2,y2 ..." point list.
fn parse_points(text: &str) -> Result<Vec<Point>, TmxError> {
    let invalid = || TmxError::InvalidPoints { text: String::from(text) };
    let mut points = Vec::new();
    for item in text.split_whitespace() {
        let (x, y) = item.split_once(',').ok_or_else(invalid)?;
        points.push(Point {
            x: x.parse().map_err(|_| invalid())?,
            y: y.parse().map_err(|_| invalid())?,
        });
    }
    Ok(points)
}
