use std::path::Path;

use roxmltree::{Document, Node};

use super::Parser;
use super::Requirement::{Mandatory, Optional};
use crate::{Diagnostic, Image, Terrain, Tile, TileOffset, TileSet, TmxError};

impl Parser<'_> {
    /// Resolves a map `<tileset>` entry, following a `source` reference to
    /// an external TSX document when one is present.
    pub(crate) fn parse_tileset(&mut self, node: Node) -> Result<TileSet, TmxError> {
        let first_gid = self.number_attr(node, "firstgid", Mandatory, 0);
        let source = self.string_attr(node, "source", Optional, "");
        if source.is_empty() {
            self.parse_tileset_element(first_gid, node)
        } else {
            self.parse_tileset_file(first_gid, &source)
        }
    }

    fn parse_tileset_file(&mut self, first_gid: u32, source: &str) -> Result<TileSet, TmxError> {
        let path = self.base_dir.join(source);
        let bytes = self.read(&path)?;
        let text = std::str::from_utf8(&bytes)?;
        let doc = Document::parse(text)?;
        let root = doc.root_element();
        if !root.has_tag_name("tileset") {
            return Err(TmxError::UnexpectedTag {
                tag_name: String::from(root.tag_name().name()),
            });
        }

        // A TSX root carries neither of these; the map entry already did.
        for attribute in ["firstgid", "source"] {
            if root.has_attribute(attribute) {
                self.sink.report(Diagnostic::UnexpectedAttribute {
                    attribute: String::from(attribute),
                });
            }
        }

        // Relative paths inside the TSX resolve against its own directory.
        let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
        self.with_base_dir(parent, |parser| parser.parse_tileset_element(first_gid, root))
    }

    fn parse_tileset_element(&mut self, first_gid: u32, node: Node) -> Result<TileSet, TmxError> {
        let tile_count = if node.has_attribute("tilecount") {
            Some(self.number_attr(node, "tilecount", Optional, 0))
        } else {
            None
        };
        let mut tileset = TileSet {
            first_gid,
            name: self.string_attr(node, "name", Optional, ""),
            tile_width: self.number_attr(node, "tilewidth", Optional, 0),
            tile_height: self.number_attr(node, "tileheight", Optional, 0),
            spacing: self.number_attr(node, "spacing", Optional, 0),
            margin: self.number_attr(node, "margin", Optional, 0),
            tile_count,
            ..TileSet::default()
        };
        tileset.properties = self.parse_properties(node);

        if let Some(offset) = self.one_child(node, "tileoffset") {
            tileset.offset = Some(TileOffset {
                x: self.number_attr(offset, "x", Mandatory, 0),
                y: self.number_attr(offset, "y", Mandatory, 0),
            });
        }
        if let Some(image) = self.one_child(node, "image") {
            tileset.image = Some(self.parse_image(image));
        }
        if let Some(terrains) = self.one_child(node, "terraintypes") {
            for terrain in terrains.children().filter(|child| child.has_tag_name("terrain")) {
                tileset.terrains.push(self.parse_terrain(terrain));
            }
        }
        for tile in node.children().filter(|child| child.has_tag_name("tile")) {
            tileset.tiles.push(self.parse_tile(tile));
        }

        Ok(tileset)
    }

    fn parse_terrain(&mut self, node: Node) -> Terrain {
        Terrain {
            name: self.string_attr(node, "name", Mandatory, ""),
            tile: self.number_attr(node, "tile", Mandatory, 0),
            properties: self.parse_properties(node),
        }
    }

    fn parse_tile(&mut self, node: Node) -> Tile {
        let id = self.number_attr(node, "id", Mandatory, 0);
        let terrain = self.parse_corner_terrain(node);
        let probability = self.number_attr(node, "probability", Optional, 100);
        let properties = self.parse_properties(node);
        let mut image = None;
        if let Some(image_node) = self.one_child(node, "image") {
            image = Some(self.parse_image(image_node));
        }
        Tile { id, terrain, probability, image, properties }
    }

    /// The "terrain" attribute is four comma-separated corner indices, any
    /// of which may be left empty.
    fn parse_corner_terrain(&mut self, node: Node) -> [Option<u32>; 4] {
        let mut corners = [None; 4];
        let Some(attr) = node.attribute("terrain") else {
            return corners;
        };
        for (corner, item) in attr.split(',').take(4).enumerate() {
            if item.is_empty() {
                continue;
            }
            match item.parse() {
                Ok(index) => corners[corner] = Some(index),
                Err(_) => self.sink.report(Diagnostic::InvalidAttribute {
                    element: String::from(node.tag_name().name()),
                    attribute: String::from("terrain"),
                    value: String::from(attr),
                }),
            }
        }
        corners
    }

    pub(crate) fn parse_image(&mut self, node: Node) -> Image {
        let format = self.string_attr(node, "format", Optional, "");
        let source = self.string_attr(node, "source", Mandatory, "");
        let trans = node.attribute("trans").map(String::from);
        let width = if node.has_attribute("width") {
            Some(self.number_attr(node, "width", Optional, 0))
        } else {
            None
        };
        let height = if node.has_attribute("height") {
            Some(self.number_attr(node, "height", Optional, 0))
        } else {
            None
        };
        Image {
            format,
            source: self.base_dir.join(source),
            trans,
            width,
            height,
        }
    }
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use crate::{BufferSink, Diagnostic, Map, MemoryReader, TileOffset, TmxError};

    const INLINE_TILESET: &str = r#"
        <map orientation="orthogonal" width="1" height="1" tilewidth="16" tileheight="16">
          <tileset firstgid="1" name="ground" tilewidth="16" tileheight="16"
                   spacing="1" margin="2" tilecount="8">
            <tileoffset x="4" y="-4"/>
            <image source="img/ground.png" trans="FF00FF" width="64" height="32"/>
            <terraintypes>
              <terrain name="grass" tile="0"/>
              <terrain name="sand" tile="3"/>
            </terraintypes>
            <tile id="0" terrain="0,0,1,1" probability="50"/>
            <tile id="3" terrain="1,,1,"/>
          </tileset>
        </map>"#;

    fn parse(files: &[(&str, &str)], entry: &str) -> (Result<Map, TmxError>, BufferSink) {
        let mut reader = MemoryReader::default();
        for (path, contents) in files {
            reader.insert(*path, *contents);
        }
        let mut sink = BufferSink::default();
        let map = Map::parse_file_with(entry, &reader, &mut sink);
        (map, sink)
    }

    #[test]
    fn inline_tileset() {
        let (map, _) = parse(&[("map.tmx", INLINE_TILESET)], "map.tmx");
        let map = map.unwrap();
        let tileset = &map.tilesets[0];
        assert_eq!(tileset.first_gid, 1);
        assert_eq!(tileset.name, "ground");
        assert_eq!((tileset.spacing, tileset.margin), (1, 2));
        assert_eq!(tileset.tile_count, Some(8));
        assert_eq!(tileset.offset, Some(TileOffset { x: 4, y: -4 }));

        let image = tileset.image.as_ref().unwrap();
        assert_eq!(image.source, Path::new("img/ground.png"));
        assert_eq!(image.trans.as_deref(), Some("FF00FF"));

        assert_eq!(tileset.terrains.len(), 2);
        assert_eq!(tileset.terrains[1].name, "sand");

        let tile = tileset.tile(0).unwrap();
        assert_eq!(tile.terrain, [Some(0), Some(0), Some(1), Some(1)]);
        assert_eq!(tile.probability, 50);

        // Corner indices are positional; empty slots stay unset.
        let tile = tileset.tile(3).unwrap();
        assert_eq!(tile.terrain, [Some(1), None, Some(1), None]);
        assert_eq!(tile.probability, 100);
    }

    #[test]
    fn image_collection_tileset() {
        let (map, _) = parse(
            &[(
                "map.tmx",
                r#"<map orientation="orthogonal" width="1" height="1" tilewidth="16" tileheight="16">
                     <tileset firstgid="1" name="props" tilewidth="16" tileheight="16">
                       <tile id="0"><image source="barrel.png"/></tile>
                       <tile id="1"><image source="crate.png"/></tile>
                     </tileset>
                   </map>"#,
            )],
            "map.tmx",
        );
        let tileset = &map.unwrap().tilesets[0];
        assert!(tileset.image.is_none());
        assert_eq!(
            tileset.tile(1).unwrap().image.as_ref().unwrap().source,
            Path::new("crate.png")
        );
    }

    #[test]
    fn external_tileset_resolves_relative_to_tsx() {
        let (map, sink) = parse(
            &[
                (
                    "assets/maps/level.tmx",
                    r#"<map orientation="orthogonal" width="1" height="1" tilewidth="16" tileheight="16">
                         <tileset firstgid="1" source="tilesets/ground.tsx"/>
                         <tileset firstgid="9" name="inline" tilewidth="16" tileheight="16">
                           <image source="inline.png"/>
                         </tileset>
                       </map>"#,
                ),
                (
                    "assets/maps/tilesets/ground.tsx",
                    r#"<tileset name="ground" tilewidth="16" tileheight="16">
                         <image source="img/ground.png"/>
                         <tile id="0"><image source="img/extra.png"/></tile>
                       </tileset>"#,
                ),
            ],
            "assets/maps/level.tmx",
        );
        let map = map.unwrap();
        assert!(sink.0.is_empty());

        let external = &map.tilesets[0];
        assert_eq!(external.first_gid, 1);
        assert_eq!(external.name, "ground");
        assert_eq!(
            external.image.as_ref().unwrap().source,
            Path::new("assets/maps/tilesets/img/ground.png")
        );
        assert_eq!(
            external.tile(0).unwrap().image.as_ref().unwrap().source,
            Path::new("assets/maps/tilesets/img/extra.png")
        );

        // The base directory is restored for siblings of the reference.
        let inline = &map.tilesets[1];
        assert_eq!(
            inline.image.as_ref().unwrap().source,
            Path::new("assets/maps/inline.png")
        );
    }

    #[test]
    fn tsx_root_gid_and_source_are_ignored_with_a_warning() {
        let (map, sink) = parse(
            &[
                (
                    "map.tmx",
                    r#"<map orientation="orthogonal" width="1" height="1" tilewidth="16" tileheight="16">
                         <tileset firstgid="7" source="ground.tsx"/>
                       </map>"#,
                ),
                (
                    "ground.tsx",
                    r#"<tileset firstgid="99" name="ground" tilewidth="16" tileheight="16"/>"#,
                ),
            ],
            "map.tmx",
        );
        let map = map.unwrap();
        // The map entry's firstgid wins.
        assert_eq!(map.tilesets[0].first_gid, 7);
        assert!(sink.0.contains(&Diagnostic::UnexpectedAttribute { attribute: "firstgid".into() }));
    }

    #[test]
    fn missing_tsx_fails_the_whole_load() {
        let (map, _) = parse(
            &[(
                "map.tmx",
                r#"<map orientation="orthogonal" width="1" height="1" tilewidth="16" tileheight="16">
                     <tileset firstgid="1" source="gone.tsx"/>
                   </map>"#,
            )],
            "map.tmx",
        );
        assert!(matches!(map, Err(TmxError::UnreadableFile { .. })));
    }

    #[test]
    fn unparseable_tsx_fails_the_whole_load() {
        let (map, _) = parse(
            &[
                (
                    "map.tmx",
                    r#"<map orientation="orthogonal" width="1" height="1" tilewidth="16" tileheight="16">
                         <tileset firstgid="1" source="broken.tsx"/>
                       </map>"#,
                ),
                ("broken.tsx", "<tileset name="),
            ],
            "map.tmx",
        );
        assert!(matches!(map, Err(TmxError::Xml(_))));
    }

    #[test]
    fn tilesets_are_ordered_by_first_gid() {
        let (map, _) = parse(
            &[(
                "map.tmx",
                r#"<map orientation="orthogonal" width="1" height="1" tilewidth="16" tileheight="16">
                     <tileset firstgid="50" name="b" tilewidth="16" tileheight="16"/>
                     <tileset firstgid="1" name="a" tilewidth="16" tileheight="16"/>
                   </map>"#,
            )],
            "map.tmx",
        );
        let map = map.unwrap();
        let first_gids: Vec<u32> = map.tilesets.iter().map(|tileset| tileset.first_gid).collect();
        assert_eq!(first_gids, [1, 50]);
        assert_eq!(map.tileset_for_gid(49).unwrap().name, "a");
        assert_eq!(map.tileset_for_gid(50).unwrap().name, "b");
    }
}
