use crate::{Layer, Properties, TileSet};

/// The orientation of the map. Recorded, never computed with.
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub enum Orientation {
    #[default]
    Unknown,
    Orthogonal,
    Isometric,
    Staggered,
    Hexagonal,
}

/// The order in which the tiles of a tile layer are rendered.
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub enum RenderOrder {
    #[default]
    RightDown,
    RightUp,
    LeftDown,
    LeftUp,
}

#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub enum StaggerAxis {
    X,
    #[default]
    Y,
}

#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub enum StaggerIndex {
    #[default]
    Odd,
    Even,
}

/// A fully loaded map: tilesets describe what to draw, layers how to draw it.
///
/// The tree is built in one parse pass and never mutated afterwards.
#[derive(Clone, Default, Debug)]
pub struct Map {
    pub version: String,
    pub orientation: Orientation,
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
    /// Tile width in pixels.
    pub tile_width: u32,
    /// Tile height in pixels.
    pub tile_height: u32,
    pub background_color: String,
    pub render_order: RenderOrder,
    pub hex_side_length: u32,
    pub stagger_axis: StaggerAxis,
    pub stagger_index: StaggerIndex,
    pub next_object_id: u32,
    /// Tilesets in ascending first_gid order.
    pub tilesets: Vec<TileSet>,
    pub layers: Vec<Layer>,
    pub properties: Properties,
}

impl Map {
    /// Get the tileset owning a global id, the one with the largest
    /// first_gid not above it.
    ///
    /// `gid` must have its flip flags already cleared. The empty gid 0 and
    /// ids below the smallest first_gid belong to no tileset and yield None;
    /// no well-formed document produces them here.
    pub fn tileset_for_gid(&self, gid: u32) -> Option<&TileSet> {
        if gid == 0 {
            return None;
        }
        let index = self.tilesets.partition_point(|tileset| tileset.first_gid <= gid);
        if index == 0 {
            return None;
        }
        Some(&self.tilesets[index - 1])
    }
}
