use crate::{Image, Properties};

/// Width and height of an image in pixels.
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

/// The portion of a tileset image corresponding to one local tile id.
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Drawing offset applied to every tile of a tileset.
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct TileOffset {
    pub x: i32,
    pub y: i32,
}

/// A terrain type declared by a tileset.
#[derive(Clone, Default, Debug)]
pub struct Terrain {
    pub name: String,
    /// Local id of the tile representing this terrain.
    pub tile: u32,
    pub properties: Properties,
}

/// Extra data attached to one tile of a tileset.
#[derive(Clone, Default, Debug)]
pub struct Tile {
    /// Id local to the owning tileset.
    pub id: u32,
    /// Terrain index at each corner: top-left, top-right, bottom-left,
    /// bottom-right.
    pub terrain: [Option<u32>; 4],
    /// Spawn probability in percent.
    pub probability: u32,
    /// Own image, for image-collection tilesets.
    pub image: Option<Image>,
    pub properties: Properties,
}

/// A set of equally sized tiles cut from one shared image, or a collection of
/// individually imaged tiles, owning the gid range that starts at `first_gid`.
#[derive(Clone, Default, Debug)]
pub struct TileSet {
    pub first_gid: u32,
    pub name: String,
    pub tile_width: u32,
    pub tile_height: u32,
    pub spacing: u32,
    pub margin: u32,
    pub tile_count: Option<u32>,
    pub offset: Option<TileOffset>,
    pub image: Option<Image>,
    pub terrains: Vec<Terrain>,
    pub tiles: Vec<Tile>,
    pub properties: Properties,
}

impl TileSet {
    /// Get the tile with the given local id, if the tileset declares one.
    pub fn tile(&self, id: u32) -> Option<&Tile> {
        self.tiles.iter().find(|tile| tile.id == id)
    }

    /// Computes the pixel rectangle of a local id inside the sheet image of
    /// the given size.
    ///
    /// Returns None when the computed row lies below what the image holds,
    /// i.e. the declared grid is larger than the actual image, or when the
    /// declared geometry fits no tile at all (zero tile size, margins wider
    /// than the image).
    pub fn coords(&self, id: u32, size: Size) -> Option<Rect> {
        let cell_width = self.tile_width + self.spacing;
        let cell_height = self.tile_height + self.spacing;
        if cell_width == 0 || cell_height == 0 {
            return None;
        }
        let columns = (size.width.checked_sub(2 * self.margin)? + self.spacing) / cell_width;
        let rows = (size.height.checked_sub(2 * self.margin)? + self.spacing) / cell_height;
        if columns == 0 {
            return None;
        }

        let row = id / columns;
        let col = id % columns;
        if row >= rows {
            return None;
        }

        Some(Rect {
            x: self.margin + col * (self.tile_width + self.spacing),
            y: self.margin + row * (self.tile_height + self.spacing),
            width: self.tile_width,
            height: self.tile_height,
        })
    }
}
