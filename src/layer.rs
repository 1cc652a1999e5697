use bitflags::bitflags;

use crate::{Image, Object, Properties};

bitflags! {
    /// Per-placement flip flags carried in the top three bits of a raw gid.
    #[derive(Copy, Clone, Eq, PartialEq, Default, Hash, Debug)]
    pub struct FlipFlags: u32 {
        const HORIZONTAL = 0x8000_0000;
        const VERTICAL   = 0x4000_0000;
        const DIAGONAL   = 0x2000_0000;
    }
}

/// One square of a tile layer.
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct Cell {
    /// Global tile id with the flip bits already cleared. 0 means empty.
    pub gid: u32,
    pub flags: FlipFlags,
}

impl Cell {
    /// Splits a raw 32-bit gid into the masked id and its flip flags.
    pub fn from_raw_gid(raw: u32) -> Self {
        let (gid, flags) = crate::data::decode_gid(raw);
        Self { gid, flags }
    }

    /// Reconstructs the raw 32-bit value the cell was decoded from.
    pub fn raw_gid(&self) -> u32 {
        self.gid | self.flags.bits()
    }

    pub fn is_empty(&self) -> bool {
        self.gid == 0
    }

    pub fn flipped_horizontally(&self) -> bool {
        self.flags.contains(FlipFlags::HORIZONTAL)
    }

    pub fn flipped_vertically(&self) -> bool {
        self.flags.contains(FlipFlags::VERTICAL)
    }

    pub fn flipped_diagonally(&self) -> bool {
        self.flags.contains(FlipFlags::DIAGONAL)
    }
}

/// One visual plane of a map.
#[derive(Clone, Debug)]
pub struct Layer {
    pub name: String,
    pub opacity: f64,
    pub visible: bool,
    pub properties: Properties,
    pub kind: LayerKind,
}

#[derive(Clone, Debug)]
pub enum LayerKind {
    Tile(TileLayer),
    Object(ObjectLayer),
    Image(ImageLayer),
}

/// A grid of cells, row-major, width*height of the owning map.
#[derive(Clone, Default, Debug)]
pub struct TileLayer {
    pub cells: Vec<Cell>,
}

/// Draw order of an object layer.
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub enum DrawOrder {
    #[default]
    TopDown,
    Index,
}

#[derive(Clone, Default, Debug)]
pub struct ObjectLayer {
    /// Display color for the layer's objects.
    pub color: Option<String>,
    pub draw_order: DrawOrder,
    pub objects: Vec<Object>,
}

#[derive(Clone, Default, Debug)]
pub struct ImageLayer {
    pub image: Option<Image>,
}
