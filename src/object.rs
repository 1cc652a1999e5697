use crate::{FlipFlags, Properties};

/// A point of a polyline or polygon, relative to the object origin.
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// A freeform shape placed on an object layer.
#[derive(Clone, Debug)]
pub struct Object {
    pub id: u32,
    pub name: String,
    /// The "type" attribute, free-form author data.
    pub object_type: String,
    pub x: u32,
    pub y: u32,
    /// Rotation in degrees, clockwise.
    pub rotation: f64,
    pub visible: bool,
    pub properties: Properties,
    pub kind: ObjectKind,
}

/// The closed set of object shapes the TMX format defines.
#[derive(Clone, Debug)]
pub enum ObjectKind {
    Rectangle { width: u32, height: u32 },
    Ellipse { width: u32, height: u32 },
    Polyline { points: Vec<Point> },
    Polygon { points: Vec<Point> },
    /// A placed tile. The gid has its flip bits already cleared.
    Tile { gid: u32, flags: FlipFlags },
}

impl Object {
    pub fn is_rectangle(&self) -> bool {
        matches!(self.kind, ObjectKind::Rectangle { .. })
    }

    pub fn is_ellipse(&self) -> bool {
        matches!(self.kind, ObjectKind::Ellipse { .. })
    }

    pub fn is_polyline(&self) -> bool {
        matches!(self.kind, ObjectKind::Polyline { .. })
    }

    pub fn is_polygon(&self) -> bool {
        matches!(self.kind, ObjectKind::Polygon { .. })
    }

    pub fn is_tile(&self) -> bool {
        matches!(self.kind, ObjectKind::Tile { .. })
    }
}
