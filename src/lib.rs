mod data;
mod diagnostic;
mod error;
mod image;
mod layer;
mod map;
mod object;
mod parse;
mod properties;
mod reader;
mod tileset;

pub use data::*;
pub use diagnostic::*;
pub use error::*;
pub use image::*;
pub use layer::*;
pub use map::*;
pub use object::*;
pub use properties::*;
pub use reader::*;
pub use tileset::*;
