use std::path::PathBuf;

/// A reference to an image file backing a tileset, a tile or an image layer.
#[derive(Clone, Eq, PartialEq, Default, Debug)]
pub struct Image {
    /// Format hint, e.g. "png". Usually derivable from the source path.
    pub format: String,
    /// Source path, already resolved against the directory of the document
    /// that referenced it.
    pub source: PathBuf,
    /// Color to treat as transparent, e.g. "FF00FF".
    pub trans: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}
