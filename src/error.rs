use std::io;
use std::path::PathBuf;
use std::str::Utf8Error;

use derive_more::*;

/// A fatal loading error. Anything milder is reported through the
/// [`DiagnosticSink`](crate::DiagnosticSink) and parsing continues.
#[derive(Error, Display, From, Debug)]
pub enum TmxError {
    #[display(fmt = "{_0}")]
    Xml(roxmltree::Error),
    #[display(fmt = "{_0}")]
    Utf8(Utf8Error),
    #[display(fmt = "unable to read {:?}: {}", path, reason)]
    #[from(ignore)]
    UnreadableFile { path: PathBuf, reason: String },
    #[display(fmt = "unexpected root element '{tag_name}'")]
    #[from(ignore)]
    UnexpectedTag { tag_name: String },
    #[display(fmt = "base64 payload length {length} is not a multiple of 4")]
    #[from(ignore)]
    InvalidBase64Length { length: usize },
    #[display(fmt = "character '{character}' is not in the base64 alphabet")]
    #[from(ignore)]
    InvalidBase64Character { character: char },
    #[display(fmt = "corrupt compressed stream: {_0}")]
    CorruptStream(io::Error),
    #[display(fmt = "{remaining} input bytes left over after the compressed stream ended")]
    #[from(ignore)]
    TrailingData { remaining: usize },
    #[display(fmt = "tile data length {length} is not a multiple of 4")]
    #[from(ignore)]
    InvalidDataLength { length: usize },
    #[display(fmt = "invalid csv tile token '{token}'")]
    #[from(ignore)]
    InvalidCsvToken { token: String },
    #[display(fmt = "invalid point list '{text}'")]
    #[from(ignore)]
    InvalidPoints { text: String },
}
