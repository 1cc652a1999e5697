use derive_more::*;

/// A non-fatal problem found while parsing.
///
/// Diagnostics never abort a load; they mark places where the document
/// deviates from the TMX format and a fallback was applied.
#[derive(Display, Clone, Eq, PartialEq, Debug)]
pub enum Diagnostic {
    #[display(fmt = "mandatory attribute '{attribute}' is missing on <{element}>")]
    MissingAttribute { element: String, attribute: String },
    #[display(fmt = "invalid value '{value}' for attribute '{attribute}' on <{element}>")]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
    },
    #[display(fmt = "multiple <{child}> children where <{element}> expects one")]
    AmbiguousChild { element: String, child: String },
    #[display(fmt = "attribute '{attribute}' is not allowed on a TSX root element")]
    UnexpectedAttribute { attribute: String },
    #[display(fmt = "duplicate property '{key}' ignored")]
    DuplicateProperty { key: String },
    #[display(fmt = "tile layer holds {actual} cells where the map implies {expected}")]
    UnexpectedCellCount { expected: usize, actual: usize },
}

/// Receiver for non-fatal diagnostics, so hosts can capture, filter or
/// redirect them.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Forwards every diagnostic to the `log` crate.
#[derive(Copy, Clone, Default, Debug)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        log::warn!("{diagnostic}");
    }
}

/// Collects diagnostics in memory. Useful for testing purposes.
#[derive(Clone, Default, Debug)]
pub struct BufferSink(pub Vec<Diagnostic>);

impl DiagnosticSink for BufferSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }
}
