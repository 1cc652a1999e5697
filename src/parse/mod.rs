mod map;
mod tileset;

use std::mem;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use roxmltree::{Document, Node};

use crate::{
    Diagnostic, DiagnosticSink, FileReader, FsReader, LogSink, Map, Properties, TmxError,
};

impl Map {
    /// Loads a map from the file system, reporting diagnostics through the
    /// `log` crate.
    pub fn parse_file(path: impl AsRef<Path>) -> Result<Map, TmxError> {
        Map::parse_file_with(path, &FsReader, &mut LogSink)
    }

    /// Loads a map with caller-supplied byte access and diagnostics.
    pub fn parse_file_with(
        path: impl AsRef<Path>,
        reader: &dyn FileReader,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Map, TmxError> {
        let path = path.as_ref();
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut parser = Parser { reader, sink, base_dir };
        parser.parse_map_file(path)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum Requirement {
    Optional,
    Mandatory,
}

/// One in-flight load. `base_dir` is the directory relative paths resolve
/// against; it follows the document currently being parsed.
pub(crate) struct Parser<'a> {
    pub reader: &'a dyn FileReader,
    pub sink: &'a mut dyn DiagnosticSink,
    pub base_dir: PathBuf,
}

impl Parser<'_> {
    fn parse_map_file(&mut self, path: &Path) -> Result<Map, TmxError> {
        let bytes = self.read(path)?;
        let text = std::str::from_utf8(&bytes)?;
        let doc = Document::parse(text)?;
        let root = doc.root_element();
        if !root.has_tag_name("map") {
            return Err(TmxError::UnexpectedTag {
                tag_name: String::from(root.tag_name().name()),
            });
        }
        self.parse_map(root)
    }

    pub(crate) fn read(&self, path: &Path) -> Result<Vec<u8>, TmxError> {
        self.reader.read(path).map_err(|err| TmxError::UnreadableFile {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }

    /// Runs `body` with the base directory rebased to `dir`, restoring the
    /// previous directory on every exit path.
    pub(crate) fn with_base_dir<T>(&mut self, dir: PathBuf, body: impl FnOnce(&mut Self) -> T) -> T {
        let previous = mem::replace(&mut self.base_dir, dir);
        let result = body(self);
        self.base_dir = previous;
        result
    }

    /*
     * Typed attribute reads. Attribute problems never abort a parse: a
     * missing mandatory attribute or an unparseable value is reported through
     * the sink and the fallback is used.
     */

    pub(crate) fn string_attr(&mut self, node: Node, name: &str, req: Requirement, fallback: &str) -> String {
        match node.attribute(name) {
            Some(value) => String::from(value),
            None => {
                self.missing(node, name, req);
                String::from(fallback)
            }
        }
    }

    pub(crate) fn number_attr<T: FromStr>(&mut self, node: Node, name: &str, req: Requirement, fallback: T) -> T {
        match node.attribute(name) {
            Some(value) => match value.parse() {
                Ok(parsed) => parsed,
                Err(_) => {
                    self.invalid(node, name, value);
                    fallback
                }
            },
            None => {
                self.missing(node, name, req);
                fallback
            }
        }
    }

    pub(crate) fn bool_attr(&mut self, node: Node, name: &str, req: Requirement, fallback: bool) -> bool {
        match node.attribute(name) {
            Some("0") => false,
            Some("1") => true,
            Some(value) => {
                self.invalid(node, name, value);
                fallback
            }
            None => {
                self.missing(node, name, req);
                fallback
            }
        }
    }

    /// Attribute restricted to a fixed vocabulary. A value outside of it is
    /// reported and the fallback is used.
    pub(crate) fn enum_attr<T: Copy>(
        &mut self,
        node: Node,
        name: &str,
        req: Requirement,
        vocabulary: &[(&str, T)],
        fallback: T,
    ) -> T {
        let Some(value) = node.attribute(name) else {
            self.missing(node, name, req);
            return fallback;
        };
        for &(token, variant) in vocabulary {
            if token == value {
                return variant;
            }
        }
        self.invalid(node, name, value);
        fallback
    }

    fn missing(&mut self, node: Node, name: &str, req: Requirement) {
        if req == Requirement::Mandatory {
            self.sink.report(Diagnostic::MissingAttribute {
                element: String::from(node.tag_name().name()),
                attribute: String::from(name),
            });
        }
    }

    fn invalid(&mut self, node: Node, name: &str, value: &str) {
        self.sink.report(Diagnostic::InvalidAttribute {
            element: String::from(node.tag_name().name()),
            attribute: String::from(name),
            value: String::from(value),
        });
    }

    /// The single `name` child of `node`. Extra instances are reported and
    /// the first one is used.
    pub(crate) fn one_child<'a, 'input>(&mut self, node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
        let mut children = node.children().filter(|child| child.has_tag_name(name));
        let first = children.next();
        if first.is_some() && children.next().is_some() {
            self.sink.report(Diagnostic::AmbiguousChild {
                element: String::from(node.tag_name().name()),
                child: String::from(name),
            });
        }
        first
    }

    /// Property bag of a node, first write wins.
    pub(crate) fn parse_properties(&mut self, node: Node) -> Properties {
        let mut properties = Properties::default();
        if let Some(list) = self.one_child(node, "properties") {
            for property in list.children().filter(|child| child.has_tag_name("property")) {
                let name = self.string_attr(property, "name", Requirement::Mandatory, "");
                let value = self.string_attr(property, "value", Requirement::Mandatory, "");
                if !properties.insert(name.clone(), value) {
                    self.sink.report(Diagnostic::DuplicateProperty { key: name });
                }
            }
        }
        properties
    }
}
