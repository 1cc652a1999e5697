use vecmap::VecMap;

/// An ordered set of string key/value pairs attachable to maps, tilesets,
/// tiles, terrains, layers and objects.
#[derive(Clone, Default, Debug)]
pub struct Properties(VecMap<String, String>);

impl Properties {
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Get a property value, or `default` when the key is absent.
    pub fn get<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.0.get(key).map(String::as_str).unwrap_or(default)
    }

    /// Inserts a property. A key that is already present keeps its first
    /// value and `false` is returned.
    pub fn insert(&mut self, key: String, value: String) -> bool {
        if self.0.contains_key(&key) {
            return false;
        }
        self.0.insert(key, value);
        true
    }

    /// Pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
