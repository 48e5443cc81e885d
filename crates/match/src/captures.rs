/// Named values extracted by a successful pattern match, plus the request
/// segments the pattern left unconsumed.
///
/// Capture lookups are a linear scan; patterns rarely hold more than a
/// handful of names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures {
    values: Vec<(String, String)>,
    remainder: Vec<String>,
}

impl Captures {
    pub(crate) fn new(values: Vec<(String, String)>, remainder: Vec<String>) -> Self {
        Self { values, remainder }
    }

    /// Gets a captured value by its name, or `None` when the pattern has no
    /// such capture.
    pub fn get(&self, name: impl AsRef<str>) -> Option<&str> {
        let name = name.as_ref();
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    /// Iterates the `(name, value)` pairs in pattern order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// The request segments beyond the pattern's length; empty unless the
    /// pattern ended in a wildcard.
    pub fn remainder(&self) -> &[String] {
        &self.remainder
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consumes the captures, yielding the owned pairs and remainder.
    pub fn into_parts(self) -> (Vec<(String, String)>, Vec<String>) {
        (self.values, self.remainder)
    }
}
