/// A named group of entries, in the order they appeared in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    entries: Vec<Entry>,
}

impl Section {
    #[must_use]
    pub(crate) fn new(name: String, entries: Vec<Entry>) -> Self {
        Self { name, entries }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the first entry whose name is exactly `name`.
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Every value stored under `name`; duplicate keys are kept in source order.
    pub fn values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |entry| entry.name == name)
            .map(Entry::value)
    }

    pub(crate) fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    pub(crate) fn into_parts(self) -> (String, Vec<Entry>) {
        (self.name, self.entries)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    name: String,
    value: String,
}

impl Entry {
    #[must_use]
    pub(crate) fn new(name: String, value: String) -> Self {
        Self { name, value }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw text after the `=`; values are never coerced.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}
