//! Ordered, case-insensitive header multimap

use std::fmt;

/// A multimap of MIME header names to values.
///
/// Names keep the spelling they were inserted with and are compared
/// case-insensitively. Entries keep their insertion order, which is also
/// the order they are written in.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Creates an empty header map
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value for `name`, keeping any existing values.
    pub fn add(&mut self, name: &str, value: impl Into<String>) {
        self.entries.push((name.to_string(), value.into()));
    }

    /// Replaces every value of `name` with `value`.
    ///
    /// The new entry takes the position of the first existing one, or is
    /// appended when `name` was not present.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();

        match self.position(name) {
            Some(index) => {
                self.entries[index].1 = value;

                let mut seen = 0;
                self.entries.retain(|(key, _)| {
                    if key.eq_ignore_ascii_case(name) {
                        seen += 1;
                        seen == 1
                    } else {
                        true
                    }
                });
            }
            None => self.entries.push((name.to_string(), value)),
        }
    }

    /// Returns the first value of `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|index| self.entries[index].1.as_str())
    }

    /// Returns every value of `name`, in insertion order
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns `true` if at least one value exists for `name`
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Removes every value of `name`, returning how many were removed
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        before - self.entries.len()
    }

    /// Appends every entry of `other`, keeping existing values
    pub fn extend(&mut self, other: &Headers) {
        for (name, value) in other.iter() {
            self.add(name, value);
        }
    }

    /// Iterates over `(name, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Number of entries, counting each value of a repeated name
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))
    }
}

impl fmt::Debug for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<N: AsRef<str>, V: Into<String>> FromIterator<(N, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();

        for (name, value) in iter {
            headers.add(name.as_ref(), value);
        }

        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_keep_their_spelling() {
        let mut headers = Headers::new();
        headers.add("Content-ID", "<logo.png>");
        headers.add("x-mailer", "postal");

        let names: Vec<_> = headers.iter().map(|(name, _)| name).collect();

        assert_eq!(names, vec!["Content-ID", "x-mailer"]);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut headers = Headers::new();
        headers.add("Content-ID", "<logo.png>");

        assert_eq!(headers.get("content-id"), Some("<logo.png>"));
        assert!(headers.contains("CONTENT-ID"));
        assert_eq!(headers.get("Content-Type"), None);
    }

    #[test]
    fn test_add_keeps_every_value_in_order() {
        let mut headers = Headers::new();
        headers.add("X-Tag", "one");
        headers.add("Subject", "hello");
        headers.add("x-tag", "two");

        assert_eq!(headers.get_all("X-Tag").collect::<Vec<_>>(), vec!["one", "two"]);
        assert_eq!(headers.len(), 3);
    }

    #[test]
    fn test_set_replaces_all_values_in_place() {
        let mut headers = Headers::new();
        headers.add("X-Tag", "one");
        headers.add("Subject", "hello");
        headers.add("X-Tag", "two");

        headers.set("x-tag", "three");

        let entries: Vec<_> = headers.iter().collect();
        assert_eq!(entries, vec![("X-Tag", "three"), ("Subject", "hello")]);
    }

    #[test]
    fn test_remove() {
        let mut headers: Headers = [("X-Tag", "one"), ("X-Tag", "two"), ("Subject", "hi")]
            .into_iter()
            .collect();

        assert_eq!(headers.remove("x-tag"), 2);
        assert_eq!(headers.len(), 1);
        assert!(!headers.contains("X-Tag"));
    }
}
