//! Data models for papyrus
//!
//! An `Entry` is one paper's metadata record in the index document. Only
//! `title` and `author` are interpreted; everything else is carried along
//! untouched so hand-written fields survive a rewrite of the index.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

const TITLE: &str = "title";
const AUTHOR: &str = "author";

/// Metadata for one paper
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entry {
    /// Paper title
    pub title: Option<String>,
    /// Authors, in citation order
    pub author: Option<Vec<String>>,
    /// Fields papyrus does not interpret, in document order
    ///
    /// Keys and values are kept as YAML values, tags and non-string keys
    /// included.
    pub extra: Mapping,
}

impl Entry {
    /// Create an empty entry
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the authors
    pub fn with_authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.author = Some(authors.into_iter().map(Into::into).collect());
        self
    }

    /// Set an uninterpreted field
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.extra.insert(Value::String(name.into()), value);
        self
    }

    /// Merge `other` into this entry
    ///
    /// Fields present in `other` win; fields it lacks are kept.
    pub fn merge(&mut self, other: Entry) {
        if other.title.is_some() {
            self.title = other.title;
        }
        if other.author.is_some() {
            self.author = other.author;
        }
        for (name, value) in other.extra {
            self.extra.insert(name, value);
        }
    }

    /// Authors, empty when the field is absent
    pub fn authors(&self) -> &[String] {
        self.author.as_deref().unwrap_or_default()
    }
}

impl Serialize for Entry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.title.is_some() as usize + self.author.is_some() as usize + self.extra.len();
        let mut map = serializer.serialize_map(Some(len))?;
        if let Some(ref title) = self.title {
            map.serialize_entry(TITLE, title)?;
        }
        if let Some(ref author) = self.author {
            map.serialize_entry(AUTHOR, author)?;
        }
        for (name, value) in &self.extra {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Entry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut title = None;
        let mut author = None;
        let mut extra = Mapping::new();
        for (name, value) in Mapping::deserialize(deserializer)? {
            match name.as_str() {
                Some(TITLE) => title = Some(value),
                Some(AUTHOR) => author = Some(value),
                _ => {
                    extra.insert(name, value);
                }
            }
        }

        let title = match title {
            None | Some(Value::Null) => None,
            Some(value) => Some(scalar_text(value).map_err(|found| {
                de::Error::custom(format_args!("title: expected a string, found {}", found))
            })?),
        };

        let author = match author {
            None | Some(Value::Null) => None,
            Some(Value::Sequence(items)) => Some(
                items
                    .into_iter()
                    .map(scalar_text)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|found| {
                        de::Error::custom(format_args!(
                            "author: expected a list of names, found {} in the list",
                            found
                        ))
                    })?,
            ),
            Some(other) => {
                return Err(de::Error::custom(format_args!(
                    "author: expected a list of names, found {}",
                    Kind(&other)
                )))
            }
        };

        Ok(Self {
            title,
            author,
            extra,
        })
    }
}

/// Text of a plain scalar; the error names what was found instead
fn scalar_text(value: Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(Kind(&other).to_string()),
    }
}

struct Kind<'a>(&'a Value);

impl fmt::Display for Kind<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.0 {
            Value::Null => "null",
            Value::Bool(_) => "a boolean",
            Value::Number(_) => "a number",
            Value::String(_) => "a string",
            Value::Sequence(_) => "a list",
            Value::Mapping(_) => "a mapping",
            Value::Tagged(_) => "a tagged value",
        };
        f.write_str(kind)
    }
}

/// Path file name of a paper, `<key>.pdf`
pub fn paper_file_name(key: &str) -> String {
    format!("{}.pdf", key)
}

/// Check that a paper key or tag name can be used as one path component
///
/// Returns the reason it cannot, if any.
pub fn invalid_name_reason(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        Some("must not be empty")
    } else if name == "." || name == ".." {
        Some("must not be '.' or '..'")
    } else if name.contains(['/', '\\']) {
        Some("contains a path separator")
    } else if name.contains('\0') {
        Some("contains a NUL byte")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_builders() {
        let entry = Entry::new()
            .with_title("Foo Paper")
            .with_authors(["Alice", "Bob"])
            .with_field("year", Value::from(2019));

        assert_eq!(entry.title.as_deref(), Some("Foo Paper"));
        assert_eq!(entry.authors(), ["Alice", "Bob"]);
        assert_eq!(entry.extra.get("year"), Some(&Value::from(2019)));
    }

    #[test]
    fn test_authors_empty_when_absent() {
        assert!(Entry::new().authors().is_empty());
    }

    #[test]
    fn test_merge_overrides_given_fields_only() {
        let mut entry = Entry::new()
            .with_title("Old")
            .with_authors(["Alice"])
            .with_field("year", Value::from(2019))
            .with_field("venue", Value::from("ICML"));

        entry.merge(
            Entry::new()
                .with_title("New")
                .with_field("year", Value::from(2020)),
        );

        assert_eq!(entry.title.as_deref(), Some("New"));
        assert_eq!(entry.authors(), ["Alice"]);
        assert_eq!(entry.extra.get("year"), Some(&Value::from(2020)));
        assert_eq!(entry.extra.get("venue"), Some(&Value::from("ICML")));
    }

    #[test]
    fn test_serialize_field_order() {
        let entry = Entry::new()
            .with_field("zeta", Value::from(1))
            .with_field("alpha", Value::from(2))
            .with_authors(["Alice"])
            .with_title("T");

        let yaml = serde_yaml::to_string(&entry).unwrap();
        assert_eq!(yaml, "title: T\nauthor:\n- Alice\nzeta: 1\nalpha: 2\n");
    }

    #[test]
    fn test_deserialize_keeps_tagged_and_non_string_keys() {
        let entry: Entry = serde_yaml::from_str("note: !custom hi\n2019: x\ntitle: T\n").unwrap();

        assert_eq!(entry.title.as_deref(), Some("T"));
        assert_eq!(entry.extra.len(), 2);
        assert!(matches!(entry.extra.get("note"), Some(Value::Tagged(_))));
        assert_eq!(entry.extra.get(Value::from(2019)), Some(&Value::from("x")));
    }

    #[test]
    fn test_deserialize_scalar_title_and_authors() {
        let entry: Entry = serde_yaml::from_str("title: 1984\nauthor: [Orwell, 42]\n").unwrap();

        assert_eq!(entry.title.as_deref(), Some("1984"));
        assert_eq!(entry.authors(), ["Orwell", "42"]);
    }

    #[test]
    fn test_deserialize_rejects_malformed_known_fields() {
        let err = serde_yaml::from_str::<Entry>("author: Alice\n").unwrap_err();
        assert!(err.to_string().contains("author: expected a list of names"));

        let err = serde_yaml::from_str::<Entry>("title: [a, b]\n").unwrap_err();
        assert!(err.to_string().contains("title: expected a string, found a list"));
    }

    #[test]
    fn test_merge_replaces_extra_in_place() {
        let mut entry = Entry::new()
            .with_field("year", Value::from(2019))
            .with_field("venue", Value::from("ICML"));
        entry.merge(Entry::new().with_field("year", Value::from(2020)));

        let names: Vec<_> = entry.extra.iter().map(|(name, _)| name.clone()).collect();
        assert_eq!(names, vec![Value::from("year"), Value::from("venue")]);
    }

    #[test]
    fn test_paper_file_name() {
        assert_eq!(paper_file_name("foo"), "foo.pdf");
    }

    #[test]
    fn test_invalid_names() {
        assert!(invalid_name_reason("ml").is_none());
        assert!(invalid_name_reason("smith2019-deep").is_none());
        assert!(invalid_name_reason("").is_some());
        assert!(invalid_name_reason("..").is_some());
        assert!(invalid_name_reason("a/b").is_some());
        assert!(invalid_name_reason("a\\b").is_some());
    }
}
