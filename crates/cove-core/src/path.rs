//! # Paths: Generic and Concrete Field Locations
//!
//! A data document is addressed two ways:
//!
//! - [`GenericPath`]: field names only, array indices elided. Every item
//!   of `releases` shares `/releases/tender`. This is the key for field
//!   statistics and the unit compared against schema declarations.
//! - [`ConcretePath`]: field names and array indices, e.g.
//!   `releases/0/tender/items/1`. Used only to report where an individual
//!   occurrence lives; never an aggregation key.
//!
//! ## Rendering
//!
//! | Type          | `Display`            | other                          |
//! |---------------|----------------------|--------------------------------|
//! | `GenericPath` | `/releases/tender`   | `joined()` → `releases/tender` |
//! | `ConcretePath`| `releases/0/tender`  | `to_pointer()` → `/releases/0/tender` |

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::PathError;

/// One step of a concrete path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    /// An object key.
    Key(String),
    /// An array index.
    Index(usize),
}

impl PathSegment {
    /// The key, if this segment addresses an object member.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            PathSegment::Key(k) => Some(k),
            PathSegment::Index(_) => None,
        }
    }

    /// Returns true if this segment is an array index.
    pub fn is_index(&self) -> bool {
        matches!(self, PathSegment::Index(_))
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => f.write_str(k),
            PathSegment::Index(i) => write!(f, "{i}"),
        }
    }
}

/// Structural field path with array indices elided.
///
/// The empty path denotes the document root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GenericPath(Vec<String>);

impl GenericPath {
    /// The document root.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a path from field names.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::EmptySegment`] if any segment is an empty string.
    pub fn new<I, S>(segments: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if let Some(position) = segments.iter().position(|s| s.is_empty()) {
            return Err(PathError::EmptySegment { position });
        }
        Ok(Self(segments))
    }

    /// Extend the path by one field name.
    ///
    /// Keys come straight from data or schema property names, so an empty
    /// key found in a document is carried through rather than rejected.
    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.to_string());
        Self(segments)
    }

    /// The enclosing path, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// The last field name, or `None` at the root.
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Field names from the root downward.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of field names.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for the document root.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true for the document root. Alias of [`is_root`](Self::is_root).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Segment-wise prefix test (`/a` is a prefix of `/a/b`, not of `/ab`).
    pub fn starts_with(&self, prefix: &GenericPath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Field names joined with `/` and no leading slash (`releases/tender`).
    pub fn joined(&self) -> String {
        self.0.join("/")
    }
}

impl fmt::Display for GenericPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for GenericPath {
    type Err = PathError;

    /// Parse `/a/b` (leading slash optional). The empty string is the root.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.strip_prefix('/').unwrap_or(s);
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        Self::new(trimmed.split('/'))
    }
}

impl Serialize for GenericPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Structural field path retaining concrete array indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConcretePath(Vec<PathSegment>);

impl ConcretePath {
    /// The document root.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a path from segments.
    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    /// Extend the path with an object key.
    pub fn key(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(name.to_string()));
        Self(segments)
    }

    /// Extend the path with an array index.
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    /// The enclosing path, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// The final segment, or `None` at the root.
    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }

    /// Segments from the root downward.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for the document root.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Drop array indices, keeping field names in order.
    pub fn to_generic(&self) -> GenericPath {
        GenericPath(
            self.0
                .iter()
                .filter_map(|s| s.as_key().map(str::to_string))
                .collect(),
        )
    }

    /// The nearest object key at or above the end of this path.
    pub fn last_key(&self) -> Option<&str> {
        self.0.iter().rev().find_map(PathSegment::as_key)
    }

    /// Render as an RFC 6901 JSON pointer (`/releases/0`).
    pub fn to_pointer(&self) -> String {
        let mut out = String::new();
        for segment in &self.0 {
            out.push('/');
            match segment {
                PathSegment::Key(k) => out.push_str(&k.replace('~', "~0").replace('/', "~1")),
                PathSegment::Index(i) => out.push_str(&i.to_string()),
            }
        }
        out
    }

    /// Parse an RFC 6901 JSON pointer, resolving numeric tokens against
    /// `data`: a token becomes an [`PathSegment::Index`] only where the
    /// addressed node is an array. Once the pointer leaves the document,
    /// remaining tokens are kept as keys.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::InvalidPointer`] if the pointer is non-empty
    /// and does not start with `/`, or contains a bad `~` escape.
    pub fn from_pointer(pointer: &str, data: &Value) -> Result<Self, PathError> {
        if pointer.is_empty() {
            return Ok(Self::root());
        }
        let Some(rest) = pointer.strip_prefix('/') else {
            return Err(PathError::InvalidPointer {
                pointer: pointer.to_string(),
                reason: "must start with '/'".to_string(),
            });
        };

        let mut segments = Vec::new();
        let mut node = Some(data);
        for raw in rest.split('/') {
            let token = unescape_token(raw).ok_or_else(|| PathError::InvalidPointer {
                pointer: pointer.to_string(),
                reason: format!("bad escape in token {raw:?}"),
            })?;
            match node {
                Some(Value::Array(items)) => match token.parse::<usize>() {
                    Ok(i) => {
                        node = items.get(i);
                        segments.push(PathSegment::Index(i));
                    }
                    Err(_) => {
                        node = None;
                        segments.push(PathSegment::Key(token));
                    }
                },
                Some(Value::Object(map)) => {
                    node = map.get(&token);
                    segments.push(PathSegment::Key(token));
                }
                _ => {
                    node = None;
                    segments.push(PathSegment::Key(token));
                }
            }
        }
        Ok(Self(segments))
    }
}

fn unescape_token(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '~' {
            match chars.next() {
                Some('0') => out.push('~'),
                Some('1') => out.push('/'),
                _ => return None,
            }
        } else {
            out.push(c);
        }
    }
    Some(out)
}

impl fmt::Display for ConcretePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl Serialize for ConcretePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generic_path_display_and_join() {
        let p = GenericPath::new(["releases", "tender", "items"]).unwrap();
        assert_eq!(p.to_string(), "/releases/tender/items");
        assert_eq!(p.joined(), "releases/tender/items");
        assert_eq!(GenericPath::root().to_string(), "");
    }

    #[test]
    fn test_generic_path_rejects_empty_segment() {
        let err = GenericPath::new(["a", "", "b"]).unwrap_err();
        assert_eq!(err, PathError::EmptySegment { position: 1 });
    }

    #[test]
    fn test_generic_path_from_str() {
        let p: GenericPath = "/a/c/d".parse().unwrap();
        assert_eq!(p.segments(), &["a", "c", "d"]);
        let no_slash: GenericPath = "a/c".parse().unwrap();
        assert_eq!(no_slash.to_string(), "/a/c");
        assert!("".parse::<GenericPath>().unwrap().is_root());
        assert!("/a//b".parse::<GenericPath>().is_err());
    }

    #[test]
    fn test_generic_path_prefix_is_segment_wise() {
        let a: GenericPath = "/a".parse().unwrap();
        let ab: GenericPath = "/a/b".parse().unwrap();
        let abc: GenericPath = "/abc".parse().unwrap();
        assert!(ab.starts_with(&a));
        assert!(!abc.starts_with(&a));
        assert_eq!(ab.parent(), Some(a));
        assert_eq!(GenericPath::root().parent(), None);
    }

    #[test]
    fn test_concrete_path_display_and_generic() {
        let p = ConcretePath::root()
            .key("releases")
            .index(0)
            .key("tender")
            .key("items")
            .index(1);
        assert_eq!(p.to_string(), "releases/0/tender/items/1");
        assert_eq!(p.to_generic().to_string(), "/releases/tender/items");
        assert_eq!(p.last_key(), Some("items"));
        assert_eq!(p.to_pointer(), "/releases/0/tender/items/1");
    }

    #[test]
    fn test_from_pointer_uses_data_shape() {
        let data = json!({"releases": [{"0": {"x": 1}}], "map": {"1": true}});
        let p = ConcretePath::from_pointer("/releases/0/0/x", &data).unwrap();
        assert_eq!(
            p.segments(),
            &[
                PathSegment::Key("releases".into()),
                PathSegment::Index(0),
                PathSegment::Key("0".into()),
                PathSegment::Key("x".into()),
            ]
        );
        let m = ConcretePath::from_pointer("/map/1", &data).unwrap();
        assert_eq!(m.segments()[1], PathSegment::Key("1".into()));
    }

    #[test]
    fn test_from_pointer_escapes() {
        let data = json!({"a/b": {"c~d": 1}});
        let p = ConcretePath::from_pointer("/a~1b/c~0d", &data).unwrap();
        assert_eq!(p.to_pointer(), "/a~1b/c~0d");
        assert_eq!(p.to_string(), "a/b/c~d");
    }

    #[test]
    fn test_from_pointer_rejects_garbage() {
        let data = json!({});
        assert!(ConcretePath::from_pointer("releases", &data).is_err());
        assert!(ConcretePath::from_pointer("/a~2", &data).is_err());
        assert!(ConcretePath::from_pointer("", &data).unwrap().is_empty());
    }

    #[test]
    fn test_paths_serialize_as_strings() {
        let g: GenericPath = "/a/b".parse().unwrap();
        let c = ConcretePath::root().key("a").index(3);
        assert_eq!(serde_json::to_value(&g).unwrap(), json!("/a/b"));
        assert_eq!(serde_json::to_value(&c).unwrap(), json!("a/3"));
    }
}
