//! Addressable member paths such as `items[4].products[0].orders[1]`.

use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Member(&'static str),
    Index(usize),
}

/// Location of a value inside a validated model graph.
///
/// Paths are immutable values: extending one returns a new path, so each
/// recursion step and each loop iteration owns its own location and sibling
/// iterations never observe each other's segments.
///
/// # Example
///
/// ```rust
/// use precept::engine::MemberPath;
///
/// let path = MemberPath::root()
///     .member("items")
///     .index(4)
///     .member("products")
///     .index(0);
///
/// assert_eq!(path.to_string(), "items[4].products[0]");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct MemberPath {
    segments: Vec<PathSegment>,
}

impl MemberPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn member(&self, name: &'static str) -> Self {
        self.push(PathSegment::Member(name))
    }

    pub fn index(&self, index: usize) -> Self {
        self.push(PathSegment::Index(index))
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    fn push(&self, segment: PathSegment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(segment);
        Self { segments }
    }
}

impl fmt::Display for MemberPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Member(name) if i == 0 => write!(f, "{name}")?,
                PathSegment::Member(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl Serialize for MemberPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
