//! Cache Key Module
//!
//! Logical cache keys and their resolution into a single map key.

use std::fmt;

/// Separator placed between the segments of a composite key.
pub const KEY_SEPARATOR: &str = "__";

// == Key Segment ==
/// One part of a composite cache key.
#[derive(Debug, Clone, PartialEq)]
pub enum KeySegment {
    Text(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    /// A missing segment, skipped during resolution
    Undefined,
}

impl KeySegment {
    fn render(&self) -> Option<String> {
        match self {
            KeySegment::Text(text) => Some(text.clone()),
            KeySegment::Int(n) => Some(n.to_string()),
            KeySegment::UInt(n) => Some(n.to_string()),
            KeySegment::Float(n) => Some(render_float(*n)),
            KeySegment::Undefined => None,
        }
    }
}

/// Renders a float the way numbers join into strings: `-0` becomes `0` and
/// infinities are spelled out.
fn render_float(n: f64) -> String {
    if n == 0.0 {
        "0".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        n.to_string()
    }
}

impl From<&str> for KeySegment {
    fn from(value: &str) -> Self {
        KeySegment::Text(value.to_string())
    }
}

impl From<String> for KeySegment {
    fn from(value: String) -> Self {
        KeySegment::Text(value)
    }
}

impl From<&String> for KeySegment {
    fn from(value: &String) -> Self {
        KeySegment::Text(value.clone())
    }
}

macro_rules! int_segment {
    ($variant:ident as $target:ty: $($ty:ty),*) => {
        $(impl From<$ty> for KeySegment {
            fn from(value: $ty) -> Self {
                KeySegment::$variant(value as $target)
            }
        })*
    };
}

// Widening casts only: signed and unsigned values never share a variant
int_segment!(Int as i64: i8, i16, i32, i64, isize);
int_segment!(UInt as u64: u8, u16, u32, u64, usize);

impl From<f32> for KeySegment {
    fn from(value: f32) -> Self {
        KeySegment::Float(value as f64)
    }
}

impl From<f64> for KeySegment {
    fn from(value: f64) -> Self {
        KeySegment::Float(value)
    }
}

impl<T: Into<KeySegment>> From<Option<T>> for KeySegment {
    fn from(value: Option<T>) -> Self {
        value.map_or(KeySegment::Undefined, Into::into)
    }
}

// == Cache Key ==
/// Logical identity of a cacheable result.
///
/// Either a plain string or an ordered list of segments. Use the
/// [`cache_key!`](crate::cache_key) macro for mixed segments.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheKey {
    Raw(String),
    Segments(Vec<KeySegment>),
}

impl CacheKey {
    /// Resolves this key into the string used by the cache map.
    pub fn resolve(&self) -> String {
        resolve(self)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.resolve())
    }
}

impl From<&str> for CacheKey {
    fn from(value: &str) -> Self {
        CacheKey::Raw(value.to_string())
    }
}

impl From<String> for CacheKey {
    fn from(value: String) -> Self {
        CacheKey::Raw(value)
    }
}

impl<S: Into<KeySegment>> From<Vec<S>> for CacheKey {
    fn from(segments: Vec<S>) -> Self {
        CacheKey::Segments(segments.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<KeySegment>, const N: usize> From<[S; N]> for CacheKey {
    fn from(segments: [S; N]) -> Self {
        CacheKey::Segments(segments.into_iter().map(Into::into).collect())
    }
}

/// Builds a composite [`CacheKey`] from segments of mixed types.
///
/// ```
/// use query_cache::cache_key;
///
/// let key = cache_key!["todos", 1, None::<u32>, 2];
/// assert_eq!(key.resolve(), "todos__1__2");
/// ```
#[macro_export]
macro_rules! cache_key {
    ($($segment:expr),* $(,)?) => {
        $crate::cache::CacheKey::Segments(vec![$($crate::cache::KeySegment::from($segment)),*])
    };
}

// == Resolve ==
/// Canonicalizes a logical key into a single string.
///
/// Raw keys are returned unchanged. Composite keys drop undefined segments
/// and join the rest with [`KEY_SEPARATOR`], preserving order.
pub fn resolve(key: &CacheKey) -> String {
    match key {
        CacheKey::Raw(raw) => raw.clone(),
        CacheKey::Segments(segments) => segments
            .iter()
            .filter_map(KeySegment::render)
            .collect::<Vec<_>>()
            .join(KEY_SEPARATOR),
    }
}
