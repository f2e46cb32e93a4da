//! Interned JavaScript strings
//!
//! Strings are immutable and interned for deduplication.
//! This allows fast equality comparison (pointer comparison).

use dashmap::DashMap;
use rustc_hash::{FxBuildHasher, FxHasher};
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock};

/// Global string intern table
static STRING_TABLE: LazyLock<DashMap<Arc<str>, Arc<JsString>, FxBuildHasher>> =
    LazyLock::new(|| DashMap::with_hasher(FxBuildHasher));

/// An interned JavaScript string
#[derive(Clone)]
pub struct JsString {
    /// The actual string data
    data: Arc<str>,
    /// Precomputed hash for fast lookup
    hash: u64,
}

impl JsString {
    /// Create or retrieve an interned string (using global table)
    pub fn intern(s: &str) -> Arc<Self> {
        if let Some(existing) = STRING_TABLE.get(s) {
            return existing.clone();
        }

        let data: Arc<str> = Arc::from(s);
        let js_str = Arc::new(Self {
            hash: Self::compute_hash(s),
            data: data.clone(),
        });

        // Another thread may have raced us; keep whichever landed first.
        STRING_TABLE.entry(data).or_insert(js_str).clone()
    }

    /// Get the string as a str slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.data
    }

    /// Get the length in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if string is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Parse as a canonical array index (`"0"`..=`"4294967294"`)
    pub fn as_array_index(&self) -> Option<u32> {
        let s = self.as_str();
        if s.is_empty() || s.len() > 10 {
            return None;
        }
        if s.len() > 1 && s.starts_with('0') {
            return None;
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        s.parse::<u32>().ok().filter(|&i| i != u32::MAX)
    }

    fn compute_hash(s: &str) -> u64 {
        let mut hasher = FxHasher::default();
        s.hash(&mut hasher);
        hasher.finish()
    }
}

impl std::fmt::Debug for JsString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JsString({:?})", self.data)
    }
}

impl std::fmt::Display for JsString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.data)
    }
}

impl PartialEq for JsString {
    fn eq(&self, other: &Self) -> bool {
        if self.hash != other.hash {
            return false;
        }
        self.data == other.data
    }
}

impl Eq for JsString {}

impl Hash for JsString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl AsRef<str> for JsString {
    fn as_ref(&self) -> &str {
        &self.data
    }
}

/// Well-known interned strings (for property names)
pub mod well_known {
    use super::*;

    macro_rules! well_known_string {
        ($name:ident, $value:literal) => {
            /// Well-known string constant
            pub static $name: LazyLock<Arc<JsString>> = LazyLock::new(|| JsString::intern($value));
        };
    }

    well_known_string!(LENGTH, "length");
    well_known_string!(NAME, "name");
    well_known_string!(VALUE, "value");
    well_known_string!(WRITABLE, "writable");
    well_known_string!(ENUMERABLE, "enumerable");
    well_known_string!(CONFIGURABLE, "configurable");
    well_known_string!(GET, "get");
    well_known_string!(SET, "set");
    well_known_string!(PROXY, "proxy");
    well_known_string!(REVOKE, "revoke");
    well_known_string!(REVOCABLE, "revocable");
    well_known_string!(PROXY_CTOR, "Proxy");
}
