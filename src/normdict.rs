use crate::Value;
use std::collections::HashMap;
use std::fmt;
use std::ops::Index;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{ser::SerializeMap, Serialize, Serializer};

type NormalizeFn = dyn Fn(&str) -> String + Send + Sync;

#[derive(Clone)]
enum NormalizerKind {
    Lowercase,
    Identity,
    Custom(Arc<NormalizeFn>),
}

/// Maps a field name to the canonical form used for equality and lookup.
///
/// The normalizer must be idempotent: normalizing an already normalized
/// name must return it unchanged.
///
/// Two normalizers are equal when they are both the built-in lowercase or
/// identity normalizer, or when they share the same custom function.
#[derive(Clone)]
pub struct Normalizer(NormalizerKind);

impl Normalizer {
    /// Case-insensitive comparison by lowercasing names (the default)
    pub fn lowercase() -> Self {
        Normalizer(NormalizerKind::Lowercase)
    }

    /// Exact, case-sensitive comparison
    pub fn identity() -> Self {
        Normalizer(NormalizerKind::Identity)
    }

    /// A user supplied normalization function
    ///
    /// ```
    /// use headerparser::Normalizer;
    /// let norm = Normalizer::custom(|name| name.to_lowercase().replace('_', "-"));
    /// assert_eq!(norm.normalize("Content_Type"), "content-type");
    /// ```
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Normalizer(NormalizerKind::Custom(Arc::new(f)))
    }

    /// Apply the normalizer to a name
    pub fn normalize(&self, name: &str) -> String {
        match &self.0 {
            NormalizerKind::Lowercase => name.to_lowercase(),
            NormalizerKind::Identity => String::from(name),
            NormalizerKind::Custom(f) => f(name),
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Normalizer::lowercase()
    }
}

impl PartialEq for Normalizer {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (NormalizerKind::Lowercase, NormalizerKind::Lowercase) => true,
            (NormalizerKind::Identity, NormalizerKind::Identity) => true,
            (NormalizerKind::Custom(a), NormalizerKind::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            NormalizerKind::Lowercase => f.write_str("Normalizer::lowercase"),
            NormalizerKind::Identity => f.write_str("Normalizer::identity"),
            NormalizerKind::Custom(_) => f.write_str("Normalizer::custom"),
        }
    }
}

/// A generalization of a case-insensitive map, and the record produced by
/// [`HeaderParser`](crate::HeaderParser).
///
/// Every key passed to a lookup or mutation is first run through the
/// [`Normalizer`], and the result is used for the actual lookup. Iteration
/// returns each key in the form it had the last time it was set.
/// Entries keep the position at which their normalized key was first
/// inserted.
///
/// The map also carries the message body (if any) that followed the header
/// section.
///
/// Two dictionaries are equal iff their normalizers, bodies, and
/// normalized views are equal.
///
/// ```
/// use headerparser::{NormalizedDict, Value};
/// let mut dict = NormalizedDict::new();
/// dict.insert("Content-Type", Value::from("text/plain"));
/// assert_eq!(dict.get("content-type"), Some(&Value::from("text/plain")));
/// dict.insert("CONTENT-TYPE", Value::from("text/html"));
/// assert_eq!(dict.keys().collect::<Vec<_>>(), vec!["CONTENT-TYPE"]);
/// ```
#[derive(Clone, Default)]
pub struct NormalizedDict {
    entries: Vec<(String, Value)>,
    index: HashMap<String, usize>,
    normalizer: Normalizer,
    body: Option<String>,
}

impl NormalizedDict {
    /// Create an empty dictionary with the lowercase normalizer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty dictionary with the given normalizer
    pub fn with_normalizer(normalizer: Normalizer) -> Self {
        NormalizedDict {
            normalizer,
            ..Self::default()
        }
    }

    /// The normalizer applied to keys
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Look up the value of a key
    pub fn get(&self, key: &str) -> Option<&Value> {
        let idx = *self.index.get(&self.normalizer.normalize(key))?;
        Some(&self.entries[idx].1)
    }

    /// Look up the value of a key for mutation
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        let idx = *self.index.get(&self.normalizer.normalize(key))?;
        Some(&mut self.entries[idx].1)
    }

    /// Returns true if a value is stored under the key
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(&self.normalizer.normalize(key))
    }

    /// Store a value, returning the previous value stored under the same
    /// normalized key. The key is remembered in the given form.
    pub fn insert<K: Into<String>>(&mut self, key: K, value: Value) -> Option<Value> {
        let key = key.into();
        let normed = self.normalizer.normalize(&key);
        match self.index.get(&normed) {
            Some(&idx) => {
                let entry = &mut self.entries[idx];
                entry.0 = key;
                Some(std::mem::replace(&mut entry.1, value))
            }
            None => {
                self.index.insert(normed, self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Remove a key, returning its value
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let idx = self.index.remove(&self.normalizer.normalize(key))?;
        let (_, value) = self.entries.remove(idx);
        for pos in self.index.values_mut() {
            if *pos > idx {
                *pos -= 1;
            }
        }
        Some(value)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the entries with their keys in last-set form
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    /// Iterate over the keys in last-set form
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterate over the values
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// The message body that followed the header section, if any
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Replace the message body
    pub fn set_body<S: Into<String>>(&mut self, body: S) {
        self.body = Some(body.into());
    }

    /// Remove and return the message body
    pub fn take_body(&mut self) -> Option<String> {
        self.body.take()
    }

    /// Return a copy whose keys are in normalized form
    ///
    /// ```
    /// use headerparser::{NormalizedDict, Value};
    /// let mut dict = NormalizedDict::new();
    /// dict.insert("Foo", Value::from(23));
    /// dict.insert("bar", Value::from(42));
    /// assert_eq!(dict.keys().collect::<Vec<_>>(), vec!["Foo", "bar"]);
    /// assert_eq!(dict.normalized().keys().collect::<Vec<_>>(), vec!["foo", "bar"]);
    /// ```
    pub fn normalized(&self) -> NormalizedDict {
        let mut dup = NormalizedDict::with_normalizer(self.normalizer.clone());
        for (key, value) in &self.entries {
            dup.insert(self.normalizer.normalize(key), value.clone());
        }
        dup.body = self.body.clone();
        dup
    }

    /// Convert to a plain map keyed by normalized keys
    pub fn normalized_map(&self) -> HashMap<String, Value> {
        self.entries
            .iter()
            .map(|(k, v)| (self.normalizer.normalize(k), v.clone()))
            .collect()
    }
}

/// Iterator over the entries of a [`NormalizedDict`]
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    inner: std::slice::Iter<'a, (String, Value)>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k.as_str(), v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> IntoIterator for &'a NormalizedDict {
    type Item = (&'a str, &'a Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Into<String>> Extend<(K, Value)> for NormalizedDict {
    fn extend<T: IntoIterator<Item = (K, Value)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for NormalizedDict {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        let mut dict = NormalizedDict::new();
        dict.extend(iter);
        dict
    }
}

impl Index<&str> for NormalizedDict {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        match self.get(key) {
            Some(value) => value,
            None => panic!("key not found: {:?}", key),
        }
    }
}

impl PartialEq for NormalizedDict {
    fn eq(&self, other: &Self) -> bool {
        self.normalizer == other.normalizer
            && self.body == other.body
            && self.normalized_map() == other.normalized_map()
    }
}

impl fmt::Debug for NormalizedDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalizedDict")
            .field("entries", &DebugEntries(&self.entries))
            .field("normalizer", &self.normalizer)
            .field("body", &self.body)
            .finish()
    }
}

struct DebugEntries<'a>(&'a [(String, Value)]);

impl fmt::Debug for DebugEntries<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

#[cfg(feature = "serde")]
impl Serialize for NormalizedDict {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
