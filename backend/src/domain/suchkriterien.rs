//! Ordered multi-valued search criteria.
//!
//! Query strings may repeat a key (`?interesse=S&interesse=L`), so criteria
//! map each key to a list of values. Keys keep the order of their first
//! appearance because the composed predicate folds in that order.

/// Search criteria keyed by attribute name.
///
/// # Examples
/// ```
/// use kunde::domain::Suchkriterien;
///
/// let kriterien = Suchkriterien::from_pairs([("interesse", "S"), ("plz", "7"), ("interesse", "L")]);
/// assert_eq!(kriterien.len(), 2);
/// assert_eq!(kriterien.get("interesse"), Some(&["S".to_owned(), "L".to_owned()][..]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Suchkriterien {
    entries: Vec<(String, Vec<String>)>,
}

impl Suchkriterien {
    /// Empty criteria, which select every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build criteria from key/value pairs, grouping repeated keys.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut kriterien = Self::new();
        for (key, value) in pairs {
            kriterien.push(key, value);
        }
        kriterien
    }

    /// Append a value to `key`, creating the entry on first use.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Values recorded for `key`.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, values)| values.as_slice())
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate keys with their values in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// The single value of the only criterion when it is `key`.
    ///
    /// Used for the fast-path lookups by name or email.
    pub fn sole_value_for(&self, key: &str) -> Option<&str> {
        match self.entries.as_slice() {
            [(only, values)] if only == key => match values.as_slice() {
                [value] => Some(value.as_str()),
                _ => None,
            },
            _ => None,
        }
    }
}
