use std::fmt;

/// Comparison operator carried by a filter key (`field@op`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    StartsWith,
    EndsWith,
}

impl FilterOp {
    /// Parses an operator token, case-insensitively.
    ///
    /// Unknown tokens fall back to [`FilterOp::Eq`].
    ///
    /// # Examples
    ///
    /// ```
    /// use inscribe_core::query::FilterOp;
    ///
    /// assert_eq!(FilterOp::parse("like"), FilterOp::Contains);
    /// assert_eq!(FilterOp::parse("GTE"), FilterOp::Gte);
    /// assert_eq!(FilterOp::parse("between"), FilterOp::Eq);
    /// ```
    pub fn parse(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "ne" | "neq" => FilterOp::Ne,
            "gt" => FilterOp::Gt,
            "gte" | "ge" => FilterOp::Gte,
            "lt" => FilterOp::Lt,
            "lte" | "le" => FilterOp::Lte,
            "like" | "contains" => FilterOp::Contains,
            "startswith" => FilterOp::StartsWith,
            "endswith" => FilterOp::EndsWith,
            _ => FilterOp::Eq,
        }
    }

    /// Canonical token for this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Ne => "ne",
            FilterOp::Gt => "gt",
            FilterOp::Gte => "gte",
            FilterOp::Lt => "lt",
            FilterOp::Lte => "lte",
            FilterOp::Contains => "like",
            FilterOp::StartsWith => "startswith",
            FilterOp::EndsWith => "endswith",
        }
    }

    /// Returns true for operators that only apply to string fields.
    pub fn is_text(self) -> bool {
        matches!(
            self,
            FilterOp::Contains | FilterOp::StartsWith | FilterOp::EndsWith
        )
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Splits a filter key into field name and operator.
///
/// A bare field name means equality.
///
/// ```
/// use inscribe_core::query::{split_filter_key, FilterOp};
///
/// assert_eq!(split_filter_key("Age@gt"), ("Age", FilterOp::Gt));
/// assert_eq!(split_filter_key("Name"), ("Name", FilterOp::Eq));
/// ```
pub fn split_filter_key(key: &str) -> (&str, FilterOp) {
    match key.split_once('@') {
        Some((field, op)) => (field.trim(), FilterOp::parse(op)),
        None => (key.trim(), FilterOp::Eq),
    }
}

/// Ordered mapping from filter key (`field` or `field@op`) to raw value.
///
/// Keys are unique; inserting an existing key replaces its value in place
/// so iteration order is the order in which keys were first added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterMap {
    entries: Vec<(String, String)>,
}

impl FilterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces one entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder-style [`FilterMap::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FilterMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = FilterMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_aliases() {
        assert_eq!(FilterOp::parse("eq"), FilterOp::Eq);
        assert_eq!(FilterOp::parse("neq"), FilterOp::Ne);
        assert_eq!(FilterOp::parse("ne"), FilterOp::Ne);
        assert_eq!(FilterOp::parse("ge"), FilterOp::Gte);
        assert_eq!(FilterOp::parse("le"), FilterOp::Lte);
        assert_eq!(FilterOp::parse("Contains"), FilterOp::Contains);
        assert_eq!(FilterOp::parse("StartsWith"), FilterOp::StartsWith);
        assert_eq!(FilterOp::parse("endswith"), FilterOp::EndsWith);
    }

    #[test]
    fn test_unknown_operator_falls_back_to_eq() {
        assert_eq!(FilterOp::parse(""), FilterOp::Eq);
        assert_eq!(FilterOp::parse("regex"), FilterOp::Eq);
    }

    #[test]
    fn test_split_filter_key() {
        assert_eq!(split_filter_key("Name@like"), ("Name", FilterOp::Contains));
        assert_eq!(split_filter_key(" Age @ lte "), ("Age", FilterOp::Lte));
        assert_eq!(split_filter_key("Status@"), ("Status", FilterOp::Eq));
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut map = FilterMap::new();
        map.insert("A", "1");
        map.insert("B", "2");
        map.insert("A", "3");

        let entries: Vec<_> = map.iter().collect();
        assert_eq!(entries, vec![("A", "3"), ("B", "2")]);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_from_iterator() {
        let map: FilterMap = [("Age@gt", "18"), ("Name", "Ana")].into_iter().collect();
        assert_eq!(map.get("Age@gt"), Some("18"));
        assert_eq!(map.get("Name"), Some("Ana"));
        assert_eq!(map.get("Missing"), None);
    }
}
