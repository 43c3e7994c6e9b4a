use std::fmt::Write;

/// An ordered list of `name: value` pairs in `application/warc-fields`
/// format, used for `warcinfo` and `metadata` record payloads.
///
/// Entries with empty values are kept in the list but skipped when
/// serialized, so callers can push optional values without checking them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarcFields(Vec<(String, String)>);

impl WarcFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// First value stored under `name` (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(key, _)| key.eq_ignore_ascii_case(name)).map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut output = String::new();
        for (name, value) in self.iter().filter(|(_, value)| !value.is_empty()) {
            // Writing into a String can't fail.
            let _ = write!(output, "{name}: {value}\r\n");
        }
        output.into_bytes()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for WarcFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for WarcFields {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values_skipped() {
        let fields = WarcFields::new()
            .with("via", "")
            .with("hopsFromSeed", "R")
            .with("title", "Climate Change | US EPA");
        assert_eq!(fields.to_bytes(), b"hopsFromSeed: R\r\ntitle: Climate Change | US EPA\r\n");
    }

    #[test]
    fn test_get_is_case_insensitive() {
        let fields: WarcFields = [("Operator", "EDGI")].into_iter().collect();
        assert_eq!(fields.get("operator"), Some("EDGI"));
        assert_eq!(fields.get("missing"), None);
    }
}
