use std::collections::BTreeMap;

/// Parsed `ezDefaults.txt`: whitespace separated `key value...` lines.
///
/// Later lines win for duplicate keys, matching how ezCon itself reads the file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DefaultsCatalog {
    values: BTreeMap<String, String>,
}

impl DefaultsCatalog {
    pub fn parse(text: &str) -> Self {
        let mut values = BTreeMap::new();
        for line in text.lines() {
            let line = match line.split_once('#') {
                Some((before, _comment)) => before,
                None => line,
            };
            let mut parts = line.split_whitespace();
            let Some(key) = parts.next() else {
                continue;
            };
            let value = parts.collect::<Vec<_>>().join(" ");
            values.insert(key.to_string(), value);
        }
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
