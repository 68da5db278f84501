use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static DECORATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s\(\d+\)$|\s\(x\)$").expect("decoration pattern compiles")
});

/// Drops a trailing `" (12)"` or `" (x)"` decoration and lower-cases the rest.
pub fn normalize_summary(value: &str) -> String {
    DECORATION.replace(value, "").to_lowercase()
}

/// Exact-string corrections applied before normalization.
///
/// A raw summary that matches a key is replaced by the corrected value verbatim;
/// everything else goes through [`normalize_summary`].
#[derive(Debug, Clone, Default)]
pub struct SummaryRemap {
    corrections: HashMap<String, String>,
}

impl SummaryRemap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, original: impl Into<String>, corrected: impl Into<String>) {
        self.corrections.insert(original.into(), corrected.into());
    }

    pub fn len(&self) -> usize {
        self.corrections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corrections.is_empty()
    }

    pub fn normalize(&self, raw: &str) -> String {
        match self.corrections.get(raw) {
            Some(corrected) => corrected.clone(),
            None => normalize_summary(raw),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for SummaryRemap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut remap = Self::new();
        for (original, corrected) in iter {
            remap.insert(original, corrected);
        }
        remap
    }
}
