//! # Catalog Module
//!
//! Produces the ordered, weighted item list the builders consume. Items come
//! either from a music directory (one item per entry, weight 1 unless
//! overridden) or from a JSON item file.
//!
//! ## Ordering
//!
//! Directory entries are sorted the way the media device shows them: German
//! collation where umlauts count as their base vowel (`Ä` as `A`), compared
//! case-insensitively. The raw name breaks remaining ties so the order never
//! depends on the filesystem's listing order.
//!
//! ## Weight overrides
//!
//! A JSON object mapping labels to positive integer weights:
//!
//! ```json
//! { "Beatles": 12, "Die Ärzte": 7 }
//! ```

use crate::error::TreeError;
use crate::item::Item;
use anyhow::{anyhow, Context, Result};
use log::{debug, warn};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

/// Sort key for a label under German collation.
#[must_use]
pub fn collation_key(label: &str) -> String {
    label
        .chars()
        .map(|c| match c {
            'Ä' => 'A',
            'Ö' => 'O',
            'Ü' => 'U',
            'ä' => 'a',
            'ö' => 'o',
            'ü' => 'u',
            other => other,
        })
        .collect::<String>()
        .to_lowercase()
}

/// Sort labels in device order.
pub fn sort_labels(labels: &mut [String]) {
    labels.sort_by(|a, b| collation_key(a).cmp(&collation_key(b)).then_with(|| a.cmp(b)));
}

/// Names of the entries of `dir`, in device order. Hidden entries are
/// skipped.
pub fn list_folder(dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read music directory {}", dir.display()))?;

    let mut labels = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
        match entry.file_name().into_string() {
            Ok(name) if name.starts_with('.') => debug!("Skipping hidden entry {name}"),
            Ok(name) => labels.push(name),
            Err(raw) => warn!("Skipping entry with non-UTF-8 name: {}", raw.to_string_lossy()),
        }
    }

    sort_labels(&mut labels);
    debug!("Listed {} entries in {}", labels.len(), dir.display());
    Ok(labels)
}

/// Read a label-to-weight JSON object. Every weight must be a positive
/// integer.
pub fn load_weight_overrides(path: &Path) -> Result<BTreeMap<String, u64>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read weight file {}", path.display()))?;
    let raw: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&content)
        .with_context(|| format!("Weight file {} is not a JSON object", path.display()))?;

    raw.into_iter()
        .map(|(label, value)| -> Result<(String, u64)> {
            let item = match value {
                serde_json::Value::Number(weight) => Item::from_json_number(label, &weight),
                _ => Err(TreeError::InvalidWeight { label, weight: f64::NAN }),
            }
            .with_context(|| format!("Invalid entry in weight file {}", path.display()))?;
            Ok((item.label, item.weight))
        })
        .collect()
}

/// Pair every label with its weight: the override if one exists, otherwise
/// `default_weight`. Overrides for unknown labels are reported and ignored.
#[must_use]
pub fn apply_weights(labels: Vec<String>, overrides: &BTreeMap<String, u64>, default_weight: u64) -> Vec<Item> {
    let known: HashSet<&str> = labels.iter().map(String::as_str).collect();
    for label in overrides.keys().filter(|label| !known.contains(label.as_str())) {
        warn!("Ignoring weight override for unknown entry `{label}'");
    }

    labels
        .into_iter()
        .map(|label| {
            let weight = overrides.get(&label).copied().unwrap_or(default_weight);
            Item::new(label, weight)
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct RawItem {
    label: String,
    weight: serde_json::Number,
}

/// Read an ordered JSON array of `{"label": …, "weight": …}` objects. The
/// file order is kept as is.
pub fn load_item_file(path: &Path) -> Result<Vec<Item>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read item file {}", path.display()))?;
    let raw: Vec<RawItem> = serde_json::from_str(&content)
        .with_context(|| format!("Item file {} is not a JSON array of items", path.display()))?;

    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|RawItem { label, weight }| {
            if !seen.insert(label.clone()) {
                return Err(anyhow!("Duplicate label `{label}' in item file {}", path.display()));
            }
            Item::from_json_number(label, &weight)
                .with_context(|| format!("Invalid entry in item file {}", path.display()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_umlauts_sort_as_base_vowels() {
        let mut labels: Vec<String> = ["Zappa", "Ärzte", "abba", "Oasis", "Öl", "Beatles"]
            .iter()
            .map(ToString::to_string)
            .collect();
        sort_labels(&mut labels);
        assert_eq!(labels, vec!["abba", "Ärzte", "Beatles", "Oasis", "Öl", "Zappa"]);
    }

    #[test]
    fn test_collation_ties_break_on_raw_name() {
        let mut labels = vec!["abc".to_string(), "ABC".to_string(), "Äbc".to_string()];
        sort_labels(&mut labels);
        assert_eq!(labels, vec!["ABC", "abc", "Äbc"]);
    }

    #[test]
    fn test_list_folder_skips_hidden_entries() -> Result<()> {
        let dir = TempDir::new()?;
        for name in ["Überfall", "Abba", ".stversions", "Tocotronic"] {
            fs::create_dir(dir.path().join(name))?;
        }
        fs::write(dir.path().join("Mixtape.m3u"), "")?;

        let labels = list_folder(dir.path())?;
        assert_eq!(labels, vec!["Abba", "Mixtape.m3u", "Tocotronic", "Überfall"]);
        Ok(())
    }

    #[test]
    fn test_overrides_apply_and_default_fills_in() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("custom-weights.json");
        fs::write(&path, r#"{"Abba": 12, "Gone": 3}"#)?;

        let overrides = load_weight_overrides(&path)?;
        let items = apply_weights(vec!["Abba".into(), "Beatles".into()], &overrides, 1);
        assert_eq!(items, vec![Item::new("Abba", 12), Item::new("Beatles", 1)]);
        Ok(())
    }

    #[test]
    fn test_invalid_override_is_rejected() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("custom-weights.json");
        for body in [r#"{"Abba": -1}"#, r#"{"Abba": 0}"#, r#"{"Abba": 1.5}"#, r#"{"Abba": "many"}"#] {
            fs::write(&path, body)?;
            let err = load_weight_overrides(&path).unwrap_err();
            assert!(
                matches!(err.downcast_ref::<TreeError>(), Some(TreeError::InvalidWeight { .. })),
                "{body} should be rejected, got {err:#}"
            );
        }
        Ok(())
    }

    #[test]
    fn test_item_file_keeps_order_and_rejects_duplicates() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("items.json");
        fs::write(&path, r#"[{"label": "b", "weight": 2}, {"label": "a", "weight": 5}]"#)?;
        assert_eq!(load_item_file(&path)?, vec![Item::new("b", 2), Item::new("a", 5)]);

        fs::write(&path, r#"[{"label": "b", "weight": 2}, {"label": "b", "weight": 5}]"#)?;
        assert!(load_item_file(&path).is_err());
        Ok(())
    }

    #[test]
    fn test_large_weights_are_read_exactly() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("items.json");
        fs::write(
            &path,
            r#"[{"label": "a", "weight": 9007199254740993}, {"label": "b", "weight": 18446744073709551615}]"#,
        )?;
        let weights: Vec<u64> = load_item_file(&path)?.iter().map(|item| item.weight).collect();
        assert_eq!(weights, vec![9_007_199_254_740_993, u64::MAX]);

        fs::write(&path, r#"[{"label": "a", "weight": 18446744073709551616}]"#)?;
        let err = load_item_file(&path).unwrap_err();
        assert!(matches!(err.downcast_ref::<TreeError>(), Some(TreeError::InvalidWeight { .. })));

        let overrides = dir.path().join("custom-weights.json");
        fs::write(&overrides, r#"{"Abba": 9007199254740993}"#)?;
        assert_eq!(load_weight_overrides(&overrides)?["Abba"], 9_007_199_254_740_993);
        Ok(())
    }
}
