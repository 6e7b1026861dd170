//! Editable working copy of a policy's accesses.

use crate::error::PolicyError;
use beeconnect_types::PolicyCategories;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Checked policy keys, organized per category.
///
/// Toggling a category replaces that category's slice wholesale; the
/// flattened set is always the union of every slice. Keys loaded from an
/// assignment that belong to no known category are held apart until
/// [`CheckedPolicySet::prune_to`] drops them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckedPolicySet {
    slices: BTreeMap<String, BTreeSet<String>>,
    uncategorized: BTreeSet<String>,
}

impl CheckedPolicySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Distribute a flat access list over the known categories.
    pub fn from_accesses<I, S>(categories: &PolicyCategories, accesses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for key in accesses.into_iter().map(Into::into) {
            let mut placed = false;
            for (category, keys) in categories.iter() {
                if keys.contains(&key) {
                    set.slices
                        .entry(category.clone())
                        .or_default()
                        .insert(key.clone());
                    placed = true;
                }
            }
            if !placed {
                set.uncategorized.insert(key);
            }
        }
        set
    }

    /// Replace one category's slice. Values that are not keys of that
    /// category are ignored.
    pub fn toggle_category<I, S>(
        &mut self,
        categories: &PolicyCategories,
        category: &str,
        values: I,
    ) -> Result<(), PolicyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys = categories
            .keys_of(category)
            .ok_or_else(|| PolicyError::UnknownCategory(category.to_string()))?;

        let slice: BTreeSet<String> = values
            .into_iter()
            .map(Into::into)
            .filter(|v| keys.contains(v))
            .collect();

        tracing::debug!(category, checked = slice.len(), "policy category toggled");
        self.slices.insert(category.to_string(), slice);
        Ok(())
    }

    /// Checked keys of one category.
    pub fn category(&self, category: &str) -> BTreeSet<String> {
        self.slices.get(category).cloned().unwrap_or_default()
    }

    /// Keys that matched no known category when loaded.
    pub fn uncategorized(&self) -> &BTreeSet<String> {
        &self.uncategorized
    }

    pub fn flattened(&self) -> BTreeSet<String> {
        self.slices
            .values()
            .flatten()
            .chain(self.uncategorized.iter())
            .cloned()
            .collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.uncategorized.contains(key) || self.slices.values().any(|s| s.contains(key))
    }

    pub fn is_empty(&self) -> bool {
        self.uncategorized.is_empty() && self.slices.values().all(BTreeSet::is_empty)
    }

    pub fn clear(&mut self) {
        self.slices.clear();
        self.uncategorized.clear();
    }

    /// Flattened keys restricted to the known universe, in sorted order.
    pub fn prune_to(&self, searchable: &BTreeSet<String>) -> Vec<String> {
        self.flattened()
            .into_iter()
            .filter(|k| searchable.contains(k))
            .collect()
    }

    pub fn diff(&self, original: &BTreeSet<String>) -> PolicyDiff {
        let current = self.flattened();
        PolicyDiff {
            granted: current.difference(original).cloned().collect(),
            revoked: original.difference(&current).cloned().collect(),
        }
    }
}

/// Change between a loaded assignment and the working copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PolicyDiff {
    pub granted: Vec<String>,
    pub revoked: Vec<String>,
}

impl PolicyDiff {
    pub fn is_empty(&self) -> bool {
        self.granted.is_empty() && self.revoked.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> PolicyCategories {
        PolicyCategories::new()
            .with_category("A", ["p1", "p2"])
            .with_category("B", ["p3"])
    }

    fn set(keys: &[&str]) -> BTreeSet<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn toggle_leaves_other_categories_untouched() {
        let cats = categories();
        let mut checked = CheckedPolicySet::from_accesses(&cats, ["p1"]);
        checked.toggle_category(&cats, "B", ["p3"]).unwrap();
        assert_eq!(checked.flattened(), set(&["p1", "p3"]));
    }

    #[test]
    fn toggle_replaces_whole_slice() {
        let cats = categories();
        let mut checked = CheckedPolicySet::from_accesses(&cats, ["p1", "p2", "p3"]);
        checked.toggle_category(&cats, "A", ["p2"]).unwrap();
        assert_eq!(checked.flattened(), set(&["p2", "p3"]));
        checked
            .toggle_category(&cats, "A", Vec::<String>::new())
            .unwrap();
        assert_eq!(checked.flattened(), set(&["p3"]));
    }

    #[test]
    fn toggle_ignores_foreign_keys() {
        let cats = categories();
        let mut checked = CheckedPolicySet::new();
        checked.toggle_category(&cats, "B", ["p3", "p1"]).unwrap();
        assert_eq!(checked.category("B"), set(&["p3"]));
        assert!(!checked.contains("p1"));
    }

    #[test]
    fn toggle_unknown_category_errors() {
        let mut checked = CheckedPolicySet::new();
        let err = checked
            .toggle_category(&categories(), "Z", ["p1"])
            .unwrap_err();
        assert_eq!(err, PolicyError::UnknownCategory("Z".into()));
    }

    #[test]
    fn stale_keys_are_pruned() {
        let cats = categories();
        let checked = CheckedPolicySet::from_accesses(&cats, ["p1", "p4"]);
        assert_eq!(checked.uncategorized(), &set(&["p4"]));
        assert_eq!(checked.flattened(), set(&["p1", "p4"]));
        assert_eq!(checked.prune_to(&cats.searchable()), vec!["p1".to_string()]);
    }

    #[test]
    fn diff_reports_granted_and_revoked() {
        let cats = categories();
        let original = set(&["p1", "p2"]);
        let mut checked = CheckedPolicySet::from_accesses(&cats, original.clone());
        checked.toggle_category(&cats, "A", ["p1"]).unwrap();
        checked.toggle_category(&cats, "B", ["p3"]).unwrap();

        let diff = checked.diff(&original);
        assert_eq!(diff.granted, vec!["p3".to_string()]);
        assert_eq!(diff.revoked, vec!["p2".to_string()]);
        assert!(!diff.is_empty());
        assert!(checked.diff(&checked.flattened()).is_empty());
    }

    #[test]
    fn clear_empties_everything() {
        let cats = categories();
        let mut checked = CheckedPolicySet::from_accesses(&cats, ["p1", "zz"]);
        assert!(!checked.is_empty());
        checked.clear();
        assert!(checked.is_empty());
    }
}
