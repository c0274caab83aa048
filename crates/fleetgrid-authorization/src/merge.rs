//! Pure template merge and customization-overlay functions.
//!
//! No persistence side effects: these operate on in-memory capability maps
//! and are exercised by the custom-role creation path.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use fleetgrid_db::AccessLevel;

use crate::templates::Template;

/// How multiple templates combine into one capability map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Every key from any template, at the highest level seen.
    Union,
    /// Only keys present in every template, at the lowest level seen.
    Intersection,
}

/// A single customization entry applied on top of a merged base.
///
/// A tagged variant, not a sentinel level: `Remove` deletes the key
/// outright, which no real access level can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(tag = "action", content = "level", rename_all = "lowercase")]
pub enum CapabilityOverride {
    /// Add the key, or replace its level if present.
    Set(AccessLevel),
    /// Drop the key even if the base granted it.
    Remove,
}

/// Merge the capability maps of `templates` under `strategy`.
///
/// Union is commutative and associative: the result is independent of the
/// order templates are listed in. An empty slice yields an empty map for
/// either strategy.
#[must_use]
pub fn merge_templates(
    templates: &[Template],
    strategy: MergeStrategy,
) -> BTreeMap<String, AccessLevel> {
    match strategy {
        MergeStrategy::Union => {
            let mut merged: BTreeMap<String, AccessLevel> = BTreeMap::new();
            for t in templates {
                for (key, level) in &t.capabilities {
                    merged
                        .entry(key.clone())
                        .and_modify(|held| *held = held.max(*level))
                        .or_insert(*level);
                }
            }
            merged
        }
        MergeStrategy::Intersection => {
            let Some((first, rest)) = templates.split_first() else {
                return BTreeMap::new();
            };

            let mut merged = first.capabilities.clone();
            for t in rest {
                merged.retain(|key, _| t.capabilities.contains_key(key));
                for (key, held) in &mut merged {
                    // retain above guarantees the key is present here
                    if let Some(level) = t.capabilities.get(key) {
                        *held = held.min(*level);
                    }
                }
            }
            merged
        }
    }
}

/// Apply a customization overlay to a merged base map.
///
/// An empty overlay is the identity transform.
#[must_use]
pub fn apply_customizations(
    base: &BTreeMap<String, AccessLevel>,
    overrides: &BTreeMap<String, CapabilityOverride>,
) -> BTreeMap<String, AccessLevel> {
    let mut result = base.clone();

    for (key, entry) in overrides {
        match entry {
            CapabilityOverride::Set(level) => {
                result.insert(key.clone(), *level);
            }
            CapabilityOverride::Remove => {
                result.remove(key);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use AccessLevel::{Full, Limited, View};

    fn tpl(key: &str, capabilities: &[(&str, AccessLevel)]) -> Template {
        Template {
            template_key: key.to_string(),
            name: key.to_string(),
            description: None,
            capabilities: capabilities
                .iter()
                .map(|(k, v)| ((*k).to_string(), *v))
                .collect(),
        }
    }

    fn map(entries: &[(&str, AccessLevel)]) -> BTreeMap<String, AccessLevel> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), *v))
            .collect()
    }

    #[test]
    fn union_keeps_highest_rank_per_key() {
        let t1 = tpl("t1", &[("a", View), ("b", Full)]);
        let t2 = tpl("t2", &[("a", Full), ("c", View)]);

        let merged = merge_templates(&[t1, t2], MergeStrategy::Union);

        assert_eq!(merged, map(&[("a", Full), ("b", Full), ("c", View)]));
    }

    #[test]
    fn union_is_order_independent() {
        let t1 = tpl("t1", &[("a", View), ("b", Limited)]);
        let t2 = tpl("t2", &[("a", Full), ("c", View)]);
        let t3 = tpl("t3", &[("b", Full)]);

        let forward = merge_templates(&[t1.clone(), t2.clone(), t3.clone()], MergeStrategy::Union);
        let backward = merge_templates(&[t3, t2, t1], MergeStrategy::Union);

        assert_eq!(forward, backward);
    }

    #[test]
    fn union_is_associative() {
        let t1 = tpl("t1", &[("a", View)]);
        let t2 = tpl("t2", &[("a", Limited), ("b", View)]);
        let t3 = tpl("t3", &[("b", Full), ("c", Limited)]);

        // (t1 ∪ t2) ∪ t3
        let left_pair = tpl(
            "left",
            &merge_templates(&[t1.clone(), t2.clone()], MergeStrategy::Union)
                .iter()
                .map(|(k, v)| (k.as_str(), *v))
                .collect::<Vec<_>>(),
        );
        let left = merge_templates(&[left_pair, t3.clone()], MergeStrategy::Union);

        // t1 ∪ (t2 ∪ t3)
        let right_pair = tpl(
            "right",
            &merge_templates(&[t2, t3], MergeStrategy::Union)
                .iter()
                .map(|(k, v)| (k.as_str(), *v))
                .collect::<Vec<_>>(),
        );
        let right = merge_templates(&[t1, right_pair], MergeStrategy::Union);

        assert_eq!(left, right);
    }

    #[test]
    fn intersection_keeps_common_keys_at_lowest_rank() {
        let t1 = tpl("t1", &[("a", View), ("b", Full)]);
        let t2 = tpl("t2", &[("a", Full), ("c", View)]);

        let merged = merge_templates(&[t1, t2], MergeStrategy::Intersection);

        assert_eq!(merged, map(&[("a", View)]));
    }

    #[test]
    fn intersection_of_disjoint_templates_is_empty() {
        let t1 = tpl("t1", &[("a", Full)]);
        let t2 = tpl("t2", &[("b", Full)]);

        let merged = merge_templates(&[t1, t2], MergeStrategy::Intersection);

        assert!(merged.is_empty());
    }

    #[test]
    fn intersection_of_single_template_is_that_template() {
        let t1 = tpl("t1", &[("a", Limited), ("b", View)]);

        let merged = merge_templates(std::slice::from_ref(&t1), MergeStrategy::Intersection);

        assert_eq!(merged, t1.capabilities);
    }

    #[test]
    fn empty_input_yields_empty_map() {
        assert!(merge_templates(&[], MergeStrategy::Union).is_empty());
        assert!(merge_templates(&[], MergeStrategy::Intersection).is_empty());
    }

    #[test]
    fn empty_overrides_are_identity() {
        let base = map(&[("a", Full), ("b", View)]);
        let result = apply_customizations(&base, &BTreeMap::new());
        assert_eq!(result, base);
    }

    #[test]
    fn set_override_adds_and_replaces() {
        let base = map(&[("a", View)]);
        let overrides: BTreeMap<String, CapabilityOverride> = [
            ("a".to_string(), CapabilityOverride::Set(Full)),
            ("b".to_string(), CapabilityOverride::Set(Limited)),
        ]
        .into();

        let result = apply_customizations(&base, &overrides);

        assert_eq!(result, map(&[("a", Full), ("b", Limited)]));
    }

    #[test]
    fn remove_override_drops_even_full_grants() {
        let base = map(&[("a", Full), ("b", View)]);
        let overrides: BTreeMap<String, CapabilityOverride> =
            [("a".to_string(), CapabilityOverride::Remove)].into();

        let result = apply_customizations(&base, &overrides);

        assert_eq!(result, map(&[("b", View)]));
    }

    #[test]
    fn remove_of_absent_key_is_a_no_op() {
        let base = map(&[("a", View)]);
        let overrides: BTreeMap<String, CapabilityOverride> =
            [("zz".to_string(), CapabilityOverride::Remove)].into();

        let result = apply_customizations(&base, &overrides);

        assert_eq!(result, base);
    }

    #[test]
    fn override_serde_shape_is_tagged() {
        let set = CapabilityOverride::Set(Full);
        let remove = CapabilityOverride::Remove;

        assert_eq!(
            serde_json::to_value(set).unwrap(),
            serde_json::json!({"action": "set", "level": "full"})
        );
        assert_eq!(
            serde_json::to_value(remove).unwrap(),
            serde_json::json!({"action": "remove"})
        );
    }
}
