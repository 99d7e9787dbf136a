//! Requirement resolution engine.
//!
//! Determines the upload requirement for a store on a given weekday by
//! checking override layers in strict precedence order: store rule, then
//! cluster rule, then global rule, then `None`. Pure over pre-fetched rule
//! tables; the caller freezes the result onto the UploadDay at creation.

use crate::models::requirement::{RequirementKind, RequirementRule};

/// The three rule layers, pre-fetched for one store. `cluster` stays empty
/// when the store has no cluster.
#[derive(Debug, Default, Clone)]
pub struct RuleSet {
    pub store: Vec<RequirementRule>,
    pub cluster: Vec<RequirementRule>,
    pub global: Vec<RequirementRule>,
}

fn store_rule(rules: &RuleSet, weekday: i16) -> Option<RequirementKind> {
    rules
        .store
        .iter()
        .find(|r| r.weekday == weekday)
        .map(|r| r.requirement)
}

fn cluster_rule(rules: &RuleSet, weekday: i16) -> Option<RequirementKind> {
    rules
        .cluster
        .iter()
        .find(|r| r.weekday == weekday)
        .map(|r| r.requirement)
}

/// Global rules tolerate historical duplicate rows per weekday; the row with
/// the greatest `updated_at` wins. Ties keep the first such row in table
/// order (the repository orders by `updated_at DESC, id`).
fn global_rule(rules: &RuleSet, weekday: i16) -> Option<RequirementKind> {
    rules
        .global
        .iter()
        .filter(|r| r.weekday == weekday)
        .fold(None::<&RequirementRule>, |best, r| match best {
            Some(b) if r.updated_at <= b.updated_at => Some(b),
            _ => Some(r),
        })
        .map(|r| r.requirement)
}

/// Resolve the requirement for `weekday` (0 = Sunday). When `frozen` is
/// given (the UploadDay already materialized a requirement) it is returned
/// verbatim, ignoring all rule tables. Total: absence of data degrades to
/// `RequirementKind::None`, never an error.
pub fn resolve_requirement(
    rules: &RuleSet,
    weekday: i16,
    frozen: Option<RequirementKind>,
) -> RequirementKind {
    if let Some(kind) = frozen {
        return kind;
    }

    // Ordered lookup layers, first match wins. Adding a fourth scope is a
    // one-line change here.
    let layers: [fn(&RuleSet, i16) -> Option<RequirementKind>; 3] =
        [store_rule, cluster_rule, global_rule];

    layers
        .iter()
        .find_map(|lookup| lookup(rules, weekday))
        .unwrap_or(RequirementKind::None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::requirement::RuleScope;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn rule(
        scope: RuleScope,
        weekday: i16,
        requirement: RequirementKind,
        age: Duration,
    ) -> RequirementRule {
        RequirementRule {
            id: Uuid::new_v4(),
            scope,
            owner_id: match scope {
                RuleScope::Global => None,
                _ => Some(Uuid::new_v4()),
            },
            weekday,
            requirement,
            updated_at: Utc::now() - age,
        }
    }

    #[test]
    fn store_rule_beats_cluster_and_global() {
        let rules = RuleSet {
            store: vec![rule(
                RuleScope::Store,
                4,
                RequirementKind::Video,
                Duration::days(30),
            )],
            cluster: vec![rule(
                RuleScope::Cluster,
                4,
                RequirementKind::Photo,
                Duration::days(1),
            )],
            global: vec![rule(
                RuleScope::Global,
                4,
                RequirementKind::None,
                Duration::hours(1),
            )],
        };
        assert_eq!(
            resolve_requirement(&rules, 4, None),
            RequirementKind::Video
        );
    }

    #[test]
    fn cluster_rule_beats_global_when_store_has_none() {
        let rules = RuleSet {
            store: vec![rule(
                RuleScope::Store,
                2,
                RequirementKind::Both,
                Duration::zero(),
            )],
            cluster: vec![rule(
                RuleScope::Cluster,
                4,
                RequirementKind::Photo,
                Duration::zero(),
            )],
            global: vec![rule(
                RuleScope::Global,
                4,
                RequirementKind::Both,
                Duration::zero(),
            )],
        };
        // Store only has a rule for weekday 2, so weekday 4 falls through.
        assert_eq!(
            resolve_requirement(&rules, 4, None),
            RequirementKind::Photo
        );
    }

    #[test]
    fn latest_global_duplicate_wins() {
        // Array order is arbitrary; the larger timestamp must win.
        let rules = RuleSet {
            global: vec![
                rule(RuleScope::Global, 5, RequirementKind::Both, Duration::zero()),
                rule(
                    RuleScope::Global,
                    5,
                    RequirementKind::Photo,
                    Duration::days(10),
                ),
            ],
            ..Default::default()
        };
        assert_eq!(resolve_requirement(&rules, 5, None), RequirementKind::Both);

        let reversed = RuleSet {
            global: vec![
                rule(
                    RuleScope::Global,
                    5,
                    RequirementKind::Photo,
                    Duration::days(10),
                ),
                rule(RuleScope::Global, 5, RequirementKind::Both, Duration::zero()),
            ],
            ..Default::default()
        };
        assert_eq!(
            resolve_requirement(&reversed, 5, None),
            RequirementKind::Both
        );
    }

    #[test]
    fn frozen_requirement_is_returned_verbatim() {
        let rules = RuleSet {
            store: vec![rule(
                RuleScope::Store,
                3,
                RequirementKind::Both,
                Duration::zero(),
            )],
            ..Default::default()
        };
        // Rules would resolve to Both, but the materialized day froze None.
        assert_eq!(
            resolve_requirement(&rules, 3, Some(RequirementKind::None)),
            RequirementKind::None
        );
    }

    #[test]
    fn no_rules_anywhere_defaults_to_none() {
        let rules = RuleSet::default();
        assert_eq!(resolve_requirement(&rules, 0, None), RequirementKind::None);
    }
}
