use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// What a store must upload on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "requirement_kind", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum RequirementKind {
    None,
    Photo,
    Video,
    Both,
}

/// Scope a requirement rule is attached to. Store rules beat cluster rules,
/// cluster rules beat global rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "rule_scope", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum RuleScope {
    Store,
    Cluster,
    Global,
}

/// A weekday requirement rule. `owner_id` is the store or cluster the rule
/// belongs to; `None` for global rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct RequirementRule {
    pub id: Uuid,
    pub scope: RuleScope,
    pub owner_id: Option<Uuid>,
    /// 0 = Sunday .. 6 = Saturday
    pub weekday: i16,
    pub requirement: RequirementKind,
    pub updated_at: DateTime<Utc>,
}

/// Weekday index used by the rule tables: 0 = Sunday .. 6 = Saturday.
pub fn weekday_index(date: NaiveDate) -> i16 {
    date.weekday().num_days_from_sunday() as i16
}

/// One row of a submitted rule set.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WeekdayRuleInput {
    /// 0 = Sunday .. 6 = Saturday
    pub weekday: i16,
    pub requirement: RequirementKind,
}

/// Request to replace the rule set for one scope + owner. One row per
/// weekday; duplicate weekdays are rejected before any write.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ReplaceRulesRequest {
    pub scope: RuleScope,
    /// Required for store/cluster scope, absent for global
    pub owner_id: Option<Uuid>,
    #[validate(length(max = 7, message = "At most one rule per weekday"))]
    pub rules: Vec<WeekdayRuleInput>,
}

impl ReplaceRulesRequest {
    /// Reject duplicate weekdays and out-of-range indices, and enforce that
    /// store/cluster rules carry an owner while global rules do not.
    pub fn validate_rules(&self) -> Result<(), String> {
        match self.scope {
            RuleScope::Global => {
                if self.owner_id.is_some() {
                    return Err("Global rules must not carry an owner_id".to_string());
                }
            }
            RuleScope::Store | RuleScope::Cluster => {
                if self.owner_id.is_none() {
                    return Err("Store and cluster rules require an owner_id".to_string());
                }
            }
        }
        let mut seen = [false; 7];
        for rule in &self.rules {
            if !(0..7).contains(&rule.weekday) {
                return Err(format!(
                    "Weekday {} out of range (expected 0-6)",
                    rule.weekday
                ));
            }
            let idx = rule.weekday as usize;
            if seen[idx] {
                return Err(format!("Duplicate rule for weekday {}", rule.weekday));
            }
            seen[idx] = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_index_is_zero_for_sunday() {
        // 2026-02-22 is a Sunday
        let sunday = NaiveDate::from_ymd_opt(2026, 2, 22).unwrap();
        assert_eq!(weekday_index(sunday), 0);
        let thursday = NaiveDate::from_ymd_opt(2026, 2, 26).unwrap();
        assert_eq!(weekday_index(thursday), 4);
    }

    #[test]
    fn duplicate_weekday_is_rejected() {
        let req = ReplaceRulesRequest {
            scope: RuleScope::Global,
            owner_id: None,
            rules: vec![
                WeekdayRuleInput {
                    weekday: 1,
                    requirement: RequirementKind::Photo,
                },
                WeekdayRuleInput {
                    weekday: 1,
                    requirement: RequirementKind::Video,
                },
            ],
        };
        let err = req.validate_rules().unwrap_err();
        assert!(err.contains("Duplicate rule for weekday 1"));
    }

    #[test]
    fn store_rules_require_owner() {
        let req = ReplaceRulesRequest {
            scope: RuleScope::Store,
            owner_id: None,
            rules: vec![],
        };
        assert!(req.validate_rules().is_err());
    }

    #[test]
    fn out_of_range_weekday_is_rejected() {
        let req = ReplaceRulesRequest {
            scope: RuleScope::Global,
            owner_id: None,
            rules: vec![WeekdayRuleInput {
                weekday: 7,
                requirement: RequirementKind::Both,
            }],
        };
        assert!(req.validate_rules().is_err());
    }
}
