use uuid::Uuid;
use vitrina_core::models::requirement::{RequirementRule, RuleScope, WeekdayRuleInput};
use vitrina_core::resolution::RuleSet;
use vitrina_core::AppError;

/// Repository for requirement rules across all three scopes.
#[derive(Clone)]
pub struct RuleRepository {
    pool: sqlx::PgPool,
}

impl RuleRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the three rule layers consulted when resolving a store's
    /// requirement. Rows are ordered `updated_at DESC, id` so the duplicate
    /// tie-break in the resolver is stable for a given database state.
    #[tracing::instrument(skip(self), fields(db.table = "requirement_rules"))]
    pub async fn fetch_rule_set(
        &self,
        store_id: Uuid,
        cluster_id: Option<Uuid>,
    ) -> Result<RuleSet, AppError> {
        let store = self.fetch_scope(RuleScope::Store, Some(store_id)).await?;
        let cluster = match cluster_id {
            Some(id) => self.fetch_scope(RuleScope::Cluster, Some(id)).await?,
            None => Vec::new(),
        };
        let global = self.fetch_scope(RuleScope::Global, None).await?;

        Ok(RuleSet {
            store,
            cluster,
            global,
        })
    }

    async fn fetch_scope(
        &self,
        scope: RuleScope,
        owner_id: Option<Uuid>,
    ) -> Result<Vec<RequirementRule>, AppError> {
        let rows = sqlx::query_as::<_, RequirementRule>(
            r#"
            SELECT id, scope, owner_id, weekday, requirement, updated_at
            FROM requirement_rules
            WHERE scope = $1 AND owner_id IS NOT DISTINCT FROM $2
            ORDER BY updated_at DESC, id
            "#,
        )
        .bind(scope)
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Replace the rule set for one scope + owner: delete existing rows and
    /// insert the submitted ones in a single transaction. The caller has
    /// already rejected duplicate weekdays, so a failed insert leaves the
    /// previous rule set untouched.
    #[tracing::instrument(skip(self, rules), fields(db.table = "requirement_rules", rule_count = rules.len()))]
    pub async fn replace_rules(
        &self,
        scope: RuleScope,
        owner_id: Option<Uuid>,
        rules: &[WeekdayRuleInput],
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM requirement_rules
            WHERE scope = $1 AND owner_id IS NOT DISTINCT FROM $2
            "#,
        )
        .bind(scope)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

        for rule in rules {
            sqlx::query(
                r#"
                INSERT INTO requirement_rules (id, scope, owner_id, weekday, requirement, updated_at)
                VALUES ($1, $2, $3, $4, $5, NOW())
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(scope)
            .bind(owner_id)
            .bind(rule.weekday)
            .bind(rule.requirement)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
