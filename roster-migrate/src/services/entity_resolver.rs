//! Entity resolution engine
//!
//! Decides whether a legacy record names an entity already seen in this
//! run, and creates the canonical entity when it does not. The dedup map
//! lives for one run and is seeded lazily: every created entity is recorded
//! under its key, and the orchestrator adopts entities it rediscovers by
//! legacy id.

use crate::db::entities::{insert_organization, insert_person, NewOrganization, NewPerson};
use crate::models::{EntityId, RunMode};
use crate::normalize::normalize_key;
use chrono::NaiveDate;
use roster_common::db::OrgType;
use roster_common::Result;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::debug;

/// How an id was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// New entity (or a dry-run placeholder standing in for one)
    Created,
    /// Key or legacy id already seen in this run
    Reused,
    /// Rediscovered in the target by legacy id
    Adopted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub id: EntityId,
    pub outcome: ResolutionOutcome,
}

/// Person fields for resolution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonInput<'a> {
    pub first_name: Option<&'a str>,
    pub middle_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub display_name: &'a str,
    /// Extra dedup discriminator, e.g. address line 1 plus postal code
    pub key_extra: &'a str,
    pub date_of_birth: Option<NaiveDate>,
}

/// Organization fields for resolution
#[derive(Debug, Clone, PartialEq)]
pub struct OrganizationInput<'a> {
    pub legal_name: &'a str,
    pub org_type: OrgType,
    pub display_name: &'a str,
    pub tax_id: Option<&'a str>,
}

pub struct EntityResolver {
    db: SqlitePool,
    mode: RunMode,
    keys: HashMap<String, EntityId>,
    next_placeholder: i64,
}

impl EntityResolver {
    pub fn new(db: SqlitePool, mode: RunMode) -> Self {
        Self {
            db,
            mode,
            keys: HashMap::new(),
            next_placeholder: 0,
        }
    }

    /// Person dedup key; empty when first and last name are both blank
    pub fn person_key(first_name: Option<&str>, last_name: Option<&str>, extra: &str) -> String {
        let first = normalize_key(first_name.unwrap_or_default());
        let last = normalize_key(last_name.unwrap_or_default());
        if first.is_empty() && last.is_empty() {
            return String::new();
        }
        format!("{}|{}|{}", first, last, normalize_key(extra))
    }

    /// Organization dedup key: the normalized legal name alone
    pub fn organization_key(legal_name: &str) -> String {
        normalize_key(legal_name)
    }

    /// Number of keys recorded so far
    pub fn known_keys(&self) -> usize {
        self.keys.len()
    }

    pub fn lookup(&self, key: &str) -> Option<EntityId> {
        self.keys.get(key).copied()
    }

    /// Record an entity found by other means under `key`
    ///
    /// Blank keys are never recorded; an existing entry is kept.
    pub fn adopt(&mut self, key: &str, id: EntityId) {
        if key.is_empty() {
            return;
        }
        self.keys.entry(key.to_string()).or_insert(id);
    }

    pub async fn resolve_or_create_person(&mut self, person: &PersonInput<'_>) -> Result<Resolution> {
        let key = Self::person_key(person.first_name, person.last_name, person.key_extra);
        if let Some(id) = self.lookup(&key) {
            debug!(key = %key, id = %id, "Person reused");
            return Ok(Resolution {
                id,
                outcome: ResolutionOutcome::Reused,
            });
        }

        let id = if self.mode.writes() {
            insert_person(
                &self.db,
                &NewPerson {
                    display_name: person.display_name.to_string(),
                    first_name: person.first_name.unwrap_or_default().to_string(),
                    middle_name: person.middle_name.map(str::to_string),
                    last_name: person.last_name.unwrap_or_default().to_string(),
                    date_of_birth: person.date_of_birth,
                },
            )
            .await?
        } else {
            self.placeholder()
        };

        debug!(key = %key, id = %id, "Person created: {}", person.display_name);
        self.adopt(&key, id);
        Ok(Resolution {
            id,
            outcome: ResolutionOutcome::Created,
        })
    }

    pub async fn resolve_or_create_org(&mut self, org: &OrganizationInput<'_>) -> Result<Resolution> {
        let key = Self::organization_key(org.legal_name);
        if let Some(id) = self.lookup(&key) {
            debug!(key = %key, id = %id, "Organization reused");
            return Ok(Resolution {
                id,
                outcome: ResolutionOutcome::Reused,
            });
        }

        let id = if self.mode.writes() {
            insert_organization(
                &self.db,
                &NewOrganization {
                    display_name: org.display_name.to_string(),
                    org_type: org.org_type,
                    legal_name: org.legal_name.to_string(),
                    trade_name: None,
                    tax_id: org.tax_id.map(str::to_string),
                },
            )
            .await?
        } else {
            self.placeholder()
        };

        debug!(key = %key, id = %id, org_type = org.org_type.code(), "Organization created: {}", org.display_name);
        self.adopt(&key, id);
        Ok(Resolution {
            id,
            outcome: ResolutionOutcome::Created,
        })
    }

    fn placeholder(&mut self) -> EntityId {
        self.next_placeholder -= 1;
        EntityId(self.next_placeholder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_common::db::{create_schema, open_target_pool};
    use tempfile::TempDir;

    async fn setup(mode: RunMode) -> (TempDir, SqlitePool, EntityResolver) {
        let temp_dir = TempDir::new().unwrap();
        let pool = open_target_pool(&temp_dir.path().join("target.db"), None)
            .await
            .unwrap();
        create_schema(&pool).await.unwrap();
        let resolver = EntityResolver::new(pool.clone(), mode);
        (temp_dir, pool, resolver)
    }

    async fn entity_count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM entities")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    fn john_smith<'a>(extra: &'a str) -> PersonInput<'a> {
        PersonInput {
            first_name: Some("John"),
            last_name: Some("Smith"),
            display_name: "John Smith",
            key_extra: extra,
            ..Default::default()
        }
    }

    #[test]
    fn test_keys() {
        assert_eq!(
            EntityResolver::person_key(Some(" JOHN "), Some("Smith"), "12 Elm St. 55401"),
            "john|smith|12 elm st. 55401"
        );
        assert_eq!(EntityResolver::person_key(None, Some(" "), "12 Elm"), "");
        assert_eq!(EntityResolver::organization_key("ACME  Supply, Co"), "acme supply co");
    }

    #[tokio::test]
    async fn test_same_key_resolves_once() {
        let (_dir, pool, mut resolver) = setup(RunMode::Live).await;

        let first = resolver.resolve_or_create_person(&john_smith("12 Elm 55401")).await.unwrap();
        let second = resolver.resolve_or_create_person(&john_smith("12 ELM 55401")).await.unwrap();

        assert_eq!(first.outcome, ResolutionOutcome::Created);
        assert_eq!(second.outcome, ResolutionOutcome::Reused);
        assert_eq!(first.id, second.id);
        assert_eq!(entity_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_different_discriminator_does_not_merge() {
        let (_dir, pool, mut resolver) = setup(RunMode::Live).await;

        let a = resolver.resolve_or_create_person(&john_smith("12 Elm 55401")).await.unwrap();
        let b = resolver.resolve_or_create_person(&john_smith("9 Oak 55402")).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(entity_count(&pool).await, 2);
    }

    #[tokio::test]
    async fn test_blank_key_always_creates() {
        let (_dir, pool, mut resolver) = setup(RunMode::Live).await;
        let anonymous = PersonInput {
            display_name: "Unknown Customer",
            ..Default::default()
        };

        let a = resolver.resolve_or_create_person(&anonymous).await.unwrap();
        let b = resolver.resolve_or_create_person(&anonymous).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(b.outcome, ResolutionOutcome::Created);
        assert_eq!(resolver.known_keys(), 0);
        assert_eq!(entity_count(&pool).await, 2);
    }

    #[tokio::test]
    async fn test_dry_run_hands_out_placeholders() {
        let (_dir, pool, mut resolver) = setup(RunMode::DryRun).await;
        let acme = OrganizationInput {
            legal_name: "Acme Supply Co",
            org_type: OrgType::Business,
            display_name: "Acme Supply Co",
            tax_id: None,
        };

        let a = resolver.resolve_or_create_org(&acme).await.unwrap();
        let b = resolver.resolve_or_create_org(&acme).await.unwrap();
        let c = resolver.resolve_or_create_person(&john_smith("")).await.unwrap();

        assert_eq!(a.id, EntityId(-1));
        assert_eq!(b.id, a.id);
        assert_eq!(c.id, EntityId(-2));
        assert!(!a.id.is_materialized());
        assert_eq!(entity_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_adopted_entity_is_reused() {
        let (_dir, _pool, mut resolver) = setup(RunMode::Live).await;

        resolver.adopt("acme supply co", EntityId(41));
        resolver.adopt("", EntityId(42));

        let resolution = resolver
            .resolve_or_create_org(&OrganizationInput {
                legal_name: "ACME Supply Co",
                org_type: OrgType::Business,
                display_name: "ACME Supply Co",
                tax_id: None,
            })
            .await
            .unwrap();

        assert_eq!(resolution.id, EntityId(41));
        assert_eq!(resolution.outcome, ResolutionOutcome::Reused);
        assert_eq!(resolver.known_keys(), 1);
    }
}
