//! Knowledge-graph bundle assembly.
//!
//! Converts [`IntelRecord`]s into typed entities and relationships. Every id
//! is a UUIDv5 over a namespaced key, so the same company, investor, article
//! or edge gets the same id on every run and downstream stores can merge on
//! id equality alone.
//!
//! # Graph shape
//!
//! ```text
//! Company --mentioned_in--------------> Article
//! Company --received_investment_from--> Investor
//! Investment --reported_by------------> Source(TechCrunch)
//! ```
//!
//! Entities are upserted with first-non-null-wins property merging.
//! Relationships are idempotent by id: the first insert wins.

use crate::models::IntelRecord;
use crate::utils::{iso8601, normalize_name};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Namespace folded into every id key.
const ID_NAMESPACE: &str = "techcrunch-intel";
const SOURCE_KEY: &str = "techcrunch";
const SOURCE_NAME: &str = "TechCrunch";

pub type Properties = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum EntityType {
    Source,
    Article,
    Company,
    Investor,
    Investment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    MentionedIn,
    ReportedBy,
    ReceivedInvestmentFrom,
}

impl RelationshipType {
    fn as_str(self) -> &'static str {
        match self {
            RelationshipType::MentionedIn => "mentioned_in",
            RelationshipType::ReportedBy => "reported_by",
            RelationshipType::ReceivedInvestmentFrom => "received_investment_from",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Entity {
    pub id: String,
    pub entity_type: EntityType,
    pub properties: Properties,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Relationship {
    pub id: String,
    pub relationship_type: RelationshipType,
    pub from_id: String,
    pub to_id: String,
    pub properties: Properties,
}

/// The exported graph: `{"entities": [...], "relationships": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct KgBundle {
    pub entities: Vec<Entity>,
    pub relationships: Vec<Relationship>,
}

/// Deterministic id: `"<prefix>:" + uuid5(URL, "techcrunch-intel:<prefix>:<key>")`.
pub fn stable_id(prefix: &str, key: &str) -> String {
    let name = format!("{ID_NAMESPACE}:{prefix}:{key}");
    let uuid = Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes());
    format!("{prefix}:{uuid}")
}

fn relationship_id(kind: RelationshipType, parts: &[&str]) -> String {
    stable_id("rel", &format!("{}:{}", kind.as_str(), parts.join(":")))
}

fn props(value: Value) -> Properties {
    match value {
        Value::Object(map) => map,
        _ => Properties::new(),
    }
}

/// Insertion-ordered entity and relationship stores with typed upserts.
#[derive(Debug, Default)]
pub struct KgBuilder {
    entities: Vec<Entity>,
    entity_index: HashMap<String, usize>,
    relationships: Vec<Relationship>,
    relationship_index: HashMap<String, usize>,
}

impl KgBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity, or fill absent/null properties of an existing one.
    pub fn upsert_entity(&mut self, entity: Entity) {
        let Some(&idx) = self.entity_index.get(&entity.id) else {
            self.entity_index.insert(entity.id.clone(), self.entities.len());
            self.entities.push(entity);
            return;
        };
        let existing = &mut self.entities[idx].properties;
        for (key, value) in entity.properties {
            match existing.get(&key) {
                None | Some(Value::Null) => {
                    existing.insert(key, value);
                }
                Some(_) => {}
            }
        }
    }

    /// Insert a relationship unless one with the same id already exists.
    pub fn upsert_relationship(&mut self, relationship: Relationship) {
        if self.relationship_index.contains_key(&relationship.id) {
            debug!(id = %relationship.id, "Relationship already present; keeping first");
            return;
        }
        self.relationship_index
            .insert(relationship.id.clone(), self.relationships.len());
        self.relationships.push(relationship);
    }

    fn link(
        &mut self,
        kind: RelationshipType,
        id: String,
        from_id: &str,
        to_id: &str,
        properties: Properties,
    ) {
        self.upsert_relationship(Relationship {
            id,
            relationship_type: kind,
            from_id: from_id.to_string(),
            to_id: to_id.to_string(),
            properties,
        });
    }

    /// Add the source, article, company, investment and investor nodes for one record.
    pub fn add_record(&mut self, record: &IntelRecord, source_id: &str) {
        let article = &record.article;
        let signal = &record.investment;

        let article_id = stable_id("article", &article.url);
        self.upsert_entity(Entity {
            id: article_id.clone(),
            entity_type: EntityType::Article,
            properties: props(json!({
                "title": article.title,
                "url": article.url,
                "published_at": article.published_at.as_ref().map(iso8601),
                "author": article.author,
                "categories": article.categories,
                "guid": article.guid,
                "source": article.source,
            })),
        });

        let Some(company_name) = signal
            .company
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
        else {
            debug!(url = %article.url, "Record has no company; only the article node is kept");
            return;
        };

        let company_id = stable_id("company", &normalize_name(company_name));
        self.upsert_entity(Entity {
            id: company_id.clone(),
            entity_type: EntityType::Company,
            properties: props(json!({ "name": company_name })),
        });
        self.link(
            RelationshipType::MentionedIn,
            relationship_id(
                RelationshipType::MentionedIn,
                &[company_id.as_str(), article_id.as_str()],
            ),
            &company_id,
            &article_id,
            props(json!({ "source": SOURCE_KEY })),
        );

        let investment_key = format!(
            "{company_id}:{article_id}:{}:{}",
            signal.amount_text.as_deref().unwrap_or_default(),
            signal.stage.as_deref().unwrap_or_default(),
        );
        let investment_id = stable_id("investment", &investment_key);
        self.upsert_entity(Entity {
            id: investment_id.clone(),
            entity_type: EntityType::Investment,
            properties: props(json!({
                "company_id": company_id,
                "article_id": article_id,
                "amount_text": signal.amount_text,
                "stage": signal.stage,
                "ai_relevant": signal.ai_relevant,
                "extracted_at": iso8601(&record.extracted_at),
            })),
        });
        self.link(
            RelationshipType::ReportedBy,
            relationship_id(RelationshipType::ReportedBy, &[investment_id.as_str(), source_id]),
            &investment_id,
            source_id,
            Properties::new(),
        );

        for investor_name in signal.investors.iter().map(|i| i.trim()) {
            if investor_name.is_empty() {
                continue;
            }
            let investor_id = stable_id("investor", &normalize_name(investor_name));
            self.upsert_entity(Entity {
                id: investor_id.clone(),
                entity_type: EntityType::Investor,
                properties: props(json!({ "name": investor_name })),
            });
            self.link(
                RelationshipType::ReceivedInvestmentFrom,
                relationship_id(
                    RelationshipType::ReceivedInvestmentFrom,
                    &[company_id.as_str(), investor_id.as_str(), article_id.as_str()],
                ),
                &company_id,
                &investor_id,
                props(json!({ "article_id": article_id, "source": SOURCE_KEY })),
            );
        }
    }

    pub fn finish(self) -> KgBundle {
        KgBundle {
            entities: self.entities,
            relationships: self.relationships,
        }
    }
}

/// Build the graph bundle for a batch of records.
#[instrument(level = "info", skip_all, fields(records = records.len()))]
pub fn build_kg_bundle(records: &[IntelRecord]) -> KgBundle {
    let mut builder = KgBuilder::new();

    let source_id = stable_id("source", SOURCE_KEY);
    builder.upsert_entity(Entity {
        id: source_id.clone(),
        entity_type: EntityType::Source,
        properties: props(json!({ "name": SOURCE_NAME })),
    });

    for record in records {
        builder.add_record(record, &source_id);
    }

    let bundle = builder.finish();
    info!(
        entities = bundle.entities.len(),
        relationships = bundle.relationships.len(),
        "Built knowledge-graph bundle"
    );
    bundle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Article, InvestmentSignal};
    use chrono::{TimeZone, Utc};
    use std::collections::HashSet;

    fn record(url: &str, company: Option<&str>, investors: &[&str]) -> IntelRecord {
        IntelRecord {
            article: Article::new("Acme AI raises $25M in Series A", url),
            investment: InvestmentSignal {
                ai_relevant: true,
                company: company.map(str::to_string),
                amount_text: Some("$25M".to_string()),
                stage: Some("series a".to_string()),
                investors: investors.iter().map(|i| i.to_string()).collect(),
                notes: None,
            },
            extracted_at: Utc.with_ymd_and_hms(2025, 5, 6, 12, 0, 0).unwrap(),
            raw: None,
        }
    }

    fn relationship_types(bundle: &KgBundle) -> HashSet<RelationshipType> {
        bundle
            .relationships
            .iter()
            .map(|r| r.relationship_type)
            .collect()
    }

    fn count(bundle: &KgBundle, kind: EntityType) -> usize {
        bundle
            .entities
            .iter()
            .filter(|e| e.entity_type == kind)
            .count()
    }

    #[test]
    fn test_stable_id_matches_uuid5_over_namespaced_key() {
        assert_eq!(
            stable_id("source", "techcrunch"),
            "source:08a96243-798f-52c7-b657-771beea740d3"
        );
        assert_eq!(
            stable_id("company", "acme ai"),
            "company:737d4da1-eb37-5e9b-908e-d427d015496c"
        );
        assert_eq!(
            stable_id("article", "https://example.com/1"),
            "article:65764b54-da78-5547-808f-ebde01ee4069"
        );
    }

    #[test]
    fn test_relationship_types_with_investors() {
        let bundle = build_kg_bundle(&[record("https://example.com/1", Some("Acme AI"), &["Sequoia Capital"])]);
        let expected: HashSet<_> = [
            RelationshipType::MentionedIn,
            RelationshipType::ReportedBy,
            RelationshipType::ReceivedInvestmentFrom,
        ]
        .into_iter()
        .collect();
        assert_eq!(relationship_types(&bundle), expected);
        assert_eq!(count(&bundle, EntityType::Investor), 1);
    }

    #[test]
    fn test_relationship_types_without_investors() {
        let bundle = build_kg_bundle(&[record("https://example.com/1", Some("Acme AI"), &[])]);
        let expected: HashSet<_> = [RelationshipType::MentionedIn, RelationshipType::ReportedBy]
            .into_iter()
            .collect();
        assert_eq!(relationship_types(&bundle), expected);
    }

    #[test]
    fn test_build_is_deterministic() {
        let records = vec![
            record("https://example.com/1", Some("Acme AI"), &["Sequoia", "Accel"]),
            record("https://example.com/2", Some("Beta Labs"), &["Accel"]),
        ];
        assert_eq!(build_kg_bundle(&records), build_kg_bundle(&records));
    }

    #[test]
    fn test_same_signal_twice_yields_one_investment() {
        let r = record("https://example.com/1", Some("Acme AI"), &["Sequoia"]);
        let bundle = build_kg_bundle(&[r.clone(), r]);
        assert_eq!(count(&bundle, EntityType::Investment), 1);
        assert_eq!(count(&bundle, EntityType::Article), 1);
        assert_eq!(bundle.relationships.len(), 3);
    }

    #[test]
    fn test_same_deal_in_two_articles_yields_two_investments() {
        let bundle = build_kg_bundle(&[
            record("https://example.com/1", Some("Acme AI"), &[]),
            record("https://example.com/2", Some("Acme AI"), &[]),
        ]);
        assert_eq!(count(&bundle, EntityType::Company), 1);
        assert_eq!(count(&bundle, EntityType::Investment), 2);
        let mentions = bundle
            .relationships
            .iter()
            .filter(|r| r.relationship_type == RelationshipType::MentionedIn)
            .count();
        assert_eq!(mentions, 2);
    }

    #[test]
    fn test_every_investment_reported_by_single_source() {
        let bundle = build_kg_bundle(&[
            record("https://example.com/1", Some("Acme AI"), &[]),
            record("https://example.com/2", Some("Beta"), &[]),
        ]);
        let source_id = stable_id("source", "techcrunch");
        assert_eq!(count(&bundle, EntityType::Source), 1);
        for investment in bundle
            .entities
            .iter()
            .filter(|e| e.entity_type == EntityType::Investment)
        {
            let edges: Vec<_> = bundle
                .relationships
                .iter()
                .filter(|r| r.relationship_type == RelationshipType::ReportedBy && r.from_id == investment.id)
                .collect();
            assert_eq!(edges.len(), 1);
            assert_eq!(edges[0].to_id, source_id);
        }
    }

    #[test]
    fn test_company_name_is_normalized_for_id() {
        let bundle = build_kg_bundle(&[
            record("https://example.com/1", Some("Acme  AI"), &[]),
            record("https://example.com/2", Some("acme ai"), &[]),
        ]);
        let companies: Vec<_> = bundle
            .entities
            .iter()
            .filter(|e| e.entity_type == EntityType::Company)
            .collect();
        assert_eq!(companies.len(), 1);
        assert_eq!(companies[0].id, "company:737d4da1-eb37-5e9b-908e-d427d015496c");
        assert_eq!(companies[0].properties["name"], "Acme  AI");
    }

    #[test]
    fn test_blank_company_keeps_only_article() {
        let bundle = build_kg_bundle(&[record("https://example.com/1", Some("   "), &["Sequoia"])]);
        assert_eq!(count(&bundle, EntityType::Source), 1);
        assert_eq!(count(&bundle, EntityType::Article), 1);
        assert_eq!(bundle.entities.len(), 2);
        assert!(bundle.relationships.is_empty());
    }

    #[test]
    fn test_blank_investor_names_are_skipped() {
        let bundle = build_kg_bundle(&[record("https://example.com/1", Some("Acme"), &["  ", "GV"])]);
        assert_eq!(count(&bundle, EntityType::Investor), 1);
    }

    #[test]
    fn test_entity_merge_fills_nulls_only() {
        let mut builder = KgBuilder::new();
        builder.upsert_entity(Entity {
            id: "article:x".to_string(),
            entity_type: EntityType::Article,
            properties: props(json!({ "title": "First", "author": null })),
        });
        builder.upsert_entity(Entity {
            id: "article:x".to_string(),
            entity_type: EntityType::Article,
            properties: props(json!({ "title": "Second", "author": "Jane", "guid": "g-1" })),
        });
        let bundle = builder.finish();
        assert_eq!(bundle.entities.len(), 1);
        let p = &bundle.entities[0].properties;
        assert_eq!(p["title"], "First");
        assert_eq!(p["author"], "Jane");
        assert_eq!(p["guid"], "g-1");
    }

    #[test]
    fn test_relationship_first_write_wins() {
        let mut builder = KgBuilder::new();
        for note in ["first", "second"] {
            builder.upsert_relationship(Relationship {
                id: "rel:x".to_string(),
                relationship_type: RelationshipType::MentionedIn,
                from_id: "company:a".to_string(),
                to_id: "article:b".to_string(),
                properties: props(json!({ "note": note })),
            });
        }
        let bundle = builder.finish();
        assert_eq!(bundle.relationships.len(), 1);
        assert_eq!(bundle.relationships[0].properties["note"], "first");
    }

    #[test]
    fn test_bundle_json_shape() {
        let bundle = build_kg_bundle(&[record("https://example.com/1", Some("Acme AI"), &["Sequoia"])]);
        let value = serde_json::to_value(&bundle).unwrap();
        assert_eq!(value["entities"][0]["entity_type"], "Source");
        assert_eq!(value["entities"][0]["properties"]["name"], "TechCrunch");
        let rel = &value["relationships"][0];
        assert_eq!(rel["relationship_type"], "mentioned_in");
        assert!(rel["id"].as_str().unwrap().starts_with("rel:"));
        assert!(rel["from_id"].as_str().unwrap().starts_with("company:"));
        assert!(rel["to_id"].as_str().unwrap().starts_with("article:"));
        let investment = value["entities"]
            .as_array()
            .unwrap()
            .iter()
            .find(|e| e["entity_type"] == "Investment")
            .unwrap();
        assert_eq!(investment["properties"]["extracted_at"], "2025-05-06T12:00:00Z");
        assert_eq!(investment["properties"]["amount_text"], "$25M");
    }

    #[test]
    fn test_properties_keep_insertion_order() {
        let bundle = build_kg_bundle(&[record("https://example.com/1", Some("Acme AI"), &[])]);
        let article = bundle
            .entities
            .iter()
            .find(|e| e.entity_type == EntityType::Article)
            .unwrap();
        let keys: Vec<&str> = article.properties.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["title", "url", "published_at", "author", "categories", "guid", "source"]
        );
    }
}
