pub mod store;

use crate::error::{Result, ServiceError};
use chrono::{DateTime, Utc};
use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

static PROJECT_SCHEMA: Lazy<JSONSchema> = Lazy::new(|| {
    let schema: Value = serde_json::from_str(include_str!("../../schemas/project.v1.json"))
        .expect("project schema is valid JSON");
    let schema: &'static Value = Box::leak(Box::new(schema));
    JSONSchema::options()
        .compile(schema)
        .expect("project schema compiles")
});

/// Validate a create/update payload against the project schema before any
/// store mutation. Failures surface as a 422 at the handler boundary.
pub fn validate_payload(payload: &Value) -> Result<()> {
    if let Err(errors) = PROJECT_SCHEMA.validate(payload) {
        let messages: Vec<String> = errors.map(|e| e.to_string()).collect();
        return Err(ServiceError::Validation(messages.join("; ")));
    }
    Ok(())
}

/// A persisted research project, keyed by acronym. This is the internally
/// authoritative shape; connector output is a distinct, registry-derived
/// shape and the two are not reconciled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub acronym: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "homePage")]
    pub home_page: String,
    /// Creator usernames; `?include=creator` expands them to full users
    pub creator: Vec<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(rename = "ontologyUsed", default, skip_serializing_if = "Vec::is_empty")]
    pub ontology_used: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grant_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// Incoming create/patch parameters. Every field is optional so the same
/// shape serves PUT/POST (schema-checked beforehand) and partial PATCH.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectParams {
    pub acronym: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "homePage")]
    pub home_page: Option<String>,
    pub creator: Option<Vec<String>>,
    #[serde(rename = "type")]
    pub project_type: Option<String>,
    pub source: Option<String>,
    #[serde(rename = "ontologyUsed")]
    pub ontology_used: Option<Vec<String>>,
    pub grant_number: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub logo: Option<String>,
}

impl Project {
    /// Build a new project from schema-validated params, stamping the
    /// created/updated times.
    pub fn from_params(acronym: String, params: ProjectParams) -> Result<Self> {
        let now = Utc::now();
        Ok(Self {
            acronym,
            name: params
                .name
                .ok_or_else(|| ServiceError::Validation("name is required".to_string()))?,
            description: params
                .description
                .ok_or_else(|| ServiceError::Validation("description is required".to_string()))?,
            home_page: params
                .home_page
                .ok_or_else(|| ServiceError::Validation("homePage is required".to_string()))?,
            creator: params.creator.unwrap_or_default(),
            project_type: params.project_type,
            source: params.source,
            ontology_used: params.ontology_used.unwrap_or_default(),
            grant_number: params.grant_number,
            start_date: params.start_date,
            end_date: params.end_date,
            logo: params.logo,
            created: now,
            updated: now,
        })
    }

    /// Apply a partial update, refreshing the updated stamp.
    pub fn apply(&mut self, params: ProjectParams) {
        if let Some(name) = params.name {
            self.name = name;
        }
        if let Some(description) = params.description {
            self.description = description;
        }
        if let Some(home_page) = params.home_page {
            self.home_page = home_page;
        }
        if let Some(creator) = params.creator {
            self.creator = creator;
        }
        if let Some(project_type) = params.project_type {
            self.project_type = Some(project_type);
        }
        if let Some(source) = params.source {
            self.source = Some(source);
        }
        if let Some(ontology_used) = params.ontology_used {
            self.ontology_used = ontology_used;
        }
        if let Some(grant_number) = params.grant_number {
            self.grant_number = Some(grant_number);
        }
        if let Some(start_date) = params.start_date {
            self.start_date = Some(start_date);
        }
        if let Some(end_date) = params.end_date {
            self.end_date = Some(end_date);
        }
        if let Some(logo) = params.logo {
            self.logo = Some(logo);
        }
        self.updated = Utc::now();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct UserParams {
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_payload() -> Value {
        json!({
            "acronym": "TP",
            "name": "Test Project",
            "description": "A test project",
            "homePage": "http://www.example.org",
            "creator": ["test_user"],
            "type": "FundedProject",
            "ontologyUsed": ["TST"]
        })
    }

    #[test]
    fn accepts_a_complete_payload() {
        assert!(validate_payload(&valid_payload()).is_ok());
    }

    #[test]
    fn rejects_a_payload_without_name() {
        let mut payload = valid_payload();
        payload.as_object_mut().unwrap().remove("name");
        let err = validate_payload(&payload).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn rejects_a_non_array_creator() {
        let mut payload = valid_payload();
        payload["creator"] = json!("not_a_list");
        assert!(validate_payload(&payload).is_err());
    }

    #[test]
    fn rejects_an_empty_creator_list() {
        let mut payload = valid_payload();
        payload["creator"] = json!([]);
        assert!(validate_payload(&payload).is_err());
    }

    #[test]
    fn patch_updates_only_the_provided_fields() {
        let mut project = Project::from_params(
            "TP".to_string(),
            serde_json::from_value(valid_payload()).unwrap(),
        )
        .unwrap();
        let before = project.created;

        project.apply(ProjectParams {
            description: Some("Updated description".to_string()),
            ..Default::default()
        });

        assert_eq!(project.name, "Test Project");
        assert_eq!(project.description, "Updated description");
        assert_eq!(project.created, before);
        assert!(project.updated >= before);
    }
}
