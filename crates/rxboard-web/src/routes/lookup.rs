//! Patient relationship lookup pages.

use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use rxboard_core::lookup::{FamilyRelationship, Patient};
use rxboard_core::LookupOutcome;
use serde::Deserialize;
use serde_json::Value;
use tracing::error;

use crate::state::LookupState;

// ============================================================
// TEMPLATES
// ============================================================

#[derive(Template)]
#[template(path = "lookup.html")]
struct LookupFormTemplate {
    pid: String,
    error: Option<String>,
}

#[derive(Template)]
#[template(path = "relationships.html")]
struct RelationshipsTemplate {
    pid: String,
    patient: Option<PatientView>,
    relationships: Vec<RelationshipView>,
    error: Option<String>,
}

struct FieldView {
    key: String,
    value: String,
}

/// View model for a patient.
struct PatientView {
    pid: String,
    name: String,
    birth_date: String,
    gender: String,
    extra: Vec<FieldView>,
}

/// View model for a relationship row.
struct RelationshipView {
    pair_code: String,
    relationship: String,
    counterpart: String,
}

const MISSING: &str = "-";

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => MISSING.to_string(),
        other => other.to_string(),
    }
}

fn fields(extra: &std::collections::BTreeMap<String, Value>) -> Vec<FieldView> {
    extra
        .iter()
        .map(|(key, value)| FieldView {
            key: key.clone(),
            value: display_value(value),
        })
        .collect()
}

impl PatientView {
    fn from_patient(patient: &Patient) -> Self {
        let or_missing = |v: &Option<String>| v.clone().unwrap_or_else(|| MISSING.to_string());
        Self {
            pid: patient.pid.clone(),
            name: or_missing(&patient.name),
            birth_date: or_missing(&patient.birth_date),
            gender: or_missing(&patient.gender),
            extra: fields(&patient.extra),
        }
    }
}

impl RelationshipView {
    fn from_relationship(rel: &FamilyRelationship, pid: &str) -> Self {
        Self {
            pair_code: rel.pair_code.clone(),
            relationship: rel
                .relationship
                .clone()
                .unwrap_or_else(|| MISSING.to_string()),
            counterpart: rel
                .counterpart(pid)
                .unwrap_or_else(|| MISSING.to_string()),
        }
    }
}

// ============================================================
// REQUEST TYPES
// ============================================================

#[derive(Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub pid: String,
}

// ============================================================
// HANDLERS
// ============================================================

/// GET / - Search form.
pub async fn form() -> Response {
    render(
        StatusCode::OK,
        LookupFormTemplate {
            pid: String::new(),
            error: None,
        },
    )
}

/// POST /search - Look up a patient and their family relationships.
pub async fn search(State(state): State<LookupState>, Form(form): Form<SearchForm>) -> Response {
    let outcome = match state.lookup.lookup(&form.pid).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, pid = %form.pid, "Lookup failed");
            return render(
                StatusCode::INTERNAL_SERVER_ERROR,
                RelationshipsTemplate {
                    pid: form.pid.trim().to_string(),
                    patient: None,
                    relationships: Vec::new(),
                    error: Some("Error retrieving data".to_string()),
                },
            );
        }
    };

    match outcome {
        LookupOutcome::InvalidPid => render(
            StatusCode::BAD_REQUEST,
            LookupFormTemplate {
                pid: String::new(),
                error: Some("Please enter a patient ID".to_string()),
            },
        ),
        LookupOutcome::NotFound { pid } => render(
            StatusCode::OK,
            RelationshipsTemplate {
                pid,
                patient: None,
                relationships: Vec::new(),
                error: Some("Patient not found".to_string()),
            },
        ),
        LookupOutcome::Found {
            patient,
            relationships,
        } => render(
            StatusCode::OK,
            RelationshipsTemplate {
                pid: patient.pid.clone(),
                relationships: relationships
                    .iter()
                    .map(|rel| RelationshipView::from_relationship(rel, &patient.pid))
                    .collect(),
                patient: Some(PatientView::from_patient(&patient)),
                error: None,
            },
        ),
    }
}

fn render(status: StatusCode, template: impl Template) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(format!("Template error: {}", e))).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_lookup_router;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use rxboard_core::store::MemoryStore;
    use rxboard_core::LookupService;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn app() -> axum::Router {
        let store = Arc::new(MemoryStore::new());
        let mut patient = Patient::new("A001").with_name("林美玲");
        patient.gender = Some("F".to_string());
        patient
            .extra
            .insert("ward".to_string(), Value::String("5B".to_string()));
        store.insert_patient(patient).await;
        store.insert_patient(Patient::new("B002").with_name("林志明")).await;
        store
            .insert_relationship(FamilyRelationship::new("B002-A001", Some("daughter")))
            .await;
        create_lookup_router(LookupState::new(LookupService::new(store)))
    }

    async fn search_body(pid: &str) -> (StatusCode, String) {
        let response = app()
            .await
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/search")
                    .header("Content-Type", "application/x-www-form-urlencoded")
                    .body(Body::from(format!("pid={}", pid)))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_form_renders() {
        let response = app()
            .await
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_search_found() {
        let (status, body) = search_body("A001").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("林美玲"));
        assert!(body.contains("B002-A001"));
        assert!(body.contains("daughter"));
        assert!(body.contains("ward"));
        assert!(!body.contains("Patient not found"));
    }

    #[tokio::test]
    async fn test_search_not_found_is_in_page_message() {
        let (status, body) = search_body("Z999").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Patient not found"));
        assert!(body.contains("Z999"));
    }

    #[tokio::test]
    async fn test_search_blank_pid() {
        let (status, body) = search_body("").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Please enter a patient ID"));
    }
}
