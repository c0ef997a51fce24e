use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::{NumberKind, SchemaConfig, StatusKind};
use crate::extract::PageReference;

/// The subset of a Notion page object this tool reads back.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub id: String,
}

/// Response shape of a database query.
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    pub results: Vec<Page>,
}

/// Error body returned by the Notion API on non-2xx responses. Only the
/// human-readable message is surfaced.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: Option<String>,
}

/// Equality filter on the configured PR-number property, shaped to match
/// how that property is typed in the target database.
pub fn number_filter(schema: &SchemaConfig, pr_number: u64) -> Value {
    match schema.number_kind {
        NumberKind::Number => json!({
            "property": schema.number,
            "number": { "equals": pr_number },
        }),
        NumberKind::RichText => json!({
            "property": schema.number,
            "rich_text": { "equals": pr_number.to_string() },
        }),
    }
}

pub fn title_value(text: &str) -> Value {
    json!({ "title": [{ "text": { "content": text } }] })
}

pub fn url_value(url: &str) -> Value {
    json!({ "url": url })
}

pub fn rich_text_value(text: &str) -> Value {
    json!({ "rich_text": [{ "text": { "content": text } }] })
}

pub fn date_value(start: &str) -> Value {
    json!({ "date": { "start": start } })
}

pub fn number_value(schema: &SchemaConfig, pr_number: u64) -> Value {
    match schema.number_kind {
        NumberKind::Number => json!({ "number": pr_number }),
        NumberKind::RichText => rich_text_value(&pr_number.to_string()),
    }
}

pub fn status_value(schema: &SchemaConfig, name: &str) -> Value {
    match schema.status_kind {
        StatusKind::Status => json!({ "status": { "name": name } }),
        StatusKind::Select => json!({ "select": { "name": name } }),
    }
}

pub fn relation_value(refs: &[PageReference]) -> Value {
    let ids: Vec<Value> = refs.iter().map(|r| json!({ "id": r.as_str() })).collect();
    json!({ "relation": ids })
}
