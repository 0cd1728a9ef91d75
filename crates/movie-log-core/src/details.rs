use movie_log_models::PriorViewing;
use serde_json::{json, Value};

/// Annotate an upstream details record with what the log knows about the title.
/// `prior` is expected most recent first. Non-object payloads pass through untouched.
pub fn enrich_details(mut details: Value, prior: &[PriorViewing]) -> Value {
    let Some(fields) = details.as_object_mut() else {
        return details;
    };

    match prior.first() {
        None => {
            fields.insert("firstViewing".to_string(), Value::Bool(true));
        }
        Some(latest) => {
            fields.insert("firstViewing".to_string(), Value::Bool(false));
            fields.insert("previousGenre".to_string(), json!(latest.movie_genre));
            fields.insert(
                "previousViewings".to_string(),
                serde_json::to_value(prior).unwrap_or_else(|_| Value::Array(Vec::new())),
            );
        }
    }
    details
}
