//! Topic dispatch and message processing

use serde::Serialize;
use serde_json::{json, Map, Value};
use spamguard_client::PredictionApi;
use spamguard_core::{BatchResponse, ClassificationRequest, Error, Result};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::publisher::Publisher;
use crate::topics;

/// Classifies inbound bus messages through the prediction API
pub struct MessageRouter {
    api: Arc<dyn PredictionApi>,
    publisher: Arc<dyn Publisher>,
}

impl MessageRouter {
    pub fn new(api: Arc<dyn PredictionApi>, publisher: Arc<dyn Publisher>) -> Self {
        Self { api, publisher }
    }

    /// Route one inbound message by topic
    pub async fn handle(&self, topic: &str, payload: &[u8]) {
        debug!("Received {} bytes on {}", payload.len(), topic);

        match topic {
            topics::INCOMING => {
                metrics::counter!("spamguard_router_messages_total", "topic" => topics::INCOMING)
                    .increment(1);
                if let Err(e) = self.process_single(payload).await {
                    warn!("Failed to process message on {}: {}", topic, e);
                    metrics::counter!("spamguard_router_failures_total", "path" => "single")
                        .increment(1);
                    self.report_error(topic, &e).await;
                }
            }
            topics::BATCH => {
                metrics::counter!("spamguard_router_messages_total", "topic" => topics::BATCH)
                    .increment(1);
                // batch failures are only logged, never published
                if let Err(e) = self.process_batch(payload).await {
                    error!("Batch processing failed: {}", e);
                    metrics::counter!("spamguard_router_failures_total", "path" => "batch")
                        .increment(1);
                }
            }
            other => warn!("Ignoring message on unexpected topic {}", other),
        }
    }

    /// Classify a single message and fan the outcome out to the result topics.
    ///
    /// Only decode and prediction failures are returned. Once a verdict
    /// exists it is never followed by an error report, so a failed
    /// publication is logged instead.
    pub async fn process_single(&self, payload: &[u8]) -> Result<bool> {
        let (fields, request) = decode_single(payload)?;
        let result = self.api.predict(&request).await?;

        let mut classified = fields.clone();
        if let Value::Object(result_fields) = serde_json::to_value(&result)? {
            classified.extend(result_fields);
        }
        classified.insert("timestamp".to_string(), json!(unix_timestamp()));
        self.publish_or_log(topics::CLASSIFIED, &classified).await;

        let verdict_topic = if result.is_spam { topics::SPAM } else { topics::HAM };
        self.publish_or_log(verdict_topic, &fields).await;

        info!(
            user_id = request.user_id.as_deref().unwrap_or("-"),
            confidence = result.confidence,
            "Routed message to {}",
            verdict_topic
        );
        Ok(result.is_spam)
    }

    /// Classify a batch and publish the API response as-is
    pub async fn process_batch(&self, payload: &[u8]) -> Result<BatchResponse> {
        let requests = decode_batch(payload)?;
        let response = self.api.batch_predict(&requests).await?;

        self.publish_json(topics::BATCH_RESULTS, &response).await?;
        info!(
            "Published batch of {} results ({} spam)",
            response.total,
            response.spam_count()
        );
        Ok(response)
    }

    async fn report_error(&self, topic: &str, err: &Error) {
        let body = json!({ "error": err.to_string(), "topic": topic });
        if let Err(e) = self.publish_json(topics::ERROR, &body).await {
            error!("Failed to publish error report: {}", e);
        }
    }

    async fn publish_or_log<T: Serialize + ?Sized>(&self, topic: &str, value: &T) {
        if let Err(e) = self.publish_json(topic, value).await {
            error!("Failed to publish to {}: {}", topic, e);
            metrics::counter!("spamguard_router_publish_failures_total", "topic" => topic.to_string())
                .increment(1);
        }
    }

    async fn publish_json<T: Serialize + ?Sized>(&self, topic: &str, value: &T) -> Result<()> {
        let payload = serde_json::to_vec(value)?;
        self.publisher.publish(topic, payload).await
    }
}

fn unix_timestamp() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Decode a single-message payload.
///
/// The payload must be a JSON object. A missing or null `text` classifies as
/// the empty string; `user_id` is passed through when present.
pub fn decode_single(payload: &[u8]) -> Result<(Map<String, Value>, ClassificationRequest)> {
    let value: Value = serde_json::from_slice(payload)
        .map_err(|e| Error::decode(format!("invalid JSON payload: {}", e)))?;

    let Value::Object(fields) = value else {
        return Err(Error::decode("payload must be a JSON object"));
    };

    let request = request_from_fields(&fields)?;
    Ok((fields, request))
}

/// Decode a batch payload of the form `{"messages": [...]}`.
///
/// Entries may be objects shaped like single messages or bare strings. A
/// missing `messages` field is an empty batch.
pub fn decode_batch(payload: &[u8]) -> Result<Vec<ClassificationRequest>> {
    let value: Value = serde_json::from_slice(payload)
        .map_err(|e| Error::decode(format!("invalid JSON payload: {}", e)))?;

    let Value::Object(fields) = value else {
        return Err(Error::decode("payload must be a JSON object"));
    };

    let messages = match fields.get("messages") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(Error::decode("field `messages` must be a list")),
    };

    messages
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::String(text) => Ok(ClassificationRequest::new(text.clone())),
            Value::Object(fields) => request_from_fields(fields),
            _ => Err(Error::decode(format!(
                "messages[{}] must be an object or a string",
                i
            ))),
        })
        .collect()
}

fn request_from_fields(fields: &Map<String, Value>) -> Result<ClassificationRequest> {
    let text = match fields.get("text") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(_) => return Err(Error::decode("field `text` must be a string")),
    };

    let user_id = match fields.get("user_id") {
        None | Some(Value::Null) => None,
        Some(Value::String(id)) => Some(id.clone()),
        Some(other) => Some(other.to_string()),
    };

    Ok(ClassificationRequest { text, user_id })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_single_defaults_text() {
        let (fields, request) = decode_single(br#"{"user_id": "u1", "channel": "sms"}"#).unwrap();
        assert_eq!(request.text, "");
        assert_eq!(request.user_id.as_deref(), Some("u1"));
        assert_eq!(fields["channel"], "sms");

        let (_, request) = decode_single(br#"{"text": null}"#).unwrap();
        assert_eq!(request.text, "");
    }

    #[test]
    fn test_decode_single_numeric_user_id() {
        let (_, request) = decode_single(br#"{"text": "hi", "user_id": 42}"#).unwrap();
        assert_eq!(request.user_id.as_deref(), Some("42"));
    }

    #[test]
    fn test_decode_single_rejects_malformed() {
        for payload in [&b"not json"[..], b"[1, 2]", b"\"text\"", br#"{"text": 5}"#] {
            let err = decode_single(payload).unwrap_err();
            assert_eq!(err.kind(), "decode");
        }
    }

    #[test]
    fn test_decode_batch_shapes() {
        let requests =
            decode_batch(br#"{"messages": ["plain", {"text": "obj", "user_id": "u"}, {}]}"#)
                .unwrap();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0], ClassificationRequest::new("plain"));
        assert_eq!(requests[1], ClassificationRequest::new("obj").with_user("u"));
        assert_eq!(requests[2].text, "");

        assert!(decode_batch(b"{}").unwrap().is_empty());
        assert!(decode_batch(br#"{"messages": 3}"#).is_err());
        assert!(decode_batch(br#"{"messages": [true]}"#).is_err());
    }
}
