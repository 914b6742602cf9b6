//! Push-notification envelope decoding.
//!
//! A storage-change notification arrives as `{"message":{"data":"<base64>"}}` where the data
//! decodes to a JSON object carrying at least `bucket` and `name`.

use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine as _;
use serde::Deserialize;
use serde_json::Value;
use tabload_core::AppError;

#[derive(Debug, Default, Deserialize)]
pub struct PushEnvelope {
    #[serde(default)]
    pub message: Option<PushMessage>,
    #[serde(default)]
    pub subscription: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PushMessage {
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default, alias = "messageId")]
    pub message_id: Option<String>,
}

/// Object-change event. Only `bucket` and `name` are required; the rest is kept for logs.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StorageEvent {
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "contentType")]
    pub content_type: Option<String>,
    /// Sent as a string by some producers, a number by others.
    #[serde(default)]
    pub size: Option<Value>,
    #[serde(default)]
    pub generation: Option<Value>,
}

impl PushEnvelope {
    /// Parse a request body. Anything that is not a JSON envelope yields an empty envelope.
    pub fn parse_lenient(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    pub fn message_id(&self) -> Option<&str> {
        self.message.as_ref()?.message_id.as_deref()
    }

    /// Decode `message.data` into raw event bytes.
    pub fn decode_data(&self) -> Result<Vec<u8>, AppError> {
        let data = self
            .message
            .as_ref()
            .and_then(|m| m.data.as_deref())
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or_else(|| {
                AppError::MissingEnvelopeData("message.data is missing or empty".to_string())
            })?;

        STANDARD
            .decode(data)
            .or_else(|_| URL_SAFE.decode(data))
            .or_else(|_| URL_SAFE_NO_PAD.decode(data))
            .map_err(|e| AppError::MissingEnvelopeData(format!("message.data is not base64: {}", e)))
    }

    /// Decode the event and require `bucket` and `name`.
    ///
    /// On failure the partially decoded event is returned alongside the error so the attempt
    /// can still be logged against whatever bucket/name were present.
    pub fn decode_event(&self) -> Result<StorageEvent, (AppError, StorageEvent)> {
        let raw = self
            .decode_data()
            .map_err(|e| (e, StorageEvent::default()))?;

        let event: StorageEvent = serde_json::from_slice(&raw).map_err(|e| {
            (
                AppError::MissingEventFields(format!("event payload is not a JSON object: {}", e)),
                StorageEvent::default(),
            )
        })?;

        let mut missing = Vec::new();
        if event.bucket.trim().is_empty() {
            missing.push("bucket");
        }
        if event.name.trim().is_empty() {
            missing.push("name");
        }
        if !missing.is_empty() {
            let err = AppError::MissingEventFields(format!("{} is blank", missing.join(" and ")));
            return Err((err, event));
        }

        Ok(event)
    }
}

impl StorageEvent {
    pub fn size_display(&self) -> String {
        match &self.size {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "-".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope_for(event: &Value) -> Vec<u8> {
        let data = STANDARD.encode(event.to_string());
        serde_json::json!({ "message": { "data": data, "messageId": "42" } })
            .to_string()
            .into_bytes()
    }

    #[test]
    fn test_decode_event() {
        let body = envelope_for(&serde_json::json!({
            "bucket": "b",
            "name": "incoming/sales.csv",
            "contentType": "text/csv",
            "size": "27"
        }));
        let envelope = PushEnvelope::parse_lenient(&body);
        assert_eq!(envelope.message_id(), Some("42"));

        let event = envelope.decode_event().unwrap();
        assert_eq!(event.bucket, "b");
        assert_eq!(event.name, "incoming/sales.csv");
        assert_eq!(event.content_type.as_deref(), Some("text/csv"));
        assert_eq!(event.size_display(), "27");
    }

    #[test]
    fn test_unparsable_body_is_empty_envelope() {
        let envelope = PushEnvelope::parse_lenient(b"not json at all");
        assert!(envelope.message.is_none());
        let (err, _) = envelope.decode_event().unwrap_err();
        assert!(matches!(err, AppError::MissingEnvelopeData(_)));
    }

    #[test]
    fn test_missing_nested_data() {
        let envelope = PushEnvelope::parse_lenient(br#"{"message":{}}"#);
        let (err, _) = envelope.decode_event().unwrap_err();
        assert!(matches!(err, AppError::MissingEnvelopeData(_)));

        let envelope = PushEnvelope::parse_lenient(br#"{"message":{"data":"   "}}"#);
        assert!(matches!(
            envelope.decode_event().unwrap_err().0,
            AppError::MissingEnvelopeData(_)
        ));
    }

    #[test]
    fn test_undecodable_data() {
        let envelope = PushEnvelope::parse_lenient(br#"{"message":{"data":"%%%"}}"#);
        assert!(matches!(
            envelope.decode_event().unwrap_err().0,
            AppError::MissingEnvelopeData(_)
        ));
    }

    #[test]
    fn test_url_safe_alphabet_accepted() {
        let payload = serde_json::json!({ "bucket": "b", "name": "a?b>.csv" }).to_string();
        let data = URL_SAFE.encode(payload);
        let body = serde_json::json!({ "message": { "data": data } }).to_string();
        let event = PushEnvelope::parse_lenient(body.as_bytes()).decode_event().unwrap();
        assert_eq!(event.name, "a?b>.csv");
    }

    #[test]
    fn test_blank_name_keeps_bucket() {
        let body = envelope_for(&serde_json::json!({ "bucket": "b", "name": "" }));
        let (err, partial) = PushEnvelope::parse_lenient(&body).decode_event().unwrap_err();
        assert!(matches!(err, AppError::MissingEventFields(ref m) if m == "name is blank"));
        assert_eq!(partial.bucket, "b");
    }

    #[test]
    fn test_non_object_event_is_missing_fields() {
        let data = STANDARD.encode("[1,2,3]");
        let body = serde_json::json!({ "message": { "data": data } }).to_string();
        let (err, _) = PushEnvelope::parse_lenient(body.as_bytes())
            .decode_event()
            .unwrap_err();
        assert!(matches!(err, AppError::MissingEventFields(_)));
    }
}
