use serde::{Deserialize, Serialize};

use super::{CompanyRecord, ContactRecord};

/// Typed batch handed to the sync pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncBatch {
    #[serde(default)]
    pub companies: Vec<CompanyRecord>,
    #[serde(default)]
    pub contacts: Vec<ContactRecord>,
}

/// Every external representation accepted by the ingestion boundary.
///
/// Variant order matters: the CloudEvent envelope is tried before the plain
/// batch because a batch object with defaulted lists matches any JSON object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SyncPayload {
    CloudEvent(CloudEventEnvelope),
    Batch(SyncBatch),
    /// A JSON document delivered as a string, e.g. a queue message body.
    Encoded(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloudEventEnvelope {
    pub specversion: String,
    #[serde(default, rename = "type")]
    pub event_type: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    pub data: Box<SyncPayload>,
}

impl SyncPayload {
    pub fn into_batch(self) -> Result<SyncBatch, serde_json::Error> {
        match self {
            SyncPayload::Batch(batch) => Ok(batch),
            SyncPayload::CloudEvent(envelope) => {
                tracing::debug!(
                    "Unwrapping CloudEvent (specversion={}, type={:?}, source={:?})",
                    envelope.specversion,
                    envelope.event_type,
                    envelope.source
                );
                envelope.data.into_batch()
            }
            SyncPayload::Encoded(raw) => serde_json::from_str::<SyncPayload>(&raw)?.into_batch(),
        }
    }

    pub fn from_slice(bytes: &[u8]) -> Result<SyncBatch, serde_json::Error> {
        serde_json::from_slice::<SyncPayload>(bytes)?.into_batch()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "companies": [{"accountId": 1, "accountName": "Acme Corp", "crmToErpFlag": true, "status": "active"}],
            "contacts": [{"contactId": "C-1", "accountId": 1, "email": "john@acme.com", "cshmeFlag": null}]
        })
    }

    #[test]
    fn test_plain_batch() {
        let batch = SyncPayload::from_slice(sample().to_string().as_bytes()).unwrap();
        assert_eq!(batch.companies.len(), 1);
        assert_eq!(batch.companies[0].account_id.as_deref(), Some("1"));
        assert!(batch.companies[0].sync_flag);
        assert_eq!(batch.contacts[0].account_id.as_deref(), Some("1"));
        assert!(!batch.contacts[0].cshme_flag);
    }

    #[test]
    fn test_cloud_event_envelope() {
        let event = json!({
            "specversion": "1.0",
            "type": "crm.sync.requested",
            "source": "crm",
            "data": sample()
        });
        let batch = SyncPayload::from_slice(event.to_string().as_bytes()).unwrap();
        assert_eq!(batch.companies[0].account_name.as_deref(), Some("Acme Corp"));
        assert_eq!(batch.contacts[0].email.as_deref(), Some("john@acme.com"));
    }

    #[test]
    fn test_encoded_string_inside_cloud_event() {
        let event = json!({
            "specversion": "1.0",
            "data": sample().to_string()
        });
        let batch = SyncPayload::from_slice(event.to_string().as_bytes()).unwrap();
        assert_eq!(batch.companies.len(), 1);
        assert_eq!(batch.contacts.len(), 1);
    }

    #[test]
    fn test_rejects_arrays() {
        assert!(SyncPayload::from_slice(b"[1, 2, 3]").is_err());
        assert!(SyncPayload::from_slice(b"\"not json\"").is_err());
    }
}
