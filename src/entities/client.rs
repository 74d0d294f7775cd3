//! Client entity - a subscriber receiving telecom service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Record;
use crate::core::identity::new_record_id;

/// Editable client fields, as captured by the client form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientDraft {
    pub name: String,
    pub identification: String,
    pub phone: String,
    pub address: String,
}

/// A registered client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Unique identifier
    pub id: String,

    /// Full name
    pub name: String,

    /// National identification number (digits only when entered via the form)
    pub identification: String,

    /// Contact phone
    pub phone: String,

    /// Service address
    pub address: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Record for Client {
    const KEY: &'static str = "clients";

    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

impl Client {
    /// Create a new client from form fields
    pub fn new(draft: ClientDraft) -> Self {
        let now = Utc::now();
        Self {
            id: new_record_id(),
            name: draft.name,
            identification: draft.identification,
            phone: draft.phone,
            address: draft.address,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace every editable field with the draft's values
    pub fn apply(&mut self, draft: ClientDraft) {
        self.name = draft.name;
        self.identification = draft.identification;
        self.phone = draft.phone;
        self.address = draft.address;
    }

    /// Current field values as a draft, for partial edits
    pub fn to_draft(&self) -> ClientDraft {
        ClientDraft {
            name: self.name.clone(),
            identification: self.identification.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ClientDraft {
        ClientDraft {
            name: "María García López".to_string(),
            identification: "12345678".to_string(),
            phone: "+57 300 111 2222".to_string(),
            address: "Calle 123 #45-67, Bogotá".to_string(),
        }
    }

    #[test]
    fn test_client_creation() {
        let client = Client::new(draft());
        assert_eq!(client.id.len(), 26);
        assert_eq!(client.name, "María García López");
        assert_eq!(client.created_at, client.updated_at);
    }

    #[test]
    fn test_client_json_uses_camel_case() {
        let client = Client::new(draft());
        let json = serde_json::to_value(&client).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn test_client_reads_browser_dates() {
        let json = r#"{
            "id": "1",
            "name": "Ana",
            "identification": "45678912",
            "phone": "+57 302 555 6666",
            "address": "Cali",
            "createdAt": "2024-03-10T00:00:00.000Z",
            "updatedAt": "2024-03-10T00:00:00.000Z"
        }"#;
        let client: Client = serde_json::from_str(json).unwrap();
        assert_eq!(client.id, "1");
        assert_eq!(client.created_at.format("%Y-%m-%d").to_string(), "2024-03-10");
    }

    #[test]
    fn test_apply_replaces_all_fields() {
        let mut client = Client::new(draft());
        client.apply(ClientDraft {
            name: "Ana".to_string(),
            identification: "999999".to_string(),
            phone: "3001112222".to_string(),
            address: "Cali".to_string(),
        });
        assert_eq!(client.name, "Ana");
        assert_eq!(client.identification, "999999");
        assert_eq!(client.phone, "3001112222");
        assert_eq!(client.address, "Cali");
    }
}
