use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{ClientStatus, Sex};

/// A persisted client identity, independent of any single analysis run.
/// Created at most once per resolved patient; archived, never deleted.
///
/// `name` is the required identity key: the client resolver rejects a
/// candidate pool containing a record with a blank name as a caller
/// contract violation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: Uuid,
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub sex: Option<Sex>,
    pub status: ClientStatus,
    pub notes: Option<String>,
}

impl ClientRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            date_of_birth: None,
            sex: None,
            status: ClientStatus::Active,
            notes: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_client_is_active() {
        let client = ClientRecord::new("Jane Doe");
        assert_eq!(client.name, "Jane Doe");
        assert_eq!(client.status, ClientStatus::Active);
        assert!(client.date_of_birth.is_none());
    }
}
