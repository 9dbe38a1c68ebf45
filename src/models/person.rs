// src/models/person.rs
// DOCUMENTATION: Person documents, request payloads and report rows
// PURPOSE: Typed view over the "person" collection

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Collection holding person documents
pub const PERSON_COLLECTION: &str = "person";

/// Address embedded in a person document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    #[serde(default)]
    pub city: String,
}

/// Person as stored in the document store
/// DOCUMENTATION: `addresses` is None when a query projected it out
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub age: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<Address>>,
}

/// Request body for POST /person
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePersonRequest {
    pub first_name: String,
    pub last_name: Option<String>,
    pub age: i32,
    #[serde(default)]
    pub addresses: Vec<Address>,
}

impl CreatePersonRequest {
    /// New document; the store assigns the identifier
    pub fn into_person(self) -> Person {
        Person {
            id: None,
            first_name: self.first_name,
            last_name: self.last_name,
            age: self.age,
            addresses: Some(self.addresses),
        }
    }
}

/// Person DTO for API responses
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonResponse {
    pub person_id: String,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub age: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<Address>>,
}

impl Person {
    /// Convert database person into API response DTO
    pub fn to_response(&self) -> PersonResponse {
        PersonResponse {
            person_id: self.id.map(|id| id.to_hex()).unwrap_or_default(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            age: self.age,
            addresses: self.addresses.clone(),
        }
    }
}

/// Query string for GET /person
#[derive(Debug, Deserialize)]
pub struct NamePrefixQuery {
    pub name: Option<String>,
}

/// Query string for GET /person/age
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeRangeQuery {
    pub min_age: i32,
    pub max_age: i32,
}

/// Query string for GET /person/search
/// DOCUMENTATION: Filters are optional; `sort` is "field[:asc|:desc],..."
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PersonSearchQuery {
    pub name: Option<String>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub city: Option<String>,

    /// Page index (0-based)
    #[validate(range(max = 1000000))]
    pub page: Option<u64>,

    /// Results per page
    #[validate(range(min = 1, max = 1000))]
    pub size: Option<u64>,

    pub sort: Option<String>,
}

/// Sortable request keys and the document fields they map to
pub const PERSON_SORT_FIELDS: &[(&str, &str)] = &[
    ("personId", "_id"),
    ("firstName", "firstName"),
    ("lastName", "lastName"),
    ("age", "age"),
];

/// One flattened (person, address) row of the oldest-per-city report
/// DOCUMENTATION: after unwinding, `addresses` holds a single address
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidentRow {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    pub age: i32,
    pub addresses: Address,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidentResponse {
    pub person_id: String,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub age: i32,
    pub addresses: Address,
}

impl ResidentRow {
    pub fn to_response(&self) -> ResidentResponse {
        ResidentResponse {
            person_id: self.id.map(|id| id.to_hex()).unwrap_or_default(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            age: self.age,
            addresses: self.addresses.clone(),
        }
    }
}

/// Output document of the oldest-per-city pipeline
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OldestPersonDocument {
    #[serde(default)]
    pub city: Option<String>,
    pub oldest_person: ResidentRow,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OldestPersonByCity {
    pub city: Option<String>,
    pub oldest_person: ResidentResponse,
}

impl OldestPersonDocument {
    pub fn to_response(&self) -> OldestPersonByCity {
        OldestPersonByCity {
            city: self.city.clone(),
            oldest_person: self.oldest_person.to_response(),
        }
    }
}

/// Output of the population-per-city pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityPopulation {
    #[serde(default)]
    pub city: Option<String>,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{self, doc};

    #[test]
    fn test_person_document_shape() {
        let person = CreatePersonRequest {
            first_name: "Alice".into(),
            last_name: None,
            age: 31,
            addresses: vec![Address {
                address1: Some("1 Main St".into()),
                address2: None,
                city: "Oslo".into(),
            }],
        }
        .into_person();

        let document = bson::to_document(&person).unwrap();
        assert_eq!(
            document,
            doc! {
                "firstName": "Alice",
                "age": 31,
                "addresses": [ { "address1": "1 Main St", "city": "Oslo" } ]
            }
        );
    }

    #[test]
    fn test_projected_person_has_no_addresses() {
        let id = ObjectId::new();
        let person: Person =
            bson::from_document(doc! { "_id": id, "firstName": "Bo", "age": 4 }).unwrap();
        let response = person.to_response();

        assert_eq!(response.person_id, id.to_hex());
        assert!(response.addresses.is_none());
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("addresses").is_none());
        assert_eq!(json["firstName"], "Bo");
    }

    #[test]
    fn test_oldest_person_document_decodes_unwound_row() {
        let id = ObjectId::new();
        let document = doc! {
            "city": "Rome",
            "oldestPerson": {
                "_id": id, "firstName": "Gia", "age": 88,
                "addresses": { "city": "Rome" }
            }
        };
        let row: OldestPersonDocument = bson::from_document(document).unwrap();
        let response = row.to_response();
        assert_eq!(response.city.as_deref(), Some("Rome"));
        assert_eq!(response.oldest_person.age, 88);
        assert_eq!(response.oldest_person.addresses.city, "Rome");
    }

    #[test]
    fn test_search_query_validation() {
        let ok = PersonSearchQuery {
            size: Some(10),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let zero = PersonSearchQuery {
            size: Some(0),
            ..Default::default()
        };
        assert!(zero.validate().is_err());
    }
}
