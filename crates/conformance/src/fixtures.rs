//! Fixture types for the conformance suite.
//!
//! Between them they cover every field shape the default encoder knows:
//! bool, int, double, string, nested object, list of objects and map of
//! objects, plus the URL and string-collection pass-throughs.

use std::collections::BTreeMap;

use jsonbind_core::url::Url;
use jsonbind_core::{encodable, DecodeError, Decodable, FieldReader};
use serde_json::Value;

/// The workhorse fixture: two scalar fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub name: String,
    pub age: i64,
}

encodable!(Person { name, age });

impl Decodable for Person {
    fn decode(json: &Value) -> Result<Self, DecodeError> {
        let fields = FieldReader::new(json);
        Ok(Person {
            name: fields.string("name")?,
            age: fields.int("age")?,
        })
    }
}

/// `Person` plus a required `email`, for missing-key scenarios.
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub name: String,
    pub age: i64,
    pub email: String,
}

encodable!(Contact { name, age, email });

impl Decodable for Contact {
    fn decode(json: &Value) -> Result<Self, DecodeError> {
        let fields = FieldReader::new(json);
        Ok(Contact {
            name: fields.string("name")?,
            age: fields.int("age")?,
            email: fields.string("email")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tagged {
    pub id: i64,
    pub tags: Vec<String>,
}

encodable!(Tagged { id, tags });

impl Decodable for Tagged {
    fn decode(json: &Value) -> Result<Self, DecodeError> {
        let fields = FieldReader::new(json);
        Ok(Tagged {
            id: fields.int("id")?,
            tags: fields.string_array("tags")?,
        })
    }
}

/// Every recognized shape in one struct.
#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    pub active: bool,
    pub size: i64,
    pub rating: f64,
    pub name: String,
    pub homepage: Url,
    pub lead: Person,
    pub members: Vec<Person>,
    pub by_role: BTreeMap<String, Person>,
    pub labels: BTreeMap<String, String>,
    pub motto: Option<String>,
}

encodable!(Team {
    active,
    size,
    rating,
    name,
    homepage,
    lead,
    members,
    by_role as "byRole",
    labels,
    motto,
});

impl Decodable for Team {
    fn decode(json: &Value) -> Result<Self, DecodeError> {
        let fields = FieldReader::new(json);
        Ok(Team {
            active: fields.bool("active")?,
            size: fields.int("size")?,
            rating: fields.double("rating")?,
            name: fields.string("name")?,
            homepage: fields.url("homepage")?,
            lead: fields.decodable("lead")?,
            members: fields.decodable_array("members")?,
            by_role: fields.decodable_map("byRole")?,
            labels: fields.string_map("labels")?,
            motto: fields.optional("motto")?,
        })
    }
}

pub fn ada() -> Person {
    Person {
        name: "Ada".to_string(),
        age: 36,
    }
}

pub fn alan() -> Person {
    Person {
        name: "Alan".to_string(),
        age: 41,
    }
}

pub fn team() -> Team {
    let mut by_role = BTreeMap::new();
    by_role.insert("lead".to_string(), ada());
    by_role.insert("reviewer".to_string(), alan());

    let mut labels = BTreeMap::new();
    labels.insert("area".to_string(), "analytics".to_string());

    Team {
        active: true,
        size: 2,
        rating: 4.75,
        name: "Engines".to_string(),
        homepage: Url::parse("https://example.com/engines").expect("fixture url parses"),
        lead: ada(),
        members: vec![ada(), alan()],
        by_role,
        labels,
        motto: None,
    }
}
