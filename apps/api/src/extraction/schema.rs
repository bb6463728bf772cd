//! Extraction Schema: the output contract for vacancy parsing, written out by hand.
//!
//! The field table is plain data so the contract can be inspected and tested on
//! its own. The JSON schema sent to the provider is derived from it once.

use std::sync::OnceLock;

use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Boolean,
    StringArray,
}

impl FieldKind {
    fn json_type(self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Boolean => "boolean",
            FieldKind::StringArray => "array",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Integer => value.is_i64() || value.is_u64(),
            FieldKind::Boolean => value.is_boolean(),
            FieldKind::StringArray => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Non-required fields may be `null`; they are still always present.
    pub required: bool,
    pub description: &'static str,
}

pub const VACANCY_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "isVacancy",
        kind: FieldKind::Boolean,
        required: true,
        description: "False if spam, advertisement or anything that is not a job posting",
    },
    FieldSpec {
        name: "title",
        kind: FieldKind::String,
        required: true,
        description: "Job title; never empty when isVacancy is true",
    },
    FieldSpec {
        name: "company",
        kind: FieldKind::String,
        required: true,
        description: "Company name if mentioned",
    },
    FieldSpec {
        name: "salaryMin",
        kind: FieldKind::Integer,
        required: true,
        description: "Minimum salary as a bare number (0 if not specified)",
    },
    FieldSpec {
        name: "salaryMax",
        kind: FieldKind::Integer,
        required: true,
        description: "Maximum salary as a bare number (0 if not specified)",
    },
    FieldSpec {
        name: "currency",
        kind: FieldKind::String,
        required: true,
        description: "Currency code (USD, EUR, RUB, etc.)",
    },
    FieldSpec {
        name: "skills",
        kind: FieldKind::StringArray,
        required: true,
        description: "Required skills/technologies as short keywords",
    },
    FieldSpec {
        name: "isRemote",
        kind: FieldKind::Boolean,
        required: true,
        description: "Whether remote work is available",
    },
    FieldSpec {
        name: "grade",
        kind: FieldKind::String,
        required: true,
        description: "Junior, Middle, Senior, Lead, Principal",
    },
    FieldSpec {
        name: "location",
        kind: FieldKind::String,
        required: true,
        description: "Office location if mentioned",
    },
    FieldSpec {
        name: "description",
        kind: FieldKind::String,
        required: true,
        description: "Brief job description",
    },
];

/// Builds a strict-mode JSON schema: every property listed in `required`,
/// no additional properties, optional fields expressed as nullable.
pub fn to_json_schema(fields: &[FieldSpec]) -> Value {
    let mut properties = Map::new();
    for field in fields {
        let ty = if field.required {
            json!(field.kind.json_type())
        } else {
            json!([field.kind.json_type(), "null"])
        };
        let mut prop = json!({
            "type": ty,
            "description": field.description,
        });
        if field.kind == FieldKind::StringArray {
            prop["items"] = json!({ "type": "string" });
        }
        properties.insert(field.name.to_string(), prop);
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": fields.iter().map(|f| f.name).collect::<Vec<_>>(),
        "additionalProperties": false,
    })
}

/// The vacancy schema, built on first use.
pub fn vacancy_schema() -> &'static Value {
    static SCHEMA: OnceLock<Value> = OnceLock::new();
    SCHEMA.get_or_init(|| to_json_schema(VACANCY_FIELDS))
}

/// Lists every way `value` departs from the field table. Empty means conforming.
pub fn check_conformance(fields: &[FieldSpec], value: &Value) -> Vec<String> {
    let Some(object) = value.as_object() else {
        return vec!["payload is not a JSON object".to_string()];
    };

    let mut problems = Vec::new();
    for field in fields {
        match object.get(field.name) {
            None => problems.push(format!("missing field '{}'", field.name)),
            Some(Value::Null) if !field.required => {}
            Some(v) if !field.kind.matches(v) => problems.push(format!(
                "field '{}' should be {}, got {}",
                field.name,
                field.kind.json_type(),
                v
            )),
            Some(_) => {}
        }
    }
    for key in object.keys() {
        if !fields.iter().any(|f| f.name == key) {
            problems.push(format!("unexpected field '{key}'"));
        }
    }
    problems
}
