use percent_encoding::percent_decode_str;
use serde_json::{Map, Value};

/// How the trailing path segment is interpreted as a row key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Backend-assigned integer id; anything that is not a non-negative integer targets the collection
    Numeric,
    /// Opaque text key such as an auth user id
    Text,
}

/// One backend table exposed over HTTP.
///
/// `fields` is both the required set on create and the updatable set on
/// patch; anything else in a request body is dropped before it reaches the
/// store.
#[derive(Debug, PartialEq, Eq)]
pub struct ResourceSpec {
    /// Path segment the resource is mounted at
    pub route: &'static str,
    pub table: &'static str,
    /// Display name used in messages ("Badge created successfully.")
    pub label: &'static str,
    pub key_column: &'static str,
    pub key_kind: KeyKind,
    pub fields: &'static [&'static str],
    pub read_only: bool,
}

pub static BADGES: ResourceSpec = ResourceSpec {
    route: "badges",
    table: "badges",
    label: "Badge",
    key_column: "id",
    key_kind: KeyKind::Numeric,
    fields: &["name", "description"],
    read_only: false,
};

pub static TAGS: ResourceSpec = ResourceSpec {
    route: "tags",
    table: "tags",
    label: "Tag",
    key_column: "id",
    key_kind: KeyKind::Numeric,
    fields: &["name"],
    read_only: false,
};

/// Challenges a user has joined, looked up by the owning user's id
pub static USER_CHALLENGES: ResourceSpec = ResourceSpec {
    route: "userChallenges",
    table: "user_challenges",
    label: "User challenge",
    key_column: "user_id",
    key_kind: KeyKind::Text,
    fields: &[],
    read_only: true,
};

pub static ALL: [&ResourceSpec; 3] = [&BADGES, &TAGS, &USER_CHALLENGES];

impl ResourceSpec {
    /// Interpret the last non-empty path segment as a row key, if it is one
    pub fn parse_key(&self, path: &str) -> Option<String> {
        let segment = path.rsplit('/').find(|s| !s.is_empty())?;
        if segment == self.route {
            return None;
        }
        match self.key_kind {
            KeyKind::Numeric => segment.parse::<u64>().ok().map(|id| id.to_string()),
            KeyKind::Text => Some(percent_decode_str(segment).decode_utf8_lossy().into_owned()),
        }
    }

    /// Fields to insert; every declared field must be present
    pub fn create_payload(&self, body: &Value) -> Result<Map<String, Value>, String> {
        let present = self.present_fields(body);
        if present.len() < self.fields.len() {
            return Err(format!(
                "You must enter a {} {}",
                self.label.to_lowercase(),
                self.fields.join(" and ")
            ));
        }
        Ok(present)
    }

    /// Fields to patch; at least one declared field must be present
    pub fn update_payload(&self, body: &Value) -> Result<Map<String, Value>, String> {
        let present = self.present_fields(body);
        if present.is_empty() {
            return Err(match self.fields {
                [single] => format!("You must provide a {} to update", single),
                fields => format!("You must provide at least a {} to update", fields.join(" or ")),
            });
        }
        Ok(present)
    }

    pub fn key_required_message(&self) -> String {
        format!("A valid {} id is required", self.label.to_lowercase())
    }

    fn present_fields(&self, body: &Value) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Value::Object(object) = body {
            for name in self.fields {
                if let Some(value) = object.get(*name).filter(|v| is_filled(v)) {
                    fields.insert(name.to_string(), value.clone());
                }
            }
        }
        fields
    }
}

/// Null, false, zero and empty strings count as absent
fn is_filled(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
