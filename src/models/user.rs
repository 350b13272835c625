//! Users listing: directory and avatar index.

use indexmap::IndexMap;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::{IdField, UserId};

/// Errors while turning a users listing into a directory.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("expected a JSON array of users, got {0}")]
    NotAnArray(&'static str),

    #[error("user record #{index} is not a JSON object")]
    NotAnObject { index: usize },

    #[error("user record #{index} has no usable `{field}` identifier")]
    MissingId { index: usize, field: String },
}

/// A single entry of the users listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Users in response order, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDirectory {
    users: IndexMap<UserId, User>,
}

/// Avatar URL per user id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvatarIndex {
    avatars: IndexMap<UserId, String>,
}

impl UserDirectory {
    /// Build the directory and avatar index from a users listing body.
    ///
    /// Relative avatar paths are resolved against `base` when given.
    /// Duplicate ids keep the first record.
    pub fn from_json(
        body: &Value,
        id_field: &IdField,
        base: Option<&Url>,
    ) -> Result<(Self, AvatarIndex), DirectoryError> {
        let records = body.as_array().ok_or(DirectoryError::NotAnArray(json_kind(body)))?;

        let mut directory = UserDirectory::default();
        let mut avatars = AvatarIndex::default();

        for (index, record) in records.iter().enumerate() {
            let fields = record
                .as_object()
                .ok_or(DirectoryError::NotAnObject { index })?;

            let id = match id_field {
                IdField::Index => UserId::from(index),
                IdField::Field(name) => fields
                    .get(name)
                    .and_then(UserId::from_json)
                    .ok_or_else(|| DirectoryError::MissingId {
                        index,
                        field: name.clone(),
                    })?,
            };

            if directory.users.contains_key(&id) {
                tracing::warn!(%id, index, "duplicate user id in listing, keeping first");
                continue;
            }

            let name = match fields.get("name").and_then(Value::as_str) {
                Some(name) => name.to_string(),
                None => {
                    tracing::debug!(%id, "user record has no name, labelling with id");
                    id.to_string()
                }
            };

            let avatar = fields
                .get("avatar")
                .and_then(Value::as_str)
                .filter(|a| !a.is_empty())
                .map(|a| resolve_avatar(a, base));

            if let Some(ref url) = avatar {
                avatars.avatars.insert(id.clone(), url.clone());
            }
            directory.users.insert(id.clone(), User { id, name, avatar });
        }

        Ok((directory, avatars))
    }

    pub fn get(&self, id: &UserId) -> Option<&User> {
        self.users.get(id)
    }

    pub fn contains(&self, id: &UserId) -> bool {
        self.users.contains_key(id)
    }

    /// Users in response order.
    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl AvatarIndex {
    pub fn get(&self, id: &UserId) -> Option<&str> {
        self.avatars.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.avatars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.avatars.is_empty()
    }
}

fn resolve_avatar(raw: &str, base: Option<&Url>) -> String {
    match base.map(|b| b.join(raw)) {
        Some(Ok(url)) => url.to_string(),
        _ => raw.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn field(name: &str) -> IdField {
        IdField::Field(name.to_string())
    }

    #[test]
    fn builds_directory_in_response_order() {
        let body = json!([
            {"id": 2, "name": "Bob", "avatar": "/b.png"},
            {"id": 1, "name": "Alice", "avatar": "/a.png"},
        ]);
        let (dir, avatars) = UserDirectory::from_json(&body, &field("id"), None).unwrap();
        let names: Vec<_> = dir.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Bob", "Alice"]);
        assert_eq!(avatars.get(&UserId::from("1")), Some("/a.png"));
        assert_eq!(avatars.get(&UserId::from("2")), Some("/b.png"));
    }

    #[test]
    fn index_ids_use_array_position() {
        let body = json!([{"name": "User 10"}, {"name": "User 11"}]);
        let (dir, avatars) = UserDirectory::from_json(&body, &IdField::Index, None).unwrap();
        let ids: Vec<_> = dir.iter().map(|u| u.id.to_string()).collect();
        assert_eq!(ids, vec!["0", "1"]);
        assert!(avatars.is_empty());
    }

    #[test]
    fn string_ids_from_user_id_field() {
        let body = json!([{"user_id": "141", "name": "Adam P."}]);
        let (dir, _) = UserDirectory::from_json(&body, &field("user_id"), None).unwrap();
        assert!(dir.contains(&UserId::from("141")));
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let body = json!([
            {"id": 1, "name": "First"},
            {"id": 1, "name": "Second"},
        ]);
        let (dir, _) = UserDirectory::from_json(&body, &field("id"), None).unwrap();
        assert_eq!(dir.len(), 1);
        assert_eq!(dir.get(&UserId::from("1")).unwrap().name, "First");
    }

    #[test]
    fn missing_name_falls_back_to_id() {
        let body = json!([{"id": 5}]);
        let (dir, _) = UserDirectory::from_json(&body, &field("id"), None).unwrap();
        assert_eq!(dir.get(&UserId::from("5")).unwrap().name, "5");
    }

    #[test]
    fn rejects_non_array_body() {
        let err = UserDirectory::from_json(&json!({"users": []}), &field("id"), None).unwrap_err();
        assert_eq!(err, DirectoryError::NotAnArray("an object"));
    }

    #[test]
    fn rejects_record_without_id() {
        let body = json!([{"id": 1, "name": "A"}, {"name": "B"}]);
        let err = UserDirectory::from_json(&body, &field("id"), None).unwrap_err();
        assert_eq!(
            err,
            DirectoryError::MissingId { index: 1, field: "id".to_string() }
        );
    }

    #[test]
    fn rejects_scalar_record() {
        let err = UserDirectory::from_json(&json!([1, 2]), &IdField::Index, None).unwrap_err();
        assert_eq!(err, DirectoryError::NotAnObject { index: 0 });
    }

    #[test]
    fn relative_avatars_resolve_against_base() {
        let base = Url::parse("https://intranet.example.com/api/v1/users").unwrap();
        let body = json!([
            {"id": 1, "name": "A", "avatar": "/api/images/users/1"},
            {"id": 2, "name": "B", "avatar": "https://cdn.example.com/2.png"},
            {"id": 3, "name": "C", "avatar": ""},
        ]);
        let (_, avatars) = UserDirectory::from_json(&body, &field("id"), Some(&base)).unwrap();
        assert_eq!(
            avatars.get(&UserId::from("1")),
            Some("https://intranet.example.com/api/images/users/1")
        );
        assert_eq!(avatars.get(&UserId::from("2")), Some("https://cdn.example.com/2.png"));
        assert_eq!(avatars.get(&UserId::from("3")), None);
    }

    #[test]
    fn empty_listing_is_valid() {
        let (dir, avatars) = UserDirectory::from_json(&json!([]), &field("id"), None).unwrap();
        assert!(dir.is_empty());
        assert!(avatars.is_empty());
    }
}
