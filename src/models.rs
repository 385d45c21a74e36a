use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Debug;

// ---------------- Entities ----------------

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    pub owner_id: String,
    pub name: String,
    pub create_at: i64,
}

impl User {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.create_at, 0)
    }
}

/// A GSI: client ID / client secret pair issued to a user.
///
/// `client_secret` is only present in the `CreateIdentifier` response and is redacted in Debug.
#[derive(Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Identifier {
    pub identifier_id: String,
    pub owner_id: String,
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    pub create_at: i64,
}

impl Identifier {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.create_at, 0)
    }
}

impl Debug for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(Identifier))
            .field("identifier_id", &self.identifier_id)
            .field("owner_id", &self.owner_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("create_at", &self.create_at)
            .finish()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SecurityPolicy {
    pub security_policy_id: String,
    pub owner_id: String,
    pub name: String,
    /// Policy document, passed through untouched
    #[serde(default)]
    pub policy: serde_json::Value,
    pub create_at: i64,
    #[serde(default)]
    pub update_at: Option<i64>,
}

impl SecurityPolicy {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.create_at, 0)
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.update_at.and_then(|t| DateTime::from_timestamp(t, 0))
    }
}

// ---------------- Responses ----------------

/// One page of a list endpoint: `{items: [...], nextPageToken?}`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default = "Vec::new", deserialize_with = "deserialize_null_default")]
    pub items: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next_page_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

#[derive(Deserialize)]
pub(crate) struct ItemResponse<T> {
    pub(crate) item: T,
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct ItemsResponse<T> {
    #[serde(default = "Vec::new", deserialize_with = "deserialize_null_default")]
    pub(crate) items: Vec<T>,
}

// When a field is null, treat it as its default (empty vec / empty string)
fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------- Requests ----------------
//
// Required fields are plain Strings. Absent or null values deserialize to an
// empty string and are rejected by the client before anything is sent.

/// Paging parameters shared by the describe* calls
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl PageRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_token(mut self, token: impl Into<String>) -> Self {
        self.page_token = Some(token.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Query pairs; an empty token or a zero limit is left out.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(token) = self.page_token.as_deref().filter(|t| !t.is_empty()) {
            query.push(("pageToken".to_string(), token.to_string()));
        }
        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            query.push(("limit".to_string(), limit.to_string()));
        }
        query
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl CreateUserRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()) }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GetUserRequest {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub user_name: String,
}

impl GetUserRequest {
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUserRequest {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub user_name: String,
}

impl DeleteUserRequest {
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DescribeIdentifierRequest {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub user_name: String,
}

impl DescribeIdentifierRequest {
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
        }
    }
}

/// Issues a new GSI; the response carries the client secret.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateIdentifierRequest {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub user_name: String,
}

impl CreateIdentifierRequest {
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GetHasSecurityPolicyRequest {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub user_name: String,
}

impl GetHasSecurityPolicyRequest {
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteIdentifierRequest {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub user_name: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub identifier_id: String,
}

impl DeleteIdentifierRequest {
    pub fn new(user_name: impl Into<String>, identifier_id: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            identifier_id: identifier_id.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttachSecurityPolicyRequest {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_policy_id: Option<String>,
}

impl AttachSecurityPolicyRequest {
    pub fn new(user_name: impl Into<String>, security_policy_id: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            security_policy_id: Some(security_policy_id.into()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DetachSecurityPolicyRequest {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub user_name: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub security_policy_id: String,
}

impl DetachSecurityPolicyRequest {
    pub fn new(user_name: impl Into<String>, security_policy_id: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            security_policy_id: security_policy_id.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateSecurityPolicyRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<serde_json::Value>,
}

impl CreateSecurityPolicyRequest {
    pub fn new(name: impl Into<String>, policy: serde_json::Value) -> Self {
        Self {
            name: Some(name.into()),
            policy: Some(policy),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GetSecurityPolicyRequest {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub security_policy_name: String,
}

impl GetSecurityPolicyRequest {
    pub fn new(security_policy_name: impl Into<String>) -> Self {
        Self {
            security_policy_name: security_policy_name.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSecurityPolicyRequest {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub security_policy_name: String,
}

impl DeleteSecurityPolicyRequest {
    pub fn new(security_policy_name: impl Into<String>) -> Self {
        Self {
            security_policy_name: security_policy_name.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSecurityPolicyRequest {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub security_policy_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<serde_json::Value>,
}

impl UpdateSecurityPolicyRequest {
    pub fn new(security_policy_name: impl Into<String>, policy: serde_json::Value) -> Self {
        Self {
            security_policy_name: security_policy_name.into(),
            policy: Some(policy),
        }
    }
}
