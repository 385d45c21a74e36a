//! GS2-Identifier client: users, GSIs and security policies
//!
//! One method per endpoint. Each call validates its required fields, describes
//! a single [`ApiRequest`] and hands it to the transport; nothing is cached or retried.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::auth::Gs2Credentials;
use crate::config::ClientConfig;
use crate::error::{IdentifierError, Result};
use crate::models::{
    AttachSecurityPolicyRequest, CreateIdentifierRequest, CreateSecurityPolicyRequest, CreateUserRequest,
    DeleteIdentifierRequest, DeleteSecurityPolicyRequest, DeleteUserRequest, DescribeIdentifierRequest,
    DetachSecurityPolicyRequest, GetHasSecurityPolicyRequest, GetSecurityPolicyRequest, GetUserRequest, Identifier,
    ItemResponse, ItemsResponse, Page, PageRequest, SecurityPolicy, UpdateSecurityPolicyRequest, User,
};
use crate::transport::{ApiRequest, HttpTransport, Transport};

pub const ENDPOINT: &str = "identifier";
pub const MODULE: &str = "Gs2Identifier";

pub struct IdentifierClient<T: Transport = HttpTransport> {
    transport: T,
}

impl IdentifierClient<HttpTransport> {
    /// Client over the signed HTTP transport
    pub fn new(credentials: Gs2Credentials, config: ClientConfig) -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::new(credentials, config)?))
    }
}

impl<T: Transport> IdentifierClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // ---------------- Users ----------------

    /// GET /user
    pub async fn describe_user(&self, page: &PageRequest) -> Result<Page<User>> {
        let raw = self.call(Method::GET, "DescribeUser", &["user"], page.to_query(), None).await?;
        decode(&raw)
    }

    /// POST /user
    ///
    /// A user has no permissions until a security policy is attached, and
    /// cannot call the API until a GSI is issued for it.
    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<User> {
        let body = body_of([("name", request.name.clone().map(Value::String))]);
        let raw = self.call(Method::POST, "CreateUser", &["user"], vec![], Some(body)).await?;
        decode_item(&raw)
    }

    /// GET /user/{userName}
    pub async fn get_user(&self, request: &GetUserRequest) -> Result<User> {
        let user_name = require("userName", &request.user_name)?;
        let raw = self.call(Method::GET, "GetUser", &["user", user_name], vec![], None).await?;
        decode_item(&raw)
    }

    /// DELETE /user/{userName}
    pub async fn delete_user(&self, request: &DeleteUserRequest) -> Result<()> {
        let user_name = require("userName", &request.user_name)?;
        self.call(Method::DELETE, "DeleteUser", &["user", user_name], vec![], None).await?;
        Ok(())
    }

    // ---------------- GSI ----------------

    /// GET /user/{userName}/identifier
    pub async fn describe_identifier(
        &self,
        request: &DescribeIdentifierRequest,
        page: &PageRequest,
    ) -> Result<Page<Identifier>> {
        let user_name = require("userName", &request.user_name)?;
        let path = ["user", user_name, "identifier"];
        let raw = self.call(Method::GET, "DescribeIdentifier", &path, page.to_query(), None).await?;
        decode(&raw)
    }

    /// POST /user/{userName}/identifier
    ///
    /// The returned identifier is the only place the client secret is ever exposed.
    pub async fn create_identifier(&self, request: &CreateIdentifierRequest) -> Result<Identifier> {
        let user_name = require("userName", &request.user_name)?;
        let path = ["user", user_name, "identifier"];
        let raw = self.call(Method::POST, "CreateIdentifier", &path, vec![], Some(Value::Object(Map::new()))).await?;
        decode_item(&raw)
    }

    /// DELETE /user/{userName}/identifier/{identifierId}
    pub async fn delete_identifier(&self, request: &DeleteIdentifierRequest) -> Result<()> {
        let user_name = require("userName", &request.user_name)?;
        let identifier_id = require("identifierId", &request.identifier_id)?;
        let path = ["user", user_name, "identifier", identifier_id];
        self.call(Method::DELETE, "DeleteIdentifier", &path, vec![], None).await?;
        Ok(())
    }

    // ---------------- Policy attachment ----------------

    /// GET /user/{userName}/securityPolicy
    pub async fn get_has_security_policy(&self, request: &GetHasSecurityPolicyRequest) -> Result<Vec<SecurityPolicy>> {
        let user_name = require("userName", &request.user_name)?;
        let path = ["user", user_name, "securityPolicy"];
        let raw = self.call(Method::GET, "HasSecurityPolicy", &path, vec![], None).await?;
        let resp: ItemsResponse<SecurityPolicy> = decode(&raw)?;
        Ok(resp.items)
    }

    /// PUT /user/{userName}/securityPolicy
    pub async fn attach_security_policy(&self, request: &AttachSecurityPolicyRequest) -> Result<()> {
        let user_name = require("userName", &request.user_name)?;
        let body = body_of([(
            "securityPolicyId",
            request.security_policy_id.clone().map(Value::String),
        )]);
        let path = ["user", user_name, "securityPolicy"];
        self.call(Method::PUT, "AttachSecurityPolicy", &path, vec![], Some(body)).await?;
        Ok(())
    }

    /// DELETE /user/{userName}/securityPolicy/{securityPolicyId}
    pub async fn detach_security_policy(&self, request: &DetachSecurityPolicyRequest) -> Result<()> {
        let user_name = require("userName", &request.user_name)?;
        let security_policy_id = require("securityPolicyId", &request.security_policy_id)?;
        let path = ["user", user_name, "securityPolicy", security_policy_id];
        self.call(Method::DELETE, "DetachSecurityPolicy", &path, vec![], None).await?;
        Ok(())
    }

    // ---------------- Security policies ----------------

    /// GET /securityPolicy
    pub async fn describe_security_policy(&self, page: &PageRequest) -> Result<Page<SecurityPolicy>> {
        let path = ["securityPolicy"];
        let raw = self.call(Method::GET, "DescribeSecurityPolicy", &path, page.to_query(), None).await?;
        decode(&raw)
    }

    /// GET /securityPolicy/common
    ///
    /// Policies provided by GS2 itself. Signed with the same action as
    /// `describe_security_policy`.
    pub async fn describe_common_security_policy(&self, page: &PageRequest) -> Result<Page<SecurityPolicy>> {
        let path = ["securityPolicy", "common"];
        let raw = self.call(Method::GET, "DescribeSecurityPolicy", &path, page.to_query(), None).await?;
        decode(&raw)
    }

    /// POST /securityPolicy
    pub async fn create_security_policy(&self, request: &CreateSecurityPolicyRequest) -> Result<SecurityPolicy> {
        let body = body_of([
            ("name", request.name.clone().map(Value::String)),
            ("policy", request.policy.clone()),
        ]);
        let path = ["securityPolicy"];
        let raw = self.call(Method::POST, "CreateSecurityPolicy", &path, vec![], Some(body)).await?;
        decode_item(&raw)
    }

    /// GET /securityPolicy/{securityPolicyName}
    pub async fn get_security_policy(&self, request: &GetSecurityPolicyRequest) -> Result<SecurityPolicy> {
        let name = require("securityPolicyName", &request.security_policy_name)?;
        let raw = self.call(Method::GET, "GetSecurityPolicy", &["securityPolicy", name], vec![], None).await?;
        decode_item(&raw)
    }

    /// PUT /securityPolicy/{securityPolicyName}
    pub async fn update_security_policy(&self, request: &UpdateSecurityPolicyRequest) -> Result<SecurityPolicy> {
        let name = require("securityPolicyName", &request.security_policy_name)?;
        let body = body_of([("policy", request.policy.clone())]);
        let path = ["securityPolicy", name];
        let raw = self.call(Method::PUT, "UpdateSecurityPolicy", &path, vec![], Some(body)).await?;
        decode_item(&raw)
    }

    /// DELETE /securityPolicy/{securityPolicyName}
    pub async fn delete_security_policy(&self, request: &DeleteSecurityPolicyRequest) -> Result<()> {
        let name = require("securityPolicyName", &request.security_policy_name)?;
        self.call(Method::DELETE, "DeleteSecurityPolicy", &["securityPolicy", name], vec![], None)
            .await?;
        Ok(())
    }

    async fn call(
        &self,
        method: Method,
        action: &'static str,
        path: &[&str],
        query: Vec<(String, String)>,
        body: Option<Value>,
    ) -> Result<Vec<u8>> {
        debug!(action, %method, ?path, "identifier call");
        let request = ApiRequest {
            module: MODULE,
            action,
            method,
            service: ENDPOINT,
            path: path.iter().map(|s| s.to_string()).collect(),
            query,
            body,
        };
        Ok(self.transport.send(request).await?)
    }
}

fn require<'a>(field: &'static str, value: &'a str) -> Result<&'a str> {
    if value.is_empty() {
        return Err(IdentifierError::MissingParameter(field));
    }
    Ok(value)
}

// Only fields that are present end up in the body
fn body_of<const N: usize>(fields: [(&str, Option<Value>); N]) -> Value {
    let map: Map<String, Value> = fields
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k.to_string(), v)))
        .collect();
    Value::Object(map)
}

fn decode<R: DeserializeOwned>(raw: &[u8]) -> Result<R> {
    Ok(serde_json::from_slice(raw)?)
}

fn decode_item<R: DeserializeOwned>(raw: &[u8]) -> Result<R> {
    let resp: ItemResponse<R> = decode(raw)?;
    Ok(resp.item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records every request and answers with a canned body
    struct RecordingTransport {
        calls: Mutex<Vec<ApiRequest>>,
        response: Value,
    }

    impl RecordingTransport {
        fn new(response: Value) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                response,
            }
        }

        fn calls(&self) -> Vec<ApiRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, request: ApiRequest) -> Result<Vec<u8>, TransportError> {
            self.calls.lock().unwrap().push(request);
            Ok(serde_json::to_vec(&self.response).unwrap())
        }
    }

    struct FailingTransport;

    #[async_trait]
    impl Transport for FailingTransport {
        async fn send(&self, _request: ApiRequest) -> Result<Vec<u8>, TransportError> {
            Err(TransportError::UnexpectedStatus {
                status: 404,
                body: "{\"message\":\"not found\"}".to_string(),
            })
        }
    }

    fn client(response: Value) -> IdentifierClient<RecordingTransport> {
        IdentifierClient::with_transport(RecordingTransport::new(response))
    }

    fn user_json() -> Value {
        json!({ "userId": "u-1", "ownerId": "o-1", "name": "alice", "createAt": 1_500_000_000 })
    }

    fn policy_json() -> Value {
        json!({
            "securityPolicyId": "sp-1",
            "ownerId": "o-1",
            "name": "policyA",
            "policy": { "Version": "2016-04-01", "Statements": [] },
            "createAt": 1,
            "updateAt": 2
        })
    }

    fn only_call(c: &IdentifierClient<RecordingTransport>) -> ApiRequest {
        let calls = c.transport().calls();
        assert_eq!(calls.len(), 1, "expected exactly one transport call");
        calls.into_iter().next().unwrap()
    }

    #[tokio::test]
    async fn test_missing_required_fields_never_reach_transport() {
        let c = client(json!({}));

        let errs = vec![
            c.get_user(&GetUserRequest::default()).await.unwrap_err(),
            c.delete_user(&DeleteUserRequest::default()).await.unwrap_err(),
            c.describe_identifier(&DescribeIdentifierRequest::default(), &PageRequest::new())
                .await
                .unwrap_err(),
            c.create_identifier(&CreateIdentifierRequest::default()).await.unwrap_err(),
            c.delete_identifier(&DeleteIdentifierRequest::new("alice", "")).await.unwrap_err(),
            c.delete_identifier(&DeleteIdentifierRequest::new("", "gsi-1")).await.unwrap_err(),
            c.get_has_security_policy(&GetHasSecurityPolicyRequest::default()).await.unwrap_err(),
            c.attach_security_policy(&AttachSecurityPolicyRequest::default()).await.unwrap_err(),
            c.detach_security_policy(&DetachSecurityPolicyRequest::new("", "sp-1")).await.unwrap_err(),
            c.detach_security_policy(&DetachSecurityPolicyRequest::new("alice", "")).await.unwrap_err(),
            c.get_security_policy(&GetSecurityPolicyRequest::default()).await.unwrap_err(),
            c.update_security_policy(&UpdateSecurityPolicyRequest::default()).await.unwrap_err(),
            c.delete_security_policy(&DeleteSecurityPolicyRequest::default()).await.unwrap_err(),
        ];
        let fields: Vec<&str> = errs
            .iter()
            .map(|e| match e {
                IdentifierError::MissingParameter(f) => *f,
                other => panic!("unexpected error: {other}"),
            })
            .collect();
        assert_eq!(
            fields,
            vec![
                "userName",
                "userName",
                "userName",
                "userName",
                "identifierId",
                "userName",
                "userName",
                "userName",
                "userName",
                "securityPolicyId",
                "securityPolicyName",
                "securityPolicyName",
                "securityPolicyName",
            ]
        );
        assert!(c.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn test_whitespace_name_is_sent_as_is() {
        let c = client(json!({}));
        c.delete_user(&DeleteUserRequest::new("  ")).await.unwrap();
        let call = only_call(&c);
        assert_eq!(call.path, vec!["user".to_string(), "  ".to_string()]);
    }

    #[tokio::test]
    async fn test_name_with_slash_stays_one_segment() {
        let c = client(json!({}));
        c.delete_user(&DeleteUserRequest::new("alice/securityPolicy/sp-1")).await.unwrap();
        let call = only_call(&c);
        assert_eq!(call.action, "DeleteUser");
        assert_eq!(call.path, vec!["user".to_string(), "alice/securityPolicy/sp-1".to_string()]);
    }

    #[tokio::test]
    async fn test_null_field_from_json_is_missing() {
        let c = client(json!({}));
        let req: GetUserRequest = serde_json::from_value(json!({ "userName": null })).unwrap();
        let err = c.get_user(&req).await.unwrap_err();
        assert!(matches!(err, IdentifierError::MissingParameter("userName")));
        assert!(c.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn test_describe_user_paging_query() {
        let c = client(json!({ "items": [user_json()], "nextPageToken": "tok2" }));
        let page = c.describe_user(&PageRequest::new().page_token("tok1").limit(10)).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.next_page_token.as_deref(), Some("tok2"));

        let call = only_call(&c);
        assert_eq!(call.method, Method::GET);
        assert_eq!(call.path(), "/user");
        assert_eq!(call.action, "DescribeUser");
        assert_eq!(call.module, MODULE);
        assert_eq!(call.service, ENDPOINT);
        assert_eq!(
            call.query,
            vec![("pageToken".to_string(), "tok1".to_string()), ("limit".to_string(), "10".to_string())]
        );
        assert!(call.body.is_none());
    }

    #[tokio::test]
    async fn test_describe_user_without_paging() {
        let c = client(json!({ "items": [] }));
        let page = c.describe_user(&PageRequest::new()).await.unwrap();
        assert!(page.items.is_empty());
        assert!(!page.has_next());
        assert!(only_call(&c).query.is_empty());
    }

    #[tokio::test]
    async fn test_create_user_body() {
        let c = client(json!({ "item": user_json() }));
        let user = c.create_user(&CreateUserRequest::new("alice")).await.unwrap();
        assert_eq!(user.name, "alice");
        let call = only_call(&c);
        assert_eq!((call.method.clone(), call.path().as_str()), (Method::POST, "/user"));
        assert_eq!(call.body, Some(json!({ "name": "alice" })));

        let c = client(json!({ "item": user_json() }));
        c.create_user(&CreateUserRequest::default()).await.unwrap();
        assert_eq!(only_call(&c).body, Some(json!({})));
    }

    #[tokio::test]
    async fn test_get_user() {
        let c = client(json!({ "item": user_json() }));
        let user = c.get_user(&GetUserRequest::new("alice")).await.unwrap();
        assert_eq!(user.user_id, "u-1");
        let call = only_call(&c);
        assert_eq!((call.method.clone(), call.path().as_str(), call.action), (Method::GET, "/user/alice", "GetUser"));
    }

    #[tokio::test]
    async fn test_delete_user() {
        let c = client(json!({}));
        c.delete_user(&DeleteUserRequest::new("alice")).await.unwrap();
        let call = only_call(&c);
        assert_eq!((call.method.clone(), call.path().as_str()), (Method::DELETE, "/user/alice"));
        assert!(call.body.is_none());
    }

    #[tokio::test]
    async fn test_describe_identifier() {
        let c = client(json!({
            "items": [{ "identifierId": "gsi-1", "ownerId": "o-1", "clientId": "cid", "createAt": 1 }]
        }));
        let page = c
            .describe_identifier(&DescribeIdentifierRequest::new("alice"), &PageRequest::new().limit(5))
            .await
            .unwrap();
        assert_eq!(page.items[0].client_secret, None);
        let call = only_call(&c);
        assert_eq!((call.method.clone(), call.path().as_str()), (Method::GET, "/user/alice/identifier"));
        assert_eq!(call.query, vec![("limit".to_string(), "5".to_string())]);
    }

    #[tokio::test]
    async fn test_create_identifier_returns_secret() {
        let c = client(json!({ "item": {
            "identifierId": "gsi-1", "ownerId": "o-1", "clientId": "cid", "clientSecret": "secret", "createAt": 1
        }}));
        let gsi = c.create_identifier(&CreateIdentifierRequest::new("alice")).await.unwrap();
        assert_eq!(gsi.client_secret.as_deref(), Some("secret"));
        let call = only_call(&c);
        assert_eq!((call.method.clone(), call.path().as_str()), (Method::POST, "/user/alice/identifier"));
        assert_eq!(call.body, Some(json!({})));
    }

    #[tokio::test]
    async fn test_delete_identifier() {
        let c = client(json!({}));
        c.delete_identifier(&DeleteIdentifierRequest::new("alice", "gsi-1")).await.unwrap();
        let call = only_call(&c);
        assert_eq!((call.method.clone(), call.path().as_str()), (Method::DELETE, "/user/alice/identifier/gsi-1"));
    }

    #[tokio::test]
    async fn test_get_has_security_policy() {
        let c = client(json!({ "items": [policy_json()] }));
        let policies = c
            .get_has_security_policy(&GetHasSecurityPolicyRequest::new("alice"))
            .await
            .unwrap();
        assert_eq!(policies.len(), 1);
        let call = only_call(&c);
        assert_eq!(
            (call.method.clone(), call.path().as_str(), call.action),
            (Method::GET, "/user/alice/securityPolicy", "HasSecurityPolicy")
        );
    }

    #[tokio::test]
    async fn test_attach_security_policy() {
        let c = client(json!({}));
        c.attach_security_policy(&AttachSecurityPolicyRequest::new("alice", "sp-1")).await.unwrap();
        let call = only_call(&c);
        assert_eq!((call.method.clone(), call.path().as_str()), (Method::PUT, "/user/alice/securityPolicy"));
        assert_eq!(call.body, Some(json!({ "securityPolicyId": "sp-1" })));

        // securityPolicyId is optional and left out when absent
        let c = client(json!({}));
        let req = AttachSecurityPolicyRequest {
            user_name: "alice".to_string(),
            security_policy_id: None,
        };
        c.attach_security_policy(&req).await.unwrap();
        assert_eq!(only_call(&c).body, Some(json!({})));
    }

    #[tokio::test]
    async fn test_detach_security_policy() {
        let c = client(json!({}));
        c.detach_security_policy(&DetachSecurityPolicyRequest::new("alice", "sp-1")).await.unwrap();
        let call = only_call(&c);
        assert_eq!((call.method.clone(), call.path().as_str()), (Method::DELETE, "/user/alice/securityPolicy/sp-1"));
    }

    #[tokio::test]
    async fn test_describe_security_policies() {
        let c = client(json!({ "items": [policy_json()], "nextPageToken": "next" }));
        let page = c.describe_security_policy(&PageRequest::new()).await.unwrap();
        assert!(page.has_next());
        assert_eq!(only_call(&c).path(), "/securityPolicy");

        let c = client(json!({ "items": [policy_json()] }));
        c.describe_common_security_policy(&PageRequest::new().page_token("p"))
            .await
            .unwrap();
        let call = only_call(&c);
        assert_eq!((call.method.clone(), call.path().as_str()), (Method::GET, "/securityPolicy/common"));
        assert_eq!(call.action, "DescribeSecurityPolicy");
        assert_eq!(call.query, vec![("pageToken".to_string(), "p".to_string())]);
    }

    #[tokio::test]
    async fn test_create_security_policy() {
        let doc = json!({ "Version": "2016-04-01", "Statements": [] });
        let c = client(json!({ "item": policy_json() }));
        let policy = c
            .create_security_policy(&CreateSecurityPolicyRequest::new("policyA", doc.clone()))
            .await
            .unwrap();
        assert_eq!(policy.name, "policyA");
        let call = only_call(&c);
        assert_eq!((call.method.clone(), call.path().as_str()), (Method::POST, "/securityPolicy"));
        assert_eq!(call.body, Some(json!({ "name": "policyA", "policy": doc })));
    }

    #[tokio::test]
    async fn test_get_and_update_security_policy() {
        let c = client(json!({ "item": policy_json() }));
        c.get_security_policy(&GetSecurityPolicyRequest::new("policyA")).await.unwrap();
        let call = only_call(&c);
        assert_eq!((call.method.clone(), call.path().as_str()), (Method::GET, "/securityPolicy/policyA"));

        let c = client(json!({ "item": policy_json() }));
        let req = UpdateSecurityPolicyRequest {
            security_policy_name: "policyA".to_string(),
            policy: None,
        };
        c.update_security_policy(&req).await.unwrap();
        let call = only_call(&c);
        assert_eq!((call.method.clone(), call.path().as_str()), (Method::PUT, "/securityPolicy/policyA"));
        assert_eq!(call.body, Some(json!({})));

        let doc = json!({ "Version": "2016-04-01", "Statements": [{ "Effect": "Allow", "Actions": ["*"] }] });
        let c = client(json!({ "item": policy_json() }));
        c.update_security_policy(&UpdateSecurityPolicyRequest::new("policyA", doc.clone()))
            .await
            .unwrap();
        let call = only_call(&c);
        assert_eq!(call.action, "UpdateSecurityPolicy");
        assert_eq!(call.body, Some(json!({ "policy": doc })));
    }

    #[tokio::test]
    async fn test_delete_security_policy() {
        let c = client(json!({}));
        c.delete_security_policy(&DeleteSecurityPolicyRequest::new("policyA")).await.unwrap();
        let call = only_call(&c);
        assert_eq!((call.method.clone(), call.path().as_str()), (Method::DELETE, "/securityPolicy/policyA"));
        assert!(call.body.is_none());
    }

    #[tokio::test]
    async fn test_transport_error_passes_through() {
        let c = IdentifierClient::with_transport(FailingTransport);
        let err = c.get_user(&GetUserRequest::new("ghost")).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn test_unexpected_payload_is_decode_error() {
        let c = client(json!({ "unexpected": true }));
        let err = c.get_user(&GetUserRequest::new("alice")).await.unwrap_err();
        assert!(matches!(err, IdentifierError::Decode(_)));
    }
}
