//! Bootstrap script for GS2-Identifier
//!
//! Provisions a ready-to-use API principal in one run:
//! - Security policy (created if it does not exist yet)
//! - User (created if it does not exist yet)
//! - Policy attachment
//! - A fresh GSI, whose client secret is printed once
//!
//! Run: cargo run --bin bootstrap -- <user-name> [policy-name]
//! Credentials and region come from GS2_CLIENT_ID, GS2_CLIENT_SECRET and GS2_REGION (or .env).

use gs2_identifier::models::{
    AttachSecurityPolicyRequest, CreateIdentifierRequest, CreateSecurityPolicyRequest, CreateUserRequest,
    GetHasSecurityPolicyRequest, GetSecurityPolicyRequest, GetUserRequest,
};
use gs2_identifier::{ClientConfig, Gs2Credentials, IdentifierClient};
use serde_json::json;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let user_name = args.next().ok_or("usage: bootstrap <user-name> [policy-name]")?;
    let policy_name = args.next().unwrap_or_else(|| format!("{user_name}-policy"));

    let client = IdentifierClient::new(Gs2Credentials::from_env()?, ClientConfig::from_env())?;

    // Policy: reuse an existing one with the same name
    let policy = match client.get_security_policy(&GetSecurityPolicyRequest::new(policy_name.as_str())).await {
        Ok(p) => p,
        Err(e) if e.status() == Some(404) => {
            let document = json!({
                "Version": "2016-04-01",
                "Statements": [{ "Effect": "Allow", "Actions": ["Gs2Identifier:*"], "Resources": ["*"] }]
            });
            let req = CreateSecurityPolicyRequest::new(policy_name.as_str(), document);
            client.create_security_policy(&req).await?
        }
        Err(e) => return Err(e.into()),
    };
    info!(policy = %policy.name, id = %policy.security_policy_id, "security policy ready");

    let user = match client.get_user(&GetUserRequest::new(user_name.as_str())).await {
        Ok(u) => u,
        Err(e) if e.status() == Some(404) => client.create_user(&CreateUserRequest::new(user_name.as_str())).await?,
        Err(e) => return Err(e.into()),
    };
    info!(user = %user.name, id = %user.user_id, "user ready");

    let attached = client
        .get_has_security_policy(&GetHasSecurityPolicyRequest::new(user_name.as_str()))
        .await?;
    if attached.iter().any(|p| p.security_policy_id == policy.security_policy_id) {
        info!("policy already attached");
    } else {
        client
            .attach_security_policy(&AttachSecurityPolicyRequest::new(
                user_name.as_str(),
                policy.security_policy_id.as_str(),
            ))
            .await?;
        info!("policy attached");
    }

    let gsi = client.create_identifier(&CreateIdentifierRequest::new(user_name.as_str())).await?;
    let secret = gsi
        .client_secret
        .clone()
        .ok_or("CreateIdentifier returned no client secret")?;

    println!("✅ Provisioned {} with policy {}", user.name, policy.name);
    println!("GS2_CLIENT_ID={}", gsi.client_id);
    println!("GS2_CLIENT_SECRET={}", secret);

    Ok(())
}
