use clap::{Args, Parser, Subcommand};
use gs2_identifier::models::{
    AttachSecurityPolicyRequest, CreateIdentifierRequest, CreateSecurityPolicyRequest, CreateUserRequest,
    DeleteIdentifierRequest, DeleteSecurityPolicyRequest, DeleteUserRequest, DescribeIdentifierRequest,
    DetachSecurityPolicyRequest, GetHasSecurityPolicyRequest, GetSecurityPolicyRequest, GetUserRequest, PageRequest,
    UpdateSecurityPolicyRequest,
};
use gs2_identifier::{ClientConfig, Gs2Credentials, IdentifierClient};
use serde::Serialize;
use std::fs;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gs2-identifier")]
#[command(about = "Manage GS2-Identifier users, GSIs and security policies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "GS2_REGION", default_value = gs2_identifier::config::DEFAULT_REGION)]
    region: String,

    /// Base URL override for the identifier endpoint
    #[arg(long, env = "GS2_ENDPOINT")]
    endpoint: Option<String>,

    #[arg(long, env = "GS2_CLIENT_ID")]
    client_id: String,

    #[arg(long, env = "GS2_CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    #[arg(long, env = "GS2_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    log_json: bool,
}

#[derive(Args)]
struct PageArgs {
    #[arg(long)]
    page_token: Option<String>,
    #[arg(long)]
    limit: Option<u32>,
}

impl From<PageArgs> for PageRequest {
    fn from(args: PageArgs) -> Self {
        PageRequest {
            page_token: args.page_token,
            limit: args.limit,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    DescribeUsers {
        #[command(flatten)]
        page: PageArgs,
    },
    CreateUser {
        #[arg(short, long)]
        name: String,
    },
    GetUser {
        #[arg(short, long)]
        user: String,
    },
    DeleteUser {
        #[arg(short, long)]
        user: String,
    },
    DescribeIdentifiers {
        #[arg(short, long)]
        user: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Issue a GSI; the client secret is printed only once
    CreateIdentifier {
        #[arg(short, long)]
        user: String,
    },
    DeleteIdentifier {
        #[arg(short, long)]
        user: String,
        #[arg(short, long)]
        identifier_id: String,
    },
    /// List the security policies attached to a user
    UserPolicies {
        #[arg(short, long)]
        user: String,
    },
    AttachPolicy {
        #[arg(short, long)]
        user: String,
        #[arg(short = 's', long)]
        security_policy_id: String,
    },
    DetachPolicy {
        #[arg(short, long)]
        user: String,
        #[arg(short = 's', long)]
        security_policy_id: String,
    },
    DescribePolicies {
        /// List the policies provided by GS2 instead of your own
        #[arg(long)]
        common: bool,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Policy is inline JSON, or @path to read it from a file
    CreatePolicy {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        policy: String,
    },
    GetPolicy {
        #[arg(short, long)]
        name: String,
    },
    UpdatePolicy {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        policy: String,
    },
    DeletePolicy {
        #[arg(short, long)]
        name: String,
    },
}

fn init_tracing(json: bool) -> tracing_appender::non_blocking::WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    guard
}

fn read_policy(arg: &str) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let text = match arg.strip_prefix('@') {
        Some(path) => fs::read_to_string(path)?,
        None => arg.to_string(),
    };
    Ok(serde_json::from_str(&text)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_json);

    let config = ClientConfig {
        region: cli.region,
        endpoint: cli.endpoint,
        timeout: cli.timeout_secs.map(Duration::from_secs),
    };
    let client = IdentifierClient::new(Gs2Credentials::new(cli.client_id, cli.client_secret), config)?;

    match cli.command {
        Commands::DescribeUsers { page } => {
            print_json(&client.describe_user(&page.into()).await?)?;
        }
        Commands::CreateUser { name } => {
            print_json(&client.create_user(&CreateUserRequest::new(name)).await?)?;
        }
        Commands::GetUser { user } => {
            print_json(&client.get_user(&GetUserRequest::new(user)).await?)?;
        }
        Commands::DeleteUser { user } => {
            client.delete_user(&DeleteUserRequest::new(user.as_str())).await?;
            println!("Deleted user {user}");
        }
        Commands::DescribeIdentifiers { user, page } => {
            let req = DescribeIdentifierRequest::new(user);
            print_json(&client.describe_identifier(&req, &page.into()).await?)?;
        }
        Commands::CreateIdentifier { user } => {
            let gsi = client.create_identifier(&CreateIdentifierRequest::new(user)).await?;
            print_json(&gsi)?;
            eprintln!("Store the client secret now; it cannot be retrieved again.");
        }
        Commands::DeleteIdentifier { user, identifier_id } => {
            client
                .delete_identifier(&DeleteIdentifierRequest::new(user, identifier_id.as_str()))
                .await?;
            println!("Deleted GSI {identifier_id}");
        }
        Commands::UserPolicies { user } => {
            print_json(&client.get_has_security_policy(&GetHasSecurityPolicyRequest::new(user)).await?)?;
        }
        Commands::AttachPolicy { user, security_policy_id } => {
            client
                .attach_security_policy(&AttachSecurityPolicyRequest::new(user.as_str(), security_policy_id.as_str()))
                .await?;
            println!("Attached {security_policy_id} to {user}");
        }
        Commands::DetachPolicy { user, security_policy_id } => {
            client
                .detach_security_policy(&DetachSecurityPolicyRequest::new(user.as_str(), security_policy_id.as_str()))
                .await?;
            println!("Detached {security_policy_id} from {user}");
        }
        Commands::DescribePolicies { common, page } => {
            let page: PageRequest = page.into();
            let result = if common {
                client.describe_common_security_policy(&page).await?
            } else {
                client.describe_security_policy(&page).await?
            };
            print_json(&result)?;
        }
        Commands::CreatePolicy { name, policy } => {
            let req = CreateSecurityPolicyRequest::new(name, read_policy(&policy)?);
            print_json(&client.create_security_policy(&req).await?)?;
        }
        Commands::GetPolicy { name } => {
            print_json(&client.get_security_policy(&GetSecurityPolicyRequest::new(name)).await?)?;
        }
        Commands::UpdatePolicy { name, policy } => {
            let req = UpdateSecurityPolicyRequest::new(name, read_policy(&policy)?);
            print_json(&client.update_security_policy(&req).await?)?;
        }
        Commands::DeletePolicy { name } => {
            client
                .delete_security_policy(&DeleteSecurityPolicyRequest::new(name.as_str()))
                .await?;
            println!("Deleted security policy {name}");
        }
    }

    Ok(())
}
