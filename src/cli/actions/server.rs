use crate::{
    api::{self, EnrollConfig, EnrollState},
    bento::{BentoClient, Credentials},
    cli::telemetry,
    provider::http_client,
    supabase::{GoTrueAdmin, PgUsers, PostgrestUsers, Project, UserStore},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub supabase_url: String,
    pub supabase_service_role_key: SecretString,
    pub dsn: Option<String>,
    pub bento_url: String,
    pub bento_site_uuid: String,
    pub bento_publishable_key: String,
    pub bento_secret_key: SecretString,
    pub confirm_url: Url,
    pub email_from: String,
    pub email_subject: String,
}

/// Build the collaborators from `args`.
///
/// # Errors
/// Returns an error if a base URL is invalid or the HTTP client cannot be built.
pub fn state(args: Args) -> Result<Arc<EnrollState>> {
    let client = http_client()?;

    let project = Project::new(&args.supabase_url, args.supabase_service_role_key)?;
    let auth = GoTrueAdmin::new(client.clone(), project.clone());

    let users: Arc<dyn UserStore> = if let Some(dsn) = &args.dsn {
        debug!("users table through Postgres");
        Arc::new(PgUsers::connect_lazy(dsn).context("Failed to configure database pool")?)
    } else {
        debug!("users table through PostgREST");
        Arc::new(PostgrestUsers::new(client.clone(), project))
    };

    let messenger = BentoClient::new(
        client,
        &args.bento_url,
        Credentials {
            site_uuid: args.bento_site_uuid,
            publishable_key: args.bento_publishable_key,
            secret_key: args.bento_secret_key,
        },
    )?;

    let config = EnrollConfig::new(args.confirm_url)
        .with_email_from(args.email_from)
        .with_email_subject(args.email_subject);

    Ok(Arc::new(EnrollState::new(
        config,
        Arc::new(auth),
        users,
        Arc::new(messenger),
    )))
}

/// Execute the server action.
/// # Errors
/// Returns an error if the collaborators cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let port = args.port;
    let state = state(args)?;

    info!(port, "starting enroll");

    let result = api::new(port, state).await;

    telemetry::shutdown_tracer();

    result
}
