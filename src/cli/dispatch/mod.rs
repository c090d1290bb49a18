//! Map validated CLI arguments to the action the binary runs.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{ARG_PORT, bento, enroll, supabase};
use anyhow::{Context, Result};
use url::Url;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or a URL does not parse.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);

    let supabase_opts = supabase::Options::parse(matches)?;
    let bento_opts = bento::Options::parse(matches)?;
    let enroll_opts = enroll::Options::parse(matches);

    Url::parse(&supabase_opts.url).context("invalid SUPABASE_URL")?;
    Url::parse(&bento_opts.url).context("invalid ENROLL_BENTO_URL")?;
    let confirm_url = Url::parse(&enroll_opts.confirm_url).context("invalid ENROLL_CONFIRM_URL")?;

    Ok(Action::Server(Args {
        port,
        supabase_url: supabase_opts.url,
        supabase_service_role_key: supabase_opts.service_role_key,
        dsn: supabase_opts.dsn,
        bento_url: bento_opts.url,
        bento_site_uuid: bento_opts.site_uuid,
        bento_publishable_key: bento_opts.publishable_key,
        bento_secret_key: bento_opts.secret_key,
        confirm_url,
        email_from: enroll_opts.email_from,
        email_subject: enroll_opts.email_subject,
    }))
}
