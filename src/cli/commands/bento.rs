use crate::bento::DEFAULT_BENTO_URL;
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_BENTO_URL: &str = "bento-url";
pub const ARG_BENTO_SITE_UUID: &str = "bento-site-uuid";
pub const ARG_BENTO_PUBLISHABLE_KEY: &str = "bento-publishable-key";
pub const ARG_BENTO_SECRET_KEY: &str = "bento-secret-key";

#[derive(Debug, Clone)]
pub struct Options {
    pub url: String,
    pub site_uuid: String,
    pub publishable_key: String,
    pub secret_key: SecretString,
}

impl Options {
    /// Parse Bento arguments from matches.
    ///
    /// # Errors
    /// Returns an error if a site credential is missing or empty.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let get_non_empty = |id: &str| {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
        };
        let required = |id: &str| {
            get_non_empty(id).ok_or_else(|| anyhow::anyhow!("missing required argument: --{id}"))
        };

        Ok(Self {
            url: get_non_empty(ARG_BENTO_URL).unwrap_or_else(|| DEFAULT_BENTO_URL.to_string()),
            site_uuid: required(ARG_BENTO_SITE_UUID)?,
            publishable_key: required(ARG_BENTO_PUBLISHABLE_KEY)?,
            secret_key: SecretString::from(required(ARG_BENTO_SECRET_KEY)?),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_BENTO_URL)
                .long(ARG_BENTO_URL)
                .help("Bento API base URL")
                .default_value(DEFAULT_BENTO_URL)
                .env("ENROLL_BENTO_URL"),
        )
        .arg(
            Arg::new(ARG_BENTO_SITE_UUID)
                .long(ARG_BENTO_SITE_UUID)
                .help("Bento site UUID")
                .env("BENTO_SITE_UUID"),
        )
        .arg(
            Arg::new(ARG_BENTO_PUBLISHABLE_KEY)
                .long(ARG_BENTO_PUBLISHABLE_KEY)
                .help("Bento publishable key (basic auth user)")
                .env("BENTO_PUBLISHABLE_KEY"),
        )
        .arg(
            Arg::new(ARG_BENTO_SECRET_KEY)
                .long(ARG_BENTO_SECRET_KEY)
                .help("Bento secret key (basic auth password)")
                .env("BENTO_SECRET_KEY")
                .hide_env_values(true),
        )
}
