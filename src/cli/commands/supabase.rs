use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_SUPABASE_URL: &str = "supabase-url";
pub const ARG_SUPABASE_SERVICE_ROLE_KEY: &str = "supabase-service-role-key";
pub const ARG_DSN: &str = "dsn";

#[derive(Debug, Clone)]
pub struct Options {
    pub url: String,
    pub service_role_key: SecretString,
    pub dsn: Option<String>,
}

impl Options {
    /// Parse Supabase arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the URL or service-role key is missing or empty.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        // Env vars set to "" reach us as empty strings
        let get_non_empty = |id: &str| {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
        };

        let Some(url) = get_non_empty(ARG_SUPABASE_URL) else {
            anyhow::bail!("missing required argument: --{ARG_SUPABASE_URL}");
        };
        let Some(key) = get_non_empty(ARG_SUPABASE_SERVICE_ROLE_KEY) else {
            anyhow::bail!("missing required argument: --{ARG_SUPABASE_SERVICE_ROLE_KEY}");
        };

        Ok(Self {
            url,
            service_role_key: SecretString::from(key),
            dsn: get_non_empty(ARG_DSN),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SUPABASE_URL)
                .long(ARG_SUPABASE_URL)
                .help("Supabase project URL, example: https://<ref>.supabase.co")
                .env("SUPABASE_URL"),
        )
        .arg(
            Arg::new(ARG_SUPABASE_SERVICE_ROLE_KEY)
                .long(ARG_SUPABASE_SERVICE_ROLE_KEY)
                .help("Supabase service-role key used for admin and users table calls")
                .env("SUPABASE_SERVICE_ROLE_KEY")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_DSN)
                .short('d')
                .long(ARG_DSN)
                .help("Database connection string for the users table")
                .long_help(
                    "Database connection string for the users table. When omitted, the table is reached through the Supabase REST API.",
                )
                .env("ENROLL_DSN"),
        )
}
