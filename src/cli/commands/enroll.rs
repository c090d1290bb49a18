use crate::api::handlers::state::{
    DEFAULT_CONFIRM_URL, DEFAULT_EMAIL_FROM, DEFAULT_EMAIL_SUBJECT,
};
use clap::{Arg, ArgMatches, Command};

pub const ARG_CONFIRM_URL: &str = "confirm-url";
pub const ARG_EMAIL_FROM: &str = "email-from";
pub const ARG_EMAIL_SUBJECT: &str = "email-subject";

#[derive(Debug, Clone)]
pub struct Options {
    pub confirm_url: String,
    pub email_from: String,
    pub email_subject: String,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        let get_or = |id: &str, default: &str| {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            confirm_url: get_or(ARG_CONFIRM_URL, DEFAULT_CONFIRM_URL),
            email_from: get_or(ARG_EMAIL_FROM, DEFAULT_EMAIL_FROM),
            email_subject: get_or(ARG_EMAIL_SUBJECT, DEFAULT_EMAIL_SUBJECT),
        }
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_CONFIRM_URL)
                .long(ARG_CONFIRM_URL)
                .help("Confirmation link base; ?user=<id> is appended")
                .default_value(DEFAULT_CONFIRM_URL)
                .env("ENROLL_CONFIRM_URL"),
        )
        .arg(
            Arg::new(ARG_EMAIL_FROM)
                .long(ARG_EMAIL_FROM)
                .help("Sender address for the confirmation email")
                .default_value(DEFAULT_EMAIL_FROM)
                .env("ENROLL_EMAIL_FROM"),
        )
        .arg(
            Arg::new(ARG_EMAIL_SUBJECT)
                .long(ARG_EMAIL_SUBJECT)
                .help("Subject line of the confirmation email")
                .default_value(DEFAULT_EMAIL_SUBJECT)
                .env("ENROLL_EMAIL_SUBJECT"),
        )
}
