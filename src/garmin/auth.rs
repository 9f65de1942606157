use std::fmt;

use crate::errors::{ProgressError, Result};

pub(crate) const SSO_URL: &str = "https://sso.garmin.com/sso";
pub(crate) const CONNECT_URL: &str = "https://connect.garmin.com/modern";

pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| ProgressError::Config(format!("{} is not set", name)))
        };

        Ok(Self {
            email: required("GARMIN_EMAIL")?,
            password: required("GARMIN_PASSWORD")?,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Query parameters of the SSO sign-in page, unencoded.
pub(crate) fn signin_params() -> Vec<(&'static str, &'static str)> {
    vec![
        ("service", CONNECT_URL),
        ("webhost", CONNECT_URL),
        ("source", "https://connect.garmin.com/signin/"),
        ("redirectAfterAccountLoginUrl", CONNECT_URL),
        ("redirectAfterAccountCreationUrl", CONNECT_URL),
        ("gauthHost", SSO_URL),
        ("locale", "en_US"),
        ("id", "gauth-widget"),
        ("clientId", "GarminConnect"),
        ("consumeServiceTicket", "false"),
        ("generateExtraServiceTicket", "true"),
        ("embed", "false"),
    ]
}

/// Pulls the service ticket out of the sign-in response page.
pub(crate) fn extract_ticket(page: &str) -> Option<String> {
    let start = page.find("ticket=")? + "ticket=".len();
    let ticket: String = page[start..]
        .chars()
        .take_while(|c| !matches!(c, '"' | '\'' | '&' | '\\' | ';') && !c.is_whitespace())
        .collect();

    if ticket.is_empty() {
        None
    } else {
        Some(ticket)
    }
}
