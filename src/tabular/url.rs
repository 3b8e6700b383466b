use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::UsageError;

pub const DEFAULT_PORT: u16 = 1239;

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:jdbc:)?scidb://([A-Za-z0-9.\-_]+|\[[0-9A-Fa-f:.]+\])(?::(\d{1,5}))?/?$")
        .unwrap()
});

/// `scidb://host[:port][/]`, optionally prefixed with `jdbc:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionUrl {
    pub host: String,
    pub port: u16,
}

impl ConnectionUrl {
    pub fn parse(url: &str) -> Result<Self, UsageError> {
        let caps = URL_RE
            .captures(url.trim())
            .ok_or_else(|| UsageError::InvalidUrl(url.to_string()))?;
        let host = caps[1].trim_start_matches('[').trim_end_matches(']').to_string();
        let port = match caps.get(2) {
            Some(p) => p
                .as_str()
                .parse::<u16>()
                .map_err(|_| UsageError::InvalidUrl(url.to_string()))?,
            None => DEFAULT_PORT,
        };
        Ok(Self { host, port })
    }

    pub fn accepts(url: &str) -> bool {
        URL_RE.is_match(url.trim())
    }
}
