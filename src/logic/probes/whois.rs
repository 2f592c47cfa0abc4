//! Registration Lookup Probe (WHOIS)
//!
//! Plain TCP WHOIS with referral following:
//! root (IANA) → TLD registry (`refer:`) → registrar (`Registrar WHOIS Server:`).
//! Unsupported TLDs, rate limits and unparseable answers all yield `None`.

use std::net::IpAddr;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::logic::config::WhoisConfig;

/// Maximum referral (chained WHOIS) depth to avoid loops.
const MAX_WHOIS_DEPTH: usize = 3;

/// Responses larger than this are truncated
const MAX_RESPONSE_BYTES: u64 = 256 * 1024;

static RE_REFER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^\s*(?:refer|whois):\s*(\S+)\s*$").expect("refer regex"));
static RE_REGISTRAR_SERVER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^\s*registrar whois server:\s*(?:whois://)?(\S+)\s*$").expect("registrar regex")
});
static RE_DOMAIN_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^\s*domain(?: name)?:\s*(\S+)\s*$").expect("domain regex"));
static RE_CREATED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?im)^\s*(?:creation date|created on|created|registered on|registration time|domain registration date|registered):\s*(.+?)\s*$",
    )
    .expect("created regex")
});
static RE_EXPIRES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?im)^\s*(?:registry expiry date|registrar registration expiration date|expiration date|expiry date|expires on|expire date|expires|paid-till):\s*(.+?)\s*$",
    )
    .expect("expires regex")
});
static RE_REGISTRAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^\s*registrar:\s*(.+?)\s*$").expect("registrar name regex"));

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%d-%b-%Y %H:%M:%S",
    "%Y.%m.%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d-%b-%Y",
    "%d-%B-%Y",
    "%Y.%m.%d",
    "%d.%m.%Y",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%Y%m%d",
];

/// Registration record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RegistrationRecord {
    pub creation_date: Option<DateTime<Utc>>,
    pub expiration_date: Option<DateTime<Utc>>,
    /// Registered domain name(s), lower-cased
    pub registered_names: Vec<String>,
    pub registrar: Option<String>,
}

impl RegistrationRecord {
    fn is_empty(&self) -> bool {
        self.creation_date.is_none() && self.expiration_date.is_none() && self.registered_names.is_empty()
    }

    /// Fill gaps in `self` from `other`
    fn merge(mut self, other: RegistrationRecord) -> Self {
        if self.creation_date.is_none() {
            self.creation_date = other.creation_date;
        }
        if self.expiration_date.is_none() {
            self.expiration_date = other.expiration_date;
        }
        if self.registrar.is_none() {
            self.registrar = other.registrar;
        }
        for name in other.registered_names {
            if !self.registered_names.contains(&name) {
                self.registered_names.push(name);
            }
        }
        self
    }
}

#[derive(Debug, Error)]
pub enum WhoisError {
    #[error("no registrable domain in '{0}'")]
    Unsupported(String),
    #[error("connect error to {server}: {source}")]
    Connect { server: String, source: std::io::Error },
    #[error("timeout talking to {0}")]
    Timeout(String),
    #[error("io error with {server}: {source}")]
    Io { server: String, source: std::io::Error },
    #[error("no registration data for {0}")]
    NoRecord(String),
}

/// Perform a basic WHOIS query with a timeout. Returns the raw response.
pub async fn simple_whois(server: &str, port: u16, query: &str, to: Duration) -> Result<String, WhoisError> {
    let mut stream = match timeout(to, TcpStream::connect((server, port))).await {
        Ok(Ok(s)) => s,
        Ok(Err(e)) => return Err(WhoisError::Connect { server: server.to_string(), source: e }),
        Err(_) => return Err(WhoisError::Timeout(server.to_string())),
    };

    let line = format!("{}\r\n", query);
    timeout(to, stream.write_all(line.as_bytes()))
        .await
        .map_err(|_| WhoisError::Timeout(server.to_string()))?
        .map_err(|e| WhoisError::Io { server: server.to_string(), source: e })?;

    let mut buf = Vec::new();
    timeout(to, (&mut stream).take(MAX_RESPONSE_BYTES).read_to_end(&mut buf))
        .await
        .map_err(|_| WhoisError::Timeout(server.to_string()))?
        .map_err(|e| WhoisError::Io { server: server.to_string(), source: e })?;

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Domain actually held by a registrant (`www.example.co.uk` → `example.co.uk`)
pub fn registrable_domain(host: &str) -> Option<String> {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    if host.is_empty() || host.trim_matches(|c| c == '[' || c == ']').parse::<IpAddr>().is_ok() {
        return None;
    }
    psl::domain_str(&host).map(|d| d.to_string())
}

/// Look up the registration record for `host`.
///
/// `config.timeout` bounds the whole referral chain, not each hop.
pub async fn lookup(host: &str, config: &WhoisConfig) -> Option<RegistrationRecord> {
    match timeout(config.timeout, lookup_record(host, config)).await {
        Ok(Ok(record)) => Some(record),
        Ok(Err(e)) => {
            log::debug!("whois lookup failed for {}: {}", host, e);
            None
        }
        Err(_) => {
            log::debug!("whois lookup for {} exceeded {:?}", host, config.timeout);
            None
        }
    }
}

pub async fn lookup_record(host: &str, config: &WhoisConfig) -> Result<RegistrationRecord, WhoisError> {
    let domain = registrable_domain(host).ok_or_else(|| WhoisError::Unsupported(host.to_string()))?;

    let mut server = config.root_server.clone();
    let mut record = RegistrationRecord::default();

    for depth in 0..MAX_WHOIS_DEPTH {
        log::trace!("WHOIS(depth={}) server={} query={}", depth, server, domain);

        let response = match simple_whois(&server, config.port, &domain, config.timeout).await {
            Ok(r) => r,
            // A failed referral keeps whatever the previous hop returned
            Err(e) if !record.is_empty() => {
                log::debug!("whois referral to {} failed: {}", server, e);
                break;
            }
            Err(e) => return Err(e),
        };

        let next = referral(&response);

        // The root answers about the TLD, never about the domain
        if depth == 0 {
            match next {
                Some(n) if !n.eq_ignore_ascii_case(&server) => {
                    server = n;
                    continue;
                }
                _ => return Err(WhoisError::NoRecord(domain)),
            }
        }

        if let Some(parsed) = parse_record(&response) {
            // Registrar data is more specific than registry data
            record = parsed.merge(record);
        }

        match next {
            Some(n) if !n.eq_ignore_ascii_case(&server) => server = n,
            _ => break,
        }
    }

    if record.is_empty() {
        Err(WhoisError::NoRecord(domain))
    } else {
        Ok(record)
    }
}

fn referral(response: &str) -> Option<String> {
    RE_REFER
        .captures(response)
        .or_else(|| RE_REGISTRAR_SERVER.captures(response))
        .and_then(|c| c.get(1).map(|m| m.as_str().trim_end_matches('/').to_ascii_lowercase()))
        .filter(|s| !s.is_empty())
}

/// Parse the fields we care about from a WHOIS answer
pub fn parse_record(text: &str) -> Option<RegistrationRecord> {
    let creation_date = RE_CREATED
        .captures_iter(text)
        .find_map(|c| parse_whois_date(&c[1]));
    let expiration_date = RE_EXPIRES
        .captures_iter(text)
        .find_map(|c| parse_whois_date(&c[1]));

    let mut registered_names: Vec<String> = Vec::new();
    for cap in RE_DOMAIN_NAME.captures_iter(text) {
        let name = cap[1].trim_end_matches('.').to_ascii_lowercase();
        if name.contains('.') && !registered_names.contains(&name) {
            registered_names.push(name);
        }
    }

    let registrar = RE_REGISTRAR
        .captures(text)
        .map(|c| c[1].to_string())
        .filter(|s| !s.is_empty());

    let record = RegistrationRecord {
        creation_date,
        expiration_date,
        registered_names,
        registrar,
    };

    if record.is_empty() {
        None
    } else {
        Some(record)
    }
}

/// Parse the date formats registries actually use
pub fn parse_whois_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    // "2024-08-14T07:01:34Z" variants without offset, "2021-03-01 10:00:00 UTC"
    let stripped = raw.trim_end_matches(" UTC").trim_end_matches('Z');
    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(stripped, fmt) {
            return Some(naive.and_utc());
        }
    }

    let first = stripped.split_whitespace().next().unwrap_or_default();
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(first, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }

    None
}
