use super::RecordKind;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

const ID_NAMESPACE: &str = "offline";
const RANDOM_SUFFIX_LEN: usize = 9;
const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Client-generated queue identifier: `offline-<kind>-<millis>-<random>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PendingRecordId(String);

impl PendingRecordId {
    pub fn generate(kind: RecordKind, now: DateTime<Utc>) -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..RANDOM_SUFFIX_LEN)
            .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
            .collect();
        Self(format!(
            "{ID_NAMESPACE}-{}-{}-{suffix}",
            kind.id_prefix(),
            now.timestamp_millis()
        ))
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        Self::validate(value)?;
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> Option<RecordKind> {
        self.0
            .split('-')
            .nth(1)
            .and_then(RecordKind::from_id_prefix)
    }

    /// Whether `value` has the shape of a locally generated id for `kind`.
    pub fn is_local_for(value: &str, kind: RecordKind) -> bool {
        value.starts_with(&format!("{ID_NAMESPACE}-{}-", kind.id_prefix()))
    }

    fn validate(value: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            return Err("Pending record ID cannot be empty".to_string());
        }
        let mut parts = value.splitn(4, '-');
        let namespace = parts.next();
        let prefix = parts.next();
        let millis = parts.next();
        let suffix = parts.next();
        match (namespace, prefix, millis, suffix) {
            (Some(ID_NAMESPACE), Some(prefix), Some(millis), Some(suffix))
                if RecordKind::from_id_prefix(prefix).is_some()
                    && millis.parse::<i64>().is_ok()
                    && !suffix.is_empty() =>
            {
                Ok(())
            }
            _ => Err(format!("Malformed pending record ID: {value}")),
        }
    }
}

impl fmt::Display for PendingRecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<PendingRecordId> for String {
    fn from(id: PendingRecordId) -> Self {
        id.0
    }
}

impl TryFrom<String> for PendingRecordId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::validate(&value)?;
        Ok(Self(value))
    }
}

impl FromStr for PendingRecordId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
