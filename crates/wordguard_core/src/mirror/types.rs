//! Mirror contract, wire record and address types.

use crate::model::word::{Word, WordId, UNASSIGNED_WORD_ID};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// URI scheme of provider-style mirror addresses.
pub const MIRROR_SCHEME: &str = "content";

pub type MirrorResult<T> = Result<T, MirrorError>;

/// Mirror failures. All of them are non-fatal for the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorError {
    /// No provider is registered for the address authority.
    NotAvailable(String),
    /// The provider was reachable but the query failed.
    FetchFailed(String),
    /// The provider returned rows that cannot form a word snapshot.
    Malformed(String),
    /// Insert or wipe failed.
    WriteFailed(String),
}

impl MirrorError {
    /// Returns whether this failure means the pull must be skipped.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::NotAvailable(_) | Self::FetchFailed(_) | Self::Malformed(_)
        )
    }

    /// Stable machine-readable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotAvailable(_) => "mirror_not_available",
            Self::FetchFailed(_) => "mirror_fetch_failed",
            Self::Malformed(_) => "mirror_malformed",
            Self::WriteFailed(_) => "mirror_write_failed",
        }
    }
}

impl Display for MirrorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAvailable(authority) => write!(f, "mirror provider not available: {authority}"),
            Self::FetchFailed(message) => write!(f, "mirror fetch failed: {message}"),
            Self::Malformed(message) => write!(f, "mirror snapshot is malformed: {message}"),
            Self::WriteFailed(message) => write!(f, "mirror write failed: {message}"),
        }
    }
}

impl Error for MirrorError {}

/// One row as exchanged with the external store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorRecord {
    #[serde(default)]
    pub id: Option<WordId>,
    pub text: String,
    #[serde(default)]
    pub matched: bool,
}

impl MirrorRecord {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
            matched: false,
        }
    }
}

impl From<&Word> for MirrorRecord {
    fn from(word: &Word) -> Self {
        Self {
            id: word.is_persisted().then_some(word.id),
            text: word.text.clone(),
            matched: word.matched,
        }
    }
}

/// Converts a fetched snapshot into words for a local replace.
///
/// Blank text rejects the whole snapshot. Repeated texts keep the first row.
/// A positive mirror id is kept so the next push replaces the same mirror
/// row; missing, non-positive or repeated ids leave the word unassigned.
pub fn snapshot_to_words(records: Vec<MirrorRecord>) -> MirrorResult<Vec<Word>> {
    let mut seen = BTreeSet::new();
    let mut seen_ids = BTreeSet::new();
    let mut words = Vec::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        if record.text.trim().is_empty() {
            return Err(MirrorError::Malformed(format!(
                "row {index} has blank text"
            )));
        }
        if !seen.insert(record.text.clone()) {
            continue;
        }
        let id = record
            .id
            .filter(|id| *id > 0 && seen_ids.insert(*id))
            .unwrap_or(UNASSIGNED_WORD_ID);
        words.push(
            Word::new(record.text)
                .with_id(id)
                .with_matched(record.matched),
        );
    }

    Ok(words)
}

/// External store contract.
///
/// Implementations must be cheap to call from the blocking pool and must not
/// panic on transport failures.
pub trait MirrorStore: Send + Sync {
    /// Provider authority this store answers for.
    fn authority(&self) -> &str;
    /// Inserts one record; an existing id is replaced.
    fn insert(&self, record: &MirrorRecord) -> MirrorResult<()>;
    fn fetch_all(&self) -> MirrorResult<Vec<MirrorRecord>>;
    /// Best-effort wipe of every record.
    fn wipe(&self) -> MirrorResult<()>;
    /// Whether the platform hosting this mirror supports `wipe`.
    fn supports_wipe(&self) -> bool {
        true
    }
}

/// Address parsing errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorAddressError {
    UnsupportedScheme(String),
    InvalidAuthority(String),
    InvalidTable(String),
}

impl Display for MirrorAddressError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedScheme(value) => {
                write!(f, "mirror address must start with `{MIRROR_SCHEME}://`: {value}")
            }
            Self::InvalidAuthority(value) => write!(f, "mirror authority is invalid: {value}"),
            Self::InvalidTable(value) => write!(f, "mirror table is invalid: {value}"),
        }
    }
}

impl Error for MirrorAddressError {}

/// Provider-style address, `content://<authority>/<table>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MirrorAddress {
    authority: String,
    table: String,
}

impl MirrorAddress {
    pub fn new(
        authority: impl Into<String>,
        table: impl Into<String>,
    ) -> Result<Self, MirrorAddressError> {
        let authority = authority.into().trim().to_string();
        let table = table.into().trim().to_string();
        if !is_valid_authority(&authority) {
            return Err(MirrorAddressError::InvalidAuthority(authority));
        }
        if !is_valid_table(&table) {
            return Err(MirrorAddressError::InvalidTable(table));
        }
        Ok(Self { authority, table })
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

impl FromStr for MirrorAddress {
    type Err = MirrorAddressError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let rest = trimmed
            .strip_prefix(MIRROR_SCHEME)
            .and_then(|rest| rest.strip_prefix("://"))
            .ok_or_else(|| MirrorAddressError::UnsupportedScheme(trimmed.to_string()))?;
        let (authority, table) = rest
            .split_once('/')
            .ok_or_else(|| MirrorAddressError::InvalidTable(String::new()))?;
        Self::new(authority, table)
    }
}

impl Display for MirrorAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{MIRROR_SCHEME}://{}/{}", self.authority, self.table)
    }
}

pub(crate) fn is_valid_authority(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with('.')
        && !value.ends_with('.')
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-')
}

fn is_valid_table(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
