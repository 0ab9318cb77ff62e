//! Session folder naming
//!
//! One function chain turns a booking into its folder path. Creation, lookup,
//! stats and cache reconciliation all go through [`SessionKey`], so they can
//! never disagree on where a session lives.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::path::PathBuf;

use crate::error::StorageError;
use crate::session::booking::BookingDetails;

pub const MAX_NAME_LEN: usize = 30;

/// Joins the two party names of a wedding booking
pub const COUPLE_CONNECTOR: &str = "_و_";

const FALLBACK_NAME: &str = "session";

/// The four fixed folders of every session, prefixed so listings sort in workflow order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Subfolder {
    Raw,
    Selected,
    Edited,
    Final,
}

impl Subfolder {
    pub const ALL: [Subfolder; 4] = [
        Subfolder::Raw,
        Subfolder::Selected,
        Subfolder::Edited,
        Subfolder::Final,
    ];

    pub fn dir_name(self) -> &'static str {
        match self {
            Subfolder::Raw => "01_RAW",
            Subfolder::Selected => "02_SELECTED",
            Subfolder::Edited => "03_EDITED",
            Subfolder::Final => "04_FINAL",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Subfolder::Raw => "original camera files",
            Subfolder::Selected => "photos chosen by the client",
            Subfolder::Edited => "retouched photos",
            Subfolder::Final => "deliverables ready for the client",
        }
    }
}

impl std::str::FromStr for Subfolder {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Subfolder::ALL
            .into_iter()
            .find(|f| {
                let dir = f.dir_name();
                wanted == dir || wanted == dir[3..]
            })
            .ok_or_else(|| StorageError::InvalidInput(format!("unknown subfolder: {}", s)))
    }
}

fn is_permitted_script(c: char) -> bool {
    matches!(c,
        '\u{0600}'..='\u{06FF}'
        | '\u{0750}'..='\u{077F}'
        | '\u{08A0}'..='\u{08FF}'
        | '\u{FB50}'..='\u{FDFF}'
        | '\u{FE70}'..='\u{FEFC}')
}

/// Reduce a display name to a folder-safe fragment.
///
/// Keeps ASCII alphanumerics, Arabic script and whitespace; whitespace runs
/// become a single `_`; the result is at most [`MAX_NAME_LEN`] characters.
pub fn sanitize_name(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || is_permitted_script(*c) || c.is_whitespace())
        .collect();

    let joined = kept.split_whitespace().collect::<Vec<_>>().join("_");
    let truncated: String = joined.chars().take(MAX_NAME_LEN).collect();
    let trimmed = truncated.trim_end_matches('_');

    if trimmed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Accepts `YYYY-MM-DD` or an ISO-8601 timestamp starting with one
pub fn parse_session_date(date_str: &str) -> Result<NaiveDate, StorageError> {
    let trimmed = date_str.trim();
    let head = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .map_err(|e| StorageError::InvalidInput(format!("bad session date '{}': {}", date_str, e)))
}

/// Everything needed to locate a session folder
#[derive(Debug, Clone, PartialEq)]
pub struct SessionKey {
    pub client_name: String,
    pub session_id: String,
    pub date: NaiveDate,
    pub booking: Option<BookingDetails>,
}

impl SessionKey {
    pub fn new(
        client_name: &str,
        session_id: &str,
        date_str: &str,
        booking: Option<BookingDetails>,
    ) -> Result<Self, StorageError> {
        let key = Self {
            client_name: client_name.trim().to_string(),
            session_id: session_id.trim().to_string(),
            date: parse_session_date(date_str)?,
            booking,
        };
        if key.display_name().trim().is_empty() {
            return Err(StorageError::InvalidInput("client name is empty".into()));
        }
        Ok(key)
    }

    /// The couple's names for a wedding booking, the client name otherwise
    pub fn display_name(&self) -> String {
        self.booking
            .as_ref()
            .and_then(BookingDetails::couple_name)
            .unwrap_or_else(|| self.client_name.clone())
    }

    /// `YYYY-MM-DD_{sanitized name}`
    pub fn folder_name(&self) -> String {
        format!(
            "{}_{}",
            self.date.format("%Y-%m-%d"),
            sanitize_name(&self.display_name())
        )
    }

    /// `YYYY/MM/{folder name}`, relative to a storage root
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(format!("{:04}", self.date.year()))
            .join(format!("{:02}", self.date.month()))
            .join(self.folder_name())
    }
}
