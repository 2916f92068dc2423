//! Meeting link detection.
//!
//! Event notes are scanned for URLs and the first one pointing at a Google
//! Meet or Hangouts host becomes the event's meeting link.
//!
//! # Example
//!
//! ```
//! use nextup_core::links::{find_meeting_link, LinkKind};
//!
//! let notes = "Agenda: roadmap\nJoin: https://meet.google.com/abc-defg-hij";
//! let link = find_meeting_link(notes).unwrap();
//! assert_eq!(link.kind, LinkKind::GoogleMeet);
//! ```

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Regex for extracting URLs from text.
static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"'\)\]]+"#).expect("Invalid URL regex"));

/// The video conferencing service a link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    GoogleMeet,
    Hangouts,
}

impl LinkKind {
    /// Returns a human-readable name for this link kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::GoogleMeet => "Google Meet",
            Self::Hangouts => "Google Hangouts",
        }
    }

    fn from_host(host: &str) -> Option<Self> {
        match host {
            "meet.google.com" => Some(Self::GoogleMeet),
            "hangouts.google.com" => Some(Self::Hangouts),
            _ => None,
        }
    }
}

/// A joinable meeting link found in an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingLink {
    /// The detected service.
    pub kind: LinkKind,
    /// The URL as it appeared in the text.
    pub url: String,
}

/// Extracts all raw URLs from the given text.
pub fn extract_urls(text: &str) -> Vec<&str> {
    URL_REGEX.find_iter(text).map(|m| m.as_str()).collect()
}

/// Classifies a single URL, returning `None` for anything that is not a
/// recognised meeting host or does not parse.
pub fn detect_link(raw: &str) -> Option<MeetingLink> {
    let url = Url::parse(raw).ok()?;
    let kind = LinkKind::from_host(url.host_str()?)?;
    Some(MeetingLink {
        kind,
        url: raw.to_string(),
    })
}

/// Returns the first meeting link found in `text`.
pub fn find_meeting_link(text: &str) -> Option<MeetingLink> {
    extract_urls(text).into_iter().find_map(detect_link)
}
