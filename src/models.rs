use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub type StoryId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    #[serde(deserialize_with = "deserialize_story_id")]
    pub id: StoryId,
    pub title: String,
    #[serde(default)]
    pub category: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub cover_image: String,
    #[serde(default)]
    pub content: String,
}

/// A story as submitted by the form, before the backend assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStory {
    pub title: String,
    pub category: Vec<String>,
    pub description: String,
    pub date: String,
    pub cover_image: String,
    pub content: String,
}

/// Only the fields being changed; unset fields are left out of the PATCH body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

// Some backends hand ids out as numeric strings ("7") rather than numbers.
fn deserialize_story_id<'de, D>(deserializer: D) -> Result<StoryId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(StoryId),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("story id {text:?} is not an integer"))),
    }
}

pub const FALLBACK_CATEGORY: &str = "General";

impl Story {
    /// First tag, shown on cards.
    pub fn primary_category(&self) -> &str {
        self.category
            .first()
            .map(String::as_str)
            .unwrap_or(FALLBACK_CATEGORY)
    }

    /// Creation time, or `None` when the backend sent something unparseable.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        parse_story_date(&self.date)
    }

    /// "Jan 5"
    pub fn short_date(&self) -> String {
        self.published_at()
            .map(|dt| dt.format("%b %-d").to_string())
            .unwrap_or_else(|| self.date.clone())
    }

    /// "January 5, 2025"
    pub fn long_date(&self) -> String {
        self.published_at()
            .map(|dt| dt.format("%B %-d, %Y").to_string())
            .unwrap_or_else(|| self.date.clone())
    }
}

/// Accepts full RFC 3339 timestamps and bare `YYYY-MM-DD` dates (taken as UTC midnight).
pub fn parse_story_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOption {
    #[default]
    Latest,
    Oldest,
    Alphabetical,
}

impl SortOption {
    pub const ALL: [SortOption; 3] = [
        SortOption::Latest,
        SortOption::Oldest,
        SortOption::Alphabetical,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortOption::Latest => "Latest First",
            SortOption::Oldest => "Oldest First",
            SortOption::Alphabetical => "A-Z",
        }
    }
}

/// Rough topic of a tag, used to pick a glyph for story cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    Finance,
    Tech,
    Health,
    Mobile,
    Work,
    Art,
    Other,
}

impl CategoryKind {
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| tag.contains(w));

        if has(&["finance", "money", "business"]) {
            CategoryKind::Finance
        } else if has(&["tech", "code", "dev"]) {
            CategoryKind::Tech
        } else if has(&["health", "life", "wellness"]) {
            CategoryKind::Health
        } else if has(&["mobile", "app"]) {
            CategoryKind::Mobile
        } else if has(&["work", "job"]) {
            CategoryKind::Work
        } else if has(&["art", "design"]) {
            CategoryKind::Art
        } else {
            CategoryKind::Other
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            CategoryKind::Finance => "📈",
            CategoryKind::Tech => "💻",
            CategoryKind::Health => "❤",
            CategoryKind::Mobile => "📱",
            CategoryKind::Work => "💼",
            CategoryKind::Art => "⚡",
            CategoryKind::Other => "🌐",
        }
    }
}
