// Core data structures for the cascade scheduler

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::scheduler::time::{TimeContext, TimestampError};

/// Social platform a post can be published to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Twitter,
    Instagram,
    Facebook,
    Linkedin,
    Tiktok,
    GoogleBusiness,
}

impl Platform {
    /// Get all platforms in default fan-out order
    pub fn all() -> Vec<Self> {
        vec![
            Self::Twitter,
            Self::Instagram,
            Self::Facebook,
            Self::Linkedin,
            Self::Tiktok,
            Self::GoogleBusiness,
        ]
    }

    /// Get platform ID
    pub fn id(&self) -> &'static str {
        match self {
            Self::Twitter => "twitter",
            Self::Instagram => "instagram",
            Self::Facebook => "facebook",
            Self::Linkedin => "linkedin",
            Self::Tiktok => "tiktok",
            Self::GoogleBusiness => "google_business",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Twitter => "Twitter",
            Self::Instagram => "Instagram",
            Self::Facebook => "Facebook",
            Self::Linkedin => "LinkedIn",
            Self::Tiktok => "TikTok",
            Self::GoogleBusiness => "Google My Business",
        }
    }

    /// Parse a calendar network name (case-insensitive, common aliases)
    pub fn from_network(network: &str) -> Option<Self> {
        match network.trim().to_lowercase().as_str() {
            "twitter" | "x" => Some(Self::Twitter),
            "instagram" | "ig" => Some(Self::Instagram),
            "facebook" | "fb" => Some(Self::Facebook),
            "linkedin" => Some(Self::Linkedin),
            "tiktok" => Some(Self::Tiktok),
            "google" | "googlebusiness" | "google_business" | "gmb"
            | "google_my_business" | "googlemybusiness" => Some(Self::GoogleBusiness),
            _ => None,
        }
    }

    /// Parse a comma separated platform list, rejecting unknown names
    pub fn parse_list(value: &str) -> Result<Vec<Self>, String> {
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Self::from_network(s).ok_or_else(|| format!("unknown platform '{s}'")))
            .collect()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_network(s).ok_or_else(|| format!("unknown platform '{s}'"))
    }
}

// ============================================================================
// Calendar wire shape
// ============================================================================

/// Scheduled post as returned by the calendar adapter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPost {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub publication_date: Option<PublicationDate>,
    #[serde(default)]
    pub providers: Vec<Provider>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicationDate {
    #[serde(default)]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub network: String,
}

impl RawPost {
    /// Build a raw post from a timestamp string and network names
    pub fn new(date_time: impl Into<String>, networks: &[&str]) -> Self {
        Self {
            id: None,
            publication_date: Some(PublicationDate {
                date_time: Some(date_time.into()),
                timezone: None,
            }),
            providers: networks
                .iter()
                .map(|n| Provider {
                    network: (*n).to_string(),
                })
                .collect(),
        }
    }

    /// Attach an ID
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Raw timestamp string, if present
    pub fn date_time(&self) -> Option<&str> {
        self.publication_date
            .as_ref()
            .and_then(|d| d.date_time.as_deref())
    }
}

/// Reasons a raw post is skipped
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedPost {
    /// No publication timestamp
    #[error("post {0} has no publication timestamp")]
    MissingTimestamp(String),

    /// Timestamp present but unreadable
    #[error("post {id} has an invalid timestamp: {source}")]
    InvalidTimestamp {
        id: String,
        #[source]
        source: TimestampError,
    },

    /// No recognised platform
    #[error("post {0} targets no known platform")]
    NoPlatforms(String),
}

// ============================================================================
// Scheduled post
// ============================================================================

/// Validated snapshot of one scheduling event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledPost {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub published_at: DateTime<FixedOffset>,
    pub platforms: BTreeSet<Platform>,
}

impl ScheduledPost {
    /// Create a post directly
    pub fn new(published_at: DateTime<FixedOffset>, platforms: impl IntoIterator<Item = Platform>) -> Self {
        Self {
            id: None,
            published_at,
            platforms: platforms.into_iter().collect(),
        }
    }

    /// Validate a raw calendar record
    pub fn from_raw(raw: &RawPost, ctx: &TimeContext) -> Result<Self, MalformedPost> {
        let label = raw.id.clone().unwrap_or_else(|| "<unnamed>".to_string());

        let date_time = raw
            .date_time()
            .ok_or_else(|| MalformedPost::MissingTimestamp(label.clone()))?;
        let zone_hint = raw
            .publication_date
            .as_ref()
            .and_then(|d| d.timezone.as_deref());

        let published_at =
            ctx.parse(date_time, zone_hint)
                .map_err(|source| MalformedPost::InvalidTimestamp {
                    id: label.clone(),
                    source,
                })?;

        let platforms: BTreeSet<Platform> = raw
            .providers
            .iter()
            .filter_map(|p| {
                let platform = Platform::from_network(&p.network);
                if platform.is_none() {
                    tracing::debug!(network = %p.network, post = %label, "Ignoring unknown network");
                }
                platform
            })
            .collect();

        if platforms.is_empty() {
            return Err(MalformedPost::NoPlatforms(label));
        }

        Ok(Self {
            id: raw.id.clone(),
            published_at,
            platforms,
        })
    }
}

// ============================================================================
// Topic
// ============================================================================

/// One content item, possibly cross-posted, counted once per day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Topic {
    /// Local calendar day
    pub date: NaiveDate,
    /// Earliest member timestamp
    pub representative_time: DateTime<FixedOffset>,
    /// Latest member timestamp
    pub last_time: DateTime<FixedOffset>,
    /// Union of member platforms
    pub platforms: BTreeSet<Platform>,
    /// Member posts in time order
    pub posts: Vec<ScheduledPost>,
}

impl Topic {
    /// Open a topic with its first post
    pub fn start(date: NaiveDate, post: ScheduledPost) -> Self {
        Self {
            date,
            representative_time: post.published_at,
            last_time: post.published_at,
            platforms: post.platforms.clone(),
            posts: vec![post],
        }
    }

    /// Extend the topic with a later post
    pub fn absorb(&mut self, post: ScheduledPost) {
        if post.published_at > self.last_time {
            self.last_time = post.published_at;
        }
        self.platforms.extend(post.platforms.iter().copied());
        self.posts.push(post);
    }

    /// Number of member posts
    pub fn post_count(&self) -> usize {
        self.posts.len()
    }

    /// Platforms as IDs
    pub fn platform_ids(&self) -> Vec<&'static str> {
        self.platforms.iter().map(|p| p.id()).collect()
    }
}
