// src/model.rs
//! Stored records, client-facing views and upstream payload shapes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Which upstream collection a record or sync run belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Launch,
    Event,
}

impl ResourceKind {
    /// Path segment of the upstream collection (`/launch`, `/event`).
    pub fn path(self) -> &'static str {
        match self {
            ResourceKind::Launch => "launch",
            ResourceKind::Event => "event",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRef {
    pub launch_id: String,
    /// Id of a [`Provider`] record.
    pub provider: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRef {
    pub event_id: String,
    /// Id of a [`Provider`] record.
    pub provider: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub news_site: String,
    #[serde(default)]
    pub summary: Option<String>,
    pub published_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub launches: Vec<LaunchRef>,
    #[serde(default)]
    pub events: Vec<EventRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    pub name: String,
}

/// Reports carry no launch/event references; they are served as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub news_site: String,
    #[serde(default)]
    pub summary: Option<String>,
    pub published_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A launch or event reference with its provider resolved to a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedRef {
    pub id: String,
    pub provider: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedArticle {
    pub id: String,
    pub title: String,
    pub url: String,
    pub image_url: Option<String>,
    pub news_site: String,
    pub summary: Option<String>,
    pub published_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub featured: bool,
    pub launches: Vec<EnrichedRef>,
    pub events: Vec<EnrichedRef>,
}

// ---- upstream (Launch Library) payloads ----

/// One page of a paginated upstream collection.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamLaunch {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub net: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<NamedRef>,
    #[serde(default)]
    pub launch_service_provider: Option<NamedRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamEvent {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default, rename = "type")]
    pub event_type: Option<NamedRef>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

// Launch ids are UUID strings, event ids are integers.
fn id_from_string_or_number<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }
    match RawId::deserialize(de)? {
        RawId::Text(s) if s.trim().is_empty() => {
            Err(serde::de::Error::custom("upstream id is empty"))
        }
        RawId::Text(s) => Ok(s),
        RawId::Number(n) => Ok(n.to_string()),
    }
}

// ---- local sync records ----

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRecord {
    pub id: String,
    pub name: String,
    pub net: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub provider: Option<String>,
}

impl From<UpstreamLaunch> for LaunchRecord {
    fn from(l: UpstreamLaunch) -> Self {
        Self {
            id: l.id,
            name: l.name,
            net: l.net,
            status: l.status.map(|s| s.name),
            provider: l.launch_service_provider.map(|p| p.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: String,
    pub name: String,
    pub event_type: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

impl From<UpstreamEvent> for EventRecord {
    fn from(e: UpstreamEvent) -> Self {
        Self {
            id: e.id,
            name: e.name,
            event_type: e.event_type.map(|t| t.name),
            date: e.date,
        }
    }
}
