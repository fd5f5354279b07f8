use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub avatar: String,
}

/// A published writing. Authorship is a plain name match, not a foreign
/// key — the backend is the sole source of truth for identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    pub id: String,
    pub author: Author,
    pub title: String,
    pub content: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub themes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Display-ready age string ("il y a 2h") captured at publish time.
    pub date: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub is_echoed: bool,
    #[serde(default)]
    pub is_saved: bool,
    #[serde(default)]
    pub has_new_comments: bool,
    #[serde(default)]
    pub has_audio_recording: bool,
    #[serde(default)]
    pub subscribers_only: bool,
}

/// A comment in the garden (thread) under a text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GardenComment {
    pub id: String,
    pub user: Author,
    pub content: String,
    pub date: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribedAuthor {
    pub author_name: String,
    pub price: f64,
    pub subscribed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub name: String,
    pub subscribed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    pub name: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub donated_at: DateTime<Utc>,
}

/// A private two-party conversation, keyed by the peer's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Duo {
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuoMessage {
    pub id: String,
    pub user: Author,
    pub content: String,
    pub date: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Circle {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_count: Option<u32>,
    #[serde(default)]
    pub is_duo: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleMessage {
    pub id: String,
    pub user: Author,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Admin-managed sponsored card shown in the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sponsorship {
    pub id: String,
    pub brand: String,
    pub category: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub cta_text: String,
    pub cta_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: String,
    pub date: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circles: Option<Vec<Circle>>,
    pub created_at: i64,
}

/// Backend-computed affinity between the current user and another, based
/// on shared echoes. The computation itself is opaque to this client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resonance {
    pub user_id: String,
    pub common_echoes: u32,
    pub last_common_text_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub text_id: String,
    pub reason: String,
    pub reported_by: String,
    pub created_at: i64,
    /// The reported text, attached by the moderation endpoint when it
    /// still exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<Text>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportedContentType {
    Comment,
    CircleMessage,
    DuoMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentReport {
    pub id: String,
    pub content_type: ReportedContentType,
    pub content_id: String,
    pub reason: String,
    pub reported_by: String,
    pub created_at: i64,
    /// Shape varies with `content_type` (comment, circle message, duo
    /// message), so it stays untyped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<serde_json::Value>,
}
