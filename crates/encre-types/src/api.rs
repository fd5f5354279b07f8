//! Request drafts and response envelopes for the backend REST surface.
//!
//! Response bodies are keyed objects, never bare arrays; every collection
//! field defaults to empty so a missing key reads as "no data" rather
//! than a decode failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{
    Announcement, Author, Circle, CircleMessage, ContentReport, Donor, Duo, DuoMessage,
    GardenComment, Report, ReportedContentType, Resonance, Sponsorship, SubscribedAuthor,
    Subscriber, Text,
};

// -- Drafts (entities posted without server-assigned fields) --

/// A text as submitted for publication; the backend assigns the id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewText {
    pub author: Author,
    pub title: String,
    pub content: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub themes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub date: String,
    pub published_at: DateTime<Utc>,
    pub has_audio_recording: bool,
    pub subscribers_only: bool,
}

/// A garden comment as submitted; id and timestamp come back from the
/// backend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub user: Author,
    pub content: String,
    pub date: String,
}

/// A duo or circle message as submitted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub user: Author,
    pub content: String,
    pub date: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCircle {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_count: Option<u32>,
    pub is_duo: bool,
    /// Initial member names; when absent the creator joins alone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSponsorship {
    pub brand: String,
    pub category: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub cta_text: String,
    pub cta_url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnnouncement {
    pub date: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circles: Option<Vec<Circle>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContentReport {
    pub content_type: ReportedContentType,
    pub content_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circle_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duo_name: Option<String>,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported_by: Option<String>,
}

/// Locator for a piece of reported content the moderator removes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedContentRef {
    pub content_type: ReportedContentType,
    pub content_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circle_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duo_name: Option<String>,
}

// -- Response envelopes --

#[derive(Debug, Clone, Deserialize)]
pub struct TextsResponse {
    #[serde(default)]
    pub texts: Vec<Text>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveTextResponse {
    pub data: Text,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AllCommentsResponse {
    #[serde(default)]
    pub comments: HashMap<String, Vec<GardenComment>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentsResponse {
    #[serde(default)]
    pub comments: Vec<GardenComment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveCommentResponse {
    pub comment: GardenComment,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BioResponse {
    #[serde(default)]
    pub bio: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionsResponse {
    #[serde(default)]
    pub subscriptions: Vec<SubscribedAuthor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscribersResponse {
    #[serde(default)]
    pub subscribers: Vec<Subscriber>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DonorsResponse {
    #[serde(default)]
    pub donors: Vec<Donor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DuosResponse {
    #[serde(default)]
    pub duos: Vec<Duo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AllDuoMessagesResponse {
    #[serde(default)]
    pub messages: HashMap<String, Vec<DuoMessage>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveDuoMessageResponse {
    pub message: DuoMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CirclesResponse {
    #[serde(default)]
    pub circles: Vec<Circle>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveCircleResponse {
    pub circle: Circle,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CircleMembersResponse {
    #[serde(default)]
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CircleMessagesResponse {
    #[serde(default)]
    pub messages: Vec<CircleMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EchosResponse {
    #[serde(default)]
    pub echos: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResonancesResponse {
    #[serde(default)]
    pub resonances: Vec<Resonance>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastReadsResponse {
    #[serde(default)]
    pub last_reads: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SponsorshipsResponse {
    #[serde(default)]
    pub sponsorships: Vec<Sponsorship>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnnouncementsResponse {
    #[serde(default)]
    pub announcements: Vec<Announcement>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatusResponse {
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportsResponse {
    #[serde(default)]
    pub reports: Vec<Report>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentReportsResponse {
    #[serde(default)]
    pub reports: Vec<ContentReport>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityResponse {
    #[serde(default)]
    pub available: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupResponse {
    #[serde(default)]
    pub success: bool,
}
