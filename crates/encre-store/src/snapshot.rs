use std::collections::HashMap;

use chrono::{DateTime, Utc};
use encre_types::models::{
    Circle, Donor, Duo, DuoMessage, GardenComment, Sponsorship, SubscribedAuthor, Subscriber, Text,
};
use encre_types::read_marker::ReadMarkerKey;

/// The unified in-memory mirror of every remote collection the
/// presentation layer renders. Collections are caches with no lifecycle
/// of their own; the backend remains the source of truth.
///
/// Replaced wholesale on reload and patched value-at-a-time after each
/// successful remote write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub texts: Vec<Text>,
    /// Garden threads, keyed by text id.
    pub garden_comments: HashMap<String, Vec<GardenComment>>,
    pub subscribed_authors: Vec<SubscribedAuthor>,
    pub my_subscribers: Vec<Subscriber>,
    pub my_donors: Vec<Donor>,
    pub my_duos: Vec<Duo>,
    /// Duo threads, keyed by the peer's name.
    pub duo_messages: HashMap<String, Vec<DuoMessage>>,
    pub custom_circles: Vec<Circle>,
    /// Last-read markers: storage key → RFC 3339 timestamp.
    pub last_reads: HashMap<String, String>,
    pub sponsorships: Vec<Sponsorship>,
}

impl Snapshot {
    pub fn last_read_for(&self, key: &ReadMarkerKey) -> Option<&str> {
        self.last_reads.get(&key.storage_key()).map(String::as_str)
    }

    /// Whether a duo has messages newer than its last-read marker. A duo
    /// with messages but no marker counts as unread.
    pub fn duo_has_unread(&self, duo_name: &str) -> bool {
        let Some(latest) = self
            .duo_messages
            .get(duo_name)
            .and_then(|messages| messages.last())
        else {
            return false;
        };

        match self
            .last_read_for(&ReadMarkerKey::duo(duo_name))
            .and_then(|marker| DateTime::parse_from_rfc3339(marker).ok())
        {
            Some(read_at) => read_at.with_timezone(&Utc) < latest.timestamp,
            // No marker (or an unparseable one) counts as unread.
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encre_types::models::Author;

    fn message_at(timestamp: DateTime<Utc>) -> DuoMessage {
        DuoMessage {
            id: "message-1".into(),
            user: Author { name: "Léo".into(), avatar: String::new() },
            content: "salut".into(),
            date: "à l'instant".into(),
            timestamp,
        }
    }

    #[test]
    fn duo_with_messages_and_no_marker_is_unread() {
        let mut snapshot = Snapshot::default();
        snapshot.duo_messages.insert("Léo".into(), vec![message_at(Utc::now())]);
        assert!(snapshot.duo_has_unread("Léo"));
    }

    #[test]
    fn duo_read_after_its_latest_message_is_not_unread() {
        let sent = Utc::now();
        let mut snapshot = Snapshot::default();
        snapshot.duo_messages.insert("Léo".into(), vec![message_at(sent)]);
        snapshot.last_reads.insert(
            "duo_Léo".into(),
            (sent + chrono::Duration::seconds(1)).to_rfc3339(),
        );
        assert!(!snapshot.duo_has_unread("Léo"));
    }

    #[test]
    fn empty_duo_is_never_unread() {
        let snapshot = Snapshot::default();
        assert!(!snapshot.duo_has_unread("Léo"));
    }
}
