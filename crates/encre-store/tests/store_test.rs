//! Aggregator behavior against a recording in-memory backend: each
//! mutation must issue the expected remote calls and apply exactly one
//! local patch, and a failed call must leave the snapshot untouched.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;

use encre_api::{ApiError, Backend};
use encre_store::Store;
use encre_types::api::{NewCircle, NewComment, NewMessage, NewText};
use encre_types::models::{
    Author, Circle, Donor, Duo, DuoMessage, GardenComment, Sponsorship, SubscribedAuthor,
    Subscriber, Text,
};
use encre_types::read_marker::ReadMarkerKey;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    SaveText(String),
    DeleteText(String),
    SaveEcho(String),
    DeleteEcho(String),
    SaveComment(String),
    DeleteComment(String),
    SaveSubscription { author: String, price: f64 },
    DeleteSubscription(String),
    SaveDonation(String),
    SaveDuo(String),
    DeleteDuo(String),
    SaveDuoMessage(String),
    SaveCircle(String),
    DeleteCircle(String),
    AddCircleMember { circle_id: String, member: String },
    SaveLastRead {
        conversation_id: String,
        conversation_type: String,
        timestamp: String,
    },
    UpdateBio(String),
    CheckAdmin(String),
}

#[derive(Default)]
struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    texts: Mutex<Vec<Text>>,
    /// When set, every backend call fails with a 500.
    fail: AtomicBool,
    /// When set, only the text reads fail (existence-probe failure).
    fail_texts: AtomicBool,
    /// When set, only member adds fail (circle-creation partial failure).
    fail_member_adds: AtomicBool,
    admin: AtomicBool,
    next_id: AtomicU64,
}

impl FakeBackend {
    fn boom() -> ApiError {
        ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".into(),
        }
    }

    fn check(&self) -> Result<(), ApiError> {
        if self.fail.load(Ordering::Relaxed) {
            Err(Self::boom())
        } else {
            Ok(())
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn fresh_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn texts(&self) -> Result<Vec<Text>, ApiError> {
        self.check()?;
        if self.fail_texts.load(Ordering::Relaxed) {
            return Err(Self::boom());
        }
        Ok(self.texts.lock().unwrap().clone())
    }

    async fn all_comments(&self) -> Result<HashMap<String, Vec<GardenComment>>, ApiError> {
        self.check()?;
        Ok(HashMap::new())
    }

    async fn subscriptions(&self, _user: &str) -> Result<Vec<SubscribedAuthor>, ApiError> {
        self.check()?;
        Ok(vec![])
    }

    async fn subscribers(&self, _user: &str) -> Result<Vec<Subscriber>, ApiError> {
        self.check()?;
        Ok(vec![])
    }

    async fn donors(&self, _user: &str) -> Result<Vec<Donor>, ApiError> {
        self.check()?;
        Ok(vec![])
    }

    async fn duos(&self, _user: &str) -> Result<Vec<Duo>, ApiError> {
        self.check()?;
        Ok(vec![])
    }

    async fn all_duo_messages(
        &self,
        _user: &str,
    ) -> Result<HashMap<String, Vec<DuoMessage>>, ApiError> {
        self.check()?;
        Ok(HashMap::new())
    }

    async fn circles(&self, _user: &str) -> Result<Vec<Circle>, ApiError> {
        self.check()?;
        Ok(vec![])
    }

    async fn echos(&self, _user: &str) -> Result<Vec<String>, ApiError> {
        self.check()?;
        Ok(vec![])
    }

    async fn last_reads(&self, _user: &str) -> Result<HashMap<String, String>, ApiError> {
        self.check()?;
        Ok(HashMap::new())
    }

    async fn sponsorships(&self) -> Result<Vec<Sponsorship>, ApiError> {
        self.check()?;
        Ok(vec![])
    }

    async fn save_text(&self, text: &NewText) -> Result<Text, ApiError> {
        self.check()?;
        self.record(Call::SaveText(text.title.clone()));
        let created = Text {
            id: self.fresh_id("text"),
            author: text.author.clone(),
            title: text.title.clone(),
            content: text.content.clone(),
            category: text.category.clone(),
            themes: text.themes.clone(),
            location: text.location.clone(),
            date: text.date.clone(),
            published_at: text.published_at,
            is_echoed: false,
            is_saved: false,
            has_new_comments: false,
            has_audio_recording: text.has_audio_recording,
            subscribers_only: text.subscribers_only,
        };
        self.texts.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn delete_text(&self, text_id: &str) -> Result<(), ApiError> {
        self.check()?;
        self.record(Call::DeleteText(text_id.to_string()));
        self.texts.lock().unwrap().retain(|t| t.id != text_id);
        Ok(())
    }

    async fn save_echo(&self, _user: &str, text_id: &str) -> Result<(), ApiError> {
        self.check()?;
        self.record(Call::SaveEcho(text_id.to_string()));
        Ok(())
    }

    async fn delete_echo(&self, _user: &str, text_id: &str) -> Result<(), ApiError> {
        self.check()?;
        self.record(Call::DeleteEcho(text_id.to_string()));
        Ok(())
    }

    async fn save_comment(
        &self,
        text_id: &str,
        comment: &NewComment,
    ) -> Result<GardenComment, ApiError> {
        self.check()?;
        self.record(Call::SaveComment(text_id.to_string()));
        Ok(GardenComment {
            id: self.fresh_id("comment"),
            user: comment.user.clone(),
            content: comment.content.clone(),
            date: comment.date.clone(),
            timestamp: Utc::now(),
        })
    }

    async fn delete_comment(&self, _text_id: &str, comment_id: &str) -> Result<(), ApiError> {
        self.check()?;
        self.record(Call::DeleteComment(comment_id.to_string()));
        Ok(())
    }

    async fn save_subscription(
        &self,
        _user: &str,
        author_name: &str,
        price: f64,
    ) -> Result<(), ApiError> {
        self.check()?;
        self.record(Call::SaveSubscription {
            author: author_name.to_string(),
            price,
        });
        Ok(())
    }

    async fn delete_subscription(&self, _user: &str, author_name: &str) -> Result<(), ApiError> {
        self.check()?;
        self.record(Call::DeleteSubscription(author_name.to_string()));
        Ok(())
    }

    async fn save_donation(&self, _user: &str, donor: &Donor) -> Result<(), ApiError> {
        self.check()?;
        self.record(Call::SaveDonation(donor.name.clone()));
        Ok(())
    }

    async fn save_duo(&self, _user: &str, duo_name: &str) -> Result<(), ApiError> {
        self.check()?;
        self.record(Call::SaveDuo(duo_name.to_string()));
        Ok(())
    }

    async fn delete_duo(&self, _user: &str, duo_name: &str) -> Result<(), ApiError> {
        self.check()?;
        self.record(Call::DeleteDuo(duo_name.to_string()));
        Ok(())
    }

    async fn save_duo_message(
        &self,
        _user: &str,
        duo_name: &str,
        message: &NewMessage,
    ) -> Result<DuoMessage, ApiError> {
        self.check()?;
        self.record(Call::SaveDuoMessage(duo_name.to_string()));
        Ok(DuoMessage {
            id: self.fresh_id("message"),
            user: message.user.clone(),
            content: message.content.clone(),
            date: message.date.clone(),
            timestamp: Utc::now(),
        })
    }

    async fn save_circle(&self, _user: &str, circle: &NewCircle) -> Result<Circle, ApiError> {
        self.check()?;
        self.record(Call::SaveCircle(circle.name.clone()));
        Ok(Circle {
            id: self.fresh_id("circle"),
            name: circle.name.clone(),
            description: circle.description.clone(),
            member_count: Some(1),
            is_duo: circle.is_duo,
        })
    }

    async fn delete_circle(&self, circle_id: &str) -> Result<(), ApiError> {
        self.check()?;
        self.record(Call::DeleteCircle(circle_id.to_string()));
        Ok(())
    }

    async fn add_circle_member(&self, circle_id: &str, user_name: &str) -> Result<(), ApiError> {
        self.check()?;
        self.record(Call::AddCircleMember {
            circle_id: circle_id.to_string(),
            member: user_name.to_string(),
        });
        if self.fail_member_adds.load(Ordering::Relaxed) {
            return Err(Self::boom());
        }
        Ok(())
    }

    async fn save_last_read(
        &self,
        _user: &str,
        conversation_id: &str,
        conversation_type: &str,
        timestamp: &str,
    ) -> Result<(), ApiError> {
        self.check()?;
        self.record(Call::SaveLastRead {
            conversation_id: conversation_id.to_string(),
            conversation_type: conversation_type.to_string(),
            timestamp: timestamp.to_string(),
        });
        Ok(())
    }

    async fn author_bio(&self, _author_name: &str) -> Result<String, ApiError> {
        self.check()?;
        Ok("Écrit depuis toujours.".into())
    }

    async fn update_author_bio(&self, author_name: &str, _bio: &str) -> Result<(), ApiError> {
        self.check()?;
        self.record(Call::UpdateBio(author_name.to_string()));
        Ok(())
    }

    async fn check_admin(&self, token: &str) -> Result<bool, ApiError> {
        self.check()?;
        self.record(Call::CheckAdmin(token.to_string()));
        Ok(self.admin.load(Ordering::Relaxed))
    }
}

// -- Fixtures --

fn sample_text(id: &str, author: &str) -> Text {
    Text {
        id: id.to_string(),
        author: Author { name: author.to_string(), avatar: String::new() },
        title: "Marges".into(),
        content: "Quelques lignes".into(),
        category: "Poème".into(),
        themes: None,
        location: None,
        date: "il y a 1h".into(),
        published_at: Utc::now(),
        is_echoed: false,
        is_saved: false,
        has_new_comments: false,
        has_audio_recording: false,
        subscribers_only: false,
    }
}

fn draft_text(author: &str, title: &str) -> NewText {
    NewText {
        author: Author { name: author.to_string(), avatar: String::new() },
        title: title.to_string(),
        content: "Brouillon".into(),
        category: "Poème".into(),
        themes: None,
        location: None,
        date: "à l'instant".into(),
        published_at: Utc::now(),
        has_audio_recording: false,
        subscribers_only: false,
    }
}

fn draft_message(user: &str, content: &str) -> NewMessage {
    NewMessage {
        user: Author { name: user.to_string(), avatar: String::new() },
        content: content.to_string(),
        date: "à l'instant".into(),
    }
}

/// Store for "Ana" over a backend that already has one text, so demo
/// seeding never interferes with call counting.
async fn loaded_store() -> (Arc<FakeBackend>, Store<Arc<FakeBackend>>) {
    let backend = Arc::new(FakeBackend::default());
    backend.texts.lock().unwrap().push(sample_text("text-0", "Ana"));
    let store = Store::new(backend.clone(), "Ana");
    store.load_all().await.unwrap();
    (backend, store)
}

// -- Tests --

#[tokio::test]
async fn add_then_delete_text_restores_the_list() {
    let (_backend, store) = loaded_store().await;
    let before = store.snapshot().await.texts.len();

    store.add_text(draft_text("Ana", "Éphémère")).await.unwrap();
    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.texts.len(), before + 1);
    // New texts are prepended
    assert_eq!(snapshot.texts[0].title, "Éphémère");
    let id = snapshot.texts[0].id.clone();

    store.delete_text(&id).await.unwrap();
    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.texts.len(), before);
    assert!(snapshot.texts.iter().all(|t| t.id != id));
}

#[tokio::test]
async fn toggle_echo_twice_returns_to_original_state() {
    let (backend, store) = loaded_store().await;

    store.toggle_echo("text-0").await.unwrap();
    assert!(store.snapshot().await.texts[0].is_echoed);

    store.toggle_echo("text-0").await.unwrap();
    assert!(!store.snapshot().await.texts[0].is_echoed);

    // Exactly one create-then-delete pair on the wire
    let echo_calls: Vec<Call> = backend
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::SaveEcho(_) | Call::DeleteEcho(_)))
        .collect();
    assert_eq!(
        echo_calls,
        vec![Call::SaveEcho("text-0".into()), Call::DeleteEcho("text-0".into())]
    );
}

#[tokio::test]
async fn toggle_save_never_touches_the_backend() {
    let (backend, store) = loaded_store().await;
    let calls_before = backend.calls();

    store.toggle_save("text-0").await;
    assert!(store.snapshot().await.texts[0].is_saved);

    store.toggle_save("text-0").await;
    assert!(!store.snapshot().await.texts[0].is_saved);

    assert_eq!(backend.calls(), calls_before);
}

#[tokio::test]
async fn garden_read_marker_keeps_local_namespace_but_wires_circle() {
    let (backend, store) = loaded_store().await;

    store.mark_as_read(&ReadMarkerKey::garden("text-0")).await.unwrap();

    let snapshot = store.snapshot().await;
    assert!(snapshot.last_reads.contains_key("garden_text-0"));

    let last_read = backend
        .calls()
        .into_iter()
        .find_map(|c| match c {
            Call::SaveLastRead { conversation_id, conversation_type, .. } => {
                Some((conversation_id, conversation_type))
            }
            _ => None,
        })
        .expect("a last-read call was issued");
    assert_eq!(last_read, ("text-0".into(), "circle".into()));
}

#[tokio::test]
async fn first_load_seeds_starter_content_exactly_once() {
    let backend = Arc::new(FakeBackend::default());
    let store = Store::new(backend.clone(), "Ana");

    // Zero texts: the first load seeds
    store.load_all().await.unwrap();
    let seed_texts = |calls: &[Call]| {
        calls.iter().filter(|c| matches!(c, Call::SaveText(_))).count()
    };
    let calls = backend.calls();
    assert_eq!(seed_texts(&calls), 3);
    assert_eq!(calls.iter().filter(|c| matches!(c, Call::SaveDuo(_))).count(), 2);
    assert!(calls.iter().any(|c| matches!(c, Call::SaveSubscription { .. })));
    assert_eq!(store.snapshot().await.texts.len(), 3);

    // Content now exists: a reload must not seed again
    store.load_all().await.unwrap();
    assert_eq!(seed_texts(&backend.calls()), 3);
}

#[tokio::test]
async fn a_failed_existence_probe_counts_as_a_first_visit() {
    let backend = Arc::new(FakeBackend::default());
    backend.fail_texts.store(true, Ordering::Relaxed);
    let store = Store::new(backend.clone(), "Ana");

    // The load itself fails (the text read is part of the batch), but
    // seeding already ran on the failed probe.
    assert!(store.load_all().await.is_err());
    let seeded = backend
        .calls()
        .iter()
        .filter(|c| matches!(c, Call::SaveText(_)))
        .count();
    assert_eq!(seeded, 3);
}

#[tokio::test]
async fn seeding_is_skipped_when_any_text_exists() {
    let (backend, store) = loaded_store().await;
    store.load_all().await.unwrap();
    assert!(backend.calls().iter().all(|c| !matches!(c, Call::SaveText(_))));
    assert_eq!(store.snapshot().await.texts.len(), 1);
}

#[tokio::test]
async fn subscription_lifecycle_patches_exactly_one_entry() {
    let (backend, store) = loaded_store().await;

    store.add_subscription("Leo", 4.99).await.unwrap();
    let subscribed = store.snapshot().await.subscribed_authors;
    assert_eq!(subscribed.len(), 1);
    assert_eq!(subscribed[0].author_name, "Leo");
    assert_eq!(subscribed[0].price, 4.99);
    assert!(backend.calls().contains(&Call::SaveSubscription {
        author: "Leo".into(),
        price: 4.99
    }));

    store.remove_subscription("Leo").await.unwrap();
    assert!(store.snapshot().await.subscribed_authors.is_empty());
}

#[tokio::test]
async fn duo_messages_append_in_call_order_and_advance_last_read() {
    let (backend, store) = loaded_store().await;

    store.add_duo_message("Leo", draft_message("Ana", "hi")).await.unwrap();
    store.add_duo_message("Leo", draft_message("Ana", "there")).await.unwrap();

    let snapshot = store.snapshot().await;
    let thread = &snapshot.duo_messages["Leo"];
    assert_eq!(thread.len(), 2);
    assert_eq!(thread[0].content, "hi");
    assert_eq!(thread[1].content, "there");

    // The local marker equals the timestamp sent with the second call
    let marker_timestamps: Vec<String> = backend
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::SaveLastRead { conversation_id, conversation_type, timestamp }
                if conversation_id == "Leo" && conversation_type == "duo" =>
            {
                Some(timestamp)
            }
            _ => None,
        })
        .collect();
    assert_eq!(marker_timestamps.len(), 2);
    assert_eq!(snapshot.last_reads["duo_Leo"], marker_timestamps[1]);
}

#[tokio::test]
async fn delete_duo_drops_its_message_thread() {
    let (_backend, store) = loaded_store().await;

    store.add_duo("Leo").await.unwrap();
    store.add_duo_message("Leo", draft_message("Ana", "hi")).await.unwrap();
    assert!(store.snapshot().await.duo_messages.contains_key("Leo"));

    store.delete_duo("Leo").await.unwrap();
    let snapshot = store.snapshot().await;
    assert!(snapshot.my_duos.iter().all(|d| d.name != "Leo"));
    assert!(!snapshot.duo_messages.contains_key("Leo"));
}

#[tokio::test]
async fn add_circle_defaults_membership_to_the_creator() {
    let (backend, store) = loaded_store().await;

    let circle = NewCircle {
        name: "Cercle des aubes".into(),
        description: "Textes du matin".into(),
        member_count: None,
        is_duo: false,
        members: None,
    };
    store.add_circle(circle).await.unwrap();

    let circles = store.snapshot().await.custom_circles;
    assert_eq!(circles.len(), 1);
    let member_adds: Vec<Call> = backend
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::AddCircleMember { .. }))
        .collect();
    assert_eq!(
        member_adds,
        vec![Call::AddCircleMember { circle_id: circles[0].id.clone(), member: "Ana".into() }]
    );
}

#[tokio::test]
async fn circle_member_add_failure_keeps_the_circle_and_stops_the_loop() {
    let (backend, store) = loaded_store().await;
    backend.fail_member_adds.store(true, Ordering::Relaxed);

    let circle = NewCircle {
        name: "Cercle du soir".into(),
        description: String::new(),
        member_count: None,
        is_duo: false,
        members: Some(vec!["Ana".into(), "Leo".into()]),
    };
    let result = store.add_circle(circle).await;
    assert!(result.is_err());

    // The create already succeeded, so the circle stays committed
    assert_eq!(store.snapshot().await.custom_circles.len(), 1);
    // The first failure aborted the remaining adds
    let attempted = backend
        .calls()
        .iter()
        .filter(|c| matches!(c, Call::AddCircleMember { .. }))
        .count();
    assert_eq!(attempted, 1);
}

#[tokio::test]
async fn failed_writes_leave_the_snapshot_untouched() {
    let (backend, store) = loaded_store().await;
    let before = store.snapshot().await;
    backend.fail.store(true, Ordering::Relaxed);

    assert!(matches!(
        store.add_text(draft_text("Ana", "Perdu")).await,
        Err(ApiError::Status { .. })
    ));
    assert!(store.add_subscription("Leo", 4.99).await.is_err());
    assert!(store.toggle_echo("text-0").await.is_err());
    assert!(store.add_duo_message("Leo", draft_message("Ana", "hi")).await.is_err());
    assert!(store.mark_as_read(&ReadMarkerKey::circle("c1")).await.is_err());
    assert!(store.delete_text("text-0").await.is_err());

    assert_eq!(store.snapshot().await, before);
}

#[tokio::test]
async fn failed_reload_keeps_the_previous_snapshot() {
    let (backend, store) = loaded_store().await;
    let before = store.snapshot().await;
    backend.fail.store(true, Ordering::Relaxed);

    assert!(store.load_all().await.is_err());
    assert_eq!(store.snapshot().await, before);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn admin_token_is_stored_only_on_success() {
    let (backend, store) = loaded_store().await;

    backend.admin.store(true, Ordering::Relaxed);
    assert!(store.check_admin_access("jeton-admin").await);
    assert!(store.is_admin());
    assert_eq!(store.access_token().await.as_deref(), Some("jeton-admin"));

    // A verification failure resets the flag but keeps no new token
    backend.fail.store(true, Ordering::Relaxed);
    assert!(!store.check_admin_access("autre-jeton").await);
    assert!(!store.is_admin());
    assert_eq!(store.access_token().await.as_deref(), Some("jeton-admin"));
}

#[tokio::test]
async fn author_bio_degrades_to_empty_on_failure() {
    let (backend, store) = loaded_store().await;
    assert_eq!(store.get_author_bio("Margaux Delorme").await, "Écrit depuis toujours.");

    backend.fail.store(true, Ordering::Relaxed);
    assert_eq!(store.get_author_bio("Margaux Delorme").await, "");
}

#[tokio::test]
async fn garden_comment_lifecycle_patches_the_thread() {
    let (_backend, store) = loaded_store().await;

    store
        .add_garden_comment("text-0", NewComment {
            user: Author { name: "Ana".into(), avatar: String::new() },
            content: "Très beau".into(),
            date: "à l'instant".into(),
        })
        .await
        .unwrap();

    let snapshot = store.snapshot().await;
    let thread = &snapshot.garden_comments["text-0"];
    assert_eq!(thread.len(), 1);
    let comment_id = thread[0].id.clone();

    store.delete_garden_comment("text-0", &comment_id).await.unwrap();
    assert!(store.snapshot().await.garden_comments["text-0"].is_empty());
}
