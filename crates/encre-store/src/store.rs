//! The aggregate state container: one authoritative in-memory mirror of
//! the remote collections, with operations that call the backend and
//! then apply a deterministic local patch.
//!
//! Every mutator follows the same contract: await the remote write; on
//! success patch the snapshot exactly once; on failure log, leave the
//! snapshot untouched, and return the error for the caller to surface.
//! There is no retry, no offline queue, and no request de-duplication;
//! a double-submitted action issues two remote calls.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{SecondsFormat, Utc};
use tokio::sync::RwLock;
use tracing::{error, info};

use encre_api::{ApiError, Backend};
use encre_types::api::{NewCircle, NewComment, NewMessage, NewText};
use encre_types::models::{Donor, Duo, SubscribedAuthor};
use encre_types::read_marker::ReadMarkerKey;

use crate::demo;
use crate::snapshot::Snapshot;

pub struct Store<B: Backend> {
    inner: Arc<StoreInner<B>>,
}

impl<B: Backend> Clone for Store<B> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

struct StoreInner<B> {
    backend: B,
    user: RwLock<String>,
    snapshot: RwLock<Snapshot>,
    loading: AtomicBool,
    is_admin: AtomicBool,
    access_token: RwLock<Option<String>>,
}

impl<B: Backend> Store<B> {
    pub fn new(backend: B, current_user: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                backend,
                user: RwLock::new(current_user.into()),
                snapshot: RwLock::new(Snapshot::default()),
                loading: AtomicBool::new(false),
                is_admin: AtomicBool::new(false),
                access_token: RwLock::new(None),
            }),
        }
    }

    pub async fn current_user(&self) -> String {
        self.inner.user.read().await.clone()
    }

    /// Switch accounts and mirror the new account's data.
    pub async fn set_current_user(&self, name: impl Into<String>) -> Result<(), ApiError> {
        *self.inner.user.write().await = name.into();
        self.load_all().await
    }

    pub fn is_loading(&self) -> bool {
        self.inner.loading.load(Ordering::Relaxed)
    }

    pub fn is_admin(&self) -> bool {
        self.inner.is_admin.load(Ordering::Relaxed)
    }

    pub async fn access_token(&self) -> Option<String> {
        self.inner.access_token.read().await.clone()
    }

    /// Owned copy of the current snapshot.
    pub async fn snapshot(&self) -> Snapshot {
        self.inner.snapshot.read().await.clone()
    }

    // -- Initial load --

    /// Full refresh: seed demo content for a first visit, then fetch all
    /// collections concurrently and commit them as one snapshot. On any
    /// failure the previous snapshot is kept in full.
    pub async fn load_all(&self) -> Result<(), ApiError> {
        let user = self.current_user().await;
        if user.is_empty() {
            return Ok(());
        }

        self.inner.loading.store(true, Ordering::Relaxed);
        let result = self.refresh(&user).await;
        self.inner.loading.store(false, Ordering::Relaxed);

        if let Err(e) = &result {
            error!("Failed to load data for {}: {}", user, e);
        }
        result
    }

    async fn refresh(&self, user: &str) -> Result<(), ApiError> {
        demo::ensure_seeded(&self.inner.backend, user).await;

        let backend = &self.inner.backend;
        let (
            texts,
            garden_comments,
            subscribed_authors,
            my_subscribers,
            my_donors,
            my_duos,
            duo_messages,
            custom_circles,
            echos,
            last_reads,
            sponsorships,
        ) = tokio::try_join!(
            backend.texts(),
            backend.all_comments(),
            backend.subscriptions(user),
            backend.subscribers(user),
            backend.donors(user),
            backend.duos(user),
            backend.all_duo_messages(user),
            backend.circles(user),
            backend.echos(user),
            backend.last_reads(user),
            backend.sponsorships(),
        )?;

        let texts = texts
            .into_iter()
            .map(|mut text| {
                text.is_echoed = echos.contains(&text.id);
                text
            })
            .collect::<Vec<_>>();

        info!("Loaded {} texts for {}", texts.len(), user);

        *self.inner.snapshot.write().await = Snapshot {
            texts,
            garden_comments,
            subscribed_authors,
            my_subscribers,
            my_donors,
            my_duos,
            duo_messages,
            custom_circles,
            last_reads,
            sponsorships,
        };
        Ok(())
    }

    // -- Texts --

    /// Publish a text. Content validation (non-empty title/body) is the
    /// caller's concern.
    pub async fn add_text(&self, text: NewText) -> Result<(), ApiError> {
        let created = self.inner.backend.save_text(&text).await.map_err(|e| {
            error!("Failed to publish text: {}", e);
            e
        })?;
        self.inner.snapshot.write().await.texts.insert(0, created);
        Ok(())
    }

    pub async fn delete_text(&self, text_id: &str) -> Result<(), ApiError> {
        self.inner.backend.delete_text(text_id).await.map_err(|e| {
            error!("Failed to delete text {}: {}", text_id, e);
            e
        })?;
        self.inner.snapshot.write().await.texts.retain(|t| t.id != text_id);
        Ok(())
    }

    /// Flip the echo on a text: creates the echo row when the text is not
    /// currently echoed, deletes it otherwise.
    pub async fn toggle_echo(&self, text_id: &str) -> Result<(), ApiError> {
        let user = self.current_user().await;
        let echoed = {
            let snapshot = self.inner.snapshot.read().await;
            snapshot
                .texts
                .iter()
                .find(|t| t.id == text_id)
                .map(|t| t.is_echoed)
                .unwrap_or(false)
        };
        let next = !echoed;

        let result = if next {
            self.inner.backend.save_echo(&user, text_id).await
        } else {
            self.inner.backend.delete_echo(&user, text_id).await
        };
        result.map_err(|e| {
            error!("Failed to toggle echo on {}: {}", text_id, e);
            e
        })?;

        let mut snapshot = self.inner.snapshot.write().await;
        for text in snapshot.texts.iter_mut() {
            if text.id == text_id {
                text.is_echoed = next;
            }
        }
        Ok(())
    }

    /// Flip the saved flag. Local-only on purpose: the bookmark is an
    /// ephemeral view preference and never reaches the backend.
    pub async fn toggle_save(&self, text_id: &str) {
        let mut snapshot = self.inner.snapshot.write().await;
        for text in snapshot.texts.iter_mut() {
            if text.id == text_id {
                text.is_saved = !text.is_saved;
            }
        }
    }

    // -- Garden comments --

    pub async fn add_garden_comment(
        &self,
        text_id: &str,
        comment: NewComment,
    ) -> Result<(), ApiError> {
        let created = self
            .inner
            .backend
            .save_comment(text_id, &comment)
            .await
            .map_err(|e| {
                error!("Failed to save comment on {}: {}", text_id, e);
                e
            })?;
        self.inner
            .snapshot
            .write()
            .await
            .garden_comments
            .entry(text_id.to_string())
            .or_default()
            .push(created);
        Ok(())
    }

    pub async fn delete_garden_comment(
        &self,
        text_id: &str,
        comment_id: &str,
    ) -> Result<(), ApiError> {
        self.inner
            .backend
            .delete_comment(text_id, comment_id)
            .await
            .map_err(|e| {
                error!("Failed to delete comment {}: {}", comment_id, e);
                e
            })?;
        if let Some(comments) = self
            .inner
            .snapshot
            .write()
            .await
            .garden_comments
            .get_mut(text_id)
        {
            comments.retain(|c| c.id != comment_id);
        }
        Ok(())
    }

    pub async fn reload_garden_comments(&self) -> Result<(), ApiError> {
        let comments = self.inner.backend.all_comments().await.map_err(|e| {
            error!("Failed to reload comments: {}", e);
            e
        })?;
        self.inner.snapshot.write().await.garden_comments = comments;
        Ok(())
    }

    // -- Subscriptions --

    /// Subscribe to an author. A positive price is the caller's concern.
    pub async fn add_subscription(&self, author_name: &str, price: f64) -> Result<(), ApiError> {
        let user = self.current_user().await;
        self.inner
            .backend
            .save_subscription(&user, author_name, price)
            .await
            .map_err(|e| {
                error!("Failed to subscribe to {}: {}", author_name, e);
                e
            })?;
        self.inner
            .snapshot
            .write()
            .await
            .subscribed_authors
            .push(SubscribedAuthor {
                author_name: author_name.to_string(),
                price,
                subscribed_at: Utc::now(),
            });
        Ok(())
    }

    pub async fn remove_subscription(&self, author_name: &str) -> Result<(), ApiError> {
        let user = self.current_user().await;
        self.inner
            .backend
            .delete_subscription(&user, author_name)
            .await
            .map_err(|e| {
                error!("Failed to unsubscribe from {}: {}", author_name, e);
                e
            })?;
        self.inner
            .snapshot
            .write()
            .await
            .subscribed_authors
            .retain(|s| s.author_name != author_name);
        Ok(())
    }

    // -- Donations --

    /// Record a donation. A positive amount is the caller's concern.
    pub async fn add_donation(&self, donor: Donor) -> Result<(), ApiError> {
        let user = self.current_user().await;
        self.inner.backend.save_donation(&user, &donor).await.map_err(|e| {
            error!("Failed to save donation: {}", e);
            e
        })?;
        self.inner.snapshot.write().await.my_donors.push(donor);
        Ok(())
    }

    // -- Duos --

    pub async fn add_duo(&self, name: &str) -> Result<(), ApiError> {
        let user = self.current_user().await;
        self.inner.backend.save_duo(&user, name).await.map_err(|e| {
            error!("Failed to create duo with {}: {}", name, e);
            e
        })?;
        self.inner.snapshot.write().await.my_duos.push(Duo {
            name: name.to_string(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    pub async fn delete_duo(&self, name: &str) -> Result<(), ApiError> {
        let user = self.current_user().await;
        self.inner.backend.delete_duo(&user, name).await.map_err(|e| {
            error!("Failed to delete duo with {}: {}", name, e);
            e
        })?;
        let mut snapshot = self.inner.snapshot.write().await;
        snapshot.my_duos.retain(|d| d.name != name);
        snapshot.duo_messages.remove(name);
        Ok(())
    }

    /// Send a duo message, then advance the duo's last-read marker
    /// (sending counts as reading the conversation).
    pub async fn add_duo_message(
        &self,
        duo_name: &str,
        message: NewMessage,
    ) -> Result<(), ApiError> {
        let user = self.current_user().await;
        let created = self
            .inner
            .backend
            .save_duo_message(&user, duo_name, &message)
            .await
            .map_err(|e| {
                error!("Failed to send message to {}: {}", duo_name, e);
                e
            })?;
        self.inner
            .snapshot
            .write()
            .await
            .duo_messages
            .entry(duo_name.to_string())
            .or_default()
            .push(created);

        let key = ReadMarkerKey::duo(duo_name);
        let timestamp = now_iso();
        self.inner
            .backend
            .save_last_read(&user, duo_name, key.wire_type(), &timestamp)
            .await
            .map_err(|e| {
                error!("Failed to update last read for {}: {}", duo_name, e);
                e
            })?;
        self.inner
            .snapshot
            .write()
            .await
            .last_reads
            .insert(key.storage_key(), timestamp);
        Ok(())
    }

    pub async fn reload_duo_messages(&self) -> Result<(), ApiError> {
        let user = self.current_user().await;
        let messages = self.inner.backend.all_duo_messages(&user).await.map_err(|e| {
            error!("Failed to reload duo messages: {}", e);
            e
        })?;
        self.inner.snapshot.write().await.duo_messages = messages;
        Ok(())
    }

    // -- Circles --

    /// Create a circle, then add each listed member (default: just the
    /// creator) one at a time. Member adds are at-least-once with no
    /// rollback: the first failure aborts the remaining adds, members
    /// already added stay added, and the circle stays in the snapshot.
    pub async fn add_circle(&self, circle: NewCircle) -> Result<(), ApiError> {
        let user = self.current_user().await;
        let created = self.inner.backend.save_circle(&user, &circle).await.map_err(|e| {
            error!("Failed to create circle {}: {}", circle.name, e);
            e
        })?;
        self.inner.snapshot.write().await.custom_circles.push(created.clone());

        let members = circle.members.clone().unwrap_or_else(|| vec![user.clone()]);
        for member in &members {
            self.inner
                .backend
                .add_circle_member(&created.id, member)
                .await
                .map_err(|e| {
                    error!("Failed to add {} to circle {}: {}", member, created.id, e);
                    e
                })?;
        }
        Ok(())
    }

    pub async fn delete_circle(&self, circle_id: &str) -> Result<(), ApiError> {
        self.inner.backend.delete_circle(circle_id).await.map_err(|e| {
            error!("Failed to delete circle {}: {}", circle_id, e);
            e
        })?;
        self.inner
            .snapshot
            .write()
            .await
            .custom_circles
            .retain(|c| c.id != circle_id);
        Ok(())
    }

    // -- Read markers --

    /// Record that the current user has read a conversation up to now.
    /// The local map keeps the key's own namespace while the wire call
    /// carries the key's wire type (gardens alias to circles there).
    pub async fn mark_as_read(&self, key: &ReadMarkerKey) -> Result<(), ApiError> {
        let user = self.current_user().await;
        let timestamp = now_iso();
        self.inner
            .backend
            .save_last_read(&user, &key.id, key.wire_type(), &timestamp)
            .await
            .map_err(|e| {
                error!("Failed to update last read for {}: {}", key.storage_key(), e);
                e
            })?;
        self.inner
            .snapshot
            .write()
            .await
            .last_reads
            .insert(key.storage_key(), timestamp);
        Ok(())
    }

    // -- Sponsorships --

    pub async fn reload_sponsorships(&self) -> Result<(), ApiError> {
        let sponsorships = self.inner.backend.sponsorships().await.map_err(|e| {
            error!("Failed to reload sponsorships: {}", e);
            e
        })?;
        self.inner.snapshot.write().await.sponsorships = sponsorships;
        Ok(())
    }

    // -- Author bios --

    /// Bios are not part of the aggregate snapshot; both operations pass
    /// through to the backend.
    pub async fn update_author_bio(&self, author_name: &str, bio: &str) -> Result<(), ApiError> {
        self.inner.backend.update_author_bio(author_name, bio).await.map_err(|e| {
            error!("Failed to update bio for {}: {}", author_name, e);
            e
        })
    }

    /// Degrades to an empty bio on failure so a profile can still render.
    pub async fn get_author_bio(&self, author_name: &str) -> String {
        match self.inner.backend.author_bio(author_name).await {
            Ok(bio) => bio,
            Err(e) => {
                error!("Failed to fetch bio for {}: {}", author_name, e);
                String::new()
            }
        }
    }

    // -- Admin --

    /// Verify admin status for a token. The token is kept for later
    /// authenticated calls only when verification succeeds; any failure
    /// reads as "not an admin".
    pub async fn check_admin_access(&self, token: &str) -> bool {
        match self.inner.backend.check_admin(token).await {
            Ok(is_admin) => {
                self.inner.is_admin.store(is_admin, Ordering::Relaxed);
                if is_admin {
                    *self.inner.access_token.write().await = Some(token.to_string());
                }
                is_admin
            }
            Err(e) => {
                error!("Failed to verify admin status: {}", e);
                self.inner.is_admin.store(false, Ordering::Relaxed);
                false
            }
        }
    }
}

/// RFC 3339 with millisecond precision and a `Z` suffix — the timestamp
/// format the backend stores for last-read markers.
fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
