//! Thin typed wrapper over the backend REST surface.
//!
//! Two calling conventions: anonymous requests carry the shared bearer
//! credential, authenticated requests carry a caller-supplied token
//! (obtained through the admin login flow). Both speak JSON in both
//! directions. There is no retry, no backoff, and no timeout beyond the
//! transport defaults; failures surface once and the caller decides.

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::error;
use urlencoding::encode;

use encre_types::api::{
    AdminStatusResponse, AllCommentsResponse, AllDuoMessagesResponse, AnnouncementsResponse,
    AvailabilityResponse, BioResponse, CircleMembersResponse, CircleMessagesResponse,
    CirclesResponse, CommentsResponse, ContentReportsResponse, DonorsResponse, DuosResponse,
    EchosResponse, LastReadsResponse, NewAnnouncement, NewCircle, NewComment, NewContentReport,
    NewMessage, NewSponsorship, NewText, ReportedContentRef, ReportsResponse, ResonancesResponse,
    SaveCircleResponse, SaveCommentResponse, SaveDuoMessageResponse, SaveTextResponse,
    SignupResponse, SponsorshipsResponse, SubscribersResponse, SubscriptionsResponse,
    TextsResponse,
};
use encre_types::models::Donor;

use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -- Calling conventions --

    fn anon(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("Authorization", format!("Bearer {}", self.anon_key))
    }

    fn authed(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("Authorization", format!("Bearer {}", token))
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ApiError> {
        let resp = req.send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            error!("API request failed ({}): {}", status, body);
            return Err(ApiError::Status { status, body });
        }
        Ok(resp.json().await?)
    }

    /// Like [`send`](Self::send) for endpoints whose response body the
    /// client has no use for.
    async fn send_unit(&self, req: RequestBuilder) -> Result<(), ApiError> {
        let resp = req.send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            error!("API request failed ({}): {}", status, body);
            return Err(ApiError::Status { status, body });
        }
        Ok(())
    }

    // -- Texts --

    pub async fn get_texts(&self) -> Result<TextsResponse, ApiError> {
        self.send(self.anon(Method::GET, "/texts")).await
    }

    pub async fn save_text(&self, text: &NewText) -> Result<SaveTextResponse, ApiError> {
        self.send(self.anon(Method::POST, "/texts").json(text)).await
    }

    pub async fn delete_text(&self, text_id: &str) -> Result<(), ApiError> {
        self.send_unit(self.anon(Method::DELETE, &format!("/texts/{}", encode(text_id))))
            .await
    }

    // -- Garden comments --

    pub async fn get_comments(&self, text_id: &str) -> Result<CommentsResponse, ApiError> {
        self.send(self.anon(Method::GET, &format!("/texts/{}/comments", encode(text_id))))
            .await
    }

    pub async fn get_all_comments(&self) -> Result<AllCommentsResponse, ApiError> {
        self.send(self.anon(Method::GET, "/comments")).await
    }

    pub async fn save_comment(
        &self,
        text_id: &str,
        comment: &NewComment,
    ) -> Result<SaveCommentResponse, ApiError> {
        self.send(
            self.anon(Method::POST, &format!("/texts/{}/comments", encode(text_id)))
                .json(comment),
        )
        .await
    }

    pub async fn delete_comment(&self, text_id: &str, comment_id: &str) -> Result<(), ApiError> {
        self.send_unit(self.anon(
            Method::DELETE,
            &format!("/texts/{}/comments/{}", encode(text_id), encode(comment_id)),
        ))
        .await
    }

    // -- Author bios --

    pub async fn get_author_bio(&self, author_name: &str) -> Result<BioResponse, ApiError> {
        self.send(self.anon(Method::GET, &format!("/authors/{}/bio", encode(author_name))))
            .await
    }

    pub async fn update_author_bio(&self, author_name: &str, bio: &str) -> Result<(), ApiError> {
        self.send_unit(
            self.anon(Method::PUT, &format!("/authors/{}/bio", encode(author_name)))
                .json(&json!({ "bio": bio })),
        )
        .await
    }

    // -- Subscriptions --

    pub async fn save_subscription(
        &self,
        user_id: &str,
        author_name: &str,
        price: f64,
    ) -> Result<(), ApiError> {
        self.send_unit(self.anon(Method::POST, "/subscriptions").json(&json!({
            "userId": user_id,
            "authorName": author_name,
            "price": price,
        })))
        .await
    }

    pub async fn get_subscriptions(&self, user_id: &str) -> Result<SubscriptionsResponse, ApiError> {
        self.send(self.anon(Method::GET, &format!("/subscriptions/{}", encode(user_id))))
            .await
    }

    pub async fn delete_subscription(
        &self,
        user_id: &str,
        author_name: &str,
    ) -> Result<(), ApiError> {
        self.send_unit(self.anon(
            Method::DELETE,
            &format!("/subscriptions/{}/{}", encode(user_id), encode(author_name)),
        ))
        .await
    }

    pub async fn get_subscribers(&self, user_id: &str) -> Result<SubscribersResponse, ApiError> {
        self.send(self.anon(Method::GET, &format!("/subscribers/{}", encode(user_id))))
            .await
    }

    // -- Donations --

    pub async fn save_donation(&self, user_id: &str, donor: &Donor) -> Result<(), ApiError> {
        self.send_unit(
            self.anon(Method::POST, "/donations")
                .json(&json!({ "userId": user_id, "donor": donor })),
        )
        .await
    }

    pub async fn get_donors(&self, user_id: &str) -> Result<DonorsResponse, ApiError> {
        self.send(self.anon(Method::GET, &format!("/donations/{}", encode(user_id))))
            .await
    }

    // -- Duos --

    pub async fn save_duo(&self, user_id: &str, duo_name: &str) -> Result<(), ApiError> {
        self.send_unit(
            self.anon(Method::POST, "/duos")
                .json(&json!({ "userId": user_id, "duoName": duo_name })),
        )
        .await
    }

    pub async fn get_duos(&self, user_id: &str) -> Result<DuosResponse, ApiError> {
        self.send(self.anon(Method::GET, &format!("/duos/{}", encode(user_id))))
            .await
    }

    pub async fn delete_duo(&self, user_id: &str, duo_name: &str) -> Result<(), ApiError> {
        self.send_unit(self.anon(
            Method::DELETE,
            &format!("/duos/{}/{}", encode(user_id), encode(duo_name)),
        ))
        .await
    }

    pub async fn save_duo_message(
        &self,
        user_id: &str,
        duo_name: &str,
        message: &NewMessage,
    ) -> Result<SaveDuoMessageResponse, ApiError> {
        self.send(
            self.anon(
                Method::POST,
                &format!("/duos/{}/{}/messages", encode(user_id), encode(duo_name)),
            )
            .json(&json!({ "message": message })),
        )
        .await
    }

    pub async fn get_all_duo_messages(
        &self,
        user_id: &str,
    ) -> Result<AllDuoMessagesResponse, ApiError> {
        self.send(self.anon(Method::GET, &format!("/duos/{}/messages", encode(user_id))))
            .await
    }

    // -- Circles --

    pub async fn save_circle(
        &self,
        user_id: &str,
        circle: &NewCircle,
    ) -> Result<SaveCircleResponse, ApiError> {
        self.send(
            self.anon(Method::POST, "/circles")
                .json(&json!({ "userId": user_id, "circle": circle })),
        )
        .await
    }

    pub async fn get_circles(&self, user_id: &str) -> Result<CirclesResponse, ApiError> {
        self.send(self.anon(Method::GET, &format!("/circles/{}", encode(user_id))))
            .await
    }

    pub async fn delete_circle(&self, circle_id: &str) -> Result<(), ApiError> {
        self.send_unit(self.anon(Method::DELETE, &format!("/circles/{}", encode(circle_id))))
            .await
    }

    pub async fn add_circle_member(
        &self,
        circle_id: &str,
        user_name: &str,
    ) -> Result<(), ApiError> {
        self.send_unit(
            self.anon(Method::POST, &format!("/circles/{}/members", encode(circle_id)))
                .json(&json!({ "userName": user_name })),
        )
        .await
    }

    pub async fn get_circle_members(
        &self,
        circle_id: &str,
    ) -> Result<CircleMembersResponse, ApiError> {
        self.send(self.anon(Method::GET, &format!("/circles/{}/members", encode(circle_id))))
            .await
    }

    pub async fn remove_circle_member(
        &self,
        circle_id: &str,
        user_name: &str,
    ) -> Result<(), ApiError> {
        self.send_unit(self.anon(
            Method::DELETE,
            &format!("/circles/{}/members/{}", encode(circle_id), encode(user_name)),
        ))
        .await
    }

    pub async fn save_circle_message(
        &self,
        circle_id: &str,
        message: &NewMessage,
    ) -> Result<(), ApiError> {
        self.send_unit(
            self.anon(Method::POST, &format!("/circles/{}/messages", encode(circle_id)))
                .json(&json!({ "message": message })),
        )
        .await
    }

    pub async fn get_circle_messages(
        &self,
        circle_id: &str,
    ) -> Result<CircleMessagesResponse, ApiError> {
        self.send(self.anon(Method::GET, &format!("/circles/{}/messages", encode(circle_id))))
            .await
    }

    // -- Echoes and resonances --

    pub async fn save_echo(&self, user_id: &str, text_id: &str) -> Result<(), ApiError> {
        self.send_unit(
            self.anon(Method::POST, "/echos")
                .json(&json!({ "userId": user_id, "textId": text_id })),
        )
        .await
    }

    pub async fn delete_echo(&self, user_id: &str, text_id: &str) -> Result<(), ApiError> {
        self.send_unit(self.anon(
            Method::DELETE,
            &format!("/echos/{}/{}", encode(user_id), encode(text_id)),
        ))
        .await
    }

    pub async fn get_echos(&self, user_id: &str) -> Result<EchosResponse, ApiError> {
        self.send(self.anon(Method::GET, &format!("/echos/{}", encode(user_id))))
            .await
    }

    pub async fn get_resonances(&self, user_id: &str) -> Result<ResonancesResponse, ApiError> {
        self.send(self.anon(Method::GET, &format!("/resonances/{}", encode(user_id))))
            .await
    }

    // -- Last-read markers --

    pub async fn save_last_read(
        &self,
        user_id: &str,
        conversation_id: &str,
        conversation_type: &str,
        timestamp: &str,
    ) -> Result<(), ApiError> {
        self.send_unit(self.anon(Method::POST, "/last-read").json(&json!({
            "userId": user_id,
            "conversationId": conversation_id,
            "conversationType": conversation_type,
            "timestamp": timestamp,
        })))
        .await
    }

    pub async fn get_last_reads(&self, user_id: &str) -> Result<LastReadsResponse, ApiError> {
        self.send(self.anon(Method::GET, &format!("/last-read/{}", encode(user_id))))
            .await
    }

    // -- Admin --

    pub async fn check_admin_status(&self, token: &str) -> Result<AdminStatusResponse, ApiError> {
        self.send(self.authed(Method::GET, "/check-admin", token)).await
    }

    pub async fn get_announcements(&self) -> Result<AnnouncementsResponse, ApiError> {
        self.send(self.anon(Method::GET, "/announcements")).await
    }

    pub async fn save_announcement(
        &self,
        announcement: &NewAnnouncement,
        token: &str,
    ) -> Result<(), ApiError> {
        self.send_unit(self.authed(Method::POST, "/announcements", token).json(announcement))
            .await
    }

    pub async fn delete_announcement(
        &self,
        announcement_id: &str,
        token: &str,
    ) -> Result<(), ApiError> {
        self.send_unit(self.authed(
            Method::DELETE,
            &format!("/announcements/{}", encode(announcement_id)),
            token,
        ))
        .await
    }

    // -- Sponsorships --

    pub async fn get_sponsorships(&self) -> Result<SponsorshipsResponse, ApiError> {
        self.send(self.anon(Method::GET, "/sponsorships")).await
    }

    pub async fn create_sponsorship(
        &self,
        sponsorship: &NewSponsorship,
        token: &str,
    ) -> Result<(), ApiError> {
        self.send_unit(self.authed(Method::POST, "/sponsorships", token).json(sponsorship))
            .await
    }

    pub async fn update_sponsorship(
        &self,
        sponsorship_id: &str,
        sponsorship: &NewSponsorship,
        token: &str,
    ) -> Result<(), ApiError> {
        self.send_unit(
            self.authed(
                Method::PUT,
                &format!("/sponsorships/{}", encode(sponsorship_id)),
                token,
            )
            .json(sponsorship),
        )
        .await
    }

    pub async fn delete_sponsorship(
        &self,
        sponsorship_id: &str,
        token: &str,
    ) -> Result<(), ApiError> {
        self.send_unit(self.authed(
            Method::DELETE,
            &format!("/sponsorships/{}", encode(sponsorship_id)),
            token,
        ))
        .await
    }

    // -- Moderation reports --

    pub async fn create_report(
        &self,
        text_id: &str,
        reason: &str,
        reported_by: Option<&str>,
    ) -> Result<(), ApiError> {
        self.send_unit(self.anon(Method::POST, "/reports").json(&json!({
            "textId": text_id,
            "reason": reason,
            "reportedBy": reported_by,
        })))
        .await
    }

    pub async fn get_reports(&self, token: &str) -> Result<ReportsResponse, ApiError> {
        self.send(self.authed(Method::GET, "/reports", token)).await
    }

    pub async fn delete_report(&self, report_id: &str, token: &str) -> Result<(), ApiError> {
        self.send_unit(self.authed(
            Method::DELETE,
            &format!("/reports/{}", encode(report_id)),
            token,
        ))
        .await
    }

    /// Remove a reported text outright (moderator action).
    pub async fn delete_reported_text(&self, text_id: &str, token: &str) -> Result<(), ApiError> {
        self.send_unit(self.authed(
            Method::DELETE,
            &format!("/reported-texts/{}", encode(text_id)),
            token,
        ))
        .await
    }

    pub async fn create_content_report(&self, report: &NewContentReport) -> Result<(), ApiError> {
        self.send_unit(self.anon(Method::POST, "/content-reports").json(report))
            .await
    }

    pub async fn get_content_reports(&self, token: &str) -> Result<ContentReportsResponse, ApiError> {
        self.send(self.authed(Method::GET, "/content-reports", token)).await
    }

    pub async fn delete_content_report(
        &self,
        report_id: &str,
        token: &str,
    ) -> Result<(), ApiError> {
        self.send_unit(self.authed(
            Method::DELETE,
            &format!("/content-reports/{}", encode(report_id)),
            token,
        ))
        .await
    }

    pub async fn delete_reported_content(
        &self,
        content: &ReportedContentRef,
        token: &str,
    ) -> Result<(), ApiError> {
        self.send_unit(
            self.authed(Method::DELETE, "/reported-content", token)
                .json(content),
        )
        .await
    }

    // -- Account --

    /// Create an account, refusing up front if the author name is taken.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        author_name: &str,
    ) -> Result<SignupResponse, ApiError> {
        let availability = self.check_author_name(author_name).await?;
        if !availability.available {
            return Err(ApiError::Validation(format!(
                "le nom d'auteur \"{}\" est déjà pris",
                author_name
            )));
        }

        self.send(self.anon(Method::POST, "/auth/signup").json(&json!({
            "email": email,
            "password": password,
            "authorName": author_name,
        })))
        .await
    }

    pub async fn check_author_name(
        &self,
        author_name: &str,
    ) -> Result<AvailabilityResponse, ApiError> {
        self.send(self.anon(
            Method::GET,
            &format!("/auth/check-author-name/{}", encode(author_name)),
        ))
        .await
    }
}
