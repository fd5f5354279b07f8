//! The operation set the state aggregator consumes, as a trait so the
//! aggregator can be driven by an in-memory double in tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use encre_types::api::{NewCircle, NewComment, NewMessage, NewText};
use encre_types::models::{
    Circle, Donor, Duo, DuoMessage, GardenComment, Sponsorship, SubscribedAuthor, Subscriber, Text,
};

use crate::client::ApiClient;
use crate::error::ApiError;

#[async_trait]
pub trait Backend: Send + Sync {
    // Reads of the initial batch
    async fn texts(&self) -> Result<Vec<Text>, ApiError>;
    async fn all_comments(&self) -> Result<HashMap<String, Vec<GardenComment>>, ApiError>;
    async fn subscriptions(&self, user: &str) -> Result<Vec<SubscribedAuthor>, ApiError>;
    async fn subscribers(&self, user: &str) -> Result<Vec<Subscriber>, ApiError>;
    async fn donors(&self, user: &str) -> Result<Vec<Donor>, ApiError>;
    async fn duos(&self, user: &str) -> Result<Vec<Duo>, ApiError>;
    async fn all_duo_messages(&self, user: &str)
        -> Result<HashMap<String, Vec<DuoMessage>>, ApiError>;
    async fn circles(&self, user: &str) -> Result<Vec<Circle>, ApiError>;
    async fn echos(&self, user: &str) -> Result<Vec<String>, ApiError>;
    async fn last_reads(&self, user: &str) -> Result<HashMap<String, String>, ApiError>;
    async fn sponsorships(&self) -> Result<Vec<Sponsorship>, ApiError>;

    // Writes behind the mutating operations
    async fn save_text(&self, text: &NewText) -> Result<Text, ApiError>;
    async fn delete_text(&self, text_id: &str) -> Result<(), ApiError>;
    async fn save_echo(&self, user: &str, text_id: &str) -> Result<(), ApiError>;
    async fn delete_echo(&self, user: &str, text_id: &str) -> Result<(), ApiError>;
    async fn save_comment(
        &self,
        text_id: &str,
        comment: &NewComment,
    ) -> Result<GardenComment, ApiError>;
    async fn delete_comment(&self, text_id: &str, comment_id: &str) -> Result<(), ApiError>;
    async fn save_subscription(
        &self,
        user: &str,
        author_name: &str,
        price: f64,
    ) -> Result<(), ApiError>;
    async fn delete_subscription(&self, user: &str, author_name: &str) -> Result<(), ApiError>;
    async fn save_donation(&self, user: &str, donor: &Donor) -> Result<(), ApiError>;
    async fn save_duo(&self, user: &str, duo_name: &str) -> Result<(), ApiError>;
    async fn delete_duo(&self, user: &str, duo_name: &str) -> Result<(), ApiError>;
    async fn save_duo_message(
        &self,
        user: &str,
        duo_name: &str,
        message: &NewMessage,
    ) -> Result<DuoMessage, ApiError>;
    async fn save_circle(&self, user: &str, circle: &NewCircle) -> Result<Circle, ApiError>;
    async fn delete_circle(&self, circle_id: &str) -> Result<(), ApiError>;
    async fn add_circle_member(&self, circle_id: &str, user_name: &str) -> Result<(), ApiError>;
    async fn save_last_read(
        &self,
        user: &str,
        conversation_id: &str,
        conversation_type: &str,
        timestamp: &str,
    ) -> Result<(), ApiError>;
    async fn author_bio(&self, author_name: &str) -> Result<String, ApiError>;
    async fn update_author_bio(&self, author_name: &str, bio: &str) -> Result<(), ApiError>;
    async fn check_admin(&self, token: &str) -> Result<bool, ApiError>;
}

#[async_trait]
impl Backend for ApiClient {
    async fn texts(&self) -> Result<Vec<Text>, ApiError> {
        Ok(self.get_texts().await?.texts)
    }

    async fn all_comments(&self) -> Result<HashMap<String, Vec<GardenComment>>, ApiError> {
        Ok(self.get_all_comments().await?.comments)
    }

    async fn subscriptions(&self, user: &str) -> Result<Vec<SubscribedAuthor>, ApiError> {
        Ok(self.get_subscriptions(user).await?.subscriptions)
    }

    async fn subscribers(&self, user: &str) -> Result<Vec<Subscriber>, ApiError> {
        Ok(self.get_subscribers(user).await?.subscribers)
    }

    async fn donors(&self, user: &str) -> Result<Vec<Donor>, ApiError> {
        Ok(self.get_donors(user).await?.donors)
    }

    async fn duos(&self, user: &str) -> Result<Vec<Duo>, ApiError> {
        Ok(self.get_duos(user).await?.duos)
    }

    async fn all_duo_messages(
        &self,
        user: &str,
    ) -> Result<HashMap<String, Vec<DuoMessage>>, ApiError> {
        Ok(self.get_all_duo_messages(user).await?.messages)
    }

    async fn circles(&self, user: &str) -> Result<Vec<Circle>, ApiError> {
        Ok(self.get_circles(user).await?.circles)
    }

    async fn echos(&self, user: &str) -> Result<Vec<String>, ApiError> {
        Ok(self.get_echos(user).await?.echos)
    }

    async fn last_reads(&self, user: &str) -> Result<HashMap<String, String>, ApiError> {
        Ok(self.get_last_reads(user).await?.last_reads)
    }

    async fn sponsorships(&self) -> Result<Vec<Sponsorship>, ApiError> {
        Ok(self.get_sponsorships().await?.sponsorships)
    }

    async fn save_text(&self, text: &NewText) -> Result<Text, ApiError> {
        Ok(self.save_text(text).await?.data)
    }

    async fn delete_text(&self, text_id: &str) -> Result<(), ApiError> {
        self.delete_text(text_id).await
    }

    async fn save_echo(&self, user: &str, text_id: &str) -> Result<(), ApiError> {
        self.save_echo(user, text_id).await
    }

    async fn delete_echo(&self, user: &str, text_id: &str) -> Result<(), ApiError> {
        self.delete_echo(user, text_id).await
    }

    async fn save_comment(
        &self,
        text_id: &str,
        comment: &NewComment,
    ) -> Result<GardenComment, ApiError> {
        Ok(self.save_comment(text_id, comment).await?.comment)
    }

    async fn delete_comment(&self, text_id: &str, comment_id: &str) -> Result<(), ApiError> {
        self.delete_comment(text_id, comment_id).await
    }

    async fn save_subscription(
        &self,
        user: &str,
        author_name: &str,
        price: f64,
    ) -> Result<(), ApiError> {
        self.save_subscription(user, author_name, price).await
    }

    async fn delete_subscription(&self, user: &str, author_name: &str) -> Result<(), ApiError> {
        self.delete_subscription(user, author_name).await
    }

    async fn save_donation(&self, user: &str, donor: &Donor) -> Result<(), ApiError> {
        self.save_donation(user, donor).await
    }

    async fn save_duo(&self, user: &str, duo_name: &str) -> Result<(), ApiError> {
        self.save_duo(user, duo_name).await
    }

    async fn delete_duo(&self, user: &str, duo_name: &str) -> Result<(), ApiError> {
        self.delete_duo(user, duo_name).await
    }

    async fn save_duo_message(
        &self,
        user: &str,
        duo_name: &str,
        message: &NewMessage,
    ) -> Result<DuoMessage, ApiError> {
        Ok(self.save_duo_message(user, duo_name, message).await?.message)
    }

    async fn save_circle(&self, user: &str, circle: &NewCircle) -> Result<Circle, ApiError> {
        Ok(self.save_circle(user, circle).await?.circle)
    }

    async fn delete_circle(&self, circle_id: &str) -> Result<(), ApiError> {
        self.delete_circle(circle_id).await
    }

    async fn add_circle_member(&self, circle_id: &str, user_name: &str) -> Result<(), ApiError> {
        self.add_circle_member(circle_id, user_name).await
    }

    async fn save_last_read(
        &self,
        user: &str,
        conversation_id: &str,
        conversation_type: &str,
        timestamp: &str,
    ) -> Result<(), ApiError> {
        self.save_last_read(user, conversation_id, conversation_type, timestamp)
            .await
    }

    async fn author_bio(&self, author_name: &str) -> Result<String, ApiError> {
        Ok(self.get_author_bio(author_name).await?.bio)
    }

    async fn update_author_bio(&self, author_name: &str, bio: &str) -> Result<(), ApiError> {
        self.update_author_bio(author_name, bio).await
    }

    async fn check_admin(&self, token: &str) -> Result<bool, ApiError> {
        Ok(self.check_admin_status(token).await?.is_admin)
    }
}

#[async_trait]
impl<T: Backend + ?Sized> Backend for Arc<T> {
    async fn texts(&self) -> Result<Vec<Text>, ApiError> {
        (**self).texts().await
    }

    async fn all_comments(&self) -> Result<HashMap<String, Vec<GardenComment>>, ApiError> {
        (**self).all_comments().await
    }

    async fn subscriptions(&self, user: &str) -> Result<Vec<SubscribedAuthor>, ApiError> {
        (**self).subscriptions(user).await
    }

    async fn subscribers(&self, user: &str) -> Result<Vec<Subscriber>, ApiError> {
        (**self).subscribers(user).await
    }

    async fn donors(&self, user: &str) -> Result<Vec<Donor>, ApiError> {
        (**self).donors(user).await
    }

    async fn duos(&self, user: &str) -> Result<Vec<Duo>, ApiError> {
        (**self).duos(user).await
    }

    async fn all_duo_messages(
        &self,
        user: &str,
    ) -> Result<HashMap<String, Vec<DuoMessage>>, ApiError> {
        (**self).all_duo_messages(user).await
    }

    async fn circles(&self, user: &str) -> Result<Vec<Circle>, ApiError> {
        (**self).circles(user).await
    }

    async fn echos(&self, user: &str) -> Result<Vec<String>, ApiError> {
        (**self).echos(user).await
    }

    async fn last_reads(&self, user: &str) -> Result<HashMap<String, String>, ApiError> {
        (**self).last_reads(user).await
    }

    async fn sponsorships(&self) -> Result<Vec<Sponsorship>, ApiError> {
        (**self).sponsorships().await
    }

    async fn save_text(&self, text: &NewText) -> Result<Text, ApiError> {
        (**self).save_text(text).await
    }

    async fn delete_text(&self, text_id: &str) -> Result<(), ApiError> {
        (**self).delete_text(text_id).await
    }

    async fn save_echo(&self, user: &str, text_id: &str) -> Result<(), ApiError> {
        (**self).save_echo(user, text_id).await
    }

    async fn delete_echo(&self, user: &str, text_id: &str) -> Result<(), ApiError> {
        (**self).delete_echo(user, text_id).await
    }

    async fn save_comment(
        &self,
        text_id: &str,
        comment: &NewComment,
    ) -> Result<GardenComment, ApiError> {
        (**self).save_comment(text_id, comment).await
    }

    async fn delete_comment(&self, text_id: &str, comment_id: &str) -> Result<(), ApiError> {
        (**self).delete_comment(text_id, comment_id).await
    }

    async fn save_subscription(
        &self,
        user: &str,
        author_name: &str,
        price: f64,
    ) -> Result<(), ApiError> {
        (**self).save_subscription(user, author_name, price).await
    }

    async fn delete_subscription(&self, user: &str, author_name: &str) -> Result<(), ApiError> {
        (**self).delete_subscription(user, author_name).await
    }

    async fn save_donation(&self, user: &str, donor: &Donor) -> Result<(), ApiError> {
        (**self).save_donation(user, donor).await
    }

    async fn save_duo(&self, user: &str, duo_name: &str) -> Result<(), ApiError> {
        (**self).save_duo(user, duo_name).await
    }

    async fn delete_duo(&self, user: &str, duo_name: &str) -> Result<(), ApiError> {
        (**self).delete_duo(user, duo_name).await
    }

    async fn save_duo_message(
        &self,
        user: &str,
        duo_name: &str,
        message: &NewMessage,
    ) -> Result<DuoMessage, ApiError> {
        (**self).save_duo_message(user, duo_name, message).await
    }

    async fn save_circle(&self, user: &str, circle: &NewCircle) -> Result<Circle, ApiError> {
        (**self).save_circle(user, circle).await
    }

    async fn delete_circle(&self, circle_id: &str) -> Result<(), ApiError> {
        (**self).delete_circle(circle_id).await
    }

    async fn add_circle_member(&self, circle_id: &str, user_name: &str) -> Result<(), ApiError> {
        (**self).add_circle_member(circle_id, user_name).await
    }

    async fn save_last_read(
        &self,
        user: &str,
        conversation_id: &str,
        conversation_type: &str,
        timestamp: &str,
    ) -> Result<(), ApiError> {
        (**self)
            .save_last_read(user, conversation_id, conversation_type, timestamp)
            .await
    }

    async fn author_bio(&self, author_name: &str) -> Result<String, ApiError> {
        (**self).author_bio(author_name).await
    }

    async fn update_author_bio(&self, author_name: &str, bio: &str) -> Result<(), ApiError> {
        (**self).update_author_bio(author_name, bio).await
    }

    async fn check_admin(&self, token: &str) -> Result<bool, ApiError> {
        (**self).check_admin(token).await
    }
}
