//! Starter content for first-time accounts.
//!
//! Seeding is idempotent by existence check: it runs only when the
//! account sees zero texts, and a failed probe counts as "no content"
//! so a brand-new backend still gets seeded. Once any text exists the
//! seed never runs again.

use chrono::{Duration, Utc};
use tracing::{error, info, warn};

use encre_api::{ApiError, Backend};
use encre_types::api::NewText;
use encre_types::models::Author;

/// The featured author every new account starts subscribed to.
pub const STARTER_AUTHOR: &str = "Margaux Delorme";

const STARTER_DUO_PEER: &str = "Théo Rousseau";
const STARTER_PRICE: f64 = 3.99;

pub async fn ensure_seeded<B: Backend>(backend: &B, user: &str) {
    let exists = match backend.texts().await {
        Ok(texts) => !texts.is_empty(),
        Err(e) => {
            warn!("Existence probe failed, assuming first visit: {}", e);
            false
        }
    };
    if exists {
        return;
    }

    info!("Seeding starter content for {}", user);
    if let Err(e) = seed(backend, user).await {
        error!("Failed to seed starter content: {}", e);
    }
}

async fn seed<B: Backend>(backend: &B, user: &str) -> Result<(), ApiError> {
    for text in starter_texts(user) {
        backend.save_text(&text).await?;
    }
    backend.save_subscription(user, STARTER_AUTHOR, STARTER_PRICE).await?;
    backend.save_duo(user, STARTER_AUTHOR).await?;
    backend.save_duo(user, STARTER_DUO_PEER).await?;
    Ok(())
}

fn starter_texts(user: &str) -> Vec<NewText> {
    let now = Utc::now();
    vec![
        NewText {
            author: Author { name: STARTER_AUTHOR.into(), avatar: String::new() },
            title: "Marée basse".into(),
            content: "La mer s'est retirée sans bruit\n\
                      Laissant au sable ses promesses\n\
                      Je marche où l'eau dormait la nuit\n\
                      Et je ramasse ses tendresses\n\
                      Chaque coquillage est un mot\n\
                      Que la vague n'a pas su dire\n\
                      Je les garde contre ma peau\n\
                      En attendant qu'elle respire"
                .into(),
            category: "Poème".into(),
            themes: None,
            location: None,
            date: "il y a 2h".into(),
            published_at: now - Duration::hours(2),
            has_audio_recording: true,
            subscribers_only: true,
        },
        NewText {
            author: Author { name: STARTER_AUTHOR.into(), avatar: String::new() },
            title: "Ce que novembre emporte".into(),
            content: "Novembre a plié les jardins\n\
                      Comme on replie une lettre lue\n\
                      Il reste l'odeur du matin\n\
                      Et la lumière des rues\n\
                      J'ai appris à aimer la pluie\n\
                      Qui efface et qui recommence\n\
                      Chaque goutte est une vie\n\
                      Qui tombe juste et qui danse"
                .into(),
            category: "Poème".into(),
            themes: None,
            location: None,
            date: "il y a 15 jours".into(),
            published_at: now - Duration::days(15),
            has_audio_recording: false,
            subscribers_only: true,
        },
        NewText {
            author: Author { name: user.into(), avatar: String::new() },
            title: "Premier feuillet".into(),
            content: "J'ouvre un carnet qui ne juge pas\n\
                      Les ratures y sont des chemins\n\
                      Ce que je n'ose dire tout bas\n\
                      S'écrit mieux du bout des mains\n\
                      Si tu lis ces lignes un jour\n\
                      Sache qu'elles cherchaient ta fenêtre\n\
                      Les mots font parfois le détour\n\
                      Qu'un silence n'a pas su mettre"
                .into(),
            category: "Poème".into(),
            themes: None,
            location: None,
            date: "il y a 1 jour".into(),
            published_at: now - Duration::days(1),
            has_audio_recording: false,
            subscribers_only: false,
        },
    ]
}
