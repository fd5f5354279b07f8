mod relative_time;

use chrono::Utc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use encre_api::ApiClient;
use encre_store::Store;
use relative_time::relative_time;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "encre=debug,encre_api=debug,encre_store=debug".into()),
        )
        .init();

    // Config
    let base_url =
        std::env::var("ENCRE_API_BASE").unwrap_or_else(|_| "http://localhost:3000".into());
    let anon_key = std::env::var("ENCRE_ANON_KEY").unwrap_or_default();
    let user = std::env::var("ENCRE_USER").unwrap_or_else(|_| "Invitée".into());

    let client = ApiClient::new(base_url, anon_key);
    let store = Store::new(client, user.clone());

    info!("Loading feed for {}", user);
    store.load_all().await?;

    let snapshot = store.snapshot().await;
    let now = Utc::now();

    println!("— Fil de {} —", user);
    for text in &snapshot.texts {
        let mut markers = Vec::new();
        if text.is_echoed {
            markers.push("écho");
        }
        if text.is_saved {
            markers.push("gardé");
        }
        if text.subscribers_only {
            markers.push("abonnés");
        }
        if text.has_audio_recording {
            markers.push("audio");
        }
        let markers = if markers.is_empty() {
            String::new()
        } else {
            format!(" [{}]", markers.join(", "))
        };

        let comments = snapshot.garden_comments.get(&text.id).map(Vec::len).unwrap_or(0);
        println!(
            "{} — {} ({}){} · {} commentaire(s)",
            text.title,
            text.author.name,
            relative_time(text.published_at, now),
            markers,
            comments,
        );
    }

    println!();
    println!("Abonnements : {}", snapshot.subscribed_authors.len());
    println!("Cercles     : {}", snapshot.custom_circles.len());
    for duo in &snapshot.my_duos {
        let unread = if snapshot.duo_has_unread(&duo.name) { " ●" } else { "" };
        println!("Duo avec {}{}", duo.name, unread);
    }

    Ok(())
}
