use chrono::{DateTime, Utc};

/// Elapsed time since `date`, as the feed displays it ("à l'instant",
/// "il y a 5 minutes", "il y a 2 heures", ...).
pub fn relative_time(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - date).num_seconds().max(0);
    if seconds < 60 {
        return "à l'instant".to_string();
    }

    let minutes = seconds / 60;
    if minutes < 60 {
        return ago(minutes, "minute", "minutes");
    }

    let hours = minutes / 60;
    if hours < 24 {
        return ago(hours, "heure", "heures");
    }

    let days = hours / 24;
    if days < 7 {
        return ago(days, "jour", "jours");
    }

    let weeks = days / 7;
    if weeks < 4 {
        return ago(weeks, "semaine", "semaines");
    }

    let months = days / 30;
    if months < 12 {
        return ago(months, "mois", "mois");
    }

    let years = days / 365;
    ago(years, "an", "ans")
}

fn ago(count: i64, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("il y a 1 {}", singular)
    } else {
        format!("il y a {} {}", count, plural)
    }
}
