// ============================================================================
// Formatage des valeurs affichées
// ============================================================================
// Fonctions pures : horloge, date ordinale, uptime, prix
// ============================================================================

use chrono::{Datelike, NaiveDate};

/// Durée en "3h07m" (moins d'un jour) ou "2d03h07m"
pub fn dhm(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let days = seconds / 86_400;
    let hours = (seconds / 3_600) % 24;
    let minutes = (seconds / 60) % 60;

    if days < 1 {
        format!("{}h{:02}m", hours, minutes)
    } else {
        format!("{}d{:02}h{:02}m", days, hours, minutes)
    }
}

/// Suffixe ordinal anglais : 1st, 2nd, 3rd, 4th, 11th, 22nd...
pub fn ordinal_suffix(n: u32) -> &'static str {
    if (4..=20).contains(&(n % 100)) {
        return "th";
    }
    match n % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// Première ligne de la date : "Sun 18th"
pub fn day_line(date: NaiveDate) -> String {
    format!("{} {}{}", date.format("%a"), date.day(), ordinal_suffix(date.day()))
}

/// Deuxième ligne de la date : "Oct '26"
pub fn month_line(date: NaiveDate) -> String {
    date.format("%b '%y").to_string()
}

/// Entier avec séparateur de milliers : 67123 → "67,123"
pub fn thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Montant en dollars arrondi : "$67,123"
pub fn dollars(value: f64) -> String {
    format!("${}", thousands(value.round() as i64))
}

/// Prix spot : "$67,123", ou "$104.5K" à partir de 100 000
///
/// Le dixième de millier est tronqué, pas arrondi
pub fn format_spot(value: f64) -> String {
    if value >= 100_000.0 {
        let whole = value as i64;
        format!("${}.{}K", thousands(whole / 1000), (whole % 1000) / 100)
    } else {
        dollars(value)
    }
}

/// Taux secondaire : "LTC:0.0041"
pub fn format_rate(value: f64) -> String {
    format!("LTC:{:.4}", value)
}

/// Ligne de statut : localisation, niveau de contraste, uptime
///
/// Le chiffre de contraste est omis au maximum
pub fn status_line(location_label: &str, contrast_step: Option<u8>, uptime: &str) -> String {
    match contrast_step {
        Some(step) => format!("{}   {}  Up: {}", location_label, step, uptime),
        None => format!("{}   Up: {}", location_label, uptime),
    }
}
