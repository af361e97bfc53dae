use crate::domain::model::{is_remote_location, JobRecord, RawCard, REMOTE_LOCATION, UNKNOWN_COMPANY};

fn or_default(value: &str, default: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

/// Location used when a card carries none: the requested one, unless that is
/// blank or remote-like.
pub fn fallback_location(request_location: &str) -> &str {
    let requested = request_location.trim();
    if requested.is_empty() || is_remote_location(requested) {
        REMOTE_LOCATION
    } else {
        requested
    }
}

/// Maps one extracted card onto the canonical record. Never fails; missing
/// pieces are defaulted.
pub fn normalize(card: RawCard, source_name: &str, request_location: &str) -> JobRecord {
    JobRecord {
        title: card.title.trim().to_string(),
        company: or_default(&card.company, UNKNOWN_COMPANY),
        location: or_default(&card.location, fallback_location(request_location)),
        description: String::new(),
        url: card.url.trim().to_string(),
        source: source_name.to_string(),
        liked: false,
        applied: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fills_defaults() {
        let card = RawCard {
            title: " Rust Engineer ".to_string(),
            url: "https://example.com/1".to_string(),
            ..Default::default()
        };

        let record = normalize(card, "CareerJet", "Pune");

        assert_eq!(record.title, "Rust Engineer");
        assert_eq!(record.company, "Unknown Company");
        assert_eq!(record.location, "Pune");
        assert_eq!(record.description, "");
        assert_eq!(record.source, "CareerJet");
        assert!(!record.liked);
        assert!(!record.applied);
    }

    #[test]
    fn test_remote_request_defaults_to_remote() {
        let card = RawCard {
            title: "Rust Engineer".to_string(),
            url: "https://example.com/1".to_string(),
            ..Default::default()
        };

        assert_eq!(normalize(card.clone(), "LinkedIn", "wfh").location, "Remote");
        assert_eq!(normalize(card, "LinkedIn", "").location, "Remote");
    }

    #[test]
    fn test_keeps_scraped_location_and_company() {
        let card = RawCard {
            title: "Rust Engineer".to_string(),
            company: "Acme".to_string(),
            location: "Bengaluru".to_string(),
            url: "https://example.com/1".to_string(),
        };

        let record = normalize(card, "TimesJobs", "Pune");
        assert_eq!(record.company, "Acme");
        assert_eq!(record.location, "Bengaluru");
    }
}
