use siteprobe_common::{ContentProfile, ContentRecord, WebsiteType};

/// Keyword families checked in order; the first hit decides the type.
const TYPE_KEYWORDS: &[(WebsiteType, &[&str])] = &[
    (
        WebsiteType::ECommerce,
        &["shop", "buy", "price", "store", "product"],
    ),
    (
        WebsiteType::Educational,
        &["learn", "course", "tutorial", "training"],
    ),
    (WebsiteType::Informational, &["news", "article", "blog", "info"]),
    (
        WebsiteType::Service,
        &["service", "consultation", "support", "help"],
    ),
    (
        WebsiteType::Corporate,
        &["about us", "company", "business", "enterprise"],
    ),
];

const CATEGORY_MARKERS: &[&str] = &["products", "services", "categories"];

/// Keyword heuristics over the extracted content, reported alongside the
/// generated question.
pub fn profile(content: &ContentRecord) -> ContentProfile {
    ContentProfile {
        website_type: website_type(content),
        primary_categories: primary_categories(content),
    }
}

pub fn website_type(content: &ContentRecord) -> WebsiteType {
    let title = content.title.to_lowercase();
    let body = content.main_content.to_lowercase();

    TYPE_KEYWORDS
        .iter()
        .find(|(_, words)| {
            words
                .iter()
                .any(|w| title.contains(w) || body.contains(w))
        })
        .map(|(kind, _)| *kind)
        .unwrap_or(WebsiteType::General)
}

/// Distinct headings that name a catalogue section, first-seen order.
pub fn primary_categories(content: &ContentRecord) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for heading in &content.headings {
        let lower = heading.text.to_lowercase();
        if CATEGORY_MARKERS.iter().any(|m| lower.contains(m)) && !out.contains(&heading.text) {
            out.push(heading.text.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use siteprobe_common::{Heading, HeadingLevel};

    fn record(title: &str, body: &str, headings: &[&str]) -> ContentRecord {
        ContentRecord {
            title: title.into(),
            meta_description: String::new(),
            main_content: body.into(),
            headings: headings
                .iter()
                .map(|t| Heading {
                    level: HeadingLevel::H2,
                    text: t.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn first_matching_family_wins() {
        // "support" (service) and "shop" (e-commerce) both match; e-commerce is checked first
        let r = record("Support Shop", "", &[]);
        assert_eq!(website_type(&r), WebsiteType::ECommerce);
    }

    #[test]
    fn body_text_is_checked_too() {
        let r = record("Acme", "Enroll in our Python COURSE today", &[]);
        assert_eq!(website_type(&r), WebsiteType::Educational);

        let r = record("Acme", "Read about us and our team", &[]);
        assert_eq!(website_type(&r), WebsiteType::Corporate);
    }

    #[test]
    fn nothing_matching_is_general() {
        let r = record("Zebra", "stripes", &[]);
        assert_eq!(website_type(&r), WebsiteType::General);
    }

    #[test]
    fn categories_come_from_marked_headings() {
        let r = record(
            "",
            "",
            &["Our Products", "Team", "Services we offer", "Our Products", "All Categories"],
        );
        assert_eq!(
            primary_categories(&r),
            vec!["Our Products", "Services we offer", "All Categories"]
        );
    }

    #[test]
    fn profile_combines_both() {
        let r = record("Daily News", "", &["Product Categories"]);
        let p = profile(&r);
        assert_eq!(p.website_type, WebsiteType::Informational);
        assert_eq!(p.primary_categories, vec!["Product Categories"]);
    }
}
