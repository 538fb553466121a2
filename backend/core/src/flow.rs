//! The Afyaplus conversation flow.
//!
//! A flat decision table from intent token to reply. Matching is exact and
//! case-sensitive: free text is lower-cased upstream, reply ids are not.

use crate::reply::{Button, ListRow, ListSection, ReplySpec};

pub const FALLBACK_TEXT: &str = "Say \"hi\" to start or \"menu\" for options.";

pub const GREETINGS: &[&str] = &["hi", "hello", "habari"];

const LANGUAGE_PROMPT: &str = "Welcome to Afyaplus! Please select your preferred language:";
const WELCOME_SW: &str = "Karibu Afyaplus! Nini unahitaji kusaidia?";
const WELCOME_EN: &str = "Welcome to Afyaplus! How can we help you today?";
const DOCTOR_TEXT: &str =
    "Doctor consultation selected. Please describe your symptoms and we will connect you with a doctor.";
const PHARMACY_TEXT: &str =
    "Pharmacy selected. Please tell us what medicine you need or describe your condition.";
const EMERGENCY_TEXT: &str =
    "Emergency services activated! Please share your location and we will send immediate assistance.";

/// Map an intent token to the reply the bot sends back.
pub fn route(token: &str) -> ReplySpec {
    match token {
        t if GREETINGS.contains(&t) => language_selection(),
        "menu" => service_menu(),
        "swahili" => ReplySpec::text(WELCOME_SW),
        "english" => ReplySpec::text(WELCOME_EN),
        "doctor" => ReplySpec::text(DOCTOR_TEXT),
        "pharmacy" => ReplySpec::text(PHARMACY_TEXT),
        "emergency" => ReplySpec::text(EMERGENCY_TEXT),
        _ => ReplySpec::text(FALLBACK_TEXT),
    }
}

fn language_selection() -> ReplySpec {
    ReplySpec::Buttons {
        body: LANGUAGE_PROMPT.into(),
        buttons: vec![
            Button {
                id: "swahili".into(),
                title: "Kiswahili".into(),
            },
            Button {
                id: "english".into(),
                title: "English".into(),
            },
        ],
    }
}

fn service_menu() -> ReplySpec {
    let row = |id: &str, title: &str, description: &str| ListRow {
        id: id.into(),
        title: title.into(),
        description: Some(description.into()),
    };

    ReplySpec::List {
        header: Some("Afyaplus Services".into()),
        body: "Please select a service from menu:".into(),
        footer: Some("Better health solutions".into()),
        button: "Choose service".into(),
        sections: vec![ListSection {
            title: "Medical Services".into(),
            rows: vec![
                row("doctor", "Doctor Consultation", "Talk to a doctor now"),
                row("pharmacy", "Pharmacy", "Order medicines and supplies"),
                row("emergency", "Emergency", "Urgent medical assistance"),
            ],
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::Intent;

    #[test]
    fn greetings_offer_language_buttons() {
        for greeting in GREETINGS {
            let reply = route(greeting);
            assert_eq!(reply.kind(), "buttons");
            assert_eq!(reply.offered_ids(), vec!["swahili", "english"]);
        }
    }

    #[test]
    fn menu_lists_services() {
        let reply = route("menu");
        assert_eq!(reply.kind(), "list");
        assert_eq!(reply.offered_ids(), vec!["doctor", "pharmacy", "emergency"]);
    }

    #[test]
    fn text_replies() {
        assert_eq!(route("swahili"), ReplySpec::text(WELCOME_SW));
        assert_eq!(route("english"), ReplySpec::text(WELCOME_EN));
        assert_eq!(route("doctor"), ReplySpec::text(DOCTOR_TEXT));
        assert_eq!(route("pharmacy"), ReplySpec::text(PHARMACY_TEXT));
        assert_eq!(route("emergency"), ReplySpec::text(EMERGENCY_TEXT));
    }

    #[test]
    fn unknown_tokens_fall_back() {
        for token in ["", "helo", "menu please", " hi", "1", "habari yako"] {
            assert_eq!(route(token), ReplySpec::text(FALLBACK_TEXT), "token {token:?}");
        }
    }

    #[test]
    fn text_casing_is_absorbed_but_ids_are_not() {
        assert_eq!(route(Intent::from_text("HI").as_str()), route("hi"));
        assert_eq!(
            route(Intent::from_reply_id("Doctor").as_str()),
            ReplySpec::text(FALLBACK_TEXT)
        );
    }

    #[test]
    fn every_offered_id_has_a_route() {
        for reply in [route("hi"), route("menu")] {
            for id in reply.offered_ids() {
                assert_ne!(route(id), ReplySpec::text(FALLBACK_TEXT), "id {id} unrouted");
            }
        }
    }
}
