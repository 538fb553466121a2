//! WhatsApp Cloud API webhook payloads.
//!
//! Every field is optional: the platform sends several event shapes through the
//! same callback (messages, statuses, errors) and a missing level simply means
//! there is nothing to answer. A `null` or wrongly typed value at any level
//! reads as absent instead of failing the whole delivery.

use afyabot_core::Intent;
use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// Absent, `null` or wrongly typed values all become `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// A sequence whose unreadable elements are kept as `None` so that index 0
/// still means "first element".
fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Option<Vec<Option<T>>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(
            items
                .into_iter()
                .map(|item| serde_json::from_value(item).ok())
                .collect(),
        )),
        _ => Ok(None),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default, deserialize_with = "lenient")]
    pub object: Option<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub entry: Option<Vec<Option<Entry>>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Entry {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub changes: Option<Vec<Option<Change>>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Change {
    #[serde(default, deserialize_with = "lenient")]
    pub field: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub value: Option<ChangeValue>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChangeValue {
    #[serde(default, deserialize_with = "lenient")]
    pub messaging_product: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub metadata: Option<MetaData>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub messages: Option<Vec<Option<WhatsAppMessage>>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MetaData {
    #[serde(default, deserialize_with = "lenient")]
    pub display_phone_number: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub phone_number_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WhatsAppMessage {
    #[serde(default, deserialize_with = "lenient")]
    pub from: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub timestamp: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub msg_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub text: Option<TextData>,
    #[serde(default, deserialize_with = "lenient")]
    pub interactive: Option<InteractiveData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TextData {
    #[serde(default, deserialize_with = "lenient")]
    pub body: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InteractiveData {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub button_reply: Option<ReplyRef>,
    #[serde(default, deserialize_with = "lenient")]
    pub list_reply: Option<ReplyRef>,
}

/// The option a user tapped in a button or list message.
#[derive(Debug, Default, Deserialize)]
pub struct ReplyRef {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
}

/// What the bot needs from one delivery: who to answer and what they said.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundDelivery {
    /// Sender of the first message; empty when the platform omitted it.
    pub from: String,
    pub intent: Intent,
    /// Messages after the first one in the same callback. They are not answered.
    pub dropped: usize,
    /// `metadata.phone_number_id` of the receiving business number, if present.
    pub phone_number_id: Option<String>,
}

impl WebhookPayload {
    /// Read any JSON document as a delivery. Anything that is not an object
    /// is an empty delivery.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    /// `entry[0].changes[0].value`, or `None` at the first missing level.
    pub fn first_value(&self) -> Option<&ChangeValue> {
        self.entry
            .as_deref()?
            .first()?
            .as_ref()?
            .changes
            .as_deref()?
            .first()?
            .as_ref()?
            .value
            .as_ref()
    }

    /// Read the first message of the delivery. `None` means nothing to answer
    /// and no reply must be sent.
    pub fn extract(&self) -> Option<InboundDelivery> {
        let value = self.first_value()?;
        let messages = value.messages.as_deref()?;
        let first = messages.first()?.as_ref()?;

        Some(InboundDelivery {
            from: first.from.clone().unwrap_or_default(),
            intent: first.intent(),
            dropped: messages.len() - 1,
            phone_number_id: value
                .metadata
                .as_ref()
                .and_then(|m| m.phone_number_id.clone()),
        })
    }
}

impl WhatsAppMessage {
    /// Text wins over button replies, which win over list replies.
    pub fn intent(&self) -> Intent {
        if let Some(text) = &self.text {
            return Intent::from_text(text.body.as_deref().unwrap_or_default());
        }
        let Some(interactive) = &self.interactive else {
            return Intent::default();
        };
        let reply = interactive
            .button_reply
            .as_ref()
            .or(interactive.list_reply.as_ref());
        match reply {
            Some(r) => Intent::from_reply_id(r.id.as_deref().unwrap_or_default()),
            None => Intent::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(v: serde_json::Value) -> WebhookPayload {
        WebhookPayload::from_value(v)
    }

    fn intent_of(payload: &WebhookPayload) -> Intent {
        payload.extract().expect("delivery has a message").intent
    }

    fn with_messages(messages: serde_json::Value) -> WebhookPayload {
        parse(json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "WABA_ID",
                "changes": [{
                    "field": "messages",
                    "value": {
                        "messaging_product": "whatsapp",
                        "metadata": { "display_phone_number": "15550001111", "phone_number_id": "1029384756" },
                        "messages": messages
                    }
                }]
            }]
        }))
    }

    #[test]
    fn text_message_is_lowercased() {
        let payload = with_messages(json!([
            { "from": "255700000001", "id": "wamid.1", "type": "text", "text": { "body": "Hello" } }
        ]));
        let delivery = payload.extract().unwrap();
        assert_eq!(delivery.from, "255700000001");
        assert_eq!(delivery.intent, Intent::from_text("hello"));
        assert_eq!(delivery.phone_number_id.as_deref(), Some("1029384756"));
        assert_eq!(delivery.dropped, 0);
    }

    #[test]
    fn button_reply_id_is_verbatim() {
        let payload = with_messages(json!([{
            "from": "255700000001",
            "type": "interactive",
            "interactive": { "type": "button_reply", "button_reply": { "id": "Swahili", "title": "Kiswahili" } }
        }]));
        assert_eq!(intent_of(&payload).as_str(), "Swahili");
    }

    #[test]
    fn list_reply_id_is_used() {
        let payload = with_messages(json!([{
            "from": "255700000001",
            "type": "interactive",
            "interactive": { "type": "list_reply", "list_reply": { "id": "pharmacy", "title": "Pharmacy" } }
        }]));
        assert_eq!(intent_of(&payload).as_str(), "pharmacy");
    }

    #[test]
    fn text_takes_precedence_over_interactive() {
        let payload = with_messages(json!([{
            "from": "1",
            "text": { "body": "MENU" },
            "interactive": { "button_reply": { "id": "doctor" } }
        }]));
        assert_eq!(intent_of(&payload).as_str(), "menu");
    }

    #[test]
    fn unsupported_message_kind_yields_empty_token() {
        let payload = with_messages(json!([
            { "from": "1", "type": "image", "image": { "id": "media-1" } }
        ]));
        assert_eq!(intent_of(&payload), Intent::default());

        let payload = with_messages(json!([
            { "from": "1", "type": "interactive", "interactive": { "type": "nfm_reply" } }
        ]));
        assert_eq!(intent_of(&payload), Intent::default());
    }

    #[test]
    fn text_without_body_yields_empty_token() {
        let payload = with_messages(json!([{ "from": "1", "text": {} }]));
        assert_eq!(intent_of(&payload), Intent::default());
    }

    #[test]
    fn only_first_message_is_read() {
        let payload = with_messages(json!([
            { "from": "111", "text": { "body": "hi" } },
            { "from": "222", "text": { "body": "menu" } },
            { "from": "333", "text": { "body": "doctor" } }
        ]));
        let delivery = payload.extract().unwrap();
        assert_eq!(delivery.from, "111");
        assert_eq!(delivery.intent.as_str(), "hi");
        assert_eq!(delivery.dropped, 2);
    }

    #[test]
    fn missing_levels_are_noop() {
        let cases = [
            json!({}),
            json!({ "entry": null }),
            json!({ "entry": [] }),
            json!({ "entry": [{}] }),
            json!({ "entry": [{ "changes": [] }] }),
            json!({ "entry": [{ "changes": [{}] }] }),
            json!({ "entry": [{ "changes": [{ "value": {} }] }] }),
            json!({ "entry": [{ "changes": [{ "value": { "messages": [] } }] }] }),
            json!({ "entry": [{ "changes": [{ "value": { "statuses": [{ "status": "read" }] } }] }] }),
            json!(null),
            json!([]),
            json!("entry"),
            json!({ "entry": [null] }),
            json!({ "entry": {} }),
            json!({ "entry": "x" }),
            json!({ "entry": [{ "changes": [null] }] }),
            json!({ "entry": [{ "changes": {} }] }),
            json!({ "entry": [{ "changes": [{ "value": "x" }] }] }),
            json!({ "entry": [{ "changes": [{ "value": { "messages": [null] } }] }] }),
            json!({ "entry": [{ "changes": [{ "value": { "messages": {} } }] }] }),
            json!({ "entry": [{ "changes": [{ "value": { "messages": [42, { "text": { "body": "hi" } }] } }] }] }),
        ];
        for case in cases {
            let payload = parse(case.clone());
            assert!(payload.extract().is_none(), "case {case}");
        }
    }

    #[test]
    fn wrongly_typed_leaves_read_as_absent() {
        let payload = with_messages(json!([{
            "from": 255700000001u64,
            "text": { "body": 7 },
            "interactive": { "button_reply": { "id": "doctor" } }
        }]));
        let delivery = payload.extract().unwrap();
        assert_eq!(delivery.from, "");
        assert_eq!(delivery.intent, Intent::default());

        let payload = with_messages(json!([{
            "from": "1",
            "text": "menu",
            "interactive": { "button_reply": { "id": "doctor" } }
        }]));
        assert_eq!(intent_of(&payload).as_str(), "doctor");
    }

    #[test]
    fn null_later_entries_do_not_hide_the_first() {
        let payload = parse(json!({
            "entry": [{
                "changes": [{ "value": { "messages": [{ "from": "1", "text": { "body": "Menu" } }, null] } }, null]
            }, null]
        }));
        let delivery = payload.extract().unwrap();
        assert_eq!(delivery.intent.as_str(), "menu");
        assert_eq!(delivery.dropped, 1);
    }

    #[test]
    fn missing_sender_is_empty_string() {
        let payload = with_messages(json!([{ "text": { "body": "hi" } }]));
        assert_eq!(payload.extract().unwrap().from, "");
    }
}
