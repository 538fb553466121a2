//! Reply specifications.
//!
//! A `ReplySpec` describes what the bot wants to say, independent of how a
//! channel serializes it on the wire.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A quick-reply button: `id` comes back as the intent token when tapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRow {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSection {
    pub title: String,
    pub rows: Vec<ListRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplySpec {
    Text {
        body: String,
    },
    Buttons {
        body: String,
        buttons: Vec<Button>,
    },
    List {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        header: Option<String>,
        body: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        footer: Option<String>,
        /// Label of the button that opens the list.
        button: String,
        sections: Vec<ListSection>,
    },
}

impl ReplySpec {
    pub fn text(body: impl Into<String>) -> Self {
        ReplySpec::Text { body: body.into() }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ReplySpec::Text { .. } => "text",
            ReplySpec::Buttons { .. } => "buttons",
            ReplySpec::List { .. } => "list",
        }
    }

    /// Every token this reply offers the user to send back.
    pub fn offered_ids(&self) -> Vec<&str> {
        match self {
            ReplySpec::Text { .. } => Vec::new(),
            ReplySpec::Buttons { buttons, .. } => buttons.iter().map(|b| b.id.as_str()).collect(),
            ReplySpec::List { sections, .. } => sections
                .iter()
                .flat_map(|s| s.rows.iter().map(|r| r.id.as_str()))
                .collect(),
        }
    }
}

/// Plain-text rendering for terminals.
impl fmt::Display for ReplySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplySpec::Text { body } => write!(f, "{body}"),
            ReplySpec::Buttons { body, buttons } => {
                writeln!(f, "{body}")?;
                for b in buttons {
                    writeln!(f, "  [{}] {}", b.id, b.title)?;
                }
                Ok(())
            }
            ReplySpec::List {
                header,
                body,
                footer,
                button,
                sections,
            } => {
                if let Some(h) = header {
                    writeln!(f, "== {h} ==")?;
                }
                writeln!(f, "{body}")?;
                writeln!(f, "({button})")?;
                for s in sections {
                    writeln!(f, "  {}:", s.title)?;
                    for r in &s.rows {
                        match &r.description {
                            Some(d) => writeln!(f, "    [{}] {} - {}", r.id, r.title, d)?,
                            None => writeln!(f, "    [{}] {}", r.id, r.title)?,
                        }
                    }
                }
                if let Some(ft) = footer {
                    writeln!(f, "{ft}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offered_ids_cover_buttons_and_rows() {
        let buttons = ReplySpec::Buttons {
            body: "pick".into(),
            buttons: vec![
                Button { id: "a".into(), title: "A".into() },
                Button { id: "b".into(), title: "B".into() },
            ],
        };
        assert_eq!(buttons.offered_ids(), vec!["a", "b"]);
        assert!(ReplySpec::text("hi").offered_ids().is_empty());
    }

    #[test]
    fn display_lists_rows() {
        let list = ReplySpec::List {
            header: Some("Head".into()),
            body: "Body".into(),
            footer: None,
            button: "Open".into(),
            sections: vec![ListSection {
                title: "S".into(),
                rows: vec![ListRow {
                    id: "x".into(),
                    title: "X".into(),
                    description: Some("desc".into()),
                }],
            }],
        };
        let rendered = list.to_string();
        assert!(rendered.contains("== Head =="));
        assert!(rendered.contains("[x] X - desc"));
    }

    #[test]
    fn serializes_with_kind_tag() {
        let v = serde_json::to_value(ReplySpec::text("yo")).unwrap();
        assert_eq!(v["kind"], "text");
        assert_eq!(v["body"], "yo");
    }
}
