/// Normalized token read from one inbound message.
///
/// A delivery with nothing to answer has no `Intent` at all; an empty token is
/// a real message with no recognizable content and gets the fallback reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Intent(String);

impl Intent {
    /// Free text from the user. Lower-cased so casing variance is absorbed.
    pub fn from_text(body: &str) -> Self {
        Intent(body.to_lowercase())
    }

    /// Button or list reply id. Ids are canonical and kept verbatim.
    pub fn from_reply_id(id: &str) -> Self {
        Intent(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_lowercased() {
        assert_eq!(Intent::from_text("HeLLo").as_str(), "hello");
    }

    #[test]
    fn reply_ids_are_verbatim() {
        assert_eq!(Intent::from_reply_id("Doctor").as_str(), "Doctor");
    }

    #[test]
    fn default_is_the_empty_token() {
        assert_eq!(Intent::default().as_str(), "");
        assert_eq!(Intent::default(), Intent::from_text(""));
    }
}
