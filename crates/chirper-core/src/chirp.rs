use serde::{Deserialize, Serialize};

/// Maximum length of a chirp message, in characters.
pub const MAX_MESSAGE_LEN: usize = 255;
/// Maximum length of a username, in characters.
pub const MAX_USERNAME_LEN: usize = 65;
/// Maximum length of a tag name, in characters.
pub const MAX_TAG_LEN: usize = 65;

/// A stored chirp together with every tag attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chirp {
    pub id: i32,
    pub message: String,
    pub tags: Vec<String>,
    pub author: String,
}

/// A chirp submission.
///
/// `tags` is kept in submission order and may contain duplicates; the
/// author and every tag are created on first use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewChirp {
    pub message: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub author: String,
}

impl NewChirp {
    pub fn new(
        message: impl Into<String>,
        author: impl Into<String>,
        tags: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            message: message.into(),
            tags: tags.into_iter().map(Into::into).collect(),
            author: author.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_chirp_tags_default_to_empty() {
        let chirp: NewChirp =
            serde_json::from_str(r#"{"message": "hi", "author": "alice"}"#).unwrap();
        assert_eq!(chirp, NewChirp::new("hi", "alice", Vec::<String>::new()));
    }

    #[test]
    fn new_chirp_requires_message_and_author() {
        assert!(serde_json::from_str::<NewChirp>(r#"{"message": "hi"}"#).is_err());
        assert!(serde_json::from_str::<NewChirp>(r#"{"author": "alice"}"#).is_err());
    }

    #[test]
    fn chirp_serializes_with_wire_field_names() {
        let chirp = Chirp {
            id: 7,
            message: "hello".to_string(),
            tags: vec!["tag1".to_string()],
            author: "alice".to_string(),
        };
        let value = serde_json::to_value(&chirp).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"id": 7, "message": "hello", "tags": ["tag1"], "author": "alice"})
        );
    }
}
