//! The draft content that is sent out for suggestions.

use serde::{Deserialize, Serialize};

/// A draft article, as posted to the Suggestions Umbrella.
///
/// The field names are part of the contract with the Umbrella and are
/// serialized exactly as `uuid`, `body`, `title` and `byline`. None of the
/// values are validated locally.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Content {
    /// Identifier of the draft, usually in canonical UUID form.
    pub uuid: String,

    /// The article markup.
    pub body: String,

    /// The headline.
    pub title: String,

    /// The author line.
    pub byline: String,
}

impl Content {
    /// A content record with only an identifier set.
    pub fn with_uuid<S: Into<String>>(uuid: S) -> Self {
        Self {
            uuid: uuid.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Content;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn serializes_with_lowercase_field_names() {
        let content = Content {
            uuid: "9d5e441e-0b02-11e8-8eb7-42f857ea9f09".to_string(),
            body: "<body><p>US stocks see-sawed</p></body>".to_string(),
            title: "Wall Street stocks".to_string(),
            byline: "Eric Platt in New York".to_string(),
        };

        assert_eq!(
            serde_json::to_value(&content).expect("serializable"),
            json!({
                "uuid": "9d5e441e-0b02-11e8-8eb7-42f857ea9f09",
                "body": "<body><p>US stocks see-sawed</p></body>",
                "title": "Wall Street stocks",
                "byline": "Eric Platt in New York",
            })
        );
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let content: Content =
            serde_json::from_value(json!({ "title": "Wall Street stocks" })).expect("valid");

        assert_eq!(content, Content {
            title: "Wall Street stocks".to_string(),
            ..Content::default()
        });
    }
}
