use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceType {
    #[default]
    #[serde(rename = "reference")]
    Reference,
}

/// Link from one document to another by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "_type", default)]
    kind: ReferenceType,
    #[serde(rename = "_ref")]
    pub id: String,
}

impl Reference {
    pub fn to(id: impl Into<String>) -> Self {
        Self {
            kind: ReferenceType::Reference,
            id: id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slug {
    #[serde(rename = "_type", default = "slug_type")]
    kind: String,
    pub current: String,
}

fn slug_type() -> String {
    "slug".to_string()
}

impl Slug {
    pub fn new(current: impl Into<String>) -> Self {
        Self {
            kind: slug_type(),
            current: current.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(rename = "_type", default = "image_type")]
    kind: String,
    pub asset: Reference,
}

fn image_type() -> String {
    "image".to_string()
}

impl ImageRef {
    pub fn asset(asset_id: impl Into<String>) -> Self {
        Self {
            kind: image_type(),
            asset: Reference::to(asset_id),
        }
    }
}

/// Rich-text block as stored in post bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "_type", default = "block_type")]
    kind: String,
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(default = "normal_style")]
    pub style: String,
    #[serde(default)]
    pub children: Vec<Span>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    #[serde(rename = "_type", default = "span_type")]
    kind: String,
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(default)]
    pub text: String,
}

fn block_type() -> String {
    "block".to_string()
}

fn span_type() -> String {
    "span".to_string()
}

fn normal_style() -> String {
    "normal".to_string()
}

fn new_key() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_string()
}

impl Block {
    /// A paragraph holding a single span of text.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            kind: block_type(),
            key: new_key(),
            style: normal_style(),
            children: vec![Span {
                kind: span_type(),
                key: new_key(),
                text: text.into(),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reference_carries_type_tag() {
        assert_eq!(
            serde_json::to_value(Reference::to("post-1")).unwrap(),
            json!({"_type": "reference", "_ref": "post-1"})
        );
    }

    #[test]
    fn reference_without_type_still_decodes() {
        let reference: Reference = serde_json::from_value(json!({"_ref": "user_1"})).unwrap();
        assert_eq!(reference, Reference::to("user_1"));
    }

    #[test]
    fn paragraph_is_a_single_span_block() {
        let stored = serde_json::to_value(Block::paragraph("first")).unwrap();
        assert_eq!(stored["_type"], "block");
        assert_eq!(stored["children"][0]["_type"], "span");
        assert_eq!(stored["children"][0]["text"], "first");
    }

    #[test]
    fn image_points_at_asset() {
        assert_eq!(
            serde_json::to_value(ImageRef::asset("image-abc-200x200-png")).unwrap(),
            json!({
                "_type": "image",
                "asset": {"_type": "reference", "_ref": "image-abc-200x200-png"}
            })
        );
    }
}
