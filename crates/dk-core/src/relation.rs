use serde::{Deserialize, Serialize};

/// A relation as authored in card front matter: a typed edge from the
/// declaring card to `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationSpec {
    #[serde(rename = "type")]
    pub rel_type: String,
    pub target: String,
}

/// A stored relation edge.
///
/// Every forward edge `(type, A, B, is_reverse=false)` is paired with its
/// mirror `(type, B, A, is_reverse=true)`; `(type, src, dst)` is unique
/// across both, which rules out self references and duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRelation {
    #[serde(rename = "type")]
    pub rel_type: String,
    pub src_card_key: String,
    pub dst_card_key: String,
    pub is_reverse: bool,
}

impl CardRelation {
    /// The mirror row implied by a forward edge.
    pub fn mirror(&self) -> CardRelation {
        CardRelation {
            rel_type: self.rel_type.clone(),
            src_card_key: self.dst_card_key.clone(),
            dst_card_key: self.src_card_key.clone(),
            is_reverse: !self.is_reverse,
        }
    }
}
