use serde::{Deserialize, Serialize};

/// Lifecycle status of a design card.
///
/// The enum is fixed; transitions are not constrained by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    #[default]
    Draft,
    Accepted,
    Implementing,
    Implemented,
    Deprecated,
}

impl CardStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Accepted => "accepted",
            Self::Implementing => "implementing",
            Self::Implemented => "implemented",
            Self::Deprecated => "deprecated",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "accepted" => Some(Self::Accepted),
            "implementing" => Some(Self::Implementing),
            "implemented" => Some(Self::Implemented),
            "deprecated" => Some(Self::Deprecated),
            _ => None,
        }
    }
}

/// A card row as stored in the index.
///
/// `file_path` is unique by construction; `updated_at` is an RFC 3339 UTC
/// timestamp. `constraints` is an opaque JSON payload the engine never
/// inspects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub key: String,
    pub summary: String,
    pub status: CardStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraints: Option<serde_json::Value>,
    pub body: String,
    pub file_path: String,
    pub updated_at: String,
}
