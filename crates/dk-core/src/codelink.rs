use serde::{Deserialize, Serialize};

/// A code link as authored in card front matter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeLinkSpec {
    pub kind: String,
    pub file: String,
    pub symbol: String,
}

/// A stored code link row, owned by `card_key`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeLink {
    pub card_key: String,
    pub kind: String,
    pub file: String,
    pub symbol: String,
}

impl CodeLink {
    pub fn spec(&self) -> CodeLinkSpec {
        CodeLinkSpec {
            kind: self.kind.clone(),
            file: self.file.clone(),
            symbol: self.symbol.clone(),
        }
    }
}
