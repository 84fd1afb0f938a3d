use serde::{Deserialize, Serialize};

use dk_core::{CardStatus, CodeLinkSpec, RelationSpec};

use crate::error::CodecError;

/// YAML front matter of a card file.
///
/// `key`, `summary`, and `status` are required; the optional fields are
/// omitted from the serialized form when absent. `constraints` is an opaque
/// payload carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardFrontMatter {
    pub key: String,
    pub summary: String,
    pub status: CardStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relations: Option<Vec<RelationSpec>>,
    #[serde(rename = "codeLinks", default, skip_serializing_if = "Option::is_none")]
    pub code_links: Option<Vec<CodeLinkSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<serde_json::Value>,
}

/// A card file: front matter plus Markdown body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardFile {
    pub frontmatter: CardFrontMatter,
    pub body: String,
}

/// Parse a card file of the form `---\n<yaml>\n---\n<body>`.
///
/// Missing delimiters, invalid YAML, duplicate fields, and unknown status
/// values all surface as [`CodecError`].
pub fn parse_card_file(text: &str) -> Result<CardFile, CodecError> {
    let rest = text
        .strip_prefix("---\n")
        .ok_or(CodecError::MissingFrontMatter)?;
    let (yaml, body) = split_front_matter(rest)?;
    let frontmatter: CardFrontMatter = serde_yaml::from_str(yaml)?;
    Ok(CardFile {
        frontmatter,
        body: body.to_string(),
    })
}

/// Serialize a card file back to its on-disk form.
pub fn serialize_card_file(card: &CardFile) -> Result<String, CodecError> {
    let yaml = serde_yaml::to_string(&card.frontmatter)?;
    Ok(format!("---\n{yaml}---\n{}", card.body))
}

fn split_front_matter(rest: &str) -> Result<(&str, &str), CodecError> {
    // Closing delimiter is the first `---` on its own line; a delimiter at
    // end-of-file means an empty body.
    if let Some(idx) = rest.find("\n---\n") {
        Ok((&rest[..idx + 1], &rest[idx + 5..]))
    } else if let Some(yaml) = rest.strip_suffix("\n---") {
        Ok((yaml, ""))
    } else {
        Err(CodecError::MissingFrontMatter)
    }
}
