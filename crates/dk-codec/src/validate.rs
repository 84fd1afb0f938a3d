use dk_core::{CodeLinkSpec, RelationSpec};

use crate::error::CodecError;

pub const MAX_SUMMARY_CHARS: usize = 500;
pub const MAX_BODY_CHARS: usize = 100_000;
pub const MAX_LIST_ITEMS: usize = 100;
pub const MAX_NAME_CHARS: usize = 100;
pub const MAX_RELATION_TARGET_CHARS: usize = 200;
pub const MAX_SYMBOL_CHARS: usize = 200;
pub const MAX_FILE_CHARS: usize = 500;

/// Borrowed view of the writable card fields, used to apply the size
/// ceilings uniformly to create and update inputs. Absent fields skip
/// their checks.
#[derive(Debug, Default)]
pub struct CardFields<'a> {
    pub summary: Option<&'a str>,
    pub body: Option<&'a str>,
    pub keywords: Option<&'a [String]>,
    pub tags: Option<&'a [String]>,
    pub relations: Option<&'a [RelationSpec]>,
    pub code_links: Option<&'a [CodeLinkSpec]>,
}

/// Enforce the per-field size ceilings, in field order; the first violation
/// is returned.
pub fn validate_fields(fields: &CardFields<'_>) -> Result<(), CodecError> {
    if let Some(summary) = fields.summary {
        check_chars("summary", summary, MAX_SUMMARY_CHARS)?;
    }
    if let Some(body) = fields.body {
        check_chars("body", body, MAX_BODY_CHARS)?;
    }
    if let Some(keywords) = fields.keywords {
        check_items("keywords", keywords.len())?;
        for name in keywords {
            check_chars("keyword", name, MAX_NAME_CHARS)?;
        }
    }
    if let Some(tags) = fields.tags {
        check_items("tags", tags.len())?;
        for name in tags {
            check_chars("tag", name, MAX_NAME_CHARS)?;
        }
    }
    if let Some(relations) = fields.relations {
        check_items("relations", relations.len())?;
        for rel in relations {
            check_chars("relation target", &rel.target, MAX_RELATION_TARGET_CHARS)?;
        }
    }
    if let Some(links) = fields.code_links {
        check_items("codeLinks", links.len())?;
        for link in links {
            check_chars("code link symbol", &link.symbol, MAX_SYMBOL_CHARS)?;
            check_chars("code link file", &link.file, MAX_FILE_CHARS)?;
        }
    }
    Ok(())
}

fn check_chars(field: &'static str, value: &str, max: usize) -> Result<(), CodecError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(CodecError::FieldTooLong { field, max, actual });
    }
    Ok(())
}

fn check_items(field: &'static str, actual: usize) -> Result<(), CodecError> {
    if actual > MAX_LIST_ITEMS {
        return Err(CodecError::TooManyItems {
            field,
            max: MAX_LIST_ITEMS,
            actual,
        });
    }
    Ok(())
}
