mod error;
mod frontmatter;
mod validate;

pub use error::CodecError;
pub use frontmatter::{parse_card_file, serialize_card_file, CardFile, CardFrontMatter};
pub use validate::{
    validate_fields, CardFields, MAX_BODY_CHARS, MAX_FILE_CHARS, MAX_LIST_ITEMS, MAX_NAME_CHARS,
    MAX_RELATION_TARGET_CHARS, MAX_SUMMARY_CHARS, MAX_SYMBOL_CHARS,
};
