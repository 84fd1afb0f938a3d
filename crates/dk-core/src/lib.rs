mod card;
mod codelink;
mod error;
mod key;
mod relation;

pub use card::{Card, CardStatus};
pub use codelink::{CodeLink, CodeLinkSpec};
pub use error::InvalidKeyError;
pub use key::{card_file_path, key_from_file_path, normalize_slug, parse_full_key, CARD_FILE_SUFFIX};
pub use relation::{CardRelation, RelationSpec};
