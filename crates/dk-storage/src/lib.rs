mod card;
mod classification;
mod codelink;
mod error;
mod relation;
mod store;

pub use card::{CardFilter, CardRepo};
pub use classification::ClassificationRepo;
pub use codelink::CodeLinkRepo;
pub use error::StorageError;
pub use relation::RelationRepo;
pub use store::Store;
