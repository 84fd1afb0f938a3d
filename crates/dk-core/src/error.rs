/// A slug or full key that violates the card key syntax.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid card key {input:?}: {reason}")]
pub struct InvalidKeyError {
    pub input: String,
    pub reason: &'static str,
}

impl InvalidKeyError {
    pub(crate) fn new(input: impl Into<String>, reason: &'static str) -> Self {
        Self {
            input: input.into(),
            reason,
        }
    }
}
