/// Card file validation errors: malformed front matter or field limits.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("card file is missing front matter delimiters")]
    MissingFrontMatter,

    #[error("invalid front matter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{field} exceeds {max} characters (got {actual})")]
    FieldTooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("{field} exceeds {max} items (got {actual})")]
    TooManyItems {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}
