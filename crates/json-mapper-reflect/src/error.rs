use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReflectError {
    #[error("Invalid type declaration '{declaration}': {reason}")]
    InvalidTypeDeclaration {
        declaration: String,
        reason: &'static str,
    },

    #[error("Invalid metadata document: {0}")]
    InvalidMetadata(String),
}
