use crate::attributes::Attribute;

#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("missing required field: inclusion criteria do not state any accepted {attribute} values")]
    MissingRequiredField { attribute: Attribute },
    #[error("failed to read trial file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to serialize YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
    #[error("translation error: {0}")]
    Translation(String),
    #[error(transparent)]
    Types(#[from] ctm_types::TypesError),
}

pub type MatchResult<T> = std::result::Result<T, MatchError>;
