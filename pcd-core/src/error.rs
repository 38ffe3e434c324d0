use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("sample_num must be positive, got {0}")]
    NonPositiveSampleNum(i64),
    #[error("sample_num {0} exceeds the addressable point count")]
    SampleNumOutOfRange(i64),
}
