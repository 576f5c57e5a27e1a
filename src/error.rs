use std::path::PathBuf;

/// Error type for loading and validating a [`GameConfig`](crate::config::GameConfig)
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        ConfigError::ParseError(e)
    }
}

impl From<ron::Error> for ConfigError {
    fn from(e: ron::Error) -> Self {
        ConfigError::SerializeError(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {}", e),
            ConfigError::Invalid(e) => write!(f, "Invalid config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Raised while preloading textures. Any of these is fatal for the scene.
#[derive(Debug)]
pub enum AssetError {
    Missing { key: String, path: PathBuf },
    Load { key: String, path: PathBuf, reason: String },
    Duplicate(String),
}

impl std::fmt::Display for AssetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetError::Missing { key, path } => {
                write!(f, "asset '{}' not found at {}", key, path.display())
            }
            AssetError::Load { key, path, reason } => {
                write!(f, "failed to load '{}' from {}: {}", key, path.display(), reason)
            }
            AssetError::Duplicate(key) => write!(f, "asset key '{}' registered twice", key),
        }
    }
}

impl std::error::Error for AssetError {}
