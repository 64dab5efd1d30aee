use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Could not determine the configuration directory")]
    NoConfigDir,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Not signed in. Run `otasuke login <email>` first")]
    NotSignedIn,

    #[error("A password is required: pass --password or set OTASUKE_PASSWORD")]
    PasswordRequired,

    #[error("Prompt failed: {0}")]
    Prompt(String),
}

pub type Result<T> = anyhow::Result<T>;
