use thiserror::Error;

/// Daemon-level errors with process exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration: {0}")]
    Figment(#[from] figment::Error),

    #[error("configuration: {0} is not set (flag, config file, or KWL_ env)")]
    Missing(&'static str),

    #[error(transparent)]
    Core(#[from] kwlbridge_core::CoreError),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Figment(_) | Self::Missing(_) => 2,
            Self::Core(_) => 1,
        }
    }
}
