use crate::command::CommandName;

/// Crate-wide result type for inline command resolution.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by a resolution run.
///
/// Parse anomalies and unknown commands are recovered inside the engine and
/// never show up here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A registered handler failed; the whole run is abandoned.
    #[error("inline command handler `{command}` failed: {source}")]
    Handler {
        command: CommandName,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn handler(command: CommandName, source: anyhow::Error) -> Self {
        Self::Handler {
            command,
            source: source.into(),
        }
    }

    /// The command whose handler produced this error.
    pub fn command(&self) -> CommandName {
        match self {
            Self::Handler { command, .. } => *command,
        }
    }
}
