//! Error taxonomy shared by composition and rendering.
//!
//! Composition errors are raised eagerly, before any render resource exists.
//! Render errors always travel back through the session guard, so every
//! variant below is safe to return from any point of a render.

use thiserror::Error;

/// Which phase of a render produced a [`Error::RenderFailure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    Loading,
    Scheduling,
    Recording,
    Output,
}

impl std::fmt::Display for RenderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RenderStage::Loading => "loading",
            RenderStage::Scheduling => "scheduling",
            RenderStage::Recording => "recording",
            RenderStage::Output => "output",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// A parameter lies outside its defined domain. Fatal.
    #[error("invalid parameter `{field}`: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    /// The catalog has no group with this name. Recoverable: the layer is
    /// dropped and composition continues.
    #[error("sample group `{group}` is not in the catalog")]
    MissingSampleGroup { group: String },

    /// Resource loading, synthesis, or output failed.
    #[error("render failed while {stage}: {source}")]
    RenderFailure {
        stage: RenderStage,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("render cancelled")]
    Cancelled,

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn render<E>(stage: RenderStage, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Error::RenderFailure {
            stage,
            source: source.into(),
        }
    }

    /// True for errors that abort composition. `MissingSampleGroup` is the
    /// only variant composition recovers from.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::MissingSampleGroup { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
