use super::ShaderKind;

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Unrecoverable for this context (commonly OOM). The context is marked
    /// lost and recovery goes through the loss/restore cycle.
    Fatal,
}

/// Shader or program construction rejected by the driver.
///
/// Both variants carry the diagnostic text reported by wgpu/naga.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error("{kind} shader failed to compile:\n{log}")]
    Compile { kind: ShaderKind, log: String },

    #[error("program failed to link:\n{log}")]
    Link { log: String },
}

impl BuildError {
    /// Driver diagnostic log.
    pub fn log(&self) -> &str {
        match self {
            BuildError::Compile { log, .. } | BuildError::Link { log } => log,
        }
    }
}

/// Turns a captured build failure into a result.
///
/// On a lost context the failure is expected and says nothing about the
/// shader source, so it is logged and swallowed; the caller gets back a handle
/// that may be unusable until the context is restored and setup runs again.
pub(crate) fn check_build(failure: Option<BuildError>, context_lost: bool) -> Result<(), BuildError> {
    match failure {
        None => Ok(()),
        Some(err) if context_lost => {
            log::warn!("ignoring build failure on lost context: {err}");
            Ok(())
        }
        Some(err) => Err(err),
    }
}
