use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompilerError {
    #[error("compiler executable not found for variant `{variant}` (set {env_var} or install it on PATH)")]
    ExecutableNotAvailable { variant: &'static str, env_var: &'static str },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Process(#[from] proc::ProcessError),
}
