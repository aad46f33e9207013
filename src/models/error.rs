pub type Result<T> = std::result::Result<T, GridError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    OutOfRange { index: usize, len: usize },
    UnknownColumn(String),
    DuplicateColumn(String),
    /// The view is disabled while a task is outstanding.
    Busy,
    /// Task lifecycle actions come from task observers, never from the host.
    LifecycleAction(&'static str),
    FetchFailed(String),
    SubmitFailed(String),
}

impl std::fmt::Display for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridError::OutOfRange { index, len } => {
                write!(f, "Row index {} out of range (rows: {})", index, len)
            }
            GridError::UnknownColumn(name) => write!(f, "Unknown column: {}", name),
            GridError::DuplicateColumn(name) => write!(f, "Duplicate column: {}", name),
            GridError::Busy => write!(f, "Grid is busy"),
            GridError::LifecycleAction(name) => {
                write!(f, "{} is raised by background tasks only", name)
            }
            GridError::FetchFailed(msg) => write!(f, "Fetch failed: {}", msg),
            GridError::SubmitFailed(msg) => write!(f, "Submit failed: {}", msg),
        }
    }
}

impl std::error::Error for GridError {}
