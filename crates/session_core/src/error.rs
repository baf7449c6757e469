use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("catalog session event queue is full; retry the action")]
    QueueFull,
    #[error("catalog session has shut down")]
    Closed,
}
