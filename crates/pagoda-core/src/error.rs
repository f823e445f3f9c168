use thiserror::Error;

/// Failure taxonomy of the layout/navigation subsystem. None of these abort
/// a frame: per-frame code recovers (zero size, clamped value, no-op) and
/// logs, while command-level seams surface the variant to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("expected {0} node is absent")]
    MissingNode(&'static str),
    #[error("constraint dimension is negative or not finite")]
    InvalidConstraint,
    #[error("collapse range is empty; ratio treated as zero")]
    DegenerateRatio,
    #[error("navigation stack is empty")]
    StackUnderflow,
}
