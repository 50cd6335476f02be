use thiserror::Error;
use tonic::Status;

/// The error kinds the core distinguishes. Everything else (cannot
/// bind socket, cannot allocate) is a local resource failure and is
/// not represented here — it aborts the process directly.
#[derive(Error, Debug)]
pub enum ChordError {
    #[error("peer unreachable: {0}")]
    PeerUnreachable(String),

    #[error("key not found")]
    NotFound,

    #[error("not a member of replica group led by {0}")]
    Membership(String),

    #[error("duplicate coordinator message for leader {0}")]
    Duplicate(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type ChordResult<T> = Result<T, ChordError>;

impl From<ChordError> for Status {
    fn from(err: ChordError) -> Self {
        match err {
            ChordError::PeerUnreachable(msg) => Status::unavailable(msg),
            ChordError::NotFound => Status::not_found("key does not exist in datastore"),
            ChordError::Membership(msg) => Status::failed_precondition(msg),
            ChordError::Duplicate(msg) => Status::failed_precondition(msg),
            ChordError::Config(msg) => Status::invalid_argument(msg),
        }
    }
}

impl ChordError {
    /// Recovers an application-level `ChordError` from a `Status` a
    /// peer sent back deliberately (not a transport failure). The
    /// specific membership/duplicate distinction doesn't survive the
    /// wire, so both collapse to `Membership` — callers that reach
    /// this only do so on the best-effort coordinator/replica paths,
    /// which treat any non-transport failure as "nothing to do".
    pub fn from_status(status: &Status) -> Self {
        match status.code() {
            tonic::Code::NotFound => ChordError::NotFound,
            tonic::Code::InvalidArgument => ChordError::Config(status.message().to_string()),
            _ => ChordError::Membership(status.message().to_string()),
        }
    }
}

/// Classifies a `tonic::Status` coming back from a peer as a
/// transport-level failure vs. a deliberate application-level
/// response (membership/duplicate rejections). Only the former
/// should evict the pooled connection.
pub fn is_transport_failure(status: &Status) -> bool {
    !matches!(
        status.code(),
        tonic::Code::FailedPrecondition | tonic::Code::NotFound | tonic::Code::InvalidArgument
    )
}
