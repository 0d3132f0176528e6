use crate::model::PieceId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerateError {
    #[error("piece count must be positive")]
    InvalidPieceCount,
    #[error("image has no area: {width}x{height}")]
    EmptyImage { width: u32, height: u32 },
    #[error("canvas has no area: {width}x{height}")]
    EmptyCanvas { width: f32, height: f32 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PartitionError {
    #[error("group {0} is empty")]
    EmptyGroup(usize),
    #[error("piece {0} is not in any group")]
    MissingPiece(PieceId),
    #[error("piece {0} is in more than one group")]
    DuplicatePiece(PieceId),
    #[error("piece {piece} is out of range for {total} pieces")]
    UnknownPiece { piece: PieceId, total: usize },
    #[error("piece {0} points at a group that does not list it")]
    DanglingPiece(PieceId),
}

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("save data is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("binary save could not be encoded")]
    Encode,
    #[error("binary save could not be decoded")]
    Decode,
    #[error("save data is corrupt: {0}")]
    Corrupt(String),
    #[error("restored image is unusable: {0}")]
    Image(#[from] GenerateError),
}

impl From<PartitionError> for PersistError {
    fn from(err: PartitionError) -> Self {
        PersistError::Corrupt(err.to_string())
    }
}
