//! Puzzle model and interaction engine: piece shapes, layout, grouping,
//! pointer handling, snapping and completion for an image jigsaw.

pub mod codec;
pub mod completion;
pub mod config;
pub mod controller;
pub mod error;
pub mod frame;
pub mod generator;
pub mod geometry;
pub mod grid;
pub mod groups;
pub mod model;
pub mod render;
pub mod session;
pub mod snap;
pub mod snapshot;
pub mod viewport;

pub use codec::{decode, encode};
pub use completion::{CompletionDetector, CompletionEvent, Stopwatch};
pub use config::Rules;
pub use controller::{
    InputEvent, InputEventKind, InteractionController, InteractionOutcome, InteractionState,
    PointerId,
};
pub use error::{GenerateError, PartitionError, PersistError};
pub use frame::{AssistPulse, Continuation, FrameInfo, FrameScheduler, FrameTask, PulseHandle};
pub use generator::PuzzleLayout;
pub use geometry::{piece_path, PathCommand, PiecePath, Point};
pub use grid::{
    grid_choice_label, grid_for_count, GridChoice, DEFAULT_TARGET_COUNT, DIFFICULTY_PIECE_COUNTS,
};
pub use groups::{GroupId, GroupTracker, MergeResult};
pub use model::{EdgeKind, EdgeSignature, Piece, PieceId, PuzzleImage, Rect};
pub use render::{render, Rgba, Shadow, Surface};
pub use session::PuzzleSession;
pub use snap::{resolve_snaps, SnapOutcome};
pub use snapshot::{SavedSession, SAVE_VERSION};
pub use viewport::Viewport;
