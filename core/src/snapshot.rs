use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::config::Rules;
use crate::error::{GenerateError, PersistError};
use crate::generator::PuzzleLayout;
use crate::grid::{neighbor_id, GridChoice, DIR_DOWN, DIR_RIGHT};
use crate::groups::GroupTracker;
use crate::model::{Piece, PieceId, PuzzleImage, Rect};
use crate::session::PuzzleSession;

pub const SAVE_VERSION: u32 = 1;

/// Plain-data form of a session, as written to storage.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    rkyv::Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct SavedSession {
    #[serde(default)]
    pub version: u32,
    pub pieces: Vec<Piece>,
    /// Member lists in draw order, bottom first.
    pub groups: Vec<Vec<PieceId>>,
    pub board_rect: Rect,
    pub rows: u32,
    pub cols: u32,
    pub piece_width: f32,
    pub piece_height: f32,
    pub canvas_scale: f32,
    pub target_piece_count: u32,
    /// Whole seconds played.
    pub elapsed_time: u64,
    #[serde(default)]
    pub image_src: Option<String>,
    #[serde(default)]
    pub original_width: u32,
    #[serde(default)]
    pub original_height: u32,
}

impl SavedSession {
    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, PersistError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, PersistError> {
        codec::encode(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PersistError> {
        codec::decode(bytes)
    }

    fn validate(&self) -> Result<GroupTracker, PersistError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(PersistError::Corrupt(format!(
                "grid {}x{} is empty",
                self.cols, self.rows
            )));
        }
        let expected = self
            .rows
            .checked_mul(self.cols)
            .and_then(|count| usize::try_from(count).ok());
        if expected != Some(self.pieces.len()) {
            return Err(PersistError::Corrupt(format!(
                "{} pieces saved for a {}x{} grid",
                self.pieces.len(),
                self.cols,
                self.rows
            )));
        }
        let total = self.pieces.len();
        let grid = GridChoice::from_dims(self.target_piece_count, self.rows, self.cols);
        let board = self.board_rect;
        let finite = [board.x, board.y, board.w, board.h]
            .iter()
            .all(|value| value.is_finite());
        if !(finite && board.w > 0.0 && board.h > 0.0) {
            return Err(PersistError::Corrupt("board rect has no area".to_string()));
        }
        let cols = self.cols as usize;
        let rows = self.rows as usize;
        for (index, piece) in self.pieces.iter().enumerate() {
            if piece.id != index || (piece.row, piece.col) != grid.cell_of(index) {
                return Err(PersistError::Corrupt(format!(
                    "piece at index {index} claims id {} at ({}, {})",
                    piece.id, piece.row, piece.col
                )));
            }
            if !(piece.x.is_finite() && piece.y.is_finite()) {
                return Err(PersistError::Corrupt(format!("piece {index} has no position")));
            }
            let edges = piece.edges;
            let border_ok = (piece.row == 0) == edges.top.is_flat()
                && (piece.col == 0) == edges.left.is_flat()
                && (piece.row + 1 == self.rows) == edges.bottom.is_flat()
                && (piece.col + 1 == self.cols) == edges.right.is_flat();
            let right_ok = neighbor_id(index, cols, rows, DIR_RIGHT)
                .map_or(true, |other| self.pieces[other].edges.left == edges.right.opposite());
            let down_ok = neighbor_id(index, cols, rows, DIR_DOWN)
                .map_or(true, |other| self.pieces[other].edges.top == edges.bottom.opposite());
            if !(border_ok && right_ok && down_ok) {
                return Err(PersistError::Corrupt(format!(
                    "piece {index} edges do not fit its neighbours"
                )));
            }
        }
        Ok(GroupTracker::from_lists(&self.groups, total)?)
    }
}

impl PuzzleSession {
    pub fn to_saved(&self) -> SavedSession {
        SavedSession {
            version: SAVE_VERSION,
            pieces: self.pieces.clone(),
            groups: self.groups.to_lists(),
            board_rect: self.layout.board,
            rows: self.layout.grid.rows,
            cols: self.layout.grid.cols,
            piece_width: self.layout.piece_width,
            piece_height: self.layout.piece_height,
            canvas_scale: self.layout.scale,
            target_piece_count: self.target_count,
            elapsed_time: self.stopwatch.elapsed().as_secs(),
            image_src: self.image.source.clone(),
            original_width: self.image.width,
            original_height: self.image.height,
        }
    }

    /// Rebuilds a session from a save. Cell size and scale come from the image actually
    /// supplied, which may differ from the one the save was made with.
    pub fn restore(
        saved: &SavedSession,
        mut image: PuzzleImage,
        canvas: (f32, f32),
        rules: Rules,
    ) -> Result<Self, PersistError> {
        if image.width == 0 || image.height == 0 {
            return Err(GenerateError::EmptyImage {
                width: image.width,
                height: image.height,
            }
            .into());
        }
        if !(canvas.0 > 0.0 && canvas.1 > 0.0) {
            return Err(GenerateError::EmptyCanvas {
                width: canvas.0,
                height: canvas.1,
            }
            .into());
        }
        if saved.version > SAVE_VERSION {
            log::warn!(
                "save version {} is newer than {}; reading what is known",
                saved.version,
                SAVE_VERSION
            );
        }
        let groups = saved.validate()?;
        if saved.original_width != 0
            && (saved.original_width, saved.original_height) != (image.width, image.height)
        {
            log::warn!(
                "save made with a {}x{} image, restoring with {}x{}",
                saved.original_width,
                saved.original_height,
                image.width,
                image.height
            );
        }
        if image.source.is_none() {
            image.source = saved.image_src.clone();
        }

        let (image_w, image_h) = image.size();
        let piece_width = image_w / saved.cols as f32;
        let piece_height = image_h / saved.rows as f32;
        let layout = PuzzleLayout {
            grid: GridChoice::from_dims(saved.target_piece_count, saved.rows, saved.cols),
            piece_width,
            piece_height,
            scale: saved.board_rect.w / image_w,
            board: saved.board_rect,
            canvas_width: canvas.0,
            canvas_height: canvas.1,
        };
        let mut pieces = saved.pieces.clone();
        for piece in &mut pieces {
            piece.width = piece_width;
            piece.height = piece_height;
        }
        for &group in groups.order() {
            let members = groups.members(group);
            let locked = members.iter().filter(|id| pieces[**id].locked).count();
            if locked != 0 && locked != members.len() {
                log::warn!("group {group} was partly locked; locking all of it");
                for &id in members {
                    pieces[id].locked = true;
                }
            }
        }

        let mut session = PuzzleSession::from_parts(
            rules.sanitized(),
            image,
            saved.target_piece_count,
            layout,
            pieces,
            groups,
            StdRng::from_os_rng(),
        );
        session
            .stopwatch
            .resume_from(Duration::from_secs(saved.elapsed_time));
        if session.pieces.iter().all(|piece| piece.locked) {
            session.completion.mark_complete();
            session.stopwatch.stop();
        }
        log::debug!(
            "restored {} pieces in {} groups, {}s played",
            session.pieces.len(),
            session.groups.group_count(),
            saved.elapsed_time
        );
        Ok(session)
    }
}
