use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::completion::{CompletionDetector, CompletionEvent, Stopwatch};
use crate::config::Rules;
use crate::error::GenerateError;
use crate::frame::{AssistPulse, FrameInfo, FrameScheduler, PulseHandle, TaskId};
use crate::generator::{build_pieces, generate_edges, plan_layout, scatter, PuzzleLayout};
use crate::geometry::{hit_box, piece_path, PiecePath, Point};
use crate::grid::{grid_choice_label, GridChoice};
use crate::groups::{GroupId, GroupTracker};
use crate::model::{Piece, PieceId, PuzzleImage, Rect};
use crate::viewport::Viewport;

/// All mutable state of one puzzle game.
#[derive(Debug)]
pub struct PuzzleSession {
    pub(crate) rules: Rules,
    pub(crate) image: PuzzleImage,
    pub(crate) target_count: u32,
    pub(crate) layout: PuzzleLayout,
    pub(crate) pieces: Vec<Piece>,
    pub(crate) groups: GroupTracker,
    pub(crate) viewport: Viewport,
    pub(crate) completion: CompletionDetector,
    pub(crate) stopwatch: Stopwatch,
    pub(crate) frames: FrameScheduler,
    pub(crate) pulse: PulseHandle,
    pub(crate) pulse_task: Option<TaskId>,
    pub(crate) show_guide: bool,
    pub(crate) rng: StdRng,
}

impl PuzzleSession {
    pub fn new(
        image: PuzzleImage,
        target_count: u32,
        canvas: (f32, f32),
        rules: Rules,
    ) -> Result<Self, GenerateError> {
        Self::generate(image, target_count, canvas, rules, StdRng::from_os_rng())
    }

    /// Like [`PuzzleSession::new`], with every random choice drawn from `seed`.
    pub fn with_seed(
        image: PuzzleImage,
        target_count: u32,
        canvas: (f32, f32),
        rules: Rules,
        seed: u64,
    ) -> Result<Self, GenerateError> {
        Self::generate(image, target_count, canvas, rules, StdRng::seed_from_u64(seed))
    }

    fn generate(
        image: PuzzleImage,
        target_count: u32,
        canvas: (f32, f32),
        rules: Rules,
        mut rng: StdRng,
    ) -> Result<Self, GenerateError> {
        let rules = rules.sanitized();
        let layout = plan_layout(&image, target_count, canvas, &rules)?;
        let edges = generate_edges(layout.grid.rows, layout.grid.cols, &mut rng);
        let mut pieces = build_pieces(&layout, &edges);
        let groups = GroupTracker::new(pieces.len());
        scatter(&mut pieces, &groups, &layout, &rules, false, &mut rng);
        log::info!(
            "new puzzle: {} from {}x{} image",
            grid_choice_label(&layout.grid),
            image.width,
            image.height
        );
        Ok(Self::from_parts(
            rules,
            image,
            target_count,
            layout,
            pieces,
            groups,
            rng,
        ))
    }

    pub(crate) fn from_parts(
        rules: Rules,
        image: PuzzleImage,
        target_count: u32,
        layout: PuzzleLayout,
        pieces: Vec<Piece>,
        groups: GroupTracker,
        rng: StdRng,
    ) -> Self {
        Self {
            viewport: Viewport::from_rules(&rules),
            rules,
            image,
            target_count,
            layout,
            pieces,
            groups,
            completion: CompletionDetector::new(),
            stopwatch: Stopwatch::started(),
            frames: FrameScheduler::new(),
            pulse: PulseHandle::default(),
            pulse_task: None,
            show_guide: false,
            rng,
        }
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn image(&self) -> &PuzzleImage {
        &self.image
    }

    pub fn target_count(&self) -> u32 {
        self.target_count
    }

    pub fn layout(&self) -> &PuzzleLayout {
        &self.layout
    }

    pub fn grid(&self) -> GridChoice {
        self.layout.grid
    }

    pub fn board(&self) -> Rect {
        self.layout.board
    }

    pub fn scale(&self) -> f32 {
        self.layout.scale
    }

    pub fn canvas_size(&self) -> (f32, f32) {
        (self.layout.canvas_width, self.layout.canvas_height)
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id)
    }

    pub fn groups(&self) -> &GroupTracker {
        &self.groups
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn is_complete(&self) -> bool {
        self.completion.is_complete()
    }

    pub fn locked_count(&self) -> usize {
        self.pieces.iter().filter(|piece| piece.locked).count()
    }

    pub fn elapsed(&self) -> Duration {
        self.stopwatch.elapsed()
    }

    pub fn show_guide(&self) -> bool {
        self.show_guide
    }

    pub fn toggle_guide(&mut self) -> bool {
        self.show_guide = !self.show_guide;
        self.show_guide
    }

    /// Restarts the clock from zero. Completion stays one-shot.
    pub fn restart_timer(&mut self) {
        self.stopwatch.restart();
    }

    /// Records a new canvas size. The board keeps its place; later scatters use the new bounds.
    pub fn resize_canvas(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.layout.canvas_width = width;
            self.layout.canvas_height = height;
        }
    }

    /// Scatters every group again, unlocking everything.
    pub fn reset_all(&mut self) -> usize {
        self.scatter(false)
    }

    /// Scatters only the groups that are not locked to the board.
    pub fn reset_unlocked(&mut self) -> usize {
        self.scatter(true)
    }

    fn scatter(&mut self, keep_locked: bool) -> usize {
        self.frames.clear();
        self.pulse_task = None;
        self.pulse.clear();
        scatter(
            &mut self.pieces,
            &self.groups,
            &self.layout,
            &self.rules,
            keep_locked,
            &mut self.rng,
        )
    }

    pub fn piece_outline(&self, id: PieceId) -> Option<PiecePath> {
        let piece = self.pieces.get(id)?;
        let (cell_w, cell_h) = self.layout.scaled_cell();
        Some(piece_path(piece.x, piece.y, cell_w, cell_h, &piece.edges))
    }

    /// Topmost unlocked piece under a world point.
    pub fn piece_at(&self, world: Point) -> Option<PieceId> {
        let (cell_w, cell_h) = self.layout.scaled_cell();
        let bleed = cell_w * self.rules.hit_bleed_ratio;
        for &group in self.groups.order().iter().rev() {
            for &id in self.groups.members(group).iter().rev() {
                let piece = &self.pieces[id];
                if piece.locked {
                    continue;
                }
                let hit = if self.rules.precise_hit_test {
                    piece_path(piece.x, piece.y, cell_w, cell_h, &piece.edges)
                        .contains(world.0, world.1)
                } else {
                    hit_box(piece.x, piece.y, cell_w, cell_h, bleed).contains(world.0, world.1)
                };
                if hit {
                    return Some(id);
                }
            }
        }
        None
    }

    pub fn group_locked(&self, group: GroupId) -> bool {
        self.groups
            .members(group)
            .iter()
            .any(|id| self.pieces[*id].locked)
    }

    pub(crate) fn lock_group(&mut self, group: GroupId) {
        for &id in self.groups.members(group) {
            self.pieces[id].locked = true;
        }
    }

    pub(crate) fn translate_pieces(&mut self, members: &[PieceId], dx: f32, dy: f32) {
        for &id in members {
            let piece = &mut self.pieces[id];
            piece.x += dx;
            piece.y += dy;
        }
    }

    pub(crate) fn place_from(&mut self, starts: &[(PieceId, Point)], dx: f32, dy: f32) {
        for &(id, (x, y)) in starts {
            let piece = &mut self.pieces[id];
            piece.x = x + dx;
            piece.y = y + dy;
        }
    }

    /// Runs the completion detector; returns the event on the first full lock.
    pub fn check_completion(&mut self) -> Option<CompletionEvent> {
        if !self.completion.check(&self.pieces) {
            return None;
        }
        self.stopwatch.stop();
        let event = CompletionEvent {
            elapsed_seconds: self.stopwatch.elapsed().as_secs(),
            difficulty: self.target_count,
        };
        log::info!(
            "puzzle complete: {} pieces in {}s",
            self.pieces.len(),
            event.elapsed_seconds
        );
        Some(event)
    }

    pub(crate) fn start_assist_pulse(&mut self) {
        if let Some(task) = self.pulse_task.take() {
            self.frames.cancel(task);
        }
        let task = self.frames.schedule(AssistPulse::new(self.pulse.clone()));
        self.pulse_task = Some(task);
    }

    pub fn assist_intensity(&self) -> f32 {
        self.pulse.intensity()
    }

    /// Advances animation tasks by `dt` seconds. Returns true while more frames are wanted.
    pub fn advance_frame(&mut self, dt: f32, dragging: bool) -> bool {
        let frame = FrameInfo {
            dt,
            dragging,
            complete: self.completion.is_complete(),
        };
        self.frames.tick(&frame);
        if self.frames.is_idle() {
            self.pulse_task = None;
        }
        !self.frames.is_idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> PuzzleSession {
        PuzzleSession::with_seed(
            PuzzleImage::new(400, 300),
            12,
            (1200.0, 900.0),
            Rules::default(),
            21,
        )
        .expect("session")
    }

    #[test]
    fn generation_is_deterministic_per_seed() {
        let a = session();
        let b = session();
        assert_eq!(a.pieces(), b.pieces());
        assert_eq!(a.groups().group_count(), a.pieces().len());
        assert!(a.pieces().iter().all(|piece| !piece.locked));
    }

    #[test]
    fn invalid_inputs_create_no_session() {
        let rules = Rules::default();
        assert!(PuzzleSession::new(PuzzleImage::new(400, 300), 0, (800.0, 600.0), rules).is_err());
        assert!(PuzzleSession::new(PuzzleImage::new(0, 300), 12, (800.0, 600.0), rules).is_err());
        assert!(PuzzleSession::new(PuzzleImage::new(400, 300), 12, (800.0, 0.0), rules).is_err());
    }

    #[test]
    fn locked_pieces_are_transparent_to_hits() {
        let mut session = session();
        let (cell_w, cell_h) = session.layout().scaled_cell();
        session.pieces[0].x = -3000.0;
        session.pieces[0].y = -3000.0;
        let centre = (-3000.0 + cell_w / 2.0, -3000.0 + cell_h / 2.0);
        assert_eq!(session.piece_at(centre), Some(0));
        // Stack piece 1 exactly on piece 0, then lock it.
        session.pieces[1].x = -3000.0;
        session.pieces[1].y = -3000.0;
        session.groups.raise(1);
        assert_eq!(session.piece_at(centre), Some(1));
        session.pieces[1].locked = true;
        assert_eq!(session.piece_at(centre), Some(0));
    }

    #[test]
    fn hit_box_includes_bleed_margin() {
        let mut session = session();
        let (cell_w, _) = session.layout().scaled_cell();
        session.pieces[0].x = -3000.0;
        session.pieces[0].y = -3000.0;
        let just_outside = (-3000.0 - cell_w * 0.1, -3000.0);
        let too_far = (-3000.0 - cell_w * 0.3, -3000.0);
        assert_eq!(session.piece_at(just_outside), Some(0));
        assert_ne!(session.piece_at(too_far), Some(0));
    }

    #[test]
    fn precise_mode_follows_the_outline() {
        let rules = Rules {
            precise_hit_test: true,
            ..Rules::default()
        };
        let mut session = PuzzleSession::with_seed(
            PuzzleImage::new(400, 300),
            12,
            (1200.0, 900.0),
            rules,
            21,
        )
        .expect("session");
        session.pieces[0].x = -5000.0;
        session.pieces[0].y = -5000.0;
        let (cell_w, _) = session.layout().scaled_cell();
        // Top-left corner is always flat, so just outside it misses in precise mode.
        let corner_outside = (-5000.0 - cell_w * 0.05, -5000.0 + 1.0);
        assert_eq!(session.piece_at(corner_outside), None);
        assert_eq!(session.piece_at((-5000.0 + 2.0, -5000.0 + 2.0)), Some(0));
    }

    #[test]
    fn reset_unlocked_keeps_locked_groups() {
        let mut session = session();
        session.lock_group(session.groups.group_of(4));
        let held = session.pieces[4].clone();
        let moved = session.reset_unlocked();
        assert_eq!(moved, session.pieces().len() - 1);
        assert_eq!(session.pieces[4], held);
        session.reset_all();
        assert_eq!(session.locked_count(), 0);
    }

    #[test]
    fn guide_toggle_and_canvas_resize() {
        let mut session = session();
        assert!(!session.show_guide());
        assert!(session.toggle_guide());
        let board = session.board();
        session.resize_canvas(1600.0, 1000.0);
        assert_eq!(session.canvas_size(), (1600.0, 1000.0));
        assert_eq!(session.board(), board);
        session.resize_canvas(0.0, 100.0);
        assert_eq!(session.canvas_size(), (1600.0, 1000.0));
    }

    #[test]
    fn pulse_task_ends_with_the_drag() {
        let mut session = session();
        session.start_assist_pulse();
        session.start_assist_pulse();
        assert_eq!(session.frames.len(), 1);
        assert!(session.advance_frame(0.3, true));
        assert!(session.assist_intensity() > 0.0);
        assert!(!session.advance_frame(0.016, false));
        assert_eq!(session.assist_intensity(), 0.0);
    }

    #[test]
    fn reset_stops_running_animations() {
        let mut session = session();
        session.start_assist_pulse();
        assert!(session.advance_frame(0.3, true));
        assert!(session.assist_intensity() > 0.0);
        session.reset_all();
        assert!(session.frames.is_idle());
        assert!(session.pulse_task.is_none());
        assert_eq!(session.assist_intensity(), 0.0);
        assert!(!session.advance_frame(0.016, true));
    }
}
