use crate::completion::CompletionEvent;
use crate::geometry::Point;
use crate::groups::GroupId;
use crate::model::PieceId;
use crate::session::PuzzleSession;
use crate::snap::{resolve_snaps, SnapOutcome};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PointerId(pub i32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEventKind {
    Down,
    Move,
    Up,
    /// Pointer capture was lost.
    Cancel,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputEvent {
    pub kind: InputEventKind,
    pub pointer: PointerId,
    pub screen_x: f32,
    pub screen_y: f32,
}

impl InputEvent {
    pub fn new(kind: InputEventKind, pointer: PointerId, screen_x: f32, screen_y: f32) -> Self {
        Self {
            kind,
            pointer,
            screen_x,
            screen_y,
        }
    }

    pub fn down(pointer: PointerId, screen_x: f32, screen_y: f32) -> Self {
        Self::new(InputEventKind::Down, pointer, screen_x, screen_y)
    }

    pub fn moved(pointer: PointerId, screen_x: f32, screen_y: f32) -> Self {
        Self::new(InputEventKind::Move, pointer, screen_x, screen_y)
    }

    pub fn up(pointer: PointerId, screen_x: f32, screen_y: f32) -> Self {
        Self::new(InputEventKind::Up, pointer, screen_x, screen_y)
    }

    pub fn cancel(pointer: PointerId) -> Self {
        Self::new(InputEventKind::Cancel, pointer, 0.0, 0.0)
    }

    pub fn screen(&self) -> Point {
        (self.screen_x, self.screen_y)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DragState {
    pub pointer: PointerId,
    pub group: GroupId,
    /// Piece that was under the pointer on pickup.
    pub piece: PieceId,
    pub anchor: Point,
    pub starts: Vec<(PieceId, Point)>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PanState {
    pub pointer: PointerId,
    pub anchor: Point,
    pub start_offset: Point,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum InteractionState {
    #[default]
    Idle,
    Dragging(DragState),
    Panning(PanState),
}

#[derive(Clone, Debug, PartialEq)]
pub enum InteractionOutcome {
    Ignored,
    DragStarted { group: GroupId, piece: PieceId },
    Dragged,
    Released {
        snap: SnapOutcome,
        completion: Option<CompletionEvent>,
    },
    PanStarted,
    Panned,
    PanEnded,
    Cancelled,
}

impl InteractionOutcome {
    pub fn completion(&self) -> Option<CompletionEvent> {
        match self {
            InteractionOutcome::Released { completion, .. } => *completion,
            _ => None,
        }
    }
}

/// Pointer state machine: picks up groups, drags them, pans the view and
/// settles groups on release.
#[derive(Clone, Debug, Default)]
pub struct InteractionController {
    state: InteractionState,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == InteractionState::Idle
    }

    pub fn dragging_group(&self) -> Option<GroupId> {
        match &self.state {
            InteractionState::Dragging(drag) => Some(drag.group),
            _ => None,
        }
    }

    pub fn handle(&mut self, session: &mut PuzzleSession, event: InputEvent) -> InteractionOutcome {
        match event.kind {
            InputEventKind::Down => self.pointer_down(session, event.pointer, event.screen()),
            InputEventKind::Move => self.pointer_move(session, event.pointer, event.screen()),
            InputEventKind::Up => self.pointer_up(session, event.pointer),
            InputEventKind::Cancel => self.cancel(event.pointer),
        }
    }

    pub fn pointer_down(
        &mut self,
        session: &mut PuzzleSession,
        pointer: PointerId,
        screen: Point,
    ) -> InteractionOutcome {
        if !self.is_idle() {
            return InteractionOutcome::Ignored;
        }
        let world = session.viewport.screen_to_world(screen);
        if let Some(piece) = session.piece_at(world) {
            let group = session.groups.group_of(piece);
            let starts = session
                .groups
                .members(group)
                .iter()
                .map(|id| {
                    let member = &session.pieces[*id];
                    (*id, (member.x, member.y))
                })
                .collect();
            session.groups.raise(group);
            session.start_assist_pulse();
            self.state = InteractionState::Dragging(DragState {
                pointer,
                group,
                piece,
                anchor: screen,
                starts,
            });
            log::debug!("picked up group {group} at piece {piece}");
            return InteractionOutcome::DragStarted { group, piece };
        }
        if !session.viewport.is_identity() {
            self.state = InteractionState::Panning(PanState {
                pointer,
                anchor: screen,
                start_offset: session.viewport.offset(),
            });
            return InteractionOutcome::PanStarted;
        }
        InteractionOutcome::Ignored
    }

    pub fn pointer_move(
        &mut self,
        session: &mut PuzzleSession,
        pointer: PointerId,
        screen: Point,
    ) -> InteractionOutcome {
        match &self.state {
            InteractionState::Dragging(drag) if drag.pointer == pointer => {
                let zoom = session.viewport.zoom();
                let dx = (screen.0 - drag.anchor.0) / zoom;
                let dy = (screen.1 - drag.anchor.1) / zoom;
                session.place_from(&drag.starts, dx, dy);
                InteractionOutcome::Dragged
            }
            InteractionState::Panning(pan) if pan.pointer == pointer => {
                session.viewport.set_offset((
                    pan.start_offset.0 + screen.0 - pan.anchor.0,
                    pan.start_offset.1 + screen.1 - pan.anchor.1,
                ));
                InteractionOutcome::Panned
            }
            _ => InteractionOutcome::Ignored,
        }
    }

    pub fn pointer_up(
        &mut self,
        session: &mut PuzzleSession,
        pointer: PointerId,
    ) -> InteractionOutcome {
        match std::mem::take(&mut self.state) {
            InteractionState::Dragging(drag) if drag.pointer == pointer => {
                let snap = resolve_snaps(session, drag.group);
                log::debug!("released group {} as group {}", drag.group, snap.group);
                let completion = session.check_completion();
                InteractionOutcome::Released { snap, completion }
            }
            InteractionState::Panning(pan) if pan.pointer == pointer => {
                InteractionOutcome::PanEnded
            }
            other => {
                self.state = other;
                InteractionOutcome::Ignored
            }
        }
    }

    /// Drops the active gesture without snapping. Pieces stay where they are.
    pub fn cancel(&mut self, pointer: PointerId) -> InteractionOutcome {
        let active = match &self.state {
            InteractionState::Dragging(drag) => drag.pointer == pointer,
            InteractionState::Panning(pan) => pan.pointer == pointer,
            InteractionState::Idle => false,
        };
        if !active {
            return InteractionOutcome::Ignored;
        }
        self.state = InteractionState::Idle;
        InteractionOutcome::Cancelled
    }

    pub fn zoom_at(&mut self, session: &mut PuzzleSession, factor: f32, screen: Point) {
        session.viewport.zoom_at(factor, screen);
    }

    pub fn reset_view(&mut self, session: &mut PuzzleSession) {
        session.viewport.reset();
    }

    /// Advances per-frame tasks with the current drag state.
    pub fn frame(&self, session: &mut PuzzleSession, dt: f32) -> bool {
        session.advance_frame(dt, self.dragging_group().is_some())
    }
}
