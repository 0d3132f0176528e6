use std::cell::Cell;
use std::rc::Rc;

/// Seconds for one full cycle of the drag highlight.
pub const PULSE_PERIOD_SECS: f32 = 1.2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Continuation {
    Continue,
    Stop,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInfo {
    /// Seconds since the previous tick.
    pub dt: f32,
    pub dragging: bool,
    pub complete: bool,
}

pub trait FrameTask {
    fn tick(&mut self, frame: &FrameInfo) -> Continuation;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

#[derive(Default)]
pub struct FrameScheduler {
    tasks: Vec<(TaskId, Box<dyn FrameTask>)>,
    next_id: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, task: impl FrameTask + 'static) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push((id, Box::new(task)));
        id
    }

    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|(task_id, _)| *task_id != id);
        self.tasks.len() != before
    }

    /// Runs every task once and drops the ones that asked to stop.
    pub fn tick(&mut self, frame: &FrameInfo) {
        self.tasks
            .retain_mut(|(_, task)| task.tick(frame) == Continuation::Continue);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}

impl std::fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("tasks", &self.tasks.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

/// Read side of the drag highlight intensity, in `[0, 1]`.
#[derive(Clone, Debug, Default)]
pub struct PulseHandle(Rc<Cell<f32>>);

impl PulseHandle {
    pub fn intensity(&self) -> f32 {
        self.0.get()
    }

    fn set(&self, value: f32) {
        self.0.set(value);
    }

    pub(crate) fn clear(&self) {
        self.set(0.0);
    }
}

/// Breathing highlight shown while a group is held.
#[derive(Debug)]
pub struct AssistPulse {
    phase: f32,
    handle: PulseHandle,
}

impl AssistPulse {
    pub fn new(handle: PulseHandle) -> Self {
        handle.set(0.0);
        Self { phase: 0.0, handle }
    }
}

impl FrameTask for AssistPulse {
    fn tick(&mut self, frame: &FrameInfo) -> Continuation {
        if !frame.dragging || frame.complete {
            self.handle.set(0.0);
            return Continuation::Stop;
        }
        self.phase = (self.phase + frame.dt.max(0.0) / PULSE_PERIOD_SECS).fract();
        let wave = 0.5 - 0.5 * (self.phase * std::f32::consts::TAU).cos();
        self.handle.set(wave);
        Continuation::Continue
    }
}
