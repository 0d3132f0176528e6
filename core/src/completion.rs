use std::time::Duration;

use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::model::Piece;

/// Emitted once, the first time every piece is locked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionEvent {
    #[serde(rename = "elapsedTimeSeconds")]
    pub elapsed_seconds: u64,
    pub difficulty: u32,
}

#[derive(Clone, Debug, Default)]
pub struct CompletionDetector {
    complete: bool,
}

impl CompletionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Marks the puzzle complete without reporting a transition.
    pub fn mark_complete(&mut self) {
        self.complete = true;
    }

    /// True only on the call that first observes every piece locked.
    pub fn check(&mut self, pieces: &[Piece]) -> bool {
        if self.complete || pieces.is_empty() {
            return false;
        }
        if pieces.iter().all(|piece| piece.locked) {
            self.complete = true;
            return true;
        }
        false
    }
}

/// Elapsed play time that can be paused and seeded from a save.
#[derive(Clone, Debug, Default)]
pub struct Stopwatch {
    started: Option<Instant>,
    carried: Duration,
}

impl Stopwatch {
    pub fn started() -> Self {
        let mut watch = Self::default();
        watch.start();
        watch
    }

    pub fn start(&mut self) {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
    }

    pub fn stop(&mut self) {
        if let Some(start) = self.started.take() {
            self.carried += start.elapsed();
        }
    }

    /// Drops any running time and continues counting from `elapsed`.
    pub fn resume_from(&mut self, elapsed: Duration) {
        self.carried = elapsed;
        self.started = Some(Instant::now());
    }

    pub fn restart(&mut self) {
        self.resume_from(Duration::ZERO);
    }

    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }

    pub fn elapsed(&self) -> Duration {
        match self.started {
            Some(start) => self.carried + start.elapsed(),
            None => self.carried,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EdgeSignature;

    fn pieces(locked: &[bool]) -> Vec<Piece> {
        locked
            .iter()
            .enumerate()
            .map(|(id, locked)| Piece {
                id,
                row: 0,
                col: id as u32,
                x: 0.0,
                y: 0.0,
                width: 10.0,
                height: 10.0,
                edges: EdgeSignature::FLAT,
                locked: *locked,
            })
            .collect()
    }

    #[test]
    fn fires_once_when_all_locked() {
        let mut detector = CompletionDetector::new();
        assert!(!detector.check(&pieces(&[true, false])));
        assert!(!detector.is_complete());
        assert!(detector.check(&pieces(&[true, true])));
        assert!(detector.is_complete());
        assert!(!detector.check(&pieces(&[true, true])));
    }

    #[test]
    fn marked_complete_never_fires() {
        let mut detector = CompletionDetector::new();
        detector.mark_complete();
        assert!(!detector.check(&pieces(&[true])));
        assert!(detector.is_complete());
    }

    #[test]
    fn stopped_watch_holds_its_time() {
        let mut watch = Stopwatch::default();
        watch.resume_from(Duration::from_secs(42));
        assert!(watch.is_running());
        assert!(watch.elapsed() >= Duration::from_secs(42));
        watch.stop();
        let frozen = watch.elapsed();
        assert!(!watch.is_running());
        assert_eq!(watch.elapsed(), frozen);
        watch.restart();
        assert!(watch.elapsed() < Duration::from_secs(42));
    }

    #[test]
    fn event_uses_save_format_names() {
        let json = serde_json::to_string(&CompletionEvent {
            elapsed_seconds: 93,
            difficulty: 48,
        })
        .expect("serialize");
        assert_eq!(json, r#"{"elapsedTimeSeconds":93,"difficulty":48}"#);
    }
}
