//! HUD side-channel
//!
//! The engine never looks up page elements itself; the host hands in
//! callbacks. Missing callbacks are skipped.

use crate::games::TitleId;

type ScoreFn = Box<dyn FnMut(u64)>;
type LevelFn = Box<dyn FnMut(u32)>;
type FinishedFn = Box<dyn FnMut(TitleId, u64)>;

#[derive(Default)]
pub struct Hud {
    score: Option<ScoreFn>,
    level: Option<LevelFn>,
    finished: Option<FinishedFn>,
    last_score: Option<u64>,
    last_level: Option<u32>,
}

impl Hud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_score(mut self, f: impl FnMut(u64) + 'static) -> Self {
        self.score = Some(Box::new(f));
        self
    }

    pub fn on_level(mut self, f: impl FnMut(u32) + 'static) -> Self {
        self.level = Some(Box::new(f));
        self
    }

    /// Called once when a round reaches a final outcome
    pub fn on_finished(mut self, f: impl FnMut(TitleId, u64) + 'static) -> Self {
        self.finished = Some(Box::new(f));
        self
    }

    /// Push score and level, writing only values that changed
    pub fn sync(&mut self, score: u64, level: u32) {
        if self.last_score != Some(score) {
            self.last_score = Some(score);
            if let Some(f) = self.score.as_mut() {
                f(score);
            }
        }
        if self.last_level != Some(level) {
            self.last_level = Some(level);
            if let Some(f) = self.level.as_mut() {
                f(level);
            }
        }
    }

    /// Forget what was written so the next `sync` writes everything
    pub fn invalidate(&mut self) {
        self.last_score = None;
        self.last_level = None;
    }

    pub fn finished(&mut self, title: TitleId, score: u64) {
        if let Some(f) = self.finished.as_mut() {
            f(title, score);
        }
    }
}

impl std::fmt::Debug for Hud {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hud")
            .field("score", &self.score.is_some())
            .field("level", &self.level.is_some())
            .field("finished", &self.finished.is_some())
            .field("last_score", &self.last_score)
            .field("last_level", &self.last_level)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_sync_writes_only_changes() {
        let writes = Rc::new(RefCell::new(Vec::new()));
        let w = writes.clone();
        let mut hud = Hud::new().on_score(move |s| w.borrow_mut().push(s));
        hud.sync(0, 1);
        hud.sync(0, 1);
        hud.sync(10, 1);
        assert_eq!(*writes.borrow(), vec![0, 10]);

        hud.invalidate();
        hud.sync(10, 1);
        assert_eq!(*writes.borrow(), vec![0, 10, 10]);
    }

    #[test]
    fn test_absent_slots_are_skipped() {
        let mut hud = Hud::new();
        hud.sync(5, 2);
        hud.finished(TitleId::Nugget, 5);
    }
}
