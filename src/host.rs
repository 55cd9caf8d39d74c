//! Host shell
//!
//! Routes a catalog id to a view and owns at most one mounted controller.
//! Opening a title always tears down the previous one first, and each
//! mounted controller is destroyed exactly once.

use std::cell::RefCell;
use std::rc::Rc;

use log::{info, warn};

use crate::catalog::{Catalog, Entitlement};
use crate::controller::ControllerHandle;
use crate::error::GameError;
use crate::games::{GameContext, TitleId};
use crate::hud::Hud;
use crate::progress::{self, Progress};
use crate::settings::Settings;
use crate::tuning::Tuning;

/// What the host is showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Browsing,
    Playing(TitleId),
    ComingSoon(String),
    Locked(String),
    /// Unknown id or an entry without a controller
    Unsupported(String),
}

impl View {
    pub fn as_str(&self) -> &'static str {
        match self {
            View::Browsing => "browsing",
            View::Playing(_) => "playing",
            View::ComingSoon(_) => "coming-soon",
            View::Locked(_) => "locked",
            View::Unsupported(_) => "unsupported",
        }
    }
}

pub struct HostShell {
    catalog: Catalog,
    entitlement: Entitlement,
    progress: Rc<RefCell<Progress>>,
    settings: Settings,
    tuning: Tuning,
    seed: u64,
    current: Option<ControllerHandle>,
    view: View,
}

impl HostShell {
    pub fn new(catalog: Catalog, entitlement: Entitlement) -> Self {
        Self {
            catalog,
            entitlement,
            progress: Rc::new(RefCell::new(Progress::new())),
            settings: Settings::default(),
            tuning: Tuning::default(),
            seed: 0,
            current: None,
            view: View::Browsing,
        }
    }

    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = Rc::new(RefCell::new(progress));
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Takes effect on the next mount
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    pub fn with_tuning(mut self, tuning: Tuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Seed for the next mounted round; advanced on every mount
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn current(&self) -> Option<&ControllerHandle> {
        self.current.as_ref()
    }

    pub fn progress(&self) -> Progress {
        self.progress.borrow().clone()
    }

    pub fn set_premium(&mut self, is_premium: bool) {
        self.entitlement.set_premium(is_premium);
    }

    pub fn is_premium(&self) -> bool {
        self.entitlement.is_premium()
    }

    /// Whether the listing should badge `id` as locked
    pub fn is_locked(&self, id: &str) -> bool {
        self.entitlement.is_locked(id)
    }

    pub fn request_unlock(&mut self, id: &str) {
        self.entitlement.request_unlock(id);
    }

    /// Route `id` to a view, mounting a controller if it is playable
    ///
    /// `mount` receives a HUD already wired to progress tracking and returns
    /// the running controller.
    pub fn open<F>(&mut self, id: &str, mount: F) -> Result<&View, GameError>
    where
        F: FnOnce(TitleId, &GameContext, Hud) -> Result<ControllerHandle, GameError>,
    {
        self.close();

        let Some(entry) = self.catalog.get(id) else {
            warn!("no catalog entry for `{}`", id);
            self.view = View::Unsupported(id.to_string());
            return Ok(&self.view);
        };
        if !entry.is_playable {
            info!("{} is coming soon", id);
            self.view = View::ComingSoon(id.to_string());
            return Ok(&self.view);
        }
        if self.entitlement.is_locked(id) {
            info!("{} is locked behind premium", id);
            self.view = View::Locked(id.to_string());
            return Ok(&self.view);
        }
        let Some(title) = entry.title_id() else {
            warn!("no game controller for `{}`", id);
            self.view = View::Unsupported(id.to_string());
            return Ok(&self.view);
        };

        let ctx = GameContext::new(self.seed)
            .with_tuning(self.tuning.clone())
            .with_settings(self.settings.clone());
        self.seed = self.seed.wrapping_add(1);

        let handle = mount(title, &ctx, self.progress_hud())?;
        self.progress.borrow_mut().record_play(title);
        info!("mounted {}", title);
        self.current = Some(handle);
        self.view = View::Playing(title);
        Ok(&self.view)
    }

    /// Restart the mounted round, if any
    pub fn restart(&self) {
        match &self.current {
            Some(handle) => handle.restart(),
            None => warn!("restart ignored: nothing mounted"),
        }
    }

    /// Destroy the mounted controller and go back to browsing
    pub fn close(&mut self) {
        if let Some(handle) = self.current.take() {
            let (title, score) = (handle.title(), handle.score());
            handle.destroy();
            self.record(title, score);
            info!("unmounted {}", title);
        }
        self.view = View::Browsing;
    }

    fn progress_hud(&self) -> Hud {
        let shared = self.progress.clone();
        Hud::new().on_finished(move |title, score| {
            let mut records = shared.borrow_mut();
            if records.record_score(title, score, progress::now_ms()) {
                info!("{}: new best {}", title, score);
            }
            records.save();
        })
    }

    fn record(&self, title: TitleId, score: u64) {
        let mut records = self.progress.borrow_mut();
        if records.record_score(title, score, progress::now_ms()) {
            info!("{}: new best {}", title, score);
        }
        records.save();
    }
}

impl Drop for HostShell {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::controller::Status;
    use crate::games;
    use crate::renderer::RecordingSurface;
    use crate::sim::Phase;

    fn shell() -> HostShell {
        let catalog = Catalog::builtin().unwrap();
        let entitlement = Entitlement::for_catalog(&catalog);
        HostShell::new(catalog, entitlement).with_seed(11)
    }

    /// Mount on a recording surface driven by `clock`
    fn on(
        clock: ManualClock,
    ) -> impl FnOnce(TitleId, &GameContext, Hud) -> Result<ControllerHandle, GameError> {
        move |title, ctx, hud| {
            let surface = RecordingSurface::new(800.0, 600.0);
            let controller = games::create(title, Box::new(surface), hud, ctx)?;
            Ok(ControllerHandle::mount(controller, Box::new(clock)))
        }
    }

    fn never(
        _: TitleId,
        _: &GameContext,
        _: Hud,
    ) -> Result<ControllerHandle, GameError> {
        panic!("nothing should be mounted");
    }

    #[test]
    fn test_playable_entry_mounts_and_ticks() {
        let mut host = shell();
        let clock = ManualClock::new();
        let view = host.open("chicken-nugget-chaos", on(clock.clone())).unwrap();
        assert_eq!(*view, View::Playing(TitleId::Nugget));
        assert_eq!(view.as_str(), "playing");
        assert_eq!(clock.run_frames(5), 5);
        assert_eq!(host.current().unwrap().status(), Status::Live);
        assert_eq!(host.progress().times_played(TitleId::Nugget), 1);
    }

    #[test]
    fn test_coming_soon_and_unknown_never_mount() {
        let mut host = shell();
        assert_eq!(
            *host.open("kitty-disco-fever", never).unwrap(),
            View::ComingSoon("kitty-disco-fever".to_string())
        );
        assert_eq!(
            *host.open("space-laser-llamas", never).unwrap(),
            View::Unsupported("space-laser-llamas".to_string())
        );
        assert!(host.current().is_none());
    }

    #[test]
    fn test_premium_gate() {
        let requested = Rc::new(RefCell::new(0));
        let count = requested.clone();
        let catalog = Catalog::builtin().unwrap();
        let entitlement = Entitlement::for_catalog(&catalog)
            .on_unlock_requested(move |_| *count.borrow_mut() += 1);
        let mut host = HostShell::new(catalog, entitlement);

        assert_eq!(
            *host.open("cosmic-karaoke", never).unwrap(),
            View::Locked("cosmic-karaoke".to_string())
        );
        host.request_unlock("cosmic-karaoke");
        assert_eq!(*requested.borrow(), 1);
        assert!(!host.is_premium());
        assert!(host.is_locked("cosmic-karaoke"));

        // Unlocked, but there is no controller behind it
        host.set_premium(true);
        assert!(host.is_premium());
        assert!(!host.is_locked("cosmic-karaoke"));
        assert_eq!(
            *host.open("cosmic-karaoke", never).unwrap(),
            View::Unsupported("cosmic-karaoke".to_string())
        );
    }

    #[test]
    fn test_switching_destroys_previous_exactly_once() {
        let mut host = shell();
        let first = ManualClock::new();
        let second = ManualClock::new();
        host.open("chicken-nugget-chaos", on(first.clone())).unwrap();
        first.run_frames(2);

        host.open("bubble-gum-blitz", on(second.clone())).unwrap();
        assert_eq!(first.cancellations(), 1);
        assert!(!first.step(16.0), "no tick after teardown");
        assert_eq!(second.run_frames(2), 2);

        host.close();
        host.close();
        assert_eq!(second.cancellations(), 1);
        assert_eq!(*host.view(), View::Browsing);
        drop(host);
        assert_eq!(first.cancellations(), 1);
        assert_eq!(second.cancellations(), 1);
    }

    #[test]
    fn test_failed_mount_leaves_nothing_mounted() {
        let mut host = shell();
        let result = host.open("snail-racing-league", |title, ctx, hud| {
            let mut surface = RecordingSurface::new(800.0, 600.0);
            surface.detach();
            let controller = games::create(title, Box::new(surface), hud, ctx)?;
            Ok(ControllerHandle::mount(controller, Box::new(ManualClock::new())))
        });
        assert!(matches!(result, Err(GameError::SurfaceUnavailable(_))));
        assert!(host.current().is_none());
        assert_eq!(host.progress().times_played(TitleId::Snail), 0);
    }

    #[test]
    fn test_finished_race_updates_best() {
        let mut host = shell();
        let clock = ManualClock::new();
        host.open("snail-racing-league", on(clock.clone())).unwrap();
        for _ in 0..10_000 {
            clock.run_frames(1);
            if host.current().unwrap().phase().is_final() {
                break;
            }
        }
        let handle = host.current().unwrap();
        assert!(matches!(handle.phase(), Phase::Terminal(_)));
        let score = handle.score();
        assert!(score > 0);
        assert_eq!(host.progress().best(TitleId::Snail), score);

        host.restart();
        clock.run_frames(1);
        assert_eq!(host.current().unwrap().score(), 0);
        host.close();
        assert_eq!(host.progress().best(TitleId::Snail), score);
    }
}
