//! Tick orchestration and lifecycle
//!
//! Each title implements `Game` (pure policy: update, render, input). The
//! generic `Controller<G>` owns the surface, HUD, clock and input bindings
//! and drives one tick as:
//!
//! 1. Surface validity check (detached surface: skip the tick)
//! 2. `Game::update` (spawn, move, collide, cull)
//! 3. `Game::check` (non-finite state faults the controller)
//! 4. `Game::render` into a fresh `Frame`
//! 5. HUD sync and final-outcome notification

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{debug, error, info, warn};

use crate::clock::Clock;
use crate::error::GameError;
use crate::games::TitleId;
use crate::hud::Hud;
use crate::input::{InputBinding, InputEvent};
use crate::renderer::{Frame, Surface};
use crate::sim::{EntityStore, Phase};

/// Per-title policy
pub trait Game {
    const TITLE: TitleId;

    /// Advance the simulation to `now` (milliseconds, monotonic)
    fn update(&mut self, now: f64);
    /// Full repaint of the current state
    fn render(&self, frame: &mut Frame<'_>);
    fn handle_input(&mut self, event: InputEvent);
    /// Back to the first phase with an empty field and zero score
    fn reset(&mut self);

    fn score(&self) -> u64;
    fn level(&self) -> u32 {
        1
    }
    fn phase(&self) -> Phase;

    /// Validate state after `update`
    fn check(&self) -> Result<(), GameError>;
}

/// Fails with `InvalidState` if any entity went non-finite
pub fn ensure_finite<K>(title: TitleId, store: &EntityStore<K>) -> Result<(), GameError> {
    match store.first_non_finite() {
        None => Ok(()),
        Some(e) => Err(GameError::InvalidState {
            title: title.as_str(),
            detail: format!("entity {} at {:?} moving {:?}", e.id, e.pos, e.vel),
        }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Live,
    /// Clock stopped after an invalid state; last good frame stays visible
    Faulted,
    Destroyed,
}

/// What the host can do with any mounted title
pub trait GameController {
    fn title(&self) -> TitleId;
    fn tick(&mut self, now: f64);
    fn handle_input(&mut self, event: InputEvent);

    /// Take ownership of an already started clock
    fn attach_clock(&mut self, clock: Box<dyn Clock>);
    fn take_clock(&mut self) -> Option<Box<dyn Clock>>;
    fn clock_running(&self) -> bool;
    fn bind_input(&mut self, binding: Box<dyn InputBinding>);

    fn restart(&mut self);
    fn destroy(&mut self);

    fn status(&self) -> Status;
    fn score(&self) -> u64;
    fn level(&self) -> u32;
    fn phase(&self) -> Phase;
}

pub struct Controller<G: Game> {
    game: G,
    surface: Box<dyn Surface>,
    hud: Hud,
    clock: Option<Box<dyn Clock>>,
    bindings: Vec<Box<dyn InputBinding>>,
    status: Status,
    last_phase: Phase,
    reported_final: bool,
}

impl<G: Game> Controller<G> {
    /// Fails fast on a detached or empty surface
    pub fn new(game: G, surface: Box<dyn Surface>, hud: Hud) -> Result<Self, GameError> {
        if !surface.is_attached() {
            return Err(GameError::SurfaceUnavailable(format!(
                "{}: surface is detached",
                G::TITLE
            )));
        }
        let size = surface.size();
        if !(size.x > 0.0 && size.y > 0.0) {
            return Err(GameError::SurfaceUnavailable(format!(
                "{}: surface has no area ({}x{})",
                G::TITLE,
                size.x,
                size.y
            )));
        }
        info!("{}: mounted on {}x{} surface", G::TITLE, size.x, size.y);
        let last_phase = game.phase();
        Ok(Self {
            game,
            surface,
            hud,
            clock: None,
            bindings: Vec::new(),
            status: Status::Live,
            last_phase,
            reported_final: false,
        })
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    fn stop_clock(&mut self) {
        if let Some(clock) = self.clock.as_mut() {
            clock.stop();
        }
    }

    fn fault(&mut self, err: GameError) {
        error!("{}: {}; stopping", G::TITLE, err);
        self.stop_clock();
        self.status = Status::Faulted;
    }

    fn observe_phase(&mut self) {
        let phase = self.game.phase();
        if phase != self.last_phase {
            info!("{}: {:?} -> {:?}", G::TITLE, self.last_phase, phase);
            self.last_phase = phase;
        }
        if phase.is_final() && !self.reported_final {
            self.reported_final = true;
            self.hud.finished(G::TITLE, self.game.score());
        }
    }
}

impl<G: Game> GameController for Controller<G> {
    fn title(&self) -> TitleId {
        G::TITLE
    }

    fn tick(&mut self, now: f64) {
        match self.status {
            Status::Live => {}
            Status::Faulted => return,
            Status::Destroyed => {
                error!("{}: tick after destroy ignored", G::TITLE);
                return;
            }
        }
        if !self.surface.is_attached() {
            debug!("{}: surface detached, tick skipped", G::TITLE);
            return;
        }

        self.game.update(now);
        if let Err(err) = self.game.check() {
            self.fault(err);
            return;
        }

        {
            let mut frame = Frame::begin(self.surface.as_mut());
            self.game.render(&mut frame);
        }
        self.hud.sync(self.game.score(), self.game.level());
        self.observe_phase();
    }

    fn handle_input(&mut self, event: InputEvent) {
        if self.status == Status::Live {
            self.game.handle_input(event);
        }
    }

    fn attach_clock(&mut self, clock: Box<dyn Clock>) {
        if self.status == Status::Destroyed {
            warn!("{}: clock attached after destroy, stopping it", G::TITLE);
            let mut clock = clock;
            clock.stop();
            return;
        }
        self.stop_clock();
        self.clock = Some(clock);
    }

    fn take_clock(&mut self) -> Option<Box<dyn Clock>> {
        self.clock.take()
    }

    fn clock_running(&self) -> bool {
        self.clock.as_ref().is_some_and(|c| c.is_running())
    }

    fn bind_input(&mut self, binding: Box<dyn InputBinding>) {
        if self.status == Status::Destroyed {
            let mut binding = binding;
            binding.detach();
            return;
        }
        self.bindings.push(binding);
    }

    fn restart(&mut self) {
        match self.status {
            Status::Destroyed => {
                warn!("{}: restart after destroy ignored", G::TITLE);
                return;
            }
            Status::Faulted => info!("{}: restarting after fault", G::TITLE),
            Status::Live => info!("{}: restart", G::TITLE),
        }
        self.game.reset();
        self.status = Status::Live;
        self.reported_final = false;
        self.last_phase = self.game.phase();
        self.hud.invalidate();
        self.hud.sync(self.game.score(), self.game.level());
    }

    fn destroy(&mut self) {
        if self.status == Status::Destroyed {
            debug!("{}: already destroyed", G::TITLE);
            return;
        }
        self.stop_clock();
        for binding in &mut self.bindings {
            binding.detach();
        }
        self.bindings.clear();
        self.status = Status::Destroyed;
        info!("{}: destroyed", G::TITLE);
    }

    fn status(&self) -> Status {
        self.status
    }

    fn score(&self) -> u64 {
        self.game.score()
    }

    fn level(&self) -> u32 {
        self.game.level()
    }

    fn phase(&self) -> Phase {
        self.game.phase()
    }
}

impl<G: Game> Drop for Controller<G> {
    fn drop(&mut self) {
        if self.status != Status::Destroyed {
            self.destroy();
        }
    }
}

type Shared = Rc<RefCell<Box<dyn GameController>>>;

/// Mounted controller wired to its clock
///
/// The clock callback holds only a weak reference, so dropping every handle
/// tears the controller down.
#[derive(Clone)]
pub struct ControllerHandle {
    inner: Shared,
    title: TitleId,
}

impl ControllerHandle {
    pub fn mount(controller: Box<dyn GameController>, clock: Box<dyn Clock>) -> Self {
        let handle = Self {
            title: controller.title(),
            inner: Rc::new(RefCell::new(controller)),
        };
        handle.start_clock(clock);
        handle
    }

    fn start_clock(&self, mut clock: Box<dyn Clock>) {
        let weak = Rc::downgrade(&self.inner);
        clock.start(Box::new(move |now| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            match inner.try_borrow_mut() {
                Ok(mut controller) => controller.tick(now),
                Err(_) => warn!("tick skipped: controller busy"),
            };
        }));
        match self.inner.try_borrow_mut() {
            Ok(mut controller) => controller.attach_clock(clock),
            Err(_) => {
                error!("cannot attach clock: controller busy");
                clock.stop();
            }
        }
    }

    pub fn downgrade(&self) -> WeakControllerHandle {
        WeakControllerHandle {
            inner: Rc::downgrade(&self.inner),
            title: self.title,
        }
    }

    /// Run `f` against the controller unless it is mid-tick
    fn with<R>(&self, op: &str, f: impl FnOnce(&mut dyn GameController) -> R) -> Option<R> {
        match self.inner.try_borrow_mut() {
            Ok(mut controller) => Some(f(controller.as_mut())),
            Err(_) => {
                warn!("{op} ignored: controller busy");
                None
            }
        }
    }

    pub fn dispatch(&self, event: InputEvent) {
        self.with("input", |c| c.handle_input(event));
    }

    pub fn bind(&self, binding: Box<dyn InputBinding>) {
        self.with("bind", |c| c.bind_input(binding));
    }

    /// Restart the round; a faulted controller also gets its clock back
    pub fn restart(&self) {
        let clock = self
            .with("restart", |c| {
                c.restart();
                if c.status() == Status::Live && !c.clock_running() {
                    c.take_clock()
                } else {
                    None
                }
            })
            .flatten();
        if let Some(clock) = clock {
            self.start_clock(clock);
        }
    }

    pub fn destroy(&self) {
        self.with("destroy", |c| c.destroy());
    }

    /// Read from the controller; mid-tick reads log and yield `busy`
    fn peek<R>(&self, what: &str, busy: R, f: impl FnOnce(&dyn GameController) -> R) -> R {
        match self.inner.try_borrow() {
            Ok(controller) => f(&**controller),
            Err(_) => {
                warn!("{}: {what} read while ticking", self.title);
                busy
            }
        }
    }

    pub fn title(&self) -> TitleId {
        self.title
    }

    /// A controller that is mid-tick is live
    pub fn status(&self) -> Status {
        self.peek("status", Status::Live, |c| c.status())
    }

    pub fn score(&self) -> u64 {
        self.peek("score", 0, |c| c.score())
    }

    pub fn level(&self) -> u32 {
        self.peek("level", 0, |c| c.level())
    }

    pub fn phase(&self) -> Phase {
        self.peek("phase", Phase::Active, |c| c.phase())
    }
}

/// Non-owning handle for listeners owned by the controller itself
#[derive(Clone)]
pub struct WeakControllerHandle {
    inner: Weak<RefCell<Box<dyn GameController>>>,
    title: TitleId,
}

impl WeakControllerHandle {
    fn upgrade(&self) -> Option<ControllerHandle> {
        let inner = self.inner.upgrade()?;
        Some(ControllerHandle {
            inner,
            title: self.title,
        })
    }

    pub fn dispatch(&self, event: InputEvent) {
        if let Some(handle) = self.upgrade() {
            handle.dispatch(event);
        }
    }

    pub fn restart(&self) {
        if let Some(handle) = self.upgrade() {
            handle.restart();
        }
    }
}
