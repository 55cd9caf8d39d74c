//! Chaos Arcade entry point
//!
//! The web build is driven from JavaScript through `ArcadeHost`. Natively the
//! binary plays each title headless on a recording surface for a few
//! simulated seconds and logs how it went.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::cell::RefCell;
    use std::rc::Rc;

    use chaos_arcade::catalog::{Catalog, Entitlement};
    use chaos_arcade::clock::ManualClock;
    use chaos_arcade::consts::{NOMINAL_TICK_HZ, SURFACE_HEIGHT, SURFACE_WIDTH};
    use chaos_arcade::games;
    use chaos_arcade::host::HostShell;
    use chaos_arcade::input::InputEvent;
    use chaos_arcade::renderer::RecordingSurface;
    use chaos_arcade::{ControllerHandle, TitleId};
    use glam::Vec2;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Chaos Arcade (native) starting...");

    let seconds: u32 = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(15);

    let catalog = match Catalog::builtin() {
        Ok(catalog) => catalog,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };
    log::info!("catalog: {}", catalog.stats());
    let entitlement = Entitlement::for_catalog(&catalog);
    let mut host = HostShell::new(catalog, entitlement).with_seed(42);

    for title in TitleId::ALL {
        let clock = ManualClock::new();
        let surface = Rc::new(RefCell::new(RecordingSurface::new(
            SURFACE_WIDTH,
            SURFACE_HEIGHT,
        )));
        let (c, s) = (clock.clone(), surface.clone());
        let opened = host.open(title.as_str(), move |t, ctx, hud| {
            let controller = games::create(t, Box::new(s), hud, ctx)?;
            Ok(ControllerHandle::mount(controller, Box::new(c)))
        });
        if let Err(e) = opened {
            log::error!("{}: {}", title, e);
            continue;
        }
        let Some(handle) = host.current().cloned() else {
            continue;
        };

        let frames = seconds * NOMINAL_TICK_HZ as u32;
        for frame in 0..frames {
            // A lazy player: blow a bubble now and then, sway the basket
            if frame % 45 == 0 {
                let x = 100.0 + (frame / 45 % 7) as f32 * 100.0;
                handle.dispatch(InputEvent::PointerDown(Vec2::new(x, 300.0)));
            }
            if clock.run_frames(1) == 0 {
                break;
            }
        }

        let commands = surface.borrow().commands().len();
        log::info!(
            "{}: score {} level {} phase {:?} after {} ticks ({} draw calls in the last frame)",
            title,
            handle.score(),
            handle.level(),
            handle.phase(),
            clock.ticks(),
            commands
        );
        drop(handle);
        host.close();
    }

    let progress = host.progress();
    for title in TitleId::ALL {
        log::info!(
            "{}: best {}, played {}",
            title,
            progress.best(title),
            progress.times_played(title)
        );
    }
    log::info!("total of best scores: {}", progress.total_score());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is `chaos_arcade::web::start`, this is just to satisfy the compiler
}
