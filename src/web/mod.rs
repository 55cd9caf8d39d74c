//! Browser glue
//!
//! DOM HUD fields, DOM input listeners and the `ArcadeHost` exported to
//! JavaScript. Listeners are owned by the controller they feed and removed
//! when it is destroyed.

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget, HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

use crate::catalog::{Catalog, CategoryFilter, Entitlement};
use crate::clock::AnimationFrameClock;
use crate::consts::{SURFACE_HEIGHT, SURFACE_WIDTH};
use crate::controller::{ControllerHandle, WeakControllerHandle};
use crate::error::GameError;
use crate::games;
use crate::host::HostShell;
use crate::hud::Hud;
use crate::input::{Direction, InputBinding, InputEvent, Viewport};
use crate::progress::Progress;
use crate::renderer::CanvasSurface;
use crate::settings::{QualityPreset, Settings};

fn to_js(err: GameError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("logger already set: {e}").into());
    }
    log::info!("Chaos Arcade loaded");
}

/// Write `value` into the element `id`, if the page has one
fn set_text(id: &str, value: &str) {
    let element = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(id));
    if let Some(element) = element {
        element.set_text_content(Some(value));
    }
}

/// Route score and level to the page's `game-score` / `game-level` fields
///
/// Elements are looked up on every write, so the host page may re-render
/// them freely.
pub fn dom_hud(hud: Hud) -> Hud {
    hud.on_score(|score| set_text("game-score", &score.to_string()))
        .on_level(|level| set_text("game-level", &level.to_string()))
}

/// One registered DOM event listener
pub struct DomListener {
    target: EventTarget,
    event: &'static str,
    closure: Option<Closure<dyn FnMut(Event)>>,
}

impl DomListener {
    pub fn attach(
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, GameError> {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        target
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(|e| GameError::SurfaceUnavailable(format!("listen for {event}: {e:?}")))?;
        Ok(Self {
            target: target.clone(),
            event,
            closure: Some(closure),
        })
    }
}

impl InputBinding for DomListener {
    fn detach(&mut self) {
        if let Some(closure) = self.closure.take() {
            let _ = self
                .target
                .remove_event_listener_with_callback(self.event, closure.as_ref().unchecked_ref());
            log::debug!("{} listener removed", self.event);
        }
    }

    fn is_attached(&self) -> bool {
        self.closure.is_some()
    }
}

impl Drop for DomListener {
    fn drop(&mut self) {
        self.detach();
    }
}

fn viewport(canvas: &HtmlCanvasElement) -> Viewport {
    let rect = canvas.get_bounding_client_rect();
    Viewport::new(
        Vec2::new(rect.left() as f32, rect.top() as f32),
        Vec2::new(rect.width() as f32, rect.height() as f32),
        Vec2::new(canvas.width() as f32, canvas.height() as f32),
    )
}

/// Pointer position of a mouse or first-touch event, in surface coordinates
fn pointer(canvas: &HtmlCanvasElement, event: &Event) -> Option<Vec2> {
    let client = if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
        Vec2::new(mouse.client_x() as f32, mouse.client_y() as f32)
    } else if let Some(touch) = event.dyn_ref::<TouchEvent>() {
        event.prevent_default();
        let touch = touch.touches().get(0)?;
        Vec2::new(touch.client_x() as f32, touch.client_y() as f32)
    } else {
        return None;
    };
    Some(viewport(canvas).to_surface(client))
}

/// Wire canvas pointer events and window arrow keys to `handle`
pub fn bind_inputs(handle: &ControllerHandle, canvas: &HtmlCanvasElement) -> Result<(), GameError> {
    let window = web_sys::window()
        .ok_or_else(|| GameError::SurfaceUnavailable("no window".to_string()))?;

    let pointer_events: [(&'static str, fn(Vec2) -> InputEvent); 4] = [
        ("mousemove", InputEvent::PointerMove),
        ("mousedown", InputEvent::PointerDown),
        ("touchmove", InputEvent::PointerMove),
        ("touchstart", InputEvent::PointerDown),
    ];
    for (name, make) in pointer_events {
        let weak: WeakControllerHandle = handle.downgrade();
        let target = canvas.clone();
        let listener = DomListener::attach(canvas, name, move |event: Event| {
            if let Some(at) = pointer(&target, &event) {
                weak.dispatch(make(at));
            }
        })?;
        handle.bind(Box::new(listener));
    }

    let weak = handle.downgrade();
    let listener = DomListener::attach(&window, "keydown", move |event: Event| {
        let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        if let Some(dir) = Direction::from_key(&key.key()) {
            event.prevent_default();
            weak.dispatch(InputEvent::Key(dir));
        }
    })?;
    handle.bind(Box::new(listener));
    Ok(())
}

/// Arcade host as seen from JavaScript
#[wasm_bindgen]
pub struct ArcadeHost {
    shell: HostShell,
    canvas: HtmlCanvasElement,
    settings: Settings,
}

#[wasm_bindgen]
impl ArcadeHost {
    /// `on_unlock` is invoked with the entry id when a locked title asks
    /// for the purchase flow
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas_id: &str,
        on_unlock: Option<js_sys::Function>,
    ) -> Result<ArcadeHost, JsValue> {
        let canvas: HtmlCanvasElement = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(canvas_id))
            .ok_or_else(|| JsValue::from_str(&format!("no element #{canvas_id}")))?
            .dyn_into()
            .map_err(|_| JsValue::from_str(&format!("#{canvas_id} is not a canvas")))?;
        canvas.set_width(SURFACE_WIDTH as u32);
        canvas.set_height(SURFACE_HEIGHT as u32);

        let catalog = Catalog::builtin().map_err(to_js)?;
        let mut entitlement = Entitlement::for_catalog(&catalog);
        if let Some(f) = on_unlock {
            entitlement = entitlement.on_unlock_requested(move |id| {
                if let Err(e) = f.call1(&JsValue::NULL, &JsValue::from_str(id)) {
                    log::error!("unlock callback failed: {:?}", e);
                }
            });
        }
        let settings = Settings::load();
        let shell = HostShell::new(catalog, entitlement)
            .with_progress(Progress::load())
            .with_settings(settings.clone())
            .with_seed(js_sys::Date::now() as u64);
        Ok(Self {
            shell,
            canvas,
            settings,
        })
    }

    /// Open a catalog entry; returns the resulting view
    /// (`playing`, `coming-soon`, `locked` or `unsupported`)
    pub fn mount(&mut self, id: &str) -> Result<String, JsValue> {
        let canvas = self.canvas.clone();
        let view = self
            .shell
            .open(id, move |title, ctx, hud| {
                let surface = CanvasSurface::new(canvas.clone())?;
                let controller = games::create(title, Box::new(surface), dom_hud(hud), ctx)?;
                let handle =
                    ControllerHandle::mount(controller, Box::new(AnimationFrameClock::new()));
                bind_inputs(&handle, &canvas)?;
                Ok(handle)
            })
            .map_err(to_js)?;
        Ok(view.as_str().to_string())
    }

    pub fn restart(&self) {
        self.shell.restart();
    }

    pub fn unmount(&mut self) {
        self.shell.close();
    }

    pub fn set_premium(&mut self, is_premium: bool) {
        self.shell.set_premium(is_premium);
    }

    pub fn is_premium(&self) -> bool {
        self.shell.is_premium()
    }

    pub fn is_locked(&self, id: &str) -> bool {
        self.shell.is_locked(id)
    }

    pub fn request_unlock(&mut self, id: &str) {
        self.shell.request_unlock(id);
    }

    /// Standard listing for `category` as JSON
    /// (`all`, `casual`, `arcade` or `adventure`)
    pub fn catalog(&self, category: &str) -> Result<String, JsValue> {
        let filter = CategoryFilter::parse(category)
            .ok_or_else(|| JsValue::from_str(&format!("unknown category {category}")))?;
        let entries: Vec<_> = self.shell.catalog().listing(filter).collect();
        serde_json::to_string(&entries).map_err(|e| to_js(e.into()))
    }

    pub fn premium_catalog(&self) -> Result<String, JsValue> {
        let entries: Vec<_> = self.shell.catalog().premium().collect();
        serde_json::to_string(&entries).map_err(|e| to_js(e.into()))
    }

    pub fn stats(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.shell.catalog().stats()).map_err(|e| to_js(e.into()))
    }

    pub fn progress(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.shell.progress()).map_err(|e| to_js(e.into()))
    }

    /// Applies to the next mounted title
    pub fn set_quality(&mut self, preset: &str) -> Result<(), JsValue> {
        let preset = QualityPreset::parse(preset)
            .ok_or_else(|| JsValue::from_str(&format!("unknown preset {preset}")))?;
        self.settings.apply_preset(preset);
        self.settings.save();
        self.shell.set_settings(self.settings.clone());
        Ok(())
    }
}
