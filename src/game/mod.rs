//! Browser glue: canvas, stats line, reset control, input listeners and the
//! `requestAnimationFrame` loop. All game rules live in [`crate::sim`]; this
//! module only forwards DOM events into the simulation and paints its items.

mod render;

use log::{info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, CanvasGradient, CanvasRenderingContext2d, Document, Element,
    EventTarget, HtmlCanvasElement, Window, window,
};

use crate::config::{GameConfig, Viewport};
use crate::sim::Simulation;

/// Runtime state shared by the frame loop and the event listeners.
struct GameState {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    background: CanvasGradient,
    stats_el: Element,
    sim: Simulation,
}

impl GameState {
    fn refresh_stats(&self) {
        self.stats_el
            .set_text_content(Some(&self.sim.stats().to_string()));
    }

    fn resize(&mut self, viewport: Viewport) {
        self.canvas.set_width(viewport.width as u32);
        self.canvas.set_height(viewport.height as u32);
        self.sim.resize(viewport);
        match render::background_gradient(&self.ctx, viewport) {
            Ok(grad) => self.background = grad,
            Err(err) => warn!("background gradient rebuild failed: {err:?}"),
        }
    }

    fn reset(&mut self) {
        self.sim.reset();
        info!("game reset");
        self.refresh_stats();
    }

    fn press(&mut self, x: f64, y: f64, target: Option<EventTarget>) {
        // Presses on the reset control are handled by its own listener.
        if targets_element(target, &self.sim.config().reset_id) {
            return;
        }
        self.sim.press(x, y);
        self.refresh_stats();
    }
}

thread_local! {
    static GAME_STATE: std::cell::RefCell<Option<GameState>> = const { std::cell::RefCell::new(None) };
}

fn with_state(f: impl FnOnce(&mut GameState)) {
    GAME_STATE.with(|cell| {
        if let Some(state) = cell.borrow_mut().as_mut() {
            f(state);
        }
    });
}

pub fn start(config: GameConfig) -> Result<(), JsValue> {
    if GAME_STATE.with(|cell| cell.borrow().is_some()) {
        warn!("game already running; ignoring start request");
        return Ok(());
    }
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let viewport = window_viewport(&win)?;
    let canvas = ensure_canvas(&doc, &config.canvas_id)?;
    canvas.set_width(viewport.width as u32);
    canvas.set_height(viewport.height as u32);
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;
    let background = render::background_gradient(&ctx, viewport)?;
    let stats_el = ensure_stats(&doc, &config.stats_id)?;
    let reset_el = ensure_reset(&doc, &config.reset_id)?;

    let seed = entropy_seed(&win);
    info!(
        "starting game {}x{} (split threshold {}, seed {seed:#x})",
        viewport.width, viewport.height, config.split_threshold
    );
    let state = GameState {
        canvas,
        ctx,
        background,
        stats_el,
        sim: Simulation::with_seed(config, viewport, seed),
    };
    state.refresh_stats();
    GAME_STATE.with(|cell| *cell.borrow_mut() = Some(state));

    // Keep the drawing surface the size of the window
    {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
            let Some(win) = window() else { return };
            match window_viewport(&win) {
                Ok(viewport) => with_state(|st| st.resize(viewport)),
                Err(err) => warn!("resize ignored: {err:?}"),
            }
        }) as Box<dyn FnMut(_)>);
        win.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Reset control (mouse + touch)
    for kind in ["mousedown", "touchstart"] {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
            with_state(GameState::reset);
        }) as Box<dyn FnMut(_)>);
        reset_el.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Mouse presses anywhere in the window
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
            let (x, y) = (evt.client_x() as f64, evt.client_y() as f64);
            with_state(|st| st.press(x, y, evt.target()));
        }) as Box<dyn FnMut(_)>);
        win.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Touch presses: first touch point only, non-passive so scrolling / zoom is suppressed
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::TouchEvent| {
            evt.prevent_default();
            let Some(touch) = evt.touches().get(0) else {
                return;
            };
            let (x, y) = (touch.client_x() as f64, touch.client_y() as f64);
            with_state(|st| st.press(x, y, evt.target()));
        }) as Box<dyn FnMut(_)>);
        let opts = AddEventListenerOptions::new();
        opts.set_passive(false);
        win.add_event_listener_with_callback_and_add_event_listener_options(
            "touchstart",
            closure.as_ref().unchecked_ref(),
            &opts,
        )?;
        closure.forget();
    }

    start_loop();
    Ok(())
}

type FrameCallback = std::rc::Rc<std::cell::RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn start_loop() {
    let f: FrameCallback = std::rc::Rc::new(std::cell::RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        with_state(|st| tick(st, ts));
        request_frame(&f);
    }) as Box<dyn FnMut(f64)>));
    request_frame(&g);
}

fn request_frame(cb: &FrameCallback) {
    let Some(w) = window() else { return };
    if let Some(closure) = cb.borrow().as_ref() {
        if let Err(err) = w.request_animation_frame(closure.as_ref().unchecked_ref()) {
            warn!("requestAnimationFrame failed: {err:?}");
        }
    }
}

// --- Tick --------------------------------------------------------------------

fn tick(state: &mut GameState, now: f64) {
    if !state.sim.frame_due(now) {
        return;
    }
    let viewport = state.sim.viewport();
    render::paint_background(&state.ctx, &state.background, viewport);
    let ctx = &state.ctx;
    state.sim.advance_frame(|item| {
        if let Err(err) = render::draw_item(ctx, item) {
            warn!("draw failed: {err:?}");
        }
    });
}

// --- DOM helpers -------------------------------------------------------------

fn window_viewport(win: &Window) -> Result<Viewport, JsValue> {
    let width = win
        .inner_width()?
        .as_f64()
        .ok_or_else(|| JsValue::from_str("innerWidth is not a number"))?;
    let height = win
        .inner_height()?
        .as_f64()
        .ok_or_else(|| JsValue::from_str("innerHeight is not a number"))?;
    Ok(Viewport::new(width, height))
}

fn ensure_canvas(doc: &Document, id: &str) -> Result<HtmlCanvasElement, JsValue> {
    if let Some(el) = doc.get_element_by_id(id) {
        return Ok(el.dyn_into()?);
    }
    let c: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
    c.set_id(id);
    c.set_attribute("style", "position:fixed; left:0; top:0; z-index:0;")?;
    append_to_body(doc, &c)?;
    Ok(c)
}

fn ensure_stats(doc: &Document, id: &str) -> Result<Element, JsValue> {
    if let Some(el) = doc.get_element_by_id(id) {
        return Ok(el);
    }
    let div = doc.create_element("div")?;
    div.set_id(id);
    div.set_attribute("style", "position:fixed; top:10px; left:12px; font-family:'Fira Code', monospace; font-size:15px; padding:4px 8px; background:rgba(0,0,0,0.42); border-radius:6px; color:#fff; z-index:10; pointer-events:none;")?;
    append_to_body(doc, &div)?;
    Ok(div)
}

fn ensure_reset(doc: &Document, id: &str) -> Result<Element, JsValue> {
    if let Some(el) = doc.get_element_by_id(id) {
        return Ok(el);
    }
    let button = doc.create_element("button")?;
    button.set_id(id);
    button.set_text_content(Some("Reset"));
    button.set_attribute("style", "position:fixed; top:10px; right:12px; font-family:'Fira Code', monospace; font-size:15px; padding:4px 10px; border-radius:6px; z-index:10;")?;
    append_to_body(doc, &button)?;
    Ok(button)
}

fn append_to_body(doc: &Document, el: &Element) -> Result<(), JsValue> {
    let body = doc.body().ok_or_else(|| JsValue::from_str("no body"))?;
    body.append_child(el)?;
    Ok(())
}

fn targets_element(target: Option<EventTarget>, id: &str) -> bool {
    target
        .and_then(|t| t.dyn_into::<Element>().ok())
        .is_some_and(|el| el.id() == id)
}

#[cfg(feature = "rng")]
fn entropy_seed(win: &Window) -> u64 {
    let mut buf = [0u8; 8];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => u64::from_le_bytes(buf),
        Err(err) => {
            warn!("getrandom failed ({err}); seeding from the clock");
            clock_seed(win)
        }
    }
}

#[cfg(not(feature = "rng"))]
fn entropy_seed(win: &Window) -> u64 {
    clock_seed(win)
}

// Sub-millisecond page time, spread over the full word.
fn clock_seed(win: &Window) -> u64 {
    let now = win.performance().map(|p| p.now()).unwrap_or(0.0);
    ((now * 1000.0) as u64).wrapping_mul(6364136223846793005) ^ 0x9E37_79B9_7F4A_7C15
}
