//! Glowfield entry point
//!
//! On the web this wires the DOM to a `Host` and drives it from
//! `requestAnimationFrame`. Natively it runs a headless scripted session.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::{Rc, Weak};
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, PointerEvent, TouchEvent};

    use glowfield::renderer::{RenderState, VertexBatch};
    use glowfield::sim::{FrameHandle, FrameScheduler};
    use glowfield::{Host, HostEvent, Settings};

    /// `requestAnimationFrame` behind the `FrameScheduler` trait
    struct RafScheduler {
        app: Weak<RefCell<App>>,
        next: u64,
        ids: HashMap<FrameHandle, i32>,
    }

    impl RafScheduler {
        fn fired(&mut self, handle: FrameHandle) {
            self.ids.remove(&handle);
        }
    }

    impl FrameScheduler for RafScheduler {
        fn request_frame(&mut self) -> FrameHandle {
            self.next += 1;
            let handle = FrameHandle(self.next);
            let app = self.app.clone();
            let callback = Closure::once_into_js(move |time: f64| {
                if let Some(app) = app.upgrade() {
                    app.borrow_mut().frame(handle, time);
                }
            });
            if let Some(window) = web_sys::window() {
                match window.request_animation_frame(callback.unchecked_ref()) {
                    Ok(id) => {
                        self.ids.insert(handle, id);
                    }
                    Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
                }
            }
            handle
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            if let Some(id) = self.ids.remove(&handle) {
                if let Some(window) = web_sys::window() {
                    let _ = window.cancel_animation_frame(id);
                }
            }
        }
    }

    /// Host plus the GPU state for its two canvases
    struct App {
        host: Host<VertexBatch, RafScheduler>,
        background: RenderState,
        overlay: RenderState,
        dpr: f32,
    }

    impl App {
        fn frame(&mut self, handle: FrameHandle, time: f64) {
            self.host.scheduler_mut().fired(handle);
            if !self.host.on_frame(handle, time) {
                return;
            }

            if let Some(batch) = self.host.background() {
                present(&mut self.background, batch, self.dpr);
            }
            if self.host.game().is_some() {
                if let Some(batch) = self.host.overlay() {
                    present(&mut self.overlay, batch, self.dpr);
                }
            }
            self.update_hud();
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if let (Some(el), Some(game)) = (document.get_element_by_id("game-score"), self.host.game()) {
                el.set_text_content(Some(&game.score.to_string()));
            }
        }
    }

    fn present(state: &mut RenderState, batch: &VertexBatch, dpr: f32) {
        match state.render(batch, dpr) {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost) => {
                state.resize(state.size.0, state.size.1);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of memory!");
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }
    }

    fn canvas(document: &web_sys::Document, id: &str) -> Result<HtmlCanvasElement, JsValue> {
        document
            .get_element_by_id(id)
            .ok_or_else(|| JsValue::from_str(&format!("no #{id} element")))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| JsValue::from_str(&format!("#{id} is not a canvas")))
    }

    /// Size the backing store to the CSS box times the device pixel ratio
    fn fit_canvas(canvas: &HtmlCanvasElement, dpr: f64) -> (u32, u32) {
        let width = ((canvas.client_width() as f64 * dpr) as u32).max(1);
        let height = ((canvas.client_height() as f64 * dpr) as u32).max(1);
        canvas.set_width(width);
        canvas.set_height(height);
        (width, height)
    }

    fn set_hidden(id: &str, hidden: bool) {
        let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        else {
            return;
        };
        let classes = el.class_list();
        let _ = if hidden { classes.add_1("hidden") } else { classes.remove_1("hidden") };
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        {
            el.set_text_content(Some(text));
        }
    }

    async fn render_state(
        instance: &wgpu::Instance,
        canvas: &HtmlCanvasElement,
        dpr: f64,
    ) -> Result<RenderState, JsValue> {
        let (width, height) = fit_canvas(canvas, dpr);
        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| JsValue::from_str(&format!("Failed to create surface: {e}")))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&format!("Failed to get adapter: {e}")))?;
        log::info!("Using adapter: {:?}", adapter.get_info().name);
        RenderState::new(surface, &adapter, width, height)
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Glowfield starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;
        let dpr = window.device_pixel_ratio();

        let trail_canvas = canvas(&document, "trail-canvas")?;
        let game_canvas = canvas(&document, "game-canvas")?;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });
        let background = render_state(&instance, &trail_canvas, dpr).await?;
        let overlay = render_state(&instance, &game_canvas, dpr).await?;

        let settings = Settings {
            seed: Some(js_sys::Date::now() as u64),
            ..Settings::default()
        };
        let css_w = trail_canvas.client_width() as f32;
        let css_h = trail_canvas.client_height() as f32;

        let app = Rc::new_cyclic(|weak: &Weak<RefCell<App>>| {
            let scheduler = RafScheduler {
                app: weak.clone(),
                next: 0,
                ids: HashMap::new(),
            };
            let host = Host::new(settings, scheduler, css_w, css_h)
                .with_background(VertexBatch::new())
                .with_overlay(VertexBatch::new());
            RefCell::new(App {
                host,
                background,
                overlay,
                dpr: dpr as f32,
            })
        });

        {
            let mut a = app.borrow_mut();
            a.host.subscribe(|event| match event {
                HostEvent::GameOpened(_) => {
                    set_hidden("game-overlay", false);
                    set_text("game-status", "Press Enter to start");
                }
                HostEvent::RoundStarted => set_text("game-status", ""),
                HostEvent::RoundEnded { phase, score } => {
                    set_text("game-status", &format!("{:?} with {} points - Enter to retry", phase, score));
                }
                HostEvent::GameClosed => set_hidden("game-overlay", true),
            });
            a.host.mount().map_err(|e| JsValue::from_str(&e.to_string()))?;
        }

        setup_input_handlers(&app)?;
        setup_activate_button(&app);

        log::info!("Glowfield running!");
        Ok(())
    }

    fn setup_input_handlers(app: &Rc<RefCell<App>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;

        // Pointer move / down feed the trail and click bursts
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                app.borrow_mut().host.pointer_move(event.client_x() as f32, event.client_y() as f32);
            });
            window.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                app.borrow_mut().host.pointer_down(event.client_x() as f32, event.client_y() as f32);
            });
            window.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Touch move
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if let Some(touch) = event.touches().get(0) {
                    app.borrow_mut().host.pointer_move(touch.client_x() as f32, touch.client_y() as f32);
                }
            });
            window.add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Keyboard
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut a = app.borrow_mut();
                // Keep arrows and space from scrolling the page while playing
                if a.host.game().is_some() {
                    event.prevent_default();
                }
                a.host.key_down(&event.code());
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                app.borrow_mut().host.key_up(&event.code());
            });
            window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Resize
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let Some(window) = web_sys::window() else {
                    return;
                };
                let dpr = window.device_pixel_ratio();
                let mut a = app.borrow_mut();
                a.dpr = dpr as f32;
                let Some(document) = window.document() else {
                    return;
                };
                if let Ok(trail) = canvas(&document, "trail-canvas") {
                    let (w, h) = fit_canvas(&trail, dpr);
                    a.background.resize(w, h);
                    a.host.resize(trail.client_width() as f32, trail.client_height() as f32);
                }
                if let Ok(game) = canvas(&document, "game-canvas") {
                    let (w, h) = fit_canvas(&game, dpr);
                    a.overlay.resize(w, h);
                }
            });
            window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    /// Optional on-page button that opens the game without the key sequence
    fn setup_activate_button(app: &Rc<RefCell<App>>) {
        let Some(btn) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("play-btn"))
        else {
            return;
        };
        let activator = app.borrow().host.activator();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            activator.activate();
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_app::run().await {
        log::error!("Glowfield failed to start: {:?}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Glowfield (native) starting...");
    log::info!("Native mode runs a headless demo - run with `trunk serve` for the web version");

    let settings = match std::env::args().nth(1) {
        Some(path) => load_settings(&path),
        None => glowfield::Settings::default(),
    };
    demo::run(settings);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn load_settings(path: &str) -> glowfield::Settings {
    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|json| glowfield::Settings::from_json(&json).map_err(|e| e.to_string()));
    match parsed {
        Ok(settings) => {
            log::info!("Loaded settings from {}", path);
            settings
        }
        Err(e) => {
            log::warn!("Using default settings ({}: {})", path, e);
            glowfield::Settings::default()
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glowfield::renderer::VertexBatch;
    use glowfield::sim::{GamePhase, ManualScheduler};
    use glowfield::{Host, HostEvent, Settings};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const MAX_FRAMES: u32 = 60 * 60;

    type DemoHost = Host<VertexBatch, ManualScheduler>;

    /// Fire every queued frame at `now`
    fn pump(host: &mut DemoHost, now: f64) {
        for handle in host.scheduler_mut().fire() {
            host.on_frame(handle, now);
        }
    }

    /// Chase the ball (breakout) or drift under the nearest enemy and shoot
    fn autopilot(host: &mut DemoHost) {
        let Some(game) = host.game() else {
            return;
        };
        let target = match game.ball {
            Some(ball) => ball.pos.x,
            None => game
                .enemies
                .iter()
                .map(|(_, e)| e.pos.x)
                .next()
                .unwrap_or(game.field().center().x),
        };
        let center = game.paddle.center_x();
        let fire = game.ball.is_none();
        let (press, release) = if target < center - 10.0 {
            ("ArrowLeft", "ArrowRight")
        } else if target > center + 10.0 {
            ("ArrowRight", "ArrowLeft")
        } else {
            host.key_up("ArrowLeft");
            host.key_up("ArrowRight");
            if fire {
                host.key_down("Space");
            }
            return;
        };
        host.key_up(release);
        host.key_down(press);
        if fire {
            host.key_down("Space");
        }
    }

    pub fn run(settings: Settings) {
        let mut host: DemoHost = Host::new(settings, ManualScheduler::new(), 1280.0, 720.0)
            .with_background(VertexBatch::new())
            .with_overlay(VertexBatch::new());

        let ended = Rc::new(RefCell::new(None));
        {
            let ended = ended.clone();
            host.subscribe(move |event| {
                log::info!("{:?}", event);
                if let HostEvent::RoundEnded { phase, score } = event {
                    *ended.borrow_mut() = Some((*phase, *score));
                }
            });
        }

        if let Err(e) = host.mount() {
            log::error!("Mount failed: {}", e);
            return;
        }

        // Sweep the pointer in a circle, then click
        let mut now = 0.0;
        for i in 0..90 {
            let a = i as f32 * 0.07;
            host.pointer_move(640.0 + a.cos() * 200.0, 360.0 + a.sin() * 200.0);
            pump(&mut host, now);
            now += FRAME_MS;
        }
        host.pointer_down(640.0, 360.0);
        log::info!(
            "Visualizer: {} dust, {} trail points, {} links, {} vertices",
            host.visualizer().ambient().len(),
            host.visualizer().trail().len(),
            host.visualizer().links().len(),
            host.background().map_or(0, |b| b.len())
        );

        // The secret sequence opens the game
        let codes = [
            "ArrowUp", "ArrowUp", "ArrowDown", "ArrowDown", "ArrowLeft", "ArrowRight", "ArrowLeft", "ArrowRight",
            "KeyB", "KeyA",
        ];
        for code in codes {
            host.key_down(code);
            host.key_up(code);
        }
        host.key_down("Enter");

        let mut frames = 0;
        while frames < MAX_FRAMES && ended.borrow().is_none() {
            autopilot(&mut host);
            pump(&mut host, now);
            now += FRAME_MS;
            frames += 1;
        }

        match *ended.borrow() {
            Some((phase, score)) => log::info!("Round ended after {} frames: {:?}, score {}", frames, phase, score),
            None => {
                let (phase, score) = host.game().map_or((GamePhase::Idle, 0), |g| (g.phase, g.score));
                log::info!("Stopped after {} frames: {:?}, score {}", frames, phase, score);
            }
        }
        host.unmount();
    }
}
