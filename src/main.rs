//! Lane Rush entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlCanvasElement};

    use lane_rush::Tuning;
    use lane_rush::audio::{AudioManager, AudioParams};
    use lane_rush::clock::FrameClock;
    use lane_rush::hud::HudSnapshot;
    use lane_rush::input::HeldKeys;
    use lane_rush::renderer::{RenderState, build_scene};
    use lane_rush::sim::{GameEvent, GameState, start_run, tick};

    /// DOM nodes the HUD writes to
    struct Hud {
        time: Element,
        speed: Element,
        menu: Element,
        game_over: Element,
        final_time: Element,
        last: Option<HudSnapshot>,
    }

    impl Hud {
        fn from_document(document: &Document) -> Result<Self, JsValue> {
            Ok(Self {
                time: element(document, "time")?,
                speed: element(document, "speed")?,
                menu: element(document, "menu")?,
                game_over: element(document, "gameover")?,
                final_time: element(document, "finalTime")?,
                last: None,
            })
        }

        /// Copy a snapshot into the DOM, skipping unchanged frames
        fn apply(&mut self, snap: HudSnapshot) {
            if self.last.as_ref() == Some(&snap) {
                return;
            }
            self.time.set_text_content(Some(&snap.time_text));
            self.speed.set_text_content(Some(&snap.speed_text));
            let _ = self
                .menu
                .class_list()
                .toggle_with_force("hidden", !snap.menu_visible);
            let _ = self
                .game_over
                .class_list()
                .toggle_with_force("hidden", !snap.game_over_visible);
            if let Some(text) = &snap.final_time_text {
                self.final_time.set_text_content(Some(text));
            }
            self.last = Some(snap);
        }
    }

    fn element(document: &Document, id: &str) -> Result<Element, JsValue> {
        document
            .get_element_by_id(id)
            .ok_or_else(|| JsValue::from_str(&format!("missing element #{id}")))
    }

    fn new_seed() -> u64 {
        js_sys::Date::now() as u64
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        render_state: Option<RenderState>,
        /// Created on the first Play click (needs a user gesture)
        audio: Option<AudioManager>,
        keys: HeldKeys,
        clock: FrameClock,
        hud: Hud,
    }

    impl Game {
        fn frame(&mut self, now_ms: f64) {
            let dt = self.clock.advance(now_ms);
            let input = self.keys.tick_input();
            tick(&mut self.state, &input, dt);

            for event in self.state.drain_events() {
                if let GameEvent::Crashed { .. } = event
                    && let Some(audio) = &self.audio
                {
                    audio.play_crash();
                }
            }

            if let Some(audio) = &mut self.audio {
                audio.update(&AudioParams::compute(
                    self.state.engine_ratio(),
                    self.state.is_running(),
                    self.state.time,
                ));
                audio.advance_music(dt);
            }

            self.render();
            self.hud.apply(HudSnapshot::from_state(&self.state));
        }

        fn render(&mut self) {
            let Some(render_state) = &mut self.render_state else {
                return;
            };
            match render_state.render(&build_scene(&self.state)) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost) => {
                    render_state.reconfigure();
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        fn start(&mut self) {
            if let Some(audio) = &self.audio {
                audio.resume();
            }
            start_run(&mut self.state, new_seed());
        }
    }

    pub async fn run() -> Result<(), JsValue> {
        log::info!("Lane Rush starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = element(&document, "game")?.dyn_into()?;

        // The canvas attributes define the playfield; the backing store is
        // scaled up for sharp output on high-DPI screens
        let mut tuning = Tuning {
            canvas_width: canvas.width() as f32,
            canvas_height: canvas.height() as f32,
            ..Tuning::default()
        };
        if let Err(e) = tuning.validate() {
            log::warn!("Canvas size unusable ({}), using defaults", e);
            tuning = Tuning::default();
            canvas.set_width(tuning.canvas_width as u32);
            canvas.set_height(tuning.canvas_height as u32);
        }
        let dpr = window.device_pixel_ratio();
        let width = (canvas.width() as f64 * dpr) as u32;
        let height = (canvas.height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = new_seed();
        let canvas_size = (tuning.canvas_width, tuning.canvas_height);
        let game = Rc::new(RefCell::new(Game {
            state: GameState::new(seed, tuning),
            render_state: None,
            audio: None,
            keys: HeldKeys::new(),
            clock: FrameClock::new(),
            hud: Hud::from_document(&document)?,
        }));
        log::info!("Game initialized with seed: {}", seed);

        match init_gpu(canvas, width, height, canvas_size).await {
            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
            Err(e) => log::error!("WebGPU unavailable, rendering disabled: {:?}", e),
        }

        setup_input_handlers(game.clone())?;
        setup_buttons(&document, game.clone())?;
        setup_visibility(&document, game.clone());

        request_animation_frame(game);

        log::info!("Lane Rush running!");
        Ok(())
    }

    async fn init_gpu(
        canvas: HtmlCanvasElement,
        width: u32,
        height: u32,
        canvas_size: (f32, f32),
    ) -> Result<RenderState, JsValue> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        RenderState::new(surface, &adapter, width, height, canvas_size)
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;

        // Keyboard: keydown adds to the held set, keyup removes
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if game.borrow_mut().keys.press(&event.key()) {
                    event.prevent_default();
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                game.borrow_mut().keys.release(&event.key());
            });
            window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Window blur: keyups will never arrive for keys held at this point
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().keys.clear();
            });
            window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = game.borrow_mut();
                if g.audio.is_none() {
                    g.audio = Some(AudioManager::new());
                }
                g.start();
            });
            element(document, "playBtn")?
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().start();
            });
            element(document, "restartBtn")?
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn setup_visibility(document: &Document, game: Rc<RefCell<Game>>) {
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let hidden = document_clone.visibility_state() == web_sys::VisibilityState::Hidden;
            let mut g = game.borrow_mut();
            if let Some(audio) = &mut g.audio {
                audio.set_muted(hidden);
            }
            if hidden {
                // rAF pauses while hidden; don't count the gap as a frame
                g.clock.reset();
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().frame(time);
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    if let Err(e) = wasm_game::run().await {
        log::error!("Startup failed: {:?}", e);
    }
}

/// Longest headless demo run (seconds of game time)
#[cfg(not(target_arch = "wasm32"))]
const DEMO_TIME_LIMIT: f32 = 180.0;

/// Headless run: the autopilot drives until it crashes or time runs out.
///
/// Usage: `lane-rush [seed] [tuning.json]`
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use lane_rush::consts::DEMO_DT;
    use lane_rush::hud::format_seconds;
    use lane_rush::sim::{GameEvent, GameState, autopilot, start_run, tick};

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = match args.next() {
        Some(arg) => arg.parse().unwrap_or_else(|_| {
            log::warn!("Invalid seed {:?}, using 1", arg);
            1
        }),
        None => 1,
    };
    let tuning = args.next().map(|path| load_tuning(&path)).unwrap_or_default();

    log::info!("Lane Rush (native) demo run, seed {}", seed);

    let mut state = GameState::new(seed, tuning);
    start_run(&mut state, seed);

    let mut spawned = 0;
    while state.is_running() && state.time < DEMO_TIME_LIMIT {
        let input = autopilot::drive(&state);
        tick(&mut state, &input, DEMO_DT);

        for event in state.drain_events() {
            match event {
                GameEvent::Spawned { .. } => spawned += 1,
                GameEvent::Crashed { time, kind } => {
                    log::info!("Crashed into {:?} at {}s", kind, format_seconds(time));
                }
                GameEvent::RunStarted { .. } => {}
            }
        }
    }

    match state.final_time {
        Some(time) => println!(
            "Seed {}: crashed after {}s ({} spawned)",
            seed,
            format_seconds(time),
            spawned
        ),
        None => println!(
            "Seed {}: survived the full {}s ({} spawned)",
            seed,
            format_seconds(state.time),
            spawned
        ),
    }
}

/// Read tuning overrides from a JSON file, falling back to defaults
#[cfg(not(target_arch = "wasm32"))]
fn load_tuning(path: &str) -> lane_rush::Tuning {
    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|json| lane_rush::Tuning::from_json(&json).map_err(|e| e.to_string()));
    match parsed {
        Ok(tuning) => {
            log::info!("Loaded tuning from {}", path);
            tuning
        }
        Err(e) => {
            log::warn!("Could not load tuning from {}: {}", path, e);
            lane_rush::Tuning::default()
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
