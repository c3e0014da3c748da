//! Brick Breaker 3D entry point
//!
//! Handles platform-specific initialization and runs the game loop. The
//! browser build hands each frame's scene to a JS renderer; the native build
//! runs a headless autopilot session.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{KeyboardEvent, MouseEvent};

    use brick_breaker_3d::consts::*;
    use brick_breaker_3d::platform::InputState;
    use brick_breaker_3d::scene;
    use brick_breaker_3d::settings::Settings;
    use brick_breaker_3d::sim::{GamePhase, GameState, tick};

    // Bridge to the page's renderer and settings store
    #[wasm_bindgen(inline_js = "
        export function publish_frame(instances, trajectory, clear_color, events) {
            const renderer = window.brickBreakerRenderer;
            if (renderer) {
                renderer.draw(instances, trajectory, clear_color, JSON.parse(events));
            }
        }

        export function stored_settings() {
            try {
                return window.localStorage.getItem('brick_breaker_settings');
            } catch (e) {
                return null;
            }
        }
    ")]
    extern "C" {
        fn publish_frame(
            instances: &[f32],
            trajectory: &[f32],
            clear_color: &[f32],
            events: &str,
        );
        fn stored_settings() -> Option<String>;
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        accumulator: f64,
        last_time: f64,
        input: InputState,
    }

    impl Game {
        fn new(state: GameState) -> Self {
            let input = InputState::new(state.settings.control);
            Self {
                state,
                accumulator: 0.0,
                last_time: 0.0,
                input,
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt_ms: f64) {
            self.accumulator += dt_ms.min(100.0);

            let mut substeps = 0;
            while self.accumulator >= SIM_DT_MS && substeps < MAX_SUBSTEPS {
                let input = self.input.to_tick_input();
                tick(&mut self.state, &input, SIM_DT_MS);
                self.accumulator -= SIM_DT_MS;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.clear_one_shots();
            }
            if substeps == MAX_SUBSTEPS {
                self.accumulator = self.accumulator.min(SIM_DT_MS);
            }
            self.state.settings.control = self.input.control;
        }

        /// Hand the frame to the renderer
        fn render(&mut self) {
            let frame = scene::build(&self.state);
            let trajectory: Vec<f32> = frame
                .trajectory
                .iter()
                .flat_map(|p| p.to_array())
                .collect();
            let events = self.state.drain_events();
            let events = serde_json::to_string(&events).unwrap_or_else(|e| {
                log::warn!("Failed to serialize events: {}", e);
                "[]".to_string()
            });
            publish_frame(frame.as_floats(), &trajectory, &frame.clear_color, &events);
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if let Some(el) = document.query_selector("#hud-score .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.state.score.to_string()));
            }
            if let Some(el) = document.query_selector("#hud-level .hud-value").ok().flatten() {
                let def = self.state.level_def();
                el.set_text_content(Some(&format!("{} - {}", self.state.level, def.name)));
            }
            if let Some(el) = document.query_selector("#hud-streak .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.state.hit_streak.to_string()));
            }

            let overlays = [
                ("start-prompt", GamePhase::WaitingForStart),
                ("pause-menu", GamePhase::Paused),
                ("level-complete", GamePhase::LevelComplete),
                ("game-over", GamePhase::GameOver),
            ];
            for (id, phase) in overlays {
                if let Some(el) = document.get_element_by_id(id) {
                    let class = if self.state.phase == phase { "" } else { "hidden" };
                    let _ = el.set_attribute("class", class);
                }
            }
        }
    }

    fn load_settings() -> Settings {
        let Some(json) = stored_settings() else {
            return Settings::default();
        };
        Settings::from_json(&json).unwrap_or_else(|e| {
            log::warn!("Ignoring stored settings: {}", e);
            Settings::default()
        })
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Brick Breaker 3D starting...");

        let settings = load_settings();
        let seed = settings.seed_or(js_sys::Date::now() as u64);
        let state =
            GameState::new(settings, seed).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let game = Rc::new(RefCell::new(Game::new(state)));

        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(game.clone())?;
        request_animation_frame(game);

        log::info!("Brick Breaker 3D running!");
        Ok(())
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas = document.get_element_by_id("canvas").ok_or("no canvas")?;

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if game.borrow_mut().input.key_down(&event.key()) {
                    event.prevent_default();
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().input.key_up(&event.key());
            });
            window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Mouse move - absolute position over the canvas
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let w = canvas_clone.client_width().max(1) as f32;
                let h = canvas_clone.client_height().max(1) as f32;
                let nx = event.offset_x() as f32 / w * 2.0 - 1.0;
                let ny = event.offset_y() as f32 / h * 2.0 - 1.0;
                game.borrow_mut().input.pointer_moved(nx, ny);
            });
            canvas.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Mouse click - start / continue
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().input.pointer_pressed();
            });
            canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Window blur (click outside) pauses a running game
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                if g.state.phase == GamePhase::Playing {
                    g.input.request_pause();
                    log::info!("Auto-paused (window blur)");
                }
            });
            window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            log::error!("No window; game loop stopped");
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                time - g.last_time
            } else {
                SIM_DT_MS
            };
            g.last_time = time;

            g.update(dt);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Simulated seconds for the headless demo run
#[cfg(not(target_arch = "wasm32"))]
const DEMO_SECONDS: u32 = 120;

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), brick_breaker_3d::ConfigError> {
    use std::time::{SystemTime, UNIX_EPOCH};

    use brick_breaker_3d::consts::SIM_DT_MS;
    use brick_breaker_3d::settings::Settings;
    use brick_breaker_3d::sim::{GameState, TickInput, tick};

    env_logger::init();
    log::info!("Brick Breaker 3D (native) starting headless autopilot run...");

    // Usage: brick-breaker-3d [settings.json] [--progression=wrap|cap]
    let mut settings = Settings::default();
    let mut progression = None;
    for arg in std::env::args().skip(1) {
        match arg.strip_prefix("--progression=") {
            Some(name) => progression = Some(name.to_string()),
            None => settings = Settings::from_json(&std::fs::read_to_string(arg)?)?,
        }
    }
    if let Some(name) = progression {
        settings.set_progression(&name)?;
    }
    let clock = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();
    let seed = settings.seed_or(clock);
    let mut state = GameState::new(settings, seed)?;
    log::info!("Seed: {}", seed);

    let input = TickInput {
        autopilot: true,
        ..TickInput::default()
    };
    let ticks = (DEMO_SECONDS as f64 * 1000.0 / SIM_DT_MS) as u32;
    for _ in 0..ticks {
        tick(&mut state, &input, SIM_DT_MS);
        for event in state.drain_events().into_iter().filter(|e| e.is_major()) {
            log::info!("{:?}", event);
        }
    }

    log::info!(
        "Finished: level {} ({}), score {}, phase {:?}",
        state.level,
        state.level_def().name,
        state.score,
        state.phase
    );
    Ok(())
}
