//! Rolling Cube entry point
//!
//! Handles platform-specific initialization. The browser build exposes the
//! session to the page through `wasm-bindgen`; the native build runs a
//! headless demo game in the terminal.

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use serde::Serialize;
    use wasm_bindgen::prelude::*;

    use rolling_cube::GameConfig;
    use rolling_cube::sim::{Cube, Direction, Session};

    /// What the page needs to place one cube mesh
    #[derive(Serialize)]
    struct CubeView {
        x: i32,
        y: i32,
        top: u8,
        bottom: u8,
        world: glam::Vec3,
        roll_angle: f32,
        rolling: bool,
        teleporting: bool,
    }

    fn to_js(err: impl std::fmt::Display) -> JsValue {
        JsValue::from_str(&err.to_string())
    }

    /// Game instance handed to JavaScript
    #[wasm_bindgen]
    pub struct WasmGame {
        session: Session,
    }

    #[wasm_bindgen]
    impl WasmGame {
        /// New running game on the default config, seeded from the clock
        #[wasm_bindgen(constructor)]
        pub fn new() -> Result<WasmGame, JsValue> {
            Self::with_config(GameConfig::default())
        }

        /// New running game from a (partial) JSON config
        pub fn from_config_json(json: &str) -> Result<WasmGame, JsValue> {
            Self::with_config(GameConfig::from_json(json).map_err(to_js)?)
        }

        /// Accepts "up", "down", "left", "right" relative to the view
        pub fn request_move(&mut self, direction: &str) -> bool {
            match direction.parse::<Direction>() {
                Ok(d) => self.session.request_move(d),
                Err(e) => {
                    log::warn!("{e}");
                    false
                }
            }
        }

        /// Feed frame time in seconds; returns steps simulated
        pub fn update(&mut self, dt: f32) -> u32 {
            self.session.update(dt)
        }

        pub fn restart(&mut self) {
            self.session.start();
        }

        pub fn set_camera_yaw(&mut self, yaw: f32) {
            self.session.camera.set_yaw(yaw);
        }

        pub fn camera_yaw(&self) -> f32 {
            self.session.camera.yaw()
        }

        pub fn rotate_camera_left(&mut self) {
            self.session.camera.rotate_left();
        }

        pub fn rotate_camera_right(&mut self) {
            self.session.camera.rotate_right();
        }

        /// [width, height]
        pub fn board_size(&self) -> Vec<i32> {
            let (w, h) = self.session.board.size();
            vec![w, h]
        }

        /// Board layout as JSON (targets and obstacles)
        pub fn board_state(&self) -> Result<String, JsValue> {
            serde_json::to_string(&self.session.board).map_err(to_js)
        }

        pub fn player_state(&self) -> Result<String, JsValue> {
            serde_json::to_string(&self.view(&self.session.player)).map_err(to_js)
        }

        pub fn enemy_states(&self) -> Result<String, JsValue> {
            let views: Vec<CubeView> = self.session.enemies.iter().map(|e| self.view(e)).collect();
            serde_json::to_string(&views).map_err(to_js)
        }

        pub fn collected_count(&self) -> u32 {
            self.session.collected_count() as u32
        }

        pub fn target_count(&self) -> u32 {
            self.session.board.target_cell_count() as u32
        }

        pub fn is_active(&self) -> bool {
            self.session.is_active()
        }

        /// Pending events as a JSON array, oldest first
        pub fn drain_events(&mut self) -> Result<String, JsValue> {
            serde_json::to_string(&self.session.drain_events()).map_err(to_js)
        }
    }

    impl WasmGame {
        fn with_config(mut config: GameConfig) -> Result<WasmGame, JsValue> {
            config.seed = js_sys::Date::now() as u64;
            let mut session = Session::from_config(config).map_err(to_js)?;
            session.start();
            log::info!("Session ready, seed {}", session.config.seed);
            Ok(WasmGame { session })
        }

        fn view(&self, cube: &Cube) -> CubeView {
            CubeView {
                x: cube.position.x,
                y: cube.position.y,
                top: cube.top_value(),
                bottom: cube.bottom_value(),
                world: cube.world_position(&self.session.board),
                roll_angle: cube.rotation_angle_deg(),
                rolling: cube.is_rotating(),
                teleporting: cube.is_teleporting(),
            }
        }
    }

    pub fn init() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            return;
        }
        log::info!("Rolling Cube starting...");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::init();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use rolling_cube::GameConfig;
    use rolling_cube::sim::random::{RandomSource, pick};
    use rolling_cube::sim::{BattleReport, CellKind, Direction, GameObserver, Position, Session};

    /// Moves the demo attempts before giving up
    const MAX_MOVES: u32 = 400;

    #[derive(Default)]
    struct Scoreboard {
        turns: u32,
        battles: u32,
        completed: bool,
    }

    impl GameObserver for Scoreboard {
        fn on_turn_completed(&mut self) {
            self.turns += 1;
        }

        fn on_collected_count_changed(&mut self, count: u32) {
            println!("  collected {count} after {} turns", self.turns);
        }

        fn on_game_completed(&mut self) {
            self.completed = true;
        }

        fn on_battle(&mut self, _report: &BattleReport) {
            self.battles += 1;
        }
    }

    fn load_config() -> Result<GameConfig, Box<dyn std::error::Error>> {
        let mut args = std::env::args().skip(1);
        let mut config = match args.next() {
            Some(path) => GameConfig::from_json(&std::fs::read_to_string(path)?)?,
            None => GameConfig::default(),
        };
        if let Some(seed) = args.next() {
            config.seed = seed.parse()?;
        }
        Ok(config)
    }

    /// ASCII view of the board, top row first
    fn render(session: &Session) -> String {
        let (w, h) = session.board.size();
        let mut out = String::new();
        for y in (0..h).rev() {
            for x in 0..w {
                let pos = Position::new(x, y);
                let glyph = if session.player.position == pos {
                    'P'
                } else if session.enemies.iter().any(|e| e.position == pos) {
                    'E'
                } else {
                    match session.board.cell(pos) {
                        Some(CellKind::Obstacle) => '#',
                        Some(CellKind::Target(v)) if !session.state.collected.contains(&v) => {
                            char::from(b'0' + v)
                        }
                        _ => '.',
                    }
                };
                out.push(glyph);
                out.push(' ');
            }
            out.push('\n');
        }
        out
    }

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        let config = load_config()?;
        let seed = config.seed;
        let mut session = Session::from_config(config)?;
        session.start();
        let mut input = Pcg32::seed_from_u64(seed ^ 0x5eed);

        println!("Seed {seed}");
        print!("{}", render(&session));

        let mut board = Scoreboard::default();
        let mut attempts = 0;
        while session.is_active() && attempts < MAX_MOVES {
            attempts += 1;
            // Random first choice, then the fixed order as fallback
            let first = pick(&Direction::ALL, &mut input);
            let accepted = first
                .into_iter()
                .chain(Direction::ALL)
                .any(|d| session.request_move(d));
            if !accepted {
                log::warn!("Player is boxed in, stopping");
                break;
            }

            let mut guard = 0;
            while session.is_busy() && guard < 1000 {
                session.tick();
                guard += 1;
            }
            session.dispatch(&mut board);

            if input.next_index(40) == 0 {
                session.camera.rotate_left();
            }
        }

        println!();
        print!("{}", render(&session));
        println!(
            "{} after {} turns: {}/{} collected, {} battles ({} won, {} lost)",
            if board.completed { "Finished" } else { "Stopped" },
            board.turns,
            session.collected_count(),
            session.board.target_cell_count(),
            board.battles,
            session.state.player_wins,
            session.state.enemy_wins
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Rolling Cube (native) starting...");

    if let Err(e) = demo::run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
