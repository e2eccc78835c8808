//! Browser bindings
//!
//! The page owns rendering, input listeners and the realtime socket; it
//! drives a [`WebGame`] from `requestAnimationFrame` and forwards channel
//! messages into it.

use wasm_bindgen::prelude::*;

use crate::Settings;
use crate::net::PeerMessage;
use crate::scoreboard::Scoreboard;
use crate::sim::{EventKind, GameEvent, GameSession, JumpReport};

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialised".into());
    }
    log::info!("Jump Cube core loaded");
}

#[wasm_bindgen]
pub struct WebGame {
    session: GameSession,
}

#[wasm_bindgen]
impl WebGame {
    /// A new game; a given `player_name` replaces and persists the stored one
    #[wasm_bindgen(constructor)]
    pub fn new(player_name: Option<String>) -> WebGame {
        let mut settings = Settings::load();
        if player_name.is_some() && player_name != settings.player_name {
            settings.player_name = player_name;
            if let Err(e) = settings.save() {
                log::warn!("Failed to save settings: {e}");
            }
        }
        WebGame {
            session: GameSession::new(settings, 0.0),
        }
    }

    pub fn start(&mut self, room: &str) -> Result<(), JsError> {
        Ok(self.session.start(room)?)
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    pub fn input_down(&mut self) {
        self.session.on_input_down();
    }

    pub fn input_up(&mut self) {
        self.session.on_input_up();
    }

    pub fn tick(&mut self, dt: f64) {
        self.session.tick(dt);
    }

    pub fn score(&self) -> u32 {
        self.session.score()
    }

    pub fn phase(&self) -> String {
        format!("{:?}", self.session.phase())
    }

    /// Call `callback` with the event payload every time `name` fires
    ///
    /// Numbers stay numbers, colours are `#rrggbb` strings and jump reports
    /// are JSON text.
    pub fn on(&mut self, name: &str, callback: js_sys::Function) -> Result<(), JsError> {
        let kind: EventKind = name.parse()?;
        self.session.subscribe(kind, move |event| {
            let payload = payload(event);
            if let Err(e) = callback.call1(&JsValue::NULL, &payload) {
                log::warn!("{} handler threw: {e:?}", kind.as_str());
            }
        });
        Ok(())
    }

    /// Feed a message received on the realtime channel
    pub fn peer_message(&mut self, event: &str, payload: &str) -> Result<(), JsError> {
        let message = PeerMessage::decode(event, payload)?;
        self.session.on_peer_message(&message);
        Ok(())
    }

    /// Channel payload for a `jump` event report, `undefined` outside a room
    pub fn announce_jump(&self, report: &str) -> Result<Option<String>, JsError> {
        let report: JumpReport = serde_json::from_str(report)?;
        Ok(self.session.announce_jump(&report).map(|m| m.encode()).transpose()?.map(|(_, json)| json))
    }

    pub fn announce_score(&self) -> Result<Option<String>, JsError> {
        Ok(self.session.announce_score().map(|m| m.encode()).transpose()?.map(|(_, json)| json))
    }

    pub fn announce_fall(&self) -> Result<Option<String>, JsError> {
        Ok(self.session.announce_fall().map(|m| m.encode()).transpose()?.map(|(_, json)| json))
    }

    /// Live blocks as JSON, oldest first
    pub fn blocks_json(&self) -> Result<String, JsError> {
        let blocks: Vec<_> = self.session.chain().iter().collect();
        Ok(serde_json::to_string(&blocks)?)
    }

    /// Hero root, head and body placement as a flat array:
    /// position, rotation, head offset, body offset, body scale
    pub fn hero_pose(&self) -> Vec<f64> {
        let hero = self.session.hero();
        [hero.position, hero.rotation, hero.head_offset, hero.body_offset, hero.body_scale]
            .iter()
            .flat_map(|v| v.to_array())
            .collect()
    }

    /// Ghosts in world coordinates as JSON, in spawn order
    pub fn ghosts_json(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.session.world().ghost_poses())?)
    }

    /// Latest score of every other player in the room as a JSON object
    pub fn peers_json(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(self.session.peers())?)
    }

    /// Billboard JSON from a score service response, with this run folded in
    pub fn billboard_json(&self, response: &str) -> Result<String, JsError> {
        let mut board = Scoreboard::from_json(response)?;
        if let Some(name) = self.session.settings().player_name.as_deref() {
            board.record(name, self.session.score());
        }
        Ok(serde_json::to_string(board.billboard())?)
    }

    /// 1-indexed rank a score would take in a score service response
    pub fn potential_rank(&self, response: &str, score: u32) -> Result<usize, JsError> {
        Ok(Scoreboard::from_json(response)?.potential_rank(score))
    }

    pub fn task_count(&self) -> usize {
        self.session.task_count()
    }
}

fn payload(event: &GameEvent) -> JsValue {
    match event {
        GameEvent::Score(score) => JsValue::from(*score),
        GameEvent::Color(color) | GameEvent::GameOver(color) => JsValue::from_str(&color.to_hex()),
        GameEvent::Down | GameEvent::Up => JsValue::UNDEFINED,
        GameEvent::Jump(report) => match serde_json::to_string(report) {
            Ok(json) => JsValue::from_str(&json),
            Err(e) => {
                log::warn!("Failed to encode jump report: {e}");
                JsValue::UNDEFINED
            }
        },
        GameEvent::Energy(ratio) => JsValue::from_f64(*ratio),
        GameEvent::BlockPlaced(id) | GameEvent::BlockRemoved(id) => JsValue::from(*id),
    }
}
