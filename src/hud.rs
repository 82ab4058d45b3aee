//! HUD text and panel visibility
//!
//! Computed from state each frame; the DOM side only copies it over.

use crate::sim::{GamePhase, GameState};

/// Seconds with one decimal, as shown on the HUD and game-over panel
pub fn format_seconds(secs: f32) -> String {
    format!("{:.1}", secs)
}

/// Speed rounded to the nearest whole px/s
pub fn format_speed(speed: f32) -> String {
    format!("{}", speed.round() as i64)
}

/// What the HUD should show this frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HudSnapshot {
    pub time_text: String,
    pub speed_text: String,
    pub menu_visible: bool,
    pub game_over_visible: bool,
    /// Final time, only while the game-over panel is up
    pub final_time_text: Option<String>,
}

impl HudSnapshot {
    pub fn from_state(state: &GameState) -> Self {
        let game_over = state.phase == GamePhase::GameOver;
        Self {
            time_text: format_seconds(state.time),
            speed_text: format_speed(state.speed),
            menu_visible: state.phase == GamePhase::Menu,
            game_over_visible: game_over,
            final_time_text: state
                .final_time
                .filter(|_| game_over)
                .map(format_seconds),
        }
    }
}
