#![deny(warnings)]
pub mod game;
pub mod model;
pub mod score;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "beatdeck"
    }

    pub const fn title() -> &'static str {
        "Beat the Deck"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
