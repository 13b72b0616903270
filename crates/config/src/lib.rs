// Configuration loading

pub mod keymap;
pub mod settings;

pub use keymap::{load_key_map, KeyMapLoad, LoadStatus};
pub use settings::Settings;
