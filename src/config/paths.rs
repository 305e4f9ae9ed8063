//! Default Steam locations for Starbound.
//!
//! Single source of truth for where the game and its workshop cache live
//! when nothing else is configured.
//!
//! ## Layout
//!
//! | Location | Path |
//! |----------|------|
//! | Game | `<steam>/steamapps/common/Starbound` |
//! | Mods folder | `<game>/mods` |
//! | Workshop cache | `<steam>/steamapps/workshop/content/211820` |

use std::path::{Path, PathBuf};

/// Starbound's Steam app id
pub const STARBOUND_APP_ID: u32 = 211820;

/// Default game directory for the current platform
pub fn default_game_dir() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(r"C:\Program Files (x86)\Steam\steamapps\common\Starbound")
    } else {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));
        let steam = if cfg!(target_os = "macos") {
            home.join("Library/Application Support/Steam")
        } else {
            home.join(".steam/steam")
        };
        steam.join("steamapps").join("common").join("Starbound")
    }
}

/// Mods folder inside a game directory
pub fn mods_dir(game_dir: &Path) -> PathBuf {
    game_dir.join("mods")
}

/// Workshop cache for `app_id`, a sibling of `steamapps/common`
pub fn workshop_dir(game_dir: &Path, app_id: u32) -> PathBuf {
    let steamapps = game_dir
        .parent()
        .and_then(Path::parent)
        .unwrap_or(game_dir);
    steamapps
        .join("workshop")
        .join("content")
        .join(app_id.to_string())
}
