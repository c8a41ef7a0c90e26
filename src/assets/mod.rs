//! Game data archives
//!
//! The engine reads its data from `baseq3/*.pk3` (plain zip archives) under
//! the home directory. The native menu needs a few images out of them as
//! loose files, which [`extract`] pulls out once.

pub mod extract;

pub use extract::{
    extract_entry, extract_menu_assets, has_base_game, menu_asset_requests, AssetRequest,
    ExtractError, ExtractOutcome, ExtractReport, BASE_ARCHIVE, BASE_GAME_DIR, TEAM_ARCHIVE,
};
