//! Loose-file extraction from pk3 archives

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use zip::result::ZipError;
use zip::ZipArchive;

pub const BASE_GAME_DIR: &str = "baseq3";
pub const BASE_ARCHIVE: &str = "baseq3/pak0.pk3";
pub const TEAM_ARCHIVE: &str = "baseq3/pak2.pk3";

/// Directory under the home directory that receives menu images
const GRAPHICS_DIR: &str = "graphics";

const LEVELSHOT_MAPS: &[&str] = &[
    "Q3CTF1", "Q3CTF2", "Q3CTF3", "Q3CTF4", "Q3DM0", "Q3DM1", "Q3DM2", "Q3DM3", "Q3DM4", "Q3DM5",
    "Q3DM6", "Q3DM7", "Q3DM8", "Q3DM9", "Q3DM10", "Q3DM11", "Q3DM12", "Q3DM13", "Q3DM14",
    "Q3DM15", "Q3DM16", "Q3DM17", "Q3DM18", "Q3DM19", "Q3TOURNEY1", "Q3TOURNEY2", "Q3TOURNEY3",
    "Q3TOURNEY4", "Q3TOURNEY5", "Q3TOURNEY6",
];

const BASE_PLAYER_ICONS: &[&str] = &["icon_blue", "icon_default", "icon_red"];

const TEAM_PLAYERS: &[&str] = &["brandon", "carmack", "cash", "paulj", "tim", "xian"];

const SKILL_LEVELS: std::ops::RangeInclusive<u32> = 1..=5;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("archive {0} does not exist")]
    MissingArchive(PathBuf),

    #[error("archive {archive} has no entry {entry:?}")]
    MissingEntry { archive: PathBuf, entry: String },

    #[error("failed to read archive {archive}: {source}")]
    Archive {
        archive: PathBuf,
        #[source]
        source: ZipError,
    },

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractOutcome {
    Extracted,
    AlreadyPresent,
}

/// Copy one archive entry to `destination`
///
/// Does nothing when `destination` already exists. Parent directories are
/// created as needed and the file only appears once it is complete.
pub fn extract_entry(
    archive: &Path,
    entry: &str,
    destination: &Path,
) -> Result<ExtractOutcome, ExtractError> {
    if destination.exists() {
        return Ok(ExtractOutcome::AlreadyPresent);
    }
    if !archive.is_file() {
        return Err(ExtractError::MissingArchive(archive.to_path_buf()));
    }

    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: io::Error| ExtractError::Io { path, source }
    };
    let archive_err = |source: ZipError| match source {
        ZipError::FileNotFound => ExtractError::MissingEntry {
            archive: archive.to_path_buf(),
            entry: entry.to_string(),
        },
        source => ExtractError::Archive {
            archive: archive.to_path_buf(),
            source,
        },
    };

    let file = fs::File::open(archive).map_err(io_err(archive))?;
    let mut zip = ZipArchive::new(file).map_err(archive_err)?;
    let mut reader = zip.by_name(entry).map_err(archive_err)?;

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(io_err(parent))?;
    }

    let partial = destination.with_extension("part");
    let copied = fs::File::create(&partial)
        .and_then(|mut out| io::copy(&mut reader, &mut out))
        .and_then(|_| fs::rename(&partial, destination));
    if let Err(source) = copied {
        let _ = fs::remove_file(&partial);
        return Err(ExtractError::Io {
            path: destination.to_path_buf(),
            source,
        });
    }

    log::debug!("Extracted {} from {}", entry, archive.display());
    Ok(ExtractOutcome::Extracted)
}

/// True when the home directory holds the base game data
pub fn has_base_game(home: &Path) -> bool {
    home.join(BASE_GAME_DIR).is_dir() && home.join(BASE_ARCHIVE).is_file()
}

/// One entry to pull out of an archive, relative to the home directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub archive: &'static str,
    pub entry: String,
    pub destination: String,
}

impl AssetRequest {
    fn new(archive: &'static str, entry: String, destination: String) -> Self {
        Self {
            archive,
            entry,
            destination,
        }
    }
}

/// Images the menu shows: level shots, player and skill icons
///
/// Player icons for the team arena characters are only requested when
/// `baseq3/pak2.pk3` exists.
pub fn menu_asset_requests(home: &Path) -> Vec<AssetRequest> {
    let mut requests = Vec::new();

    for map in LEVELSHOT_MAPS {
        requests.push(AssetRequest::new(
            BASE_ARCHIVE,
            format!("levelshots/{map}.jpg"),
            format!("{GRAPHICS_DIR}/{map}.jpg"),
        ));
    }

    for icon in BASE_PLAYER_ICONS {
        requests.push(AssetRequest::new(
            BASE_ARCHIVE,
            format!("models/players/anarki/{icon}.tga"),
            format!("{GRAPHICS_DIR}/anarki/{icon}.tga"),
        ));
    }

    for level in SKILL_LEVELS {
        requests.push(AssetRequest::new(
            BASE_ARCHIVE,
            format!("menu/art/skill{level}.tga"),
            format!("{GRAPHICS_DIR}/menu/art/skill{level}.tga"),
        ));
    }

    if home.join(TEAM_ARCHIVE).is_file() {
        for player in TEAM_PLAYERS {
            requests.push(AssetRequest::new(
                TEAM_ARCHIVE,
                format!("models/players/{player}/icon_default.tga"),
                format!("{GRAPHICS_DIR}/{player}/icon_default.tga"),
            ));
        }
    }

    requests
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractReport {
    pub extracted: usize,
    pub already_present: usize,
    pub failed: usize,
}

/// Extract every menu image, logging and skipping the ones that fail
pub fn extract_menu_assets(home: &Path) -> ExtractReport {
    let mut report = ExtractReport::default();

    for request in menu_asset_requests(home) {
        let archive = home.join(request.archive);
        let destination = home.join(&request.destination);
        match extract_entry(&archive, &request.entry, &destination) {
            Ok(ExtractOutcome::Extracted) => report.extracted += 1,
            Ok(ExtractOutcome::AlreadyPresent) => report.already_present += 1,
            Err(e) => {
                log::warn!("Skipping menu asset: {}", e);
                report.failed += 1;
            }
        }
    }

    log::info!(
        "Menu assets: {} extracted, {} already present, {} failed",
        report.extracted,
        report.already_present,
        report.failed
    );
    report
}
