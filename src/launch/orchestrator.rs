use crossbeam::channel::{self, Receiver, Sender};

use super::args::LaunchArgs;
use super::LaunchError;
use crate::assets;
use crate::engine::EngineHost;

/// Shown by the menu when `baseq3/pak0.pk3` is missing
pub const MISSING_FILES_MESSAGE: &str = "Please copy the 'baseq3' folder containing pak0.pk3 \
(and other pak files) to the app's Documents folder using iTunes File Sharing or the Files app.\n\n\
The game cannot start without these files.";

/// What the menu asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchRequest {
    Vanilla,
    Mod(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// The engine ran and returned
    Started,
    /// Base game data is missing; the menu should show [`MISSING_FILES_MESSAGE`]
    MissingFiles,
}

pub fn launch_channel() -> (Sender<LaunchRequest>, Receiver<LaunchRequest>) {
    channel::unbounded()
}

/// Turns menu requests into engine starts
pub struct Launcher<H: EngineHost> {
    host: H,
    template: LaunchArgs,
    extract_assets: bool,
}

impl<H: EngineHost> Launcher<H> {
    /// `template` carries the per-device settings (home, screen, name)
    /// shared by every launch
    pub fn new(host: H, template: LaunchArgs) -> Self {
        Self {
            host,
            template,
            extract_assets: true,
        }
    }

    /// Skip pulling menu images out of the archives before each launch
    pub fn without_asset_extraction(mut self) -> Self {
        self.extract_assets = false;
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn args_for(&self, request: &LaunchRequest) -> LaunchArgs {
        match request {
            LaunchRequest::Vanilla => self.template.clone(),
            LaunchRequest::Mod(name) => self.template.clone().with_mod(name.as_str()),
        }
    }

    pub fn launch(&mut self, request: LaunchRequest) -> Result<LaunchOutcome, LaunchError> {
        let home = self.template.home.clone();

        if !assets::has_base_game(&home) {
            log::warn!("No base game data under {}", home.display());
            return Ok(LaunchOutcome::MissingFiles);
        }

        if self.extract_assets {
            assets::extract_menu_assets(&home);
        }

        let argv = self.args_for(&request).build();
        log::info!("Launching {:?} with {} arguments", request, argv.len() - 1);
        log::debug!("argv: {:?}", argv);

        self.host.set_home_directory(&home)?;
        self.host.start_engine(&argv)?;

        Ok(LaunchOutcome::Started)
    }

    /// Handle requests until one starts the engine
    ///
    /// Requests that fail on missing data are dropped so the user can copy
    /// the files and try again.
    pub fn serve(&mut self, requests: &Receiver<LaunchRequest>) -> Result<LaunchOutcome, LaunchError> {
        loop {
            let request = requests.recv().map_err(|_| LaunchError::Disconnected)?;
            match self.launch(request)? {
                LaunchOutcome::Started => return Ok(LaunchOutcome::Started),
                LaunchOutcome::MissingFiles => continue,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::c_bindings::DryRunHost;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn install_base_game(home: &Path) {
        let pak = home.join(assets::BASE_ARCHIVE);
        fs::create_dir_all(pak.parent().unwrap()).unwrap();
        let mut writer = zip::ZipWriter::new(fs::File::create(pak).unwrap());
        writer
            .start_file("menu/art/skill1.tga", zip::write::SimpleFileOptions::default())
            .unwrap();
        std::io::Write::write_all(&mut writer, b"skill").unwrap();
        writer.finish().unwrap();
    }

    fn launcher(home: &Path) -> Launcher<DryRunHost> {
        Launcher::new(DryRunHost::default(), LaunchArgs::new("/app", home))
    }

    #[test]
    fn test_missing_base_game() {
        let dir = TempDir::new().unwrap();
        let mut launcher = launcher(dir.path());

        let outcome = launcher.launch(LaunchRequest::Vanilla).unwrap();
        assert_eq!(outcome, LaunchOutcome::MissingFiles);
        assert!(launcher.host().argv.is_empty());
        assert!(launcher.host().home.is_none());
    }

    #[test]
    fn test_vanilla_launch_extracts_and_starts() {
        let dir = TempDir::new().unwrap();
        install_base_game(dir.path());
        let mut launcher = launcher(dir.path());

        let outcome = launcher.launch(LaunchRequest::Vanilla).unwrap();
        assert_eq!(outcome, LaunchOutcome::Started);

        let host = launcher.into_host();
        assert_eq!(host.home.as_deref(), Some(dir.path()));
        assert!(!host.argv.iter().any(|a| a == "fs_game"));
        assert!(dir.path().join("graphics/menu/art/skill1.tga").is_file());
    }

    #[test]
    fn test_launch_without_extraction() {
        let dir = TempDir::new().unwrap();
        install_base_game(dir.path());
        let mut launcher = launcher(dir.path()).without_asset_extraction();

        assert_eq!(
            launcher.launch(LaunchRequest::Vanilla).unwrap(),
            LaunchOutcome::Started
        );
        assert!(!dir.path().join("graphics").exists());
    }

    #[test]
    fn test_mod_launch_sets_fs_game() {
        let dir = TempDir::new().unwrap();
        install_base_game(dir.path());
        let mut launcher = launcher(dir.path());

        launcher
            .launch(LaunchRequest::Mod("q3ut4".to_string()))
            .unwrap();

        let argv = &launcher.host().argv;
        assert!(argv.windows(2).any(|w| w[0] == "fs_game" && w[1] == "q3ut4"));
        assert!(argv.windows(2).any(|w| w[0] == "cl_autodownload" && w[1] == "1"));
    }

    #[test]
    fn test_serve_skips_until_files_arrive() {
        let dir = TempDir::new().unwrap();
        let mut launcher = launcher(dir.path());
        let (tx, rx) = launch_channel();

        tx.send(LaunchRequest::Vanilla).unwrap();
        drop(tx);
        let err = launcher.serve(&rx).unwrap_err();
        assert!(matches!(err, LaunchError::Disconnected));

        install_base_game(dir.path());
        let (tx, rx) = launch_channel();
        tx.send(LaunchRequest::Mod("cpma".to_string())).unwrap();
        assert_eq!(launcher.serve(&rx).unwrap(), LaunchOutcome::Started);
        assert!(launcher.host().argv.iter().any(|a| a == "cpma"));
    }

    #[test]
    fn test_requests_from_another_thread() {
        let dir = TempDir::new().unwrap();
        install_base_game(dir.path());
        let mut launcher = launcher(dir.path());
        let (tx, rx) = launch_channel();

        let menu = std::thread::spawn(move || {
            tx.send(LaunchRequest::Vanilla).unwrap();
        });

        assert_eq!(launcher.serve(&rx).unwrap(), LaunchOutcome::Started);
        menu.join().unwrap();
    }
}
