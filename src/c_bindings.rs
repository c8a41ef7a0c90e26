//! Engine entry points
//!
//! With the `engine` feature the crate links against the engine's static
//! library and starts it through `Sys_SetHomeDir` / `Sys_Startup`. Without
//! it, [`DryRunHost`] stands in and only records what would have run.

use std::path::{Path, PathBuf};

use crate::engine::{EngineError, EngineHost};

#[cfg(feature = "engine")]
pub use linked::LinkedEngine;

#[cfg(feature = "engine")]
mod linked {
    use std::ffi::CString;
    use std::path::Path;

    use libc::{c_char, c_int};

    use crate::engine::{CArgv, EngineError, EngineHost};

    extern "C" {
        fn Sys_SetHomeDir(path: *const c_char);
        fn Sys_Startup(argc: c_int, argv: *mut *mut c_char);
    }

    /// The engine linked into this binary
    #[derive(Debug, Default)]
    pub struct LinkedEngine;

    impl EngineHost for LinkedEngine {
        fn set_home_directory(&mut self, path: &Path) -> Result<(), EngineError> {
            let path_str = path
                .to_str()
                .ok_or_else(|| EngineError::InvalidHomeDir(path.display().to_string()))?;
            let c_path = CString::new(path_str)
                .map_err(|_| EngineError::InteriorNul(path_str.to_string()))?;

            // The engine copies the string
            unsafe { Sys_SetHomeDir(c_path.as_ptr()) };
            Ok(())
        }

        fn start_engine(&mut self, argv: &[String]) -> Result<(), EngineError> {
            let mut c_argv = CArgv::new(argv)?;
            unsafe { Sys_Startup(c_argv.argc(), c_argv.as_mut_ptr()) };
            Ok(())
        }
    }
}

/// Host that logs and records instead of starting anything
#[derive(Debug, Default)]
pub struct DryRunHost {
    pub home: Option<PathBuf>,
    pub argv: Vec<String>,
}

impl EngineHost for DryRunHost {
    fn set_home_directory(&mut self, path: &Path) -> Result<(), EngineError> {
        log::info!("[dry run] home directory: {}", path.display());
        self.home = Some(path.to_path_buf());
        Ok(())
    }

    fn start_engine(&mut self, argv: &[String]) -> Result<(), EngineError> {
        // Same validation the linked engine applies
        crate::engine::CArgv::new(argv)?;
        log::info!("[dry run] engine argv: {}", argv.join(" "));
        self.argv = argv.to_vec();
        Ok(())
    }
}
