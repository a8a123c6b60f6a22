use crate::error::Result;
use crate::host::runtime::Runtime;
use crate::platform::OperatingSystem;
use crate::services::{DebuggerServices, ServiceId, ServiceRef};
use log::debug;
use once_cell::sync::OnceCell;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::{env, fs};

/// One debuggee. Knows its OS classification, provides a scratch directory,
/// and owns the managed runtime instance(s) found in the process.
pub trait Target: Send + Sync {
    fn operating_system(&self) -> OperatingSystem;

    /// Per-target capabilities. Only a limited set of services can be
    /// resolved through this lookup.
    fn get_service(&self, id: ServiceId) -> Option<ServiceRef>;

    /// Scratch directory for files generated on behalf of this target.
    fn temp_directory(&self) -> Result<PathBuf>;

    /// Return the managed runtime instance for this target.
    fn get_runtime(&self) -> Result<Arc<Runtime>>;

    /// Drop cached debuggee state; the debuggee resumed and module lists,
    /// runtime state etc. may be stale.
    fn flush(&self);
}

/// Local implementation of [`Target`] when the host doesn't provide one.
/// Tracks at most one current runtime.
pub struct LocalTarget {
    debugger_services: Arc<dyn DebuggerServices>,
    os: OperatingSystem,
    temp_dir: OnceCell<PathBuf>,
    runtime: Mutex<Option<Arc<Runtime>>>,
}

impl LocalTarget {
    pub fn new(debugger_services: Arc<dyn DebuggerServices>) -> Result<Self> {
        let os = debugger_services.operating_system()?;
        Ok(Self {
            debugger_services,
            os,
            temp_dir: OnceCell::new(),
            runtime: Mutex::new(None),
        })
    }
}

impl Target for LocalTarget {
    fn operating_system(&self) -> OperatingSystem {
        self.os
    }

    fn get_service(&self, id: ServiceId) -> Option<ServiceRef> {
        match id {
            ServiceId::DebuggerServices => {
                Some(ServiceRef::Debugger(self.debugger_services.clone()))
            }
            _ => None,
        }
    }

    fn temp_directory(&self) -> Result<PathBuf> {
        self.temp_dir
            .get_or_try_init(|| {
                let dir = env::temp_dir().join(format!("cscout{}", nix::unistd::getpid()));
                fs::create_dir_all(&dir)?;
                Ok(dir)
            })
            .cloned()
    }

    fn get_runtime(&self) -> Result<Arc<Runtime>> {
        let mut cache = self.runtime.lock().unwrap();
        let runtime = match cache.as_ref() {
            Some(runtime) => runtime.clone(),
            None => {
                let runtime = Arc::new(Runtime::discover(&self.debugger_services, self.os)?);
                debug!(target: "extension", "managed runtime found: {runtime}");
                *cache = Some(runtime.clone());
                runtime
            }
        };
        Ok(runtime)
    }

    fn flush(&self) {
        debug!(target: "extension", "target flush");
        *self.runtime.lock().unwrap() = None;
    }
}
