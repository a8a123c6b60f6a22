use crate::error::{Error, Result};
use crate::muted_error;
use crate::platform::OperatingSystem;
use crate::services::{debugger::module_lookup_name, DebuggerServices, ModuleInfo};
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Well-known runtime module names, probed in order against the engine
/// module table.
fn runtime_module_candidates(os: OperatingSystem) -> &'static [&'static str] {
    match os {
        OperatingSystem::Windows => &["coreclr.dll", "clr.dll"],
        OperatingSystem::MacOs => &["libcoreclr.dylib"],
        OperatingSystem::Linux | OperatingSystem::Unknown => &["libcoreclr.so"],
    }
}

/// One managed runtime instance inside a target process.
pub struct Runtime {
    module_name: &'static str,
    module: ModuleInfo,
    version: Option<String>,
}

impl Runtime {
    /// Locate the runtime module in the debuggee. Fails with `NotFound` if
    /// no candidate module is loaded.
    pub(crate) fn discover(
        services: &Arc<dyn DebuggerServices>,
        os: OperatingSystem,
    ) -> Result<Runtime> {
        for &name in runtime_module_candidates(os) {
            let lookup = module_lookup_name(name, services.kind());
            if let Ok(module) = services.module_by_name(lookup) {
                let version = muted_error!(services.module_version(module.index));
                return Ok(Runtime {
                    module_name: name,
                    module,
                    version,
                });
            }
        }
        Err(Error::NotFound("managed runtime module"))
    }

    pub fn name(&self) -> &str {
        self.module_name
    }

    pub fn module_index(&self) -> u32 {
        self.module.index
    }

    pub fn module_base(&self) -> u64 {
        self.module.base
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

impl Display for Runtime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {:#018x}",
            self.module_name, self.module.base
        )?;
        if let Some(version) = &self.version {
            write!(f, " (version {version})")?;
        }
        Ok(())
    }
}
