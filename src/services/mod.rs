pub mod debugger;
pub mod hosting;
pub mod output;
pub mod symbol;

pub use debugger::{BackendKind, DebuggerServices, ModuleInfo, RemoteMemoryService};
pub use hosting::{HostServices, HostingBootstrap};
pub use output::{CaptureOutput, OutputService, OutputType};
pub use symbol::SymbolService;

use std::sync::Arc;

/// Identity of a capability discoverable through `get_service` lookups.
/// The set is closed; an object answers only the subset it implements.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ServiceId {
    DebuggerServices,
    OutputService,
    SymbolService,
    HostServices,
    RemoteMemory,
}

/// A resolved capability. The variant carries a strong reference to the
/// underlying object; the object stays alive for as long as the value
/// (or a clone of it) is held.
#[derive(Clone)]
pub enum ServiceRef {
    Debugger(Arc<dyn DebuggerServices>),
    Output(Arc<dyn OutputService>),
    Symbol(Arc<dyn SymbolService>),
    Hosting(Arc<dyn HostServices>),
    RemoteMemory(Arc<dyn RemoteMemoryService>),
}

impl ServiceRef {
    pub fn id(&self) -> ServiceId {
        match self {
            ServiceRef::Debugger(_) => ServiceId::DebuggerServices,
            ServiceRef::Output(_) => ServiceId::OutputService,
            ServiceRef::Symbol(_) => ServiceId::SymbolService,
            ServiceRef::Hosting(_) => ServiceId::HostServices,
            ServiceRef::RemoteMemory(_) => ServiceId::RemoteMemory,
        }
    }

    pub fn debugger_services(self) -> Option<Arc<dyn DebuggerServices>> {
        match self {
            ServiceRef::Debugger(s) => Some(s),
            _ => None,
        }
    }

    pub fn output_service(self) -> Option<Arc<dyn OutputService>> {
        match self {
            ServiceRef::Output(s) => Some(s),
            _ => None,
        }
    }

    pub fn symbol_service(self) -> Option<Arc<dyn SymbolService>> {
        match self {
            ServiceRef::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn host_services(self) -> Option<Arc<dyn HostServices>> {
        match self {
            ServiceRef::Hosting(s) => Some(s),
            _ => None,
        }
    }

    pub fn remote_memory(self) -> Option<Arc<dyn RemoteMemoryService>> {
        match self {
            ServiceRef::RemoteMemory(s) => Some(s),
            _ => None,
        }
    }
}
