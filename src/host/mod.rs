pub mod runtime;
pub mod target;

pub use runtime::Runtime;
pub use target::{LocalTarget, Target};

use crate::error::Result;
use crate::services::{
    BackendKind, DebuggerServices, OutputService, OutputType, ServiceId, ServiceRef,
};
use std::sync::{Arc, Mutex};
use strum_macros::Display;

/// The kind of environment driving the debugging session.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Display)]
pub enum HostType {
    DotnetDump,
    Lldb,
    DbgEng,
    Vs,
}

/// Managed trace logging classes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TraceType {
    Information,
    Warning,
    Error,
}

/// Host services for the extension. Normally implemented by the managed
/// hosting environment; [`LocalHost`] is the fallback when none is available.
pub trait Host: Send + Sync {
    fn host_type(&self) -> HostType;

    /// Global host capabilities. Only a limited set of services can be
    /// resolved through this lookup.
    fn get_service(&self, id: ServiceId) -> Option<ServiceRef>;

    /// Return the current target instance.
    fn current_target(&self) -> Result<Arc<dyn Target>>;

    /// Route a message to managed logging support.
    fn write_trace(&self, trace_type: TraceType, message: &str) {
        crate::log::trace(trace_type, message);
    }
}

/// Minimal local host bound directly to the debugger engine, used when no
/// managed hosting environment could be brought up. Supports a single
/// target for the whole session.
pub struct LocalHost {
    debugger_services: Arc<dyn DebuggerServices>,
    output: Arc<dyn OutputService>,
    target: Mutex<Option<Arc<LocalTarget>>>,
}

impl LocalHost {
    pub fn new(
        debugger_services: Arc<dyn DebuggerServices>,
        output: Arc<dyn OutputService>,
    ) -> Self {
        Self {
            debugger_services,
            output,
            target: Mutex::new(None),
        }
    }
}

impl Host for LocalHost {
    fn host_type(&self) -> HostType {
        match self.debugger_services.kind() {
            BackendKind::DbgEng => HostType::DbgEng,
            BackendKind::Lldb => HostType::Lldb,
        }
    }

    fn get_service(&self, _id: ServiceId) -> Option<ServiceRef> {
        None
    }

    fn current_target(&self) -> Result<Arc<dyn Target>> {
        let mut cache = self.target.lock().unwrap();
        let target = match cache.as_ref() {
            Some(target) => target.clone(),
            None => {
                let target = Arc::new(LocalTarget::new(self.debugger_services.clone())?);
                *cache = Some(target.clone());
                target
            }
        };
        Ok(target)
    }

    fn write_trace(&self, _trace_type: TraceType, message: &str) {
        self.output.output_string(OutputType::Logging, message);
    }
}
