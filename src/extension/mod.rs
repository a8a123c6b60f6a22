use crate::error::{Error, Result};
use crate::{cs_warn, weak_error};
use crate::host::{Host, LocalHost, Runtime, Target, TraceType};
use crate::services::{
    BackendKind, DebuggerServices, HostServices, HostingBootstrap, OutputService, ServiceId,
    ServiceRef, SymbolService,
};
use std::sync::{Arc, Mutex};

/// The process-wide extension context. At most one per process; bound to the
/// embedding debugger's extension load/unload events.
static EXTENSIONS: Mutex<Option<Arc<Extensions>>> = Mutex::new(None);

/// How (and whether) the host got resolved. The resolution is permanent for
/// the session: once a host of either kind is cached there is no re-attempt.
enum HostState {
    Unresolved,
    ExternallyResolved(Arc<dyn Host>),
    FallbackResolved(Arc<dyn Host>),
}

impl HostState {
    fn host(&self) -> Option<Arc<dyn Host>> {
        match self {
            HostState::Unresolved => None,
            HostState::ExternallyResolved(host) | HostState::FallbackResolved(host) => {
                Some(host.clone())
            }
        }
    }
}

/// Extension context: owns the shared engine and output references and
/// lazily resolves the host, the current target, the extension services
/// bridge and the symbol service.
pub struct Extensions {
    debugger_services: Arc<dyn DebuggerServices>,
    output: Arc<dyn OutputService>,
    bootstrap: Option<Box<dyn HostingBootstrap>>,
    host: Mutex<HostState>,
    target: Mutex<Option<Arc<dyn Target>>>,
    host_services: Mutex<Option<Arc<dyn HostServices>>>,
    symbol_service: Mutex<Option<Arc<dyn SymbolService>>>,
}

impl Extensions {
    /// Create the process-wide context. Idempotent: once a context exists,
    /// subsequent calls return it untouched.
    pub fn initialize(
        debugger_services: Arc<dyn DebuggerServices>,
        output: Arc<dyn OutputService>,
        bootstrap: Option<Box<dyn HostingBootstrap>>,
    ) -> Arc<Extensions> {
        let mut slot = EXTENSIONS.lock().unwrap();
        if let Some(existing) = slot.as_ref() {
            return existing.clone();
        }
        let extensions = Arc::new(Extensions {
            debugger_services,
            output,
            bootstrap,
            host: Mutex::new(HostState::Unresolved),
            target: Mutex::new(None),
            host_services: Mutex::new(None),
            symbol_service: Mutex::new(None),
        });
        *slot = Some(extensions.clone());
        extensions
    }

    /// Create the context with a host already supplied by the embedding
    /// plugin or managed environment at load time. Idempotent.
    pub fn initialize_with_host(
        host: Arc<dyn Host>,
        debugger_services: Arc<dyn DebuggerServices>,
        output: Arc<dyn OutputService>,
    ) -> Arc<Extensions> {
        let mut slot = EXTENSIONS.lock().unwrap();
        if let Some(existing) = slot.as_ref() {
            return existing.clone();
        }
        let extensions = Arc::new(Extensions {
            debugger_services,
            output,
            bootstrap: None,
            host: Mutex::new(HostState::ExternallyResolved(host)),
            target: Mutex::new(None),
            host_services: Mutex::new(None),
            symbol_service: Mutex::new(None),
        });
        *slot = Some(extensions.clone());
        extensions
    }

    /// Return the current context.
    pub fn instance() -> Result<Arc<Extensions>> {
        EXTENSIONS
            .lock()
            .unwrap()
            .clone()
            .ok_or(Error::NotFound("extension context"))
    }

    /// Tear the context down on debugger exit. No-op when uninitialized.
    /// Owned state is dropped in dependency order: the cached target first
    /// (later-created objects may call back into earlier ones during
    /// teardown), then the host, the symbol service and finally the bridge,
    /// which is uninitialized before its reference is dropped. The shared
    /// engine and output references go away with the context itself. The
    /// global slot is cleared last, so re-initialization is possible.
    pub fn uninitialize() {
        let extensions = EXTENSIONS.lock().unwrap().clone();
        if let Some(extensions) = extensions {
            extensions.destroy_target();
            *extensions.host.lock().unwrap() = HostState::Unresolved;
            *extensions.symbol_service.lock().unwrap() = None;
            let bridge = extensions.host_services.lock().unwrap().take();
            if let Some(bridge) = bridge {
                bridge.uninitialize();
            }
        }
        *EXTENSIONS.lock().unwrap() = None;
    }

    pub fn debugger_services(&self) -> Arc<dyn DebuggerServices> {
        self.debugger_services.clone()
    }

    pub fn output(&self) -> Arc<dyn OutputService> {
        self.output.clone()
    }

    /// Return the host, resolving it on first use. A richer externally
    /// hosted implementation is preferred: one attempt is made to bring up
    /// the hosting runtime; on any failure the session silently degrades to
    /// the local host bound directly to the engine.
    pub fn get_host(&self) -> Arc<dyn Host> {
        let mut state = self.host.lock().unwrap();
        if let Some(host) = state.host() {
            return host;
        }

        if let Some(bootstrap) = self.bootstrap.as_ref() {
            match bootstrap.initialize_hosting() {
                Ok(bridge) => match self.install_host_services(&bridge) {
                    Ok(host) => {
                        *state = HostState::ExternallyResolved(host.clone());
                        return host;
                    }
                    Err(e) => {
                        cs_warn!(target: "hosting", "extension services rejected: {e:#}")
                    }
                },
                Err(e) => cs_warn!(target: "hosting", "hosting runtime unavailable: {e:#}"),
            }
        }

        let host: Arc<dyn Host> =
            Arc::new(LocalHost::new(self.debugger_services.clone(), self.output.clone()));
        *state = HostState::FallbackResolved(host.clone());
        host
    }

    /// Wire a freshly bootstrapped bridge into the context: resolve its
    /// host, hand it the engine primitives, then point its target at the
    /// current process (or drop it when there is none).
    fn install_host_services(&self, bridge: &Arc<dyn HostServices>) -> Result<Arc<dyn Host>> {
        let host = bridge.get_host()?;
        bridge.register_debugger_services(self.debugger_services.clone())?;
        *self.host_services.lock().unwrap() = Some(bridge.clone());
        match self.debugger_services.current_process_system_id() {
            Ok(process_id) => bridge.update_target(process_id)?,
            Err(_) => {
                weak_error!(bridge.destroy_target());
            }
        }
        Ok(host)
    }

    /// Accept an extension services bridge pushed by the embedding
    /// environment. Transitions an unresolved host to externally resolved;
    /// a host cached earlier (of either kind) is kept.
    pub fn initialize_host_services(&self, bridge: Arc<dyn HostServices>) -> Result<()> {
        let mut state = self.host.lock().unwrap();
        let host = self.install_host_services(&bridge)?;
        match &*state {
            HostState::Unresolved => *state = HostState::ExternallyResolved(host),
            _ => {
                cs_warn!(target: "hosting", "host already resolved, keeping the existing instance")
            }
        }
        Ok(())
    }

    /// Return the extension services bridge, resolving it through the host
    /// capability lookup if it was not installed by a bootstrap.
    pub fn get_host_services(&self) -> Option<Arc<dyn HostServices>> {
        let cached = self.host_services.lock().unwrap().clone();
        if cached.is_some() {
            return cached;
        }
        let bridge = self
            .get_host()
            .get_service(ServiceId::HostServices)
            .and_then(ServiceRef::host_services)?;
        *self.host_services.lock().unwrap() = Some(bridge.clone());
        Some(bridge)
    }

    /// Return the current target, asking the host on first use.
    pub fn get_target(&self) -> Result<Arc<dyn Target>> {
        let mut cache = self.target.lock().unwrap();
        if let Some(target) = cache.as_ref() {
            return Ok(target.clone());
        }
        let target = self.get_host().current_target()?;
        *cache = Some(target.clone());
        Ok(target)
    }

    /// Return the symbol service of the current target.
    pub fn get_symbol_service(&self) -> Result<Arc<dyn SymbolService>> {
        let mut cache = self.symbol_service.lock().unwrap();
        if let Some(service) = cache.as_ref() {
            return Ok(service.clone());
        }
        let service = self
            .get_target()?
            .get_service(ServiceId::SymbolService)
            .and_then(ServiceRef::symbol_service)
            .ok_or(Error::NotFound("symbol service"))?;
        *cache = Some(service.clone());
        Ok(service)
    }

    /// Ask the engine whether cached debuggee state may be stale. Advisory;
    /// does not clear the cached target.
    pub fn flush_check(&self) {
        self.debugger_services.flush_check();
    }

    /// Create a bridge-side target. Success without a bridge: the fallback
    /// host creates its target lazily on first use instead.
    pub fn create_target(&self) -> Result<()> {
        let bridge = self.host_services.lock().unwrap().clone();
        match bridge {
            Some(bridge) => bridge.create_target(),
            None => Ok(()),
        }
    }

    /// Create or destroy the bridge-side target for `process_id`. Success
    /// without a bridge.
    pub fn update_target(&self, process_id: u32) -> Result<()> {
        let bridge = self.host_services.lock().unwrap().clone();
        match bridge {
            Some(bridge) => bridge.update_target(process_id),
            None => Ok(()),
        }
    }

    /// Flush the bridge-side target.
    pub fn flush_target(&self) {
        let bridge = self.host_services.lock().unwrap().clone();
        if let Some(bridge) = bridge {
            bridge.flush_target();
        }
    }

    /// Drop the cached target and the bridge's notion of it; used when the
    /// debuggee exits or detaches.
    pub fn destroy_target(&self) {
        self.release_target();
        let bridge = self.host_services.lock().unwrap().clone();
        if let Some(bridge) = bridge {
            weak_error!(bridge.destroy_target());
        }
    }

    /// Drop the cached target reference. The next `get_target` re-resolves
    /// through the host.
    pub fn release_target(&self) {
        *self.target.lock().unwrap() = None;
    }

    /// Route a trace message through managed logging when a host is
    /// resolved (resolving one if needed).
    pub fn write_trace(&self, trace_type: TraceType, message: &str) {
        self.get_host().write_trace(trace_type, message);
    }
}

/// Return the resolved host of the current context.
pub fn host() -> Result<Arc<dyn Host>> {
    Ok(Extensions::instance()?.get_host())
}

/// Return the current target of the current context.
pub fn target() -> Result<Arc<dyn Target>> {
    Extensions::instance()?.get_target()
}

/// Return the runtime, or fail if there is no target or no runtime in it.
pub fn runtime() -> Result<Arc<Runtime>> {
    let extensions = Extensions::instance()?;
    let target = extensions.get_target()?;
    // the COM-style engine surfaces no flush events of its own; SB API
    // plugins drive flushes from their event loop instead
    if extensions.debugger_services.kind() == BackendKind::DbgEng {
        extensions.flush_check();
    }
    target.get_runtime()
}

/// Return the symbol service of the current context.
pub fn symbol_service() -> Result<Arc<dyn SymbolService>> {
    Extensions::instance()?.get_symbol_service()
}

/// Return the engine primitives of the current context.
pub fn debugger_services() -> Result<Arc<dyn DebuggerServices>> {
    Ok(Extensions::instance()?.debugger_services())
}

/// Return the global output service of the current context.
pub fn output() -> Result<Arc<dyn OutputService>> {
    Ok(Extensions::instance()?.output())
}

/// Route a trace message through the current context's managed logging.
/// Dropped silently when no context is initialized.
pub fn write_trace(trace_type: TraceType, message: &str) {
    if let Ok(extensions) = Extensions::instance() {
        extensions.write_trace(trace_type, message);
    }
}
