use crate::error::Result;
use crate::host::Host;
use crate::services::DebuggerServices;
use std::sync::Arc;

/// Bridge to the managed hosting environment. Obtained from a successful
/// [`HostingBootstrap::initialize_hosting`] call; owns the richer notion of
/// the current target on the managed side.
pub trait HostServices: Send + Sync {
    /// Return the host provided by the managed environment.
    fn get_host(&self) -> Result<Arc<dyn Host>>;

    /// Hand the engine primitives over to the managed side.
    fn register_debugger_services(&self, services: Arc<dyn DebuggerServices>) -> Result<()>;

    fn create_target(&self) -> Result<()>;

    /// Create or destroy the managed-side target to track `process_id`.
    fn update_target(&self, process_id: u32) -> Result<()>;

    fn flush_target(&self);

    fn destroy_target(&self) -> Result<()>;

    /// Shut the managed side down; called once during extension unload,
    /// before the bridge reference is dropped.
    fn uninitialize(&self);
}

/// Hook for bringing up the managed hosting runtime. Supplied by the
/// embedder at context initialization; invoked at most once, on first host
/// resolution. Implementations must not call back into the extension
/// context — the context installs the returned bridge itself, synchronously.
pub trait HostingBootstrap: Send + Sync {
    fn initialize_hosting(&self) -> anyhow::Result<Arc<dyn HostServices>>;
}
