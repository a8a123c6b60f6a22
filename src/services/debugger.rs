use crate::error::{Error, Result};
use crate::platform::{OperatingSystem, ProcessorArch};
use crate::services::{ServiceId, ServiceRef};
use bytes::Bytes;
use strum_macros::Display;

/// ABI family of the debugger engine hosting the extension.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Display)]
pub enum BackendKind {
    /// COM-style engine.
    DbgEng,
    /// SB API style engine.
    Lldb,
}

/// Coordinates of a loaded module as known to the engine module table.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ModuleInfo {
    pub index: u32,
    pub base: u64,
}

/// Raw debugger engine primitives. Implemented once per backend, outside
/// this crate; everything above depends only on this trait.
pub trait DebuggerServices: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Read debuggee memory. Returns the number of bytes actually read,
    /// which may be less than the buffer size at region boundaries.
    fn read_virtual(&self, address: u64, buf: &mut [u8]) -> Result<usize>;

    /// Write debuggee memory. Returns the number of bytes written.
    fn write_virtual(&self, address: u64, data: &[u8]) -> Result<usize>;

    fn current_process_system_id(&self) -> Result<u32>;

    fn current_thread_system_id(&self) -> Result<u32>;

    /// Retrieve the raw CPU context of a thread by its system id. The layout
    /// of the returned buffer is platform-specific and opaque to this crate.
    fn thread_context_by_system_id(
        &self,
        thread_id: u32,
        context_flags: u32,
        context_size: usize,
    ) -> Result<Bytes>;

    fn processor_type(&self) -> Result<ProcessorArch>;

    fn operating_system(&self) -> Result<OperatingSystem>;

    fn module_by_name(&self, name: &str) -> Result<ModuleInfo>;

    fn module_version(&self, index: u32) -> Result<String>;

    /// Advisory liveness check: lets the engine invalidate caches if the
    /// debuggee has resumed execution since the last command.
    fn flush_check(&self);

    /// Unwind one frame from the context in `context`, in place. Engines
    /// without native unwind support keep the default.
    fn virtual_unwind(&self, _thread_id: u32, _context: &mut [u8]) -> Result<()> {
        Err(Error::NotSupported("virtual unwind"))
    }

    /// Optional engine capabilities (e.g. remote memory allocation).
    fn get_service(&self, _id: ServiceId) -> Option<ServiceRef> {
        None
    }
}

/// Optional engine capability for allocating memory inside the debuggee.
pub trait RemoteMemoryService: Send + Sync {
    fn alloc_virtual(
        &self,
        address: u64,
        size: u32,
        type_flags: u32,
        protect_flags: u32,
    ) -> Result<u64>;

    fn free_virtual(&self, address: u64, size: u32, type_flags: u32) -> Result<()>;
}

/// Module names in a COM-style engine module table carry no file extension;
/// strip a trailing extension before lookup there.
pub fn module_lookup_name(name: &str, kind: BackendKind) -> &str {
    match kind {
        BackendKind::DbgEng => name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name),
        BackendKind::Lldb => name,
    }
}
