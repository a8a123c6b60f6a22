pub mod image;

pub use image::ImageDataTarget;

use crate::error::{Error, Result};
use crate::platform::{canonical_address, PlatformTag, ProcessorArch};
use crate::services::{debugger::module_lookup_name, DebuggerServices, ServiceId, ServiceRef};
use bytes::Bytes;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Uniform data-target contract consumed by runtime inspection components.
/// Every address-taking operation accepts possibly sign-extended addresses;
/// implementations canonicalize before use.
pub trait DataTarget: Send + Sync {
    fn platform(&self) -> Result<PlatformTag>;

    fn pointer_size(&self) -> Result<u32>;

    /// Base address of a loaded module, looked up by name.
    fn image_base(&self, module_name: &str) -> Result<u64>;

    fn read_virtual(&self, address: u64, buf: &mut [u8]) -> Result<usize>;

    fn write_virtual(&self, address: u64, data: &[u8]) -> Result<usize>;

    fn current_thread_id(&self) -> Result<u32>;

    fn thread_context(
        &self,
        thread_id: u32,
        context_flags: u32,
        context_size: usize,
    ) -> Result<Bytes>;

    fn set_thread_context(&self, thread_id: u32, context: &[u8]) -> Result<()>;

    fn continue_status_changed(&self, thread_id: u32, continue_status: u32) -> Result<()>;

    fn tls_value(&self, thread_id: u32, index: u32) -> Result<u64>;

    fn set_tls_value(&self, thread_id: u32, index: u32, value: u64) -> Result<()>;

    fn virtual_unwind(&self, thread_id: u32, context: &mut [u8]) -> Result<()>;

    fn alloc_virtual(
        &self,
        address: u64,
        size: u32,
        type_flags: u32,
        protect_flags: u32,
    ) -> Result<u64>;

    fn free_virtual(&self, address: u64, size: u32, type_flags: u32) -> Result<()>;

    /// Base address of the managed runtime module.
    fn runtime_base(&self) -> Result<u64>;
}

/// Live-process data target. Translates the uniform contract into raw engine
/// primitives; never the source of truth for memory itself.
pub struct DebuggerDataTarget {
    debugger_services: Arc<dyn DebuggerServices>,
    runtime_base: Option<u64>,
    /// Architecture of a debuggee never changes; resolved once.
    arch: OnceCell<ProcessorArch>,
}

impl DebuggerDataTarget {
    pub fn new(debugger_services: Arc<dyn DebuggerServices>) -> Self {
        Self {
            debugger_services,
            runtime_base: None,
            arch: OnceCell::new(),
        }
    }

    /// Variant that can answer runtime-locator queries with a known base.
    pub fn with_runtime_base(debugger_services: Arc<dyn DebuggerServices>, base: u64) -> Self {
        Self {
            debugger_services,
            runtime_base: Some(base),
            arch: OnceCell::new(),
        }
    }

    fn arch(&self) -> Result<ProcessorArch> {
        self.arch
            .get_or_try_init(|| self.debugger_services.processor_type())
            .copied()
    }

    fn canonical(&self, address: u64) -> Result<u64> {
        Ok(canonical_address(address, self.arch()?))
    }
}

impl DataTarget for DebuggerDataTarget {
    fn platform(&self) -> Result<PlatformTag> {
        let arch = self.arch()?;
        let os = self.debugger_services.operating_system()?;
        PlatformTag::classify(arch, os)
    }

    fn pointer_size(&self) -> Result<u32> {
        Ok(self.arch()?.pointer_size())
    }

    fn image_base(&self, module_name: &str) -> Result<u64> {
        if module_name.is_empty() {
            return Err(Error::InvalidArgument("module name is empty"));
        }
        let name = module_lookup_name(module_name, self.debugger_services.kind());
        self.debugger_services
            .module_by_name(name)
            .map(|module| module.base)
    }

    fn read_virtual(&self, address: u64, buf: &mut [u8]) -> Result<usize> {
        let address = self.canonical(address)?;
        self.debugger_services.read_virtual(address, buf)
    }

    fn write_virtual(&self, address: u64, data: &[u8]) -> Result<usize> {
        let address = self.canonical(address)?;
        self.debugger_services.write_virtual(address, data)
    }

    fn current_thread_id(&self) -> Result<u32> {
        self.debugger_services.current_thread_system_id()
    }

    fn thread_context(
        &self,
        thread_id: u32,
        context_flags: u32,
        context_size: usize,
    ) -> Result<Bytes> {
        self.debugger_services
            .thread_context_by_system_id(thread_id, context_flags, context_size)
    }

    fn set_thread_context(&self, _thread_id: u32, _context: &[u8]) -> Result<()> {
        Err(Error::NotSupported("set thread context"))
    }

    fn continue_status_changed(&self, _thread_id: u32, _continue_status: u32) -> Result<()> {
        Err(Error::NotSupported("continue status change"))
    }

    fn tls_value(&self, _thread_id: u32, _index: u32) -> Result<u64> {
        Err(Error::NotSupported("thread-local storage access"))
    }

    fn set_tls_value(&self, _thread_id: u32, _index: u32, _value: u64) -> Result<()> {
        Err(Error::NotSupported("thread-local storage access"))
    }

    fn virtual_unwind(&self, thread_id: u32, context: &mut [u8]) -> Result<()> {
        self.debugger_services.virtual_unwind(thread_id, context)
    }

    fn alloc_virtual(
        &self,
        address: u64,
        size: u32,
        type_flags: u32,
        protect_flags: u32,
    ) -> Result<u64> {
        let remote = self
            .debugger_services
            .get_service(ServiceId::RemoteMemory)
            .and_then(ServiceRef::remote_memory)
            .ok_or(Error::NotSupported("remote memory allocation"))?;
        remote.alloc_virtual(self.canonical(address)?, size, type_flags, protect_flags)
    }

    fn free_virtual(&self, address: u64, size: u32, type_flags: u32) -> Result<()> {
        let remote = self
            .debugger_services
            .get_service(ServiceId::RemoteMemory)
            .and_then(ServiceRef::remote_memory)
            .ok_or(Error::NotSupported("remote memory allocation"))?;
        remote.free_virtual(self.canonical(address)?, size, type_flags)
    }

    fn runtime_base(&self) -> Result<u64> {
        self.runtime_base.ok_or(Error::NotFound("runtime base address"))
    }
}
