use crate::data_target::DataTarget;
use crate::error::{Error, Result};
use crate::platform::PlatformTag;
use bytes::Bytes;
use std::fs;
use std::path::Path;

enum ImageBytes {
    Mapped(memmap2::Mmap),
    Owned(Vec<u8>),
}

impl ImageBytes {
    fn as_slice(&self) -> &[u8] {
        match self {
            ImageBytes::Mapped(mmap) => mmap,
            ImageBytes::Owned(bytes) => bytes,
        }
    }
}

/// Data target over an on-disk runtime image, used when no live process is
/// attached and only static image inspection is needed. Addresses are file
/// offsets; everything except memory reads and the runtime locator is
/// unsupported.
pub struct ImageDataTarget {
    bytes: ImageBytes,
    base_address: u64,
}

impl ImageDataTarget {
    /// Map an image file. The file must look like a known executable image
    /// format (ELF, PE, Mach-O).
    pub fn open(path: impl AsRef<Path>, base_address: u64) -> Result<Self> {
        let file = fs::File::open(path)?;
        let mmap = unsafe { memmap2::Mmap::map(&file)? };
        object::FileKind::parse(&*mmap)
            .map_err(|_| Error::InvalidArgument("not an executable image"))?;
        Ok(Self {
            bytes: ImageBytes::Mapped(mmap),
            base_address,
        })
    }

    /// Build a target over an in-memory image.
    pub fn from_bytes(bytes: Vec<u8>, base_address: u64) -> Self {
        Self {
            bytes: ImageBytes::Owned(bytes),
            base_address,
        }
    }
}

impl DataTarget for ImageDataTarget {
    fn platform(&self) -> Result<PlatformTag> {
        Err(Error::NotSupported("platform query on a static image"))
    }

    fn pointer_size(&self) -> Result<u32> {
        Err(Error::NotSupported("pointer size query on a static image"))
    }

    fn image_base(&self, _module_name: &str) -> Result<u64> {
        Err(Error::NotSupported("module lookup on a static image"))
    }

    fn read_virtual(&self, address: u64, buf: &mut [u8]) -> Result<usize> {
        let data = self.bytes.as_slice();
        if address >= data.len() as u64 {
            // reads past the end of the image yield nothing, not an error
            return Ok(0);
        }
        let offset = address as usize;
        let n = buf.len().min(data.len() - offset);
        buf[..n].copy_from_slice(&data[offset..offset + n]);
        Ok(n)
    }

    fn write_virtual(&self, _address: u64, _data: &[u8]) -> Result<usize> {
        Err(Error::NotSupported("write to a static image"))
    }

    fn current_thread_id(&self) -> Result<u32> {
        Err(Error::NotSupported("thread queries on a static image"))
    }

    fn thread_context(
        &self,
        _thread_id: u32,
        _context_flags: u32,
        _context_size: usize,
    ) -> Result<Bytes> {
        Err(Error::NotSupported("thread queries on a static image"))
    }

    fn set_thread_context(&self, _thread_id: u32, _context: &[u8]) -> Result<()> {
        Err(Error::NotSupported("thread queries on a static image"))
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

    fn virtual_unwind(&self, _thread_id: u32, _context: &mut [u8]) -> Result<()> {
        Err(Error::NotSupported("unwind on a static image"))
    }

    fn alloc_virtual(
        &self,
        _address: u64,
        _size: u32,
        _type_flags: u32,
        _protect_flags: u32,
    ) -> Result<u64> {
        Err(Error::NotSupported("remote memory allocation"))
    }

    fn free_virtual(&self, _address: u64, _size: u32, _type_flags: u32) -> Result<()> {
        Err(Error::NotSupported("remote memory allocation"))
    }

    fn runtime_base(&self) -> Result<u64> {
        Ok(self.base_address)
    }
}
