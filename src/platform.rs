use crate::error::{Error, Result};
use strum_macros::Display;

/// Processor architecture of a debuggee, as reported by the debugger engine.
#[derive(Clone, Copy, Hash, PartialEq, Eq, Debug, Display)]
pub enum ProcessorArch {
    #[strum(serialize = "x86")]
    X86,
    #[strum(serialize = "amd64")]
    Amd64,
    #[strum(serialize = "arm32")]
    Arm32,
    #[strum(serialize = "arm64")]
    Arm64,
    #[strum(serialize = "riscv64")]
    RiscV64,
    #[strum(serialize = "loongarch64")]
    LoongArch64,
}

impl ProcessorArch {
    /// Size of a debuggee pointer in bytes.
    pub fn pointer_size(self) -> u32 {
        match self {
            ProcessorArch::Amd64
            | ProcessorArch::Arm64
            | ProcessorArch::RiscV64
            | ProcessorArch::LoongArch64 => 8,
            ProcessorArch::X86 | ProcessorArch::Arm32 => 4,
        }
    }
}

/// Operating system of a debuggee. Everything that is not windows is
/// classified into the posix family.
#[derive(Clone, Copy, Hash, PartialEq, Eq, Debug, Display)]
pub enum OperatingSystem {
    #[strum(serialize = "unknown")]
    Unknown,
    #[strum(serialize = "windows")]
    Windows,
    #[strum(serialize = "linux")]
    Linux,
    #[strum(serialize = "macos")]
    MacOs,
}

impl OperatingSystem {
    pub fn is_windows(self) -> bool {
        self == OperatingSystem::Windows
    }

    pub fn is_posix(self) -> bool {
        !self.is_windows()
    }
}

/// (OS family, architecture) classification of a debuggee. Runtime inspection
/// components select pointer width and ABI-sensitive decoding by this tag.
#[derive(Clone, Copy, Hash, PartialEq, Eq, Debug, Display)]
pub enum PlatformTag {
    #[strum(serialize = "windows-x86")]
    WindowsX86,
    #[strum(serialize = "windows-amd64")]
    WindowsAmd64,
    #[strum(serialize = "windows-arm32")]
    WindowsArm32,
    #[strum(serialize = "windows-arm64")]
    WindowsArm64,
    #[strum(serialize = "posix-x86")]
    PosixX86,
    #[strum(serialize = "posix-amd64")]
    PosixAmd64,
    #[strum(serialize = "posix-arm32")]
    PosixArm32,
    #[strum(serialize = "posix-arm64")]
    PosixArm64,
    #[strum(serialize = "posix-riscv64")]
    PosixRiscV64,
    #[strum(serialize = "posix-loongarch64")]
    PosixLoongArch64,
}

impl PlatformTag {
    /// Classify an (architecture, OS) pair. The mapping is total over the
    /// posix family; riscv64 and loongarch64 have no windows variant.
    pub fn classify(arch: ProcessorArch, os: OperatingSystem) -> Result<PlatformTag> {
        let tag = if os.is_windows() {
            match arch {
                ProcessorArch::X86 => PlatformTag::WindowsX86,
                ProcessorArch::Amd64 => PlatformTag::WindowsAmd64,
                ProcessorArch::Arm32 => PlatformTag::WindowsArm32,
                ProcessorArch::Arm64 => PlatformTag::WindowsArm64,
                ProcessorArch::RiscV64 | ProcessorArch::LoongArch64 => {
                    return Err(Error::UnsupportedPlatform { os, arch })
                }
            }
        } else {
            match arch {
                ProcessorArch::X86 => PlatformTag::PosixX86,
                ProcessorArch::Amd64 => PlatformTag::PosixAmd64,
                ProcessorArch::Arm32 => PlatformTag::PosixArm32,
                ProcessorArch::Arm64 => PlatformTag::PosixArm64,
                ProcessorArch::RiscV64 => PlatformTag::PosixRiscV64,
                ProcessorArch::LoongArch64 => PlatformTag::PosixLoongArch64,
            }
        };
        Ok(tag)
    }
}

/// Canonicalize a debuggee address that may arrive sign-extended from a
/// 32-bit source. On 32-bit targets the bit pattern is reinterpreted as an
/// unsigned pointer-width value; on 64-bit targets the address is already
/// canonical. Idempotent.
pub fn canonical_address(address: u64, arch: ProcessorArch) -> u64 {
    match arch.pointer_size() {
        4 => address & u32::MAX as u64,
        _ => address,
    }
}
