use crate::common::*;
use corescout::data_target::{DataTarget, DebuggerDataTarget, ImageDataTarget};
use corescout::platform::{OperatingSystem, PlatformTag, ProcessorArch};
use corescout::services::ModuleInfo;
use corescout::Error;
use std::sync::Arc;

fn live_target(arch: ProcessorArch, os: OperatingSystem) -> (Arc<StubDebuggerServices>, DebuggerDataTarget) {
    let services = Arc::new(StubDebuggerServices::new(arch, os));
    let target = DebuggerDataTarget::new(services.clone());
    (services, target)
}

#[test]
fn test_platform_classification_through_adapter() {
    struct TestCase {
        arch: ProcessorArch,
        os: OperatingSystem,
        expected: PlatformTag,
    }
    let test_cases = [
        TestCase {
            arch: ProcessorArch::X86,
            os: OperatingSystem::Windows,
            expected: PlatformTag::WindowsX86,
        },
        TestCase {
            arch: ProcessorArch::Amd64,
            os: OperatingSystem::Linux,
            expected: PlatformTag::PosixAmd64,
        },
        TestCase {
            arch: ProcessorArch::Arm64,
            os: OperatingSystem::MacOs,
            expected: PlatformTag::PosixArm64,
        },
        TestCase {
            arch: ProcessorArch::RiscV64,
            os: OperatingSystem::Linux,
            expected: PlatformTag::PosixRiscV64,
        },
        TestCase {
            arch: ProcessorArch::LoongArch64,
            os: OperatingSystem::Linux,
            expected: PlatformTag::PosixLoongArch64,
        },
    ];

    for tc in test_cases {
        let (_, target) = live_target(tc.arch, tc.os);
        assert_eq!(target.platform().unwrap(), tc.expected);
    }

    let (_, target) = live_target(ProcessorArch::RiscV64, OperatingSystem::Windows);
    assert!(matches!(
        target.platform(),
        Err(Error::UnsupportedPlatform { .. })
    ));
}

#[test]
fn test_pointer_size_through_adapter() {
    for (arch, size) in [
        (ProcessorArch::Amd64, 8),
        (ProcessorArch::Arm64, 8),
        (ProcessorArch::RiscV64, 8),
        (ProcessorArch::LoongArch64, 8),
        (ProcessorArch::X86, 4),
        (ProcessorArch::Arm32, 4),
    ] {
        let (_, target) = live_target(arch, OperatingSystem::Linux);
        assert_eq!(target.pointer_size().unwrap(), size);
    }
}

#[test]
fn test_read_normalizes_sign_extended_addresses() {
    let (services, target) = live_target(ProcessorArch::X86, OperatingSystem::Linux);

    // MEMORY_BASE sign-extended through a 32-bit debugger path
    let sign_extended = 0xFFFF_FFFF_0000_0000u64 | MEMORY_BASE;
    let mut buf = [0u8; 4];
    let read = target.read_virtual(sign_extended, &mut buf).unwrap();
    assert_eq!(read, 4);
    assert_eq!(&buf, &[0, 1, 2, 3]);

    // the engine saw the canonical address
    assert_eq!(services.seen_addresses.lock().unwrap().as_slice(), &[MEMORY_BASE]);
}

#[test]
fn test_no_masking_on_64_bit_targets() {
    let (services, target) = live_target(ProcessorArch::Amd64, OperatingSystem::Linux);

    let sign_extended = 0xFFFF_FFFF_0000_0000u64 | MEMORY_BASE;
    let mut buf = [0u8; 4];
    // a 64-bit target address is already canonical; this one is simply unmapped
    assert!(matches!(
        target.read_virtual(sign_extended, &mut buf),
        Err(Error::Backend(_))
    ));
    assert_eq!(
        services.seen_addresses.lock().unwrap().as_slice(),
        &[sign_extended]
    );
}

#[test]
fn test_write_round_trip() {
    let (_, target) = live_target(ProcessorArch::Amd64, OperatingSystem::Linux);

    let written = target.write_virtual(MEMORY_BASE + 8, &[0xde, 0xad]).unwrap();
    assert_eq!(written, 2);

    let mut buf = [0u8; 4];
    target.read_virtual(MEMORY_BASE + 8, &mut buf).unwrap();
    assert_eq!(&buf, &[0xde, 0xad, 10, 11]);
}

#[test]
fn test_image_base_strips_extension_on_dbgeng() {
    let services = Arc::new(
        StubDebuggerServices::new(ProcessorArch::Amd64, OperatingSystem::Windows).with_module(
            "coreclr",
            ModuleInfo {
                index: 0,
                base: 0x1_0000,
            },
        ),
    );
    let target = DebuggerDataTarget::new(services);
    assert_eq!(target.image_base("coreclr.dll").unwrap(), 0x1_0000);
}

#[test]
fn test_image_base_keeps_name_on_lldb() {
    let services = Arc::new(
        StubDebuggerServices::new(ProcessorArch::Amd64, OperatingSystem::Linux).with_module(
            "libcoreclr.so",
            ModuleInfo {
                index: 0,
                base: 0x2_0000,
            },
        ),
    );
    let target = DebuggerDataTarget::new(services);
    assert_eq!(target.image_base("libcoreclr.so").unwrap(), 0x2_0000);
    assert!(matches!(
        target.image_base("libcoreclr"),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        target.image_base(""),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn test_thread_context_delegation() {
    let (_, target) = live_target(ProcessorArch::Amd64, OperatingSystem::Linux);

    let context = target.thread_context(7, 0x10_001F, 64).unwrap();
    assert_eq!(context.len(), 64);
    assert!(context.iter().all(|b| *b == 7));

    assert_eq!(target.current_thread_id().unwrap(), 1111);
}

#[test]
fn test_mutating_operations_always_unsupported() {
    let (_, target) = live_target(ProcessorArch::Amd64, OperatingSystem::Linux);

    let big_context = [0u8; 1024];
    for context in [&[] as &[u8], &big_context[..]] {
        assert!(matches!(
            target.set_thread_context(0, context),
            Err(Error::NotSupported(_))
        ));
    }
    for (thread_id, status) in [(0, 0), (1111, 0x0001_0002)] {
        assert!(matches!(
            target.continue_status_changed(thread_id, status),
            Err(Error::NotSupported(_))
        ));
    }
    assert!(matches!(
        target.tls_value(1111, 0),
        Err(Error::NotSupported(_))
    ));
    assert!(matches!(
        target.set_tls_value(1111, 0, 0xbeef),
        Err(Error::NotSupported(_))
    ));
}

#[test]
fn test_virtual_unwind_follows_engine_support() {
    let (_, target) = live_target(ProcessorArch::Amd64, OperatingSystem::Linux);
    let mut context = [0u8; 16];
    assert!(matches!(
        target.virtual_unwind(1111, &mut context),
        Err(Error::NotSupported(_))
    ));

    let services = Arc::new(
        StubDebuggerServices::new(ProcessorArch::Amd64, OperatingSystem::Linux).with_unwind(),
    );
    let target = DebuggerDataTarget::new(services);
    target.virtual_unwind(1111, &mut context).unwrap();
    assert!(context.iter().all(|b| *b == 0xAA));
}

#[test]
fn test_remote_memory_capability() {
    let (_, target) = live_target(ProcessorArch::Amd64, OperatingSystem::Linux);
    assert!(matches!(
        target.alloc_virtual(0, 0x1000, 0, 0),
        Err(Error::NotSupported(_))
    ));
    assert!(matches!(
        target.free_virtual(0, 0x1000, 0),
        Err(Error::NotSupported(_))
    ));

    let services = Arc::new(
        StubDebuggerServices::new(ProcessorArch::X86, OperatingSystem::Linux)
            .with_remote_memory(),
    );
    let remote = services.remote_memory.clone().unwrap();
    let target = DebuggerDataTarget::new(services);

    let allocated = target
        .alloc_virtual(0xFFFF_FFFF_0000_2000, 0x1000, 0, 0)
        .unwrap();
    assert_eq!(allocated, 0x00de_a000);
    // the allocation hint was canonicalized for the 32-bit target
    assert_eq!(remote.allocations.lock().unwrap().as_slice(), &[(0x2000, 0x1000)]);

    target.free_virtual(allocated, 0x1000, 0).unwrap();
    assert_eq!(
        remote.frees.lock().unwrap().as_slice(),
        &[(0x00de_a000, 0x1000)]
    );
}

#[test]
fn test_runtime_base() {
    let (_, target) = live_target(ProcessorArch::Amd64, OperatingSystem::Linux);
    assert!(matches!(target.runtime_base(), Err(Error::NotFound(_))));

    let services = Arc::new(StubDebuggerServices::new(
        ProcessorArch::Amd64,
        OperatingSystem::Linux,
    ));
    let target = DebuggerDataTarget::with_runtime_base(services, 0x7f00_dead_0000);
    assert_eq!(target.runtime_base().unwrap(), 0x7f00_dead_0000);
}

#[test]
fn test_image_target_end_to_end() {
    let bytes = vec![0x7f, b'E', b'L', b'F', 2, 1, 1, 0];
    let target = ImageDataTarget::from_bytes(bytes.clone(), 0x5000_0000);

    let mut buf = [0u8; 4];
    assert_eq!(target.read_virtual(0, &mut buf).unwrap(), 4);
    assert_eq!(&buf, &bytes[..4]);
    assert_eq!(target.runtime_base().unwrap(), 0x5000_0000);

    assert!(matches!(target.platform(), Err(Error::NotSupported(_))));
    assert!(matches!(
        target.thread_context(0, 0, 64),
        Err(Error::NotSupported(_))
    ));
    assert!(matches!(
        target.set_thread_context(0, &[]),
        Err(Error::NotSupported(_))
    ));
}
