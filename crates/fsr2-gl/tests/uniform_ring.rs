mod common;

use common::{Call, MockDevice};
use fsr2_core::Fsr2Error;
use fsr2_gl::limits::{UBO_RING_BUFFER_SIZE, UBO_SIZE};
use fsr2_gl::UniformRing;

const PERSISTENT_WRITE: u32 = gl::MAP_WRITE_BIT | gl::MAP_PERSISTENT_BIT | gl::MAP_COHERENT_BIT;

#[test]
fn ring_has_one_mapped_buffer_per_pass_per_frame() -> anyhow::Result<()> {
    assert_eq!(UBO_RING_BUFFER_SIZE, 144);

    let device = MockDevice::new();
    let mut ring = UniformRing::create(&device)?;

    let storage: Vec<_> = device
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            Call::BufferStorage { size, flags, data, .. } => Some((size, flags, data)),
            _ => None,
        })
        .collect();
    assert_eq!(storage.len(), UBO_RING_BUFFER_SIZE);
    assert!(storage
        .iter()
        .all(|entry| *entry == (UBO_SIZE, PERSISTENT_WRITE, None)));
    assert_eq!(device.state().mapped.len(), UBO_RING_BUFFER_SIZE);

    ring.destroy(&device);
    assert_eq!(device.live_total(), 0);
    Ok(())
}

#[test]
fn acquire_writes_into_mapped_memory() -> anyhow::Result<()> {
    let device = MockDevice::new();
    let mut ring = UniformRing::create(&device)?;

    let payload = [0xAAu8, 0xBB, 0xCC, 0xDD, 0x01];
    let slot = ring.acquire(4, Some(&payload[..]));

    let contents = device.buffer_contents(slot.buffer());
    assert_eq!(contents.len(), UBO_SIZE);
    assert_eq!(&contents[..5], &[0xAA, 0xBB, 0xCC, 0xDD, 0]);
    assert_eq!(ring.index(), 1);

    let untouched = ring.acquire(16, None);
    assert!(device.buffer_contents(untouched.buffer()).iter().all(|b| *b == 0));

    ring.destroy(&device);
    Ok(())
}

#[test]
fn ring_wraps_after_every_slot_is_used() -> anyhow::Result<()> {
    let device = MockDevice::new();
    let mut ring = UniformRing::create(&device)?;

    let first = ring.acquire(UBO_SIZE, Some(&[1u8; UBO_SIZE][..]));
    for _ in 1..UBO_RING_BUFFER_SIZE {
        ring.acquire(0, None);
    }
    assert_eq!(ring.index(), 0);

    let wrapped = ring.acquire(4, Some(&[7u8, 7, 7, 7][..]));
    assert_eq!(wrapped.buffer(), first.buffer());
    let contents = device.buffer_contents(first.buffer());
    assert_eq!(&contents[..5], &[7, 7, 7, 7, 1]);

    ring.destroy(&device);
    Ok(())
}

#[test]
fn mapping_failure_leaks_nothing() {
    let device = MockDevice::with(|state| state.fail_map_after = Some(5));

    let err = UniformRing::create(&device).unwrap_err();

    assert_eq!(err, Fsr2Error::BackendApi("uniform buffer mapping failed"));
    assert_eq!(device.live_total(), 0);
    assert!(device.state().mapped.is_empty());
}

#[test]
#[should_panic(expected = "exceeds 256")]
fn oversized_payload_panics() {
    let device = MockDevice::new();
    let Ok(mut ring) = UniformRing::create(&device) else {
        return;
    };
    ring.acquire(UBO_SIZE + 4, None);
}
