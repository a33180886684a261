#![no_main]

use libfuzzer_sys::fuzz_target;

use lockstep_kernel::{InitializationArgs, Simulator};
use lockstep_model::{BouncingBall, Model};
use lockstep_types::{InstanceHandle, ValueReference};

fn bouncing_ball() -> Box<dyn Model> {
    Box::new(BouncingBall::new())
}

/// Pick a handle: usually one we created, sometimes a fabricated one so
/// the not-found path is exercised too.
fn pick_handle(handles: &[InstanceHandle], selector: u8) -> InstanceHandle {
    if handles.is_empty() || selector >= 240 {
        InstanceHandle::new(u32::from(selector))
    } else {
        handles[selector as usize % handles.len()]
    }
}

/// Read an f64 from up to 8 bytes, zero-padded. NaN and infinity are
/// deliberately reachable.
fn f64_from(bytes: &[u8]) -> f64 {
    let mut raw = [0u8; 8];
    for (slot, byte) in raw.iter_mut().zip(bytes) {
        *slot = *byte;
    }
    f64::from_le_bytes(raw)
}

/// References drawn from a range wider than the model's table, so some
/// resolve and some do not.
fn refs_from(bytes: &[u8]) -> Vec<ValueReference> {
    bytes
        .iter()
        .take(8)
        .map(|byte| ValueReference::new(u32::from(byte % 12)))
        .collect()
}

fuzz_target!(|data: &[u8]| {
    // Drive one simulator through a fuzzed operation sequence.
    //
    // This tests:
    // - No panics on any call order
    // - Atomic reads: a successful read returns one value per reference
    // - Freed handles stop resolving immediately
    // - Lifecycle violations surface as errors, never as corruption

    if data.len() < 2 {
        return;
    }

    let simulator = Simulator::new(bouncing_ball);
    let mut handles: Vec<InstanceHandle> = Vec::new();

    for chunk in data.chunks(12) {
        let op = chunk[0] % 9;
        let selector = chunk.get(1).copied().unwrap_or(0);
        let args = chunk.get(2..).unwrap_or(&[]);
        let handle = pick_handle(&handles, selector);

        match op {
            // Instantiate, bounded so the registry cannot grow unchecked
            0 => {
                if handles.len() < 32 {
                    handles.push(simulator.instantiate());
                }
            }
            1 => {
                let start_time = f64_from(args);
                let init = InitializationArgs {
                    tolerance: (selector & 1 == 1).then_some(1e-6),
                    start_time,
                    stop_time: (selector & 2 == 2).then_some(start_time + 1.0),
                };
                let _ = simulator.enter_initialization_mode(handle, init);
            }
            2 => {
                let _ = simulator.exit_initialization_mode(handle);
            }
            3 => {
                let _ = simulator.do_step(handle, f64_from(args));
            }
            4 => {
                let references = refs_from(args);
                if let Ok(values) = simulator.read(handle, &references) {
                    assert_eq!(
                        values.len(),
                        references.len(),
                        "read returned a partial result"
                    );
                }
            }
            5 => {
                let references = refs_from(args);
                // Length mismatch is reachable when the selector says so
                let count = if selector & 4 == 4 {
                    references.len().wrapping_add(1)
                } else {
                    references.len()
                };
                let values = vec![f64_from(args); count];
                let _ = simulator.write(handle, &references, &values);
            }
            6 => {
                let _ = simulator.reset(handle);
            }
            7 => {
                let _ = simulator.terminate(handle);
            }
            _ => {
                if simulator.free_instance(handle).is_ok() {
                    assert!(
                        simulator.phase(handle).is_err(),
                        "freed handle still resolves"
                    );
                    handles.retain(|h| *h != handle);
                }
            }
        }
    }
});
