use arbortest_memtrack::MemoryTracker;

#[derive(Clone, Copy, Debug)]
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        // xorshift64*
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    fn gen_range_usize(&mut self, low: usize, high_inclusive: usize) -> usize {
        assert!(low <= high_inclusive);
        let span = high_inclusive - low + 1;
        low + (self.next_u64() as usize % span)
    }
}

#[test]
fn deterministic_alloc_free_sequences_hold_accounting_invariants() {
    // Deterministic, bounded pressure: scripted sequences, not a fuzz
    // campaign. Each live block carries the usable size the tracker reported
    // at allocation time so the shadow model balances exactly.
    const SEEDS: [u64; 4] = [1, 2, 3, 4];
    const STEPS: usize = 2_000;

    for seed in SEEDS {
        let tracker = MemoryTracker::new();
        let mut rng = XorShift64::new(seed);

        let mut live: Vec<(*mut u8, usize)> = Vec::new();
        let mut expected_bytes = 0_usize;

        for step in 0..STEPS {
            let op = rng.gen_range_usize(0, 99);
            if op < 60 || live.is_empty() {
                let size = rng.gen_range_usize(1, 2048);
                let before = tracker.stats().live_bytes;
                let ptr = tracker.allocate(size);
                assert!(!ptr.is_null(), "seed={seed} step={step}: alloc failed");
                let usable = tracker.stats().live_bytes - before;
                assert!(
                    usable >= size,
                    "seed={seed} step={step}: usable {usable} < requested {size}"
                );
                expected_bytes += usable;
                live.push((ptr, usable));
            } else {
                let idx = rng.gen_range_usize(0, live.len() - 1);
                let (ptr, usable) = live.swap_remove(idx);
                tracker.deallocate(ptr);
                expected_bytes -= usable;
            }

            let stats = tracker.stats();
            assert_eq!(
                stats.live_count,
                live.len(),
                "seed={seed} step={step}: live count diverged"
            );
            assert_eq!(
                stats.live_bytes, expected_bytes,
                "seed={seed} step={step}: live bytes diverged"
            );
            assert!(stats.peak_bytes >= stats.live_bytes);
        }

        for (ptr, _) in live.drain(..) {
            tracker.deallocate(ptr);
        }
        assert!(
            tracker.stats().is_balanced(),
            "seed={seed}: final drain must balance"
        );
    }
}

#[test]
fn injected_failures_never_perturb_the_shadow_model() {
    let tracker = MemoryTracker::new();
    let mut rng = XorShift64::new(0xA5A5_A5A5);

    tracker.set_fail_threshold(16 * 1024);

    let mut live: Vec<*mut u8> = Vec::new();
    let mut rejected = 0_usize;

    for _ in 0..500 {
        let size = rng.gen_range_usize(256, 4096);
        let before = tracker.stats();
        let ptr = tracker.allocate(size);
        if ptr.is_null() {
            rejected += 1;
            assert_eq!(tracker.stats(), before, "failed alloc must not account");
            // Make room so the sequence keeps exercising both paths.
            if let Some(victim) = live.pop() {
                tracker.deallocate(victim);
            }
        } else {
            live.push(ptr);
        }
    }

    assert!(rejected > 0, "threshold must have injected failures");
    for ptr in live.drain(..) {
        tracker.deallocate(ptr);
    }
    assert!(tracker.stats().is_balanced());
}
