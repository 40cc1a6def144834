// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Round-robin rotation over a fixed ring of descriptor pools.

use std::sync::atomic::{AtomicUsize, Ordering};

/// A fixed-size ring of descriptor pool handles with one "current" slot,
/// for transient (single-frame-lifetime) descriptor-set allocation.
///
/// Rotating `N` pools round-robin bounds total transient descriptor
/// memory to `N×` one frame's worth while ensuring a pool is never reset
/// and reallocated from within the same frame. `N` is chosen to cover the
/// in-flight frame depth.
///
/// The ring only hands out pool handles; it does not track GPU
/// completion. Callers advance it at frame boundaries, typically from a
/// single submission thread, and must ensure the pool rotated to is no
/// longer referenced by in-flight GPU work before resetting or reusing
/// it. The index is atomic so concurrent `current()` observers are
/// data-race free; `advance()` itself is not meant to race with other
/// `advance()` calls.
#[derive(Debug)]
pub struct DescriptorPoolRing<P: Copy, const N: usize = 4> {
    pools: [P; N],
    index: AtomicUsize,
}

impl<P: Copy, const N: usize> DescriptorPoolRing<P, N> {
    /// Creates a ring over `pools`, with slot 0 current.
    pub fn new(pools: [P; N]) -> Self {
        const {
            assert!(N > 0);
        }
        Self {
            pools,
            index: AtomicUsize::new(0),
        }
    }

    /// Returns the pool at the current slot.
    pub fn current(&self) -> P {
        self.pools[self.index.load(Ordering::Acquire)]
    }

    /// Rotates to the next slot (`(i + 1) mod N`) and returns the pool
    /// that is now current.
    pub fn advance(&self) -> P {
        let next = (self.index.load(Ordering::Relaxed) + 1) % N;
        self.index.store(next, Ordering::Release);
        self.pools[next]
    }

    /// Returns the number of pools in the ring.
    pub const fn len(&self) -> usize {
        N
    }

    /// A ring is never empty (`N > 0` is asserted at construction).
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Returns all pool handles, for backend teardown.
    pub fn pools(&self) -> &[P; N] {
        &self.pools
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_slot_zero() {
        let ring: DescriptorPoolRing<u64, 4> = DescriptorPoolRing::new([10, 11, 12, 13]);
        assert_eq!(ring.current(), 10);
        assert_eq!(ring.len(), 4);
    }

    #[test]
    fn advance_wraps_modulo_ring_size() {
        let ring: DescriptorPoolRing<u64, 4> = DescriptorPoolRing::new([10, 11, 12, 13]);
        for k in 1..=9 {
            let now_current = ring.advance();
            assert_eq!(now_current, 10 + (k % 4) as u64);
            assert_eq!(ring.current(), now_current);
        }
    }

    #[test]
    fn single_slot_ring_always_returns_same_pool() {
        let ring: DescriptorPoolRing<u64, 1> = DescriptorPoolRing::new([42]);
        assert_eq!(ring.current(), 42);
        assert_eq!(ring.advance(), 42);
        assert_eq!(ring.current(), 42);
    }
}
