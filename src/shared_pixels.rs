// Copyright (c) Radzivon Bartoshyk. All rights reserved.
//
// Redistribution and use in source and binary forms, with or without modification,
// are permitted provided that the following conditions are met:
//
// 1.  Redistributions of source code must retain the above copyright notice, this
// list of conditions and the following disclaimer.
//
// 2.  Redistributions in binary form must reproduce the above copyright notice,
// this list of conditions and the following disclaimer in the documentation
// and/or other materials provided with the distribution.
//
// 3.  Neither the name of the copyright holder nor the names of its
// contributors may be used to endorse or promote products derived from
// this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
// FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
// DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
// CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
// OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
use std::cell::UnsafeCell;

/// Pixel storage shared between workers of one pass.
///
/// Each worker owns a disjoint set of lines, so writes never alias within a pass.
/// A pass barrier separates readers of one pass from writers of the next.
#[derive(Copy, Clone, Debug)]
pub(crate) struct SharedPixels<'a> {
    cells: &'a [UnsafeCell<u32>],
}

unsafe impl Send for SharedPixels<'_> {}

unsafe impl Sync for SharedPixels<'_> {}

impl<'a> SharedPixels<'a> {
    pub(crate) fn new(pixels: &'a mut [u32]) -> Self {
        let ptr = pixels as *mut [u32] as *const [UnsafeCell<u32>];
        Self {
            cells: unsafe { &*ptr },
        }
    }

    #[inline(always)]
    pub(crate) fn read(&self, i: usize) -> u32 {
        debug_assert!(i < self.cells.len());
        unsafe { *self.cells.get_unchecked(i).get() }
    }

    /// SAFETY: It is UB if two threads touch the same index without
    /// synchronization, one of them writing.
    #[inline(always)]
    pub(crate) unsafe fn write(&self, i: usize, value: u32) {
        debug_assert!(i < self.cells.len());
        *self.cells.get_unchecked(i).get() = value;
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disjoint_writes() {
        let mut data = vec![0u32; 64];
        let shared = SharedPixels::new(&mut data);
        std::thread::scope(|scope| {
            for worker in 0..4usize {
                scope.spawn(move || {
                    for i in (worker..shared.len()).step_by(4) {
                        unsafe { shared.write(i, i as u32) };
                    }
                });
            }
        });
        assert!(data.iter().enumerate().all(|(i, &v)| v == i as u32));
    }
}
