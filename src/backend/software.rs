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
use crate::backend::validate;
use crate::shared_pixels::SharedPixels;
use crate::stackblur::{LineBlur, PlaneLayout, ScalarLineBlur, StackBlurPass};
use crate::{BlurError, Interrupt, PixelBuffer, WorkerPool};
use std::sync::Arc;

/// Portable backend: scalar kernel, one pool partition per line.
#[derive(Clone, Debug)]
pub struct SoftwareBackend {
    pool: Arc<WorkerPool>,
}

impl SoftwareBackend {
    pub fn new(pool: Arc<WorkerPool>) -> SoftwareBackend {
        SoftwareBackend { pool }
    }

    pub fn blur(
        &self,
        source: &PixelBuffer<'_>,
        radius: f32,
        output: &mut PixelBuffer<'_>,
        interrupt: &Interrupt,
    ) -> Result<(), BlurError> {
        let radius = validate(source, output, radius)?;
        output.copy_from(source)?;
        if radius.is_identity() {
            return Ok(());
        }
        let layout = PlaneLayout::of(output);
        let pixels = SharedPixels::new(output.data.borrow_mut());
        // Vertical lines read the horizontal result, run_partitioned returns only
        // after the whole pass is done.
        for pass in [StackBlurPass::Horizontal, StackBlurPass::Vertical] {
            self.pool
                .run_partitioned(pass.lines(&layout), interrupt, |index| {
                    ScalarLineBlur.blur_line(&pixels, pass.span(&layout, index), radius.get());
                })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::tests::random_image;
    use crate::{stack_blur, ThreadingPolicy};
    use std::num::NonZeroUsize;

    #[test]
    fn test_partition_invariance() {
        let source = random_image(101, 64, 21);
        let mut reference = source.clone();
        stack_blur(&mut reference, 9.).unwrap();
        let hardware = ThreadingPolicy::Adaptive.thread_count();
        for threads in [1, 2, hardware] {
            let policy = ThreadingPolicy::Fixed(NonZeroUsize::new(threads).unwrap());
            let backend = SoftwareBackend::new(Arc::new(WorkerPool::new(policy).unwrap()));
            let mut output = PixelBuffer::alloc(101, 64);
            backend
                .blur(&source, 9., &mut output, &Interrupt::new())
                .unwrap();
            assert_eq!(
                output.data.borrow(),
                reference.data.borrow(),
                "{threads} threads"
            );
        }
    }

    #[test]
    fn test_deterministic() {
        let backend = SoftwareBackend::new(Arc::new(
            WorkerPool::new(ThreadingPolicy::Adaptive).unwrap(),
        ));
        let source = random_image(40, 40, 22);
        let mut first = PixelBuffer::alloc(40, 40);
        let mut second = PixelBuffer::alloc(40, 40);
        backend
            .blur(&source, 6., &mut first, &Interrupt::new())
            .unwrap();
        backend
            .blur(&source, 6., &mut second, &Interrupt::new())
            .unwrap();
        assert_eq!(first.data.borrow(), second.data.borrow());
    }

    #[test]
    fn test_strided_output() {
        let backend = SoftwareBackend::new(Arc::new(
            WorkerPool::new(ThreadingPolicy::Adaptive).unwrap(),
        ));
        let source = random_image(10, 7, 23);
        let mut reference = source.clone();
        stack_blur(&mut reference, 2.).unwrap();
        let mut data = vec![0u32; 13 * 7];
        let mut output = PixelBuffer::borrow(&mut data, 10, 7);
        output.stride = 13;
        backend
            .blur(&source, 2., &mut output, &Interrupt::new())
            .unwrap();
        assert!(output.same_pixels(&reference));
    }
}
