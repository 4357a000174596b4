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
use crate::stackblur::{select_line_blur, LineBlur, PlaneLayout, StackBlurPass};
use crate::{BlurError, Interrupt, PixelBuffer, WorkerPool};
use std::sync::Arc;

/// SIMD backend: explicit horizontal and vertical rounds, one task per worker.
#[derive(Clone, Debug)]
pub struct NativeBackend {
    pool: Arc<WorkerPool>,
}

/// Work of one worker in one round: every `workers`-th line starting at `worker`.
#[allow(clippy::too_many_arguments)]
fn blur_round(
    line_blur: &dyn LineBlur,
    pixels: &SharedPixels,
    layout: &PlaneLayout,
    round: StackBlurPass,
    radius: u32,
    worker: usize,
    workers: usize,
    interrupt: &Interrupt,
) {
    for index in (worker..round.lines(layout)).step_by(workers) {
        if interrupt.is_raised() {
            return;
        }
        line_blur.blur_line(pixels, round.span(layout, index), radius);
    }
}

impl NativeBackend {
    pub fn new(pool: Arc<WorkerPool>) -> NativeBackend {
        NativeBackend { pool }
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
        let line_blur = select_line_blur();
        let layout = PlaneLayout::of(output);
        let pixels = SharedPixels::new(output.data.borrow_mut());
        for round in [StackBlurPass::Horizontal, StackBlurPass::Vertical] {
            self.pool.run_rounds(interrupt, |worker, workers| {
                blur_round(
                    line_blur,
                    &pixels,
                    &layout,
                    round,
                    radius.get(),
                    worker,
                    workers,
                    interrupt,
                );
            })?;
        }
        Ok(())
    }
}
