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
use crate::shared_pixels::SharedPixels;
use crate::stackblur::mul_table::scale_for_radius;
use crate::stackblur::sliding_window::SlidingWindow;
use crate::stackblur::stack_blur_pass::{LineBlur, LineSpan};

/// Portable sliding window, one channel at a time.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct ScalarLineBlur;

impl LineBlur for ScalarLineBlur {
    fn blur_line(&self, pixels: &SharedPixels, span: LineSpan, radius: u32) {
        let (mul_sum, shr_sum) = scale_for_radius(radius);
        let radius = radius as usize;
        let div = radius * 2 + 1;
        let last = span.len - 1;

        let mut stacks = vec![SlidingWindow::default(); div];
        let mut sum = SlidingWindow::default();
        let mut sum_in = SlidingWindow::default();
        let mut sum_out = SlidingWindow::default();

        let src = SlidingWindow::from_argb(pixels.read(span.start));
        for i in 0..=radius {
            unsafe { *stacks.get_unchecked_mut(i) = src };
            sum += src * (i as i32 + 1);
            sum_out += src;
        }

        for i in 1..=radius {
            let src = SlidingWindow::from_argb(pixels.read(span.at(i.min(last))));
            unsafe { *stacks.get_unchecked_mut(i + radius) = src };
            sum += src * (radius + 1 - i) as i32;
            sum_in += src;
        }

        let mut sp = radius;
        let mut xp = radius.min(last);
        let mut src_ptr = span.at(xp);
        let mut dst_ptr = span.start;

        for _ in 0..span.len {
            unsafe { pixels.write(dst_ptr, sum.to_argb(mul_sum, shr_sum)) };
            dst_ptr += span.step;

            sum -= sum_out;

            let mut stack_start = sp + div - radius;
            if stack_start >= div {
                stack_start -= div;
            }
            let stack = unsafe { stacks.get_unchecked_mut(stack_start) };

            sum_out -= *stack;

            if xp < last {
                src_ptr += span.step;
                xp += 1;
            }

            let src = SlidingWindow::from_argb(pixels.read(src_ptr));
            *stack = src;
            sum_in += src;
            sum += sum_in;

            sp += 1;
            if sp >= div {
                sp = 0;
            }
            let stack = unsafe { *stacks.get_unchecked(sp) };

            sum_out += stack;
            sum_in -= stack;
        }
    }
}
