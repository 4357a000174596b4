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
use crate::stackblur::stack_blur_pass::{LineBlur, LineSpan};
use std::arch::aarch64::*;

/// NEON sliding window, lanes are `[b, g, r, a]`.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct NeonLineBlur;

#[inline]
#[target_feature(enable = "neon")]
unsafe fn load_argb(pixel: u32) -> uint32x4_t {
    vmovl_u16(vget_low_u16(vmovl_u8(vcreate_u8(pixel as u64))))
}

#[inline]
#[target_feature(enable = "neon")]
unsafe fn store_argb(sum: uint32x4_t, mul: u32, shr: int64x2_t) -> u32 {
    let lo = vshlq_u64(vmull_n_u32(vget_low_u32(sum), mul), shr);
    let hi = vshlq_u64(vmull_high_n_u32(sum, mul), shr);
    let lanes = vmovn_u32(vcombine_u32(vmovn_u64(lo), vmovn_u64(hi)));
    let bytes = vmovn_u16(vcombine_u16(lanes, lanes));
    vget_lane_u32::<0>(vreinterpret_u32_u8(bytes))
}

impl NeonLineBlur {
    #[target_feature(enable = "neon")]
    unsafe fn blur_line_impl(&self, pixels: &SharedPixels, span: LineSpan, radius: u32) {
        let (mul_sum, shr_sum) = scale_for_radius(radius);
        let v_shr = vdupq_n_s64(-(shr_sum as i64));
        let radius = radius as usize;
        let div = radius * 2 + 1;
        let last = span.len - 1;

        let mut stacks = vec![vdupq_n_u32(0); div];
        let mut sum = vdupq_n_u32(0);
        let mut sum_in = vdupq_n_u32(0);
        let mut sum_out = vdupq_n_u32(0);

        let src = load_argb(pixels.read(span.start));
        for i in 0..=radius {
            *stacks.get_unchecked_mut(i) = src;
            sum = vaddq_u32(sum, vmulq_n_u32(src, i as u32 + 1));
            sum_out = vaddq_u32(sum_out, src);
        }

        for i in 1..=radius {
            let src = load_argb(pixels.read(span.at(i.min(last))));
            *stacks.get_unchecked_mut(i + radius) = src;
            sum = vaddq_u32(sum, vmulq_n_u32(src, (radius + 1 - i) as u32));
            sum_in = vaddq_u32(sum_in, src);
        }

        let mut sp = radius;
        let mut xp = radius.min(last);
        let mut src_ptr = span.at(xp);
        let mut dst_ptr = span.start;

        for _ in 0..span.len {
            pixels.write(dst_ptr, store_argb(sum, mul_sum, v_shr));
            dst_ptr += span.step;

            sum = vsubq_u32(sum, sum_out);

            let mut stack_start = sp + div - radius;
            if stack_start >= div {
                stack_start -= div;
            }
            let stack = stacks.get_unchecked_mut(stack_start);

            sum_out = vsubq_u32(sum_out, *stack);

            if xp < last {
                src_ptr += span.step;
                xp += 1;
            }

            let src = load_argb(pixels.read(src_ptr));
            *stack = src;
            sum_in = vaddq_u32(sum_in, src);
            sum = vaddq_u32(sum, sum_in);

            sp += 1;
            if sp >= div {
                sp = 0;
            }
            let stack = *stacks.get_unchecked(sp);

            sum_out = vaddq_u32(sum_out, stack);
            sum_in = vsubq_u32(sum_in, stack);
        }
    }
}

impl LineBlur for NeonLineBlur {
    fn blur_line(&self, pixels: &SharedPixels, span: LineSpan, radius: u32) {
        unsafe {
            self.blur_line_impl(pixels, span, radius);
        }
    }
}
