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
#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

/// Sliding window holding all four channels of a pixel in one register.
///
/// Lanes are `[b, g, r, a]`, the little endian byte order of `0xAARRGGBB`.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct SseLineBlur;

#[inline]
#[target_feature(enable = "sse4.1")]
unsafe fn load_argb(pixel: u32) -> __m128i {
    _mm_cvtepu8_epi32(_mm_cvtsi32_si128(pixel as i32))
}

/// `(sum * mul) >> shr` per lane, widened to 64 bits so large radii can't overflow.
#[inline]
#[target_feature(enable = "sse4.1")]
unsafe fn store_argb(sum: __m128i, mul: __m128i, shr: __m128i) -> u32 {
    let even = _mm_srl_epi64(_mm_mul_epu32(sum, mul), shr);
    let odd = _mm_srl_epi64(_mm_mul_epu32(_mm_srli_epi64::<32>(sum), mul), shr);
    let lanes = _mm_or_si128(even, _mm_slli_epi64::<32>(odd));
    let narrow = _mm_packus_epi32(lanes, lanes);
    _mm_cvtsi128_si32(_mm_packus_epi16(narrow, narrow)) as u32
}

impl SseLineBlur {
    #[target_feature(enable = "sse4.1")]
    unsafe fn blur_line_impl(&self, pixels: &SharedPixels, span: LineSpan, radius: u32) {
        let (mul_sum, shr_sum) = scale_for_radius(radius);
        let v_mul = _mm_set1_epi32(mul_sum as i32);
        let v_shr = _mm_cvtsi32_si128(shr_sum as i32);
        let radius = radius as usize;
        let div = radius * 2 + 1;
        let last = span.len - 1;

        let mut stacks = vec![_mm_setzero_si128(); div];
        let mut sum = _mm_setzero_si128();
        let mut sum_in = _mm_setzero_si128();
        let mut sum_out = _mm_setzero_si128();

        let src = load_argb(pixels.read(span.start));
        for i in 0..=radius {
            *stacks.get_unchecked_mut(i) = src;
            sum = _mm_add_epi32(sum, _mm_mullo_epi32(src, _mm_set1_epi32(i as i32 + 1)));
            sum_out = _mm_add_epi32(sum_out, src);
        }

        for i in 1..=radius {
            let src = load_argb(pixels.read(span.at(i.min(last))));
            *stacks.get_unchecked_mut(i + radius) = src;
            let weight = _mm_set1_epi32((radius + 1 - i) as i32);
            sum = _mm_add_epi32(sum, _mm_mullo_epi32(src, weight));
            sum_in = _mm_add_epi32(sum_in, src);
        }

        let mut sp = radius;
        let mut xp = radius.min(last);
        let mut src_ptr = span.at(xp);
        let mut dst_ptr = span.start;

        for _ in 0..span.len {
            pixels.write(dst_ptr, store_argb(sum, v_mul, v_shr));
            dst_ptr += span.step;

            sum = _mm_sub_epi32(sum, sum_out);

            let mut stack_start = sp + div - radius;
            if stack_start >= div {
                stack_start -= div;
            }
            let stack = stacks.get_unchecked_mut(stack_start);

            sum_out = _mm_sub_epi32(sum_out, *stack);

            if xp < last {
                src_ptr += span.step;
                xp += 1;
            }

            let src = load_argb(pixels.read(src_ptr));
            *stack = src;
            sum_in = _mm_add_epi32(sum_in, src);
            sum = _mm_add_epi32(sum, sum_in);

            sp += 1;
            if sp >= div {
                sp = 0;
            }
            let stack = *stacks.get_unchecked(sp);

            sum_out = _mm_add_epi32(sum_out, stack);
            sum_in = _mm_sub_epi32(sum_in, stack);
        }
    }
}

impl LineBlur for SseLineBlur {
    fn blur_line(&self, pixels: &SharedPixels, span: LineSpan, radius: u32) {
        unsafe {
            self.blur_line_impl(pixels, span, radius);
        }
    }
}
