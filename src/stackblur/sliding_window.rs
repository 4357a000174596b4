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
use std::ops::{AddAssign, Mul, SubAssign};

/// Per-channel accumulator of the scalar sliding window.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Ord, PartialOrd, Eq, PartialEq)]
pub(crate) struct SlidingWindow {
    pub a: i32,
    pub r: i32,
    pub g: i32,
    pub b: i32,
}

impl SlidingWindow {
    #[inline]
    pub fn from_argb(pixel: u32) -> SlidingWindow {
        SlidingWindow {
            a: (pixel >> 24) as i32,
            r: ((pixel >> 16) & 0xff) as i32,
            g: ((pixel >> 8) & 0xff) as i32,
            b: (pixel & 0xff) as i32,
        }
    }

    /// Divides every channel by `(radius + 1)^2` through `(sum * mul) >> shr`.
    #[inline]
    pub fn to_argb(self, mul: u32, shr: u32) -> u32 {
        #[inline(always)]
        fn scale(v: i32, mul: u32, shr: u32) -> u32 {
            ((v as u64 * mul as u64) >> shr) as u32
        }
        (scale(self.a, mul, shr) << 24)
            | (scale(self.r, mul, shr) << 16)
            | (scale(self.g, mul, shr) << 8)
            | scale(self.b, mul, shr)
    }
}

impl Mul<i32> for SlidingWindow {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: i32) -> Self::Output {
        SlidingWindow {
            a: self.a * rhs,
            r: self.r * rhs,
            g: self.g * rhs,
            b: self.b * rhs,
        }
    }
}

impl AddAssign<SlidingWindow> for SlidingWindow {
    #[inline]
    fn add_assign(&mut self, rhs: SlidingWindow) {
        self.a += rhs.a;
        self.r += rhs.r;
        self.g += rhs.g;
        self.b += rhs.b;
    }
}

impl SubAssign<SlidingWindow> for SlidingWindow {
    #[inline]
    fn sub_assign(&mut self, rhs: SlidingWindow) {
        self.a -= rhs.a;
        self.r -= rhs.r;
        self.g -= rhs.g;
        self.b -= rhs.b;
    }
}
