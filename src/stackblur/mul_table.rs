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
use crate::radius::MAX_RADIUS;

const TABLE_SIZE: usize = MAX_RADIUS as usize + 1;

/// `ceil(2^shr / (r + 1)^2)` with `shr = floor(log2((r + 1)^2)) + 9`, which keeps
/// the multiplier in `257..=512` and reproduces the published stack blur tables.
const fn stack_blur_scale(radius: usize) -> (u32, u32) {
    let div = ((radius + 1) * (radius + 1)) as u64;
    let shr = 63 - div.leading_zeros() + 9;
    let mul = ((1u64 << shr) + div - 1) / div;
    (mul as u32, shr)
}

const fn make_mul_table() -> [u32; TABLE_SIZE] {
    let mut table = [0u32; TABLE_SIZE];
    let mut radius = 0;
    while radius < TABLE_SIZE {
        table[radius] = stack_blur_scale(radius).0;
        radius += 1;
    }
    table
}

const fn make_shr_table() -> [u32; TABLE_SIZE] {
    let mut table = [0u32; TABLE_SIZE];
    let mut radius = 0;
    while radius < TABLE_SIZE {
        table[radius] = stack_blur_scale(radius).1;
        radius += 1;
    }
    table
}

pub(crate) static MUL_TABLE_STACK_BLUR: [u32; TABLE_SIZE] = make_mul_table();
pub(crate) static SHR_TABLE_STACK_BLUR: [u32; TABLE_SIZE] = make_shr_table();

/// Multiplier and shift replacing the division by `(radius + 1)^2`.
#[inline]
pub(crate) fn scale_for_radius(radius: u32) -> (u32, u32) {
    let radius = radius.min(MAX_RADIUS) as usize;
    (MUL_TABLE_STACK_BLUR[radius], SHR_TABLE_STACK_BLUR[radius])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_published_tables() {
        let mul: [u32; 25] = [
            512, 512, 456, 512, 328, 456, 335, 512, 405, 328, 271, 456, 388, 335, 292, 512, 454,
            405, 364, 328, 298, 271, 496, 456, 420,
        ];
        let shr: [u32; 25] = [
            9, 11, 12, 13, 13, 14, 14, 15, 15, 15, 15, 16, 16, 16, 16, 17, 17, 17, 17, 17, 17, 17,
            18, 18, 18,
        ];
        assert_eq!(&MUL_TABLE_STACK_BLUR[..25], &mul);
        assert_eq!(&SHR_TABLE_STACK_BLUR[..25], &shr);
        assert_eq!(SHR_TABLE_STACK_BLUR[MAX_RADIUS as usize], 24);
    }

    #[test]
    fn test_uniform_value_is_preserved() {
        for radius in 0..=MAX_RADIUS {
            let (mul, shr) = scale_for_radius(radius);
            let weight = (radius as u64 + 1) * (radius as u64 + 1);
            for value in [0u64, 1, 127, 128, 254, 255] {
                assert_eq!((value * weight * mul as u64) >> shr, value, "radius {radius}");
            }
        }
    }
}
