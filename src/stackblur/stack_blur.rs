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
#[cfg(all(target_arch = "aarch64", target_feature = "neon", feature = "neon"))]
use crate::stackblur::neon::NeonLineBlur;
use crate::stackblur::scalar::ScalarLineBlur;
#[cfg(all(any(target_arch = "x86_64", target_arch = "x86"), feature = "sse"))]
use crate::stackblur::sse::SseLineBlur;
use crate::shared_pixels::SharedPixels;
use crate::stackblur::stack_blur_pass::{LineBlur, PlaneLayout, StackBlurPass};
use crate::{BlurError, BlurRadius, PixelBuffer};

/// Picks the fastest line implementation the running CPU supports.
#[allow(unreachable_code)]
pub(crate) fn select_line_blur() -> &'static dyn LineBlur {
    #[cfg(all(any(target_arch = "x86_64", target_arch = "x86"), feature = "sse"))]
    if std::arch::is_x86_feature_detected!("sse4.1") {
        return &SseLineBlur;
    }
    #[cfg(all(target_arch = "aarch64", target_feature = "neon", feature = "neon"))]
    {
        return &NeonLineBlur;
    }
    &ScalarLineBlur
}

/// Runs every line of `pass` on the calling thread.
pub(crate) fn run_pass_serial(
    line_blur: &dyn LineBlur,
    pixels: &SharedPixels,
    layout: &PlaneLayout,
    pass: StackBlurPass,
    radius: u32,
) {
    for index in 0..pass.lines(layout) {
        line_blur.blur_line(pixels, pass.span(layout, index), radius);
    }
}

/// Reference stack blur, in place on the calling thread.
///
/// Horizontal pass over every row, then vertical pass over every column of the
/// horizontal result. Edges are replicated.
///
/// # Arguments
/// * `image` - packed ARGB image, used as a source and destination.
/// * `radius` - fractional part is truncated, limited to 254, 0 leaves the image untouched.
///
/// # Complexity
/// O(1) per pixel, independent of radius.
pub fn stack_blur(image: &mut PixelBuffer<'_>, radius: f32) -> Result<(), BlurError> {
    image.check_layout()?;
    let radius = BlurRadius::from_f32(radius)?;
    if radius.is_identity() {
        return Ok(());
    }
    let layout = PlaneLayout::of(image);
    let pixels = SharedPixels::new(image.data.borrow_mut());
    for pass in [StackBlurPass::Horizontal, StackBlurPass::Vertical] {
        run_pass_serial(&ScalarLineBlur, &pixels, &layout, pass, radius.get());
    }
    Ok(())
}
