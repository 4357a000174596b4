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
use crate::PixelBuffer;

/// Geometry of the plane being blurred, in pixels.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct PlaneLayout {
    pub width: usize,
    pub height: usize,
    pub stride: usize,
}

impl PlaneLayout {
    pub(crate) fn of(image: &PixelBuffer<'_>) -> PlaneLayout {
        PlaneLayout {
            width: image.width as usize,
            height: image.height as usize,
            stride: image.row_stride() as usize,
        }
    }
}

/// One row or column: `len` pixels starting at `start`, `step` apart.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct LineSpan {
    pub start: usize,
    pub step: usize,
    pub len: usize,
}

impl LineSpan {
    #[inline(always)]
    pub(crate) fn at(&self, position: usize) -> usize {
        self.start + position * self.step
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum StackBlurPass {
    Horizontal,
    Vertical,
}

impl StackBlurPass {
    /// Number of independent lines of this pass.
    #[inline]
    pub(crate) fn lines(self, layout: &PlaneLayout) -> usize {
        match self {
            StackBlurPass::Horizontal => layout.height,
            StackBlurPass::Vertical => layout.width,
        }
    }

    #[inline]
    pub(crate) fn span(self, layout: &PlaneLayout, index: usize) -> LineSpan {
        match self {
            StackBlurPass::Horizontal => LineSpan {
                start: index * layout.stride,
                step: 1,
                len: layout.width,
            },
            StackBlurPass::Vertical => LineSpan {
                start: index,
                step: layout.stride,
                len: layout.height,
            },
        }
    }
}

/// Blurs a single line in place.
///
/// Implementations must be numerically identical: every one of them reproduces
/// `(sum * MUL[r]) >> SHR[r]` exactly.
pub(crate) trait LineBlur: Send + Sync {
    fn blur_line(&self, pixels: &SharedPixels, span: LineSpan, radius: u32);
}
