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
use crate::{pack_argb, unpack_argb, BackendDispatcher, BlurError, PixelBuffer};
use image::{DynamicImage, RgbaImage};

/// Packs an RGBA8 image into an owned ARGB buffer.
pub fn pixel_buffer_from_rgba(image: &RgbaImage) -> Result<PixelBuffer<'static>, BlurError> {
    let data = image
        .as_raw()
        .chunks_exact(4)
        .map(|px| pack_argb(px[3], px[0], px[1], px[2]))
        .collect();
    PixelBuffer::from_vec(data, image.width(), image.height())
}

/// Unpacks the visible pixels of an ARGB buffer into an RGBA8 image.
pub fn rgba_from_pixel_buffer(buffer: &PixelBuffer<'_>) -> Result<RgbaImage, BlurError> {
    buffer.check_layout()?;
    let mut raw = Vec::with_capacity(buffer.width as usize * buffer.height as usize * 4);
    for &pixel in buffer.rows().flatten() {
        let [a, r, g, b] = unpack_argb(pixel);
        raw.extend_from_slice(&[r, g, b, a]);
    }
    RgbaImage::from_raw(buffer.width, buffer.height, raw)
        .ok_or_else(|| BlurError::Fatal("Can't assemble RGBA image".to_string()))
}

/// Performs stack blur on the image
///
/// 8-bit images keep their color type; every other type is blurred and returned
/// as RGBA8.
///
/// NOTE: Alpha must be associated if this image with alpha
///
/// # Arguments
///
/// * `image`: Dynamic image provided by image crate
/// * `radius`: radius limited to 254
/// * `dispatcher` - Backend selection and worker pool
///
pub fn stack_blur_image(
    image: &DynamicImage,
    radius: f32,
    dispatcher: &BackendDispatcher,
) -> Result<DynamicImage, BlurError> {
    let source = pixel_buffer_from_rgba(&image.to_rgba8())?;
    let mut output = PixelBuffer::alloc(source.width, source.height);
    dispatcher.blur(&source, radius, &mut output, None, None)?;
    let blurred = DynamicImage::ImageRgba8(rgba_from_pixel_buffer(&output)?);
    Ok(match image {
        DynamicImage::ImageLuma8(_) => DynamicImage::ImageLuma8(blurred.to_luma8()),
        DynamicImage::ImageLumaA8(_) => DynamicImage::ImageLumaA8(blurred.to_luma_alpha8()),
        DynamicImage::ImageRgb8(_) => DynamicImage::ImageRgb8(blurred.to_rgb8()),
        _ => blurred,
    })
}
