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
use crate::util::check_slice_size;
use crate::{ArgumentError, BlurError};
use std::fmt::Debug;

/// Packs channels into the `0xAARRGGBB` layout used by every [`PixelBuffer`].
#[inline]
pub const fn pack_argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Splits a `0xAARRGGBB` pixel into `[a, r, g, b]`.
#[inline]
pub const fn unpack_argb(pixel: u32) -> [u8; 4] {
    [
        (pixel >> 24) as u8,
        (pixel >> 16) as u8,
        (pixel >> 8) as u8,
        pixel as u8,
    ]
}

#[derive(Debug)]
pub enum BufferStore<'a> {
    Borrowed(&'a mut [u32]),
    Owned(Vec<u32>),
}

impl BufferStore<'_> {
    #[allow(clippy::should_implement_trait)]
    pub fn borrow(&self) -> &[u32] {
        match self {
            Self::Borrowed(p_ref) => p_ref,
            Self::Owned(vec) => vec,
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn borrow_mut(&mut self) -> &mut [u32] {
        match self {
            Self::Borrowed(p_ref) => p_ref,
            Self::Owned(vec) => vec,
        }
    }
}

/// Rectangular image of packed ARGB 8888 pixels, one `u32` per pixel.
///
/// The buffer either owns its storage or borrows caller memory, which lets
/// high-frequency callers reuse one output allocation across calls.
#[derive(Debug)]
pub struct PixelBuffer<'a> {
    pub data: BufferStore<'a>,
    pub width: u32,
    pub height: u32,
    /// Pixels per row, might be 0
    pub stride: u32,
}

impl PixelBuffer<'static> {
    /// Allocates transparent black image
    pub fn alloc(width: u32, height: u32) -> Self {
        PixelBuffer::filled(width, height, 0)
    }

    /// Allocates image with every pixel set to `color`
    pub fn filled(width: u32, height: u32, color: u32) -> Self {
        Self {
            data: BufferStore::Owned(vec![color; width as usize * height as usize]),
            width,
            height,
            stride: width,
        }
    }

    /// Takes ownership of tightly packed pixels
    pub fn from_vec(data: Vec<u32>, width: u32, height: u32) -> Result<Self, BlurError> {
        let image = Self {
            data: BufferStore::Owned(data),
            width,
            height,
            stride: width,
        };
        image.check_layout()?;
        Ok(image)
    }
}

impl<'a> PixelBuffer<'a> {
    /// Mutable borrows existing data
    /// Stride will be default `width`
    pub fn borrow(arr: &'a mut [u32], width: u32, height: u32) -> Self {
        Self {
            data: BufferStore::Borrowed(arr),
            width,
            height,
            stride: width,
        }
    }

    /// Returns row stride
    #[inline]
    pub fn row_stride(&self) -> u32 {
        if self.stride == 0 {
            self.width
        } else {
            self.stride
        }
    }

    #[inline]
    pub fn check_layout(&self) -> Result<(), ArgumentError> {
        check_slice_size(
            self.data.borrow().len(),
            self.row_stride() as usize,
            self.width as usize,
            self.height as usize,
        )
    }

    /// Checks if it is matches the size of the other image
    #[inline]
    pub fn size_matches(&self, other: &PixelBuffer<'_>) -> Result<(), ArgumentError> {
        if self.width == other.width && self.height == other.height {
            return Ok(());
        }
        Err(ArgumentError::ImagesMustMatch)
    }

    /// Pixel at column `x` of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the stored data.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        self.data.borrow()[y as usize * self.row_stride() as usize + x as usize]
    }

    /// # Panics
    ///
    /// Panics if the coordinates are outside the stored data.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: u32) {
        let stride = self.row_stride() as usize;
        self.data.borrow_mut()[y as usize * stride + x as usize] = color;
    }

    /// Visible part of each row, padding excluded
    pub fn rows(&self) -> impl Iterator<Item = &[u32]> + '_ {
        let width = self.width as usize;
        self.data
            .borrow()
            .chunks(self.row_stride() as usize)
            .take(self.height as usize)
            .map(move |row| &row[..width])
    }

    /// Copies visible pixels of `src` into this image. Sizes must match.
    pub fn copy_from(&mut self, src: &PixelBuffer<'_>) -> Result<(), ArgumentError> {
        src.check_layout()?;
        self.check_layout()?;
        self.size_matches(src)?;
        let width = self.width as usize;
        let dst_stride = self.row_stride() as usize;
        for (src, dst) in src
            .rows()
            .zip(self.data.borrow_mut().chunks_mut(dst_stride))
        {
            dst[..width].copy_from_slice(src);
        }
        Ok(())
    }

    /// Deep copy into an owned, tightly packed image
    pub fn to_owned_buffer(&self) -> PixelBuffer<'static> {
        let mut data = Vec::with_capacity(self.width as usize * self.height as usize);
        for row in self.rows() {
            data.extend_from_slice(row);
        }
        PixelBuffer {
            data: BufferStore::Owned(data),
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }

    /// Compares visible pixels only, ignoring stride padding
    pub fn same_pixels(&self, other: &PixelBuffer<'_>) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.rows().zip(other.rows()).all(|(a, b)| a == b)
    }
}

impl Clone for PixelBuffer<'_> {
    fn clone(&self) -> Self {
        self.to_owned_buffer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack() {
        let pixel = pack_argb(0x12, 0x34, 0x56, 0x78);
        assert_eq!(pixel, 0x12345678);
        assert_eq!(unpack_argb(pixel), [0x12, 0x34, 0x56, 0x78]);
    }

    #[test]
    fn test_copy_respects_stride() {
        let mut padded = vec![7u32; 5 * 3];
        let mut src = PixelBuffer::borrow(&mut padded, 4, 3);
        src.stride = 5;
        src.set_pixel(3, 2, 42);
        let mut dst = PixelBuffer::alloc(4, 3);
        dst.copy_from(&src).unwrap();
        assert_eq!(dst.pixel(3, 2), 42);
        assert_eq!(dst.pixel(0, 0), 7);
        assert!(dst.same_pixels(&src));
        assert_eq!(src.to_owned_buffer().data.borrow().len(), 12);
    }

    #[test]
    #[should_panic]
    fn test_pixel_outside_image_panics() {
        let image = PixelBuffer::alloc(4, 3);
        image.pixel(0, 3);
    }

    #[test]
    fn test_copy_rejects_mismatch() {
        let src = PixelBuffer::alloc(4, 3);
        let mut dst = PixelBuffer::alloc(3, 4);
        assert_eq!(dst.copy_from(&src), Err(ArgumentError::ImagesMustMatch));
    }

    #[test]
    fn test_from_vec_validates() {
        assert!(PixelBuffer::from_vec(vec![0; 15], 4, 4).is_err());
        assert!(PixelBuffer::from_vec(vec![0; 16], 4, 4).is_ok());
        assert!(PixelBuffer::from_vec(Vec::new(), 0, 4).is_err());
    }
}
