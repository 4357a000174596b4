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
use crate::stackblur::{LineBlur, PlaneLayout, ScalarLineBlur, StackBlurPass};
use crate::util::check_slice_size;
use crate::{AcceleratorError, ArgumentError, BlurError, Interrupt, PixelBuffer};
use rayon::prelude::*;
use std::sync::Arc;

/// One stack blur launch on an accelerator.
///
/// The device blurs every row listed in `row_indices`, then every column listed
/// in `column_indices`, in place over `pixels`.
#[derive(Debug)]
pub struct StackBlurLaunch<'a> {
    pub pixels: &'a mut [u32],
    pub width: u32,
    pub height: u32,
    /// Pixels per row
    pub stride: u32,
    pub radius: u32,
    pub row_indices: &'a [u32],
    pub column_indices: &'a [u32],
}

/// Compute device created from an [`AcceleratorContext`].
///
/// A device is created at most once per process and then shared by every
/// engine, so it must tolerate concurrent launches.
pub trait ComputeDevice: Send + Sync {
    fn name(&self) -> &str;

    fn run_stack_blur(&self, launch: &mut StackBlurLaunch<'_>) -> Result<(), AcceleratorError>;
}

/// Handle to the embedding application's rendering or compute environment.
pub trait AcceleratorContext: Send + Sync {
    /// Creates the compute device. May be slow.
    ///
    /// Returning [`AcceleratorError::Unsupported`] makes the process fall back to
    /// the native backend for good.
    fn create_device(&self) -> Result<Arc<dyn ComputeDevice>, AcceleratorError>;
}

/// Device executing launches on the host CPU.
#[derive(Copy, Clone, Debug, Default)]
pub struct HostComputeDevice;

impl HostComputeDevice {
    pub fn new() -> HostComputeDevice {
        HostComputeDevice
    }
}

impl ComputeDevice for HostComputeDevice {
    fn name(&self) -> &str {
        "host"
    }

    fn run_stack_blur(&self, launch: &mut StackBlurLaunch<'_>) -> Result<(), AcceleratorError> {
        let layout = PlaneLayout {
            width: launch.width as usize,
            height: launch.height as usize,
            stride: launch.stride as usize,
        };
        check_slice_size(
            launch.pixels.len(),
            layout.stride,
            layout.width,
            layout.height,
        )
        .map_err(|e| AcceleratorError::Failure(e.to_string()))?;
        if launch.row_indices.iter().any(|&y| y >= launch.height)
            || launch.column_indices.iter().any(|&x| x >= launch.width)
        {
            return Err(AcceleratorError::Failure(
                "Launch index is out of image bounds".to_string(),
            ));
        }
        let radius = launch.radius;
        let pixels = SharedPixels::new(&mut *launch.pixels);
        launch.row_indices.par_iter().for_each(|&y| {
            let span = StackBlurPass::Horizontal.span(&layout, y as usize);
            ScalarLineBlur.blur_line(&pixels, span, radius);
        });
        launch.column_indices.par_iter().for_each(|&x| {
            let span = StackBlurPass::Vertical.span(&layout, x as usize);
            ScalarLineBlur.blur_line(&pixels, span, radius);
        });
        Ok(())
    }
}

/// Context whose devices run on the host, for embedders without an accelerator.
#[derive(Copy, Clone, Debug, Default)]
pub struct HostComputeContext;

impl AcceleratorContext for HostComputeContext {
    fn create_device(&self) -> Result<Arc<dyn ComputeDevice>, AcceleratorError> {
        Ok(Arc::new(HostComputeDevice))
    }
}

/// Accelerated backend bound to one image size.
pub struct GpuBackend {
    device: Arc<dyn ComputeDevice>,
    width: u32,
    height: u32,
    row_indices: Vec<u32>,
    column_indices: Vec<u32>,
}

impl std::fmt::Debug for GpuBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuBackend")
            .field("device", &self.device.name())
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl GpuBackend {
    /// Precomputes the row and column launch tables for `width` x `height` images.
    pub fn new(device: Arc<dyn ComputeDevice>, width: u32, height: u32) -> GpuBackend {
        GpuBackend {
            device,
            width,
            height,
            row_indices: (0..height).collect(),
            column_indices: (0..width).collect(),
        }
    }

    pub fn device(&self) -> &Arc<dyn ComputeDevice> {
        &self.device
    }

    pub fn blur(
        &self,
        source: &PixelBuffer<'_>,
        radius: f32,
        output: &mut PixelBuffer<'_>,
        interrupt: &Interrupt,
    ) -> Result<(), BlurError> {
        let radius = validate(source, output, radius)?;
        if source.width != self.width || source.height != self.height {
            return Err(ArgumentError::ImagesMustMatch.into());
        }
        if interrupt.is_raised() {
            return Err(BlurError::Interrupted);
        }
        output.copy_from(source)?;
        if radius.is_identity() {
            return Ok(());
        }
        let stride = output.row_stride();
        let mut launch = StackBlurLaunch {
            pixels: output.data.borrow_mut(),
            width: self.width,
            height: self.height,
            stride,
            radius: radius.get(),
            row_indices: &self.row_indices,
            column_indices: &self.column_indices,
        };
        self.device
            .run_stack_blur(&mut launch)
            .map_err(|e| BlurError::Fatal(e.to_string()))
    }
}
