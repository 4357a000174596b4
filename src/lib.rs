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
#![allow(clippy::too_many_arguments)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod backend;
mod backend_state;
mod dispatcher;
mod engine;
mod pixel_buffer;
mod radius;
mod shared_pixels;
#[cfg(feature = "image")]
#[cfg_attr(docsrs, doc(cfg(feature = "image")))]
mod stack_blur_image;
mod stackblur;
mod threading_policy;
mod util;
mod worker_pool;

pub use backend::{
    AcceleratorContext, Backend, BackendKind, ComputeDevice, GpuBackend, HostComputeContext,
    HostComputeDevice, NativeBackend, SoftwareBackend, StackBlurLaunch,
};
pub use backend_state::{BackendPhase, BackendState};
pub use dispatcher::{BackendDispatcher, Selection};
pub use engine::StackBlur;
pub use pixel_buffer::{pack_argb, unpack_argb, BufferStore, PixelBuffer};
pub use radius::{BlurRadius, MAX_RADIUS};
#[cfg(feature = "image")]
#[cfg_attr(docsrs, doc(cfg(feature = "image")))]
pub use stack_blur_image::{pixel_buffer_from_rgba, rgba_from_pixel_buffer, stack_blur_image};
pub use stackblur::stack_blur::stack_blur;
pub use threading_policy::ThreadingPolicy;
pub use util::{AcceleratorError, ArgumentError, BlurError, MismatchedSize};
pub use worker_pool::{Interrupt, WorkerPool};
