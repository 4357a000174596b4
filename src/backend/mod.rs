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
mod gpu;
mod native;
mod software;

pub use gpu::{
    AcceleratorContext, ComputeDevice, GpuBackend, HostComputeContext, HostComputeDevice,
    StackBlurLaunch,
};
pub use native::NativeBackend;
pub use software::SoftwareBackend;

use crate::{BlurError, BlurRadius, Interrupt, PixelBuffer};

/// Execution strategies, in increasing order of preference.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BackendKind {
    Software,
    NativeAccelerated,
    GpuAccelerated,
}

impl BackendKind {
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::Software => "software",
            BackendKind::NativeAccelerated => "native accelerated",
            BackendKind::GpuAccelerated => "gpu accelerated",
        }
    }
}

/// A concrete backend. Every variant honours the same contract.
#[derive(Debug)]
pub enum Backend {
    Software(SoftwareBackend),
    NativeAccelerated(NativeBackend),
    GpuAccelerated(GpuBackend),
}

impl Backend {
    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Software(_) => BackendKind::Software,
            Backend::NativeAccelerated(_) => BackendKind::NativeAccelerated,
            Backend::GpuAccelerated(_) => BackendKind::GpuAccelerated,
        }
    }

    /// Writes the blurred `source` into `output`.
    ///
    /// Arguments are validated before anything is dispatched. On `Err` the
    /// content of `output` is undefined.
    pub fn blur(
        &self,
        source: &PixelBuffer<'_>,
        radius: f32,
        output: &mut PixelBuffer<'_>,
        interrupt: &Interrupt,
    ) -> Result<(), BlurError> {
        match self {
            Backend::Software(backend) => backend.blur(source, radius, output, interrupt),
            Backend::NativeAccelerated(backend) => backend.blur(source, radius, output, interrupt),
            Backend::GpuAccelerated(backend) => backend.blur(source, radius, output, interrupt),
        }
    }
}

/// Checks shared by every backend: sane layouts, equal dimensions, valid radius.
pub(crate) fn validate(
    source: &PixelBuffer<'_>,
    output: &PixelBuffer<'_>,
    radius: f32,
) -> Result<BlurRadius, BlurError> {
    source.check_layout()?;
    output.check_layout()?;
    source.size_matches(output)?;
    BlurRadius::from_f32(radius)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{ArgumentError, ThreadingPolicy, WorkerPool};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::Arc;

    pub(crate) fn random_image(width: u32, height: u32, seed: u64) -> PixelBuffer<'static> {
        let mut rng = StdRng::seed_from_u64(seed);
        let data = (0..width * height).map(|_| rng.gen::<u32>()).collect();
        PixelBuffer::from_vec(data, width, height).unwrap()
    }

    fn backends(pool: &Arc<WorkerPool>, width: u32, height: u32) -> Vec<Backend> {
        vec![
            Backend::Software(SoftwareBackend::new(pool.clone())),
            Backend::NativeAccelerated(NativeBackend::new(pool.clone())),
            Backend::GpuAccelerated(GpuBackend::new(
                Arc::new(HostComputeDevice::new()),
                width,
                height,
            )),
        ]
    }

    #[test]
    fn test_validation() {
        let a = PixelBuffer::alloc(4, 4);
        let b = PixelBuffer::alloc(4, 5);
        assert_eq!(
            validate(&a, &b, 1.),
            Err(BlurError::InvalidArgument(ArgumentError::ImagesMustMatch))
        );
        let c = PixelBuffer::alloc(4, 4);
        assert_eq!(validate(&a, &c, 2.5).unwrap().get(), 2);
        let empty = PixelBuffer::alloc(0, 4);
        assert_eq!(
            validate(&empty, &c, 1.),
            Err(BlurError::InvalidArgument(ArgumentError::ZeroBaseSize))
        );
    }

    #[test]
    fn test_radius_zero_is_identity_on_every_backend() {
        let pool = Arc::new(WorkerPool::new(ThreadingPolicy::Adaptive).unwrap());
        let source = random_image(9, 6, 11);
        for backend in backends(&pool, 9, 6) {
            let mut output = PixelBuffer::alloc(9, 6);
            backend
                .blur(&source, 0., &mut output, &Interrupt::new())
                .unwrap();
            assert!(output.same_pixels(&source), "{:?}", backend.kind());
        }
    }

    #[test]
    fn test_backends_agree() {
        let pool = Arc::new(WorkerPool::new(ThreadingPolicy::Adaptive).unwrap());
        let source = random_image(57, 33, 12);
        for radius in [1., 3., 16., 80.] {
            let outputs = backends(&pool, 57, 33)
                .iter()
                .map(|backend| {
                    let mut output = PixelBuffer::alloc(57, 33);
                    backend
                        .blur(&source, radius, &mut output, &Interrupt::new())
                        .unwrap();
                    output
                })
                .collect::<Vec<_>>();
            assert_eq!(outputs[0].data.borrow(), outputs[1].data.borrow());
            for (gpu, software) in outputs[2]
                .data
                .borrow()
                .iter()
                .zip(outputs[0].data.borrow())
            {
                for (g, s) in crate::unpack_argb(*gpu)
                    .iter()
                    .zip(crate::unpack_argb(*software).iter())
                {
                    assert!((*g as i32 - *s as i32).abs() <= 1);
                }
            }
        }
    }

    #[test]
    fn test_negative_radius_dispatches_nothing() {
        let pool = Arc::new(WorkerPool::new(ThreadingPolicy::Adaptive).unwrap());
        let source = random_image(4, 4, 13);
        for backend in backends(&pool, 4, 4) {
            let mut output = PixelBuffer::alloc(4, 4);
            let result = backend.blur(&source, -1., &mut output, &Interrupt::new());
            assert_eq!(
                result,
                Err(BlurError::InvalidArgument(ArgumentError::NegativeRadius)),
                "{:?}",
                backend.kind()
            );
        }
        assert_eq!(pool.dispatched(), 0);
    }

    #[test]
    fn test_uniform_field_on_every_backend() {
        let pool = Arc::new(WorkerPool::new(ThreadingPolicy::Adaptive).unwrap());
        let source = PixelBuffer::filled(4, 4, 0xff336699);
        for backend in backends(&pool, 4, 4) {
            for radius in [1., 2., 3., 10., 254.] {
                let mut output = PixelBuffer::alloc(4, 4);
                backend
                    .blur(&source, radius, &mut output, &Interrupt::new())
                    .unwrap();
                assert!(output.same_pixels(&source), "{:?}", backend.kind());
            }
        }
    }

    #[test]
    fn test_interrupted_call() {
        let pool = Arc::new(WorkerPool::new(ThreadingPolicy::Adaptive).unwrap());
        let source = random_image(8, 8, 14);
        let interrupt = Interrupt::new();
        interrupt.raise();
        for backend in backends(&pool, 8, 8) {
            let mut output = PixelBuffer::alloc(8, 8);
            assert_eq!(
                backend.blur(&source, 2., &mut output, &interrupt),
                Err(BlurError::Interrupted)
            );
        }
    }
}
