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
use crate::backend::{
    validate, AcceleratorContext, Backend, BackendKind, ComputeDevice, GpuBackend, NativeBackend,
    SoftwareBackend,
};
use crate::backend_state::Resolution;
use crate::{BackendState, BlurError, Interrupt, PixelBuffer, ThreadingPolicy, WorkerPool};
use std::sync::Arc;

/// Backend chosen for one call.
#[derive(Clone)]
pub enum Selection {
    Software,
    NativeAccelerated,
    GpuAccelerated(Arc<dyn ComputeDevice>),
}

impl std::fmt::Debug for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selection::Software => f.write_str("Software"),
            Selection::NativeAccelerated => f.write_str("NativeAccelerated"),
            Selection::GpuAccelerated(device) => f
                .debug_tuple("GpuAccelerated")
                .field(&device.name())
                .finish(),
        }
    }
}

impl Selection {
    pub fn kind(&self) -> BackendKind {
        match self {
            Selection::Software => BackendKind::Software,
            Selection::NativeAccelerated => BackendKind::NativeAccelerated,
            Selection::GpuAccelerated(_) => BackendKind::GpuAccelerated,
        }
    }
}

/// Routes blur requests to a backend.
///
/// Holds the shared worker pool and the process-wide accelerator state. Both are
/// created once at bootstrap and shared by every engine.
#[derive(Debug)]
pub struct BackendDispatcher {
    pool: Arc<WorkerPool>,
    state: Arc<BackendState>,
    software: SoftwareBackend,
    native: NativeBackend,
}

impl BackendDispatcher {
    pub fn new(pool: Arc<WorkerPool>, state: Arc<BackendState>) -> BackendDispatcher {
        BackendDispatcher {
            software: SoftwareBackend::new(pool.clone()),
            native: NativeBackend::new(pool.clone()),
            pool,
            state,
        }
    }

    /// Builds a dispatcher with its own pool and accelerator state.
    pub fn with_policy(policy: ThreadingPolicy) -> Result<BackendDispatcher, BlurError> {
        let pool = Arc::new(WorkerPool::new(policy)?);
        Ok(BackendDispatcher::new(pool, Arc::new(BackendState::new())))
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    pub fn state(&self) -> &Arc<BackendState> {
        &self.state
    }

    pub fn software(&self) -> &SoftwareBackend {
        &self.software
    }

    pub fn native(&self) -> &NativeBackend {
        &self.native
    }

    /// Resolves which backend serves a call.
    ///
    /// An explicit Software or NativeAccelerated preference is always honoured.
    /// Otherwise the accelerator is preferred when a `context` is supplied, and
    /// NativeAccelerated is used when there is none or the accelerator is
    /// permanently unavailable. The first accelerated call constructs the
    /// process-wide device.
    pub fn select(
        &self,
        preference: Option<BackendKind>,
        context: Option<&dyn AcceleratorContext>,
    ) -> Result<Selection, BlurError> {
        match preference {
            Some(BackendKind::Software) => return Ok(Selection::Software),
            Some(BackendKind::NativeAccelerated) => return Ok(Selection::NativeAccelerated),
            Some(BackendKind::GpuAccelerated) | None => {}
        }
        let Some(context) = context else {
            if preference.is_some() {
                log::debug!("No accelerator context supplied, using native backend");
            }
            return Ok(Selection::NativeAccelerated);
        };
        Ok(match self.state.resolve_gpu(context)? {
            Resolution::Device(device) => Selection::GpuAccelerated(device),
            Resolution::Fallback(BackendKind::Software) => Selection::Software,
            Resolution::Fallback(_) => Selection::NativeAccelerated,
        })
    }

    /// Backend for `selection`, with GPU index tables sized for `width` x `height`.
    pub(crate) fn backend_for(&self, selection: Selection, width: u32, height: u32) -> Backend {
        match selection {
            Selection::Software => Backend::Software(self.software.clone()),
            Selection::NativeAccelerated => Backend::NativeAccelerated(self.native.clone()),
            Selection::GpuAccelerated(device) => {
                Backend::GpuAccelerated(GpuBackend::new(device, width, height))
            }
        }
    }

    /// Blurs `image` into `output` and reports which backend ran.
    pub fn blur(
        &self,
        image: &PixelBuffer<'_>,
        radius: f32,
        output: &mut PixelBuffer<'_>,
        preference: Option<BackendKind>,
        context: Option<&dyn AcceleratorContext>,
    ) -> Result<BackendKind, BlurError> {
        self.blur_interruptible(image, radius, output, preference, context, &Interrupt::new())
    }

    /// Same as [`BackendDispatcher::blur`], cancellable through `interrupt`.
    pub fn blur_interruptible(
        &self,
        image: &PixelBuffer<'_>,
        radius: f32,
        output: &mut PixelBuffer<'_>,
        preference: Option<BackendKind>,
        context: Option<&dyn AcceleratorContext>,
        interrupt: &Interrupt,
    ) -> Result<BackendKind, BlurError> {
        validate(image, output, radius)?;
        let selection = self.select(preference, context)?;
        let backend = self.backend_for(selection, image.width, image.height);
        log::trace!(
            "Blurring {}x{} with radius {radius} on {} backend",
            image.width,
            image.height,
            backend.kind().name()
        );
        backend.blur(image, radius, output, interrupt)?;
        Ok(backend.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::tests::random_image;
    use crate::backend_state::tests::ScriptedContext;
    use crate::{AcceleratorError, ArgumentError, BackendPhase, HostComputeDevice};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    struct SlowContext {
        calls: AtomicUsize,
    }

    impl AcceleratorContext for SlowContext {
        fn create_device(&self) -> Result<Arc<dyn ComputeDevice>, AcceleratorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(50));
            Ok(Arc::new(HostComputeDevice::new()))
        }
    }

    fn dispatcher() -> BackendDispatcher {
        BackendDispatcher::with_policy(ThreadingPolicy::Adaptive).unwrap()
    }

    #[test]
    fn test_single_winner() {
        let dispatcher = dispatcher();
        let context = SlowContext {
            calls: AtomicUsize::new(0),
        };
        let callers = 8;
        let barrier = Barrier::new(callers);
        let source = random_image(24, 24, 51);
        let (barrier, source, context, dispatcher) = (&barrier, &source, &context, &dispatcher);
        let kinds = thread::scope(|scope| {
            let handles = (0..callers)
                .map(|_| {
                    scope.spawn(move || {
                        let mut output = PixelBuffer::alloc(24, 24);
                        barrier.wait();
                        dispatcher
                            .blur(source, 3., &mut output, None, Some(context))
                            .unwrap()
                    })
                })
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .collect::<Vec<_>>()
        });
        assert!(kinds.iter().all(|&k| k == BackendKind::GpuAccelerated));
        assert_eq!(context.calls.load(Ordering::SeqCst), 1);
        assert_eq!(dispatcher.state().construction_attempts(), 1);
        assert_eq!(dispatcher.state().phase(), BackendPhase::Ready);
    }

    #[test]
    fn test_sticky_fallback() {
        let dispatcher = dispatcher();
        let context =
            ScriptedContext::failing(AcceleratorError::Unsupported("no device".to_string()));
        let source = random_image(30, 20, 52);
        let mut expected = PixelBuffer::alloc(30, 20);
        dispatcher
            .native()
            .blur(&source, 4., &mut expected, &Interrupt::new())
            .unwrap();
        for _ in 0..5 {
            let mut output = PixelBuffer::alloc(30, 20);
            let kind = dispatcher
                .blur(&source, 4., &mut output, None, Some(&context))
                .unwrap();
            assert_eq!(kind, BackendKind::NativeAccelerated);
            assert_eq!(output.data.borrow(), expected.data.borrow());
        }
        assert_eq!(dispatcher.state().construction_attempts(), 1);
        assert_eq!(context.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fatal_construction_can_retry() {
        let dispatcher = dispatcher();
        let source = random_image(8, 8, 53);
        let mut output = PixelBuffer::alloc(8, 8);
        let failing = ScriptedContext::failing(AcceleratorError::Failure("lost".to_string()));
        assert!(matches!(
            dispatcher.blur(&source, 2., &mut output, None, Some(&failing)),
            Err(BlurError::Fatal(_))
        ));
        assert_eq!(dispatcher.state().phase(), BackendPhase::Uninitialized);
        let working = ScriptedContext::working();
        assert_eq!(
            dispatcher.blur(&source, 2., &mut output, None, Some(&working)),
            Ok(BackendKind::GpuAccelerated)
        );
        assert_eq!(dispatcher.state().construction_attempts(), 2);
    }

    #[test]
    fn test_invalid_radius_touches_nothing() {
        let dispatcher = dispatcher();
        let context = ScriptedContext::working();
        let source = random_image(8, 8, 54);
        let mut output = PixelBuffer::alloc(8, 8);
        for preference in [
            None,
            Some(BackendKind::Software),
            Some(BackendKind::NativeAccelerated),
            Some(BackendKind::GpuAccelerated),
        ] {
            assert_eq!(
                dispatcher.blur(&source, -1., &mut output, preference, Some(&context)),
                Err(BlurError::InvalidArgument(ArgumentError::NegativeRadius))
            );
        }
        assert_eq!(dispatcher.state().construction_attempts(), 0);
        assert_eq!(dispatcher.pool().dispatched(), 0);
    }

    #[test]
    fn test_preference_routing() {
        let dispatcher = dispatcher();
        let context = ScriptedContext::working();
        let source = random_image(12, 9, 55);
        let mut output = PixelBuffer::alloc(12, 9);
        let cases = [
            (None, None, BackendKind::NativeAccelerated),
            (Some(BackendKind::Software), Some(&context), BackendKind::Software),
            (
                Some(BackendKind::NativeAccelerated),
                Some(&context),
                BackendKind::NativeAccelerated,
            ),
            (
                Some(BackendKind::GpuAccelerated),
                None,
                BackendKind::NativeAccelerated,
            ),
            (None, Some(&context), BackendKind::GpuAccelerated),
        ];
        for (preference, context, expected) in cases {
            let context = context.map(|c| c as &dyn AcceleratorContext);
            assert_eq!(
                dispatcher.blur(&source, 1., &mut output, preference, context),
                Ok(expected)
            );
        }
        assert_eq!(context.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_interrupted_call() {
        let dispatcher = dispatcher();
        let source = random_image(8, 8, 56);
        let mut output = PixelBuffer::alloc(8, 8);
        let interrupt = Interrupt::new();
        interrupt.raise();
        assert_eq!(
            dispatcher.blur_interruptible(&source, 2., &mut output, None, None, &interrupt),
            Err(BlurError::Interrupted)
        );
    }
}
