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
use crate::backend::{validate, AcceleratorContext, Backend, BackendKind};
use crate::{BackendDispatcher, BlurError, Interrupt, PixelBuffer, Selection};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

/// Stack blur bound to one source image.
///
/// The source is deep copied at construction, later changes to the caller's
/// buffer are not observed. All operations take `&self` and may run
/// concurrently; `*_into` variants write into caller memory and never allocate.
pub struct StackBlur {
    original: PixelBuffer<'static>,
    result: Mutex<PixelBuffer<'static>>,
    dispatcher: Arc<BackendDispatcher>,
    gpu: OnceLock<Backend>,
}

impl std::fmt::Debug for StackBlur {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackBlur")
            .field("width", &self.original.width)
            .field("height", &self.original.height)
            .field("gpu", &self.gpu.get())
            .finish()
    }
}

impl StackBlur {
    pub fn new(
        image: &PixelBuffer<'_>,
        dispatcher: Arc<BackendDispatcher>,
    ) -> Result<StackBlur, BlurError> {
        image.check_layout()?;
        let original = image.to_owned_buffer();
        Ok(StackBlur {
            result: Mutex::new(original.clone()),
            original,
            dispatcher,
            gpu: OnceLock::new(),
        })
    }

    /// Immutable copy of the source image.
    pub fn original(&self) -> &PixelBuffer<'static> {
        &self.original
    }

    /// Copy of the last image returned by an allocating blur, the original
    /// before the first one.
    pub fn result(&self) -> PixelBuffer<'static> {
        self.result
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Blurs with automatic backend selection.
    pub fn blur(&self, radius: f32) -> Result<PixelBuffer<'static>, BlurError> {
        self.blur_interruptible(radius, None, None, &Interrupt::new())
    }

    pub fn blur_into(&self, radius: f32, output: &mut PixelBuffer<'_>) -> Result<(), BlurError> {
        self.blur_with(radius, output, None, None, &Interrupt::new())
            .map(|_| ())
    }

    pub fn blur_software(&self, radius: f32) -> Result<PixelBuffer<'static>, BlurError> {
        self.blur_interruptible(radius, Some(BackendKind::Software), None, &Interrupt::new())
    }

    pub fn blur_software_into(
        &self,
        radius: f32,
        output: &mut PixelBuffer<'_>,
    ) -> Result<(), BlurError> {
        self.blur_with(
            radius,
            output,
            Some(BackendKind::Software),
            None,
            &Interrupt::new(),
        )
        .map(|_| ())
    }

    pub fn blur_accelerated(&self, radius: f32) -> Result<PixelBuffer<'static>, BlurError> {
        self.blur_interruptible(
            radius,
            Some(BackendKind::NativeAccelerated),
            None,
            &Interrupt::new(),
        )
    }

    pub fn blur_accelerated_into(
        &self,
        radius: f32,
        output: &mut PixelBuffer<'_>,
    ) -> Result<(), BlurError> {
        self.blur_with(
            radius,
            output,
            Some(BackendKind::NativeAccelerated),
            None,
            &Interrupt::new(),
        )
        .map(|_| ())
    }

    /// Blurs on the accelerator behind `context`, or on the native backend when
    /// the accelerator is unsupported.
    pub fn blur_gpu(
        &self,
        context: &dyn AcceleratorContext,
        radius: f32,
    ) -> Result<PixelBuffer<'static>, BlurError> {
        self.blur_interruptible(
            radius,
            Some(BackendKind::GpuAccelerated),
            Some(context),
            &Interrupt::new(),
        )
    }

    pub fn blur_gpu_into(
        &self,
        context: &dyn AcceleratorContext,
        radius: f32,
        output: &mut PixelBuffer<'_>,
    ) -> Result<(), BlurError> {
        self.blur_with(
            radius,
            output,
            Some(BackendKind::GpuAccelerated),
            Some(context),
            &Interrupt::new(),
        )
        .map(|_| ())
    }

    /// Allocating blur that can be cancelled. The result snapshot is updated
    /// only when the call succeeds.
    pub fn blur_interruptible(
        &self,
        radius: f32,
        preference: Option<BackendKind>,
        context: Option<&dyn AcceleratorContext>,
        interrupt: &Interrupt,
    ) -> Result<PixelBuffer<'static>, BlurError> {
        let mut output = PixelBuffer::alloc(self.original.width, self.original.height);
        self.blur_with(radius, &mut output, preference, context, interrupt)?;
        *self.result.lock().unwrap_or_else(PoisonError::into_inner) = output.clone();
        Ok(output)
    }

    /// Blurs the original into `output` and returns the backend that ran.
    ///
    /// `output` must have the dimensions of the original; its content is
    /// undefined when an error is returned.
    pub fn blur_with(
        &self,
        radius: f32,
        output: &mut PixelBuffer<'_>,
        preference: Option<BackendKind>,
        context: Option<&dyn AcceleratorContext>,
        interrupt: &Interrupt,
    ) -> Result<BackendKind, BlurError> {
        validate(&self.original, output, radius)?;
        let (width, height) = (self.original.width, self.original.height);
        match self.dispatcher.select(preference, context)? {
            Selection::GpuAccelerated(device) => {
                let backend = self.gpu.get_or_init(|| {
                    self.dispatcher
                        .backend_for(Selection::GpuAccelerated(device), width, height)
                });
                backend.blur(&self.original, radius, output, interrupt)?;
                Ok(backend.kind())
            }
            selection => {
                let backend = self.dispatcher.backend_for(selection, width, height);
                backend.blur(&self.original, radius, output, interrupt)?;
                Ok(backend.kind())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::tests::random_image;
    use crate::backend_state::tests::ScriptedContext;
    use crate::{stack_blur, AcceleratorError, ArgumentError, HostComputeContext, ThreadingPolicy};

    fn dispatcher() -> Arc<BackendDispatcher> {
        Arc::new(BackendDispatcher::with_policy(ThreadingPolicy::Adaptive).unwrap())
    }

    #[test]
    fn test_source_is_deep_copied() {
        let mut source = random_image(16, 12, 61);
        let engine = StackBlur::new(&source, dispatcher()).unwrap();
        let before = engine.blur(3.).unwrap();
        source.data.borrow_mut().fill(0);
        let after = engine.blur(3.).unwrap();
        assert!(before.same_pixels(&after));
        assert!(!engine.original().same_pixels(&source));
    }

    #[test]
    fn test_result_snapshot() {
        let source = random_image(10, 10, 62);
        let engine = StackBlur::new(&source, dispatcher()).unwrap();
        assert!(engine.result().same_pixels(&source));
        let blurred = engine.blur_software(2.).unwrap();
        assert!(engine.result().same_pixels(&blurred));

        let mut output = PixelBuffer::alloc(10, 10);
        engine.blur_accelerated_into(9., &mut output).unwrap();
        assert!(engine.result().same_pixels(&blurred));
    }

    #[test]
    fn test_interrupt_keeps_snapshot() {
        let source = random_image(10, 10, 63);
        let engine = StackBlur::new(&source, dispatcher()).unwrap();
        let blurred = engine.blur(2.).unwrap();
        let interrupt = Interrupt::new();
        interrupt.raise();
        assert_eq!(
            engine
                .blur_interruptible(5., None, None, &interrupt)
                .map(|_| ()),
            Err(BlurError::Interrupted)
        );
        assert!(engine.result().same_pixels(&blurred));
    }

    #[test]
    fn test_every_entry_point_agrees() {
        let source = random_image(33, 21, 64);
        let mut reference = source.clone();
        stack_blur(&mut reference, 6.).unwrap();
        let engine = StackBlur::new(&source, dispatcher()).unwrap();
        assert!(engine.blur(6.).unwrap().same_pixels(&reference));
        assert!(engine.blur_software(6.).unwrap().same_pixels(&reference));
        assert!(engine.blur_accelerated(6.).unwrap().same_pixels(&reference));
        assert!(engine
            .blur_gpu(&HostComputeContext, 6.)
            .unwrap()
            .same_pixels(&reference));
        let mut output = PixelBuffer::alloc(33, 21);
        engine.blur_into(6., &mut output).unwrap();
        assert!(output.same_pixels(&reference));
        engine.blur_software_into(6., &mut output).unwrap();
        assert!(output.same_pixels(&reference));
        engine
            .blur_gpu_into(&HostComputeContext, 6., &mut output)
            .unwrap();
        assert!(output.same_pixels(&reference));
    }

    #[test]
    fn test_gpu_backend_built_once() {
        let engine = StackBlur::new(&random_image(8, 8, 65), dispatcher()).unwrap();
        assert!(engine.gpu.get().is_none());
        let context = ScriptedContext::working();
        let mut output = PixelBuffer::alloc(8, 8);
        for _ in 0..3 {
            assert_eq!(
                engine.blur_with(2., &mut output, None, Some(&context), &Interrupt::new()),
                Ok(BackendKind::GpuAccelerated)
            );
        }
        assert!(engine.gpu.get().is_some());
        assert_eq!(engine.dispatcher.state().construction_attempts(), 1);
    }

    #[test]
    fn test_unsupported_gpu_falls_back() {
        let engine = StackBlur::new(&random_image(8, 8, 66), dispatcher()).unwrap();
        let context =
            ScriptedContext::failing(AcceleratorError::Unsupported("headless".to_string()));
        let gpu = engine.blur_gpu(&context, 3.).unwrap();
        let native = engine.blur_accelerated(3.).unwrap();
        assert!(gpu.same_pixels(&native));
        assert!(engine.gpu.get().is_none());
    }

    #[test]
    fn test_output_size_mismatch() {
        let engine = StackBlur::new(&random_image(8, 8, 67), dispatcher()).unwrap();
        let mut output = PixelBuffer::alloc(8, 9);
        assert_eq!(
            engine.blur_into(1., &mut output),
            Err(BlurError::InvalidArgument(ArgumentError::ImagesMustMatch))
        );
    }

    #[test]
    fn test_concurrent_calls() {
        let engine = StackBlur::new(&random_image(40, 30, 68), dispatcher()).unwrap();
        let expected = engine.blur_software(4.).unwrap();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    let mut output = PixelBuffer::alloc(40, 30);
                    engine.blur_into(4., &mut output).unwrap();
                    assert!(output.same_pixels(&expected));
                });
            }
        });
    }
}
