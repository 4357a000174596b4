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
use crate::backend::{AcceleratorContext, BackendKind, ComputeDevice};
use crate::{AcceleratorError, BlurError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

enum Phase {
    Uninitialized,
    Initializing,
    Ready(Arc<dyn ComputeDevice>),
    PermanentFallback {
        backend: BackendKind,
        reason: AcceleratorError,
    },
}

/// Observable lifecycle of the process-wide accelerator.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BackendPhase {
    Uninitialized,
    Initializing,
    Ready,
    PermanentFallback(BackendKind),
}

/// Outcome of resolving the accelerator for one call.
pub(crate) enum Resolution {
    Device(Arc<dyn ComputeDevice>),
    Fallback(BackendKind),
}

/// Process-wide accelerator state.
///
/// At most one device construction is in flight at any time. `Ready` and
/// `PermanentFallback` are terminal.
pub struct BackendState {
    phase: Mutex<Phase>,
    phase_changed: Condvar,
    construction_attempts: AtomicUsize,
}

impl std::fmt::Debug for BackendState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendState")
            .field("phase", &self.phase())
            .field("construction_attempts", &self.construction_attempts())
            .finish()
    }
}

impl Default for BackendState {
    fn default() -> Self {
        BackendState::new()
    }
}

/// Reverts an unfinished construction, so waiters never block forever when the
/// constructor unwinds.
struct InitializationGuard<'a> {
    state: &'a BackendState,
    armed: bool,
}

impl InitializationGuard<'_> {
    fn finish(mut self, phase: Phase) {
        self.armed = false;
        self.state.publish(phase);
    }
}

impl Drop for InitializationGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            log::warn!("Accelerator construction unwound, state reset");
            self.state.publish(Phase::Uninitialized);
        }
    }
}

impl BackendState {
    pub fn new() -> BackendState {
        BackendState {
            phase: Mutex::new(Phase::Uninitialized),
            phase_changed: Condvar::new(),
            construction_attempts: AtomicUsize::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Phase> {
        self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, phase: Phase) {
        *self.lock() = phase;
        self.phase_changed.notify_all();
    }

    pub fn phase(&self) -> BackendPhase {
        match &*self.lock() {
            Phase::Uninitialized => BackendPhase::Uninitialized,
            Phase::Initializing => BackendPhase::Initializing,
            Phase::Ready(_) => BackendPhase::Ready,
            Phase::PermanentFallback { backend, .. } => BackendPhase::PermanentFallback(*backend),
        }
    }

    /// Number of times an accelerator constructor was invoked.
    pub fn construction_attempts(&self) -> usize {
        self.construction_attempts.load(Ordering::Acquire)
    }

    /// Why the accelerator was abandoned, if it was.
    pub fn fallback_reason(&self) -> Option<AcceleratorError> {
        match &*self.lock() {
            Phase::PermanentFallback { reason, .. } => Some(reason.clone()),
            _ => None,
        }
    }

    /// Returns the memoised device, constructing it through `context` on first
    /// use.
    ///
    /// Callers arriving while another thread constructs the device block until
    /// that construction settles. An unsupported accelerator resolves to a
    /// permanent native fallback; any other construction failure is returned as
    /// [`BlurError::Fatal`] and leaves the state retryable.
    pub(crate) fn resolve_gpu(
        &self,
        context: &dyn AcceleratorContext,
    ) -> Result<Resolution, BlurError> {
        let mut phase = self
            .phase_changed
            .wait_while(self.lock(), |phase| matches!(phase, Phase::Initializing))
            .unwrap_or_else(PoisonError::into_inner);
        match &*phase {
            Phase::Ready(device) => return Ok(Resolution::Device(device.clone())),
            Phase::PermanentFallback { backend, .. } => return Ok(Resolution::Fallback(*backend)),
            Phase::Uninitialized | Phase::Initializing => {}
        }
        *phase = Phase::Initializing;
        drop(phase);

        self.construction_attempts.fetch_add(1, Ordering::AcqRel);
        let guard = InitializationGuard {
            state: self,
            armed: true,
        };
        match context.create_device() {
            Ok(device) => {
                log::info!("Accelerator device '{}' is ready", device.name());
                guard.finish(Phase::Ready(device.clone()));
                Ok(Resolution::Device(device))
            }
            Err(reason @ AcceleratorError::Unsupported(_)) => {
                log::info!("{reason}, falling back to native backend for this process");
                let backend = BackendKind::NativeAccelerated;
                guard.finish(Phase::PermanentFallback { backend, reason });
                Ok(Resolution::Fallback(backend))
            }
            Err(error) => {
                log::warn!("Accelerator construction failed: {error}");
                guard.finish(Phase::Uninitialized);
                Err(BlurError::Fatal(error.to_string()))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::backend::HostComputeDevice;
    use std::panic::{self, AssertUnwindSafe};

    /// Context answering with a fixed outcome and counting invocations.
    pub(crate) struct ScriptedContext {
        pub(crate) outcome: Option<AcceleratorError>,
        pub(crate) calls: AtomicUsize,
    }

    impl ScriptedContext {
        pub(crate) fn working() -> ScriptedContext {
            ScriptedContext {
                outcome: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn failing(error: AcceleratorError) -> ScriptedContext {
            ScriptedContext {
                outcome: Some(error),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl AcceleratorContext for ScriptedContext {
        fn create_device(&self) -> Result<Arc<dyn ComputeDevice>, AcceleratorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.outcome {
                None => Ok(Arc::new(HostComputeDevice::new())),
                Some(error) => Err(error.clone()),
            }
        }
    }

    struct PanickingContext;

    impl AcceleratorContext for PanickingContext {
        fn create_device(&self) -> Result<Arc<dyn ComputeDevice>, AcceleratorError> {
            panic!("driver crashed");
        }
    }

    #[test]
    fn test_device_is_memoised() {
        let state = BackendState::new();
        let context = ScriptedContext::working();
        for _ in 0..3 {
            assert!(matches!(
                state.resolve_gpu(&context),
                Ok(Resolution::Device(_))
            ));
        }
        assert_eq!(state.phase(), BackendPhase::Ready);
        assert_eq!(state.construction_attempts(), 1);
        assert_eq!(context.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsupported_is_sticky() {
        let state = BackendState::new();
        let unsupported = ScriptedContext::failing(AcceleratorError::Unsupported(
            "no compute queue".to_string(),
        ));
        let working = ScriptedContext::working();
        for context in [&unsupported, &working, &unsupported] {
            assert!(matches!(
                state.resolve_gpu(context),
                Ok(Resolution::Fallback(BackendKind::NativeAccelerated))
            ));
        }
        assert_eq!(
            state.phase(),
            BackendPhase::PermanentFallback(BackendKind::NativeAccelerated)
        );
        assert_eq!(state.construction_attempts(), 1);
        assert_eq!(working.calls.load(Ordering::SeqCst), 0);
        assert!(matches!(
            state.fallback_reason(),
            Some(AcceleratorError::Unsupported(_))
        ));
    }

    #[test]
    fn test_failure_is_retryable() {
        let state = BackendState::new();
        let failing = ScriptedContext::failing(AcceleratorError::Failure("oom".to_string()));
        assert!(matches!(
            state.resolve_gpu(&failing),
            Err(BlurError::Fatal(_))
        ));
        assert_eq!(state.phase(), BackendPhase::Uninitialized);
        assert_eq!(state.fallback_reason(), None);
        assert!(matches!(
            state.resolve_gpu(&ScriptedContext::working()),
            Ok(Resolution::Device(_))
        ));
        assert_eq!(state.construction_attempts(), 2);
    }

    #[test]
    fn test_panicking_constructor_resets_phase() {
        let state = BackendState::new();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let _ = state.resolve_gpu(&PanickingContext);
        }));
        assert!(outcome.is_err());
        assert_eq!(state.phase(), BackendPhase::Uninitialized);
        assert!(matches!(
            state.resolve_gpu(&ScriptedContext::working()),
            Ok(Resolution::Device(_))
        ));
    }
}
