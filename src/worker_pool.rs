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
use crate::{BlurError, ThreadingPolicy};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Cancellation token for an in-flight blur.
///
/// Once raised, workers stop picking up new lines and the call reports
/// [`BlurError::Interrupted`]; the output buffer must not be consumed.
#[derive(Debug, Default)]
pub struct Interrupt {
    raised: AtomicBool,
}

impl Interrupt {
    pub fn new() -> Interrupt {
        Interrupt::default()
    }

    pub fn raise(&self) {
        self.raised.store(true, Ordering::Release);
    }

    pub fn reset(&self) {
        self.raised.store(false, Ordering::Release);
    }

    #[inline]
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }
}

/// Fixed-size pool running the partitions of a pass.
///
/// Built once at bootstrap and shared by every backend and engine. Each entry
/// point returns only after all partitions it spawned have finished, which is
/// the barrier between the horizontal and the vertical pass.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    threads: usize,
    dispatched: AtomicUsize,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.threads)
            .field("dispatched", &self.dispatched())
            .finish()
    }
}

impl WorkerPool {
    pub fn new(policy: ThreadingPolicy) -> Result<WorkerPool, BlurError> {
        let threads = policy.thread_count().max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("stackblur-worker-{i}"))
            .build()
            .map_err(|e| BlurError::Fatal(format!("Can't build worker pool: {e}")))?;
        log::debug!("Worker pool started with {threads} threads");
        Ok(WorkerPool {
            pool,
            threads,
            dispatched: AtomicUsize::new(0),
        })
    }

    #[inline]
    pub fn thread_count(&self) -> usize {
        self.threads
    }

    /// Total partitions handed to workers since the pool was built.
    pub fn dispatched(&self) -> usize {
        self.dispatched.load(Ordering::Relaxed)
    }

    /// Runs `task` for every index in `0..count`, striped across workers:
    /// worker `i` of `N` takes `i, i + N, i + 2N, ...`.
    pub fn run_partitioned<F>(
        &self,
        count: usize,
        interrupt: &Interrupt,
        task: F,
    ) -> Result<(), BlurError>
    where
        F: Fn(usize) + Sync,
    {
        self.run_rounds(interrupt, |worker, workers| {
            let mut index = worker;
            while index < count {
                if interrupt.is_raised() {
                    return;
                }
                task(index);
                index += workers;
            }
        })
    }

    /// Runs one round: `task(worker, workers)` once per worker thread.
    ///
    /// Tasks are expected to poll `interrupt` between units of work.
    pub fn run_rounds<F>(&self, interrupt: &Interrupt, task: F) -> Result<(), BlurError>
    where
        F: Fn(usize, usize) + Sync,
    {
        if interrupt.is_raised() {
            return Err(BlurError::Interrupted);
        }
        let workers = self.threads;
        self.dispatched.fetch_add(workers, Ordering::Relaxed);
        let task = &task;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.pool.scope(|scope| {
                for worker in 0..workers {
                    scope.spawn(move |_| task(worker, workers));
                }
            })
        }));
        if outcome.is_err() {
            return Err(BlurError::Fatal("Blur worker panicked".to_string()));
        }
        if interrupt.is_raised() {
            return Err(BlurError::Interrupted);
        }
        Ok(())
    }
}
