//! The parallel analysis engine.
//!
//! An [`Analyzer`] owns a fixed pool of worker threads. [`Analyzer::push`]
//! hands a frame (and a reference to its predecessor, captured at push time)
//! to a bounded jobs queue; workers compute per-block DCT energy and texture
//! SAD in arbitrary order, and [`Analyzer::pull`] delivers the results in
//! strict submission order.

use crate::energy::{self, FrameResult};
use crate::error::{AnalyzerError, Result};
use crate::queue::{BoundedQueue, OrderedResultBuffer};
use crate::transform::{Kernels, TransformSize};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};
use vca_core::{Error as CoreError, Frame, FrameInfo};

/// Jobs queue depth; pushes beyond this many undispatched frames block.
const JOB_QUEUE_CAPACITY: usize = 5;

/// Preferred SIMD backend.
///
/// Accepted so configurations round-trip losslessly; the scalar kernels are
/// the normative implementation and are always used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CpuSimd {
    /// Pick the best backend for the host.
    #[default]
    Autodetect,
    /// Force the scalar kernels.
    None,
    Sse2,
    Ssse3,
    Sse4,
    Avx2,
}

/// Analyzer configuration, immutable after [`Analyzer::open`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Permit platform-optimized kernels. Does not change results.
    pub enable_asm: bool,
    /// Frame geometry. May stay zeroed to lock it in from the first pushed
    /// frame, e.g. when a Y4M reader autodetects it.
    pub frame_info: FrameInfo,
    /// Analysis block size; one of 8, 16 or 32.
    pub block_size: u32,
    /// Number of worker threads; 0 autodetects the hardware concurrency.
    pub nr_frame_threads: u32,
    /// Preferred kernel backend.
    pub cpu_simd: CpuSimd,
    /// Swap in the low-pass DCT kernels for 16 and 32 blocks.
    pub enable_lowpass_dct: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            enable_asm: true,
            frame_info: FrameInfo::default(),
            block_size: 32,
            nr_frame_threads: 0,
            cpu_simd: CpuSimd::default(),
            enable_lowpass_dct: false,
        }
    }
}

impl AnalyzerConfig {
    fn validate(&self) -> Result<()> {
        if !matches!(self.block_size, 8 | 16 | 32) {
            return Err(CoreError::invalid_config(format!(
                "block size {} not in {{8, 16, 32}}",
                self.block_size
            ))
            .into());
        }
        if !self.frame_info.is_unset() {
            self.frame_info
                .validate()
                .map_err(|e| CoreError::invalid_config(format!("frame info: {e}")))?;
        }
        Ok(())
    }

    /// Worker count after autodetection.
    pub fn effective_threads(&self) -> usize {
        if self.nr_frame_threads == 0 {
            thread::available_parallelism().map(|p| p.get()).unwrap_or(4)
        } else {
            self.nr_frame_threads as usize
        }
    }
}

/// One unit of work: a frame plus the frame pushed immediately before it.
struct Job {
    id: u64,
    frame: Frame,
    prev: Option<Frame>,
}

/// Analyzer lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Opened, nothing pushed yet.
    Open,
    /// At least one frame pushed.
    Running,
    /// Close requested; queues aborted.
    Aborted,
    /// Workers joined.
    Closed,
}

struct Shared {
    jobs: BoundedQueue<Job>,
    results: OrderedResultBuffer<FrameResult>,
    state: Mutex<State>,
}

struct PushState {
    next_id: u64,
    locked_info: Option<FrameInfo>,
    last_frame: Option<Frame>,
}

struct PullState {
    prev_sad: f64,
}

/// The top-level analysis engine.
///
/// A single producer calls [`push`](Self::push) and a single consumer calls
/// [`pull`](Self::pull); producer and consumer may be different threads.
pub struct Analyzer {
    config: AnalyzerConfig,
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    push_state: Mutex<PushState>,
    pull_state: Mutex<PullState>,
}

impl Analyzer {
    /// Validate the configuration, install the kernel table and start the
    /// worker pool.
    pub fn open(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        let block_size = TransformSize::from_size(config.block_size as usize)
            .ok_or_else(|| CoreError::invalid_config("unsupported block size"))?;

        let threads = config.effective_threads();
        if config.nr_frame_threads == 0 {
            info!(threads, "autodetected worker count");
        }
        if config.enable_asm && config.cpu_simd != CpuSimd::None {
            debug!(simd = ?config.cpu_simd, "platform kernels requested; using scalar kernels");
        }
        info!(
            threads,
            block_size = config.block_size,
            lowpass = config.enable_lowpass_dct,
            "starting analysis workers"
        );

        let kernels = Kernels::new(config.enable_lowpass_dct);
        let shared = Arc::new(Shared {
            jobs: BoundedQueue::new(JOB_QUEUE_CAPACITY),
            results: OrderedResultBuffer::new(threads + 1),
            state: Mutex::new(State::Open),
        });

        let mut workers = Vec::with_capacity(threads);
        for i in 0..threads {
            let worker_shared = Arc::clone(&shared);
            let builder = thread::Builder::new().name(format!("vca-worker-{i}"));
            match builder.spawn(move || worker_loop(worker_shared, kernels, block_size, i)) {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    shared.jobs.abort();
                    shared.results.abort();
                    for handle in workers {
                        let _ = handle.join();
                    }
                    return Err(AnalyzerError::Internal(format!(
                        "failed to spawn worker thread: {e}"
                    )));
                }
            }
        }

        Ok(Self {
            config,
            shared,
            workers: Mutex::new(workers),
            push_state: Mutex::new(PushState {
                next_id: 0,
                locked_info: None,
                last_frame: None,
            }),
            pull_state: Mutex::new(PullState { prev_sad: 0.0 }),
        })
    }

    /// The configuration this analyzer was opened with.
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Submit a frame for analysis.
    ///
    /// The frame's geometry is locked in on the first successful push; all
    /// later frames must match it. Blocks while the jobs queue is full.
    pub fn push(&self, frame: Frame) -> Result<()> {
        if matches!(*self.shared.state.lock(), State::Aborted | State::Closed) {
            return Err(AnalyzerError::Aborted);
        }

        let mut push = self.push_state.lock();
        self.check_frame(&frame, &mut push)?;

        let id = push.next_id;
        let prev = push.last_frame.replace(frame.clone());
        let job = Job { id, frame, prev };

        if !self.shared.jobs.wait_and_push(job) {
            return Err(AnalyzerError::Aborted);
        }
        push.next_id += 1;

        let mut state = self.shared.state.lock();
        if *state == State::Open {
            *state = State::Running;
        }
        Ok(())
    }

    fn check_frame(&self, frame: &Frame, push: &mut PushState) -> Result<()> {
        if frame.luma().is_none() || frame.luma_stride() == 0 {
            warn!("frame without luma data pushed");
            return Err(CoreError::invalid_frame("no luma data provided").into());
        }

        let info = frame.info;
        match push.locked_info {
            None => {
                info.validate()?;
                if !self.config.frame_info.is_unset() && info != self.config.frame_info {
                    warn!("first frame does not match the configured frame info");
                    return Err(CoreError::invalid_frame(
                        "frame does not match the configured frame info",
                    )
                    .into());
                }
                debug!(
                    width = info.width,
                    height = info.height,
                    bit_depth = info.bit_depth,
                    colorspace = %info.colorspace,
                    "locking frame info"
                );
                push.locked_info = Some(info);
            }
            Some(locked) => {
                if info != locked {
                    warn!("frame with different settings received");
                    return Err(CoreError::invalid_frame(
                        "frame settings differ from the first pushed frame",
                    )
                    .into());
                }
            }
        }
        Ok(())
    }

    /// True when the result for the next frame in submission order is ready.
    pub fn result_available(&self) -> bool {
        self.shared.results.ready()
    }

    /// Deliver the next result in submission order, blocking until it is
    /// ready. Returns [`AnalyzerError::Aborted`] once the analyzer has been
    /// closed and the remaining results are drained.
    pub fn pull(&self) -> Result<FrameResult> {
        let mut pull = self.pull_state.lock();
        let mut result = self
            .shared
            .results
            .pop_next()
            .ok_or(AnalyzerError::Aborted)?;

        // Epsilon needs the predecessor's frame SAD, which meets this result
        // exactly here, at the ordered delivery point.
        result.epsilon = if result.poc == 0 {
            0.0
        } else {
            energy::epsilon(result.sad, pull.prev_sad)
        };
        pull.prev_sad = result.sad;
        Ok(result)
    }

    /// Abort both queues, join the workers and release all frame references.
    ///
    /// Also runs on drop; calling it twice is harmless.
    pub fn close(&self) {
        {
            let mut state = self.shared.state.lock();
            if matches!(*state, State::Aborted | State::Closed) {
                return;
            }
            *state = State::Aborted;
        }
        debug!("closing analyzer");

        self.shared.jobs.abort();
        self.shared.results.abort();

        let workers = std::mem::take(&mut *self.workers.lock());
        for handle in workers {
            let _ = handle.join();
        }

        self.push_state.lock().last_frame = None;
        *self.shared.state.lock() = State::Closed;
    }
}

impl Drop for Analyzer {
    fn drop(&mut self) {
        self.close();
    }
}

fn worker_loop(shared: Arc<Shared>, kernels: Kernels, block_size: TransformSize, index: usize) {
    debug!(worker = index, "analysis worker started");
    while let Some(job) = shared.jobs.wait_and_pop() {
        let Job { id, frame, prev } = job;
        let result = energy::analyze(&kernels, block_size, id, &frame, prev.as_ref());

        // Release the pixel references before possibly blocking on the
        // result buffer; only the queues may hold frames past this point.
        drop(frame);
        drop(prev);

        if !shared.results.insert(id, result) {
            break;
        }
    }
    debug!(worker = index, "analysis worker stopped");
}
