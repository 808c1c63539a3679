//! The render pass: pulls one decoded frame from the engine into the shared
//! frame buffer and notifies the presentation host.
//!
//! A pass only ever runs on the designated context, so it never runs
//! concurrently with itself or with the notify task it schedules. The frame
//! buffer lock is not held across the engine call: the pass renders into a
//! scratch buffer sized from a dimensions snapshot and commits it
//! afterwards. If a reallocation raced the render, the commit is refused
//! and the frame dropped; the next decode signal retries.

use crate::engine::{RenderContext, RenderError, RenderTarget};
use crate::frame_buffer::{BYTES_PER_PIXEL, FrameBuffer};
use crate::main_context::ContextHandle;
use crate::presentation::{PresentationHost, SurfaceId};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Bytes sampled from the head of a rendered frame for the emptiness check.
const SANITY_SAMPLE_BYTES: usize = 1000;

/// Prefix sums below this suggest the engine wrote no real pixel data.
const EMPTY_SUM_THRESHOLD: u32 = 1000;

/// Side length of the diagnostic marker square, clamped to the frame.
const MARKER_SIDE: usize = 100;

/// Debug aids, off by default. Not intended for production use.
#[derive(Debug, Clone, Copy, Default)]
pub struct Diagnostics {
    /// Stamp a red marker square over frames that look empty, to visually
    /// confirm the pipeline is live.
    pub overlay_enabled: bool,
}

/// Everything a pass needs, shared with the scheduler's queued task and the
/// notify task. The render context slot doubles as the teardown guard:
/// dispose takes the context out under the same mutex, so it either waits
/// for an in-flight pass or makes later passes no-op.
pub(crate) struct RenderPipeline {
    pub(crate) render_ctx: Arc<Mutex<Option<Box<dyn RenderContext>>>>,
    pub(crate) frame_buffer: Arc<FrameBuffer>,
    pub(crate) pending: Arc<AtomicBool>,
    pub(crate) handle: ContextHandle,
    pub(crate) host: Arc<dyn PresentationHost>,
    pub(crate) surface_id: SurfaceId,
    pub(crate) frame_count: Arc<AtomicU64>,
    pub(crate) diagnostics: Diagnostics,
}

impl RenderPipeline {
    pub(crate) fn run_pass(&self) {
        // Clear first: a signal arriving mid-render queues a fresh pass.
        self.pending.store(false, Ordering::SeqCst);

        let (width, height) = self.frame_buffer.dimensions();
        let stride = width as usize * BYTES_PER_PIXEL;
        let mut scratch = vec![0u8; height as usize * stride];

        {
            let mut ctx = self.render_ctx.lock();
            let Some(ctx) = ctx.as_mut() else {
                // Torn down while this pass was queued.
                return;
            };
            let target = RenderTarget {
                pixels: &mut scratch,
                width,
                height,
                stride,
            };
            match ctx.render(target) {
                Ok(()) => {}
                Err(RenderError::InvalidParameter) => {
                    log::warn!(
                        "render rejected as invalid parameter at {width}x{height}; \
                         output geometry is likely stale"
                    );
                    return;
                }
                Err(RenderError::Failed(code)) => {
                    log::warn!("render failed with code {code}");
                    return;
                }
            }
        }

        if looks_empty(&scratch) {
            log::debug!("rendered frame sampled as empty");
            if self.diagnostics.overlay_enabled {
                stamp_marker(&mut scratch, width, height);
            }
        }

        if !self.frame_buffer.write_frame(&scratch, width, height) {
            log::debug!("dropping frame: buffer was reallocated during render");
            return;
        }

        // Exactly one notify task per committed frame, run on the
        // designated context rather than called inline.
        let host = Arc::clone(&self.host);
        let surface_id = self.surface_id;
        let frame_count = Arc::clone(&self.frame_count);
        self.handle.post(move || {
            let frame = frame_count.fetch_add(1, Ordering::Relaxed);
            log::trace!("frame {frame} available");
            host.mark_frame_available(surface_id);
        });
    }
}

fn looks_empty(pixels: &[u8]) -> bool {
    let sample = &pixels[..pixels.len().min(SANITY_SAMPLE_BYTES)];
    let sum: u32 = sample.iter().map(|&b| b as u32).sum();
    sum < EMPTY_SUM_THRESHOLD
}

fn stamp_marker(pixels: &mut [u8], width: u32, height: u32) {
    let side_x = MARKER_SIDE.min(width as usize);
    let side_y = MARKER_SIDE.min(height as usize);
    for y in 0..side_y {
        for x in 0..side_x {
            let idx = (y * width as usize + x) * BYTES_PER_PIXEL;
            pixels[idx..idx + 4].copy_from_slice(&[255, 0, 0, 255]);
        }
    }
}
