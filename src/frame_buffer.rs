//! Shared pixel storage between the render pass (producer) and the
//! presentation host (consumer).
//!
//! A single `parking_lot` mutex guards the pixel block together with its
//! dimensions and readiness flag, so a reader can never observe a
//! width/height pair inconsistent with the pixels it copies. The lock is
//! never held across a call into the decode engine or presentation host:
//! the render pass draws into its own scratch buffer and commits it with
//! [`FrameBuffer::write_frame`], which re-checks dimensions under the lock
//! and drops the frame if a resize raced the render.

use parking_lot::Mutex;

/// Bytes per pixel for tightly-packed 32-bit RGBA.
pub const BYTES_PER_PIXEL: usize = 4;

/// 1×1 opaque black, returned to consumers before the first frame lands.
const FALLBACK_PIXEL: [u8; 4] = [0, 0, 0, 255];

#[derive(Debug)]
struct PixelBlock {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    ready: bool,
}

impl PixelBlock {
    fn zeroed(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0; width as usize * height as usize * BYTES_PER_PIXEL],
            width,
            height,
            ready: false,
        }
    }
}

/// An owned copy of the committed frame, safe to use without any lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerFrame {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Resizable RGBA frame storage shared between producer and consumer.
///
/// Invariant: whenever `ready` is set, `pixels.len() == width * height * 4`.
#[derive(Debug)]
pub struct FrameBuffer {
    block: Mutex<PixelBlock>,
}

impl FrameBuffer {
    /// Create a zero-filled buffer of the given size, not yet ready.
    pub fn new(width: u32, height: u32) -> Self {
        log::debug!(
            "allocated frame buffer {}x{} = {} bytes",
            width,
            height,
            width as usize * height as usize * BYTES_PER_PIXEL
        );
        Self {
            block: Mutex::new(PixelBlock::zeroed(width, height)),
        }
    }

    /// Replace the block with a zero-filled one of the new size.
    ///
    /// Atomic with respect to readers: the swap happens under the lock and
    /// clears `ready`, so no reader sees old pixels with new dimensions.
    pub fn allocate(&self, width: u32, height: u32) {
        let mut block = self.block.lock();
        *block = PixelBlock::zeroed(width, height);
        log::debug!("frame buffer reallocated to {width}x{height}");
    }

    /// Current dimensions as `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        let block = self.block.lock();
        (block.width, block.height)
    }

    /// Whether a complete frame has been committed since the last allocate.
    pub fn is_ready(&self) -> bool {
        self.block.lock().ready
    }

    /// Commit one rendered frame.
    ///
    /// Copies `source` into the block and sets `ready`, but only if
    /// `(width, height)` still match the block; a concurrent reallocation
    /// makes this a no-op and the frame is dropped. Returns whether the
    /// frame was committed. A partial write is never observable: `ready`
    /// flips only after the copy completes, under the same lock readers
    /// take.
    pub fn write_frame(&self, source: &[u8], width: u32, height: u32) -> bool {
        let mut block = self.block.lock();
        if block.width != width || block.height != height {
            return false;
        }
        if source.len() != block.pixels.len() {
            return false;
        }
        block.pixels.copy_from_slice(source);
        block.ready = true;
        true
    }

    /// Copy the committed frame out for the consumer.
    ///
    /// Returns a 1×1 opaque black frame until the first commit. The returned
    /// dimensions always match the returned pixel data.
    pub fn copy_for_consumer(&self) -> ConsumerFrame {
        let block = self.block.lock();
        if !block.ready {
            return ConsumerFrame {
                pixels: FALLBACK_PIXEL.to_vec(),
                width: 1,
                height: 1,
            };
        }
        ConsumerFrame {
            pixels: block.pixels.clone(),
            width: block.width,
            height: block.height,
        }
    }
}
