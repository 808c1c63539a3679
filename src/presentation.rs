//! The presentation-host seam.
//!
//! The host owns the displayed surface; the player registers one surface per
//! session and pings the host whenever a fresh frame has been committed to
//! the shared [`FrameBuffer`](crate::FrameBuffer). The host then copies the
//! pixels out on its own schedule via
//! [`FrameBuffer::copy_for_consumer`](crate::FrameBuffer::copy_for_consumer).

/// Opaque handle to a registered presentation surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub i64);

/// Capability surface of the presentation host's surface registry.
///
/// `mark_frame_available` is only ever invoked from the player's render
/// dispatch thread, one call per committed frame.
pub trait PresentationHost: Send + Sync {
    fn register_surface(&self) -> SurfaceId;

    fn mark_frame_available(&self, surface: SurfaceId);

    fn unregister_surface(&self, surface: SurfaceId);
}
