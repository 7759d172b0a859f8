//! Measurement surface capability.

/// Delivery of measured heights for a mounted batch: one entry per
/// renderable, in mounted order.
pub type MeasuredCallback = Box<dyn FnOnce(Vec<f32>)>;

/// An invisible rendering surface used to measure items before placement.
///
/// The engine never assumes how measurement happens - shadow DOM, a headless
/// layout pass, or a synchronous measurement API are all valid hosts - only
/// that it is asynchronous, in-order, and batched: `on_measured` fires on the
/// host's event loop after the batch has a real layout box, with heights in
/// the order the batch was mounted.
///
/// Mounting must not shift layout on the visible surface. A renderable whose
/// layout box resolves to zero height is reported as 0.0, not dropped.
pub trait MeasureSurface {
    /// Host-specific renderable produced by the caller's render function.
    type Renderable;

    /// Mounts `batch` at a provisional origin and schedules one
    /// `on_measured` delivery for it.
    fn mount_batch(&self, batch: Vec<Self::Renderable>, on_measured: MeasuredCallback);

    /// Unmounts everything on the surface and discards any pending delivery.
    fn clear(&self);
}
