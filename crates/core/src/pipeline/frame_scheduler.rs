/// Host that decides when the frame loop runs its next iteration.
///
/// The browser equivalent is the animation-frame callback: the loop never
/// exits by itself, it simply stops being scheduled.
pub trait FrameScheduler {
    /// Blocks until the next refresh. Returns `false` once the host has been
    /// torn down; no further iterations may run after that.
    fn next_tick(&mut self) -> bool;
}
