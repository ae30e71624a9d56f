use std::cell::Cell;

/// Bookkeeping for the redraw loop: the outstanding frame request and
/// whether the map has been unmounted.
#[derive(Debug, Default)]
pub struct FrameLoop {
	pending: Cell<Option<i32>>,
	stopped: Cell<bool>,
}

impl FrameLoop {
	/// Record a frame request. Ignored once stopped.
	pub fn scheduled(&self, id: i32) {
		if !self.stopped.get() {
			self.pending.set(Some(id));
		}
	}

	/// Called at the top of each frame. False means the loop must not draw
	/// or request another frame.
	pub fn fired(&self) -> bool {
		self.pending.set(None);
		!self.stopped.get()
	}

	/// Stop the loop, handing back the request id that still needs cancelling.
	pub fn stop(&self) -> Option<i32> {
		self.stopped.set(true);
		self.pending.take()
	}

	pub fn is_stopped(&self) -> bool {
		self.stopped.get()
	}
}
