/// Contract with the windowing/input host that owns the drawable surface
use std::io;

use crate::input::KeyEvent;

pub trait WindowHost {
    /// Drawable surface size in the host's units (pixels or cells)
    fn size(&self) -> (u32, u32);

    /// Drain pending key events, waiting at most until the next frame tick
    fn poll_events(&mut self) -> io::Result<Vec<KeyEvent>>;

    /// Whether the host reports key releases. Hosts that do not get
    /// one-frame nudges per press instead of held velocity.
    fn reports_key_release(&self) -> bool {
        true
    }

    fn set_title(&mut self, title: &str);

    /// Show the finished frame; frame pacing, if any, happens here
    fn present(&mut self) -> io::Result<()>;

    fn should_close(&self) -> bool;

    fn set_should_close(&mut self, close: bool);
}
