//! Per-frame update hook.

use std::cell::RefCell;
use std::rc::Rc;

/// Anything driven by the application's frame clock.
///
/// The application owns the loop and calls `on_tick` once per frame with
/// the elapsed seconds. Implementors must tolerate `dt == 0.0`.
pub trait Tickable {
    /// Advances by `dt` seconds.
    fn on_tick(&mut self, dt: f32);
}

/// Shared handle, so the owner can keep reading a subscriber it handed to
/// a frame driver.
impl<T: Tickable + ?Sized> Tickable for Rc<RefCell<T>> {
    fn on_tick(&mut self, dt: f32) {
        self.borrow_mut().on_tick(dt);
    }
}
