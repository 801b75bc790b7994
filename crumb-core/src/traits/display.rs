//! Display sink trait

use crate::ui::View;

/// One-way render target for the OLED
///
/// The controller never reads anything back from the display. Each
/// [`View`] carries the full parameter set of the screen it names, so
/// implementations can redraw from scratch on every call.
pub trait DisplaySink {
    /// Bring the display up
    ///
    /// Returns false if the panel did not respond. Without a display the
    /// appliance cannot be operated, so the controller halts on failure.
    fn begin(&mut self) -> bool {
        true
    }

    /// Draw a view
    fn render(&mut self, view: View);
}
