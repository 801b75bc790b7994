//! Menu, dialog and screen definitions

pub mod dialog;
pub mod menu;
pub mod selector;
pub mod view;

pub use dialog::{Answer, ConfirmDialog};
pub use menu::{MainMenu, Mode};
pub use selector::{CyclicIndex, Navigation};
pub use view::{Question, View};
