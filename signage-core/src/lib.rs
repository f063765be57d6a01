//! The signage data model: displays, widgets, slideshows and layouts,
//! along with the rules that keep them valid.

mod config;
mod display;
mod events;
mod layout;
mod slideshow;
mod util;
mod widget;

pub use config::*;
pub use display::*;
pub use events::*;
pub use layout::*;
pub use slideshow::*;
pub use util::*;
pub use widget::*;
