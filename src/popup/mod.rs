mod builder;
mod html;

pub use builder::{PopupBuilder, properties_popup};
pub use html::escape;
