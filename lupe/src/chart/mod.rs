mod renderer;
pub use renderer::{Renderer, Series, Panel};
