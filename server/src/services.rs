pub mod boundary_loader;
pub mod map_renderer;
