pub mod application;
pub mod camera;
pub mod render;
pub mod renderer;
pub mod scene;
pub mod texture;
pub mod tracer;
pub mod util;
