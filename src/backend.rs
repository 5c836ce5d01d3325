//! The seam between the session drivers and the visualization surfaces.
//!
//! The real surfaces (a plotting window, a 3D scene) live outside this
//! crate; the drivers only ever see these traits, injected as capability
//! objects. That keeps the core free of ambient state and lets tests run
//! against recording fakes.

use std::path::Path;

use anyhow::Result;

/// A stacked-subplot charting surface. Stateful and order-sensitive:
/// every call mutates the figure being built.
pub trait ChartBackend {
    fn create_stacked_plots(&mut self, n: usize) -> Result<()>;
    fn set_title(&mut self, plot: usize, text: &str) -> Result<()>;
    fn draw_series(
        &mut self,
        plot: usize,
        x: &[f64],
        values: &[f64],
        color: Option<&str>,
    ) -> Result<()>;
    /// Display the finished figure; returns when the user dismisses it.
    fn show_and_block(&mut self) -> Result<()>;
}

/// A 3D scene with named objects, named poses, and a file render target.
pub trait SceneBackend {
    type Object;

    fn lookup_object(&mut self, name: &str) -> Result<Self::Object>;
    fn apply_named_pose(&mut self, object: &Self::Object, pose: &str) -> Result<()>;
    fn set_rotation_quaternion(&mut self, object: &Self::Object, q: [f64; 4]) -> Result<()>;
    fn set_render_resolution(&mut self, width: u32, height: u32) -> Result<()>;
    fn render_current_scene_to_file(&mut self, path: &Path) -> Result<()>;
}
