//! Stand-in backends for running sessions without the real surfaces.
//!
//! `TraceChart` logs every charting operation; `FlatScene` renders each
//! frame as a solid-color PNG at the session resolution. Real files with
//! placeholder pixels, enough to exercise the protocol, the dispatch
//! order, and the idempotent render loop end-to-end.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

use crate::backend::{ChartBackend, SceneBackend};

/// Chart surface that only logs. Useful for inspecting a stream.
#[derive(Debug, Default)]
pub struct TraceChart {
    /// Dispatched operations seen so far (titles + series).
    pub operations: usize,
}

impl ChartBackend for TraceChart {
    fn create_stacked_plots(&mut self, n: usize) -> Result<()> {
        tracing::info!(plots = n, "create stacked plots");
        Ok(())
    }

    fn set_title(&mut self, plot: usize, text: &str) -> Result<()> {
        tracing::info!(plot, text, "set title");
        self.operations += 1;
        Ok(())
    }

    fn draw_series(
        &mut self,
        plot: usize,
        x: &[f64],
        values: &[f64],
        color: Option<&str>,
    ) -> Result<()> {
        tracing::info!(
            plot,
            points = values.len().min(x.len()),
            color = color.unwrap_or("default"),
            "draw series"
        );
        self.operations += 1;
        Ok(())
    }

    fn show_and_block(&mut self) -> Result<()> {
        tracing::info!("show");
        Ok(())
    }
}

/// Scene surface whose render output is a solid color derived from the
/// first looked-up object's orientation.
#[derive(Debug)]
pub struct FlatScene {
    resolution: (u32, u32),
    objects: Vec<String>,
    rotations: HashMap<String, [f64; 4]>,
}

impl Default for FlatScene {
    fn default() -> Self {
        Self {
            resolution: (256, 256),
            objects: Vec::new(),
            rotations: HashMap::new(),
        }
    }
}

impl SceneBackend for FlatScene {
    type Object = String;

    fn lookup_object(&mut self, name: &str) -> Result<String> {
        if !self.objects.iter().any(|o| o == name) {
            self.objects.push(name.to_string());
            self.rotations
                .insert(name.to_string(), [1.0, 0.0, 0.0, 0.0]);
        }
        Ok(name.to_string())
    }

    fn apply_named_pose(&mut self, object: &String, pose: &str) -> Result<()> {
        tracing::debug!(object = %object, pose, "apply pose");
        Ok(())
    }

    fn set_rotation_quaternion(&mut self, object: &String, q: [f64; 4]) -> Result<()> {
        self.rotations.insert(object.clone(), q);
        Ok(())
    }

    fn set_render_resolution(&mut self, width: u32, height: u32) -> Result<()> {
        self.resolution = (width, height);
        Ok(())
    }

    fn render_current_scene_to_file(&mut self, path: &Path) -> Result<()> {
        let q = self
            .objects
            .first()
            .and_then(|name| self.rotations.get(name))
            .copied()
            .unwrap_or([1.0, 0.0, 0.0, 0.0]);

        let (w, h) = self.resolution;
        let [r, g, b] = quat_color(q);
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba([r, g, b, 255]));
        img.save(path)
            .with_context(|| format!("failed to write frame to {}", path.display()))?;
        Ok(())
    }
}

/// Map the quaternion's vector part from [-1, 1] into RGB channels, so
/// distinct orientations produce visibly distinct frames.
fn quat_color([_w, x, y, z]: [f64; 4]) -> [u8; 3] {
    let channel = |v: f64| ((v.clamp(-1.0, 1.0) + 1.0) * 127.5).round() as u8;
    [channel(x), channel(y), channel(z)]
}
