//! The rendering session: bulk-decoded setup, idempotent frame replay.
//!
//! Unlike the charting session there is no opcode loop: every pose is
//! known up front and per-frame render I/O dominates the cost, so the
//! producer writes one setup block and the driver iterates it internally.
//!
//! A frame whose artifact already exists on disk is skipped without any
//! backend call. That existence check is the only resume mechanism:
//! re-running an interrupted session recomputes exactly the missing
//! frames and never overwrites a finished one.

use std::fmt;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::backend::SceneBackend;
use crate::config::RigConfig;
use crate::error::{ProtocolError, Result};
use crate::wire::{Value, ValueReader, ValueWriter};

/// Frame identifier as carried on the wire: a plain index or a
/// producer-derived name. Both format into the artifact file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FrameId {
    Index(u64),
    Name(String),
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameId::Index(v) => write!(f, "{v}"),
            FrameId::Name(s) => f.write_str(s),
        }
    }
}

impl FrameId {
    fn from_value(value: Value) -> Result<Self, ProtocolError> {
        match value {
            Value::Int(v) if v >= 0 => Ok(FrameId::Index(v as u64)),
            Value::Str(s) => Ok(FrameId::Name(s)),
            other => Err(ProtocolError::TypeMismatch {
                expected: "frame id (int or str)",
                got: other.type_name(),
            }),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            FrameId::Index(v) => Value::Int(*v as i64),
            FrameId::Name(s) => Value::Str(s.clone()),
        }
    }
}

/// One orientation sample: frame id plus a `[w, x, y, z]` quaternion.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub id: FrameId,
    pub quat: [f64; 4],
}

impl Frame {
    fn from_value(value: Value) -> Result<Self> {
        let [id_value, quat_value]: [Value; 2] =
            value
                .into_list()?
                .try_into()
                .map_err(|_| ProtocolError::TypeMismatch {
                    expected: "[frame id, quaternion] pair",
                    got: "list",
                })?;
        let id = FrameId::from_value(id_value)?;
        let quat: [f64; 4] =
            quat_value
                .into_f64_vec()?
                .try_into()
                .map_err(|_| ProtocolError::TypeMismatch {
                    expected: "quaternion of 4 numbers",
                    got: "list",
                })?;
        Ok(Frame { id, quat })
    }

    fn to_value(&self) -> Value {
        Value::List(vec![
            self.id.to_value(),
            Value::List(self.quat.iter().copied().map(Value::Float).collect()),
        ])
    }
}

/// The whole rendering session, read once before any backend call.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSetup {
    pub output_dir: PathBuf,
    /// Artifact file-name prefix; frames land at `<prefix>_<id>.png`.
    pub prefix: String,
    pub orientations: Vec<Frame>,
    /// Source video resolution `(width, height)`.
    pub resolution: (u32, u32),
}

impl SceneSetup {
    pub fn decode<R: Read>(r: &mut ValueReader<R>) -> Result<Self> {
        let output_dir = PathBuf::from(r.next()?.into_string()?);
        let prefix = r.next()?.into_string()?;
        let orientations = r
            .next()?
            .into_list()?
            .into_iter()
            .map(Frame::from_value)
            .collect::<Result<Vec<_>>>()?;
        let res = r.next()?.into_list()?;
        if res.len() != 2 {
            return Err(ProtocolError::TypeMismatch {
                expected: "resolution [width, height]",
                got: "list",
            }
            .into());
        }
        let resolution = (res[0].as_index()? as u32, res[1].as_index()? as u32);
        Ok(Self {
            output_dir,
            prefix,
            orientations,
            resolution,
        })
    }

    /// Producer-side mirror of [`SceneSetup::decode`].
    pub fn encode<W: Write>(&self, w: &mut ValueWriter<W>) -> Result<()> {
        w.str(&self.output_dir.to_string_lossy())?;
        w.str(&self.prefix)?;
        w.write(&Value::List(
            self.orientations.iter().map(Frame::to_value).collect(),
        ))?;
        w.write(&Value::List(vec![
            Value::Int(self.resolution.0 as i64),
            Value::Int(self.resolution.1 as i64),
        ]))
    }
}

/// Artifact path for one frame: `<dir>/<prefix>_<id>.png`.
pub fn artifact_path(output_dir: &Path, prefix: &str, id: &FrameId) -> PathBuf {
    output_dir.join(format!("{prefix}_{id}.png"))
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SceneStats {
    pub rendered: usize,
    pub skipped: usize,
}

/// Decode a rendering session from the stream and replay it.
pub fn replay_scene<R: Read, B: SceneBackend>(
    r: &mut ValueReader<R>,
    rig: &RigConfig,
    backend: &mut B,
) -> Result<SceneStats> {
    let setup = SceneSetup::decode(r)?;
    run_scene(&setup, rig, backend)
}

/// Replay an already-decoded rendering session.
///
/// Orientation is applied to both linked targets; the visible figure and
/// its skeleton must never disagree. A skipped frame performs no backend
/// call at all: the orientation set is coupled to the render it feeds.
/// A backend failure aborts the remaining frames; artifacts already on
/// disk stay valid.
pub fn run_scene<B: SceneBackend>(
    setup: &SceneSetup,
    rig: &RigConfig,
    backend: &mut B,
) -> Result<SceneStats> {
    let figure = backend.lookup_object(&rig.figure)?;
    let skeleton = backend.lookup_object(&rig.skeleton)?;
    backend.apply_named_pose(&skeleton, &rig.pose)?;

    // The render target is a square inset at half the video height.
    let side = (setup.resolution.1 / 2).max(1);
    backend.set_render_resolution(side, side)?;

    let mut stats = SceneStats::default();
    for frame in &setup.orientations {
        let path = artifact_path(&setup.output_dir, &setup.prefix, &frame.id);
        if path.exists() {
            tracing::debug!(frame = %frame.id, "artifact exists, skipping");
            stats.skipped += 1;
            continue;
        }

        backend.set_rotation_quaternion(&figure, frame.quat)?;
        backend.set_rotation_quaternion(&skeleton, frame.quat)?;
        backend.render_current_scene_to_file(&path)?;
        tracing::info!(frame = %frame.id, path = %path.display(), "rendered");
        stats.rendered += 1;
    }

    Ok(stats)
}
