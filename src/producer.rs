//! Producer-side emitters and the consumer subprocess harness.
//!
//! The analysis pipeline links this module to drive a consumer over a
//! pipe: spawn it with [`ConsumerProcess`], stream a session into its
//! stdin, then wait and surface a non-zero exit as an error.

use std::ffi::OsStr;
use std::io::Write;
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::error::{Error, Result};
use crate::scene::SceneSetup;
use crate::wire::ValueWriter;

/// Typed emitter for one charting session.
///
/// Emits exactly what `chart::replay_chart` consumes: the setup block on
/// construction, one instruction per call, the sentinel on `finish`.
pub struct ChartStream<W: Write> {
    w: ValueWriter<W>,
}

impl<W: Write> ChartStream<W> {
    pub fn new(w: W, nplots: usize, x_axis: &[f64]) -> Result<Self> {
        let mut w = ValueWriter::new(w);
        w.int(nplots as i64)?;
        w.f64_list(x_axis)?;
        Ok(Self { w })
    }

    pub fn title(&mut self, plot: usize, text: &str) -> Result<()> {
        self.w.str("titl")?;
        self.w.int(plot as i64)?;
        self.w.str(text)
    }

    pub fn plot_series(&mut self, plot: usize, color: Option<&str>, values: &[f64]) -> Result<()> {
        self.w.str("plot")?;
        self.w.int(plot as i64)?;
        match color {
            Some(c) => self.w.str(c)?,
            None => self.w.none()?,
        }
        self.w.f64_list(values)
    }

    /// Write the sentinel, flush, and hand the transport back.
    pub fn finish(mut self) -> Result<W> {
        self.w.none()?;
        self.w.flush()?;
        Ok(self.w.into_inner())
    }
}

/// Write a complete rendering-session setup block.
pub fn write_scene_session<W: Write>(w: W, setup: &SceneSetup) -> Result<()> {
    let mut w = ValueWriter::new(w);
    setup.encode(&mut w)?;
    w.flush()
}

/// A consumer process fed over its piped stdin; stdout stays on ours.
pub struct ConsumerProcess {
    child: Child,
}

impl ConsumerProcess {
    pub fn spawn<P, I, S>(program: P, args: I) -> Result<Self>
    where
        P: AsRef<OsStr>,
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .spawn()?;
        Ok(Self { child })
    }

    /// Borrow the child's stdin as a value writer.
    pub fn writer(&mut self) -> ValueWriter<&mut ChildStdin> {
        ValueWriter::new(self.child.stdin.as_mut().expect("stdin is piped"))
    }

    /// Wait for the consumer to finish; a non-zero exit is an error
    /// carrying the status. The stdin pipe is closed before waiting.
    pub fn wait(&mut self) -> Result<()> {
        let status = self.child.wait()?;
        if !status.success() {
            return Err(Error::ExitStatus(status));
        }
        Ok(())
    }
}
