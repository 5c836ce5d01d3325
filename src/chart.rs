//! The charting session: a sentinel-terminated instruction stream.
//!
//! The producer emits series incrementally, so this session kind is
//! streamed: setup values once, then an unbounded opcode loop until the
//! sentinel. Instructions are applied to the backend strictly in arrival
//! order; the figure is shared mutable state, so reordering would be
//! observable.

use std::io::Read;

use crate::backend::ChartBackend;
use crate::error::{Error, Result};
use crate::wire::{Value, ValueReader};

/// Values read once, before entering the instruction loop. Immutable for
/// the session's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSetup {
    pub nplots: usize,
    /// Time axis shared by every series in the session.
    pub x_axis: Vec<f64>,
}

impl ChartSetup {
    pub fn decode<R: Read>(r: &mut ValueReader<R>) -> Result<Self> {
        let nplots = r.next()?.as_index()?;
        let x_axis = r.next()?.into_f64_vec()?;
        Ok(Self { nplots, x_axis })
    }
}

/// One decoded charting instruction.
///
/// The grammar is closed: the dispatcher matches exhaustively, and each
/// variant's arity is a compile-time fact of its fields.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartInstr {
    Title {
        plot: usize,
        text: String,
    },
    PlotSeries {
        plot: usize,
        color: Option<String>,
        values: Vec<f64>,
    },
}

impl ChartInstr {
    /// Decode the next instruction, or `None` on the sentinel.
    ///
    /// Anything in opcode position that is neither the sentinel nor a
    /// known opcode fails with [`Error::UnknownInstruction`] before any
    /// argument is consumed; nothing of the unresolved instruction is
    /// applied.
    pub fn decode<R: Read>(r: &mut ValueReader<R>) -> Result<Option<Self>> {
        let opcode = match r.next()? {
            Value::None => return Ok(None),
            Value::Str(op) => op,
            other => return Err(Error::UnknownInstruction(format!("{other:?}"))),
        };

        match opcode.as_str() {
            "titl" => {
                let plot = r.next()?.as_index()?;
                let text = r.next()?.into_string()?;
                Ok(Some(ChartInstr::Title { plot, text }))
            }
            "plot" => {
                let plot = r.next()?.as_index()?;
                let color = r.next()?.into_opt_string()?;
                let values = r.next()?.into_f64_vec()?;
                Ok(Some(ChartInstr::PlotSeries {
                    plot,
                    color,
                    values,
                }))
            }
            other => Err(Error::UnknownInstruction(other.to_string())),
        }
    }

    fn apply<B: ChartBackend>(&self, backend: &mut B, x_axis: &[f64]) -> Result<()> {
        match self {
            ChartInstr::Title { plot, text } => backend.set_title(*plot, text)?,
            ChartInstr::PlotSeries {
                plot,
                color,
                values,
            } => backend.draw_series(*plot, x_axis, values, color.as_deref())?,
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChartStats {
    /// Instructions decoded and applied (setup and teardown not included).
    pub dispatched: usize,
}

/// Run one charting session to completion.
///
/// Reads the setup block, creates the stacked plots, then dispatches
/// instructions until the sentinel and shows the finished figure. Any
/// error aborts the session immediately; effects already applied to the
/// backend are left as-is.
pub fn replay_chart<R: Read, B: ChartBackend>(
    r: &mut ValueReader<R>,
    backend: &mut B,
) -> Result<ChartStats> {
    let setup = ChartSetup::decode(r)?;
    backend.create_stacked_plots(setup.nplots)?;

    let mut stats = ChartStats::default();
    while let Some(instr) = ChartInstr::decode(r)? {
        tracing::debug!(?instr, "dispatching");
        instr.apply(backend, &setup.x_axis)?;
        stats.dispatched += 1;
    }

    backend.show_and_block()?;
    Ok(stats)
}
