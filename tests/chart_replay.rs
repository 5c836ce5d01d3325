use anyhow::anyhow;

use viz_replay::backend::ChartBackend;
use viz_replay::chart::replay_chart;
use viz_replay::producer::ChartStream;
use viz_replay::wire::{ValueReader, ValueWriter};
use viz_replay::{Error, ProtocolError};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Title {
        plot: usize,
        text: String,
    },
    Series {
        plot: usize,
        x: Vec<f64>,
        values: Vec<f64>,
        color: Option<String>,
    },
}

/// Records every backend operation in arrival order.
#[derive(Debug, Default)]
struct RecordingChart {
    plots: Option<usize>,
    calls: Vec<Call>,
    shown: usize,
    fail_on_call: Option<usize>,
}

impl ChartBackend for RecordingChart {
    fn create_stacked_plots(&mut self, n: usize) -> anyhow::Result<()> {
        self.plots = Some(n);
        Ok(())
    }

    fn set_title(&mut self, plot: usize, text: &str) -> anyhow::Result<()> {
        if self.fail_on_call == Some(self.calls.len()) {
            return Err(anyhow!("surface gone"));
        }
        self.calls.push(Call::Title {
            plot,
            text: text.to_string(),
        });
        Ok(())
    }

    fn draw_series(
        &mut self,
        plot: usize,
        x: &[f64],
        values: &[f64],
        color: Option<&str>,
    ) -> anyhow::Result<()> {
        if self.fail_on_call == Some(self.calls.len()) {
            return Err(anyhow!("surface gone"));
        }
        self.calls.push(Call::Series {
            plot,
            x: x.to_vec(),
            values: values.to_vec(),
            color: color.map(str::to_string),
        });
        Ok(())
    }

    fn show_and_block(&mut self) -> anyhow::Result<()> {
        self.shown += 1;
        Ok(())
    }
}

fn replay(bytes: &[u8], backend: &mut RecordingChart) -> viz_replay::Result<usize> {
    let mut r = ValueReader::new(bytes);
    replay_chart(&mut r, backend).map(|stats| stats.dispatched)
}

#[test]
fn dispatches_in_stream_order_with_matching_arguments() {
    let x = [0.0, 0.5, 1.0];
    let mut s = ChartStream::new(Vec::new(), 2, &x).unwrap();
    s.title(0, "Altitude").unwrap();
    s.plot_series(0, Some("blue"), &[1.0, 2.0, 3.0]).unwrap();
    s.title(1, "Velocity").unwrap();
    s.plot_series(1, None, &[9.0, 8.0, 7.0]).unwrap();
    let bytes = s.finish().unwrap();

    let mut backend = RecordingChart::default();
    let dispatched = replay(&bytes, &mut backend).unwrap();

    assert_eq!(dispatched, 4);
    assert_eq!(backend.plots, Some(2));
    assert_eq!(backend.shown, 1);
    assert_eq!(
        backend.calls,
        vec![
            Call::Title {
                plot: 0,
                text: "Altitude".to_string()
            },
            Call::Series {
                plot: 0,
                x: x.to_vec(),
                values: vec![1.0, 2.0, 3.0],
                color: Some("blue".to_string()),
            },
            Call::Title {
                plot: 1,
                text: "Velocity".to_string()
            },
            Call::Series {
                plot: 1,
                x: x.to_vec(),
                values: vec![9.0, 8.0, 7.0],
                color: None,
            },
        ]
    );
}

#[test]
fn sentinel_first_dispatches_nothing() {
    let s = ChartStream::new(Vec::new(), 1, &[0.0]).unwrap();
    let bytes = s.finish().unwrap();

    let mut backend = RecordingChart::default();
    let dispatched = replay(&bytes, &mut backend).unwrap();

    assert_eq!(dispatched, 0);
    assert!(backend.calls.is_empty());
    assert_eq!(backend.shown, 1);
}

#[test]
fn unknown_opcode_aborts_and_keeps_prior_effects() {
    // One valid instruction, then an opcode outside the grammar.
    let mut w = ValueWriter::new(Vec::new());
    w.int(1).unwrap();
    w.f64_list(&[0.0]).unwrap();
    w.str("titl").unwrap();
    w.int(0).unwrap();
    w.str("Altitude").unwrap();
    w.str("shade").unwrap();
    let bytes = w.into_inner();

    let mut backend = RecordingChart::default();
    let err = replay(&bytes, &mut backend).unwrap_err();

    assert!(matches!(err, Error::UnknownInstruction(op) if op == "shade"));
    assert_eq!(
        backend.calls,
        vec![Call::Title {
            plot: 0,
            text: "Altitude".to_string()
        }]
    );
    assert_eq!(backend.shown, 0);
}

#[test]
fn truncated_arguments_fail_before_the_handler_runs() {
    // `titl` with only one of its two arguments, then EOF.
    let mut w = ValueWriter::new(Vec::new());
    w.int(1).unwrap();
    w.f64_list(&[0.0]).unwrap();
    w.str("titl").unwrap();
    w.int(0).unwrap();
    let bytes = w.into_inner();

    let mut backend = RecordingChart::default();
    let err = replay(&bytes, &mut backend).unwrap_err();

    assert!(matches!(
        err,
        Error::Protocol(ProtocolError::Truncated)
    ));
    assert!(backend.calls.is_empty());
}

#[test]
fn stream_ending_without_sentinel_is_truncated() {
    let mut w = ValueWriter::new(Vec::new());
    w.int(1).unwrap();
    w.f64_list(&[0.0]).unwrap();
    let bytes = w.into_inner();

    let mut backend = RecordingChart::default();
    let err = replay(&bytes, &mut backend).unwrap_err();
    assert!(matches!(err, Error::Protocol(ProtocolError::Truncated)));
}

#[test]
fn backend_failure_aborts_the_session() {
    let mut s = ChartStream::new(Vec::new(), 1, &[0.0]).unwrap();
    s.title(0, "a").unwrap();
    s.title(0, "b").unwrap();
    s.title(0, "c").unwrap();
    let bytes = s.finish().unwrap();

    let mut backend = RecordingChart {
        fail_on_call: Some(1),
        ..Default::default()
    };
    let err = replay(&bytes, &mut backend).unwrap_err();

    assert!(matches!(err, Error::Backend(_)));
    // The first instruction's effect stays applied; nothing after the
    // failing one reaches the backend.
    assert_eq!(backend.calls.len(), 1);
    assert_eq!(backend.shown, 0);
}

#[test]
fn worked_example_single_plot_session() {
    // Title(0, "Altitude"), PlotSeries(0, "blue", [1,2,3]), sentinel.
    let x = [10.0, 20.0, 30.0];
    let mut s = ChartStream::new(Vec::new(), 1, &x).unwrap();
    s.title(0, "Altitude").unwrap();
    s.plot_series(0, Some("blue"), &[1.0, 2.0, 3.0]).unwrap();
    let bytes = s.finish().unwrap();

    let mut backend = RecordingChart::default();
    let dispatched = replay(&bytes, &mut backend).unwrap();

    assert_eq!(dispatched, 2);
    assert_eq!(backend.plots, Some(1));
    assert_eq!(backend.calls.len(), 2);
    assert_eq!(backend.shown, 1);
}
