//! Hooks for transforming an analyzed stream.
//!
//! Nothing here changes a stream yet. [`Pass`] is the seam optimizations plug
//! into, and [`merge_labels`] is where runs of adjacent labels will be collapsed.

use std::ops::RangeInclusive;

use log::debug;

use crate::analyze::AnalyzedStream;
use crate::error::Error;

/// A transformation from one analyzed stream to another.
pub trait Pass {
    fn name(&self) -> &str;

    fn run(&mut self, stream: AnalyzedStream) -> Result<AnalyzedStream, Vec<Error>>;
}

/// Hands the stream back untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl Pass for Identity {
    fn name(&self) -> &str {
        "identity"
    }

    fn run(&mut self, stream: AnalyzedStream) -> Result<AnalyzedStream, Vec<Error>> {
        Ok(stream)
    }
}

/// Runs `passes` over `stream` in order, stopping at the first that fails.
pub fn optimize(stream: AnalyzedStream, passes: &mut [Box<dyn Pass>]) -> Result<AnalyzedStream, Vec<Error>> {
    passes.iter_mut().try_fold(stream, |stream, pass| {
        debug!("running pass {}", pass.name());
        pass.run(stream)
    })
}

/// Maximal runs of two or more consecutive labels, as inclusive index ranges.
pub fn label_runs(stream: &AnalyzedStream) -> Vec<RangeInclusive<usize>> {
    let mut runs = Vec::new();
    let mut start = None;
    for (index, c) in stream.signature().char_indices().chain(Some((stream.len(), ' '))) {
        match (c, start) {
            ('L', None) => start = Some(index),
            ('L', Some(_)) => {}
            (_, Some(first)) => {
                if index - first > 1 {
                    runs.push(first..=index - 1);
                }
                start = None;
            }
            (_, None) => {}
        }
    }
    runs
}

/// Merges the labels at `start..=end` into one.
///
/// Every token in the range has to be a label. The merge itself isn't done yet,
/// so the stream comes back unchanged.
pub fn merge_labels(stream: AnalyzedStream, start: usize, end: usize) -> Result<AnalyzedStream, Error> {
    if start > end || end >= stream.len() {
        return Err(Error::OutOfRange { start, end, len: stream.len() });
    }
    if let Some(index) = (start..=end).find(|index| stream.tokens()[*index].as_label().is_none()) {
        return Err(Error::NotALabelRun { index });
    }
    Ok(stream)
}
