/// Wave iteration over the sequenced steps of a render process
///
/// A wave is the contiguous run of steps sharing one sequence index. Steps
/// of a wave have no ordering among themselves; the GPU work of wave N must
/// complete before wave N+1 starts.

use crate::ids::{SequenceIndex, StepId};
use crate::render_process::dependency_graph::Step;

/// One wave, borrowed from its render process
#[derive(Debug, Clone, Copy)]
pub struct Wave<'a> {
    sequence_index: SequenceIndex,
    start: usize,
    steps: &'a [(StepId, Step)],
    validity: u64,
}

impl<'a> Wave<'a> {
    pub fn sequence_index(&self) -> SequenceIndex {
        self.sequence_index
    }

    pub fn steps(&self) -> &'a [(StepId, Step)] {
        self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Detached position of this wave, resolvable later with
    /// `RenderProcess::resolve_wave` as long as no setup/reset happened
    pub fn cursor(&self) -> WaveCursor {
        WaveCursor {
            sequence_index: self.sequence_index,
            start: self.start,
            len: self.steps.len(),
            validity: self.validity,
        }
    }

    pub(crate) fn validity(&self) -> u64 {
        self.validity
    }
}

/// Wave position that does not borrow the render process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WaveCursor {
    pub(crate) sequence_index: SequenceIndex,
    pub(crate) start: usize,
    pub(crate) len: usize,
    pub(crate) validity: u64,
}

impl WaveCursor {
    pub fn sequence_index(&self) -> SequenceIndex {
        self.sequence_index
    }

    /// Stamp of the setup/reset the cursor was taken under
    pub fn validity(&self) -> u64 {
        self.validity
    }
}

/// Forward-only iterator over the waves of a render process
#[derive(Debug, Clone)]
pub struct WaveIterator<'a> {
    steps: &'a [(StepId, Step)],
    position: usize,
    validity: u64,
}

impl<'a> WaveIterator<'a> {
    pub(crate) fn new(steps: &'a [(StepId, Step)], validity: u64) -> Self {
        Self { steps, position: 0, validity }
    }

    pub(crate) fn empty(validity: u64) -> Self {
        Self::new(&[], validity)
    }

    pub(crate) fn wave_at(
        steps: &'a [(StepId, Step)],
        start: usize,
        len: usize,
        validity: u64,
    ) -> Option<Wave<'a>> {
        let slice = steps.get(start..start + len)?;
        let (_, first) = slice.first()?;
        Some(Wave {
            sequence_index: first.sequence_index,
            start,
            steps: slice,
            validity,
        })
    }
}

impl<'a> Iterator for WaveIterator<'a> {
    type Item = Wave<'a>;

    fn next(&mut self) -> Option<Wave<'a>> {
        let rest = self.steps.get(self.position..)?;
        let (_, first) = rest.first()?;
        let len = rest
            .iter()
            .position(|(_, step)| step.sequence_index != first.sequence_index)
            .unwrap_or(rest.len());

        let wave = Wave {
            sequence_index: first.sequence_index,
            start: self.position,
            steps: &rest[..len],
            validity: self.validity,
        };
        self.position += len;
        Some(wave)
    }
}

#[cfg(test)]
#[path = "wave_iterator_tests.rs"]
mod tests;
