//! Regrouping fragments into recordings.
//!
//! Corruption inside a recording splits it into several fragments whose
//! clocks still continue one another. The merger walks the fragments in
//! block order and appends each one to the recording whose last fragment it
//! continues most closely:
//!
//! - `B` may follow `A` only if `A.end_time <= B.start_time` and the clock
//!   jump between them is within the gap threshold.
//! - Among several candidates the smallest jump wins; equal jumps go to the
//!   recording that was started first.
//! - A fragment that continues nothing starts a new recording.
//!
//! Because fragments are taken in block order, every recording is ordered by
//! `start_block` as well as by clock.

use crate::fragment::Fragment;
use crate::timestamp::Timestamp;

/// Fragments judged to belong to one original recording, in playback order.
///
/// A recording always holds at least one fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(try_from = "RecordingRepr"))]
pub struct Recording {
    fragments: Vec<Fragment>,
}

#[cfg(feature = "serialize")]
#[derive(serde::Deserialize)]
struct RecordingRepr {
    fragments: Vec<Fragment>,
}

#[cfg(feature = "serialize")]
impl TryFrom<RecordingRepr> for Recording {
    type Error = &'static str;

    fn try_from(repr: RecordingRepr) -> std::result::Result<Self, Self::Error> {
        if repr.fragments.is_empty() {
            return Err("a recording needs at least one fragment");
        }
        Ok(Self {
            fragments: repr.fragments,
        })
    }
}

impl Recording {
    fn new(first: Fragment) -> Self {
        Self {
            fragments: vec![first],
        }
    }

    /// Fragments of this recording.
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Number of fragments.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Always false: a recording holds at least one fragment.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// First fragment.
    pub fn first(&self) -> &Fragment {
        &self.fragments[0]
    }

    /// Last fragment.
    pub fn last(&self) -> &Fragment {
        &self.fragments[self.fragments.len() - 1]
    }

    /// Clock of the first block.
    pub fn start_time(&self) -> Timestamp {
        self.first().start_time
    }

    /// Clock of the last block.
    pub fn end_time(&self) -> Timestamp {
        self.last().end_time
    }

    /// Total number of blocks across all fragments.
    pub fn block_count(&self) -> u64 {
        self.fragments.iter().map(|f| f.block_count).sum()
    }

    /// Playable time: the sum of the fragment durations.
    pub fn duration(&self) -> Timestamp {
        let ticks = self.fragments.iter().map(|f| f.duration().ticks()).sum();
        Timestamp::from_ticks(ticks)
    }

    /// Iterate over the fragments.
    pub fn iter(&self) -> std::slice::Iter<'_, Fragment> {
        self.fragments.iter()
    }
}

impl<'a> IntoIterator for &'a Recording {
    type Item = &'a Fragment;
    type IntoIter = std::slice::Iter<'a, Fragment>;

    fn into_iter(self) -> Self::IntoIter {
        self.fragments.iter()
    }
}

/// Groups fragments into recordings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Merger {
    gap: Timestamp,
}

impl Merger {
    /// Create a merger allowing clock jumps of up to `gap` between fragments.
    pub fn new(gap: Timestamp) -> Self {
        Self { gap }
    }

    /// Gap threshold between consecutive fragments of a recording.
    pub fn gap(&self) -> Timestamp {
        self.gap
    }

    /// Partition `fragments` into recordings.
    ///
    /// Every input fragment ends up in exactly one recording. Recordings are
    /// returned in the order of their first block. The input is not modified;
    /// it does not need to be sorted.
    pub fn merge(&self, fragments: &[Fragment]) -> Vec<Recording> {
        let mut ordered: Vec<&Fragment> = fragments.iter().collect();
        ordered.sort_by_key(|f| f.start_block);

        let mut recordings: Vec<Recording> = Vec::new();
        for fragment in ordered {
            match self.best_continuation(&recordings, fragment) {
                Some(i) => {
                    tracing::debug!(
                        recording = i,
                        start_block = fragment.start_block,
                        "Fragment continues recording"
                    );
                    recordings[i].fragments.push(*fragment);
                }
                None => recordings.push(Recording::new(*fragment)),
            }
        }

        tracing::info!(
            fragments = fragments.len(),
            recordings = recordings.len(),
            "Merge finished"
        );
        recordings
    }

    /// Recording whose last fragment `next` continues with the smallest jump.
    fn best_continuation(&self, recordings: &[Recording], next: &Fragment) -> Option<usize> {
        recordings
            .iter()
            .enumerate()
            .filter(|(_, r)| r.last().is_continued_by(next, self.gap))
            // min_by_key keeps the first of equal keys.
            .min_by_key(|(_, r)| next.start_time.difference(r.end_time()))
            .map(|(i, _)| i)
    }
}
