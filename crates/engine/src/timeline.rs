use crate::error::{EngineError, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Opaque identifier for committed clips.
pub type ClipId = u64;

/// Committed `[start_time, end_time)` range over the source video, in seconds.
///
/// Clips are only built by [`ClipTimeline::mark_end`], which guarantees
/// `0 <= start_time < end_time`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Clip {
    id: ClipId,
    start_time: f64,
    end_time: f64,
}

impl Clip {
    pub fn id(&self) -> ClipId {
        self.id
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    /// Returns `end_time - start_time`, always positive.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Pending start marker plus the ordered collection of committed clips.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipTimeline {
    clips: Vec<Clip>,
    pending_start: Option<f64>,
    next_clip_id: ClipId,
}

impl Default for ClipTimeline {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipTimeline {
    /// Creates an empty timeline with no pending marker.
    pub fn new() -> Self {
        Self {
            clips: Vec::new(),
            pending_start: None,
            next_clip_id: 1,
        }
    }

    /// Sets the pending start marker, replacing any previous one.
    pub fn mark_start(&mut self, position: f64) {
        if let Some(previous) = self.pending_start.replace(position) {
            debug!(previous, position, "pending start marker replaced");
        } else {
            debug!(position, "pending start marker set");
        }
    }

    /// Commits the pending start marker and `position` into a new clip.
    ///
    /// Fails with `NoStartMarker` when no start was marked and with
    /// `InvalidRange` when the start is negative or not finite, or when
    /// `position` is not strictly after it. The pending marker is kept on
    /// failure so the end can be retried.
    ///
    /// # Example
    /// ```
    /// use engine::timeline::ClipTimeline;
    ///
    /// let mut timeline = ClipTimeline::new();
    /// timeline.mark_start(10.0);
    /// assert!(timeline.mark_end(8.0).is_err());
    /// assert_eq!(timeline.pending_start(), Some(10.0));
    ///
    /// let clip = timeline.mark_end(25.0).expect("valid range");
    /// assert_eq!(clip.duration(), 15.0);
    /// assert_eq!(timeline.pending_start(), None);
    /// ```
    pub fn mark_end(&mut self, position: f64) -> Result<Clip> {
        let Some(start) = self.pending_start else {
            warn!(position, "clip rejected: no start marker");
            return Err(EngineError::NoStartMarker);
        };
        if !start.is_finite() || start < 0.0 || position.is_nan() || position <= start {
            warn!(start, position, "clip rejected: end is not after start");
            return Err(EngineError::InvalidRange {
                start,
                end: position,
            });
        }

        let clip = Clip {
            id: self.allocate_clip_id(),
            start_time: start,
            end_time: position,
        };
        self.clips.push(clip);
        self.pending_start = None;

        info!(
            clip_id = clip.id,
            start_time = clip.start_time,
            end_time = clip.end_time,
            clip_count = self.clips.len(),
            "clip committed"
        );
        Ok(clip)
    }

    /// Removes the clip with `id`, keeping the order of the others.
    ///
    /// Unknown ids are ignored and return `None`.
    pub fn delete_clip(&mut self, id: ClipId) -> Option<Clip> {
        let Some(index) = self.clips.iter().position(|clip| clip.id == id) else {
            debug!(clip_id = id, "delete ignored: clip not found");
            return None;
        };
        let removed = self.clips.remove(index);
        debug!(
            clip_id = id,
            clip_count = self.clips.len(),
            "clip deleted"
        );
        Some(removed)
    }

    /// Returns committed clips in creation order.
    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn find(&self, id: ClipId) -> Option<&Clip> {
        self.clips.iter().find(|clip| clip.id == id)
    }

    pub fn pending_start(&self) -> Option<f64> {
        self.pending_start
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub(crate) fn clear_pending_start(&mut self) {
        self.pending_start = None;
    }

    fn allocate_clip_id(&mut self) -> ClipId {
        let id = self.next_clip_id;
        self.next_clip_id += 1;
        id
    }
}
