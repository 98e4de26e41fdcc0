//! Background motion detection
//!
//! The background is a per-beam reference range. It is captured wholesale on
//! the first cycle and on every moving→stationary transition of the platform,
//! and refreshed beam by beam whenever a beam is flagged dynamic: a reading
//! that deviates from its reference becomes the new reference. Detection is
//! therefore edge-triggered. An object that stops moving is flagged for one
//! cycle only, and a scene that keeps changing drags the reference with it.

use crate::scan::Scan;

/// Beams flagged dynamic during the current cycle.
#[derive(Clone, Debug, Default)]
pub struct DynamicMask {
    flags: Vec<bool>,
    count: usize,
}

impl DynamicMask {
    /// Clear every flag and size the mask for `nb_beams`.
    pub fn reset(&mut self, nb_beams: usize) {
        self.flags.clear();
        self.flags.resize(nb_beams, false);
        self.count = 0;
    }

    pub fn mark(&mut self, beam: usize) {
        if let Some(flag) = self.flags.get_mut(beam) {
            if !*flag {
                *flag = true;
                self.count += 1;
            }
        }
    }

    pub fn is_dynamic(&self, beam: usize) -> bool {
        self.flags.get(beam).copied().unwrap_or(false)
    }

    /// Number of dynamic beams in `start..=end`.
    pub fn count_in(&self, start: usize, end: usize) -> usize {
        if start >= self.flags.len() || end < start {
            return 0;
        }
        let end = end.min(self.flags.len() - 1);
        self.flags[start..=end].iter().filter(|&&f| f).count()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.flags
            .iter()
            .enumerate()
            .filter_map(|(i, &f)| if f { Some(i) } else { None })
    }
}

/// Per-beam reference ranges.
#[derive(Clone, Debug)]
pub struct BackgroundModel {
    ranges: Vec<f64>,
    stored: bool,
    motion_threshold: f64,
}

impl BackgroundModel {
    pub fn new(motion_threshold: f64) -> Self {
        BackgroundModel {
            ranges: Vec::new(),
            stored: false,
            motion_threshold,
        }
    }

    /// Replace the whole reference with the current scan.
    pub fn store(&mut self, scan: &Scan) {
        self.ranges.clear();
        self.ranges.extend_from_slice(&scan.ranges);
        self.stored = true;
        log::debug!("background stored ({} beams)", self.ranges.len());
    }

    /// True until the first store, or when the scan no longer matches the
    /// stored beam layout.
    pub fn needs_store(&self, scan: &Scan) -> bool {
        !self.stored || self.ranges.len() != scan.len()
    }

    /// Flag every beam whose range moved by more than the threshold since its
    /// reference, and adopt the new range as that beam's reference.
    ///
    /// The mask is reset first, so it only ever holds this cycle's flags.
    pub fn detect(&mut self, scan: &Scan, mask: &mut DynamicMask) {
        mask.reset(scan.len());
        if self.needs_store(scan) {
            self.store(scan);
            return;
        }

        for (i, (&current, reference)) in scan
            .ranges
            .iter()
            .zip(self.ranges.iter_mut())
            .enumerate()
        {
            let diff = *reference - current;
            if diff.abs() <= self.motion_threshold {
                continue;
            }
            mask.mark(i);
            *reference = current;
        }
    }

    pub fn is_stored(&self) -> bool {
        self.stored
    }

    pub fn ranges(&self) -> &[f64] {
        &self.ranges
    }
}
