use crate::enums::{FilterKind, ThresholdKind};
use crate::volume::{CrossSections, Volume, VolumeError};

use ndarray::{Array3, s};

/// One destructive edit applied uniformly to every slice of the volume.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditOp {
    Filter(FilterKind),
    Threshold(ThresholdKind),
}

/// The viewer's current selection: slice index and zoom factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewState {
    pub index: usize,
    pub zoom: f32,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            index: 0,
            zoom: 1.0,
        }
    }
}

/// An edit session owning a volume, its undo history and the view state.
///
/// Every destructive edit pushes a full deep copy of the slice data before
/// mutating, so `undo` restores exact prior pixel values. The stack is
/// LIFO and unbounded for the lifetime of the session. All mutation goes
/// through `&mut self`, which serializes access.
pub struct EditSession {
    volume: Volume,
    undo_stack: Vec<Array3<u8>>,
    view: ViewState,
}

impl EditSession {
    pub fn new(volume: Volume) -> Self {
        Self {
            volume,
            undo_stack: Vec::new(),
            view: ViewState::default(),
        }
    }

    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    /// Number of undo entries currently held.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Select the slice index, clamped into the valid range.
    pub fn set_index(&mut self, index: usize) {
        self.view.index = index.min(self.volume.depth().saturating_sub(1));
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.view.zoom = zoom;
    }

    /// Cross-sections at the currently selected index.
    pub fn cross_sections(&self) -> Result<CrossSections, VolumeError> {
        self.volume.cross_sections(self.view.index)
    }

    /// Apply an edit to every slice, saving the prior state for undo.
    pub fn apply(&mut self, op: EditOp) {
        self.undo_stack.push(self.volume.data.clone());

        let depth = self.volume.depth();
        for z in 0..depth {
            let Some(slice) = self.volume.slice_image(z) else {
                continue;
            };
            let edited = match op {
                EditOp::Filter(kind) => kind.apply(&slice),
                EditOp::Threshold(kind) => kind.apply(&slice),
            };
            self.volume
                .data
                .slice_mut(s![z, .., ..])
                .assign(&Volume::image_to_slice(&edited));
        }
        log::info!("applied {op:?} to {depth} slices");
    }

    /// Pop the most recent undo entry and restore it. Returns `false` when
    /// there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.undo_stack.pop() {
            Some(previous) => {
                self.volume.data = previous;
                log::info!("restored previous slice data, {} entries left", self.undo_stack.len());
                true
            }
            None => false,
        }
    }
}
