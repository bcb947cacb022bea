//! Boundary to the network runtime.
//!
//! Loading and executing the model live outside this crate. A backend only
//! has to turn a preprocessed [`InputTensor`] into the two raw output arrays.

use crate::preprocess::InputTensor;
use crate::raw::RawBoxes;
use crate::util::SsdFaceResult;

/// Raw output arrays of one inference call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawOutput {
    /// Flat regression rows (`N * row_len` values).
    pub regressors: Vec<f32>,
    /// Values per regression row (`4 + 2K`).
    pub row_len: usize,
    /// One classification logit per row.
    pub classificators: Vec<f32>,
}

impl RawOutput {
    /// Borrows the regressors as validated rows.
    pub fn boxes(&self) -> SsdFaceResult<RawBoxes<'_>> {
        RawBoxes::new(&self.regressors, self.row_len)
    }
}

/// A network backend producing raw SSD output.
pub trait InferenceEngine {
    /// Runs the network on one preprocessed input.
    ///
    /// Backends report their own failures as
    /// [`SsdFaceError::Inference`](crate::SsdFaceError::Inference).
    fn infer(&self, input: &InputTensor) -> SsdFaceResult<RawOutput>;
}

impl<E: InferenceEngine + ?Sized> InferenceEngine for &E {
    fn infer(&self, input: &InputTensor) -> SsdFaceResult<RawOutput> {
        (**self).infer(input)
    }
}
