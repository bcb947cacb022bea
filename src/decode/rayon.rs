//! Rayon-parallel decoding (feature-gated).
//!
//! Rows are independent, so they are decoded in parallel and collected back
//! in row order. Output matches [`decode_boxes`](super::decode_boxes) exactly.

use crate::anchor::Anchor;
use crate::decode::{check_row_count, decode_row};
use crate::raw::RawBoxes;
use crate::trace::{trace_event, trace_span};
use crate::util::SsdFaceResult;
use rayon::prelude::*;

/// Row-parallel variant of [`decode_boxes`](super::decode_boxes).
pub fn decode_boxes_par(
    size: u32,
    anchors: &[Anchor],
    raw: RawBoxes<'_>,
) -> SsdFaceResult<Vec<Vec<f32>>> {
    check_row_count(anchors, raw)?;
    let _span = trace_span!("decode_boxes_par", rows = raw.num_rows()).entered();

    let size = size as f32;
    let out: Vec<Vec<f32>> = raw
        .as_slice()
        .par_chunks_exact(raw.row_len())
        .zip(anchors.par_iter())
        .map(|(row, anchor)| decode_row(size, anchor, row))
        .collect();

    trace_event!("decoded_rows", count = out.len());
    Ok(out)
}
