//! Decoding of raw regression rows into normalized geometry.
//!
//! Row `i` is interpreted relative to anchor `i`. Offsets are in input pixels
//! and divided by the square input edge, so both axes share one scale.

use crate::anchor::Anchor;
use crate::raw::RawBoxes;
use crate::trace::{trace_event, trace_span};
use crate::util::{SsdFaceError, SsdFaceResult};

#[cfg(feature = "rayon")]
pub mod rayon;

/// Decodes every row of `raw` against the leading anchors.
///
/// Output vectors are `xmin, ymin, xmax, ymax` followed by the keypoints,
/// all in normalized coordinates. More rows than anchors is a
/// [`SsdFaceError::ConfigMismatch`]; fewer rows use only the first anchors.
pub fn decode_boxes(
    size: u32,
    anchors: &[Anchor],
    raw: RawBoxes<'_>,
) -> SsdFaceResult<Vec<Vec<f32>>> {
    check_row_count(anchors, raw)?;
    let _span = trace_span!("decode_boxes", rows = raw.num_rows()).entered();

    let size = size as f32;
    let out: Vec<Vec<f32>> = raw
        .rows()
        .zip(anchors.iter())
        .map(|(row, anchor)| decode_row(size, anchor, row))
        .collect();

    trace_event!("decoded_rows", count = out.len());
    Ok(out)
}

pub(crate) fn check_row_count(anchors: &[Anchor], raw: RawBoxes<'_>) -> SsdFaceResult<()> {
    if raw.num_rows() > anchors.len() {
        return Err(SsdFaceError::ConfigMismatch {
            expected: anchors.len(),
            actual: raw.num_rows(),
        });
    }
    Ok(())
}

/// Decodes one row relative to its anchor.
pub(crate) fn decode_row(size: f32, anchor: &Anchor, row: &[f32]) -> Vec<f32> {
    let half_w = row[2] / size / 2.0;
    let half_h = row[3] / size / 2.0;
    let center_x = row[0] / size + anchor.x_center;
    let center_y = row[1] / size + anchor.y_center;

    let mut out = Vec::with_capacity(row.len());
    out.extend_from_slice(&[
        center_x - half_w,
        center_y - half_h,
        center_x + half_w,
        center_y + half_h,
    ]);
    for (j, &value) in row[4..].iter().enumerate() {
        let offset = if j % 2 == 0 {
            anchor.x_center
        } else {
            anchor.y_center
        };
        out.push(value / size + offset);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{decode_boxes, decode_row};
    use crate::anchor::Anchor;
    use crate::raw::RawBoxes;
    use crate::util::SsdFaceError;

    #[test]
    fn full_size_box_covers_image() {
        let anchor = Anchor::new(0.5, 0.5);
        let out = decode_row(256.0, &anchor, &[0.0, 0.0, 256.0, 256.0, 0.0, 0.0]);
        assert_eq!(out, vec![0.0, 0.0, 1.0, 1.0, 0.5, 0.5]);
    }

    #[test]
    fn keypoints_use_matching_anchor_axis() {
        let anchor = Anchor::new(0.25, 0.75);
        let out = decode_row(100.0, &anchor, &[10.0, -10.0, 20.0, 40.0, 5.0, 5.0, -5.0, 0.0]);
        let expected = [0.25, 0.45, 0.45, 0.85, 0.3, 0.8, 0.2, 0.75];
        for (got, want) in out.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-6, "got {got}, want {want}");
        }
    }

    #[test]
    fn more_rows_than_anchors_is_rejected() {
        let anchors = [Anchor::new(0.5, 0.5)];
        let data = [0.0f32; 12];
        let raw = RawBoxes::new(&data, 6).unwrap();
        assert_eq!(
            decode_boxes(128, &anchors, raw),
            Err(SsdFaceError::ConfigMismatch {
                expected: 1,
                actual: 2,
            })
        );
    }

    #[test]
    fn fewer_rows_use_leading_anchors() {
        let anchors = [Anchor::new(0.1, 0.2), Anchor::new(0.9, 0.9)];
        let data = [0.0f32; 4];
        let raw = RawBoxes::new(&data, 4).unwrap();
        let out = decode_boxes(64, &anchors, raw).unwrap();
        assert_eq!(out, vec![vec![0.1, 0.2, 0.1, 0.2]]);
    }
}
