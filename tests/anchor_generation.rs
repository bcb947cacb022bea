use ssdface::{Anchor, AnchorTable, GridConfig};

fn grid(num_layers: usize, strides: Vec<u32>, size: u32) -> GridConfig {
    GridConfig {
        num_layers,
        strides,
        input_height: size,
        input_width: size,
        anchor_offset_x: 0.5,
        anchor_offset_y: 0.5,
        interpolated_scale_aspect_ratio: 1.0,
    }
}

#[test]
fn two_by_two_grid_matches_expected_order() {
    let table = AnchorTable::generate(&grid(1, vec![2], 4));
    let expected = vec![
        Anchor::new(0.25, 0.25),
        Anchor::new(0.25, 0.25),
        Anchor::new(0.75, 0.25),
        Anchor::new(0.75, 0.25),
        Anchor::new(0.25, 0.75),
        Anchor::new(0.25, 0.75),
        Anchor::new(0.75, 0.75),
        Anchor::new(0.75, 0.75),
    ];
    assert_eq!(table.as_slice(), expected.as_slice());
}

#[test]
fn front_preset_layout() {
    let table = AnchorTable::generate(&GridConfig::front());
    // 16x16 cells with 2 anchors, then 8x8 cells with 3 layers * 2 anchors
    assert_eq!(table.len(), 16 * 16 * 2 + 8 * 8 * 6);

    assert_eq!(table[0], Anchor::new(0.5 / 16.0, 0.5 / 16.0));
    assert_eq!(table[1], table[0]);
    assert_eq!(table[2], Anchor::new(1.5 / 16.0, 0.5 / 16.0));
    assert_eq!(table[511], Anchor::new(15.5 / 16.0, 15.5 / 16.0));

    let first_coarse = Anchor::new(0.5 / 8.0, 0.5 / 8.0);
    assert!(table.as_slice()[512..518].iter().all(|a| *a == first_coarse));
    assert_eq!(table[518], Anchor::new(1.5 / 8.0, 0.5 / 8.0));
    assert_eq!(table[895], Anchor::new(7.5 / 8.0, 7.5 / 8.0));
}

#[test]
fn back_preset_layout() {
    let table = AnchorTable::generate(&GridConfig::back());
    assert_eq!(table.len(), 896);
    assert_eq!(table[0], Anchor::new(0.5 / 16.0, 0.5 / 16.0));
    assert_eq!(table[512], Anchor::new(0.5 / 8.0, 0.5 / 8.0));
}

#[test]
fn anchors_stay_inside_unit_square() {
    for cfg in [GridConfig::front(), GridConfig::back()] {
        for anchor in &AnchorTable::generate(&cfg) {
            assert!(anchor.x_center > 0.0 && anchor.x_center < 1.0);
            assert!(anchor.y_center > 0.0 && anchor.y_center < 1.0);
        }
    }
}

#[test]
fn non_adjacent_equal_strides_are_separate_groups() {
    let table = AnchorTable::generate(&grid(3, vec![2, 4, 2], 4));
    // 2x2*2, then 1x1*2, then 2x2*2 again
    assert_eq!(table.len(), 8 + 2 + 8);
    assert_eq!(table[8], Anchor::new(0.5, 0.5));
    assert_eq!(table[10], Anchor::new(0.25, 0.25));
}

#[test]
fn offsets_shift_centers_within_cells() {
    let cfg = GridConfig {
        anchor_offset_x: 0.0,
        anchor_offset_y: 1.0,
        ..grid(1, vec![2], 4)
    };
    let table = AnchorTable::generate(&cfg);
    assert_eq!(table[0], Anchor::new(0.0, 0.5));
    assert_eq!(table[7], Anchor::new(0.5, 1.0));
}

#[test]
fn rectangular_inputs_normalize_each_axis() {
    let cfg = GridConfig {
        input_width: 8,
        input_height: 4,
        ..grid(1, vec![4], 4)
    };
    let table = AnchorTable::generate(&cfg);
    // 2x1 cells
    assert_eq!(table.len(), 4);
    assert_eq!(table[2], Anchor::new(0.75, 0.5));
}
