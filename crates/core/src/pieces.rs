//! Pieces module - Tetromino catalog and SRS kick tables
//!
//! Each kind is defined by a square bounding box and a spawn-state cell mask. Rows of a mask are
//! listed bottom-up (row 0 is the lowest row of the box), matching the board's y-up coordinates.
//! The other three rotation states are derived by rotating the box.
//!
//! Reference: https://tetris.wiki/SRS

use crate::types::{PieceKind, Rotation, RotationDir};

/// Offset of a single mino relative to the bottom-left corner of the bounding box
pub type MinoOffset = (i8, i8);

/// Shape of a piece - 4 mino offsets from the box origin
pub type PieceShape = [MinoOffset; 4];

/// Ordered kick offsets tried after the unkicked rotation fails
pub type KickRow = [(i8, i8); 4];

const F: bool = false;
const X: bool = true;

const I_MASK: [[bool; 4]; 4] = [[F, F, F, F], [F, F, F, F], [X, X, X, X], [F, F, F, F]];
const J_MASK: [[bool; 3]; 3] = [[F, F, F], [X, X, X], [X, F, F]];
const L_MASK: [[bool; 3]; 3] = [[F, F, F], [X, X, X], [F, F, X]];
const O_MASK: [[bool; 2]; 2] = [[X, X], [X, X]];
const S_MASK: [[bool; 3]; 3] = [[F, F, F], [X, X, F], [F, X, X]];
const T_MASK: [[bool; 3]; 3] = [[F, F, F], [X, X, X], [F, X, F]];
const Z_MASK: [[bool; 3]; 3] = [[F, F, F], [F, X, X], [X, X, F]];

/// Side length of the kind's square bounding box (2, 3 or 4)
pub fn box_size(kind: PieceKind) -> usize {
    match kind {
        PieceKind::I => 4,
        PieceKind::O => 2,
        PieceKind::J | PieceKind::L | PieceKind::S | PieceKind::T | PieceKind::Z => 3,
    }
}

/// Whether the spawn-state mask has a mino at box cell (col, row)
fn mask_at(kind: PieceKind, col: usize, row: usize) -> bool {
    match kind {
        PieceKind::I => I_MASK[row][col],
        PieceKind::J => J_MASK[row][col],
        PieceKind::L => L_MASK[row][col],
        PieceKind::O => O_MASK[row][col],
        PieceKind::S => S_MASK[row][col],
        PieceKind::T => T_MASK[row][col],
        PieceKind::Z => Z_MASK[row][col],
    }
}

/// Map a board-local box cell to the spawn-state mask cell it samples under `rotation`
fn source_cell(rotation: Rotation, x: usize, y: usize, size: usize) -> (usize, usize) {
    let last = size - 1;
    match rotation {
        Rotation::Spawn => (x, y),
        Rotation::Right => (last - y, x),
        Rotation::Flipped => (last - x, last - y),
        Rotation::Left => (y, last - x),
    }
}

/// Get the shape (mino offsets) for a piece kind and rotation
///
/// Offsets are ordered bottom-up, then left-to-right.
pub fn get_shape(kind: PieceKind, rotation: Rotation) -> PieceShape {
    let size = box_size(kind);
    let mut shape = [(0i8, 0i8); 4];
    let mut n = 0usize;
    for y in 0..size {
        for x in 0..size {
            let (col, row) = source_cell(rotation, x, y, size);
            if mask_at(kind, col, row) {
                debug_assert!(n < 4, "{:?} mask has more than four minos", kind);
                shape[n] = (x as i8, y as i8);
                n += 1;
            }
        }
    }
    debug_assert_eq!(n, 4, "{:?} mask must have exactly four minos", kind);
    shape
}

/// Every non-O piece except I shares one table
const JLSTZ_CW: [KickRow; 4] = [
    // 0->R
    [(-1, 0), (-1, 1), (0, -2), (-1, -2)],
    // R->2
    [(1, 0), (1, -1), (0, 2), (1, 2)],
    // 2->L
    [(1, 0), (1, 1), (0, -2), (1, -2)],
    // L->0
    [(-1, 0), (-1, -1), (0, 2), (-1, 2)],
];

const JLSTZ_CCW: [KickRow; 4] = [
    // 0->L
    [(1, 0), (1, 1), (0, -2), (1, -2)],
    // R->0
    [(1, 0), (1, -1), (0, 2), (1, 2)],
    // 2->R
    [(-1, 0), (-1, 1), (0, -2), (-1, -2)],
    // L->2
    [(-1, 0), (-1, -1), (0, 2), (-1, 2)],
];

const I_CW: [KickRow; 4] = [
    // 0->R
    [(-2, 0), (1, 0), (-2, -1), (1, 2)],
    // R->2
    [(-1, 0), (2, 0), (-1, 2), (2, -1)],
    // 2->L
    [(2, 0), (-1, 0), (2, 1), (-1, -2)],
    // L->0
    [(1, 0), (-2, 0), (1, -2), (-2, 1)],
];

const I_CCW: [KickRow; 4] = [
    // 0->L
    [(-1, 0), (2, 0), (-1, 2), (2, -1)],
    // R->0
    [(2, 0), (-1, 0), (2, 1), (-1, -2)],
    // 2->R
    [(1, 0), (-2, 0), (1, -2), (-2, 1)],
    // L->2
    [(-2, 0), (1, 0), (-2, -1), (1, 2)],
];

/// Kick offsets for rotating `kind` away from `from` in direction `dir`
///
/// Returns `None` for a lookup outside the table, which callers treat as a rejected rotation.
pub fn kick_row(kind: PieceKind, from: Rotation, dir: RotationDir) -> Option<&'static KickRow> {
    let table = match (box_size(kind), dir) {
        (4, RotationDir::Cw) => &I_CW,
        (4, RotationDir::Ccw) => &I_CCW,
        (2 | 3, RotationDir::Cw) => &JLSTZ_CW,
        (2 | 3, RotationDir::Ccw) => &JLSTZ_CCW,
        (size, _) => unreachable!("no kick table for a {}-wide bounding box", size),
    };
    table.get(from.index())
}

/// Spawn origin for a kind: horizontally centered, box top `SPAWN_HEADROOM` rows above the
/// visible top
pub fn spawn_origin(kind: PieceKind) -> (i8, i8) {
    use crate::types::{BOARD_WIDTH, SPAWN_HEADROOM, VISIBLE_HEIGHT};

    let size = box_size(kind);
    let x = (BOARD_WIDTH - size) / 2;
    let y = VISIBLE_HEIGHT + SPAWN_HEADROOM - size;
    (x as i8, y as i8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_shape_has_four_distinct_minos_inside_its_box() {
        for kind in PieceKind::ALL {
            let size = box_size(kind) as i8;
            for r in 0..4 {
                let shape = get_shape(kind, Rotation::from_index(r));
                for (i, &(x, y)) in shape.iter().enumerate() {
                    assert!((0..size).contains(&x) && (0..size).contains(&y));
                    assert!(!shape[..i].contains(&(x, y)), "{:?} duplicates a mino", kind);
                }
            }
        }
    }

    #[test]
    fn t_spawn_points_up() {
        assert_eq!(
            get_shape(PieceKind::T, Rotation::Spawn),
            [(0, 1), (1, 1), (2, 1), (1, 2)]
        );
    }

    #[test]
    fn t_right_points_right() {
        assert_eq!(
            get_shape(PieceKind::T, Rotation::Right),
            [(1, 0), (1, 1), (2, 1), (1, 2)]
        );
    }

    #[test]
    fn i_states_alternate_rows_and_columns() {
        assert_eq!(
            get_shape(PieceKind::I, Rotation::Spawn),
            [(0, 2), (1, 2), (2, 2), (3, 2)]
        );
        assert_eq!(
            get_shape(PieceKind::I, Rotation::Right),
            [(2, 0), (2, 1), (2, 2), (2, 3)]
        );
        assert_eq!(
            get_shape(PieceKind::I, Rotation::Flipped),
            [(0, 1), (1, 1), (2, 1), (3, 1)]
        );
        assert_eq!(
            get_shape(PieceKind::I, Rotation::Left),
            [(1, 0), (1, 1), (1, 2), (1, 3)]
        );
    }

    #[test]
    fn o_is_rotation_invariant() {
        let spawn = get_shape(PieceKind::O, Rotation::Spawn);
        for r in 1..4 {
            assert_eq!(get_shape(PieceKind::O, Rotation::from_index(r)), spawn);
        }
    }

    #[test]
    fn kick_rows_mirror_between_directions() {
        // Rotating 0->R and back R->0 must use negated offsets.
        for kind in [PieceKind::T, PieceKind::I] {
            for from in 0..4 {
                let from = Rotation::from_index(from);
                let to = from.rotated(RotationDir::Cw);
                let there = kick_row(kind, from, RotationDir::Cw).unwrap();
                let back = kick_row(kind, to, RotationDir::Ccw).unwrap();
                for (a, b) in there.iter().zip(back.iter()) {
                    assert_eq!((a.0, a.1), (-b.0, -b.1));
                }
            }
        }
    }

    #[test]
    fn spawn_origins_center_the_box() {
        assert_eq!(spawn_origin(PieceKind::I), (3, 18));
        assert_eq!(spawn_origin(PieceKind::T), (3, 19));
        assert_eq!(spawn_origin(PieceKind::O), (4, 20));
    }
}
