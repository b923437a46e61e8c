use serde::{Deserialize, Serialize};

use crate::core::{Board, Color, Piece, Pos};

/// Axis along which a group is considered aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Row,
    Col,
}

/// A run of same-colored ordinary pieces, or several runs merged because
/// they share cells.
///
/// Members are kept in discovery order without duplicates. The order matters:
/// [`orientation`](Self::orientation) only compares the first two members.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchGroup {
    members: Vec<Pos>,
}

impl MatchGroup {
    #[must_use]
    pub fn new<I>(members: I) -> Self
    where
        I: IntoIterator<Item = Pos>,
    {
        let mut group = Self::default();
        group.extend(members);
        group
    }

    fn extend<I>(&mut self, members: I)
    where
        I: IntoIterator<Item = Pos>,
    {
        for pos in members {
            if !self.members.contains(&pos) {
                self.members.push(pos);
            }
        }
    }

    #[must_use]
    pub fn members(&self) -> &[Pos] {
        &self.members
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[must_use]
    pub fn contains(&self, pos: Pos) -> bool {
        self.members.contains(&pos)
    }

    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.members.iter().any(|pos| other.contains(*pos))
    }

    /// Row if the first two members share a row, column otherwise.
    ///
    /// This is a coarse heuristic rather than a colinearity check: an
    /// irregular group is classified by its first two members alone.
    #[must_use]
    pub fn orientation(&self) -> Option<Orientation> {
        match self.members.as_slice() {
            [first, second, ..] if first.row() == second.row() => Some(Orientation::Row),
            [_, _, ..] => Some(Orientation::Col),
            _ => None,
        }
    }
}

fn color_at(board: &Board, pos: Pos) -> Option<Color> {
    board.get(pos).and_then(Piece::color)
}

fn step(pos: Pos, d_row: isize, d_col: isize) -> Option<Pos> {
    let row = pos.row().checked_add_signed(d_row)?;
    let col = pos.col().checked_add_signed(d_col)?;
    Some(Pos::new(row, col))
}

/// Collects the cells after `pos` in direction `(d_row, d_col)` that share
/// `color`, stopping at the first mismatch, gap, special or edge.
fn walk(board: &Board, pos: Pos, color: Color, d_row: isize, d_col: isize) -> Vec<Pos> {
    let mut cells = Vec::new();
    let mut current = pos;
    while let Some(next) = step(current, d_row, d_col) {
        if color_at(board, next) != Some(color) {
            break;
        }
        cells.push(next);
        current = next;
    }
    cells
}

/// Scans the whole board for maximal runs of three or more, without merging.
///
/// Every ordinary piece that starts a run scans in the +row and +col
/// directions only, so each run is reported exactly once, head first.
#[must_use]
pub fn scan_runs(board: &Board) -> Vec<MatchGroup> {
    let mut runs = Vec::new();
    for pos in board.positions() {
        let Some(color) = color_at(board, pos) else {
            continue;
        };
        for (d_row, d_col) in [(1, 0), (0, 1)] {
            let continues_run =
                step(pos, -d_row, -d_col).is_some_and(|prev| color_at(board, prev) == Some(color));
            if continues_run {
                continue;
            }
            let tail = walk(board, pos, color, d_row, d_col);
            if tail.len() >= 2 {
                runs.push(MatchGroup::new(std::iter::once(pos).chain(tail)));
            }
        }
    }
    runs
}

/// Unions groups that share at least one cell, transitively.
///
/// The result is the set of connected components over shared members; no
/// two returned groups overlap.
#[must_use]
pub fn merge_overlapping(groups: Vec<MatchGroup>) -> Vec<MatchGroup> {
    let mut merged: Vec<MatchGroup> = Vec::with_capacity(groups.len());
    for group in groups {
        // Groups already in `merged` are pairwise disjoint, so one pass is
        // enough to collect every component the new group touches.
        let (touching, rest): (Vec<_>, Vec<_>) =
            merged.into_iter().partition(|m| m.overlaps(&group));
        merged = rest;
        let mut component = MatchGroup::default();
        for m in touching {
            component.extend(m.members);
        }
        component.extend(group.members);
        merged.push(component);
    }
    merged
}

/// Finds every match group on the board, with overlapping runs merged.
///
/// Returns an empty list for a stable board.
#[must_use]
pub fn find_runs(board: &Board) -> Vec<MatchGroup> {
    merge_overlapping(scan_runs(board))
}

/// Finds the runs passing through a single cell, as evaluated right after a
/// swap.
///
/// The cell comes first, followed by its vertical run (cells below, then
/// above) and its horizontal run (cells to the right, then left); each axis
/// contributes only if it holds three or more pieces including the cell.
/// Specials and empty cells never match. The result is not merged with any
/// other group on the board.
#[must_use]
pub fn find_matches_at(board: &Board, pos: Pos) -> MatchGroup {
    let Some(color) = color_at(board, pos) else {
        return MatchGroup::default();
    };
    let mut group = MatchGroup::default();
    for (d_row, d_col) in [(1, 0), (0, 1)] {
        let forward = walk(board, pos, color, d_row, d_col);
        let backward = walk(board, pos, color, -d_row, -d_col);
        if forward.len() + backward.len() >= 2 {
            group.extend(std::iter::once(pos).chain(forward).chain(backward));
        }
    }
    group
}

/// Returns `true` if no run of three or more ordinary pieces exists.
#[must_use]
pub fn is_stable(board: &Board) -> bool {
    scan_runs(board).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(text: &str) -> Board {
        text.parse().unwrap()
    }

    fn cells(list: &[(usize, usize)]) -> Vec<Pos> {
        list.iter().map(|&(r, c)| Pos::new(r, c)).collect()
    }

    #[test]
    fn test_horizontal_and_vertical_runs() {
        let b = board(
            "
            11123
            20343
            21043
            ",
        );
        let runs = scan_runs(&b);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].members(), cells(&[(0, 0), (0, 1), (0, 2)]).as_slice());
        assert_eq!(runs[1].members(), cells(&[(0, 4), (1, 4), (2, 4)]).as_slice());
        assert_eq!(runs[0].orientation(), Some(Orientation::Row));
        assert_eq!(runs[1].orientation(), Some(Orientation::Col));
    }

    #[test]
    fn test_run_of_four_reported_once() {
        let b = board("22220\n01010");
        let runs = find_runs(&b);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].len(), 4);
    }

    #[test]
    fn test_specials_and_gaps_break_runs() {
        assert!(find_runs(&board("11*11\n23232")).is_empty());
        assert!(find_runs(&board("11.11\n23232")).is_empty());
        // Specials never match each other by "color" either.
        assert!(find_runs(&board("***\n+++\n---")).is_empty());
    }

    #[test]
    fn test_l_shape_merged_into_one_group() {
        let l = board(
            "
            1002
            1023
            1112
            ",
        );
        let runs = find_runs(&l);
        assert_eq!(runs.len(), 1);
        let group = &runs[0];
        assert_eq!(group.len(), 5);
        for pos in cells(&[(0, 0), (1, 0), (2, 0), (2, 1), (2, 2)]) {
            assert!(group.contains(pos));
        }
    }

    #[test]
    fn test_disjoint_groups_stay_separate() {
        let b = board(
            "
            111.222
            0101010
            ",
        );
        let runs = find_runs(&b);
        assert_eq!(runs.len(), 2);
        assert!(!runs[0].overlaps(&runs[1]));
    }

    #[test]
    fn test_merge_is_transitive() {
        let a = MatchGroup::new(cells(&[(0, 0), (0, 1)]));
        let b = MatchGroup::new(cells(&[(5, 5), (5, 6)]));
        let bridge = MatchGroup::new(cells(&[(0, 1), (5, 5)]));
        let merged = merge_overlapping(vec![a, b, bridge]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].len(), 4);
    }

    #[test]
    fn test_find_runs_idempotent_on_stable_board() {
        let b = board(
            "
            01201
            12012
            20120
            ",
        );
        assert!(find_runs(&b).is_empty());
        assert!(find_runs(&b).is_empty());
        assert!(is_stable(&b));
    }

    #[test]
    fn test_matches_at_order() {
        // (1,1) is part of a vertical run (rows 0..=3) and a horizontal run.
        let b = board(
            "
            2123
            1111
            0102
            2120
            ",
        );
        let vertical_only = find_matches_at(&b, Pos::new(0, 1));
        assert_eq!(
            vertical_only.members(),
            cells(&[(0, 1), (1, 1), (2, 1), (3, 1)]).as_slice()
        );
        assert_eq!(vertical_only.orientation(), Some(Orientation::Col));

        let both = find_matches_at(&b, Pos::new(1, 1));
        assert_eq!(
            both.members(),
            cells(&[(1, 1), (2, 1), (3, 1), (0, 1), (1, 2), (1, 3), (1, 0)]).as_slice()
        );
    }

    #[test]
    fn test_matches_at_needs_three() {
        let b = board("1102\n2010");
        assert!(find_matches_at(&b, Pos::new(0, 0)).is_empty());
        assert!(find_matches_at(&b, Pos::new(9, 9)).is_empty());
    }

    #[test]
    fn test_matches_at_special_is_empty() {
        let b = board("1*11\n0000");
        assert!(find_matches_at(&b, Pos::new(0, 1)).is_empty());
        assert_eq!(find_matches_at(&b, Pos::new(1, 1)).len(), 4);
    }
}
