use crate::error::PartitionError;
use crate::model::PieceId;

pub type GroupId = usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MergeResult {
    pub survivor: GroupId,
    pub absorbed: GroupId,
}

impl MergeResult {
    /// Maps a group id held before the merge to the id that now owns its pieces.
    pub fn repoint(&self, group: GroupId) -> GroupId {
        if group == self.absorbed {
            self.survivor
        } else {
            group
        }
    }
}

/// Partition of piece ids into rigid groups, plus the bottom-to-top draw order of those groups.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupTracker {
    group_of: Vec<GroupId>,
    groups: Vec<Option<Vec<PieceId>>>,
    order: Vec<GroupId>,
}

impl GroupTracker {
    /// Every piece in its own group; group ids match piece ids.
    pub fn new(total: usize) -> Self {
        Self {
            group_of: (0..total).collect(),
            groups: (0..total).map(|id| Some(vec![id])).collect(),
            order: (0..total).collect(),
        }
    }

    /// Rebuilds a tracker from member lists given bottom to top.
    pub fn from_lists(lists: &[Vec<PieceId>], total: usize) -> Result<Self, PartitionError> {
        let mut group_of = vec![usize::MAX; total];
        let mut groups = Vec::with_capacity(lists.len());
        for (group, members) in lists.iter().enumerate() {
            if members.is_empty() {
                return Err(PartitionError::EmptyGroup(group));
            }
            for &piece in members {
                let Some(slot) = group_of.get_mut(piece) else {
                    return Err(PartitionError::UnknownPiece { piece, total });
                };
                if *slot != usize::MAX {
                    return Err(PartitionError::DuplicatePiece(piece));
                }
                *slot = group;
            }
            groups.push(Some(members.clone()));
        }
        if let Some(missing) = group_of.iter().position(|group| *group == usize::MAX) {
            return Err(PartitionError::MissingPiece(missing));
        }
        let order = (0..groups.len()).collect();
        Ok(Self {
            group_of,
            groups,
            order,
        })
    }

    pub fn piece_count(&self) -> usize {
        self.group_of.len()
    }

    pub fn group_count(&self) -> usize {
        self.order.len()
    }

    pub fn group_of(&self, piece: PieceId) -> GroupId {
        let group = self.group_of[piece];
        debug_assert!(
            self.members(group).contains(&piece),
            "piece {piece} missing from group {group}"
        );
        group
    }

    pub fn members(&self, group: GroupId) -> &[PieceId] {
        self.groups
            .get(group)
            .and_then(|members| members.as_deref())
            .unwrap_or(&[])
    }

    pub fn members_of_piece(&self, piece: PieceId) -> &[PieceId] {
        self.members(self.group_of(piece))
    }

    pub fn same_group(&self, a: PieceId, b: PieceId) -> bool {
        self.group_of[a] == self.group_of[b]
    }

    /// Group ids, bottom to top.
    pub fn order(&self) -> &[GroupId] {
        &self.order
    }

    /// Member lists in draw order, the shape stored in save files.
    pub fn to_lists(&self) -> Vec<Vec<PieceId>> {
        self.order
            .iter()
            .map(|group| self.members(*group).to_vec())
            .collect()
    }

    /// Joins the groups of `a` and `b`. The group of `a` survives with its members listed
    /// first and keeps its place in the draw order. Returns `None` when they already share a
    /// group.
    pub fn merge(&mut self, a: PieceId, b: PieceId) -> Option<MergeResult> {
        let survivor = self.group_of[a];
        let absorbed = self.group_of[b];
        if survivor == absorbed {
            return None;
        }
        let moved = self.groups[absorbed].take().unwrap_or_default();
        for &piece in &moved {
            self.group_of[piece] = survivor;
        }
        if let Some(members) = self.groups[survivor].as_mut() {
            members.extend(moved);
        }
        self.order.retain(|group| *group != absorbed);
        debug_assert!(self.check_partition().is_ok());
        Some(MergeResult { survivor, absorbed })
    }

    pub fn raise(&mut self, group: GroupId) {
        if let Some(pos) = self.order.iter().position(|g| *g == group) {
            let id = self.order.remove(pos);
            self.order.push(id);
        }
    }

    pub fn lower(&mut self, group: GroupId) {
        if let Some(pos) = self.order.iter().position(|g| *g == group) {
            let id = self.order.remove(pos);
            self.order.insert(0, id);
        }
    }

    pub fn check_partition(&self) -> Result<(), PartitionError> {
        let total = self.group_of.len();
        let mut seen = vec![false; total];
        for &group in &self.order {
            let members = self.members(group);
            if members.is_empty() {
                return Err(PartitionError::EmptyGroup(group));
            }
            for &piece in members {
                if piece >= total {
                    return Err(PartitionError::UnknownPiece { piece, total });
                }
                if seen[piece] {
                    return Err(PartitionError::DuplicatePiece(piece));
                }
                seen[piece] = true;
                if self.group_of[piece] != group {
                    return Err(PartitionError::DanglingPiece(piece));
                }
            }
        }
        match seen.iter().position(|seen| !seen) {
            Some(missing) => Err(PartitionError::MissingPiece(missing)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_singletons() {
        let tracker = GroupTracker::new(4);
        assert_eq!(tracker.group_count(), 4);
        assert_eq!(tracker.members(2), &[2]);
        assert_eq!(tracker.order(), &[0, 1, 2, 3]);
        assert!(tracker.check_partition().is_ok());
    }

    #[test]
    fn merge_keeps_first_group_and_order_slot() {
        let mut tracker = GroupTracker::new(4);
        let result = tracker.merge(2, 0).expect("merge");
        assert_eq!(result, MergeResult { survivor: 2, absorbed: 0 });
        assert_eq!(tracker.members(2), &[2, 0]);
        assert_eq!(tracker.order(), &[1, 2, 3]);
        assert_eq!(tracker.group_of(0), 2);
        assert_eq!(result.repoint(0), 2);
        assert_eq!(result.repoint(3), 3);
    }

    #[test]
    fn merging_within_a_group_is_a_no_op() {
        let mut tracker = GroupTracker::new(3);
        tracker.merge(0, 1).expect("merge");
        let before = tracker.clone();
        assert!(tracker.merge(1, 0).is_none());
        assert_eq!(tracker, before);
    }

    #[test]
    fn group_count_only_goes_down() {
        let mut tracker = GroupTracker::new(6);
        let pairs = [(0, 1), (2, 3), (1, 0), (4, 5), (0, 3), (5, 2)];
        let mut last = tracker.group_count();
        for (a, b) in pairs {
            let merged = tracker.merge(a, b).is_some();
            let count = tracker.group_count();
            assert!(count <= last);
            assert_eq!(merged, count < last);
            last = count;
            assert!(tracker.check_partition().is_ok());
        }
        assert_eq!(tracker.group_count(), 1);
        assert_eq!(tracker.members_of_piece(4).len(), 6);
    }

    #[test]
    fn raise_and_lower_move_groups_in_order() {
        let mut tracker = GroupTracker::new(3);
        tracker.raise(0);
        assert_eq!(tracker.order(), &[1, 2, 0]);
        tracker.lower(2);
        assert_eq!(tracker.order(), &[2, 1, 0]);
    }

    #[test]
    fn from_lists_round_trips_draw_order() {
        let mut tracker = GroupTracker::new(5);
        tracker.merge(3, 4);
        tracker.raise(0);
        let lists = tracker.to_lists();
        let restored = GroupTracker::from_lists(&lists, 5).expect("restore");
        assert_eq!(restored.to_lists(), lists);
        assert_eq!(restored.group_count(), 4);
        assert!(restored.same_group(3, 4));
    }

    #[test]
    fn from_lists_rejects_broken_partitions() {
        assert_eq!(
            GroupTracker::from_lists(&[vec![0, 1], vec![1, 2]], 3),
            Err(PartitionError::DuplicatePiece(1))
        );
        assert_eq!(
            GroupTracker::from_lists(&[vec![0], vec![2]], 3),
            Err(PartitionError::MissingPiece(1))
        );
        assert_eq!(
            GroupTracker::from_lists(&[vec![0, 7]], 2),
            Err(PartitionError::UnknownPiece { piece: 7, total: 2 })
        );
        assert_eq!(
            GroupTracker::from_lists(&[vec![0, 1], vec![]], 2),
            Err(PartitionError::EmptyGroup(1))
        );
    }
}
