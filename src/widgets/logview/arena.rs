// logview-tui/src/widgets/logview/arena.rs
//!
//! Index-stable arena backing the ordered render-line list. Links are
//! slot indices rather than owned pointers, which keeps insert/remove at
//! O(1) without reference cycles. Removing a line never moves any other
//! line, so a `LineId` stays valid until that exact line is removed.

/// Stable handle to one render line in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineId(usize);

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<LineId>,
    next: Option<LineId>,
}

#[derive(Debug)]
enum Slot<T> {
    Occupied(Node<T>),
    Vacant { next_free: Option<usize> },
}

#[derive(Debug)]
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Option<usize>,
    head: Option<LineId>,
    tail: Option<LineId>,
    len: usize,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: None,
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn head(&self) -> Option<LineId> {
        self.head
    }

    pub fn tail(&self) -> Option<LineId> {
        self.tail
    }

    pub fn get(&self, id: LineId) -> Option<&T> {
        match self.slots.get(id.0) {
            Some(Slot::Occupied(node)) => Some(&node.value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, id: LineId) -> Option<&mut T> {
        match self.slots.get_mut(id.0) {
            Some(Slot::Occupied(node)) => Some(&mut node.value),
            _ => None,
        }
    }

    pub fn next(&self, id: LineId) -> Option<LineId> {
        match self.slots.get(id.0) {
            Some(Slot::Occupied(node)) => node.next,
            _ => None,
        }
    }

    pub fn prev(&self, id: LineId) -> Option<LineId> {
        match self.slots.get(id.0) {
            Some(Slot::Occupied(node)) => node.prev,
            _ => None,
        }
    }

    fn alloc(&mut self, node: Node<T>) -> LineId {
        match self.free {
            Some(index) => {
                let next_free = match &self.slots[index] {
                    Slot::Vacant { next_free } => *next_free,
                    Slot::Occupied(_) => None,
                };
                self.free = next_free;
                self.slots[index] = Slot::Occupied(node);
                LineId(index)
            }
            None => {
                self.slots.push(Slot::Occupied(node));
                LineId(self.slots.len() - 1)
            }
        }
    }

    fn node_mut(&mut self, id: LineId) -> Option<&mut Node<T>> {
        match self.slots.get_mut(id.0) {
            Some(Slot::Occupied(node)) => Some(node),
            _ => None,
        }
    }

    /// Append a value at the tail of the list.
    pub fn push_back(&mut self, value: T) -> LineId {
        match self.tail {
            Some(tail) => self.insert_after(tail, value),
            None => {
                let id = self.alloc(Node {
                    value,
                    prev: None,
                    next: None,
                });
                self.head = Some(id);
                self.tail = Some(id);
                self.len = 1;
                id
            }
        }
    }

    /// Insert a value immediately after `after`.
    pub fn insert_after(&mut self, after: LineId, value: T) -> LineId {
        let old_next = self.next(after);
        let id = self.alloc(Node {
            value,
            prev: Some(after),
            next: old_next,
        });
        if let Some(node) = self.node_mut(after) {
            node.next = Some(id);
        }
        match old_next {
            Some(next) => {
                if let Some(node) = self.node_mut(next) {
                    node.prev = Some(id);
                }
            }
            None => self.tail = Some(id),
        }
        self.len += 1;
        id
    }

    /// Splice a line out of the list, returning its value. The slot is
    /// recycled for later insertions.
    pub fn remove(&mut self, id: LineId) -> Option<T> {
        let (prev, next) = match self.slots.get(id.0) {
            Some(Slot::Occupied(node)) => (node.prev, node.next),
            _ => return None,
        };
        match prev {
            Some(prev) => {
                if let Some(node) = self.node_mut(prev) {
                    node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(next) => {
                if let Some(node) = self.node_mut(next) {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }
        let slot = std::mem::replace(&mut self.slots[id.0], Slot::Vacant { next_free: self.free });
        self.free = Some(id.0);
        self.len -= 1;
        match slot {
            Slot::Occupied(node) => Some(node.value),
            Slot::Vacant { .. } => None,
        }
    }

    /// Walk the list from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = (LineId, &T)> + '_ {
        std::iter::successors(self.head, move |&id| self.next(id))
            .filter_map(move |id| self.get(id).map(|value| (id, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(arena: &Arena<u32>) -> Vec<u32> {
        arena.iter().map(|(_, v)| *v).collect()
    }

    #[test]
    fn push_back_preserves_order() {
        let mut arena = Arena::new();
        for v in [1, 2, 3] {
            arena.push_back(v);
        }
        assert_eq!(collect(&arena), vec![1, 2, 3]);
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn insert_after_splices_links() {
        let mut arena = Arena::new();
        let a = arena.push_back(1);
        let c = arena.push_back(3);
        let b = arena.insert_after(a, 2);
        assert_eq!(collect(&arena), vec![1, 2, 3]);
        assert_eq!(arena.prev(b), Some(a));
        assert_eq!(arena.next(b), Some(c));
        assert_eq!(arena.prev(c), Some(b));
    }

    #[test]
    fn insert_after_tail_moves_tail() {
        let mut arena = Arena::new();
        let a = arena.push_back(1);
        let b = arena.insert_after(a, 2);
        assert_eq!(arena.tail(), Some(b));
    }

    #[test]
    fn remove_middle_relinks() {
        let mut arena = Arena::new();
        let a = arena.push_back(1);
        let b = arena.push_back(2);
        let c = arena.push_back(3);
        assert_eq!(arena.remove(b), Some(2));
        assert_eq!(collect(&arena), vec![1, 3]);
        assert_eq!(arena.next(a), Some(c));
        assert_eq!(arena.prev(c), Some(a));
        assert!(arena.get(b).is_none());
    }

    #[test]
    fn remove_head_and_tail() {
        let mut arena = Arena::new();
        let a = arena.push_back(1);
        let b = arena.push_back(2);
        arena.remove(a);
        assert_eq!(arena.head(), Some(b));
        arena.remove(b);
        assert!(arena.is_empty());
        assert_eq!(arena.head(), None);
        assert_eq!(arena.tail(), None);
    }

    #[test]
    fn freed_slots_are_recycled() {
        let mut arena = Arena::new();
        let a = arena.push_back(1);
        arena.push_back(2);
        arena.remove(a);
        let c = arena.push_back(3);
        // slot of `a` is reused, ids of live lines are untouched
        assert_eq!(c, a);
        assert_eq!(collect(&arena), vec![2, 3]);
    }
}
