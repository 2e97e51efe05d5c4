//! Ordered entity pool.
//!
//! Events, bullets and birds live in [`Chain`]s: slot storage with a free
//! list for O(1) reuse, threaded by a doubly linked list that fixes the
//! front-to-back processing order. Removing an entity only relinks its
//! neighbours; every other entity keeps its slot and its [`SlotId`].

/// Handle to an entity in a [`Chain`]. Stale handles never alias a newer
/// occupant of the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone)]
struct Slot<T> {
    item: Option<T>,
    generation: u32,
    prev: Option<u32>,
    next: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct Chain<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<u32>,
    head: Option<u32>,
    tail: Option<u32>,
    len: usize,
}

impl<T> Default for Chain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Chain<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
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

    fn allocate(&mut self, item: T) -> u32 {
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.item = Some(item);
            slot.generation = slot.generation.wrapping_add(1);
            index
        } else {
            self.slots.push(Slot {
                item: Some(item),
                generation: 0,
                prev: None,
                next: None,
            });
            (self.slots.len() - 1) as u32
        }
    }

    fn id(&self, index: u32) -> SlotId {
        SlotId {
            index,
            generation: self.slots[index as usize].generation,
        }
    }

    /// Add an entity at the front, to be processed first.
    pub fn push_front(&mut self, item: T) -> SlotId {
        let index = self.allocate(item);
        let slot = &mut self.slots[index as usize];
        slot.prev = None;
        slot.next = self.head;
        match self.head {
            Some(head) => self.slots[head as usize].prev = Some(index),
            None => self.tail = Some(index),
        }
        self.head = Some(index);
        self.len += 1;
        self.id(index)
    }

    /// Add an entity at the back, to be processed last.
    pub fn push_back(&mut self, item: T) -> SlotId {
        let index = self.allocate(item);
        let slot = &mut self.slots[index as usize];
        slot.next = None;
        slot.prev = self.tail;
        match self.tail {
            Some(tail) => self.slots[tail as usize].next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.len += 1;
        self.id(index)
    }

    fn live(&self, id: SlotId) -> Option<&Slot<T>> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation && slot.item.is_some())
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.live(id).is_some()
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.live(id).and_then(|slot| slot.item.as_ref())
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.live(id)?;
        self.slots[id.index as usize].item.as_mut()
    }

    /// Unlink and return the entity, releasing its slot.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        self.live(id)?;
        self.unlink(id.index)
    }

    fn unlink(&mut self, index: u32) -> Option<T> {
        let slot = &mut self.slots[index as usize];
        let (prev, next) = (slot.prev.take(), slot.next.take());
        let item = slot.item.take();
        match prev {
            Some(prev) => self.slots[prev as usize].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.slots[next as usize].prev = prev,
            None => self.tail = prev,
        }
        self.free_list.push(index);
        self.len -= 1;
        item
    }

    pub fn front(&self) -> Option<&T> {
        self.head.and_then(|head| self.slots[head as usize].item.as_ref())
    }

    pub fn back(&self) -> Option<&T> {
        self.tail.and_then(|tail| self.slots[tail as usize].item.as_ref())
    }

    /// Handles in processing order.
    pub fn ids(&self) -> Vec<SlotId> {
        let mut ids = Vec::with_capacity(self.len);
        let mut cursor = self.head;
        while let Some(index) = cursor {
            ids.push(self.id(index));
            cursor = self.slots[index as usize].next;
        }
        ids
    }

    /// Entities in processing order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            chain: self,
            cursor: self.head,
        }
    }

    /// Visit entities front to back, unlinking those for which `keep`
    /// returns false.
    pub fn retain_mut(&mut self, mut keep: impl FnMut(&mut T) -> bool) {
        let mut cursor = self.head;
        while let Some(index) = cursor {
            cursor = self.slots[index as usize].next;
            let retained = match self.slots[index as usize].item.as_mut() {
                Some(item) => keep(item),
                None => true,
            };
            if !retained {
                self.unlink(index);
            }
        }
    }

    /// Visit entities front to back with mutable access.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut T)) {
        self.retain_mut(|item| {
            f(item);
            true
        });
    }

    /// Visit entities front to back until `f` returns `Some`.
    pub fn find_map_mut<R>(&mut self, mut f: impl FnMut(&mut T) -> Option<R>) -> Option<R> {
        let mut cursor = self.head;
        while let Some(index) = cursor {
            let slot = &mut self.slots[index as usize];
            cursor = slot.next;
            if let Some(found) = slot.item.as_mut().and_then(&mut f) {
                return Some(found);
            }
        }
        None
    }

    /// Keep the first `len` entities, dropping the rest.
    pub fn truncate(&mut self, len: usize) {
        while self.len > len {
            match self.tail {
                Some(tail) => {
                    self.unlink(tail);
                }
                None => break,
            }
        }
    }

    pub fn clear(&mut self) {
        self.truncate(0);
    }
}

pub struct Iter<'a, T> {
    chain: &'a Chain<T>,
    cursor: Option<u32>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.cursor?;
        let slot = &self.chain.slots[index as usize];
        self.cursor = slot.next;
        slot.item.as_ref()
    }
}

impl<'a, T> IntoIterator for &'a Chain<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(chain: &Chain<u32>) -> Vec<u32> {
        chain.iter().copied().collect()
    }

    #[test]
    fn push_front_and_back_order() {
        let mut chain = Chain::new();
        chain.push_back(2);
        chain.push_front(1);
        chain.push_back(3);
        assert_eq!(collect(&chain), vec![1, 2, 3]);
        assert_eq!(chain.front(), Some(&1));
        assert_eq!(chain.back(), Some(&3));
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn remove_relinks_neighbours() {
        let mut chain = Chain::new();
        let a = chain.push_back(1);
        let b = chain.push_back(2);
        let c = chain.push_back(3);

        assert_eq!(chain.remove(b), Some(2));
        assert_eq!(collect(&chain), vec![1, 3]);
        assert_eq!(chain.remove(a), Some(1));
        assert_eq!(collect(&chain), vec![3]);
        assert_eq!(chain.remove(c), Some(3));
        assert!(chain.is_empty());
        assert!(chain.front().is_none());
    }

    #[test]
    fn stale_ids_do_not_alias() {
        let mut chain = Chain::new();
        let old = chain.push_back(1);
        chain.remove(old);
        let new = chain.push_back(2);

        assert_ne!(old, new);
        assert!(chain.get(old).is_none());
        assert!(chain.remove(old).is_none());
        assert_eq!(chain.get(new), Some(&2));
    }

    #[test]
    fn retain_mut_removes_in_place() {
        let mut chain = Chain::new();
        for value in 1..=6 {
            chain.push_back(value);
        }
        chain.retain_mut(|value| {
            *value *= 10;
            *value % 20 != 0
        });
        assert_eq!(collect(&chain), vec![10, 30, 50]);

        let reused = chain.push_back(70);
        assert_eq!(chain.get(reused), Some(&70));
        assert_eq!(collect(&chain), vec![10, 30, 50, 70]);
    }

    #[test]
    fn truncate_drops_the_tail() {
        let mut chain = Chain::new();
        for value in 0..5 {
            chain.push_back(value);
        }
        chain.truncate(2);
        assert_eq!(collect(&chain), vec![0, 1]);
        chain.truncate(4);
        assert_eq!(chain.len(), 2);
        chain.clear();
        assert!(chain.is_empty());
    }

    #[test]
    fn find_map_mut_stops_at_first_match() {
        let mut chain = Chain::new();
        for value in [3, 8, 5, 12] {
            chain.push_back(value);
        }
        let mut visited = 0;
        let found = chain.find_map_mut(|value| {
            visited += 1;
            if *value > 6 {
                *value = 0;
                Some(visited)
            } else {
                None
            }
        });
        assert_eq!(found, Some(2));
        assert_eq!(collect(&chain), vec![3, 0, 5, 12]);

        chain.for_each_mut(|value| *value += 1);
        assert_eq!(collect(&chain), vec![4, 1, 6, 13]);
    }

    #[test]
    fn ids_follow_processing_order() {
        let mut chain = Chain::new();
        let b = chain.push_back('b');
        let a = chain.push_front('a');
        assert_eq!(chain.ids(), vec![a, b]);
        if let Some(item) = chain.get_mut(b) {
            *item = 'c';
        }
        assert_eq!(chain.iter().collect::<String>(), "ac");
    }
}
