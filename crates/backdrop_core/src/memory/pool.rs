//! # Node Pool
//!
//! Slot storage with generational handles for objects that are frequently
//! inserted and removed.

/// Handle to a value stored in a [`NodePool`].
///
/// A handle stays valid until its value is removed. After that the slot may
/// be reused, but the old handle no longer resolves because the slot's
/// generation has moved on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    /// Index into the pool.
    index: u32,
    /// Generation of the slot when the handle was issued.
    generation: u32,
}

impl NodeId {
    /// Returns the slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// A pool of values addressed by [`NodeId`].
///
/// Insertion and removal are **O(1)** and reuse freed slots. Capacity
/// reserved up front is never released, so a warmed-up pool performs no
/// heap allocation while its population stays within that capacity.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. Each owner mutates its pool from its own tick.
///
/// # Example
///
/// ```rust
/// use backdrop_core::NodePool;
///
/// let mut pool: NodePool<&str> = NodePool::with_capacity(4);
/// let id = pool.insert("firefly");
/// assert_eq!(pool.get(id), Some(&"firefly"));
///
/// pool.remove(id);
/// assert!(pool.get(id).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct NodePool<T> {
    /// The storage array.
    slots: Vec<Slot<T>>,
    /// Free list - indices of vacant slots.
    free_list: Vec<u32>,
    /// Number of occupied slots.
    len: usize,
}

impl<T> NodePool<T> {
    /// Creates an empty pool.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Creates an empty pool with room for `capacity` values.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::with_capacity(capacity),
            len: 0,
        }
    }

    /// Returns the number of stored values.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true when nothing is stored.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stores a value and returns its handle.
    ///
    /// Vacant slots are reused before the storage grows.
    ///
    /// # Panics
    ///
    /// Panics if the pool would exceed `u32::MAX` slots.
    pub fn insert(&mut self, value: T) -> NodeId {
        self.len += 1;

        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }

        let index = u32::try_from(self.slots.len()).expect("node pool exceeded u32::MAX slots");
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    /// Removes a value, returning it.
    ///
    /// Returns `None` if the handle is stale or was never issued by this pool.
    pub fn remove(&mut self, id: NodeId) -> Option<T> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }

        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(id.index);
        self.len -= 1;

        Some(value)
    }

    /// Returns true if the handle resolves to a stored value.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Gets a reference to a stored value.
    #[inline]
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&T> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation == id.generation {
            slot.value.as_ref()
        } else {
            None
        }
    }

    /// Gets a mutable reference to a stored value.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation == id.generation {
            slot.value.as_mut()
        } else {
            None
        }
    }

    /// Removes every value. Outstanding handles become stale.
    ///
    /// Slot memory is kept for reuse.
    pub fn clear(&mut self) {
        self.free_list.clear();
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            if slot.value.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            // Slot count is bounded by `insert`, so the index always fits.
            #[allow(clippy::cast_possible_truncation)]
            self.free_list.push(index as u32);
        }
        self.len = 0;
    }

    /// Iterates over stored values in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            #[allow(clippy::cast_possible_truncation)]
            let id = NodeId {
                index: index as u32,
                generation: slot.generation,
            };
            slot.value.as_ref().map(|v| (id, v))
        })
    }

    /// Iterates mutably over stored values in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (NodeId, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            #[allow(clippy::cast_possible_truncation)]
            let id = NodeId {
                index: index as u32,
                generation: slot.generation,
            };
            slot.value.as_mut().map(|v| (id, v))
        })
    }
}

impl<T> Default for NodePool<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_remove() {
        let mut pool: NodePool<u32> = NodePool::with_capacity(10);

        let h1 = pool.insert(42);
        assert_eq!(*pool.get(h1).unwrap(), 42);
        assert_eq!(pool.len(), 1);

        let removed = pool.remove(h1).unwrap();
        assert_eq!(removed, 42);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_slot_reuse_rejects_stale_handle() {
        let mut pool: NodePool<u32> = NodePool::new();

        let h1 = pool.insert(1);
        pool.remove(h1);

        let h2 = pool.insert(2);
        assert_eq!(h1.index(), h2.index()); // Same slot reused
        assert!(pool.get(h1).is_none());
        assert!(pool.remove(h1).is_none());
        assert_eq!(*pool.get(h2).unwrap(), 2);
    }

    #[test]
    fn test_clear_invalidates_everything() {
        let mut pool: NodePool<&str> = NodePool::new();
        let a = pool.insert("a");
        let b = pool.insert("b");

        pool.clear();
        assert!(pool.is_empty());
        assert!(!pool.contains(a));
        assert!(!pool.contains(b));

        // Cleared slots are handed out again, lowest index first.
        let c = pool.insert("c");
        assert_eq!(c.index(), 0);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_iter_skips_vacant_slots() {
        let mut pool: NodePool<u32> = NodePool::new();
        let a = pool.insert(1);
        let _b = pool.insert(2);
        let _c = pool.insert(3);
        pool.remove(a);

        let values: Vec<u32> = pool.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![2, 3]);

        for (_, v) in pool.iter_mut() {
            *v *= 10;
        }
        let values: Vec<u32> = pool.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![20, 30]);
    }
}
