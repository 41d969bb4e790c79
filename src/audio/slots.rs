//! 带代数的定长槽位表
//!
//! 句柄为 `generation << 16 | index`。新表中第一个插入的声音句柄为 0，
//! 之后依次为 1、2……；槽位释放后代数加一，旧句柄随之失效。

use crate::core::{AudioError, AudioResult};

const INDEX_BITS: u32 = 16;
const INDEX_MASK: u32 = (1 << INDEX_BITS) - 1;

/// 最大槽位数
pub const MAX_CAPACITY: usize = 1 << INDEX_BITS;

/// 脚本可见的声音句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundHandle(u32);

impl SoundHandle {
    fn new(index: usize, generation: u16) -> Self {
        Self(((generation as u32) << INDEX_BITS) | index as u32)
    }

    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn index(self) -> usize {
        (self.0 & INDEX_MASK) as usize
    }

    pub fn generation(self) -> u16 {
        (self.0 >> INDEX_BITS) as u16
    }
}

#[derive(Debug)]
struct Slot<T> {
    generation: u16,
    entry: Option<T>,
}

#[derive(Debug)]
pub struct SlotTable<T> {
    slots: Vec<Slot<T>>,
    capacity: usize,
}

impl<T> SlotTable<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.min(MAX_CAPACITY);
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.entry.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 下一次 `insert` 将返回的句柄；表满时返回容量错误
    pub fn next_handle(&self) -> AudioResult<SoundHandle> {
        if let Some((index, slot)) = self
            .slots
            .iter()
            .enumerate()
            .find(|(_, s)| s.entry.is_none())
        {
            return Ok(SoundHandle::new(index, slot.generation));
        }
        if self.slots.len() < self.capacity {
            return Ok(SoundHandle::new(self.slots.len(), 0));
        }
        Err(AudioError::CapacityExhausted {
            capacity: self.capacity,
        })
    }

    pub fn insert(&mut self, value: T) -> AudioResult<SoundHandle> {
        let handle = self.next_handle()?;
        let index = handle.index();
        if index == self.slots.len() {
            self.slots.push(Slot {
                generation: 0,
                entry: Some(value),
            });
        } else {
            self.slots[index].entry = Some(value);
        }
        Ok(handle)
    }

    fn slot(&self, handle: SoundHandle) -> Option<&Slot<T>> {
        self.slots
            .get(handle.index())
            .filter(|s| s.generation == handle.generation())
    }

    pub fn get(&self, handle: SoundHandle) -> Option<&T> {
        self.slot(handle).and_then(|s| s.entry.as_ref())
    }

    pub fn contains(&self, handle: SoundHandle) -> bool {
        self.get(handle).is_some()
    }

    /// 释放槽位并使句柄失效
    pub fn remove(&mut self, handle: SoundHandle) -> Option<T> {
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation != handle.generation() {
            return None;
        }
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        Some(entry)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SoundHandle, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.entry
                .as_ref()
                .map(|entry| (SoundHandle::new(index, slot.generation), entry))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_count_from_zero() {
        let mut table = SlotTable::new(4);
        assert_eq!(table.insert("a").unwrap().raw(), 0);
        assert_eq!(table.insert("b").unwrap().raw(), 1);
        assert_eq!(table.insert("c").unwrap().raw(), 2);
    }

    #[test]
    fn test_full_table_rejects_and_keeps_entries() {
        let mut table = SlotTable::new(2);
        let a = table.insert("a").unwrap();
        let b = table.insert("b").unwrap();
        assert_eq!(
            table.insert("c"),
            Err(AudioError::CapacityExhausted { capacity: 2 })
        );
        assert_eq!(table.get(a), Some(&"a"));
        assert_eq!(table.get(b), Some(&"b"));
    }

    #[test]
    fn test_removed_handle_is_stale() {
        let mut table = SlotTable::new(2);
        let a = table.insert("a").unwrap();
        assert_eq!(table.remove(a), Some("a"));
        assert_eq!(table.get(a), None);
        assert_eq!(table.remove(a), None);

        let reused = table.insert("b").unwrap();
        assert_eq!(reused.index(), a.index());
        assert_eq!(reused.generation(), 1);
        assert_eq!(reused.raw(), 1 << 16);
        assert_eq!(table.get(a), None);
        assert_eq!(table.get(reused), Some(&"b"));
    }

    #[test]
    fn test_iter_reports_live_entries() {
        let mut table = SlotTable::new(3);
        let a = table.insert(1).unwrap();
        let b = table.insert(2).unwrap();
        table.remove(a);
        let live: Vec<_> = table.iter().map(|(h, v)| (h, *v)).collect();
        assert_eq!(live, vec![(b, 2)]);
        assert_eq!(table.len(), 1);
    }
}
