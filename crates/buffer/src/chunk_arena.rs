// Chunk: docs/chunks/chunk_chain - Chunk chain byte buffer with offset addressing

//! Slot storage for the chunks of one buffer.
//!
//! Chunks live in a `Vec` of slots and refer to each other through [`ChunkId`]
//! handles instead of boxed pointers, so relinking is a handle swap and dropping
//! a long chain never recurses. Released slots go on a free list and are reused
//! by the next allocation.

use crate::chunk::Chunk;
use crate::types::ChunkId;

#[derive(Debug)]
enum Slot {
    Occupied(Chunk),
    Vacant { next_free: Option<u32> },
}

#[derive(Debug, Default)]
pub(crate) struct ChunkArena {
    slots: Vec<Slot>,
    free_head: Option<u32>,
    len: usize,
}

impl ChunkArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live chunks.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Stores `chunk` and returns its handle.
    pub fn insert(&mut self, chunk: Chunk) -> ChunkId {
        self.len += 1;
        match self.free_head {
            Some(free) => {
                let slot = &mut self.slots[free as usize];
                if let Slot::Vacant { next_free } = *slot {
                    self.free_head = next_free;
                } else {
                    unreachable!("free list pointed to an occupied slot");
                }
                *slot = Slot::Occupied(chunk);
                ChunkId::new(free)
            }
            None => {
                let slot = u32::try_from(self.slots.len()).unwrap_or_else(|_| {
                    panic!("chunk arena exceeded {} slots", u32::MAX);
                });
                self.slots.push(Slot::Occupied(chunk));
                ChunkId::new(slot)
            }
        }
    }

    /// Takes the chunk out of its slot and puts the slot on the free list.
    pub fn remove(&mut self, id: ChunkId) -> Option<Chunk> {
        let slot = self.slots.get_mut(id.slot())?;
        if matches!(slot, Slot::Vacant { .. }) {
            return None;
        }
        let old = std::mem::replace(
            slot,
            Slot::Vacant {
                next_free: self.free_head,
            },
        );
        self.free_head = Some(id.slot() as u32);
        self.len -= 1;
        match old {
            Slot::Occupied(chunk) => Some(chunk),
            Slot::Vacant { .. } => None,
        }
    }

    pub fn get(&self, id: ChunkId) -> Option<&Chunk> {
        match self.slots.get(id.slot())? {
            Slot::Occupied(chunk) => Some(chunk),
            Slot::Vacant { .. } => None,
        }
    }

    pub fn get_mut(&mut self, id: ChunkId) -> Option<&mut Chunk> {
        match self.slots.get_mut(id.slot())? {
            Slot::Occupied(chunk) => Some(chunk),
            Slot::Vacant { .. } => None,
        }
    }

    /// Drops every chunk and forgets all slots.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
        self.len = 0;
    }
}

impl std::ops::Index<ChunkId> for ChunkArena {
    type Output = Chunk;

    fn index(&self, id: ChunkId) -> &Chunk {
        match self.get(id) {
            Some(chunk) => chunk,
            None => panic!("dangling chunk handle {:?}", id),
        }
    }
}

impl std::ops::IndexMut<ChunkId> for ChunkArena {
    fn index_mut(&mut self, id: ChunkId) -> &mut Chunk {
        match self.get_mut(id) {
            Some(chunk) => chunk,
            None => panic!("dangling chunk handle {:?}", id),
        }
    }
}
