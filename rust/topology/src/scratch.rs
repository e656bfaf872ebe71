// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scoped scratch geometry.
//!
//! Panel processing sometimes needs temporary boundary entities: a face
//! re-synthesised from a subset of its holes, or a transformed copy of a
//! face. These are tracked in a [`Scratch`] and released together, leaving
//! the model as it was found.

use crate::arena::TopologyArena;
use crate::keys::TopologyKey;

/// A record of temporary entities created in an arena.
#[derive(Debug, Default)]
pub struct Scratch {
    keys: Vec<TopologyKey>,
}

impl Scratch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an entity for later release.
    pub fn track(&mut self, key: impl Into<TopologyKey>) {
        self.keys.push(key.into());
    }

    /// Moves every entity tracked by `other` into this scratch.
    pub fn absorb(&mut self, mut other: Scratch) {
        self.keys.append(&mut other.keys);
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl TopologyArena {
    /// Removes every entity tracked by `scratch`, newest first.
    ///
    /// Returns the number of entities actually removed.
    pub fn release(&mut self, scratch: Scratch) -> usize {
        scratch
            .keys
            .into_iter()
            .rev()
            .filter(|&key| self.remove(key))
            .count()
    }

    /// Runs `f` with a fresh scratch scope and releases it afterwards,
    /// whatever `f` returns.
    pub fn with_scratch<T>(&mut self, f: impl FnOnce(&mut Self, &mut Scratch) -> T) -> T {
        let mut scratch = Scratch::new();
        let out = f(self, &mut scratch);
        self.release(scratch);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_removes_tracked_face_only() {
        let mut arena = TopologyArena::new();
        let face = arena
            .add_face_by_coords(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])
            .unwrap();
        let outer = arena.face_outer_loop(face).unwrap();

        let mut scratch = Scratch::new();
        let twin = arena.add_face(outer).unwrap();
        scratch.track(twin);
        assert_eq!(arena.face_count(), 2);

        assert_eq!(arena.release(scratch), 1);
        assert_eq!(arena.face_count(), 1);
        assert!(arena.face(face).is_some());
    }

    #[test]
    fn with_scratch_releases_on_error_path() {
        let mut arena = TopologyArena::new();
        let result: Result<(), &str> = arena.with_scratch(|arena, scratch| {
            let v = arena.add_vertex(0.0, 0.0, 0.0);
            scratch.track(v);
            Err("failed")
        });
        assert!(result.is_err());
        assert_eq!(arena.vertex_count(), 0);
    }

    #[test]
    fn absorb_merges_records() {
        let mut arena = TopologyArena::new();
        let mut a = Scratch::new();
        let mut b = Scratch::new();
        a.track(arena.add_vertex(0.0, 0.0, 0.0));
        b.track(arena.add_vertex(1.0, 0.0, 0.0));
        a.absorb(b);
        assert_eq!(a.len(), 2);
        assert_eq!(arena.release(a), 2);
    }
}
