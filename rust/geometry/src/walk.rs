// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Loop walking over raw edge endpoints.

/// Walks a closed loop given as `(start, end)` edge endpoints in stored order.
///
/// The direction of the first edge is decided by which of its endpoints the
/// second edge shares; every later edge is flipped as needed so that it
/// starts where the previous one stopped. Returns the vertex sequence (one
/// start vertex per edge), or `None` when consecutive edges do not connect
/// or the chain does not close.
pub fn walk_loop<K: Copy + PartialEq>(edges: &[(K, K)]) -> Option<Vec<K>> {
    if edges.len() < 2 {
        return None;
    }

    let mut vertices = Vec::with_capacity(edges.len());

    let (mut start, mut stop) = edges[0];
    let (next_start, next_stop) = edges[1];
    if start == next_start || start == next_stop {
        std::mem::swap(&mut start, &mut stop);
    } else if !(stop == next_start || stop == next_stop) {
        return None;
    }
    let first = start;
    vertices.push(start);
    let mut prev = stop;

    for &(s, e) in &edges[1..] {
        let (start, stop) = if e == prev {
            (e, s)
        } else if s == prev {
            (s, e)
        } else {
            return None;
        };
        vertices.push(start);
        prev = stop;
    }

    if prev != first {
        return None;
    }
    Some(vertices)
}
