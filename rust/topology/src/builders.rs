// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! High-level builders for faces and extruded solids with shared edges.
//!
//! Faces built from vertex keys reuse any edge that already joins two of
//! their vertices, so adjacent faces of a solid share edge entities. This is
//! the connectivity panel matching depends on: the top and bottom faces of
//! a sheet are linked through the depth edges of its side faces.

use crate::arena::TopologyArena;
use crate::error::{Error, Result};
use crate::keys::*;

impl TopologyArena {
    /// Creates a closed loop through the given vertices, reusing existing
    /// edges between consecutive vertices.
    pub fn add_loop_by_vertices(&mut self, vertices: &[VertexKey]) -> Result<LoopKey> {
        if vertices.len() < 2 {
            return Err(Error::EmptyLoop);
        }

        let mut edges = Vec::with_capacity(vertices.len());
        for i in 0..vertices.len() {
            let start = vertices[i];
            let end = vertices[(i + 1) % vertices.len()];
            if start == end {
                continue;
            }
            edges.push(self.find_or_add_edge(start, end)?);
        }

        if edges.is_empty() {
            return Err(Error::EmptyLoop);
        }

        self.add_loop(&edges)
    }

    /// Creates a face from an ordered list of vertex keys.
    pub fn add_face_by_vertices(&mut self, vertices: &[VertexKey]) -> Result<FaceKey> {
        self.add_face_by_vertices_with_holes(vertices, &[])
    }

    /// Creates a face with holes from ordered vertex key lists.
    pub fn add_face_by_vertices_with_holes(
        &mut self,
        outer: &[VertexKey],
        holes: &[Vec<VertexKey>],
    ) -> Result<FaceKey> {
        if outer.len() < 3 {
            return Err(Error::DegenerateFace);
        }

        let outer_loop = self.add_loop_by_vertices(outer)?;
        let mut inner_loops = Vec::with_capacity(holes.len());
        for hole in holes {
            inner_loops.push(self.add_loop_by_vertices(hole)?);
        }
        self.add_face_with_holes(outer_loop, &inner_loops)
    }

    /// Creates a face from coordinate triples, creating vertices as needed.
    pub fn add_face_by_coords(&mut self, coords: &[[f64; 3]]) -> Result<FaceKey> {
        if coords.len() < 3 {
            return Err(Error::DegenerateFace);
        }

        let vertices: Vec<VertexKey> = coords
            .iter()
            .map(|c| self.add_vertex(c[0], c[1], c[2]))
            .collect();

        self.add_face_by_vertices(&vertices)
    }

    /// Extrudes a planar profile in the XY plane along +Z.
    ///
    /// `outer` and each entry of `holes` are closed polygons (last point not
    /// repeated). Returns every face of the solid: bottom first, then top,
    /// then the side faces of the outer boundary and of each hole. All faces
    /// share edges, so the bottom and top faces are connected by the
    /// vertical depth edges.
    pub fn make_prism(
        &mut self,
        outer: &[[f64; 2]],
        holes: &[Vec<[f64; 2]>],
        z: f64,
        depth: f64,
    ) -> Result<Vec<FaceKey>> {
        if outer.len() < 3 {
            return Err(Error::DegenerateFace);
        }

        let layer = |arena: &mut TopologyArena, pts: &[[f64; 2]], z: f64| -> Vec<VertexKey> {
            pts.iter().map(|p| arena.add_vertex(p[0], p[1], z)).collect()
        };

        let outer_bottom = layer(self, outer, z);
        let outer_top = layer(self, outer, z + depth);
        let mut hole_bottoms = Vec::with_capacity(holes.len());
        let mut hole_tops = Vec::with_capacity(holes.len());
        for hole in holes {
            hole_bottoms.push(layer(self, hole, z));
            hole_tops.push(layer(self, hole, z + depth));
        }

        let mut faces = Vec::with_capacity(2 + outer.len());
        faces.push(self.add_face_by_vertices_with_holes(&outer_bottom, &hole_bottoms)?);
        faces.push(self.add_face_by_vertices_with_holes(&outer_top, &hole_tops)?);

        let rings = std::iter::once((&outer_bottom, &outer_top))
            .chain(hole_bottoms.iter().zip(hole_tops.iter()));
        for (bottom, top) in rings {
            let n = bottom.len();
            for i in 0..n {
                let j = (i + 1) % n;
                faces.push(self.add_face_by_vertices(&[bottom[i], bottom[j], top[j], top[i]])?);
            }
        }

        Ok(faces)
    }

    /// Creates an axis-aligned box as six faces with shared edges.
    pub fn make_box(
        &mut self,
        origin: [f64; 3],
        dx: f64,
        dy: f64,
        dz: f64,
    ) -> Result<Vec<FaceKey>> {
        let [x, y, z] = origin;
        let rect = [[x, y], [x + dx, y], [x + dx, y + dy], [x, y + dy]];
        self.make_prism(&rect, &[], z, dz)
    }
}
