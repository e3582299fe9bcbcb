/// Vertex/index arrays for one part of a chunk mesh. Colors are linear RGB.
#[derive(Default, Clone, Debug)]
pub struct MeshBuffers {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub colors: Vec<f32>,
    pub uvs: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn quad_count(&self) -> usize {
        self.indices.len() / 6
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Pre-reserve capacity for approximately `n_quads` quads worth of data.
    pub fn reserve_quads(&mut self, n_quads: usize) {
        self.positions.reserve(n_quads * 12);
        self.normals.reserve(n_quads * 12);
        self.colors.reserve(n_quads * 12);
        self.uvs.reserve(n_quads * 8);
        self.indices.reserve(n_quads * 6);
    }

    /// Appends a quad given as a corner loop. The loop is reversed if it does not
    /// wind counter-clockwise around `n`. With `flip_diagonal` the quad is split
    /// along 1-3 instead of 0-2.
    pub fn add_quad(
        &mut self,
        mut corners: [[f32; 3]; 4],
        n: [f32; 3],
        mut uvs: [[f32; 2]; 4],
        mut colors: [[f32; 3]; 4],
        flip_diagonal: bool,
    ) {
        let e1 = sub(corners[1], corners[0]);
        let e2 = sub(corners[2], corners[0]);
        let c = [e1[1] * e2[2] - e1[2] * e2[1], e1[2] * e2[0] - e1[0] * e2[2], e1[0] * e2[1] - e1[1] * e2[0]];
        if c[0] * n[0] + c[1] * n[1] + c[2] * n[2] < 0.0 {
            corners.swap(1, 3);
            uvs.swap(1, 3);
            colors.swap(1, 3);
        }
        let base = self.vertex_count() as u32;
        for i in 0..4 {
            self.positions.extend_from_slice(&corners[i]);
            self.normals.extend_from_slice(&n);
            self.uvs.extend_from_slice(&uvs[i]);
            self.colors.extend_from_slice(&colors[i]);
        }
        if flip_diagonal {
            self.indices.extend_from_slice(&[base + 1, base + 2, base + 3, base + 1, base + 3, base]);
        } else {
            self.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
    }
}

#[inline]
fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clockwise_loop_is_reversed() {
        let mut m = MeshBuffers::default();
        // clockwise seen from +Y
        let cw = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0]];
        let uv = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        m.add_quad(cw, [0.0, 1.0, 0.0], uv, [[1.0; 3]; 4], false);
        assert_eq!(&m.positions[3..6], &[0.0, 0.0, 1.0]);
        assert_eq!(m.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(m.quad_count(), 1);
    }
}
