//! Exact squared Euclidean distance transform
//!
//! A cell seeded with value `s` at position `x` defines the parabola
//! `f(t) = (t - x)² + s`. The 1-D transform of a lane is the lower envelope
//! of those parabolas sampled at each cell. Running it over every row and
//! then over every column of the row result yields the exact 2-D squared
//! distance to the nearest zero seed.

use crate::error::DfError;

/// Seed for cells that are not at distance zero
pub const FAR: f32 = f32::INFINITY;

/// Apex of one parabola in the envelope
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position along the lane
    pub x: f32,
    /// Squared distance carried in from the seed (always finite)
    pub value: f32,
}

/// Position where the parabola of `q` starts to lie below the one of `p`.
/// Requires `p.x < q.x` and finite values on both.
#[inline]
fn intersection(p: Vertex, q: Vertex) -> f32 {
    debug_assert!(p.value.is_finite() && q.value.is_finite());
    debug_assert!(p.x < q.x);
    ((q.value + q.x * q.x) - (p.value + p.x * p.x)) / (2.0 * q.x - 2.0 * p.x)
}

/// One row or column of a row-major grid.
/// Cell `i` of the lane lives at `base + i * stride`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lane {
    base: usize,
    stride: usize,
    len: usize,
}

impl Lane {
    /// Row `y` of a grid `width` cells wide
    pub fn row(y: usize, width: usize) -> Self {
        Self {
            base: y * width,
            stride: 1,
            len: width,
        }
    }

    /// Column `x` of a `width × height` grid
    pub fn column(x: usize, width: usize, height: usize) -> Self {
        Self {
            base: x,
            stride: width,
            len: height,
        }
    }

    #[inline]
    pub fn index(&self, i: usize) -> usize {
        self.base + i * self.stride
    }

    pub fn len(&self) -> usize {
        self.len
    }
}

/// Lower envelope of parabolas for a single lane.
///
/// Buffers are sized once for the longest lane and reused for every lane
/// of every glyph. After `build`, `breaks().len() == vertices().len() - 1`
/// whenever at least one vertex was admitted, and the breaks are strictly
/// increasing.
pub struct Envelope {
    vertices: Vec<Vertex>,
    breaks: Vec<f32>,
}

impl Envelope {
    /// Allocate stacks for lanes up to `max_len` cells
    pub fn with_capacity(max_len: usize) -> Result<Self, DfError> {
        let mut vertices = Vec::new();
        vertices
            .try_reserve_exact(max_len)
            .map_err(|_| DfError::OutOfMemory {
                what: "envelope vertices",
                bytes: max_len * std::mem::size_of::<Vertex>(),
            })?;
        let mut breaks = Vec::new();
        breaks
            .try_reserve_exact(max_len)
            .map_err(|_| DfError::OutOfMemory {
                what: "envelope breaks",
                bytes: max_len * std::mem::size_of::<f32>(),
            })?;
        Ok(Self { vertices, breaks })
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.breaks.clear();
    }

    #[allow(dead_code)]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[allow(dead_code)]
    pub fn breaks(&self) -> &[f32] {
        &self.breaks
    }

    /// Admit a vertex to the right of every vertex already admitted
    fn push(&mut self, vertex: Vertex) {
        if let Some(&top) = self.vertices.last() {
            let mut inter = intersection(top, vertex);

            // A parabola whose region of dominance shrank to nothing is
            // not part of the envelope
            while let Some(&last_break) = self.breaks.last() {
                if inter > last_break {
                    break;
                }
                self.breaks.pop();
                self.vertices.pop();
                inter = intersection(self.vertices[self.vertices.len() - 1], vertex);
            }

            self.breaks.push(inter);
        }
        self.vertices.push(vertex);
    }

    /// Build the envelope of every finite cell of `lane`
    pub fn build(&mut self, dists: &[f32], lane: Lane) {
        self.clear();
        for i in 0..lane.len() {
            let value = dists[lane.index(i)];
            // A parabola resting at infinity never reaches the minimum
            if !value.is_finite() {
                continue;
            }
            self.push(Vertex {
                x: i as f32,
                value,
            });
        }
    }

    /// Lower every cell of `lane` to the envelope value at that cell.
    /// An empty envelope leaves the lane untouched.
    pub fn lower_into(&self, dists: &mut [f32], lane: Lane) {
        if self.vertices.is_empty() {
            return;
        }
        debug_assert_eq!(self.vertices.len(), self.breaks.len() + 1);

        let mut k = 0;
        for i in 0..lane.len() {
            let x = i as f32;
            while k < self.breaks.len() && x > self.breaks[k] {
                k += 1;
            }
            let vertex = self.vertices[k];
            let dx = x - vertex.x;
            let dist = dx * dx + vertex.value;
            let idx = lane.index(i);
            if dist < dists[idx] {
                dists[idx] = dist;
            }
        }
    }
}

/// In-place squared distance transform of a `width × height` seed grid.
///
/// Seeds are 0 at target cells and [`FAR`] elsewhere. On return every cell
/// holds its squared Euclidean distance to the nearest target; if there
/// are no targets every cell stays [`FAR`].
pub fn transform(dists: &mut [f32], width: usize, height: usize, envelope: &mut Envelope) {
    debug_assert_eq!(dists.len(), width * height);

    for y in 0..height {
        let lane = Lane::row(y, width);
        envelope.build(dists, lane);
        envelope.lower_into(dists, lane);
    }

    for x in 0..width {
        let lane = Lane::column(x, width, height);
        envelope.build(dists, lane);
        envelope.lower_into(dists, lane);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic xorshift so the tests need no RNG dependency
    struct XorShift(u32);

    impl XorShift {
        fn next(&mut self) -> u32 {
            let mut x = self.0;
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            self.0 = x;
            x
        }
    }

    fn brute_force(seeds: &[(usize, usize)], width: usize, height: usize) -> Vec<f32> {
        let mut out = vec![FAR; width * height];
        for y in 0..height {
            for x in 0..width {
                for &(sx, sy) in seeds {
                    let dx = x as f32 - sx as f32;
                    let dy = y as f32 - sy as f32;
                    let d = dx * dx + dy * dy;
                    if d < out[x + y * width] {
                        out[x + y * width] = d;
                    }
                }
            }
        }
        out
    }

    fn run(seeds: &[(usize, usize)], width: usize, height: usize) -> Vec<f32> {
        let mut dists = vec![FAR; width * height];
        for &(x, y) in seeds {
            dists[x + y * width] = 0.0;
        }
        let mut envelope = Envelope::with_capacity(width.max(height)).unwrap();
        transform(&mut dists, width, height, &mut envelope);
        dists
    }

    #[test]
    fn test_single_seed_matches_brute_force() {
        for &(w, h) in &[(1, 1), (7, 3), (16, 16), (33, 64), (64, 64)] {
            for &(sx, sy) in &[(0, 0), (w - 1, h - 1), (w / 2, h / 3)] {
                let seeds = [(sx, sy)];
                assert_eq!(run(&seeds, w, h), brute_force(&seeds, w, h), "{}x{} seed ({}, {})", w, h, sx, sy);
            }
        }
    }

    #[test]
    fn test_random_seeds_match_brute_force() {
        let mut rng = XorShift(0x9E37_79B9);
        for round in 0..20 {
            let w = 1 + (rng.next() % 48) as usize;
            let h = 1 + (rng.next() % 48) as usize;
            let count = 1 + (rng.next() % 12) as usize;
            let seeds: Vec<(usize, usize)> = (0..count)
                .map(|_| ((rng.next() as usize) % w, (rng.next() as usize) % h))
                .collect();
            assert_eq!(run(&seeds, w, h), brute_force(&seeds, w, h), "round {}", round);
        }
    }

    #[test]
    fn test_no_seeds_stays_far() {
        let dists = run(&[], 9, 5);
        assert!(dists.iter().all(|d| *d == FAR));
    }

    #[test]
    fn test_empty_lane_is_not_written() {
        let mut dists = vec![FAR; 6];
        let lane = Lane::row(0, 6);
        let mut envelope = Envelope::with_capacity(6).unwrap();
        envelope.build(&dists, lane);
        assert!(envelope.vertices().is_empty());
        assert!(envelope.breaks().is_empty());
        envelope.lower_into(&mut dists, lane);
        assert!(dists.iter().all(|d| *d == FAR));
    }

    #[test]
    fn test_envelope_breaks_strictly_increasing() {
        let mut rng = XorShift(12345);
        let mut envelope = Envelope::with_capacity(64).unwrap();
        for _ in 0..200 {
            let len = 1 + (rng.next() % 64) as usize;
            let lane: Vec<f32> = (0..len)
                .map(|_| match rng.next() % 4 {
                    0 => FAR,
                    _ => (rng.next() % 100) as f32,
                })
                .collect();
            envelope.build(&lane, Lane::row(0, len));

            let k = envelope.vertices().len();
            assert_eq!(envelope.breaks().len(), k.saturating_sub(1));
            assert!(envelope.breaks().windows(2).all(|pair| pair[0] < pair[1]));
            assert!(envelope.vertices().windows(2).all(|pair| pair[0].x < pair[1].x));
        }
    }

    #[test]
    fn test_dominated_vertex_is_popped() {
        // The middle parabola sits far above both neighbours
        let lane = [0.0, 50.0, 0.0];
        let mut envelope = Envelope::with_capacity(3).unwrap();
        envelope.build(&lane, Lane::row(0, 3));
        assert_eq!(envelope.vertices().len(), 2);
        assert_eq!(envelope.breaks(), &[1.0]);
    }

    #[test]
    fn test_column_lane_indexing() {
        let lane = Lane::column(2, 5, 4);
        assert_eq!(lane.len(), 4);
        assert_eq!(lane.index(0), 2);
        assert_eq!(lane.index(3), 17);
        assert_eq!(Lane::row(3, 5).index(1), 16);
    }
}
