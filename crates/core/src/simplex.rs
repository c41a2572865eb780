//! Seeded 2D simplex noise with a pseudo-3D extension.
//!
//! [`NoiseField`] is immutable once built. Regenerating noise means building
//! a new value and replacing the old one, never mutating a table in place.
//! It implements [`noise::NoiseFn`] for 2D and 3D points so it composes with
//! the `noise` crate's combinators.

use noise::{NoiseFn, Seedable};

/// Skew factor for 2D simplex: `(sqrt(3) - 1) / 2`.
const F2: f64 = 0.366_025_403_784_438_6;
/// Unskew factor for 2D simplex: `(3 - sqrt(3)) / 6`.
const G2: f64 = 0.211_324_865_405_187_1;
/// Scales the summed corner contributions into roughly [-1, 1].
const OUTPUT_SCALE: f64 = 70.0;

/// Park–Miller minimal standard LCG multiplier.
const LCG_MULTIPLIER: u64 = 16_807;
/// Park–Miller modulus, `2^31 - 1`.
const LCG_MODULUS: u64 = 2_147_483_647;

/// Offsets that decorrelate the three planes averaged by
/// [`NoiseField::sample3d`].
const PLANE_OFFSET_XZ: f64 = 1000.0;
const PLANE_OFFSET_YZ: f64 = 2000.0;

/// The twelve edge-midpoint gradients of a cube. Only the x and y
/// components take part in 2D sampling.
const GRAD3: [[f64; 3]; 12] = [
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [1.0, -1.0, 0.0],
    [-1.0, -1.0, 0.0],
    [1.0, 0.0, 1.0],
    [-1.0, 0.0, 1.0],
    [1.0, 0.0, -1.0],
    [-1.0, 0.0, -1.0],
    [0.0, 1.0, 1.0],
    [0.0, -1.0, 1.0],
    [0.0, 1.0, -1.0],
    [0.0, -1.0, -1.0],
];

/// Lattice gradient noise sampler built from an integer seed.
#[derive(Debug, Clone)]
pub struct NoiseField {
    seed: u32,
    perm: [u8; 512],
    perm_mod12: [u8; 512],
}

impl NoiseField {
    /// Builds the permutation tables for `seed`.
    ///
    /// The base permutation is the identity shuffled by a reverse
    /// Fisher–Yates pass driven by the Park–Miller LCG with its state
    /// initialised to `seed`.
    pub fn new(seed: u32) -> Self {
        let mut p: [u8; 256] = std::array::from_fn(|i| i as u8);
        let mut state = u64::from(seed);
        for i in (1..256).rev() {
            state = (state * LCG_MULTIPLIER) % LCG_MODULUS;
            let j = (state % (i as u64 + 1)) as usize;
            p.swap(i, j);
        }

        let perm: [u8; 512] = std::array::from_fn(|k| p[k & 255]);
        let perm_mod12: [u8; 512] = std::array::from_fn(|k| perm[k] % 12);
        Self {
            seed,
            perm,
            perm_mod12,
        }
    }

    /// The seed this field was built from.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Samples 2D simplex noise at `(x, y)`. Output lies in roughly [-1, 1].
    pub fn sample2d(&self, x: f64, y: f64) -> f64 {
        let s = (x + y) * F2;
        let i = (x + s).floor();
        let j = (y + s).floor();
        let t = (i + j) * G2;
        let x0 = x - (i - t);
        let y0 = y - (j - t);

        // Lower or upper triangle of the skewed cell.
        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - i1 as f64 + G2;
        let y1 = y0 - j1 as f64 + G2;
        let x2 = x0 - 1.0 + 2.0 * G2;
        let y2 = y0 - 1.0 + 2.0 * G2;

        let ii = (i as i64 & 255) as usize;
        let jj = (j as i64 & 255) as usize;
        let gi0 = self.perm_mod12[ii + self.perm[jj] as usize];
        let gi1 = self.perm_mod12[ii + i1 + self.perm[jj + j1] as usize];
        let gi2 = self.perm_mod12[ii + 1 + self.perm[jj + 1] as usize];

        let n0 = corner(gi0, x0, y0);
        let n1 = corner(gi1, x1, y1);
        let n2 = corner(gi2, x2, y2);

        OUTPUT_SCALE * (n0 + n1 + n2)
    }

    /// Time-varying noise from three 2D planes.
    ///
    /// This is an intentional approximation of 3D noise: the mean of
    /// `sample2d(x, y)`, `sample2d(x + 1000, z)` and `sample2d(y + 2000, z)`.
    /// Moving `z` slides two of the planes, which is enough to animate a
    /// flow field without a 3D simplex kernel.
    pub fn sample3d(&self, x: f64, y: f64, z: f64) -> f64 {
        let a = self.sample2d(x, y);
        let b = self.sample2d(x + PLANE_OFFSET_XZ, z);
        let c = self.sample2d(y + PLANE_OFFSET_YZ, z);
        (a + b + c) / 3.0
    }
}

/// Contribution of one simplex corner at offset `(dx, dy)`.
fn corner(gradient: u8, dx: f64, dy: f64) -> f64 {
    let t = 0.5 - dx * dx - dy * dy;
    if t < 0.0 {
        return 0.0;
    }
    let g = GRAD3[gradient as usize];
    let t2 = t * t;
    t2 * t2 * (g[0] * dx + g[1] * dy)
}

impl NoiseFn<f64, 2> for NoiseField {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.sample2d(point[0], point[1])
    }
}

impl NoiseFn<f64, 3> for NoiseField {
    fn get(&self, point: [f64; 3]) -> f64 {
        self.sample3d(point[0], point[1], point[2])
    }
}

impl Seedable for NoiseField {
    fn set_seed(self, seed: u32) -> Self {
        if seed == self.seed {
            return self;
        }
        Self::new(seed)
    }

    fn seed(&self) -> u32 {
        self.seed
    }
}
