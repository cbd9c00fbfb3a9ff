use super::Site;
use crate::error::IsingError;
use itertools::iproduct;
use rand::{self, distr::Distribution};

/// L x L grid of spins in {-1, +1} with periodic boundaries in both directions.
///
/// Spins are stored row-major in one contiguous buffer so the single-spin-flip
/// update only does direct indexed reads.
#[derive(Debug, Clone)]
pub struct SquareLattice {
    width: usize,
    spins: Vec<i8>,
    uniform_dist: rand::distr::Uniform<usize>,
}

fn uniform_site_dist(width: usize) -> Result<rand::distr::Uniform<usize>, IsingError> {
    if width == 0 {
        return Err(IsingError::EmptyLattice);
    }
    rand::distr::Uniform::new(0, width).map_err(|_| IsingError::EmptyLattice)
}

#[inline]
fn wrap_decrement(idx: usize, width: usize) -> usize {
    if idx == 0 {
        width - 1
    } else {
        idx - 1
    }
}

#[inline]
fn wrap_increment(idx: usize, width: usize) -> usize {
    if idx + 1 == width {
        0
    } else {
        idx + 1
    }
}

impl SquareLattice {
    pub fn new_with_ones(width: usize) -> Result<Self, IsingError> {
        Ok(SquareLattice {
            width,
            uniform_dist: uniform_site_dist(width)?,
            spins: vec![1; width * width],
        })
    }

    /// Every spin is drawn independently, +1 and -1 with equal probability.
    pub fn new_random<R: rand::Rng + ?Sized>(width: usize, rng: &mut R) -> Result<Self, IsingError> {
        let uniform_dist = uniform_site_dist(width)?;
        let spins = (0..width * width)
            .map(|_| if rng.random_bool(0.5) { 1 } else { -1 })
            .collect();

        Ok(SquareLattice {
            width,
            spins,
            uniform_dist,
        })
    }

    /// Build a lattice from row-major spin values.
    pub fn from_spins(width: usize, spins: Vec<i8>) -> Result<Self, IsingError> {
        let uniform_dist = uniform_site_dist(width)?;
        if spins.len() != width * width {
            return Err(IsingError::SpinCountMismatch {
                expected: width * width,
                actual: spins.len(),
            });
        }
        if let Some(pos) = spins.iter().position(|s| *s != 1 && *s != -1) {
            return Err(IsingError::InvalidSpin {
                site: (pos / width, pos % width),
                value: spins[pos],
            });
        }

        Ok(SquareLattice {
            width,
            spins,
            uniform_dist,
        })
    }

    #[inline]
    fn offset(&self, site: Site) -> usize {
        debug_assert!(
            site.0 < self.width && site.1 < self.width,
            "site {site:?} outside of {}x{} lattice",
            self.width,
            self.width
        );
        site.0 * self.width + site.1
    }

    pub fn number_sites(&self) -> usize {
        self.spins.len()
    }

    pub fn linear_system_size(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn idx_into(&self, site: Site) -> i8 {
        self.spins[self.offset(site)]
    }

    #[inline]
    pub fn flip(&mut self, site: Site) {
        let offset = self.offset(site);
        self.spins[offset] = -self.spins[offset];
    }

    /// Neighbours in the order up, down, left, right.
    #[inline]
    pub fn get_all_neighbour_indices(&self, site: Site) -> [Site; 4] {
        let (i, j) = site;
        [
            (wrap_decrement(i, self.width), j),
            (wrap_increment(i, self.width), j),
            (i, wrap_decrement(j, self.width)),
            (i, wrap_increment(j, self.width)),
        ]
    }

    #[inline]
    pub fn sum_neighbouring_spins(&self, site: Site) -> i32 {
        self.get_all_neighbour_indices(site)
            .iter()
            .map(|nn| self.idx_into(*nn) as i32)
            .sum()
    }

    /// Change of the total energy if the spin at `site` were flipped.
    #[inline]
    pub fn calc_delta_energy(&self, site: Site) -> i32 {
        2 * self.idx_into(site) as i32 * self.sum_neighbouring_spins(site)
    }

    #[inline]
    pub fn draw_random_index<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> Site {
        (self.uniform_dist.sample(rng), self.uniform_dist.sample(rng))
    }

    pub fn get_sum_of_spins(&self) -> i64 {
        self.spins.iter().map(|s| *s as i64).sum()
    }

    pub fn get_magnetisation(&self) -> f64 {
        self.get_sum_of_spins() as f64 / self.number_sites() as f64
    }

    /// Total interaction energy. Each bond is counted once by only pairing a site
    /// with the site above it and the site to its left.
    pub fn get_energy(&self) -> f64 {
        let bonds: i64 = iproduct!(0..self.width, 0..self.width)
            .map(|(i, j)| {
                let up = self.idx_into((wrap_decrement(i, self.width), j));
                let left = self.idx_into((i, wrap_decrement(j, self.width)));
                self.idx_into((i, j)) as i64 * (up as i64 + left as i64)
            })
            .sum();
        -(bonds as f64)
    }

    pub fn get_energy_per_site(&self) -> f64 {
        self.get_energy() / self.number_sites() as f64
    }

    pub fn rows(&self) -> impl Iterator<Item = &[i8]> {
        self.spins.chunks(self.width)
    }

    pub fn is_state_equal(&self, other: &Self) -> bool {
        self.width == other.width && self.spins == other.spins
    }

    pub fn describe(&self) -> String {
        format!(
            "{}x{} Square Lattice With Nearest Neighbour Interaction",
            self.width, self.width,
        )
    }

    #[cfg(test)]
    pub(crate) fn set_spin_unchecked(&mut self, site: Site, value: i8) {
        let offset = self.offset(site);
        self.spins[offset] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    // the test lattice looks like
    //  1, -1,  1
    //  1,  1,  1
    // -1, -1,  1
    fn build_square_test_lattice() -> SquareLattice {
        SquareLattice::from_spins(3, vec![1, -1, 1, 1, 1, 1, -1, -1, 1]).unwrap()
    }

    #[test]
    fn square_lattice_number_sites() {
        assert_eq!(SquareLattice::new_with_ones(3).unwrap().number_sites(), 9);
        assert_eq!(SquareLattice::new_with_ones(5).unwrap().number_sites(), 25);
    }

    #[test]
    fn square_lattice_rejects_zero_width() {
        assert!(matches!(
            SquareLattice::new_with_ones(0),
            Err(IsingError::EmptyLattice)
        ));
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(matches!(
            SquareLattice::new_random(0, &mut rng),
            Err(IsingError::EmptyLattice)
        ));
    }

    #[test]
    fn square_lattice_from_spins_validates() {
        assert!(matches!(
            SquareLattice::from_spins(2, vec![1, 1, 1]),
            Err(IsingError::SpinCountMismatch {
                expected: 4,
                actual: 3
            })
        ));
        assert!(matches!(
            SquareLattice::from_spins(2, vec![1, 1, 0, 1]),
            Err(IsingError::InvalidSpin {
                site: (1, 0),
                value: 0
            })
        ));
    }

    #[test]
    fn square_lattice_get_all_neighbour_indices() {
        let test_lattice = build_square_test_lattice();

        assert_eq!(
            test_lattice.get_all_neighbour_indices((0, 0)),
            [(2, 0), (1, 0), (0, 2), (0, 1)],
            "Neighbours of (0, 0) not matching."
        );
        assert_eq!(
            test_lattice.get_all_neighbour_indices((1, 1)),
            [(0, 1), (2, 1), (1, 0), (1, 2)],
            "Neighbours of (1, 1) not matching."
        );
        assert_eq!(
            test_lattice.get_all_neighbour_indices((1, 2)),
            [(0, 2), (2, 2), (1, 1), (1, 0)],
            "Neighbours of (1, 2) not matching."
        );
    }

    #[test]
    fn square_lattice_periodic_neighbours_4x4() {
        let mut spins = vec![1; 16];
        // mark the four wrapped neighbours of (0, 0)
        spins[3 * 4] = -1; // (3, 0)
        spins[3] = -1; // (0, 3)
        let test_lattice = SquareLattice::from_spins(4, spins).unwrap();

        assert_eq!(
            test_lattice.get_all_neighbour_indices((0, 0)),
            [(3, 0), (1, 0), (0, 3), (0, 1)]
        );
        assert_eq!(test_lattice.idx_into((3, 0)), -1);
        assert_eq!(test_lattice.idx_into((0, 3)), -1);
        assert_eq!(test_lattice.sum_neighbouring_spins((0, 0)), 0);
        assert_eq!(test_lattice.sum_neighbouring_spins((0, 1)), 4);
        assert_eq!(test_lattice.sum_neighbouring_spins((0, 2)), 2);
    }

    #[test]
    fn square_lattice_sum_neighbouring_spins() {
        let test_lattice = build_square_test_lattice();

        assert_eq!(test_lattice.sum_neighbouring_spins((0, 0)), 0);
        assert_eq!(test_lattice.sum_neighbouring_spins((1, 1)), 0);
        assert_eq!(test_lattice.sum_neighbouring_spins((2, 2)), 0);
        assert_eq!(test_lattice.sum_neighbouring_spins((0, 2)), 2);
        assert_eq!(test_lattice.sum_neighbouring_spins((1, 2)), 4);
    }

    #[test]
    fn square_lattice_calc_delta_energy() {
        let test_lattice = build_square_test_lattice();

        assert_eq!(test_lattice.calc_delta_energy((0, 0)), 0);
        assert_eq!(test_lattice.calc_delta_energy((0, 2)), 4);
        assert_eq!(test_lattice.calc_delta_energy((1, 2)), 8);
        assert_eq!(test_lattice.calc_delta_energy((0, 1)), -4);
    }

    #[test]
    fn square_lattice_flip() {
        let benchmark_lattice = build_square_test_lattice();
        let mut test_lattice = SquareLattice::new_with_ones(3).unwrap();

        test_lattice.flip((0, 1));
        test_lattice.flip((2, 0));
        test_lattice.flip((2, 1));

        assert!(test_lattice.is_state_equal(&benchmark_lattice));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "outside of 4x4 lattice")]
    fn square_lattice_column_does_not_wrap_into_next_row() {
        let mut test_lattice = SquareLattice::new_with_ones(4).unwrap();
        test_lattice.flip((0, 5));
    }

    #[test]
    fn square_lattice_get_sum_of_spins() {
        let test_lattice = build_square_test_lattice();

        assert_eq!(test_lattice.get_sum_of_spins(), 3);
        approx::assert_relative_eq!(test_lattice.get_magnetisation(), 1. / 3.);
    }

    #[test]
    fn square_lattice_get_energy() {
        let test_lattice = build_square_test_lattice();

        // 18 bonds, 10 satisfied and 8 broken
        approx::assert_relative_eq!(test_lattice.get_energy(), -2., epsilon = f64::EPSILON);
        approx::assert_relative_eq!(
            test_lattice.get_energy_per_site(),
            -2. / 9.,
            epsilon = f64::EPSILON
        );
    }

    #[test]
    fn square_lattice_ground_state_energy() {
        let test_lattice = SquareLattice::new_with_ones(8).unwrap();
        approx::assert_relative_eq!(test_lattice.get_energy_per_site(), -2., epsilon = f64::EPSILON);
    }

    #[test]
    fn square_lattice_new_random_only_unit_spins() {
        let mut rng = SmallRng::seed_from_u64(15);
        let test_lattice = SquareLattice::new_random(20, &mut rng).unwrap();

        assert!(test_lattice.rows().flatten().all(|s| *s == 1 || *s == -1));
        // a fair coin on 400 sites does not give a uniform lattice
        assert!(test_lattice.get_sum_of_spins().abs() < 400);
    }

    #[test]
    fn square_lattice_draw_random_index_in_bounds() {
        let test_lattice = build_square_test_lattice();
        let mut rng = SmallRng::seed_from_u64(15);

        for _ in 0..1000 {
            let (i, j) = test_lattice.draw_random_index(&mut rng);
            assert!(i < 3 && j < 3);
        }
    }

    #[test]
    fn square_lattice_rows() {
        let test_lattice = build_square_test_lattice();
        let rows: Vec<&[i8]> = test_lattice.rows().collect();

        assert_eq!(rows, vec![&[1, -1, 1][..], &[1, 1, 1][..], &[-1, -1, 1][..]]);
    }
}
