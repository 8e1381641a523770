//! Dense field storage.
//!
//! All fields on a grid share the same linear site indexing
//! `idx = (i * ny + j) * nz + k`, so per-site kernels that need no
//! geometry (forcing, collision, macroscopic recovery) can iterate the
//! flat data directly. Per-site components (directions or vector
//! components) are interleaved: `data[idx * comps + c]`.

/// Scalar field: one value per site.
#[derive(Clone, Debug)]
pub struct ScalarField {
    /// Flat site-ordered values.
    pub data: Vec<f64>,
}

impl ScalarField {
    /// Allocate a zeroed field for `n_sites` sites.
    pub fn zeros(n_sites: usize) -> Self {
        Self {
            data: vec![0.0; n_sites],
        }
    }

    /// Fill with a constant.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Sum over all sites.
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }
}

/// Vector field: `comps` interleaved components per site.
///
/// Used for velocity, Cartesian forces and the second-moment running
/// averages.
#[derive(Clone, Debug)]
pub struct VectorField {
    /// Flat interleaved values, `data[idx * comps + c]`.
    pub data: Vec<f64>,
    /// Components per site.
    pub comps: usize,
}

impl VectorField {
    /// Allocate a zeroed field.
    pub fn zeros(n_sites: usize, comps: usize) -> Self {
        Self {
            data: vec![0.0; n_sites * comps],
            comps,
        }
    }

    /// Component `c` at site `idx`.
    #[inline]
    pub fn get(&self, idx: usize, c: usize) -> f64 {
        self.data[idx * self.comps + c]
    }

    /// Set component `c` at site `idx`.
    #[inline]
    pub fn set(&mut self, idx: usize, c: usize, value: f64) {
        self.data[idx * self.comps + c] = value;
    }

    /// All components at site `idx`.
    #[inline]
    pub fn site(&self, idx: usize) -> &[f64] {
        &self.data[idx * self.comps..(idx + 1) * self.comps]
    }

    /// Zero every component.
    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }
}

/// Population field: one value per site per discrete direction.
#[derive(Clone, Debug)]
pub struct PopulationField {
    /// Flat interleaved values, `data[idx * q + v]`.
    pub data: Vec<f64>,
    /// Directions per site.
    pub q: usize,
}

impl PopulationField {
    /// Allocate a zeroed field.
    pub fn zeros(n_sites: usize, q: usize) -> Self {
        Self {
            data: vec![0.0; n_sites * q],
            q,
        }
    }

    /// Population in direction `v` at site `idx`.
    #[inline]
    pub fn get(&self, idx: usize, v: usize) -> f64 {
        self.data[idx * self.q + v]
    }

    /// Set population in direction `v` at site `idx`.
    #[inline]
    pub fn set(&mut self, idx: usize, v: usize, value: f64) {
        self.data[idx * self.q + v] = value;
    }

    /// All populations at site `idx`.
    #[inline]
    pub fn site(&self, idx: usize) -> &[f64] {
        &self.data[idx * self.q..(idx + 1) * self.q]
    }

    /// Mutable populations at site `idx`.
    #[inline]
    pub fn site_mut(&mut self, idx: usize) -> &mut [f64] {
        &mut self.data[idx * self.q..(idx + 1) * self.q]
    }

    /// Sum of populations at site `idx` (local density when applied to
    /// `f`).
    #[inline]
    pub fn site_sum(&self, idx: usize) -> f64 {
        self.site(idx).iter().sum()
    }

    /// Zero every population.
    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }

    /// Sum over the entire field (total mass when applied to `f`).
    pub fn total(&self) -> f64 {
        self.data.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_field() {
        let mut field = ScalarField::zeros(4);
        field.fill(1.5);
        assert!((field.sum() - 6.0).abs() < 1e-14);
    }

    #[test]
    fn test_vector_field_access() {
        let mut field = VectorField::zeros(3, 2);
        field.set(1, 0, 2.0);
        field.set(1, 1, 3.0);
        assert!((field.get(1, 0) - 2.0).abs() < 1e-14);
        assert_eq!(field.site(1), &[2.0, 3.0]);
        assert_eq!(field.site(0), &[0.0, 0.0]);
    }

    #[test]
    fn test_population_field_sums() {
        let mut field = PopulationField::zeros(2, 3);
        field.set(0, 0, 1.0);
        field.set(0, 2, 2.0);
        field.set(1, 1, 4.0);
        assert!((field.site_sum(0) - 3.0).abs() < 1e-14);
        assert!((field.site_sum(1) - 4.0).abs() < 1e-14);
        assert!((field.total() - 7.0).abs() < 1e-14);
    }
}
