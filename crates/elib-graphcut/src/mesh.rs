//! Binary graph cut over an arbitrary vertex graph
//!
//! Segments the vertices of a surface mesh (or any graph with positions)
//! into background and foreground. Vertices with a prior of `1` or `-1` are
//! pinned to foreground or background; the others are pulled towards the
//! closer of two reference intensities. Neighbouring vertices pay
//! `λ1 + λ2·exp(−(v_i − v_j)²)·exp(−‖x_i − x_j‖)` for a label change.

use crate::GC_INFINITY;
use crate::config::max_intensity;
use crate::energy::Energy;
use crate::error::{GraphCutError, GraphCutResult};

/// Vertex positions and neighbour lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<[f64; 3]>,
    /// Neighbour indices of each vertex
    pub neighbours: Vec<Vec<usize>>,
}

impl Mesh {
    pub fn new(vertices: Vec<[f64; 3]>, neighbours: Vec<Vec<usize>>) -> Self {
        Self {
            vertices,
            neighbours,
        }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    fn distance(&self, i: usize, j: usize) -> f64 {
        let (a, b) = (self.vertices[i], self.vertices[j]);
        a.iter()
            .zip(&b)
            .map(|(p, q)| (p - q) * (p - q))
            .sum::<f64>()
            .sqrt()
    }

    fn validate(&self) -> GraphCutResult<()> {
        if self.neighbours.len() != self.vertices.len() {
            return Err(GraphCutError::ShapeMismatch {
                expected: vec![self.vertices.len()],
                actual: vec![self.neighbours.len()],
            });
        }
        let n = self.len();
        for (i, list) in self.neighbours.iter().enumerate() {
            if let Some(&bad) = list.iter().find(|&&j| j >= n) {
                return Err(GraphCutError::InvalidParameter(format!(
                    "vertex {i} lists neighbour {bad} of a {n}-vertex mesh"
                )));
            }
        }
        Ok(())
    }
}

/// Options of [`mesh_graphcut`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshOptions {
    /// Background reference, fraction of the maximum intensity
    pub c0: f64,
    /// Foreground reference, fraction of the maximum intensity
    pub c1: f64,
    /// Constant part of the pairwise cost
    pub lambda1: f64,
    /// Intensity/distance dependent part of the pairwise cost
    pub lambda2: f64,
    /// Bit depth of the intensities
    pub bit_depth: u32,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            c0: 0.1,
            c1: 0.9,
            lambda1: 1.0,
            lambda2: 1.0,
            bit_depth: 8,
        }
    }
}

/// Segment the vertices of `mesh`.
///
/// `prior[i]` is `1` (foreground), `-1` (background) or `0` (free);
/// `intensities[i]` is the sample at vertex `i`. Every neighbour-list entry
/// adds one pairwise term, so symmetric lists weigh an edge twice. Returns
/// one 0/1 label per vertex.
///
/// # Errors
///
/// Returns an error for mismatched lengths, out-of-range neighbours or
/// prior values, or a bit depth outside `1..=32`.
pub fn mesh_graphcut(
    mesh: &Mesh,
    prior: &[i32],
    intensities: &[i32],
    options: &MeshOptions,
) -> GraphCutResult<Vec<i32>> {
    mesh.validate()?;
    let n = mesh.len();
    for (name, len) in [("prior", prior.len()), ("intensities", intensities.len())] {
        if len != n {
            log::debug!("{name} has {len} entries for {n} vertices");
            return Err(GraphCutError::ShapeMismatch {
                expected: vec![n],
                actual: vec![len],
            });
        }
    }
    if let Some(bad) = prior.iter().find(|p| !(-1..=1).contains(*p)) {
        return Err(GraphCutError::InvalidParameter(format!(
            "mesh prior must be -1, 0 or 1, got {bad}"
        )));
    }
    if !(1..=32).contains(&options.bit_depth) {
        return Err(GraphCutError::InvalidParameter(format!(
            "bit depth {}",
            options.bit_depth
        )));
    }

    let max = max_intensity(options.bit_depth);
    let (background, foreground) = (options.c0 * max, options.c1 * max);
    let mut energy = Energy::with_capacity(n, mesh.neighbours.iter().map(Vec::len).sum());
    for (&p, &v) in prior.iter().zip(intensities) {
        let x = energy.add_variable();
        if p != 0 {
            let pin = f64::from(p) * GC_INFINITY;
            energy.add_term1(x, pin, -pin);
        } else {
            let v = f64::from(v);
            energy.add_term1(x, (v - background).abs(), (v - foreground).abs());
        }
    }

    for (i, list) in mesh.neighbours.iter().enumerate() {
        for &j in list.iter().filter(|&&j| j != i) {
            let dv = f64::from(intensities[i]) - f64::from(intensities[j]);
            let w = options.lambda1
                + options.lambda2 * (-(dv * dv)).exp() * (-mesh.distance(i, j)).exp();
            energy.add_term2(i, j, 0.0, w, w, 0.0)?;
        }
    }

    let minimum = energy.minimize();
    log::info!("mesh graph cut over {n} vertices: energy {minimum:.6}");
    Ok((0..n).map(|i| i32::from(energy.value(i))).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(n: usize) -> Mesh {
        let vertices = (0..n).map(|i| [i as f64, 0.0, 0.0]).collect();
        let neighbours = (0..n)
            .map(|i| {
                let mut list = Vec::new();
                if i > 0 {
                    list.push(i - 1);
                }
                if i + 1 < n {
                    list.push(i + 1);
                }
                list
            })
            .collect();
        Mesh::new(vertices, neighbours)
    }

    #[test]
    fn test_intensity_split() {
        let mesh = chain(4);
        let labels = mesh_graphcut(
            &mesh,
            &[0, 0, 0, 0],
            &[10, 20, 230, 240],
            &MeshOptions::default(),
        )
        .unwrap();
        assert_eq!(labels, vec![0, 0, 1, 1]);
    }

    #[test]
    fn test_prior_pins_vertices() {
        let mesh = chain(3);
        // Bright vertex forced to background, dark one to foreground
        let labels = mesh_graphcut(
            &mesh,
            &[-1, 0, 1],
            &[250, 128, 0],
            &MeshOptions {
                lambda1: 0.0,
                lambda2: 0.0,
                ..MeshOptions::default()
            },
        )
        .unwrap();
        assert_eq!(labels[0], 0);
        assert_eq!(labels[2], 1);
    }

    #[test]
    fn test_invalid_input() {
        let mesh = chain(2);
        let options = MeshOptions::default();
        assert!(matches!(
            mesh_graphcut(&mesh, &[0], &[0, 0], &options),
            Err(GraphCutError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            mesh_graphcut(&mesh, &[2, 0], &[0, 0], &options),
            Err(GraphCutError::InvalidParameter(_))
        ));
        let broken = Mesh::new(vec![[0.0; 3]], vec![vec![3]]);
        assert!(matches!(
            mesh_graphcut(&broken, &[0], &[0], &options),
            Err(GraphCutError::InvalidParameter(_))
        ));
    }
}
