//! Scoring of segmentations
//!
//! [`binary_energy`] evaluates the binary graph-cut energy of any 0/1
//! labelling, e.g. to compare a hand-made segmentation with the minimum
//! found by [`graphcut`](crate::graphcut). [`segmentation_error`] compares
//! a labelling with a ground truth object by object.

use crate::binary::{BinaryEnergyModel, BinaryOptions, check_single_channel};
use crate::error::{GraphCutError, GraphCutResult};
use elib_core::{Sample, Volume};
use elib_region::ComponentsMeasurements;

fn check_same_dimensions<T: Sample, U: Sample>(a: &Volume<T>, b: &Volume<U>) -> GraphCutResult<()> {
    if a.dimensions() != b.dimensions() {
        return Err(GraphCutError::ShapeMismatch {
            expected: a.dimensions().to_vec(),
            actual: b.dimensions().to_vec(),
        });
    }
    Ok(())
}

/// Energy of the binary labelling `binary` (0 background, anything else
/// foreground) of `image` under the model of [`BinaryOptions`].
pub fn binary_energy<T: Sample>(
    image: &Volume<T>,
    binary: &Volume<i32>,
    options: &BinaryOptions,
) -> GraphCutResult<f64> {
    check_single_channel(image)?;
    check_single_channel(binary)?;
    check_same_dimensions(image, binary)?;
    let model = BinaryEnergyModel::with_constants(options, image.bit_depth())?;
    Ok(model.evaluate(image, binary.data()))
}

/// Object-level agreement of `labels` with `ground_truth`.
///
/// Every ground-truth object (label > 0) is matched with the predicted
/// object of highest intersection-over-union; the result is the mean of
/// those best scores weighted by object size. 1 means every object was
/// found exactly, 0 that none overlaps. A ground truth without objects
/// scores 0.
pub fn segmentation_error(labels: &Volume<i32>, ground_truth: &Volume<i32>) -> GraphCutResult<f64> {
    check_same_dimensions(ground_truth, labels)?;
    let predicted = ComponentsMeasurements::new(labels)?;
    let truth = ComponentsMeasurements::new(ground_truth)?;

    let mut weighted = 0.0;
    let mut total = 0usize;
    for (_, object) in truth.masks().iter() {
        let best = predicted
            .masks()
            .iter()
            .map(|(_, candidate)| {
                let shared = object.intersection(candidate).len();
                let union = object.len() + candidate.len() - shared;
                shared as f64 / union as f64
            })
            .fold(0.0, f64::max);
        weighted += object.len() as f64 * best;
        total += object.len();
    }
    if total == 0 {
        return Ok(0.0);
    }
    Ok(weighted / total as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(data: Vec<i32>) -> Volume<i32> {
        Volume::from_vec(&[4, 2], 16, 1, data).unwrap()
    }

    #[test]
    fn test_perfect_match() {
        let gt = labels(vec![1, 1, 0, 2, 1, 1, 0, 2]);
        // Same objects under different ids
        let seg = labels(vec![5, 5, 0, 3, 5, 5, 0, 3]);
        assert!((segmentation_error(&seg, &gt).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_partial_match() {
        let gt = labels(vec![1, 1, 0, 0, 1, 1, 0, 0]);
        let seg = labels(vec![1, 1, 1, 1, 0, 0, 0, 0]);
        // |∩| = 2, |∪| = 6
        assert!((segmentation_error(&seg, &gt).unwrap() - 1.0 / 3.0).abs() < 1e-12);
        let empty = labels(vec![0; 8]);
        assert_eq!(segmentation_error(&seg, &empty).unwrap(), 0.0);
        assert_eq!(segmentation_error(&empty, &gt).unwrap(), 0.0);
    }

    #[test]
    fn test_binary_energy() {
        let image = Volume::<u8>::from_vec(&[2, 1], 8, 1, vec![0, 255]).unwrap();
        let options = BinaryOptions::new(0.0, 1.0, 0.5, 1.0);
        let split = Volume::from_vec(&[2, 1], 8, 1, vec![0, 1]).unwrap();
        let energy = binary_energy(&image, &split, &options).unwrap();
        assert!((energy - 0.5 * (-1.0f64).exp()).abs() < 1e-12);

        let wrong = Volume::<i32>::new(&[1, 2], 8, 1).unwrap();
        assert!(binary_energy(&image, &wrong, &options).is_err());
    }
}
