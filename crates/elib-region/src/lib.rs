//! elib-region - Connected components and the mask/region model
//!
//! This crate provides:
//!
//! - **Connected components** ([`conncomp`]): flood-fill labelling of
//!   positive voxels under small or large connectivity
//! - **Masks** ([`Mask`], [`MaskList`]): the point-set form of labelled
//!   regions, with set algebra, rasterization and outline tracing
//! - **Components measurements** ([`measurements`]): label volume → mask list
//! - **Intensity distributions** ([`distribution`]): per-region histograms
//!
//! A label volume and its mask list are two views of the same partition:
//!
//! ```
//! use elib_core::Volume;
//! use elib_region::ComponentsMeasurements;
//!
//! let labels = Volume::from_vec(&[3, 2], 16, 1, vec![0, 2, 2, 5, 0, 0]).unwrap();
//! let masks = ComponentsMeasurements::new(&labels).unwrap().into_masks();
//! assert_eq!(masks.len(), 2);
//! assert_eq!(masks.to_volume().unwrap(), labels);
//! ```

pub mod conncomp;
pub mod distribution;
pub mod error;
pub mod mask;
pub mod mask_list;
pub mod measurements;
pub mod outline;

pub use conncomp::{
    ComponentOptions, ConnectedComponent, Connectivity, components_of, count_components,
    find_components, forward_half, label_components, neighbourhood,
};
pub use distribution::{IntensityDistributions, MAX_HISTOGRAM_BITS, intensity_distribution};
pub use error::{RegionError, RegionResult};
pub use mask::Mask;
pub use mask_list::MaskList;
pub use measurements::{ComponentsMeasurements, ObjectStats};
pub use outline::{Direction, Outline};
