//! Components measurements regression test
//!
//! Run with:
//! ```
//! cargo test -p elib-region --test measurements_reg
//! ```

use elib_core::{Point, Volume};
use elib_region::{ComponentOptions, ComponentsMeasurements, Connectivity, label_components};
use elib_test::RegParams;

fn blobs_3d() -> Volume<u16> {
    let mut vol = Volume::new(&[5, 4, 3], 12, 1).unwrap();
    for z in 0..2 {
        for y in 0..2 {
            vol.set(&Point::new(0, y, z), 4000).unwrap();
        }
    }
    vol.set(&Point::new(4, 3, 2), 17).unwrap();
    vol.set(&Point::new(3, 3, 2), 17).unwrap();
    vol.set(&Point::new(2, 0, 1), 1).unwrap();
    vol
}

#[test]
fn measurements_reg() {
    let mut rp = RegParams::new("measurements");

    let options = ComponentOptions::new(Connectivity::Small);
    let labelled = label_components(&blobs_3d(), &options).unwrap();
    let cm = ComponentsMeasurements::new(&labelled).unwrap();
    eprintln!("{}", cm.masks());

    rp.compare_values(3.0, cm.num_objects() as f64, 0.0); // 1
    rp.compare_values(4.0, cm.masks().get(1).unwrap().len() as f64, 0.0); // 2

    // -----------------------------------------------------------
    // Rasterize / bucket round trip
    // -----------------------------------------------------------
    let back = cm.masks().to_volume().unwrap();
    rp.compare_volumes(&labelled, &back); // 3

    // Relabelled lists rasterize with the new ids
    let mut shifted = cm.clone().into_masks();
    shifted.relabel(10).unwrap();
    let relabelled = shifted.to_volume().unwrap();
    rp.compare_values(13.0, relabelled.max().unwrap() as f64, 0.0); // 4
    rp.compare_values(
        12.0,
        relabelled.get(&Point::new(2, 0, 1)).unwrap() as f64,
        0.0,
    ); // 5

    // -----------------------------------------------------------
    // Object statistics
    // -----------------------------------------------------------
    let stats = cm.object_stats();
    rp.compare_values(0.5, stats[0].centroid[1], 1e-12); // 6
    rp.compare_values(0.5, stats[0].centroid[2], 1e-12); // 7
    rp.compare_values(2.0, stats[2].size as f64, 0.0); // 8
    rp.compare_values(3.5, stats[2].centroid[0], 1e-12); // 9

    assert!(rp.cleanup(), "measurements regression test failed");
}
