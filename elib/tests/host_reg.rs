//! Host entry point regression test
//!
//! Run with:
//! ```
//! cargo test -p elib --test host_reg
//! ```

use elib::Parameters;
use elib::host::{self, HostArray, HostData, HostMeasurements, LogChannel};
use elib_test::RegParams;

fn integers(dimensions: &[usize], bit_depth: u32, data: Vec<i64>) -> HostArray {
    HostArray::new(dimensions, bit_depth, 1, HostData::Integer(data))
}

#[test]
fn host_reg() {
    let mut rp = RegParams::new("host");
    let mut messages: Vec<String> = Vec::new();

    // -----------------------------------------------------------
    // Binary graph cut
    // -----------------------------------------------------------
    let image = HostArray::new(&[2, 2], 8, 1, HostData::Double(vec![0.0, 255.0, 0.0, 255.0]));
    let params = Parameters::new()
        .with_double("C0", 0.0)
        .with_double("C1", 1.0)
        .with_double("Lambda", 0.5);
    let result = host::graphcut(&image, &params, &mut messages);
    rp.check(result.is_none(), "no result without Sigma"); // 1
    rp.compare_strings(b"missing parameter: Sigma", messages[0].as_bytes()); // 2

    let params = params.with_double("Sigma", 1.0);
    let binary = host::graphcut(&image, &params, &mut messages).unwrap();
    rp.check(binary.data == HostData::Integer(vec![0, 1, 0, 1]), "2x2 cut"); // 3
    rp.check(binary.dimensions == [2, 2] && binary.channels == 1, "cut shape"); // 4

    let mut background = vec![0.0; 256];
    let mut foreground = vec![0.0; 256];
    background[0] = 1.0;
    foreground[255] = 1.0;
    let binary = host::graphcut_with_histograms(
        &image,
        &background,
        &foreground,
        &params,
        &mut LogChannel,
    )
    .unwrap();
    rp.check(binary.data == HostData::Integer(vec![0, 1, 0, 1]), "2x2 histogram cut"); // 5

    // -----------------------------------------------------------
    // Connected components: two diagonal voxels
    // -----------------------------------------------------------
    let diagonal = integers(&[2, 2], 8, vec![1, 0, 0, 1]);
    let large = host::connected_components(&diagonal, &Parameters::new(), &mut messages).unwrap();
    rp.check(large.data == HostData::Integer(vec![1, 0, 0, 1]), "large joins"); // 6
    let small = Parameters::new()
        .with_integer("Connectivity", 0)
        .with_integer("LabelOffset", 5);
    let small = host::connected_components(&diagonal, &small, &mut messages).unwrap();
    rp.check(small.data == HostData::Integer(vec![5, 0, 0, 6]), "small splits"); // 7
    rp.compare_values(16.0, f64::from(small.bit_depth), 0.0); // 8

    // -----------------------------------------------------------
    // Components measurements: 1-based interleaved coordinates
    // -----------------------------------------------------------
    let labels = integers(&[3, 2], 16, vec![0, 4, 4, 2, 0, 0]);
    let measured = host::components_measurements(&labels, &mut messages).unwrap();
    let expected = HostMeasurements {
        labels: vec![2, 4],
        masks: vec![vec![1, 2], vec![2, 1, 3, 1]],
    };
    rp.check(measured == expected, "measurements"); // 9
    rp.compare_values(2.0, measured.num_objects() as f64, 0.0); // 10

    let volume = integers(&[2, 1, 2], 16, vec![0, 3, 3, 0]);
    let measured = host::components_measurements(&volume, &mut messages).unwrap();
    rp.check(measured.masks == [vec![2, 1, 1, 1, 1, 2]], "3D coordinates"); // 11

    // -----------------------------------------------------------
    // Multi-label graph cut: label 1 never created
    // -----------------------------------------------------------
    let image = integers(&[4, 1], 8, vec![20, 20, 230, 230]);
    let prior = integers(&[4, 1], 16, vec![0, 0, 0, 3]);
    let params = Parameters::new()
        .with_integer("NumberLabels", 8)
        .with_double("C0", 0.1)
        .with_double("C1", 0.9)
        .with_double("Lambda", 1.0)
        .with_double("Sigma", 1.0)
        .with_double("Mu", 0.3);
    let refined = host::multilabel_graphcut(&image, &prior, &params, &mut messages).unwrap();
    rp.check(refined.data == HostData::Integer(vec![0, 0, 3, 3]), "object grows"); // 12
    let adaptive =
        host::adaptive_multilabel_graphcut(&image, &prior, &params, &mut messages).unwrap();
    rp.check(
        matches!(&adaptive.data, HostData::Integer(v) if !v.contains(&1)),
        "adaptive quarantine",
    ); // 13

    // Every failure so far was reported exactly once
    rp.compare_values(1.0, messages.len() as f64, 0.0); // 14

    let bad_prior = integers(&[2, 2], 16, vec![0; 4]);
    let result = host::multilabel_graphcut(&image, &bad_prior, &params, &mut messages);
    rp.check(result.is_none() && messages.len() == 2, "shape mismatch reported"); // 15

    // Two components cannot both be labelled from i32::MAX
    let pair = integers(&[3, 1], 8, vec![1, 0, 1]);
    let crowded = Parameters::new()
        .with_integer("Connectivity", 0)
        .with_integer("LabelOffset", i64::from(i32::MAX));
    let result = host::connected_components(&pair, &crowded, &mut messages);
    rp.check(result.is_none(), "label overflow gives no result"); // 16
    rp.check(
        messages.len() == 3 && messages[2].starts_with("invalid parameters: label offset"),
        "label overflow reported",
    ); // 17

    assert!(rp.cleanup(), "host regression test failed");
}
