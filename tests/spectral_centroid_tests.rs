use modemscope::spectral::{center_frequency, center_frequency_with_window, SpectralError};

#[test]
fn test_single_dominant_peak() {
    let frequencies = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
    let powers_db = [-30.0, -30.0, -5.0, -30.0, -30.0, -30.0];

    let centroid = center_frequency(&frequencies, &powers_db).unwrap();
    assert!((centroid - 2.0).abs() < 1e-9);
}

#[test]
fn test_flat_spectrum_gives_plain_mean() {
    let frequencies = [100.0, 250.0, 400.0, 1000.0];
    let powers_db = [-10.0; 4];

    let centroid = center_frequency(&frequencies, &powers_db).unwrap();
    let mean = frequencies.iter().sum::<f64>() / frequencies.len() as f64;
    assert!((centroid - mean).abs() < 1e-9);
}

#[test]
fn test_linear_weighting_differs_from_arithmetic_mean() {
    // Both samples pass the threshold; the 10 dB stronger one carries 10x the energy.
    let frequencies = [1000.0, 2000.0];
    let powers_db = [0.0, -10.0];

    let centroid = center_frequency(&frequencies, &powers_db).unwrap();
    let expected = (1000.0 * 1.0 + 2000.0 * 0.1) / 1.1;
    assert!((centroid - expected).abs() < 1e-6);
    assert!((centroid - 1500.0).abs() > 100.0);
}

#[test]
fn test_symmetric_skirts_center_on_peak() {
    let frequencies = [990.0, 995.0, 1000.0, 1005.0, 1010.0];
    let powers_db = [-12.0, -6.0, 0.0, -6.0, -12.0];

    let centroid = center_frequency(&frequencies, &powers_db).unwrap();
    assert!((centroid - 1000.0).abs() < 1e-9);
}

#[test]
fn test_non_uniform_spacing() {
    let frequencies = [0.0, 0.5, 3.0, 10.0];
    let powers_db = [-100.0, -100.0, 0.0, -100.0];
    assert_eq!(center_frequency(&frequencies, &powers_db).unwrap(), 3.0);
}

#[test]
fn test_custom_window() {
    let frequencies = [0.0, 10.0];
    let powers_db = [0.0, -20.0];

    assert_eq!(center_frequency_with_window(&frequencies, &powers_db, 15.0).unwrap(), 0.0);
    let wide = center_frequency_with_window(&frequencies, &powers_db, 25.0).unwrap();
    assert!((wide - 10.0 * 0.01 / 1.01).abs() < 1e-9);
}

#[test]
fn test_invalid_input() {
    assert_eq!(center_frequency(&[], &[]), Err(SpectralError::Empty));
    assert!(matches!(
        center_frequency(&[1.0], &[0.0, 1.0]),
        Err(SpectralError::LengthMismatch { left: 1, right: 2 })
    ));
}
