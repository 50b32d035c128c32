use anyhow::Result;

use hlsflow::WeightTensor;

#[test]
fn assign_rejects_shape_data_mismatch() {
    assert!(WeightTensor::new(vec![2, 3], vec![0.0; 5]).is_err());
    let mut tensor = WeightTensor::new(vec![2, 3], vec![0.0; 6]).unwrap();
    assert!(tensor.assign(vec![4], vec![0.0; 6]).is_err());
}

#[test]
fn element_count_tracks_shape() -> Result<()> {
    let mut tensor = WeightTensor::new(vec![2, 3], (0..6).map(|v| v as f64).collect())?;
    assert_eq!(tensor.len(), 6);
    tensor.assign(vec![6], (0..6).map(|v| v as f64).collect())?;
    assert_eq!(tensor.len(), 6);
    assert_eq!(tensor.rank(), 1);
    Ok(())
}

#[test]
fn permute_reorders_axes() -> Result<()> {
    // [[0, 1, 2], [3, 4, 5]] -> transpose
    let tensor = WeightTensor::new(vec![2, 3], (0..6).map(|v| v as f64).collect())?;
    let transposed = tensor.permute(&[1, 0])?;
    assert_eq!(transposed.shape(), &[3, 2]);
    assert_eq!(transposed.data(), &[0.0, 3.0, 1.0, 4.0, 2.0, 5.0]);

    let rank3 = WeightTensor::new(vec![2, 3, 4], (0..24).map(|v| v as f64).collect())?;
    let permuted = rank3.permute(&[2, 0, 1])?;
    assert_eq!(permuted.shape(), &[4, 2, 3]);
    for a in 0..2 {
        for b in 0..3 {
            for c in 0..4 {
                assert_eq!(permuted.at(&[c, a, b])?, rank3.at(&[a, b, c])?);
            }
        }
    }
    Ok(())
}

#[test]
fn permute_rejects_bad_axes() {
    let tensor = WeightTensor::new(vec![2, 3], vec![0.0; 6]).unwrap();
    assert!(tensor.permute(&[0]).is_err());
    assert!(tensor.permute(&[0, 0]).is_err());
    assert!(tensor.permute(&[0, 2]).is_err());
}

#[test]
fn expand_rank2_to_rank4() -> Result<()> {
    let tensor = WeightTensor::new(vec![2, 3], (0..6).map(|v| v as f64).collect())?;
    let expanded = tensor.expand_to_rank4()?;
    assert_eq!(expanded.shape(), &[1, 1, 2, 3]);
    assert_eq!(expanded.data(), tensor.data());

    let rank4 = WeightTensor::new(vec![1, 1, 2, 3], vec![0.0; 6])?;
    assert!(rank4.expand_to_rank4().is_err());
    Ok(())
}
