use crate::errors::TensorError;
use crate::tensor::Tensor;

#[test]
fn test_concat_last_axis_nhwc() -> Result<(), TensorError> {
    // [1, 1, 2, 1] 与 [1, 1, 2, 2] 沿通道拼接 -> [1, 1, 2, 3]
    let a = Tensor::new(&[1., 2.], &[1, 1, 2, 1])?;
    let b = Tensor::new(&[10., 11., 20., 21.], &[1, 1, 2, 2])?;
    let c = Tensor::concat_last_axis(&[&a, &b])?;
    assert_eq!(c.shape(), &[1, 1, 2, 3]);
    assert_eq!(c.to_vec(), vec![1., 10., 11., 2., 20., 21.]);
    Ok(())
}

#[test]
fn test_concat_last_axis_flat() -> Result<(), TensorError> {
    let heads: Vec<Tensor> = (0..3)
        .map(|i| Tensor::new(&[i as f32, 10.0 + i as f32], &[2, 1]))
        .collect::<Result<_, _>>()?;
    let refs: Vec<&Tensor> = heads.iter().collect();
    let c = Tensor::concat_last_axis(&refs)?;
    assert_eq!(c.shape(), &[2, 3]);
    assert_eq!(c.to_vec(), vec![0., 1., 2., 10., 11., 12.]);
    Ok(())
}

#[test]
fn test_concat_single_is_identity() -> Result<(), TensorError> {
    let a = Tensor::new(&[1., 2., 3., 4.], &[2, 2])?;
    assert_eq!(Tensor::concat_last_axis(&[&a])?, a);
    Ok(())
}

#[test]
fn test_concat_errors() {
    assert_eq!(Tensor::concat_last_axis(&[]), Err(TensorError::EmptyList));

    let a = Tensor::zeros(&[1, 2, 2, 1]);
    let b = Tensor::zeros(&[1, 3, 3, 1]);
    assert_eq!(
        Tensor::concat_last_axis(&[&a, &b]),
        Err(TensorError::IncompatibleShape(vec![1, 2, 2, 1], vec![1, 3, 3, 1]))
    );
}
