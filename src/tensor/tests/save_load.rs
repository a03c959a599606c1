use crate::errors::TensorError;
use crate::tensor::Tensor;
use std::io::Cursor;

#[test]
fn test_save_and_load() -> Result<(), TensorError> {
    let tensor = Tensor::new(&[0.5, -1.25, 3.0, 4.0, 5.5, 6.0], &[1, 1, 2, 3])?;
    let mut buffer = Vec::new();
    tensor.save(&mut buffer)?;

    let loaded = Tensor::load(&mut Cursor::new(buffer))?;
    assert_eq!(loaded, tensor);
    Ok(())
}

#[test]
fn test_load_garbage_fails() {
    let mut cursor = Cursor::new(vec![0xFFu8; 3]);
    assert!(matches!(
        Tensor::load(&mut cursor),
        Err(TensorError::Serialization(_))
    ));
}
