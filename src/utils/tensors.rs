use burn::tensor::{backend::Backend, Data, ElementConversion, Int, Shape, Tensor};

/// Build an integer tensor of the given shape from row-major values
pub fn int_tensor<B: Backend, const D: usize>(
    values: Vec<i64>,
    shape: [usize; D],
    device: &B::Device,
) -> Tensor<B, D, Int> {
    let data: Data<B::IntElem, D> = Data::new(
        values.into_iter().map(|value| value.elem()).collect(),
        Shape::new(shape),
    );

    Tensor::from_data(data, device)
}

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn lays_out_values_row_major() {
        let device = Default::default();
        let tensor = int_tensor::<NdArray, 2>(vec![1, 2, 3, 4, 5, 6], [2, 3], &device);

        assert_eq!(tensor.dims(), [2, 3]);
        assert_eq!(
            tensor.slice([1..2, 0..3]).into_data().convert::<i64>().value,
            vec![4, 5, 6]
        );
    }
}
