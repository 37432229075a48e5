use approx::assert_abs_diff_eq;
use ndarray::prelude::*;

use super::*;

const ORDERS: std::ops::RangeInclusive<usize> = 0..=5;

fn grid() -> Array2<f64> {
    array![[4.0, 1.0, 3.0, 2.0], [7.0, 6.0, 8.0, 5.0], [3.0, 5.0, 3.0, 6.0]]
}

// ===== Spline Filter Tests =====

mod spline_filters {
    use super::*;

    #[test]
    fn low_orders_copy_the_input() {
        let data = grid();
        for order in 0..=1 {
            assert_eq!(data.spline_filter(order).unwrap(), data);
            assert_eq!(data.spline_filter1d(order, 1).unwrap(), data);
        }
    }

    #[test]
    fn constant_input_is_unchanged() {
        let data = Array2::<f64>::ones((4, 5));
        for order in ORDERS {
            let res = data.spline_filter(order).unwrap();
            assert_abs_diff_eq!(res, data, epsilon = 1e-12);
        }
    }

    #[test]
    fn separable_along_axes() {
        let data = grid();
        for order in 2..=5 {
            let both = data.spline_filter(order).unwrap();
            let stepwise = data
                .spline_filter1d(order, 0)
                .unwrap()
                .spline_filter1d(order, -1)
                .unwrap();
            assert_abs_diff_eq!(both, stepwise, epsilon = 1e-12);
        }
    }

    #[test]
    fn integer_input() {
        let data = array![4u8, 1, 3, 2];
        let res = data.spline_filter(3).unwrap();
        let expected = array![4.0, 1.0, 3.0, 2.0].spline_filter(3).unwrap();
        assert_abs_diff_eq!(res, expected, epsilon = 1e-12);
    }

    #[test]
    fn invalid_arguments() {
        let data = grid();
        assert!(matches!(
            data.spline_filter(6),
            Err(NdImageError::UnsupportedOrder(6))
        ));
        assert!(matches!(
            data.spline_filter1d(3, 2),
            Err(NdImageError::AxisOutOfRange { axis: 2, ndim: 2 })
        ));
    }
}

// ===== Shift Tests =====

mod shift {
    use super::*;

    #[test]
    fn integer_shifts() {
        for order in ORDERS {
            let resample = Resample::new().order(order);

            let res = array![1.0].shift(1.0, &resample).unwrap();
            assert_abs_diff_eq!(res, array![0.0], epsilon = 1e-10);

            let res = array![1.0, 1.0, 1.0, 1.0].shift(-1.0, &resample).unwrap();
            assert_abs_diff_eq!(res, array![1.0, 1.0, 1.0, 0.0], epsilon = 1e-10);

            let res = array![4.0, 1.0, 3.0, 2.0].shift(1.0, &resample).unwrap();
            assert_abs_diff_eq!(res, array![0.0, 4.0, 1.0, 3.0], epsilon = 1e-10);

            let res = grid().shift([1.0, 1.0], &resample).unwrap();
            assert_abs_diff_eq!(
                res,
                array![[0.0, 0.0, 0.0, 0.0], [0.0, 4.0, 1.0, 3.0], [0.0, 7.0, 6.0, 8.0]],
                epsilon = 1e-10
            );
        }
    }

    #[test]
    fn prefiltered_coefficients() {
        for order in ORDERS {
            let coefficients = grid().spline_filter(order).unwrap();
            let res = coefficients
                .shift([1.0, 1.0], &Resample::new().order(order).prefilter(false))
                .unwrap();
            assert_abs_diff_eq!(
                res,
                array![[0.0, 0.0, 0.0, 0.0], [0.0, 4.0, 1.0, 3.0], [0.0, 7.0, 6.0, 8.0]],
                epsilon = 1e-10
            );
        }
    }

    #[test]
    fn boundary_modes() {
        let data = array![4.0, 1.0, 3.0, 2.0];
        let nearest = Resample::new().order(0).mode(BoundaryMode::Nearest);
        assert_eq!(data.shift(1.0, &nearest).unwrap(), array![4.0, 4.0, 1.0, 3.0]);

        let wrap = Resample::new().order(0).mode(BoundaryMode::Wrap);
        assert_eq!(data.shift(1.0, &wrap).unwrap(), array![2.0, 4.0, 1.0, 3.0]);

        let reflect = Resample::new().order(0).mode(BoundaryMode::Reflect);
        assert_eq!(data.shift(1.0, &reflect).unwrap(), array![4.0, 4.0, 1.0, 3.0]);

        let cubic = Resample::new().mode(BoundaryMode::Nearest);
        assert_abs_diff_eq!(
            data.shift(1.0, &cubic).unwrap(),
            array![4.0, 4.0, 1.0, 3.0],
            epsilon = 1e-10
        );

        let filled = Resample::new().order(1).mode(BoundaryMode::Constant(-1.0));
        assert_eq!(data.shift(-2.0, &filled).unwrap(), array![3.0, 2.0, -1.0, -1.0]);
    }

    #[test]
    fn half_cell_wrap() {
        let data = array![1.0, 2.0, 3.0, 4.0];
        let wrap = Resample::new().order(1).mode(BoundaryMode::Wrap);
        assert_abs_diff_eq!(data.shift(0.5, &wrap).unwrap(), array![2.5, 1.5, 2.5, 3.5], epsilon = 1e-12);
        assert_abs_diff_eq!(data.shift(-0.5, &wrap).unwrap(), array![1.5, 2.5, 3.5, 2.5], epsilon = 1e-12);
    }

    #[test]
    fn fractional_shifts() {
        let data = array![4.0, 1.0, 3.0, 2.0];
        let cases = [
            (BoundaryMode::Wrap, 1, 0.5, [3.0, 2.5, 2.0, 2.5]),
            (BoundaryMode::Wrap, 1, -0.25, [3.25, 1.5, 2.75, 2.5]),
            (BoundaryMode::Wrap, 3, 0.5, [3.1875, 2.5, 1.8125, 2.5]),
            (BoundaryMode::Wrap, 3, -0.25, [3.4609375, 1.171875, 2.9140625, 2.453125]),
            (BoundaryMode::Reflect, 1, 0.5, [4.0, 2.5, 2.0, 2.5]),
            (BoundaryMode::Reflect, 1, -0.25, [3.25, 1.5, 2.75, 2.0]),
            (BoundaryMode::Reflect, 3, 0.5, [4.723214285714, 2.178571428571, 1.8125, 2.821428571429]),
            (BoundaryMode::Reflect, 3, -0.25, [3.139508928571, 1.212053571429, 3.074776785714, 1.738839285714]),
            (BoundaryMode::Nearest, 1, 0.5, [4.0, 2.5, 2.0, 2.5]),
            (BoundaryMode::Nearest, 1, -0.25, [3.25, 1.5, 2.75, 2.0]),
            (BoundaryMode::Nearest, 3, 0.5, [4.0, 2.625, 1.75, 2.625]),
            (BoundaryMode::Nearest, 3, -0.25, [3.578125, 1.125, 2.984375, 2.0]),
        ];
        for (mode, order, shift, expected) in cases {
            let res = data.shift(shift, &Resample::new().order(order).mode(mode)).unwrap();
            assert_abs_diff_eq!(res, Array1::from(expected.to_vec()), epsilon = 1e-9);
        }
    }

    #[test]
    fn wrap_commutes_with_rotation() {
        let data = array![4.0, 1.0, 3.0, 2.0, 7.0, 6.0];
        let rotated = Array1::from_shape_fn(6, |k| data[(k + 2) % 6]);
        for order in ORDERS {
            let resample = Resample::new().order(order).mode(BoundaryMode::Wrap);
            let res = data.shift(0.3, &resample).unwrap();
            let res_rotated = rotated.shift(0.3, &resample).unwrap();
            for k in 0..6 {
                assert_abs_diff_eq!(res_rotated[k], res[(k + 2) % 6], epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn integer_outputs_are_rounded() {
        let data = array![4, 1, 3, 2];
        let res = data.shift(0.5, &Resample::new().order(1)).unwrap();
        assert_eq!(res, array![0, 3, 2, 3]);
    }

    #[test]
    fn shift_back_and_forth() {
        let data = grid();
        for order in ORDERS {
            let resample = Resample::new().order(order).mode(BoundaryMode::Wrap);
            let res = data
                .shift([1.0, -2.0], &resample)
                .unwrap()
                .shift([-1.0, 2.0], &resample)
                .unwrap();
            assert_abs_diff_eq!(res, data, epsilon = 1e-10);
        }
    }
}

// ===== Zoom Tests =====

mod zoom {
    use super::*;

    #[test]
    fn zoom_in_and_out() {
        let data = array![[1.0, 2.0, 3.0, 4.0], [5.0, 6.0, 7.0, 8.0], [9.0, 10.0, 11.0, 12.0]];
        for order in ORDERS {
            let resample = Resample::new().order(order);

            let res = array![1.0, 1.0].zoom(2.0, &resample).unwrap();
            assert_abs_diff_eq!(res, array![1.0, 1.0, 1.0, 1.0], epsilon = 1e-10);

            let res = array![1.0, 5.0, 2.0, 6.0, 3.0, 7.0, 4.0, 4.0]
                .zoom(0.5, &resample)
                .unwrap();
            assert_abs_diff_eq!(res, array![1.0, 2.0, 3.0, 4.0], epsilon = 1e-10);

            let res = array![1.0, 2.0, 3.0, 4.0].zoom(2.0, &resample).unwrap();
            assert_eq!(res.len(), 8);
            assert_abs_diff_eq!(
                res.slice(s![..;2]),
                array![1.0, 2.0, 3.0, 4.0],
                epsilon = 1e-10
            );

            let res = data.zoom([1.0, 0.5], &resample).unwrap();
            assert_abs_diff_eq!(
                res,
                array![[1.0, 3.0], [5.0, 7.0], [9.0, 11.0]],
                epsilon = 1e-10
            );

            let res = data
                .zoom(2.0, &resample)
                .unwrap()
                .zoom(0.5, &resample)
                .unwrap();
            assert_abs_diff_eq!(res, data, epsilon = 1e-10);
        }
    }

    #[test]
    fn output_shape() {
        let data = Array2::<f32>::zeros((3, 5));
        let res = data.zoom([1.5, 0.4], &Resample::new()).unwrap();
        assert_eq!(res.shape(), &[5, 2]);

        let res = data.zoom(0.0, &Resample::new()).unwrap();
        assert_eq!(res.shape(), &[0, 0]);
    }
}

// ===== Affine And Geometric Transform Tests =====

mod transforms {
    use super::*;

    #[test]
    fn affine_matrices() {
        let data = array![[1.0, 2.0, 3.0, 4.0], [5.0, 6.0, 7.0, 8.0], [9.0, 10.0, 11.0, 12.0]];
        for order in ORDERS {
            let resample = Resample::new().order(order);

            let res = array![1.0, 1.0]
                .affine_transform(&AffineMatrix::Full([[0.5]]), [0.0], [4], &resample)
                .unwrap();
            assert_abs_diff_eq!(res, array![1.0, 1.0, 1.0, 1.0], epsilon = 1e-10);

            let res = array![1.0, 1.0]
                .affine_transform(&AffineMatrix::Diagonal([0.5]), [0.0], [4], &resample)
                .unwrap();
            assert_abs_diff_eq!(res, array![1.0, 1.0, 1.0, 1.0], epsilon = 1e-10);

            let res = data
                .affine_transform(&AffineMatrix::Full([[0.0], [2.0]]), [0.0, 0.0], [2], &resample)
                .unwrap();
            assert_abs_diff_eq!(res, array![1.0, 3.0], epsilon = 1e-10);

            let res = data
                .affine_transform(&AffineMatrix::Full([[2.0], [0.0]]), [0.0, 0.0], [2], &resample)
                .unwrap();
            assert_abs_diff_eq!(res, array![1.0, 9.0], epsilon = 1e-10);
        }
    }

    #[test]
    fn affine_matches_shift() {
        let data = grid();
        for order in ORDERS {
            let resample = Resample::new().order(order);
            let shifted = data.shift([0.5, -1.25], &resample).unwrap();
            let affine = data
                .affine_transform(
                    &AffineMatrix::Full([[1.0, 0.0], [0.0, 1.0]]),
                    [-0.5, 1.25],
                    [3, 4],
                    &resample,
                )
                .unwrap();
            assert_abs_diff_eq!(shifted, affine, epsilon = 1e-10);
        }
    }

    #[test]
    fn geometric_mappings() {
        for order in ORDERS {
            let resample = Resample::new().order(order);

            let res = array![1.0, 1.0]
                .geometric_transform(|[i]| [i as f64 / 2.0], [4], &resample)
                .unwrap();
            assert_abs_diff_eq!(res, array![1.0, 1.0, 1.0, 1.0], epsilon = 1e-10);

            let res = array![1.0, 5.0, 2.0, 6.0, 3.0, 7.0, 4.0, 4.0]
                .geometric_transform(|[i]| [2.0 * i as f64], [4], &resample)
                .unwrap();
            assert_abs_diff_eq!(res, array![1.0, 2.0, 3.0, 4.0], epsilon = 1e-10);

            let data = grid();
            let res = data
                .geometric_transform(
                    |[i, j]| [i as f64 - 0.5, j as f64 - 0.5],
                    [3, 4],
                    &resample,
                )
                .unwrap();
            let shifted = data.shift([0.5, 0.5], &resample).unwrap();
            assert_abs_diff_eq!(res, shifted, epsilon = 1e-10);
        }
    }

    #[test]
    fn stateful_mapping_sees_cells_in_order() {
        let mut seen = Vec::new();
        let res = grid()
            .geometric_transform(
                |[i, j]| {
                    seen.push((i, j));
                    [i as f64, j as f64]
                },
                [2, 2],
                &Resample::new().order(0),
            )
            .unwrap();
        assert_eq!(seen, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
        assert_eq!(res, array![[4.0, 1.0], [7.0, 6.0]]);
    }

    #[test]
    fn rank_changing_mapping() {
        let data = grid();
        let res = data
            .geometric_transform(|[i]| [1.0, i as f64], [4], &Resample::new().order(1))
            .unwrap();
        assert_eq!(res, array![7.0, 6.0, 8.0, 5.0]);
    }

    #[test]
    fn map_coordinates() {
        let data = grid();
        let coordinates = array![[0.5, 1.5], [1.0, 1.0]];
        let res = data
            .map_coordinates(&coordinates, &Resample::new().order(1))
            .unwrap();
        assert_abs_diff_eq!(res, array![3.5, 5.5], epsilon = 1e-12);

        for order in ORDERS {
            let resample = Resample::new().order(order);
            let coordinates = Array3::from_shape_fn((2, 3, 4), |(axis, i, j)| {
                if axis == 0 {
                    i as f64 - 0.5
                } else {
                    j as f64 - 0.5
                }
            });
            let res = data.map_coordinates(&coordinates, &resample).unwrap();
            let shifted = data.shift([0.5, 0.5], &resample).unwrap();
            assert_abs_diff_eq!(res, shifted, epsilon = 1e-10);
        }

        let res = data
            .map_coordinates(&array![2.0, 3.0], &Resample::new())
            .unwrap();
        assert_abs_diff_eq!(res, arr0(6.0), epsilon = 1e-10);
    }

    #[test]
    fn invalid_arguments() {
        let data = grid();
        assert!(matches!(
            data.shift(1.0, &Resample::new().order(6)),
            Err(NdImageError::UnsupportedOrder(6))
        ));
        assert!(matches!(
            data.map_coordinates(&Array2::<f64>::zeros((3, 4)), &Resample::new()),
            Err(NdImageError::RankMismatch { expected: 2, found: 3 })
        ));
        assert!(matches!(
            data.affine_transform(&AffineMatrix::Diagonal([1.0, 1.0]), [0.0; 2], [4], &Resample::new()),
            Err(NdImageError::RankMismatch { expected: 2, found: 1 })
        ));
    }
}

// ===== Rotation Tests =====

mod rotate {
    use super::*;

    #[test]
    fn zero_angle_is_identity() {
        let data = array![[0.0, 0.0, 0.0, 0.0], [0.0, 1.0, 1.0, 0.0], [0.0, 0.0, 0.0, 0.0]];
        for order in ORDERS {
            let res = data
                .rotate(0.0, None, true, &Resample::new().order(order))
                .unwrap();
            assert_abs_diff_eq!(res, data, epsilon = 1e-10);
        }
    }

    #[test]
    fn quarter_turns() {
        for order in ORDERS {
            let resample = Resample::new().order(order);

            let data = array![[0.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 0.0, 0.0]];
            let res = data.rotate(90.0, None, true, &resample).unwrap();
            assert_abs_diff_eq!(
                res,
                array![[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]],
                epsilon = 1e-10
            );

            let data = array![
                [0.0, 0.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 0.0, 0.0, 0.0]
            ];
            let res = data.rotate(90.0, None, true, &resample).unwrap();
            assert_abs_diff_eq!(
                res,
                array![
                    [0.0, 0.0, 0.0],
                    [0.0, 0.0, 0.0],
                    [0.0, 1.0, 0.0],
                    [0.0, 1.0, 0.0],
                    [0.0, 0.0, 0.0]
                ],
                epsilon = 1e-10
            );

            let res = data.rotate(90.0, None, false, &resample).unwrap();
            assert_abs_diff_eq!(
                res,
                array![
                    [0.0, 0.0, 0.0, 0.0, 0.0],
                    [0.0, 0.0, 1.0, 0.0, 0.0],
                    [0.0, 0.0, 1.0, 0.0, 0.0]
                ],
                epsilon = 1e-10
            );
        }
    }

    #[test]
    fn planes_rotate_independently() {
        let data = Array3::from_shape_fn((2, 3, 5), |(k, i, j)| {
            if i == 1 && (j == 1 || j == 2 + k) {
                1.0
            } else {
                0.0
            }
        });
        let resample = Resample::new().order(1);
        let res = data.rotate(90.0, Some([2, 1]), true, &resample).unwrap();
        assert_eq!(res.shape(), &[2, 5, 3]);
        for k in 0..2 {
            let plane = data.index_axis(Axis(0), k).to_owned();
            let expected = plane.rotate(90.0, None, true, &resample).unwrap();
            assert_abs_diff_eq!(res.index_axis(Axis(0), k), expected, epsilon = 1e-10);
        }
    }

    #[test]
    fn invalid_axes() {
        let data = Array2::<f64>::zeros((3, 3));
        assert!(matches!(
            data.rotate(30.0, Some([1, -1]), true, &Resample::new()),
            Err(NdImageError::DuplicateAxis(1))
        ));
        assert!(matches!(
            data.rotate(30.0, Some([0, 2]), true, &Resample::new()),
            Err(NdImageError::AxisOutOfRange { axis: 2, ndim: 2 })
        ));
        assert!(matches!(
            array![1.0, 2.0].rotate(30.0, None, true, &Resample::new()),
            Err(NdImageError::UnsupportedRank(1))
        ));
    }
}
