use approx::assert_abs_diff_eq;
use ndarray::prelude::*;

use super::*;
use crate::generate_binary_structure;

fn full2() -> Array2<bool> {
    Array2::from_elem((3, 3), true)
}

mod labeling {
    use super::*;

    fn blobs() -> Array2<u8> {
        array![
            [1, 1, 0, 0, 0],
            [0, 1, 0, 0, 1],
            [0, 0, 1, 0, 1],
            [1, 0, 0, 0, 0]
        ]
    }

    #[test]
    fn face_connectivity() {
        let (labels, count) = blobs().label(None).unwrap();
        assert_eq!(count, 4);
        assert_eq!(
            labels,
            array![
                [1, 1, 0, 0, 0],
                [0, 1, 0, 0, 2],
                [0, 0, 3, 0, 2],
                [4, 0, 0, 0, 0]
            ]
        );
    }

    #[test]
    fn full_connectivity_joins_diagonals() {
        let full = full2();
        let (labels, count) = blobs().label(Some(full.view())).unwrap();
        assert_eq!(count, 3);
        assert_eq!(
            labels,
            array![
                [1, 1, 0, 0, 0],
                [0, 1, 0, 0, 2],
                [0, 0, 1, 0, 2],
                [3, 0, 0, 0, 0]
            ]
        );
    }

    #[test]
    fn generated_structure_matches_default() {
        let cross = generate_binary_structure(2, 1).into_dimensionality::<Ix2>().unwrap();
        assert_eq!(
            blobs().label(Some(cross.view())).unwrap(),
            blobs().label(None).unwrap()
        );
    }

    #[test]
    fn one_dimensional_and_scalar() {
        let (labels, count) = array![1.0, 0.0, 1.0, 1.0, 0.0, 1.0].label(None).unwrap();
        assert_eq!(labels, array![1, 0, 2, 2, 0, 3]);
        assert_eq!(count, 3);

        assert_eq!(arr0(5u8).label(None).unwrap(), (arr0(1), 1));
        assert_eq!(arr0(0u8).label(None).unwrap(), (arr0(0), 0));
    }

    #[test]
    fn background_only() {
        let (labels, count) = Array3::<f32>::zeros((2, 3, 4)).label(None).unwrap();
        assert_eq!(count, 0);
        assert!(labels.iter().all(|&l| l == 0));
    }

    #[test]
    fn invalid_structures() {
        let small = Array2::from_elem((2, 2), true);
        assert!(matches!(
            blobs().label(Some(small.view())),
            Err(NdImageError::InvalidStructure(_))
        ));
        let lopsided = array![[true, false, false], [false, true, false], [false, false, false]];
        assert!(matches!(
            blobs().label(Some(lopsided.view())),
            Err(NdImageError::InvalidStructure(_))
        ));
    }

    #[test]
    fn bounding_boxes() {
        let (labels, _) = blobs().label(None).unwrap();
        assert_eq!(
            labels.find_objects(),
            vec![
                Some([0..2, 0..2]),
                Some([1..3, 4..5]),
                Some([2..3, 2..3]),
                Some([3..4, 0..1]),
            ]
        );
    }

    #[test]
    fn missing_labels_leave_gaps() {
        assert_eq!(
            array![0u32, 3, 3, 0, 1].find_objects(),
            vec![Some([4..5]), None, Some([1..3])]
        );
        assert!(Array1::<usize>::zeros(4).find_objects().is_empty());
    }
}

mod reducers {
    use super::*;

    fn image() -> Array2<f64> {
        array![
            [1.0, 2.0, 0.0, 0.0],
            [5.0, 3.0, 0.0, 4.0],
            [0.0, 0.0, 0.0, 7.0],
            [9.0, 3.0, 0.0, 0.0]
        ]
    }

    fn regions() -> Array2<usize> {
        array![[1, 1, 0, 0], [1, 1, 0, 2], [0, 0, 0, 2], [3, 3, 0, 0]]
    }

    const INDEX: &[usize] = &[1, 2, 3, 4];

    #[test]
    fn sums_and_means() {
        let (image, labels) = (image(), regions());
        assert_eq!(
            image.sum_labels(Some(labels.view()), Some(INDEX)).unwrap(),
            vec![11.0, 11.0, 12.0, 0.0]
        );
        let mean = image.mean_labels(Some(labels.view()), Some(INDEX)).unwrap();
        assert_eq!(mean[..3], [2.75, 5.5, 6.0]);
        assert!(mean[3].is_nan());
    }

    #[test]
    fn spread() {
        let (image, labels) = (image(), regions());
        let variance = image.variance(Some(labels.view()), Some(INDEX)).unwrap();
        let expected = [8.75 / 3.0, 4.5, 18.0, 0.0];
        for (v, e) in variance.iter().zip(expected) {
            assert_abs_diff_eq!(*v, e, epsilon = 1e-12);
        }
        let deviation = image.standard_deviation(Some(labels.view()), Some(INDEX)).unwrap();
        for (d, e) in deviation.iter().zip(expected) {
            assert_abs_diff_eq!(*d, e.sqrt(), epsilon = 1e-12);
        }
    }

    #[test]
    fn extremes_and_positions() {
        let (image, labels) = (image(), regions());
        let labels = Some(labels.view());
        assert_eq!(image.minimum(labels, Some(INDEX)).unwrap(), vec![1.0, 4.0, 3.0, 0.0]);
        assert_eq!(image.maximum(labels, Some(INDEX)).unwrap(), vec![5.0, 7.0, 9.0, 0.0]);
        assert_eq!(
            image.minimum_position(labels, Some(INDEX)).unwrap(),
            vec![[0, 0], [1, 3], [3, 1], [0, 0]]
        );
        assert_eq!(
            image.maximum_position(labels, Some(INDEX)).unwrap(),
            vec![[1, 0], [2, 3], [3, 0], [0, 0]]
        );
    }

    #[test]
    fn extrema_agrees_with_single_reducers() {
        let (image, labels) = (image(), regions());
        let labels = Some(labels.view());
        let extrema = image.extrema(labels, Some(INDEX)).unwrap();
        let min = image.minimum(labels, Some(INDEX)).unwrap();
        let max = image.maximum(labels, Some(INDEX)).unwrap();
        let min_pos = image.minimum_position(labels, Some(INDEX)).unwrap();
        let max_pos = image.maximum_position(labels, Some(INDEX)).unwrap();
        for (i, e) in extrema.iter().enumerate() {
            assert_eq!(
                *e,
                Extrema {
                    min: min[i],
                    max: max[i],
                    min_position: min_pos[i],
                    max_position: max_pos[i],
                }
            );
        }
    }

    #[test]
    fn first_occurrence_wins() {
        let data = array![2i32, 0, 5, 0, 5];
        assert_eq!(data.minimum_position(None, None).unwrap(), vec![[1]]);
        assert_eq!(data.maximum_position(None, None).unwrap(), vec![[2]]);
    }

    #[test]
    fn centers_of_mass() {
        let (image, labels) = (image(), regions());
        let centers = image.center_of_mass(Some(labels.view()), Some(&[1, 2][..])).unwrap();
        assert_abs_diff_eq!(centers[0][0], 8.0 / 11.0, epsilon = 1e-12);
        assert_abs_diff_eq!(centers[0][1], 5.0 / 11.0, epsilon = 1e-12);
        assert_abs_diff_eq!(centers[1][0], 18.0 / 11.0, epsilon = 1e-12);
        assert_abs_diff_eq!(centers[1][1], 3.0, epsilon = 1e-12);

        let center = array![[0.0, 0.0], [0.0, 1.0], [0.0, 1.0]].center_of_mass(None, None).unwrap();
        assert_eq!(center, vec![[1.5, 1.0]]);
    }

    #[test]
    fn without_index_or_labels() {
        let (image, labels) = (image(), regions());
        assert_eq!(image.sum_labels(Some(labels.view()), None).unwrap(), vec![34.0]);
        assert_eq!(image.mean_labels(Some(labels.view()), None).unwrap(), vec![34.0 / 8.0]);
        assert_eq!(image.mean_labels(None, None).unwrap(), vec![34.0 / 16.0]);
        assert_eq!(image.sum_labels(None, Some(INDEX)).unwrap(), vec![34.0]);
    }

    #[test]
    fn repeated_and_missing_ids() {
        let (image, labels) = (image(), regions());
        assert_eq!(
            image.sum_labels(Some(labels.view()), Some(&[2, 9, 2][..])).unwrap(),
            vec![11.0, 0.0, 11.0]
        );
        assert_eq!(image.sum_labels(Some(labels.view()), Some(&[][..])).unwrap(), Vec::<f64>::new());
    }

    #[test]
    fn labels_broadcast_to_the_input() {
        let image = image();
        let columns = array![[1, 0, 2, 2]];
        assert_eq!(
            image.sum_labels(Some(columns.view()), Some(&[1, 2][..])).unwrap(),
            vec![15.0, 11.0]
        );

        let wrong = Array2::<usize>::zeros((3, 4));
        assert!(matches!(
            image.sum_labels(Some(wrong.view()), None),
            Err(NdImageError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn integer_input() {
        let data = array![[1u8, 2], [3, 250]];
        let labels = array![[1, 2], [1, 2]];
        assert_eq!(
            data.sum_labels(Some(labels.view()), Some(&[1, 2][..])).unwrap(),
            vec![4.0, 252.0]
        );
    }

    #[test]
    fn histograms() {
        let data = array![0.0, 0.5, 1.0, 1.5, 2.0, 2.5];
        assert_eq!(data.histogram(0.0, 2.0, 4, None, None).unwrap(), vec![vec![1, 1, 1, 2]]);

        let labels = array![1, 1, 1, 2, 2, 2];
        assert_eq!(
            data.histogram(0.0, 2.0, 4, Some(labels.view()), Some(&[2, 1][..])).unwrap(),
            vec![vec![0, 0, 0, 2], vec![1, 1, 1, 0]]
        );
    }

    #[test]
    fn invalid_histograms() {
        let data = array![1.0, 2.0];
        assert!(matches!(
            data.histogram(0.0, 1.0, 0, None, None),
            Err(NdImageError::InvalidHistogram { bins: 0, .. })
        ));
        assert!(matches!(
            data.histogram(1.0, 1.0, 3, None, None),
            Err(NdImageError::InvalidHistogram { .. })
        ));
    }
}

mod watershed {
    use super::*;

    fn ring() -> Array2<u8> {
        array![
            [0, 0, 0, 0, 0, 0, 0],
            [0, 1, 1, 1, 1, 1, 0],
            [0, 1, 0, 0, 0, 1, 0],
            [0, 1, 0, 0, 0, 1, 0],
            [0, 1, 0, 0, 0, 1, 0],
            [0, 1, 1, 1, 1, 1, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0]
        ]
    }

    fn ring_markers() -> Array2<i32> {
        let mut markers = Array2::zeros((8, 7));
        markers[[0, 0]] = -1;
        markers[[3, 3]] = 1;
        markers
    }

    fn divided() -> Array2<u8> {
        array![
            [0, 0, 0, 0, 0, 0, 0],
            [0, 1, 1, 1, 1, 1, 0],
            [0, 1, 0, 1, 0, 1, 0],
            [0, 1, 0, 1, 0, 1, 0],
            [0, 1, 0, 1, 0, 1, 0],
            [0, 1, 1, 1, 1, 1, 0],
            [0, 0, 0, 0, 0, 0, 0]
        ]
    }

    fn divided_markers(left: i32, right: i32) -> Array2<i32> {
        let mut markers = Array2::zeros((7, 7));
        markers[[3, 2]] = left;
        markers[[3, 4]] = right;
        markers[[6, 6]] = -1;
        markers
    }

    #[test]
    fn ring_with_full_connectivity() {
        let full = full2();
        let res = ring().watershed_ift(&ring_markers(), Some(full.view())).unwrap();
        assert_eq!(
            res,
            array![
                [-1, -1, -1, -1, -1, -1, -1],
                [-1, 1, 1, 1, 1, 1, -1],
                [-1, 1, 1, 1, 1, 1, -1],
                [-1, 1, 1, 1, 1, 1, -1],
                [-1, 1, 1, 1, 1, 1, -1],
                [-1, 1, 1, 1, 1, 1, -1],
                [-1, -1, -1, -1, -1, -1, -1],
                [-1, -1, -1, -1, -1, -1, -1]
            ]
        );
    }

    #[test]
    fn ring_with_face_connectivity() {
        let res = ring().watershed_ift(&ring_markers(), None).unwrap();
        assert_eq!(
            res,
            array![
                [-1, -1, -1, -1, -1, -1, -1],
                [-1, -1, 1, 1, 1, -1, -1],
                [-1, 1, 1, 1, 1, 1, -1],
                [-1, 1, 1, 1, 1, 1, -1],
                [-1, 1, 1, 1, 1, 1, -1],
                [-1, -1, 1, 1, 1, -1, -1],
                [-1, -1, -1, -1, -1, -1, -1],
                [-1, -1, -1, -1, -1, -1, -1]
            ]
        );
    }

    #[test]
    fn two_basins_face_connectivity() {
        let res = divided().watershed_ift(&divided_markers(2, 3), None).unwrap();
        assert_eq!(
            res,
            array![
                [-1, -1, -1, -1, -1, -1, -1],
                [-1, -1, 2, -1, 3, -1, -1],
                [-1, 2, 2, 3, 3, 3, -1],
                [-1, 2, 2, 3, 3, 3, -1],
                [-1, 2, 2, 3, 3, 3, -1],
                [-1, -1, 2, -1, 3, -1, -1],
                [-1, -1, -1, -1, -1, -1, -1]
            ]
        );
    }

    #[test]
    fn two_basins_full_connectivity() {
        let full = full2();
        let interior = |left: i32, right: i32| {
            let mut expected = Array2::from_elem((7, 7), -1);
            expected.slice_mut(s![1..6, 1..3]).fill(left);
            expected.slice_mut(s![1..6, 3..6]).fill(right);
            expected
        };
        let res = divided().watershed_ift(&divided_markers(2, 3), Some(full.view())).unwrap();
        assert_eq!(res, interior(2, 3));

        // the later marker in raster order claims the shared ridge either way
        let res = divided().watershed_ift(&divided_markers(3, 2), Some(full.view())).unwrap();
        assert_eq!(res, interior(3, 2));
    }

    #[test]
    fn open_basin() {
        let data: Array2<u16> = array![
            [0, 1, 0, 0, 0, 1, 0],
            [0, 1, 0, 0, 0, 1, 0],
            [0, 1, 0, 0, 0, 1, 0],
            [0, 1, 1, 1, 1, 1, 0],
            [0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0]
        ];
        let mut markers = Array2::<i32>::zeros((6, 7));
        markers[[0, 0]] = -1;
        markers[[1, 3]] = 1;
        let full = full2();
        let res = data.watershed_ift(&markers, Some(full.view())).unwrap();
        let mut expected = Array2::from_elem((6, 7), -1);
        expected.slice_mut(s![0..4, 1..6]).fill(1);
        assert_eq!(res, expected);
    }

    #[test]
    fn unreached_cells_stay_unlabeled() {
        let data = Array2::<u8>::zeros((2, 3));
        let markers = Array2::<i32>::zeros((2, 3));
        assert_eq!(data.watershed_ift(&markers, None).unwrap(), markers);
    }

    #[test]
    fn markers_must_match() {
        let markers = Array2::<i32>::zeros((7, 7));
        assert!(matches!(
            ring().watershed_ift(&markers, None),
            Err(NdImageError::ShapeMismatch { .. })
        ));
    }
}
