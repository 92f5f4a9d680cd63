#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use vase::expr::{const8, eq, read_byte, walk, Array, Expr, ExprRef, ExprVisitor};
    use vase::vase::candidates::{build_candidates, limited_values, Family};
    use vase::vase::store::{ObservedValue, ValueBundle};
    use vase::vase::VaseOptions;

    fn bundle_of(observations: &[(i64, &str)]) -> ValueBundle {
        ValueBundle {
            vars: vec![(
                "x".to_string(),
                observations
                    .iter()
                    .map(|(vtype, value)| ObservedValue {
                        vtype: *vtype,
                        value: value.to_string(),
                        ops: Vec::new(),
                    })
                    .collect(),
            )],
        }
    }

    struct ReadCounter {
        reads: usize,
    }

    impl ExprVisitor for ReadCounter {
        fn visit(&mut self, expr: &ExprRef) {
            if matches!(expr.as_ref(), Expr::Read { .. }) {
                self.reads += 1;
            }
        }
    }

    fn count_reads(expr: &ExprRef) -> usize {
        let mut counter = ReadCounter { reads: 0 };
        walk(&mut counter, expr);
        counter.reads
    }

    #[test]
    fn test_limited_values_distinct_capped_in_order() {
        let bundle = ValueBundle {
            vars: vec![
                (
                    "x".to_string(),
                    vec![
                        ObservedValue { vtype: 0, value: "5".into(), ops: vec![] },
                        ObservedValue { vtype: 0, value: "5".into(), ops: vec![] },
                        ObservedValue { vtype: 1, value: "hello".into(), ops: vec![] },
                        ObservedValue { vtype: 0, value: "7".into(), ops: vec![] },
                    ],
                ),
                (
                    "y".to_string(),
                    vec![
                        ObservedValue { vtype: 0, value: "9".into(), ops: vec![] },
                        ObservedValue { vtype: 0, value: "11".into(), ops: vec![] },
                        ObservedValue { vtype: 0, value: "13".into(), ops: vec![] },
                    ],
                ),
            ],
        };
        assert_eq!(
            limited_values(&bundle, 4),
            vec!["5", "7", "9", "11"],
            "distinct numeric values in bundle order, capped"
        );
        assert_eq!(limited_values(&bundle, 0), Vec::<String>::new());
    }

    #[test]
    fn test_limited_values_skips_non_numeric() {
        let bundle = bundle_of(&[(1, "hello"), (0, "5")]);
        assert_eq!(limited_values(&bundle, 4), vec!["5"]);
    }

    #[test]
    fn test_family_order_and_byte_decomposition() {
        let a = Array::new("A", 2);
        let bundle = bundle_of(&[(0, "258")]);
        let candidates =
            build_candidates(&bundle, &[a.clone()], &[2], &VaseOptions::default());

        assert_eq!(candidates.len(), 2, "bytewise then packed, no pair for one array");
        assert_eq!(
            candidates[0].family,
            Family::ByteWiseEq { array: "A".to_string(), bytes: 2 }
        );
        assert_eq!(
            candidates[0].constraints,
            vec![
                eq(read_byte(&a, 0), const8(0x02)),
                eq(read_byte(&a, 1), const8(0x01)),
            ],
            "258 must split little-endian into 0x02, 0x01"
        );
        assert_eq!(
            candidates[1].family,
            Family::PackedEq { array: "A".to_string(), value: 258 }
        );
        assert_eq!(candidates[1].constraints.len(), 1, "packed form is one constraint");
    }

    #[test]
    fn test_negative_value_bytes() {
        let a = Array::new("A", 1);
        let bundle = bundle_of(&[(0, "-1")]);
        let candidates =
            build_candidates(&bundle, &[a.clone()], &[1], &VaseOptions::default());
        assert_eq!(
            candidates[0].constraints,
            vec![eq(read_byte(&a, 0), const8(0xff))],
            "signed values decompose through their two's complement bytes"
        );
    }

    #[test]
    fn test_byte_cap_and_packed_cap() {
        let a = Array::new("A", 8);
        let bundle = bundle_of(&[(0, "1")]);
        let mut options = VaseOptions::default();
        options.max_bytes = 8;
        let candidates = build_candidates(&bundle, &[a.clone()], &[8], &options);

        assert_eq!(
            candidates[0].constraints.len(),
            8,
            "bytewise family honours the full width"
        );
        assert_eq!(
            count_reads(&candidates[1].constraints[0]),
            4,
            "the 32-bit packing never covers more than four bytes"
        );
    }

    #[test]
    fn test_max_bytes_narrows_width() {
        let a = Array::new("A", 8);
        let bundle = bundle_of(&[(0, "1")]);
        let mut options = VaseOptions::default();
        options.max_bytes = 1;
        let candidates = build_candidates(&bundle, &[a.clone()], &[4], &options);
        assert_eq!(candidates[0].constraints.len(), 1);
        assert_eq!(count_reads(&candidates[1].constraints[0]), 1);
    }

    #[test]
    fn test_pair_sum_requires_exactly_two_arrays() {
        let a = Array::new("A", 4);
        let b = Array::new("B", 4);
        let c = Array::new("C", 4);
        let bundle = bundle_of(&[(0, "10")]);
        let options = VaseOptions::default();

        let two = build_candidates(&bundle, &[a.clone(), b.clone()], &[1, 1], &options);
        assert!(
            matches!(two.last().unwrap().family, Family::PairSumEq { .. }),
            "two arrays end with the pair-sum shape"
        );

        let one = build_candidates(&bundle, &[a.clone()], &[1], &options);
        assert!(one.iter().all(|c| !matches!(c.family, Family::PairSumEq { .. })));

        let three = build_candidates(
            &bundle,
            &[a.clone(), b.clone(), c.clone()],
            &[1, 1, 1],
            &options,
        );
        assert!(three.iter().all(|c| !matches!(c.family, Family::PairSumEq { .. })));

        let mut no_pairs = VaseOptions::default();
        no_pairs.try_pairs = false;
        let disabled = build_candidates(&bundle, &[a, b], &[1, 1], &no_pairs);
        assert!(disabled.iter().all(|c| !matches!(c.family, Family::PairSumEq { .. })));
    }

    #[test]
    fn test_families_strictly_ordered() {
        let a = Array::new("A", 4);
        let b = Array::new("B", 4);
        let bundle = bundle_of(&[(0, "1"), (0, "2")]);
        let candidates = build_candidates(
            &bundle,
            &[a.clone(), b.clone()],
            &[1, 1],
            &VaseOptions::default(),
        );

        // 2 values x 2 arrays bytewise, then 2 x 2 packed, then 2 pair sums.
        assert_eq!(candidates.len(), 10);
        assert!(candidates[..4]
            .iter()
            .all(|c| matches!(c.family, Family::ByteWiseEq { .. })));
        assert!(candidates[4..8]
            .iter()
            .all(|c| matches!(c.family, Family::PackedEq { .. })));
        assert!(candidates[8..]
            .iter()
            .all(|c| matches!(c.family, Family::PairSumEq { .. })));
    }

    #[test]
    fn test_non_parseable_numeric_skipped() {
        let a = Array::new("A", 4);
        let bundle = bundle_of(&[(0, "not-a-number"), (0, "5")]);
        let candidates =
            build_candidates(&bundle, &[a.clone()], &[1], &VaseOptions::default());
        assert_eq!(
            candidates.len(),
            2,
            "only the parseable value produces candidates"
        );
        assert_eq!(
            candidates[0].constraints,
            vec![eq(read_byte(&a, 0), const8(5))]
        );
    }

    #[test]
    fn test_value_cap_enforced() {
        let a = Array::new("A", 4);
        let bundle = bundle_of(&[(0, "1"), (0, "2"), (0, "3"), (0, "4"), (0, "5"), (0, "6")]);
        let candidates =
            build_candidates(&bundle, &[a], &[1], &VaseOptions::default());
        // 4 values x 1 array x 2 families.
        assert_eq!(candidates.len(), 8);
    }

    #[test]
    fn test_family_descriptions() {
        assert_eq!(
            Family::ByteWiseEq { array: "A".into(), bytes: 2 }.to_string(),
            "[A] bytes=2 (array-bytes-eq)"
        );
        assert_eq!(
            Family::PackedEq { array: "A".into(), value: 258 }.to_string(),
            "[A] as u32 == 258"
        );
        assert_eq!(
            Family::PairSumEq { first: "A".into(), second: "B".into(), value: 10 }.to_string(),
            "[A]+[B] as u32 == 10"
        );
    }

    #[test]
    fn test_packing_shape_uses_arc_identity() {
        let a = Array::new("A", 4);
        let bundle = bundle_of(&[(0, "3")]);
        let candidates =
            build_candidates(&bundle, &[a.clone()], &[2], &VaseOptions::default());
        let packed = &candidates[1].constraints[0];
        let Expr::Eq(lhs, _) = packed.as_ref() else {
            panic!("packed candidate should be an equality");
        };
        let mut counter = ReadCounter { reads: 0 };
        walk(&mut counter, lhs);
        assert_eq!(counter.reads, 2, "packing covers the inferred width");
        let arrays = vase::vase::scanner::find_arrays(&vase::expr::Query::new(
            vase::expr::ConstraintSet::from(vec![packed.clone()]),
            const8(1),
        ));
        assert_eq!(arrays.len(), 1);
        assert!(Arc::ptr_eq(&arrays[0], &a), "candidates must target the query's own arrays");
    }
}
