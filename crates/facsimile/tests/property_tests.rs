//! Property-based tests for inference and generation.
//!
//! These use proptest to fold randomly shaped value trees through the
//! pipeline and verify the core laws:
//!
//! 1. **Merge idempotence**: unifying a schema with itself changes nothing
//!    structurally
//! 2. **Merge commutativity**: sample order never changes the inferred
//!    shape (up to record field order)
//! 3. **Generation validity**: every generated value satisfies every
//!    inferred constraint
//! 4. **Determinism**: a seeded generator reproduces its output exactly

use proptest::prelude::*;

use facsimile::generate::{Generator, GeneratorConfig};
use facsimile::inference::{infer, merge, ConstraintEstimator};
use facsimile::Value;

// =============================================================================
// Test Strategies
// =============================================================================

/// Arbitrary scalar values, bounded so f64 precision never bites.
fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        (-10_000i64..10_000).prop_map(Value::from),
        (-10_000.0f64..10_000.0).prop_map(Value::from),
        "[a-z0-9]{0,12}".prop_map(|s| Value::from(s.as_str())),
    ]
}

/// Arbitrary value trees: scalars, sequences, and mappings up to depth 3.
fn arb_value() -> impl Strategy<Value = Value> {
    arb_scalar().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Sequence),
            prop::collection::vec(("[a-z]{1,6}", inner), 0..4)
                .prop_map(|entries| Value::Mapping(entries.into_iter().collect())),
        ]
    })
}

/// Non-empty sample sets, as inference requires.
fn arb_samples() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(arb_value(), 1..6)
}

// =============================================================================
// Merge Laws
// =============================================================================

proptest! {
    /// Merging an inferred schema with itself is structurally a no-op.
    #[test]
    fn merge_is_idempotent(samples in arb_samples()) {
        let schema = infer(&samples).unwrap();
        let doubled = merge(schema.clone(), schema.clone());
        prop_assert!(doubled.same_shape(&schema));
    }

    /// Sample order does not change the inferred shape.
    #[test]
    fn merge_commutes(a in arb_value(), b in arb_value()) {
        let ab = infer(&[a.clone(), b.clone()]).unwrap();
        let ba = infer(&[b, a]).unwrap();
        prop_assert!(ab.same_shape(&ba));
    }

    /// Inference never panics and never silently returns on empty input.
    #[test]
    fn inference_is_total(samples in arb_samples()) {
        let _ = infer(&samples).unwrap();
    }
}

// =============================================================================
// Generation Properties
// =============================================================================

proptest! {
    /// Every generated value satisfies every constraint of the schema it
    /// was generated from.
    #[test]
    fn generated_values_satisfy_schema(samples in arb_samples(), seed in any::<u64>()) {
        let schema = ConstraintEstimator::new().estimate(&infer(&samples).unwrap());
        let generator = Generator::new(schema, GeneratorConfig::default()).unwrap();
        let mut rng = fastrand::Rng::with_seed(seed);
        for value in generator.generate_many(20, &mut rng) {
            prop_assert!(
                generator.schema().admits(&value),
                "schema rejected generated value: {value:?}"
            );
        }
    }

    /// The same seed reproduces the same output exactly.
    #[test]
    fn generation_is_deterministic(samples in arb_samples(), seed in any::<u64>()) {
        let schema = ConstraintEstimator::new().estimate(&infer(&samples).unwrap());
        let generator = Generator::new(schema, GeneratorConfig::default()).unwrap();

        let mut rng1 = fastrand::Rng::with_seed(seed);
        let mut rng2 = fastrand::Rng::with_seed(seed);
        prop_assert_eq!(
            generator.generate_many(10, &mut rng1),
            generator.generate_many(10, &mut rng2)
        );
    }

    /// Estimation keeps every numeric bound ordered.
    #[test]
    fn estimated_schemas_are_valid(samples in arb_samples()) {
        let schema = ConstraintEstimator::new().estimate(&infer(&samples).unwrap());
        prop_assert!(schema.validate().is_ok());
    }
}
