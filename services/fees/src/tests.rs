//! Tests for the fees service
//!
//! Tests cover: tier selection, tier table validation, tier editing,
//! fee breakdown arithmetic, negative net handling and settings loading.

use crate::calculator::{compute_net_amount, compute_with_policy, FeeCalculator, NegativeNetPolicy};
use crate::error::{ConfigurationError, FeeError};
use crate::schedule::FeeSchedule;
use crate::settings::FeeSettings;
use crate::tiers::{check_overlap, select_tier, CommissionTier, TierDraft, TierTable};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use shared::ValidationError;
use std::io::Write;

fn reference() -> TierTable {
    TierTable::reference()
}

// ============================================================================
// Tier selection
// ============================================================================

#[test]
fn test_two_tons_uses_twelve_percent_tier() {
    let tier = reference().select(dec!(2)).unwrap().clone();
    assert_eq!(tier.commission_rate_percent, dec!(12));
}

#[test]
fn test_tier_lower_bound_inclusive_upper_exclusive() {
    let table = reference();
    assert_eq!(table.select(dec!(0)).unwrap().commission_rate_percent, dec!(10));
    assert_eq!(table.select(dec!(0.999)).unwrap().commission_rate_percent, dec!(10));
    assert_eq!(table.select(dec!(1)).unwrap().commission_rate_percent, dec!(12));
    assert_eq!(table.select(dec!(3)).unwrap().commission_rate_percent, dec!(13));
    assert_eq!(table.select(dec!(5)).unwrap().commission_rate_percent, dec!(14));
    assert_eq!(table.select(dec!(9.99)).unwrap().commission_rate_percent, dec!(14));
    assert_eq!(table.select(dec!(10)).unwrap().commission_rate_percent, dec!(15));
    assert_eq!(table.select(dec!(250000)).unwrap().commission_rate_percent, dec!(15));
}

#[test]
fn test_every_sampled_tonnage_matches_exactly_one_tier() {
    let table = reference();
    let mut tonnage = Decimal::ZERO;
    while tonnage < dec!(20) {
        let matching = table.tiers().iter().filter(|t| t.contains(tonnage)).count();
        assert_eq!(matching, 1, "tonnage {} matched {} tiers", tonnage, matching);
        tonnage += dec!(0.25);
    }
}

#[test]
fn test_negative_tonnage_rejected() {
    let err = reference().select(dec!(-0.5)).unwrap_err();
    assert!(matches!(err, FeeError::Validation(ValidationError::Negative { .. })));
}

#[test]
fn test_select_on_gapped_slice_reports_gap() {
    let tiers = vec![
        CommissionTier::bounded(dec!(0), dec!(1), dec!(10)),
        CommissionTier::unbounded(dec!(2), dec!(12)),
    ];
    let err = select_tier(&tiers, dec!(1.5)).unwrap_err();
    assert_eq!(
        err,
        FeeError::Configuration(ConfigurationError::NoMatchingTier { tonnage: dec!(1.5) })
    );
}

#[test]
fn test_select_on_overlapping_slice_is_ambiguous() {
    let tiers = vec![
        CommissionTier::bounded(dec!(0), dec!(3), dec!(10)),
        CommissionTier::unbounded(dec!(2), dec!(12)),
    ];
    let err = select_tier(&tiers, dec!(2.5)).unwrap_err();
    assert_eq!(
        err,
        FeeError::Configuration(ConfigurationError::AmbiguousTier {
            tonnage: dec!(2.5),
            count: 2,
        })
    );
    // Outside the overlap the slice still resolves.
    assert_eq!(select_tier(&tiers, dec!(1)).unwrap().commission_rate_percent, dec!(10));
}

// ============================================================================
// Tier table validation
// ============================================================================

#[test]
fn test_table_sorts_unordered_input() {
    let table = TierTable::new(vec![
        CommissionTier::unbounded(dec!(5), dec!(8)),
        CommissionTier::bounded(dec!(0), dec!(5), dec!(10)),
    ])
    .unwrap();
    assert_eq!(table.tiers()[0].min_tonnage, dec!(0));
    assert_eq!(table.len(), 2);
}

#[test]
fn test_empty_table_rejected() {
    assert_eq!(TierTable::new(vec![]).unwrap_err(), ConfigurationError::EmptyTable);
}

#[test]
fn test_table_with_gap_rejected() {
    let err = TierTable::new(vec![
        CommissionTier::bounded(dec!(0), dec!(1), dec!(10)),
        CommissionTier::unbounded(dec!(2), dec!(12)),
    ])
    .unwrap_err();
    assert_eq!(err, ConfigurationError::Gap { from: dec!(1), to: dec!(2) });
}

#[test]
fn test_table_with_overlap_rejected() {
    let err = TierTable::new(vec![
        CommissionTier::bounded(dec!(0), dec!(3), dec!(10)),
        CommissionTier::unbounded(dec!(2), dec!(12)),
    ])
    .unwrap_err();
    assert_eq!(err, ConfigurationError::OverlappingTiers { first: 0, second: 1 });
}

#[test]
fn test_two_unbounded_tiers_overlap() {
    let err = TierTable::new(vec![
        CommissionTier::unbounded(dec!(0), dec!(10)),
        CommissionTier::unbounded(dec!(5), dec!(12)),
    ])
    .unwrap_err();
    assert!(matches!(err, ConfigurationError::OverlappingTiers { .. }));
}

#[test]
fn test_table_must_start_at_zero() {
    let err = TierTable::new(vec![CommissionTier::unbounded(dec!(1), dec!(10))]).unwrap_err();
    assert_eq!(err, ConfigurationError::MissingZeroTier { min: dec!(1) });
}

#[test]
fn test_last_tier_must_be_unbounded() {
    let err = TierTable::new(vec![
        CommissionTier::bounded(dec!(0), dec!(1), dec!(10)),
        CommissionTier::bounded(dec!(1), dec!(3), dec!(12)),
    ])
    .unwrap_err();
    assert_eq!(err, ConfigurationError::BoundedLastTier { max: dec!(3) });
}

#[test]
fn test_inverted_range_rejected() {
    let err = TierTable::new(vec![CommissionTier::bounded(dec!(0), dec!(0), dec!(10))]).unwrap_err();
    assert_eq!(err, ConfigurationError::InvertedRange { min: dec!(0), max: dec!(0) });
}

#[test]
fn test_rate_above_hundred_rejected() {
    let err = TierTable::new(vec![CommissionTier::unbounded(dec!(0), dec!(101))]).unwrap_err();
    assert!(matches!(
        err,
        ConfigurationError::InvalidTier(ValidationError::OutOfRange { .. })
    ));
}

#[test]
fn test_table_deserializes_through_validation() {
    let bad = r#"[{"min_tonnage":"0","max_tonnage":"1","commission_rate_percent":"10"}]"#;
    assert!(serde_json::from_str::<TierTable>(bad).is_err());

    let good = r#"[{"min_tonnage":"0","commission_rate_percent":"10"}]"#;
    let table: TierTable = serde_json::from_str(good).unwrap();
    assert_eq!(table.select(dec!(42)).unwrap().commission_rate_percent, dec!(10));
}

// ============================================================================
// Tier editing
// ============================================================================

#[test]
fn test_draft_rejects_overlapping_add() {
    let mut draft = TierDraft::new();
    draft.add(CommissionTier::bounded(dec!(0), dec!(3), dec!(10))).unwrap();

    let err = draft
        .add(CommissionTier::bounded(dec!(2), dec!(5), dec!(12)))
        .unwrap_err();
    assert_eq!(err, ConfigurationError::OverlappingTiers { first: 0, second: 1 });
    assert_eq!(draft.tiers().len(), 1);
}

#[test]
fn test_draft_allows_gaps_until_finalize() {
    let mut draft = TierDraft::new();
    draft.add(CommissionTier::bounded(dec!(0), dec!(1), dec!(10))).unwrap();
    draft.add(CommissionTier::unbounded(dec!(3), dec!(13))).unwrap();

    let err = draft.clone().finalize().unwrap_err();
    assert_eq!(err, ConfigurationError::Gap { from: dec!(1), to: dec!(3) });

    draft.add(CommissionTier::bounded(dec!(1), dec!(3), dec!(12))).unwrap();
    let table = draft.finalize().unwrap();
    assert_eq!(table.select(dec!(2)).unwrap().commission_rate_percent, dec!(12));
}

#[test]
fn test_draft_update_ignores_tier_being_replaced() {
    let mut draft = TierDraft::from(reference());
    // Re-rating 1-3t must not collide with itself.
    draft
        .update(1, CommissionTier::bounded(dec!(1), dec!(3), dec!(11)))
        .unwrap();

    let err = draft
        .update(1, CommissionTier::bounded(dec!(1), dec!(4), dec!(11)))
        .unwrap_err();
    assert_eq!(err, ConfigurationError::OverlappingTiers { first: 1, second: 2 });

    let table = draft.finalize().unwrap();
    assert_eq!(table.select(dec!(2)).unwrap().commission_rate_percent, dec!(11));
}

#[test]
fn test_draft_unknown_index() {
    let mut draft = TierDraft::new();
    assert_eq!(
        draft.remove(3).unwrap_err(),
        ConfigurationError::UnknownTier { index: 3 }
    );
    assert_eq!(
        draft
            .update(0, CommissionTier::unbounded(dec!(0), dec!(10)))
            .unwrap_err(),
        ConfigurationError::UnknownTier { index: 0 }
    );
}

#[test]
fn test_draft_remove_then_finalize_detects_gap() {
    let mut draft = TierDraft::from(reference());
    let removed = draft.remove(2).unwrap();
    assert_eq!(removed.commission_rate_percent, dec!(13));
    assert_eq!(
        draft.finalize().unwrap_err(),
        ConfigurationError::Gap { from: dec!(3), to: dec!(5) }
    );
}

#[test]
fn test_adjacent_tiers_do_not_overlap() {
    let tiers = vec![CommissionTier::bounded(dec!(0), dec!(1), dec!(10))];
    assert!(check_overlap(&tiers, &CommissionTier::unbounded(dec!(1), dec!(12)), None).is_ok());
}

// ============================================================================
// Fee breakdown
// ============================================================================

#[test]
fn test_commission_for_two_tons() {
    let breakdown =
        compute_net_amount(dec!(100000), dec!(2), reference().tiers(), &FeeSchedule::default()).unwrap();
    assert_eq!(breakdown.commission_amount, dec!(12000));
    assert_eq!(breakdown.net_amount, dec!(88000));
    assert!(!breakdown.clamped);
}

#[test]
fn test_all_deductions_applied() {
    let schedule = FeeSchedule::new(dec!(2), dec!(3500), dec!(500));
    let breakdown = compute_net_amount(dec!(100000), dec!(6), reference().tiers(), &schedule).unwrap();

    assert_eq!(breakdown.commission_amount, dec!(14000));
    assert_eq!(breakdown.platform_fee_amount, dec!(2000));
    assert_eq!(breakdown.transport_fee, dec!(3500));
    assert_eq!(breakdown.grading_fee, dec!(500));
    assert_eq!(breakdown.net_amount, dec!(80000));
    assert_eq!(breakdown.total_deductions(), dec!(20000));
    assert_eq!(breakdown.gross_amount - breakdown.total_deductions(), breakdown.net_amount);
}

#[test]
fn test_negative_net_rejected_by_default() {
    let schedule = FeeSchedule::new(dec!(0), dec!(5000), dec!(1000));
    let err = compute_net_amount(dec!(5000), dec!(0.5), reference().tiers(), &schedule).unwrap_err();
    assert_eq!(
        err,
        FeeError::NegativeNetAmount {
            gross: dec!(5000),
            deductions: dec!(6500),
        }
    );
}

#[test]
fn test_negative_net_clamped_when_configured() {
    let schedule = FeeSchedule::new(dec!(0), dec!(5000), dec!(1000));
    let breakdown = compute_with_policy(
        dec!(5000),
        dec!(0.5),
        reference().tiers(),
        &schedule,
        NegativeNetPolicy::ClampToZero,
    )
    .unwrap();
    assert_eq!(breakdown.net_amount, Decimal::ZERO);
    assert!(breakdown.clamped);
}

#[test]
fn test_zero_gross_with_no_flat_fees() {
    let breakdown =
        compute_net_amount(Decimal::ZERO, dec!(1), reference().tiers(), &FeeSchedule::default()).unwrap();
    assert_eq!(breakdown.net_amount, Decimal::ZERO);
}

#[test]
fn test_invalid_inputs_rejected() {
    let tiers = reference();
    assert!(matches!(
        compute_net_amount(dec!(-1), dec!(1), tiers.tiers(), &FeeSchedule::default()),
        Err(FeeError::Validation(_))
    ));

    let bad_schedule = FeeSchedule::new(dec!(120), dec!(0), dec!(0));
    assert!(matches!(
        compute_net_amount(dec!(1000), dec!(1), tiers.tiers(), &bad_schedule),
        Err(FeeError::Validation(ValidationError::OutOfRange { .. }))
    ));

    let negative_flat = FeeSchedule::new(dec!(1), dec!(-10), dec!(0));
    assert!(matches!(
        compute_net_amount(dec!(1000), dec!(1), tiers.tiers(), &negative_flat),
        Err(FeeError::Validation(ValidationError::Negative { .. }))
    ));
}

#[test]
fn test_out_of_range_rate_in_raw_slice_rejected() {
    let schedule = FeeSchedule::default();

    let negative = vec![CommissionTier::unbounded(dec!(0), dec!(-20))];
    assert!(matches!(
        compute_net_amount(dec!(1000), dec!(2), &negative, &schedule),
        Err(FeeError::Validation(ValidationError::OutOfRange { .. }))
    ));

    // Must not be absorbed by the clamp policy.
    let excessive = vec![CommissionTier::unbounded(dec!(0), dec!(150))];
    assert!(matches!(
        compute_with_policy(dec!(1000), dec!(2), &excessive, &schedule, NegativeNetPolicy::ClampToZero),
        Err(FeeError::Validation(ValidationError::OutOfRange { .. }))
    ));
}

#[test]
fn test_overflowing_gross_is_an_error() {
    let err = compute_net_amount(Decimal::MAX / dec!(2), dec!(2), reference().tiers(), &FeeSchedule::default())
        .unwrap_err();
    assert_eq!(
        err,
        FeeError::Validation(ValidationError::Overflow {
            field: "commission_amount".to_string(),
        })
    );

    let huge_flat = FeeSchedule::new(dec!(0), Decimal::MAX, Decimal::MAX);
    assert!(matches!(
        compute_net_amount(dec!(1000), dec!(2), reference().tiers(), &huge_flat),
        Err(FeeError::Validation(ValidationError::Overflow { .. }))
    ));
}

#[test]
fn test_net_is_monotonic_in_gross() {
    let schedule = FeeSchedule::new(dec!(1.5), dec!(2000), dec!(250));
    let calculator =
        FeeCalculator::new(reference(), schedule, NegativeNetPolicy::ClampToZero).unwrap();

    let mut previous = Decimal::MIN;
    for step in 0..200 {
        let gross = Decimal::from(step * 750);
        let net = calculator.compute(gross, dec!(4)).unwrap().net_amount;
        assert!(net >= previous, "net dropped at gross {}", gross);
        previous = net;
    }
}

#[test]
fn test_compute_is_idempotent() {
    let calculator = FeeCalculator::default();
    let first = calculator.compute(dec!(73250), dec!(3.2)).unwrap();
    let second = calculator.compute(dec!(73250), dec!(3.2)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_calculator_rejects_invalid_schedule() {
    let result = FeeCalculator::new(
        reference(),
        FeeSchedule::new(dec!(-1), dec!(0), dec!(0)),
        NegativeNetPolicy::Reject,
    );
    assert!(result.is_err());
}

// ============================================================================
// Settings
// ============================================================================

#[test]
fn test_default_settings_use_reference_tiers() {
    let settings = FeeSettings::default();
    assert_eq!(settings.tiers, TierTable::reference());
    assert_eq!(settings.negative_net_policy, NegativeNetPolicy::Reject);

    let calculator = settings.into_calculator().unwrap();
    assert_eq!(calculator.compute(dec!(100000), dec!(2)).unwrap().commission_amount, dec!(12000));
}

#[test]
fn test_settings_loaded_from_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    write!(
        file,
        r#"
negative_net_policy = "clamp_to_zero"

[schedule]
platform_fee_percent = 2
transport_fee_flat = 1500
grading_fee_flat = 500

[[tiers]]
min_tonnage = 0
max_tonnage = 2
commission_rate_percent = 8

[[tiers]]
min_tonnage = 2
commission_rate_percent = 9
"#
    )
    .unwrap();

    let settings = FeeSettings::load(Some(file.path())).unwrap();
    assert_eq!(settings.negative_net_policy, NegativeNetPolicy::ClampToZero);
    assert_eq!(settings.schedule.transport_fee_flat, dec!(1500));
    assert_eq!(settings.tiers.len(), 2);

    let calculator = settings.into_calculator().unwrap();
    let breakdown = calculator.compute(dec!(100000), dec!(3)).unwrap();
    assert_eq!(breakdown.commission_amount, dec!(9000));
    assert_eq!(breakdown.net_amount, dec!(87000));
}

#[test]
fn test_settings_file_with_gap_is_rejected() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    write!(
        file,
        r#"
[[tiers]]
min_tonnage = 0
max_tonnage = 1
commission_rate_percent = 10

[[tiers]]
min_tonnage = 2
commission_rate_percent = 12
"#
    )
    .unwrap();

    assert!(FeeSettings::load(Some(file.path())).is_err());
}
