//! # Citizen Quorum Weights
//!
//! The weighted citizen channel against a 2.0 requirement, built from
//! really-signed attestations and a tier table that changes over time.

use std::collections::BTreeMap;

use pcc_core::{
    AssuranceTier, AttestationPayload, AttestationRecord, AttestationType, IdentityHandle,
    MilestoneId, Timestamp, TierWeights,
};
use pcc_crypto::{sign_attestation, KeyPair};
use pcc_quorum::{evaluate_quorum, QuorumBreakdown, QuorumRequirement};

fn citizen(seed: u8) -> KeyPair {
    KeyPair::from_private_key(&[seed; 32]).unwrap()
}

fn approval(key: &KeyPair, minute: u32) -> AttestationRecord {
    let payload = AttestationPayload::new(
        MilestoneId::new("ms-school-2").unwrap(),
        key.identity_handle(),
        AttestationType::CitizenApproval,
        b"photo of the finished roof",
        Timestamp::parse(&format!("2026-08-01T09:{minute:02}:00Z")).unwrap(),
    );
    sign_attestation(payload, key).unwrap()
}

fn evaluate(
    records: &[AttestationRecord],
    tiers: &BTreeMap<IdentityHandle, AssuranceTier>,
) -> QuorumBreakdown {
    evaluate_quorum(
        &MilestoneId::new("ms-school-2").unwrap(),
        records,
        &QuorumRequirement {
            required_inspector_count: 0,
            required_auditor_count: 0,
            required_citizen_count: 2.0,
        },
        tiers,
        &TierWeights::default(),
    )
    .unwrap()
}

#[test]
fn score_progression_to_quorum() {
    let keys: Vec<KeyPair> = (60..64).map(citizen).collect();
    let mut tiers = BTreeMap::new();
    tiers.insert(keys[0].identity_handle(), AssuranceTier::CsoMediated);
    tiers.insert(keys[1].identity_handle(), AssuranceTier::CsoMediated);
    tiers.insert(keys[2].identity_handle(), AssuranceTier::Biometric);
    tiers.insert(keys[3].identity_handle(), AssuranceTier::Biometric);

    let mut records = vec![approval(&keys[0], 0), approval(&keys[1], 1)];
    let b = evaluate(&records, &tiers);
    assert_eq!(b.citizen.weighted_score, 0.8);
    assert!(!b.citizen.met);

    records.push(approval(&keys[2], 2));
    let b = evaluate(&records, &tiers);
    assert_eq!(b.citizen.weighted_score, 1.8);
    assert!(!b.citizen.met);

    records.push(approval(&keys[3], 3));
    let b = evaluate(&records, &tiers);
    assert_eq!(b.citizen.weighted_score, 2.8);
    assert!(b.citizen.met);
    assert!(b.overall_met);
}

#[test]
fn resubmission_counts_once_at_the_current_tier() {
    let key = citizen(70);
    let mut tiers = BTreeMap::new();
    tiers.insert(key.identity_handle(), AssuranceTier::Ussd);

    let records = vec![approval(&key, 0), approval(&key, 5), approval(&key, 10)];
    let b = evaluate(&records, &tiers);
    assert_eq!(b.citizen.distinct_citizens, 1);
    assert_eq!(b.citizen.weighted_score, 0.6);

    tiers.insert(key.identity_handle(), AssuranceTier::Biometric);
    assert_eq!(evaluate(&records, &tiers).citizen.weighted_score, 1.0);
}

#[test]
fn revoked_approvals_drop_out_of_the_score() {
    let keys: Vec<KeyPair> = (80..83).map(citizen).collect();
    let tiers: BTreeMap<_, _> = keys
        .iter()
        .map(|k| (k.identity_handle(), AssuranceTier::Biometric))
        .collect();
    let mut records: Vec<AttestationRecord> = keys.iter().map(|k| approval(k, 0)).collect();
    assert!(evaluate(&records, &tiers).citizen.met);

    records[0]
        .revoke("duplicate identity", Timestamp::parse("2026-08-02T00:00:00Z").unwrap())
        .unwrap();
    let b = evaluate(&records, &tiers);
    assert_eq!(b.citizen.weighted_score, 2.0);
    assert!(b.citizen.met);

    records[1]
        .revoke("coerced approval", Timestamp::parse("2026-08-02T00:00:00Z").unwrap())
        .unwrap();
    assert!(!evaluate(&records, &tiers).citizen.met);
}
