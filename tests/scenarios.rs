//! End-to-end scenarios exercising the kernel exactly as a driver would:
//! through `ReasoningKernel::add_fact` / `retract_fact` / `prove` only.

use noesis_kernel::{KernelConfig, ReasoningKernel, Verdict};

fn kernel() -> ReasoningKernel {
    ReasoningKernel::new(KernelConfig::default())
}

#[test]
fn pattern_match_hit() {
    let mut k = kernel();
    k.add_fact("IsPhilosopher(Socrates).").unwrap();
    let (verdict, reason) = k.prove("IsPhilosopher(Socrates).").unwrap();
    assert_eq!(verdict, Verdict::Proved);
    assert!(reason.contains("Pattern Prover"));
}

#[test]
fn pattern_match_refutation() {
    let mut k = kernel();
    k.add_fact("~IsOnline(ServerA).").unwrap();
    let (verdict, reason) = k.prove("IsOnline(ServerA).").unwrap();
    assert_eq!(verdict, Verdict::Refuted);
    assert!(reason.contains("Pattern Prover"));
}

#[test]
fn functional_contradiction_detected_at_insertion() {
    let mut k = kernel();
    k.add_fact("Capital(France, Paris).").unwrap();
    let err = k.add_fact("Capital(France, Berlin).").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Capital"));
    assert!(message.contains("France"));
    assert!(message.contains("Paris"));
    assert!(message.contains("Berlin"));
}

#[test]
fn smt_proved_universal() {
    let mut k = kernel();
    k.add_fact("all x (IsLegacy(x) -> ShouldRefactor(x)).").unwrap();
    k.add_fact("IsLegacy(BillingSystem).").unwrap();
    let (verdict, reason) = k.prove("ShouldRefactor(BillingSystem).").unwrap();
    assert_eq!(verdict, Verdict::Proved);
    assert!(reason.contains("SMT Adapter"));
}

#[test]
fn all_provers_unknown_is_not_cached() {
    let mut k = kernel();
    let (verdict, reason) = k.prove("Likes(Alice,Bob).").unwrap();
    assert_eq!(verdict, Verdict::Unknown);
    assert!(reason.contains("no prover found a definitive answer"));

    let before = k.stats().proof_cache_size;
    let (verdict_again, _) = k.prove("Likes(Alice,Bob).").unwrap();
    assert_eq!(verdict_again, Verdict::Unknown);
    assert_eq!(before, 0);
    assert_eq!(k.stats().proof_cache_size, 0);
}

#[test]
fn cache_hit_after_positive_verdict() {
    let mut k = kernel();
    k.add_fact("all x (IsLegacy(x) -> ShouldRefactor(x)).").unwrap();
    k.add_fact("IsLegacy(BillingSystem).").unwrap();
    let (first_verdict, _) = k.prove("ShouldRefactor(BillingSystem).").unwrap();
    assert_eq!(first_verdict, Verdict::Proved);

    let (second_verdict, reason) = k.prove("ShouldRefactor(BillingSystem).").unwrap();
    assert_eq!(second_verdict, Verdict::Proved);
    assert!(reason.contains("cached"));
}

#[test]
fn retracting_a_fact_clears_its_proof_from_the_cache() {
    let mut k = kernel();
    k.add_fact("IsPhilosopher(Socrates).").unwrap();
    assert_eq!(k.prove("IsPhilosopher(Socrates).").unwrap().0, Verdict::Proved);
    assert!(k.retract_fact("IsPhilosopher(Socrates).").unwrap());
    assert_eq!(k.prove("IsPhilosopher(Socrates).").unwrap().0, Verdict::Unknown);
}

#[test]
fn consistency_check_passes_on_a_conflict_free_kb() {
    let mut k = kernel();
    k.add_fact("Capital(France, Paris).").unwrap();
    k.add_fact("Capital(Austria, Vienna).").unwrap();
    assert!(k.check_consistency().is_ok());
}
