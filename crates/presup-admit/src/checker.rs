//! The admissibility state machine

use crate::filters::karttunen_pairs;
use crate::knowledge::BackgroundKnowledge;
use crate::AdmitError;
use presup_drs::{is_temporal_predicate, BoxId, Condition, Drs, FolFormula, RefAlloc};
use presup_prover::{Decision, Goal, Oracle, Valuation};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Terminal verdict of one admissibility check
#[derive(Debug, Clone, Serialize)]
pub enum AdmitVerdict {
    /// The reading is consistent, informative and locally clean; the
    /// new information has been merged into the discourse
    Admitted {
        merged: Drs,
        /// Model of the merged discourse when the builder produced one
        valuation: Option<Valuation>,
    },
    /// The reading contradicts the discourse (with the background
    /// axioms)
    Inconsistent { offending: Drs },
    /// Some new-information box is already entailed
    Uninformative { offending: Drs },
    /// A local filter fired: `main` decides `sub` (or its negation)
    Inadmissible { main: Drs, sub: Drs },
}

impl AdmitVerdict {
    pub fn is_admitted(&self) -> bool {
        matches!(self, AdmitVerdict::Admitted { .. })
    }
}

/// Phases of the check, entered in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CheckState {
    StripTemporal,
    Consistency,
    Informativity,
    LocalFilters,
    Done,
}

/// Runs the admissibility state machine against an oracle
///
/// The oracle and the knowledge store are shared immutably, so one
/// checker serves any number of concurrent checks.
pub struct AdmissibilityChecker {
    oracle: Arc<dyn Oracle>,
    knowledge: Arc<BackgroundKnowledge>,
}

impl AdmissibilityChecker {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        AdmissibilityChecker {
            oracle,
            knowledge: Arc::new(BackgroundKnowledge::default()),
        }
    }

    pub fn with_knowledge(oracle: Arc<dyn Oracle>, knowledge: Arc<BackgroundKnowledge>) -> Self {
        AdmissibilityChecker { oracle, knowledge }
    }

    /// Check one resolved reading. `reading` is the whole discourse
    /// with the incoming sentence embedded as new-information boxes.
    pub async fn admit(
        &self,
        reading: &Drs,
        alloc: &mut RefAlloc,
    ) -> Result<AdmitVerdict, AdmitError> {
        if reading.has_presupposition() {
            return Err(AdmitError::InvariantViolation(
                "unresolved presupposition reached the admissibility checker".into(),
            ));
        }

        let mut working = reading.clone();
        let mut valuation: Option<Valuation> = None;
        let mut state = CheckState::StripTemporal;

        loop {
            state = match state {
                CheckState::StripTemporal => {
                    strip_temporal(&mut working);
                    CheckState::Consistency
                }
                CheckState::Consistency => {
                    match self.satisfiable(&working).await? {
                        Decision::Unsatisfiable => {
                            debug!("rejected: inconsistent");
                            return Ok(AdmitVerdict::Inconsistent { offending: working });
                        }
                        Decision::Satisfiable(v) => valuation = Some(v),
                        Decision::Undetermined => {
                            warn!("consistency undetermined; proceeding on the permissive default");
                        }
                    }
                    CheckState::Informativity
                }
                CheckState::Informativity => {
                    while let Some((box_id, index)) = innermost_new(&working) {
                        let negated = with_new_negated(&working, box_id, index)?;
                        if !self.satisfiable(&negated).await?.is_accepted() {
                            let offending = new_content(&working, box_id, index)?;
                            debug!("rejected: uninformative");
                            return Ok(AdmitVerdict::Uninformative { offending });
                        }
                        splice_new(&mut working, box_id, index)?;
                    }
                    CheckState::LocalFilters
                }
                CheckState::LocalFilters => {
                    let pairs = karttunen_pairs(&working, alloc);
                    debug!(pairs = pairs.len(), "running local filters");
                    for pair in pairs {
                        if self.entails(&pair.main, &pair.sub, false, alloc).await?
                            || self.entails(&pair.main, &pair.sub, true, alloc).await?
                        {
                            debug!("rejected: local entailment");
                            return Ok(AdmitVerdict::Inadmissible {
                                main: pair.main,
                                sub: pair.sub,
                            });
                        }
                    }
                    CheckState::Done
                }
                CheckState::Done => {
                    debug!("admitted");
                    return Ok(AdmitVerdict::Admitted {
                        merged: working,
                        valuation,
                    });
                }
            };
        }
    }

    async fn satisfiable(&self, d: &Drs) -> Result<Decision, AdmitError> {
        let goal = self.goal_for(d.to_fol()?, &d.predicates());
        Ok(self.oracle.decide(&goal).await?)
    }

    /// Does `main` entail `sub` (or its negation, when `negate`)?
    /// Checked as unsatisfiability of ¬(main → sub).
    async fn entails(
        &self,
        main: &Drs,
        sub: &Drs,
        negate: bool,
        alloc: &mut RefAlloc,
    ) -> Result<bool, AdmitError> {
        let consequent = if negate {
            let mut neg = Drs::new(alloc);
            neg.push_condition(Condition::Not(sub.clone()));
            neg
        } else {
            sub.clone()
        };
        let mut shell = Drs::new(alloc);
        shell.push_condition(Condition::Imp(main.clone(), consequent));

        let mut predicates = main.predicates();
        predicates.extend(sub.predicates());
        let goal = self.goal_for(FolFormula::not(shell.to_fol()?), &predicates);
        Ok(!self.oracle.decide(&goal).await?.is_accepted())
    }

    fn goal_for(&self, formula: FolFormula, predicates: &BTreeSet<String>) -> Goal {
        Goal::with_axioms(formula, self.knowledge.axioms_for(predicates))
    }
}

/// Remove discourse-structuring temporal relations throughout the tree.
fn strip_temporal(d: &mut Drs) {
    d.conditions
        .retain(|c| !matches!(c, Condition::Pred(p) if is_temporal_predicate(&p.name)));
    for c in &mut d.conditions {
        match c {
            Condition::Not(x) | Condition::New(x) => strip_temporal(x),
            Condition::Or(a, b) | Condition::Imp(a, b) | Condition::Iff(a, b) => {
                strip_temporal(a);
                strip_temporal(b);
            }
            Condition::Presup(p) => strip_temporal(&mut p.content),
            Condition::Pred(_) | Condition::Eq(_, _) => {}
        }
    }
}

/// Locate a new-information box none of whose descendants is itself
/// new: informativity runs innermost-first.
fn innermost_new(d: &Drs) -> Option<(BoxId, usize)> {
    for (i, c) in d.conditions.iter().enumerate() {
        for sub in c.sub_boxes() {
            if let Some(found) = innermost_new(sub) {
                return Some(found);
            }
        }
        if matches!(c, Condition::New(_)) {
            return Some((d.id, i));
        }
    }
    None
}

fn new_content(d: &Drs, box_id: BoxId, index: usize) -> Result<Drs, AdmitError> {
    let b = d
        .find_box(box_id)
        .ok_or_else(|| AdmitError::InvariantViolation(format!("box {} vanished", box_id)))?;
    match b.conditions.get(index) {
        Some(Condition::New(n)) => Ok(n.clone()),
        _ => Err(AdmitError::InvariantViolation(format!(
            "expected a new-information box at {}:{}",
            box_id, index
        ))),
    }
}

/// A copy of the tree with the addressed new-information box negated,
/// for the is-it-already-entailed check.
fn with_new_negated(d: &Drs, box_id: BoxId, index: usize) -> Result<Drs, AdmitError> {
    let mut copy = d.clone();
    let b = copy
        .find_box_mut(box_id)
        .ok_or_else(|| AdmitError::InvariantViolation(format!("box {} vanished", box_id)))?;
    match b.conditions.get_mut(index) {
        Some(slot) if matches!(slot, Condition::New(_)) => {
            let Condition::New(n) = slot.clone() else {
                unreachable!()
            };
            *slot = Condition::Not(n);
            Ok(copy)
        }
        _ => Err(AdmitError::InvariantViolation(format!(
            "expected a new-information box at {}:{}",
            box_id, index
        ))),
    }
}

/// Replace the addressed new-information box by its content, splicing
/// referents and conditions into the surrounding box.
fn splice_new(d: &mut Drs, box_id: BoxId, index: usize) -> Result<(), AdmitError> {
    let b = d
        .find_box_mut(box_id)
        .ok_or_else(|| AdmitError::InvariantViolation(format!("box {} vanished", box_id)))?;
    if !matches!(b.conditions.get(index), Some(Condition::New(_))) {
        return Err(AdmitError::InvariantViolation(format!(
            "expected a new-information box at {}:{}",
            box_id, index
        )));
    }
    let Condition::New(n) = b.conditions.remove(index) else {
        unreachable!()
    };
    b.referents.extend(n.referents);
    for (k, c) in n.conditions.into_iter().enumerate() {
        b.conditions.insert(index + k, c);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use presup_drs::RefKind;
    use std::sync::Mutex;

    /// Oracle replaying a scripted decision sequence and recording the
    /// goals it was asked about.
    struct ScriptedOracle {
        script: Mutex<Vec<Decision>>,
        seen: Mutex<Vec<Goal>>,
    }

    impl ScriptedOracle {
        fn new(decisions: Vec<Decision>) -> Self {
            ScriptedOracle {
                script: Mutex::new(decisions),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Oracle for ScriptedOracle {
        async fn decide(
            &self,
            goal: &Goal,
        ) -> Result<Decision, presup_prover::OracleError> {
            self.seen.lock().unwrap().push(goal.clone());
            let mut script = self.script.lock().unwrap();
            if script.is_empty() {
                Ok(Decision::Undetermined)
            } else {
                Ok(script.remove(0))
            }
        }
    }

    /// "Mia is away" with a new-information copy embedded:
    /// `[x | mia(x), away(x), new [ | away(x)]]`
    fn mia_with_new(alloc: &mut RefAlloc) -> Drs {
        let mut d = Drs::new(alloc);
        let x = d.bind_fresh(RefKind::Individual, alloc);
        d.push_condition(Condition::pred("mia", &[&x]));
        d.push_condition(Condition::pred("away", &[&x]));
        let mut n = Drs::new(alloc);
        n.push_condition(Condition::pred("away", &[&x]));
        d.push_condition(Condition::New(n));
        d
    }

    #[tokio::test]
    async fn inconsistent_reading_is_terminal() {
        let mut alloc = RefAlloc::new();
        let d = mia_with_new(&mut alloc);
        let oracle = Arc::new(ScriptedOracle::new(vec![Decision::Unsatisfiable]));
        let checker = AdmissibilityChecker::new(oracle.clone());

        let verdict = checker.admit(&d, &mut alloc).await.unwrap();
        assert!(matches!(verdict, AdmitVerdict::Inconsistent { .. }));
        assert_eq!(oracle.calls(), 1);
    }

    #[tokio::test]
    async fn entailed_new_information_is_uninformative() {
        let mut alloc = RefAlloc::new();
        let d = mia_with_new(&mut alloc);
        // Consistent overall, but the negated new box is unsatisfiable:
        // the discourse already entails it.
        let oracle = Arc::new(ScriptedOracle::new(vec![
            Decision::Satisfiable(Valuation::default()),
            Decision::Unsatisfiable,
        ]));
        let checker = AdmissibilityChecker::new(oracle.clone());

        let verdict = checker.admit(&d, &mut alloc).await.unwrap();
        match verdict {
            AdmitVerdict::Uninformative { offending } => {
                assert!(offending.to_string().contains("away"));
            }
            other => panic!("expected uninformative, got {:?}", other),
        }
        assert_eq!(oracle.calls(), 2);
    }

    #[tokio::test]
    async fn informative_new_information_is_admitted_and_spliced() {
        let mut alloc = RefAlloc::new();
        let mut d = Drs::new(&mut alloc);
        let x = d.bind_fresh(RefKind::Individual, &mut alloc);
        d.push_condition(Condition::pred("mia", &[&x]));
        let mut n = Drs::new(&mut alloc);
        let e = alloc.fresh(RefKind::Event);
        n.push_referent(e.clone());
        n.push_condition(Condition::pred("walk", &[&e]));
        d.push_condition(Condition::New(n));

        let oracle = Arc::new(ScriptedOracle::new(vec![
            Decision::Satisfiable(Valuation::default()),
            Decision::Satisfiable(Valuation::default()),
        ]));
        let checker = AdmissibilityChecker::new(oracle.clone());

        let verdict = checker.admit(&d, &mut alloc).await.unwrap();
        match verdict {
            AdmitVerdict::Admitted { merged, valuation } => {
                assert!(valuation.is_some());
                assert!(merged.binds(&e), "new referents spliced into the outer box");
                assert_eq!(merged.to_string(), "[x1,e2 | mia(x1), walk(e2)]");
            }
            other => panic!("expected admitted, got {:?}", other),
        }
        // Consistency + one informativity check; no connectives, so no
        // local pairs.
        assert_eq!(oracle.calls(), 2);
    }

    #[tokio::test]
    async fn local_entailment_is_inadmissible() {
        // "Mia is away" + "if Mia is away, Angus walks": the antecedent
        // is already decided by the discourse.
        let mut alloc = RefAlloc::new();
        let mut d = Drs::new(&mut alloc);
        let x = d.bind_fresh(RefKind::Individual, &mut alloc);
        d.push_condition(Condition::pred("mia", &[&x]));
        d.push_condition(Condition::pred("away", &[&x]));
        let mut k = Drs::new(&mut alloc);
        k.push_condition(Condition::pred("away", &[&x]));
        let mut l = Drs::new(&mut alloc);
        let e = l.bind_fresh(RefKind::Event, &mut alloc);
        l.push_condition(Condition::pred("walk", &[&e]));
        let mut n = Drs::new(&mut alloc);
        n.push_condition(Condition::Imp(k, l));
        d.push_condition(Condition::New(n));

        let oracle = Arc::new(ScriptedOracle::new(vec![
            // consistency
            Decision::Satisfiable(Valuation::default()),
            // informativity of the new box
            Decision::Satisfiable(Valuation::default()),
            // local pair 1: main |= antecedent -> unsat means entailed
            Decision::Unsatisfiable,
        ]));
        let checker = AdmissibilityChecker::new(oracle.clone());

        let verdict = checker.admit(&d, &mut alloc).await.unwrap();
        match verdict {
            AdmitVerdict::Inadmissible { main, sub } => {
                assert!(main.to_string().contains("away(x1)"));
                assert_eq!(sub.to_string(), "[ | away(x1)]");
            }
            other => panic!("expected inadmissible, got {:?}", other),
        }
        assert_eq!(oracle.calls(), 3);
    }

    #[tokio::test]
    async fn clean_implication_passes_local_filters() {
        let mut alloc = RefAlloc::new();
        let mut d = Drs::new(&mut alloc);
        let x = d.bind_fresh(RefKind::Individual, &mut alloc);
        d.push_condition(Condition::pred("mia", &[&x]));
        let mut k = Drs::new(&mut alloc);
        k.push_condition(Condition::pred("away", &[&x]));
        let mut l = Drs::new(&mut alloc);
        let e = l.bind_fresh(RefKind::Event, &mut alloc);
        l.push_condition(Condition::pred("walk", &[&e]));
        let mut n = Drs::new(&mut alloc);
        n.push_condition(Condition::Imp(k, l));
        d.push_condition(Condition::New(n));

        // Everything satisfiable: the implication is genuinely
        // contingent. Four local-filter calls (two per pair).
        let oracle = Arc::new(ScriptedOracle::new(vec![
            Decision::Satisfiable(Valuation::default());
            6
        ]));
        let checker = AdmissibilityChecker::new(oracle.clone());

        let verdict = checker.admit(&d, &mut alloc).await.unwrap();
        assert!(verdict.is_admitted());
        assert_eq!(oracle.calls(), 6);
    }

    #[tokio::test]
    async fn undetermined_consistency_proceeds_permissively() {
        let mut alloc = RefAlloc::new();
        let d = mia_with_new(&mut alloc);
        let oracle = Arc::new(ScriptedOracle::new(vec![
            Decision::Undetermined,
            Decision::Satisfiable(Valuation::default()),
        ]));
        let checker = AdmissibilityChecker::new(oracle);

        let verdict = checker.admit(&d, &mut alloc).await.unwrap();
        match verdict {
            AdmitVerdict::Admitted { valuation, .. } => assert!(valuation.is_none()),
            other => panic!("expected admitted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unresolved_presupposition_is_rejected_eagerly() {
        use presup_drs::{PresupBox, PresupKind, PronounKind};
        let mut alloc = RefAlloc::new();
        let mut d = Drs::new(&mut alloc);
        let u = alloc.fresh(RefKind::Individual);
        let mut content = Drs::new(&mut alloc);
        content.push_referent(u.clone());
        d.push_condition(Condition::Presup(PresupBox::new(
            PresupKind::Pronoun(PronounKind::Personal),
            u,
            content,
        )));
        let oracle = Arc::new(ScriptedOracle::new(vec![]));
        let checker = AdmissibilityChecker::new(oracle);

        let err = checker.admit(&d, &mut alloc).await.unwrap_err();
        assert!(matches!(err, AdmitError::InvariantViolation(_)));
    }

    #[test]
    fn strip_temporal_reaches_nested_boxes() {
        let mut alloc = RefAlloc::new();
        let mut inner = Drs::new(&mut alloc);
        let t = alloc.fresh(RefKind::Time);
        let s = alloc.fresh(RefKind::State);
        inner.push_condition(Condition::pred("temp_includes", &[&t, &s]));
        inner.push_condition(Condition::pred("away", &[]));
        let mut outer = Drs::new(&mut alloc);
        outer.push_condition(Condition::pred("temp_precedes", &[&t, &t]));
        outer.push_condition(Condition::Not(inner));

        strip_temporal(&mut outer);
        assert_eq!(outer.to_string(), "[ | not [ | away]]");
    }
}
