//! Event / thematic-role maps
//!
//! Built by scanning predications: a binary predicate whose first
//! argument is an event or state and whose second is an individual is
//! read as a thematic-role assignment; a unary predicate over an event
//! or state names it. The maps drive both candidate ranking (role
//! overlap) and the exclusion rules for pronoun binding.

use indexmap::IndexMap;
use presup_drs::{Condition, Drs, RefKind, Referent};
use std::collections::BTreeSet;

/// One role assignment: `role(event, participant)` plus the event's
/// naming word when one is known
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleEntry {
    pub event: Referent,
    pub role: String,
    pub event_word: Option<String>,
}

/// Referent → role assignments, in discovery order
#[derive(Debug, Clone, Default)]
pub struct RoleMap {
    by_participant: IndexMap<Referent, Vec<RoleEntry>>,
}

fn is_eventuality(r: &Referent) -> bool {
    matches!(r.kind, RefKind::Event | RefKind::State)
}

impl RoleMap {
    /// Scan the whole tree below `root`, presupposition content
    /// included (pending triggers still participate in events).
    pub fn build_deep(root: &Drs) -> RoleMap {
        let mut words: IndexMap<Referent, String> = IndexMap::new();
        let mut raw: Vec<(Referent, Referent, String)> = Vec::new();
        collect(root, &mut words, &mut raw);

        let mut map = RoleMap::default();
        for (participant, event, role) in raw {
            let event_word = words.get(&event).cloned();
            map.by_participant
                .entry(participant)
                .or_default()
                .push(RoleEntry {
                    event,
                    role,
                    event_word,
                });
        }
        map
    }

    /// Events and states the referent participates in
    pub fn events_of(&self, r: &Referent) -> BTreeSet<Referent> {
        self.by_participant
            .get(r)
            .map(|es| es.iter().map(|e| e.event.clone()).collect())
            .unwrap_or_default()
    }

    /// Individuals filling a role of the given event or state
    pub fn participants_of(&self, event: &Referent) -> BTreeSet<Referent> {
        self.by_participant
            .iter()
            .filter(|(_, entries)| entries.iter().any(|e| e.event == *event))
            .map(|(p, _)| p.clone())
            .collect()
    }

    /// Role names the referent fills anywhere
    pub fn roles_of(&self, r: &Referent) -> BTreeSet<String> {
        self.by_participant
            .get(r)
            .map(|es| es.iter().map(|e| e.role.clone()).collect())
            .unwrap_or_default()
    }

    /// Size of the role-name overlap between two referents; the primary
    /// ranking signal for antecedent candidates
    pub fn role_overlap(&self, a: &Referent, b: &Referent) -> usize {
        self.roles_of(a).intersection(&self.roles_of(b)).count()
    }
}

fn collect(d: &Drs, words: &mut IndexMap<Referent, String>, raw: &mut Vec<(Referent, Referent, String)>) {
    for c in &d.conditions {
        if let Condition::Pred(p) = c {
            match p.args.as_slice() {
                [e] if is_eventuality(e) => {
                    words.entry(e.clone()).or_insert_with(|| p.name.clone());
                }
                // The participant may itself be an eventuality: event
                // anaphora chains ("saw it happen") depend on it.
                [e, x] if is_eventuality(e) && x.kind != RefKind::Time => {
                    raw.push((x.clone(), e.clone(), p.name.clone()));
                }
                _ => {}
            }
        }
        for sub in c.sub_boxes() {
            collect(sub, words, raw);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use presup_drs::RefAlloc;

    fn love_scene() -> (Drs, Referent, Referent, Referent, Referent) {
        let mut alloc = RefAlloc::new();
        let mut d = Drs::new(&mut alloc);
        let j = d.bind_fresh(RefKind::Individual, &mut alloc);
        let c = d.bind_fresh(RefKind::Individual, &mut alloc);
        let e1 = d.bind_fresh(RefKind::Event, &mut alloc);
        d.push_condition(Condition::pred("jones", &[&j]));
        d.push_condition(Condition::pred("charlotte", &[&c]));
        d.push_condition(Condition::pred("love", &[&e1]));
        d.push_condition(Condition::pred("agent", &[&e1, &j]));
        d.push_condition(Condition::pred("patient", &[&e1, &c]));
        (d, j, c, e1, Referent::individual("nobody"))
    }

    #[test]
    fn roles_are_collected_per_participant() {
        let (d, j, c, e1, _) = love_scene();
        let roles = RoleMap::build_deep(&d);
        assert_eq!(roles.events_of(&j), BTreeSet::from([e1.clone()]));
        assert_eq!(roles.events_of(&c), BTreeSet::from([e1.clone()]));
        assert_eq!(roles.roles_of(&j), BTreeSet::from(["agent".to_string()]));
        assert_eq!(roles.participants_of(&e1), BTreeSet::from([j, c]));
    }

    #[test]
    fn unknown_referent_has_no_events() {
        let (d, _, _, _, stranger) = love_scene();
        let roles = RoleMap::build_deep(&d);
        assert!(roles.events_of(&stranger).is_empty());
    }

    #[test]
    fn event_words_come_from_unary_predications() {
        let (d, j, _, _, _) = love_scene();
        let roles = RoleMap::build_deep(&d);
        let entries = &roles.by_participant[&j];
        assert_eq!(entries[0].event_word.as_deref(), Some("love"));
    }

    #[test]
    fn overlap_counts_shared_role_names() {
        let mut alloc = RefAlloc::new();
        let mut d = Drs::new(&mut alloc);
        let a = d.bind_fresh(RefKind::Individual, &mut alloc);
        let b = d.bind_fresh(RefKind::Individual, &mut alloc);
        let e1 = d.bind_fresh(RefKind::Event, &mut alloc);
        let e2 = d.bind_fresh(RefKind::Event, &mut alloc);
        d.push_condition(Condition::pred("agent", &[&e1, &a]));
        d.push_condition(Condition::pred("agent", &[&e2, &b]));
        d.push_condition(Condition::pred("patient", &[&e2, &a]));
        let roles = RoleMap::build_deep(&d);
        assert_eq!(roles.role_overlap(&a, &b), 1);
    }

    #[test]
    fn scan_reaches_nested_boxes() {
        let mut alloc = RefAlloc::new();
        let mut inner = Drs::new(&mut alloc);
        let x = inner.bind_fresh(RefKind::Individual, &mut alloc);
        let e = inner.bind_fresh(RefKind::Event, &mut alloc);
        inner.push_condition(Condition::pred("walk", &[&e]));
        inner.push_condition(Condition::pred("agent", &[&e, &x]));
        let mut outer = Drs::new(&mut alloc);
        outer.push_condition(Condition::Not(inner));
        let roles = RoleMap::build_deep(&outer);
        assert_eq!(roles.events_of(&x).len(), 1);
    }
}
