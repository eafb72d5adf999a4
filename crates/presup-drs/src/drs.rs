//! Box model: referents, conditions, nested boxes
//!
//! Every box carries a `BoxId` that is unique per allocation and
//! preserved by `Clone`. Within one resolution generation the id is
//! therefore an identity: trail bookkeeping and reading application
//! address boxes by id rather than by structural equality, which would
//! conflate alpha-equivalent siblings.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Identity of a box within one allocation lineage
pub type BoxId = u64;

/// Semantic kind of a discourse referent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RefKind {
    /// An individual (person, object)
    Individual,
    /// An eventuality with dynamics
    Event,
    /// A static eventuality
    State,
    /// A temporal index
    Time,
}

impl RefKind {
    /// Conventional name prefix for fresh referents of this kind
    pub fn prefix(self) -> &'static str {
        match self {
            RefKind::Individual => "x",
            RefKind::Event => "e",
            RefKind::State => "s",
            RefKind::Time => "t",
        }
    }
}

/// A typed discourse referent
///
/// Referents compare by kind and name; binding structure is carried by
/// the boxes that own them, not by the referent itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Referent {
    pub kind: RefKind,
    pub name: String,
}

impl Referent {
    pub fn new(kind: RefKind, name: impl Into<String>) -> Self {
        Referent {
            kind,
            name: name.into(),
        }
    }

    pub fn individual(name: impl Into<String>) -> Self {
        Referent::new(RefKind::Individual, name)
    }

    pub fn event(name: impl Into<String>) -> Self {
        Referent::new(RefKind::Event, name)
    }
}

impl fmt::Display for Referent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Fresh-name and box-id allocator
///
/// Threaded explicitly through every constructor and rewrite that needs
/// fresh material, so tests can pin the counter and get reproducible
/// names.
#[derive(Debug, Clone)]
pub struct RefAlloc {
    next_ref: u64,
    next_box: BoxId,
}

impl RefAlloc {
    pub fn new() -> Self {
        RefAlloc {
            next_ref: 1,
            next_box: 1,
        }
    }

    /// Start referent numbering at `n` (box ids follow their own count)
    pub fn starting_at(n: u64) -> Self {
        RefAlloc {
            next_ref: n,
            next_box: 1,
        }
    }

    /// Allocate a referent with a name no other allocation from this
    /// allocator has produced
    pub fn fresh(&mut self, kind: RefKind) -> Referent {
        let n = self.next_ref;
        self.next_ref += 1;
        Referent::new(kind, format!("{}{}", kind.prefix(), n))
    }

    pub fn fresh_box(&mut self) -> BoxId {
        let id = self.next_box;
        self.next_box += 1;
        id
    }
}

impl Default for RefAlloc {
    fn default() -> Self {
        Self::new()
    }
}

/// An atomic predication over referents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Predicate {
    pub name: String,
    pub args: Vec<Referent>,
}

impl Predicate {
    pub fn new(name: impl Into<String>, args: Vec<Referent>) -> Self {
        Predicate {
            name: name.into(),
            args,
        }
    }

    pub fn is_unary(&self) -> bool {
        self.args.len() == 1
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, a) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", a)?;
        }
        f.write_str(")")
    }
}

/// Presupposition trigger classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PresupKind {
    ProperName,
    Definite,
    Pronoun(PronounKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PronounKind {
    Personal,
    Reflexive,
    Possessive,
}

impl PresupKind {
    /// Precedence used when a merge must inherit a tag from one of two
    /// operands: proper names outrank definites outrank pronouns.
    pub fn rank(self) -> u8 {
        match self {
            PresupKind::ProperName => 3,
            PresupKind::Definite => 2,
            PresupKind::Pronoun(_) => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PresupKind::ProperName => "proper name",
            PresupKind::Definite => "definite description",
            PresupKind::Pronoun(PronounKind::Personal) => "pronoun",
            PresupKind::Pronoun(PronounKind::Reflexive) => "reflexive pronoun",
            PresupKind::Pronoun(PronounKind::Possessive) => "possessive pronoun",
        }
    }
}

/// Discourse-structuring temporal relations, the neo-Davidsonian set.
///
/// These anchor eventualities to each other and to the utterance time;
/// they move with their local box during accommodation and are stripped
/// before logical checks, where they would only confuse the tools.
pub fn is_temporal_predicate(name: &str) -> bool {
    matches!(
        name,
        "temp_includes" | "temp_abuts" | "temp_overlap" | "temp_precedes"
    )
}

/// The tag surviving a merge of two optionally-tagged boxes
pub fn merge_kinds(a: Option<PresupKind>, b: Option<PresupKind>) -> Option<PresupKind> {
    match (a, b) {
        (Some(x), Some(y)) => Some(if x.rank() >= y.rank() { x } else { y }),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    }
}

/// A pending presupposition: a tagged box owning its trigger referent
///
/// The trigger stays owned by `content` until a reading binds or
/// accommodates it; sibling conditions may already mention it, which is
/// why [`Drs::free`] keeps presupposition-owned referents out of the
/// free set.
#[derive(Debug, Clone, Serialize)]
pub struct PresupBox {
    pub kind: PresupKind,
    pub trigger: Referent,
    pub content: Drs,
}

impl PresupBox {
    pub fn new(kind: PresupKind, trigger: Referent, content: Drs) -> Self {
        PresupBox {
            kind,
            trigger,
            content,
        }
    }

    /// The head condition: first unary predication over the trigger.
    ///
    /// Discovered lazily because accommodation readings may splice
    /// conditions in front of it.
    pub fn head(&self) -> Option<&Predicate> {
        self.content.conditions.iter().find_map(|c| match c {
            Condition::Pred(p) if p.is_unary() && p.args[0] == self.trigger => Some(p),
            _ => None,
        })
    }
}

/// One condition of a box
///
/// Order within a box is semantically significant and must survive
/// every rewrite.
#[derive(Debug, Clone, Serialize)]
pub enum Condition {
    /// Atomic predication
    Pred(Predicate),
    /// Referent equality
    Eq(Referent, Referent),
    /// Negated sub-box
    Not(Drs),
    /// Disjunction of sub-boxes
    Or(Drs, Drs),
    /// Implication between sub-boxes; the antecedent binds into the
    /// consequent
    Imp(Drs, Drs),
    /// Biconditional between sub-boxes
    Iff(Drs, Drs),
    /// New information awaiting an admissibility verdict
    New(Drs),
    /// Pending presupposition
    Presup(PresupBox),
}

impl Condition {
    pub fn pred(name: impl Into<String>, args: &[&Referent]) -> Self {
        Condition::Pred(Predicate::new(
            name,
            args.iter().map(|r| (*r).clone()).collect(),
        ))
    }

    /// Sub-boxes of this condition, in surface order
    pub fn sub_boxes(&self) -> Vec<&Drs> {
        match self {
            Condition::Pred(_) | Condition::Eq(_, _) => vec![],
            Condition::Not(d) | Condition::New(d) => vec![d],
            Condition::Or(a, b) | Condition::Imp(a, b) | Condition::Iff(a, b) => vec![a, b],
            Condition::Presup(p) => vec![&p.content],
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Pred(p) => write!(f, "{}", p),
            Condition::Eq(a, b) => write!(f, "{} = {}", a, b),
            Condition::Not(d) => write!(f, "not {}", d),
            Condition::Or(a, b) => write!(f, "({} or {})", a, b),
            Condition::Imp(a, b) => write!(f, "({} => {})", a, b),
            Condition::Iff(a, b) => write!(f, "({} <=> {})", a, b),
            Condition::New(d) => write!(f, "new {}", d),
            Condition::Presup(p) => write!(f, "presup<{}>{}", p.kind.label(), p.content),
        }
    }
}

/// A discourse representation structure: ordered referents plus ordered
/// conditions
#[derive(Debug, Clone, Serialize)]
pub struct Drs {
    pub id: BoxId,
    pub referents: Vec<Referent>,
    pub conditions: Vec<Condition>,
}

impl Drs {
    /// An empty box with a fresh identity
    pub fn new(alloc: &mut RefAlloc) -> Self {
        Drs {
            id: alloc.fresh_box(),
            referents: Vec::new(),
            conditions: Vec::new(),
        }
    }

    pub fn push_referent(&mut self, r: Referent) {
        self.referents.push(r);
    }

    pub fn push_condition(&mut self, c: Condition) {
        self.conditions.push(c);
    }

    /// Add a referent freshly drawn from the allocator and return it
    pub fn bind_fresh(&mut self, kind: RefKind, alloc: &mut RefAlloc) -> Referent {
        let r = alloc.fresh(kind);
        self.referents.push(r.clone());
        r
    }

    pub fn binds(&self, r: &Referent) -> bool {
        self.referents.iter().any(|x| x == r)
    }

    /// Depth-first search for a box by identity
    pub fn find_box(&self, id: BoxId) -> Option<&Drs> {
        if self.id == id {
            return Some(self);
        }
        for c in &self.conditions {
            for sub in c.sub_boxes() {
                if let Some(found) = sub.find_box(id) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Mutable counterpart of [`Drs::find_box`]
    pub fn find_box_mut(&mut self, id: BoxId) -> Option<&mut Drs> {
        if self.id == id {
            return Some(self);
        }
        for c in &mut self.conditions {
            let subs: Vec<&mut Drs> = match c {
                Condition::Pred(_) | Condition::Eq(_, _) => vec![],
                Condition::Not(d) | Condition::New(d) => vec![d],
                Condition::Or(a, b) | Condition::Imp(a, b) | Condition::Iff(a, b) => {
                    vec![a, b]
                }
                Condition::Presup(p) => vec![&mut p.content],
            };
            for sub in subs {
                if let Some(found) = sub.find_box_mut(id) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// True if any presupposition marker survives anywhere in the tree
    pub fn has_presupposition(&self) -> bool {
        self.conditions.iter().any(|c| match c {
            Condition::Presup(_) => true,
            other => other.sub_boxes().iter().any(|d| d.has_presupposition()),
        })
    }

    /// Names of all predicates occurring in the tree
    pub fn predicates(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_predicates(&mut out);
        out
    }

    fn collect_predicates(&self, out: &mut BTreeSet<String>) {
        for c in &self.conditions {
            if let Condition::Pred(p) = c {
                out.insert(p.name.clone());
            }
            for sub in c.sub_boxes() {
                sub.collect_predicates(out);
            }
        }
    }

    /// All referents bound anywhere in the tree (including sub-boxes)
    pub fn all_bound(&self) -> BTreeSet<Referent> {
        let mut out = BTreeSet::new();
        self.collect_bound(&mut out);
        out
    }

    fn collect_bound(&self, out: &mut BTreeSet<Referent>) {
        out.extend(self.referents.iter().cloned());
        for c in &self.conditions {
            for sub in c.sub_boxes() {
                sub.collect_bound(out);
            }
        }
    }
}

impl fmt::Display for Drs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, r) in self.referents.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", r)?;
        }
        f.write_str(" | ")?;
        for (i, c) in self.conditions.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", c)?;
        }
        f.write_str("]")
    }
}
