//! Decoding model-builder output
//!
//! The builder emits line-oriented interpretation records:
//!
//! ```text
//! interpretation( 2, [
//!   function(a, [0]),
//!   function(f(_,_), [0,1,1,0]),
//!   relation(p(_), [1,0])
//! ])
//! ```
//!
//! These decode into a symbol → value table over a finite domain
//! `{0..size-1}`: nullary functions become constants, n-ary functions
//! row-major tables, relations boolean tables.

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Interpretation of one symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ModelValue {
    /// Nullary function: a domain element
    Constant(usize),
    /// Function table in row-major order
    Function { arity: usize, table: Vec<usize> },
    /// Relation table in row-major order
    Relation { arity: usize, table: Vec<bool> },
}

/// A finite model: domain size plus symbol interpretations in
/// discovery order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Valuation {
    pub domain_size: usize,
    pub symbols: IndexMap<String, ModelValue>,
}

fn interp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"interpretation\(\s*(\d+)").expect("static regex"))
}

fn entry_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(function|relation)\(\s*([A-Za-z0-9_$]+)\s*(\(([_,\s]*)\))?\s*,\s*\[([^\]]*)\]\s*\)")
            .expect("static regex")
    })
}

impl Valuation {
    /// Decode the first interpretation found in `output`. Returns
    /// `None` when no interpretation record is present.
    pub fn parse(output: &str) -> Option<Valuation> {
        let size: usize = interp_re()
            .captures(output)?
            .get(1)?
            .as_str()
            .parse()
            .ok()?;

        let mut symbols = IndexMap::new();
        for caps in entry_re().captures_iter(output) {
            let record = caps.get(1).map_or("", |m| m.as_str());
            let name = caps.get(2).map_or("", |m| m.as_str()).to_string();
            let arity = caps
                .get(4)
                .map_or(0, |m| m.as_str().matches('_').count());
            let cells: Vec<&str> = caps
                .get(5)
                .map_or("", |m| m.as_str())
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();

            let value = match (record, arity) {
                ("function", 0) => ModelValue::Constant(cells.first()?.parse().ok()?),
                ("function", _) => ModelValue::Function {
                    arity,
                    table: cells.iter().map(|c| c.parse().ok()).collect::<Option<_>>()?,
                },
                (_, _) => ModelValue::Relation {
                    arity,
                    table: cells.iter().map(|c| Some(*c == "1")).collect::<Option<_>>()?,
                },
            };
            symbols.insert(name, value);
        }

        Some(Valuation {
            domain_size: size,
            symbols,
        })
    }

    /// The domain element a constant denotes
    pub fn constant(&self, name: &str) -> Option<usize> {
        match self.symbols.get(name)? {
            ModelValue::Constant(v) => Some(*v),
            _ => None,
        }
    }

    /// Whether `pred(args)` holds in the model
    pub fn holds(&self, pred: &str, args: &[usize]) -> Option<bool> {
        match self.symbols.get(pred)? {
            ModelValue::Relation { arity, table } => {
                if args.len() != *arity {
                    return None;
                }
                let mut index = 0;
                for a in args {
                    if *a >= self.domain_size {
                        return None;
                    }
                    index = index * self.domain_size + a;
                }
                table.get(index).copied()
            }
            _ => None,
        }
    }

    /// Compact `symbol = value` rendering for diagnostics
    pub fn summary(&self) -> String {
        let parts: Vec<String> = self
            .symbols
            .iter()
            .map(|(name, v)| match v {
                ModelValue::Constant(c) => format!("{} = {}", name, c),
                ModelValue::Function { arity, .. } => format!("{}/{} = <function>", name, arity),
                ModelValue::Relation { arity, .. } => format!("{}/{} = <relation>", name, arity),
            })
            .collect();
        parts.join(", ")
    }
}
