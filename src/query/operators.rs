//! Comparison markers embedded in string values.
//!
//! | marker | meaning |
//! |--------|---------|
//! | `>:`   | greater than or equal |
//! | `>`    | greater than |
//! | `<:`   | less than or equal |
//! | `<`    | less than |
//! | `!`    | negation / exclusion |
//!
//! In a single value every marker must lead. Inside an array value `!` may
//! appear anywhere in an element; its first occurrence is removed.

use super::types::{CmpOp, QueryScalar};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Gt,
    Gte,
    Lt,
    Lte,
    Not,
}

impl Operator {
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Gt => ">",
            Self::Gte => ">:",
            Self::Lt => "<",
            Self::Lte => "<:",
            Self::Not => "!",
        }
    }

    #[must_use]
    pub const fn cmp_op(self) -> CmpOp {
        match self {
            Self::Gt => CmpOp::Gt,
            Self::Gte => CmpOp::Gte,
            Self::Lt => CmpOp::Lt,
            Self::Lte => CmpOp::Lte,
            Self::Not => CmpOp::Ne,
        }
    }
}

struct Marker {
    op: Operator,
    anchored: bool,
}

impl Marker {
    fn strip(&self, raw: &str) -> Option<String> {
        let token = self.op.marker();
        if self.anchored {
            return raw.strip_prefix(token).map(str::to_owned);
        }
        raw.find(token).map(|at| {
            let mut operand = String::with_capacity(raw.len() - token.len());
            operand.push_str(&raw[..at]);
            operand.push_str(&raw[at + token.len()..]);
            operand
        })
    }
}

// Evaluated top to bottom: `>:` must win over `>`, `<:` over `<`.
static GRAMMAR: [Marker; 5] = [
    Marker { op: Operator::Gte, anchored: true },
    Marker { op: Operator::Gt, anchored: true },
    Marker { op: Operator::Lte, anchored: true },
    Marker { op: Operator::Lt, anchored: true },
    Marker { op: Operator::Not, anchored: true },
];

static ELEMENT_NEGATION: Marker = Marker { op: Operator::Not, anchored: false };

/// A value with its marker detected and removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tagged {
    pub op: Option<Operator>,
    pub operand: String,
}

#[must_use]
pub fn parse_operator(raw: &str) -> Tagged {
    GRAMMAR
        .iter()
        .find_map(|m| m.strip(raw).map(|operand| Tagged { op: Some(m.op), operand }))
        .unwrap_or_else(|| Tagged { op: None, operand: raw.to_owned() })
}

/// Exclusion/inclusion split of an array value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub included: Vec<QueryScalar>,
    /// Marker-stripped operands of the negated entries.
    pub excluded: Vec<String>,
}

/// Numbers are always included; text carrying `!` is excluded.
#[must_use]
pub fn partition_negated<'a, I>(values: I) -> Partition
where
    I: IntoIterator<Item = &'a QueryScalar>,
{
    let mut out = Partition::default();
    for value in values {
        match value {
            QueryScalar::Text(s) => match ELEMENT_NEGATION.strip(s) {
                Some(operand) => out.excluded.push(operand),
                None => out.included.push(value.clone()),
            },
            _ => out.included.push(value.clone()),
        }
    }
    out
}
