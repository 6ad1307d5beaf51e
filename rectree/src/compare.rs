//! Comparators over record fields, for use with [`crate::tree::Tree::sort`].

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::node::Node;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn reverse(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

enum Numeric {
    Int(i128),
    Float(f64),
}

impl From<&Number> for Numeric {
    fn from(number: &Number) -> Self {
        if let Some(n) = number.as_i64() {
            Numeric::Int(i128::from(n))
        } else if let Some(n) = number.as_u64() {
            Numeric::Int(i128::from(n))
        } else {
            Numeric::Float(number.as_f64().unwrap_or(0.0))
        }
    }
}

/// Exact comparison of an integer with a finite float.
fn compare_int_float(int: i128, float: f64) -> Ordering {
    // 2^127, the first float outside i128
    const LIMIT: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;
    if float >= LIMIT {
        return Ordering::Less;
    }
    if float < -LIMIT {
        return Ordering::Greater;
    }
    let whole = float.trunc();
    match int.cmp(&(whole as i128)) {
        Ordering::Equal => whole.partial_cmp(&float).unwrap_or(Ordering::Equal),
        ordering => ordering,
    }
}

/// Integers compare exactly against each other and against floats, so
/// mixed integer and float fields still sort transitively.
fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    match (Numeric::from(a), Numeric::from(b)) {
        (Numeric::Int(a), Numeric::Int(b)) => a.cmp(&b),
        (Numeric::Int(a), Numeric::Float(b)) => compare_int_float(a, b),
        (Numeric::Float(a), Numeric::Int(b)) => compare_int_float(b, a).reverse(),
        // JSON floats are finite; -0.0 and 0.0 stay equal
        (Numeric::Float(a), Numeric::Float(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Total order over JSON values.
///
/// Values of different kinds order as null < bool < number < string <
/// array < object. Objects only compare by size.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Array(a), Value::Array(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                let ordering = compare_values(x, y);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            a.len().cmp(&b.len())
        }
        (Value::Object(a), Value::Object(b)) => a.len().cmp(&b.len()),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Comparator ordering nodes by the value of `field`.
///
/// In ascending order, nodes without the field come first.
pub fn compare_by(
    field: impl Into<String>,
    direction: SortDirection,
) -> impl FnMut(&Node, &Node) -> Ordering {
    let field = field.into();
    move |a, b| {
        let ordering = match (a.get(&field), b.get(&field)) {
            (Some(a), Some(b)) => compare_values(a, b),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        direction.apply(ordering)
    }
}
