// Filter expressions for person queries.
//
// A Criteria renders to a parameterised SQL WHERE fragment for the
// database and evaluates directly against a Person for entities already
// held in memory. The two evaluations agree for every expression.

use rusqlite::types::Value;

use crate::entities::Person;

/// Comparison operator for numeric fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

impl Comparison {
    fn sql_operator(&self) -> &'static str {
        match self {
            Comparison::Equal => "=",
            Comparison::NotEqual => "<>",
            Comparison::Greater => ">",
            Comparison::GreaterOrEqual => ">=",
            Comparison::Less => "<",
            Comparison::LessOrEqual => "<=",
        }
    }

    fn holds(&self, left: i64, right: i64) -> bool {
        match self {
            Comparison::Equal => left == right,
            Comparison::NotEqual => left != right,
            Comparison::Greater => left > right,
            Comparison::GreaterOrEqual => left >= right,
            Comparison::Less => left < right,
            Comparison::LessOrEqual => left <= right,
        }
    }
}

/// A filter over people
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criteria {
    /// Matches every record
    All,
    Age(Comparison, i64),
    NameEquals(String),
    /// True when every branch is true (empty = true)
    And(Vec<Criteria>),
    /// True when any branch is true (empty = false)
    Or(Vec<Criteria>),
    Not(Box<Criteria>),
}

impl Criteria {
    pub fn age_greater_than(age: i64) -> Self {
        Criteria::Age(Comparison::Greater, age)
    }

    pub fn age_less_than(age: i64) -> Self {
        Criteria::Age(Comparison::Less, age)
    }

    pub fn age_equals(age: i64) -> Self {
        Criteria::Age(Comparison::Equal, age)
    }

    pub fn name_equals(name: impl Into<String>) -> Self {
        Criteria::NameEquals(name.into())
    }

    pub fn and(self, other: Criteria) -> Self {
        match self {
            Criteria::And(mut branches) => {
                branches.push(other);
                Criteria::And(branches)
            }
            first => Criteria::And(vec![first, other]),
        }
    }

    pub fn or(self, other: Criteria) -> Self {
        match self {
            Criteria::Or(mut branches) => {
                branches.push(other);
                Criteria::Or(branches)
            }
            first => Criteria::Or(vec![first, other]),
        }
    }

    pub fn negate(self) -> Self {
        Criteria::Not(Box::new(self))
    }

    /// Evaluate against an in-memory person.
    pub fn matches(&self, person: &Person) -> bool {
        match self {
            Criteria::All => true,
            Criteria::Age(op, value) => op.holds(person.age, *value),
            Criteria::NameEquals(name) => person.name == *name,
            Criteria::And(branches) => branches.iter().all(|c| c.matches(person)),
            Criteria::Or(branches) => branches.iter().any(|c| c.matches(person)),
            Criteria::Not(inner) => !inner.matches(person),
        }
    }

    /// Render as a SQL boolean expression with positional `?` placeholders.
    ///
    /// Returns the fragment and the values to bind, in placeholder order.
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let mut params = Vec::new();
        let sql = self.write_sql(&mut params);
        (sql, params)
    }

    fn write_sql(&self, params: &mut Vec<Value>) -> String {
        match self {
            Criteria::All => "1".to_string(),
            Criteria::Age(op, value) => {
                params.push(Value::Integer(*value));
                format!("age {} ?", op.sql_operator())
            }
            Criteria::NameEquals(name) => {
                params.push(Value::Text(name.clone()));
                "name = ?".to_string()
            }
            Criteria::And(branches) => join_branches(branches, " AND ", "1", params),
            Criteria::Or(branches) => join_branches(branches, " OR ", "0", params),
            Criteria::Not(inner) => format!("NOT ({})", inner.write_sql(params)),
        }
    }
}

fn join_branches(
    branches: &[Criteria],
    separator: &str,
    empty: &str,
    params: &mut Vec<Value>,
) -> String {
    if branches.is_empty() {
        return empty.to_string();
    }

    let parts: Vec<String> = branches
        .iter()
        .map(|branch| format!("({})", branch.write_sql(params)))
        .collect();
    parts.join(separator)
}
