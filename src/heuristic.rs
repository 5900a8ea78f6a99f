use std::cell::RefCell;
use std::fmt;
use std::str::FromStr;

use crate::SpecError;

type IndexMap<K, V> = indexmap::IndexMap<K, V, fxhash::FxBuildHasher>;

/// Heuristic values for named graph states, one `<state> <value>` per line.
#[derive(Debug, Default)]
pub struct HeuristicTable {
    values: IndexMap<String, f64>,
    first_miss: RefCell<Option<String>>,
}

impl FromStr for HeuristicTable {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut values = IndexMap::default();
        for line in s.lines() {
            let tokens = line.split_whitespace().collect::<Vec<_>>();
            let invalid = || SpecError::InvalidHeuristicLine {
                tokens: tokens.iter().map(|&t| t.to_owned()).collect(),
                text: s.to_owned(),
            };
            let [state, value] = tokens[..] else {
                return Err(invalid());
            };
            let value = value.parse::<f64>().map_err(|_| invalid())?;
            values.insert(state.to_owned(), value);
        }
        Ok(Self {
            values,
            first_miss: RefCell::default(),
        })
    }
}

impl HeuristicTable {
    pub fn lookup(&self, state: &str) -> Result<f64, SpecError> {
        self.values
            .get(state)
            .copied()
            .ok_or_else(|| SpecError::HeuristicLookup {
                state: state.to_owned(),
                table: self.to_string(),
            })
    }

    /// Lookup for use inside a search. A miss yields infinity and is kept
    /// for [`HeuristicTable::take_miss`].
    pub fn evaluate(&self, state: &str) -> f64 {
        self.lookup(state).unwrap_or_else(|err| {
            tracing::error!("{err}");
            self.first_miss
                .borrow_mut()
                .get_or_insert_with(|| state.to_owned());
            f64::INFINITY
        })
    }

    /// The first undefined state evaluated since the last call, as a fatal
    /// lookup error.
    pub fn take_miss(&self) -> Result<(), SpecError> {
        match self.first_miss.take() {
            None => Ok(()),
            Some(state) => Err(SpecError::HeuristicLookup {
                state,
                table: self.to_string(),
            }),
        }
    }
}

impl fmt::Display for HeuristicTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (state, value) in &self.values {
            writeln!(f, "    {state:?}: {value}")?;
        }
        Ok(())
    }
}
