use std::fmt::Display;

use typed_index_collections::TiVec;

use crate::formula::{Literal, Variable};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct VarIdx(usize);

impl From<usize> for VarIdx {
    fn from(index: usize) -> Self {
        VarIdx(index)
    }
}

impl From<VarIdx> for usize {
    fn from(index: VarIdx) -> Self {
        index.0
    }
}

impl From<Variable> for VarIdx {
    fn from(variable: Variable) -> Self {
        VarIdx(variable.as_index())
    }
}

impl Display for VarIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.0 + 1)
    }
}

#[derive(Clone, Debug, Default)]
struct VarState {
    value: Option<bool>,
    /// 1-based position in the current partial assignment, `None` iff unassigned.
    order: Option<usize>,
    /// Whether the first value tried at this rank has already been reversed.
    flipped: bool,
}

/// Per-variable search state.
///
/// The ranks of assigned variables are always exactly `1..=num_assigned`.
/// A rank is handed out as `num_assigned + 1` at assignment time, and variables
/// are only unassigned from the top rank downwards, so ranks are reused after
/// backtracking.
#[derive(Debug)]
pub struct Assignment {
    vars: TiVec<VarIdx, VarState>,
    num_assigned: usize,
}

impl Assignment {
    pub fn new(num_variables: usize) -> Self {
        Assignment {
            vars: TiVec::from(vec![VarState::default(); num_variables]),
            num_assigned: 0,
        }
    }

    pub fn num_variables(&self) -> usize {
        self.vars.len()
    }

    pub fn num_assigned(&self) -> usize {
        self.num_assigned
    }

    pub fn value(&self, var: VarIdx) -> Option<bool> {
        self.vars[var].value
    }

    /// Truth value of `literal` under the current partial assignment.
    pub fn literal_value(&self, literal: Literal) -> Option<bool> {
        self.value(literal.variable().into())
            .map(|value| literal.evaluate(value))
    }

    pub fn is_satisfied(&self, literal: Literal) -> bool {
        self.literal_value(literal) == Some(true)
    }

    pub fn order(&self, var: VarIdx) -> Option<usize> {
        self.vars[var].order
    }

    pub fn is_flipped(&self, var: VarIdx) -> bool {
        self.vars[var].flipped
    }

    pub fn unassigned(&self) -> impl Iterator<Item = VarIdx> + '_ {
        self.vars
            .iter_enumerated()
            .filter(|(_, state)| state.value.is_none())
            .map(|(var, _)| var)
    }

    /// Assigns `value` to an unassigned variable and returns its rank.
    pub fn assign(&mut self, var: VarIdx, value: bool) -> usize {
        debug_assert!(self.vars[var].value.is_none(), "{} is already assigned", var);

        self.num_assigned += 1;
        let rank = self.num_assigned;
        self.vars[var] = VarState {
            value: Some(value),
            order: Some(rank),
            flipped: false,
        };

        rank
    }

    /// Resets the variable to the unassigned state.
    ///
    /// Must only be called on the variable holding the highest rank.
    pub fn unassign(&mut self, var: VarIdx) {
        debug_assert_eq!(self.vars[var].order, Some(self.num_assigned));

        self.vars[var] = VarState::default();
        self.num_assigned -= 1;
    }

    /// Reverses the value of an assigned variable and marks it as flipped.
    /// The rank is kept.
    pub fn flip(&mut self, var: VarIdx) {
        let state = &mut self.vars[var];
        debug_assert!(!state.flipped, "{} is flipped twice", var);

        if let Some(value) = state.value.as_mut() {
            *value = !*value;
            state.flipped = true;
        } else {
            debug_assert!(false, "{} is not assigned", var);
        }
    }

    /// Rebuilds the assignment order: the variable at position `r - 1` holds rank `r`.
    ///
    /// Only assigned variables take part. Ranks must be dense (see [`Self::ranks_are_dense`]);
    /// a rank beyond `num_assigned` indexes out of bounds.
    pub fn decision_sequence(&self) -> Vec<VarIdx> {
        let mut sequence = vec![None; self.num_assigned];
        for (var, state) in self.vars.iter_enumerated() {
            if let Some(rank) = state.order {
                sequence[rank - 1] = Some(var);
            }
        }

        sequence.into_iter().flatten().collect()
    }

    /// Checks that assigned ranks are exactly `1..=num_assigned` and unassigned variables have none.
    pub fn ranks_are_dense(&self) -> bool {
        let mut seen = vec![false; self.num_assigned];
        for state in self.vars.iter() {
            match (state.value, state.order) {
                (Some(_), Some(rank)) if (1..=self.num_assigned).contains(&rank) => {
                    if std::mem::replace(&mut seen[rank - 1], true) {
                        return false;
                    }
                }
                (None, None) => (),
                _ => return false,
            }
        }

        seen.into_iter().all(|seen| seen)
    }

    /// Total assignment; variables irrelevant to every clause default to false.
    pub fn to_vec(&self) -> Vec<bool> {
        self.vars
            .iter()
            .map(|state| state.value.unwrap_or(false))
            .collect()
    }
}
