//! Positional arity of a method's parameter list.

use crate::index::models::{Parameter, ParameterKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Arity {
    pub required: usize,
    pub optional: usize,
    pub has_rest: bool,
}

impl Arity {
    pub fn from_parameters(parameters: &[Parameter]) -> Self {
        let mut arity = Self::default();

        for parameter in parameters {
            match parameter.kind {
                ParameterKind::Required | ParameterKind::PostRequired => arity.required += 1,
                ParameterKind::Optional => arity.optional += 1,
                ParameterKind::Rest | ParameterKind::Forward => arity.has_rest = true,
                // keywords and blocks never consume positional arguments
                ParameterKind::Keyword | ParameterKind::KeywordRest | ParameterKind::Block => {}
            }
        }

        arity
    }

    /// Upper bound on positional arguments, `None` when a rest parameter is present
    pub fn max(&self) -> Option<usize> {
        if self.has_rest {
            None
        } else {
            Some(self.required + self.optional)
        }
    }

    pub fn accepts(&self, count: usize) -> bool {
        count >= self.required && self.max().map_or(true, |max| count <= max)
    }
}
