use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::ProblemError;

/// Scalar function of the variable vector, in declaration order and physical units.
pub type Expression = Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// A named unknown with its seed and nominal magnitude.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub initial: f64,
    /// The solver iterates on `value / scale`.
    pub scale: f64,
}

/// Sense of a constraint residual `r = lhs - rhs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// `r == 0`
    Equal,
    /// `r >= 0`
    AtLeast,
    /// `r > 0`; the solver treats it as `AtLeast`, feasibility checks keep it strict.
    Greater,
}

impl Relation {
    /// Violation of a residual under this relation; zero when satisfied.
    pub fn violation(self, residual: f64) -> f64 {
        match self {
            Relation::Equal => residual.abs(),
            Relation::AtLeast | Relation::Greater => (-residual).max(0.0),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Relation::Equal => "==",
            Relation::AtLeast => ">=",
            Relation::Greater => ">",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A named relation `residual(x) <relation> 0`.
#[derive(Clone)]
pub struct Constraint {
    pub name: String,
    pub relation: Relation,
    pub residual: Expression,
    /// Typical magnitude of the residual; violations are measured in these units.
    pub scale: f64,
}

impl Constraint {
    pub fn new<F>(name: impl Into<String>, relation: Relation, residual: F) -> Self
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            relation,
            residual: Arc::new(residual),
            scale: 1.0,
        }
    }

    pub fn equal<F>(name: impl Into<String>, residual: F) -> Self
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        Self::new(name, Relation::Equal, residual)
    }

    pub fn at_least<F>(name: impl Into<String>, residual: F) -> Self
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        Self::new(name, Relation::AtLeast, residual)
    }

    pub fn greater<F>(name: impl Into<String>, residual: F) -> Self
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        Self::new(name, Relation::Greater, residual)
    }

    #[must_use]
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Residual divided by the constraint's scale.
    pub fn scaled_residual(&self, x: &[f64]) -> f64 {
        (self.residual)(x) / self.scale
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("name", &self.name)
            .field("relation", &self.relation)
            .field("scale", &self.scale)
            .finish_non_exhaustive()
    }
}

/// Immutable description of a minimization problem.
#[derive(Clone)]
pub struct Problem {
    variables: Vec<Variable>,
    objective: Expression,
    constraints: Vec<Constraint>,
}

impl Problem {
    pub fn builder() -> ProblemBuilder {
        ProblemBuilder::default()
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn dimension(&self) -> usize {
        self.variables.len()
    }

    pub fn objective(&self, x: &[f64]) -> f64 {
        (self.objective)(x)
    }

    /// Seeds in declaration order.
    pub fn initial_point(&self) -> Vec<f64> {
        self.variables.iter().map(|v| v.initial).collect()
    }

    /// Largest scaled violation over all constraints; `NaN` if any residual is not finite.
    pub fn max_violation(&self, x: &[f64]) -> f64 {
        let mut worst = 0.0_f64;
        for constraint in &self.constraints {
            let residual = constraint.scaled_residual(x);
            if !residual.is_finite() {
                return f64::NAN;
            }
            worst = worst.max(constraint.relation.violation(residual));
        }
        worst
    }
}

impl fmt::Debug for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Problem")
            .field("variables", &self.variables)
            .field("constraints", &self.constraints)
            .finish_non_exhaustive()
    }
}

/// Collects variables, objective, and constraints before freezing them into a [`Problem`].
#[derive(Default)]
pub struct ProblemBuilder {
    variables: Vec<Variable>,
    objective: Option<Expression>,
    constraints: Vec<Constraint>,
}

impl ProblemBuilder {
    #[must_use]
    pub fn variable(mut self, name: impl Into<String>, initial: f64, scale: f64) -> Self {
        self.variables.push(Variable {
            name: name.into(),
            initial,
            scale,
        });
        self
    }

    #[must_use]
    pub fn minimize<F>(mut self, objective: F) -> Self
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        self.objective = Some(Arc::new(objective));
        self
    }

    #[must_use]
    pub fn subject_to(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    #[must_use]
    pub fn subject_to_all(mut self, constraints: impl IntoIterator<Item = Constraint>) -> Self {
        self.constraints.extend(constraints);
        self
    }

    /// Validate and freeze the problem.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty or duplicated variable list, a missing objective, or
    /// non-finite seeds and scales.
    pub fn build(self) -> Result<Problem, ProblemError> {
        if self.variables.is_empty() {
            return Err(ProblemError::NoVariables);
        }
        let mut seen = HashSet::new();
        for var in &self.variables {
            if !seen.insert(var.name.as_str()) {
                return Err(ProblemError::DuplicateVariable(var.name.clone()));
            }
            if !var.initial.is_finite() || !var.scale.is_finite() || var.scale <= 0.0 {
                return Err(ProblemError::InvalidVariable(var.name.clone()));
            }
        }
        for constraint in &self.constraints {
            if !constraint.scale.is_finite() || constraint.scale <= 0.0 {
                return Err(ProblemError::InvalidConstraintScale(constraint.name.clone()));
            }
        }
        let objective = self.objective.ok_or(ProblemError::MissingObjective)?;

        Ok(Problem {
            variables: self.variables,
            objective,
            constraints: self.constraints,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_rejects_duplicates_and_missing_objective() {
        let dup = Problem::builder()
            .variable("a", 1.0, 1.0)
            .variable("a", 2.0, 1.0)
            .minimize(|x| x[0])
            .build();
        assert_eq!(dup.err(), Some(ProblemError::DuplicateVariable("a".into())));

        let missing = Problem::builder().variable("a", 1.0, 1.0).build();
        assert_eq!(missing.err(), Some(ProblemError::MissingObjective));

        let bad_scale = Problem::builder()
            .variable("a", 1.0, 0.0)
            .minimize(|x| x[0])
            .build();
        assert_eq!(bad_scale.err(), Some(ProblemError::InvalidVariable("a".into())));
    }

    #[test]
    fn violation_measures_scaled_residuals() {
        let problem = Problem::builder()
            .variable("a", 1.0, 1.0)
            .minimize(|x| x[0])
            .subject_to(Constraint::equal("a == 3", |x| x[0] - 3.0).with_scale(2.0))
            .subject_to(Constraint::at_least("a >= 0", |x| x[0]))
            .build()
            .expect("valid problem");
        assert!((problem.max_violation(&[1.0]) - 1.0).abs() < 1e-12);
        assert!((problem.max_violation(&[-4.0]) - 4.0).abs() < 1e-12);
        assert!(problem.max_violation(&[f64::NAN]).is_nan());
    }

    #[test]
    fn relation_measures_violation_and_prints_symbol() {
        assert_eq!(Relation::AtLeast.violation(0.5), 0.0);
        assert_eq!(Relation::Greater.violation(-0.25), 0.25);
        assert_eq!(Relation::Equal.violation(-1e-3), 1e-3);
        assert_eq!(Relation::Greater.to_string(), ">");
        assert_eq!(Relation::AtLeast.symbol(), ">=");
    }
}
