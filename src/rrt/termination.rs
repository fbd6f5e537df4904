use std::time::{Duration, Instant};

/// Decides when a planning loop should stop. Evaluated once per iteration.
pub trait TerminationCondition {
    /// Returns true when planning should stop.
    fn evaluate(&mut self) -> bool;

    /// Re-arms the condition for a new planning run.
    fn reset(&mut self);
}

/// Stops after a fixed number of evaluations.
pub struct MaxIterationsTermination {
    max_iterations: usize,
    iterations: usize,
}

impl MaxIterationsTermination {
    pub fn new(max_iterations: usize) -> Self {
        Self {
            max_iterations,
            iterations: 0,
        }
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

impl TerminationCondition for MaxIterationsTermination {
    fn evaluate(&mut self) -> bool {
        if self.iterations >= self.max_iterations {
            return true;
        }
        self.iterations += 1;
        false
    }

    fn reset(&mut self) {
        self.iterations = 0;
    }
}

/// Stops once a wall-clock budget has elapsed since construction or the last reset.
pub struct MaxTimeTermination {
    max_time: Duration,
    start: Instant,
}

impl MaxTimeTermination {
    pub fn new(max_time: Duration) -> Self {
        Self {
            max_time,
            start: Instant::now(),
        }
    }
}

impl TerminationCondition for MaxTimeTermination {
    fn evaluate(&mut self) -> bool {
        self.start.elapsed() >= self.max_time
    }

    fn reset(&mut self) {
        self.start = Instant::now();
    }
}

/// Fires when any of its conditions fires. Every condition is evaluated each time.
#[derive(Default)]
pub struct AnyTermination {
    conditions: Vec<Box<dyn TerminationCondition>>,
}

impl AnyTermination {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, condition: Box<dyn TerminationCondition>) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl TerminationCondition for AnyTermination {
    fn evaluate(&mut self) -> bool {
        self.conditions
            .iter_mut()
            .fold(false, |fired, condition| condition.evaluate() || fired)
    }

    fn reset(&mut self) {
        for condition in &mut self.conditions {
            condition.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_iterations_fires_after_budget() {
        let mut termination = MaxIterationsTermination::new(3);
        assert!(!termination.evaluate());
        assert!(!termination.evaluate());
        assert!(!termination.evaluate());
        assert!(termination.evaluate());
        assert_eq!(termination.iterations(), 3);
        termination.reset();
        assert!(!termination.evaluate());
    }

    #[test]
    fn zero_time_budget_fires_immediately() {
        let mut termination = MaxTimeTermination::new(Duration::ZERO);
        assert!(termination.evaluate());
        let mut generous = MaxTimeTermination::new(Duration::from_secs(3600));
        assert!(!generous.evaluate());
    }

    #[test]
    fn any_termination_combines() {
        let mut termination = AnyTermination::new()
            .with(Box::new(MaxTimeTermination::new(Duration::from_secs(3600))))
            .with(Box::new(MaxIterationsTermination::new(1)));
        assert!(!termination.evaluate());
        assert!(termination.evaluate());
        assert!(!AnyTermination::new().evaluate());
    }
}
