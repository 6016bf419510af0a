//! Solver output: sampled states and step statistics.

/// Work counters for one solve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SolveStats {
    /// Steps accepted.
    pub accepted_steps: usize,
    /// Steps rejected by the error controller.
    pub rejected_steps: usize,
    /// Right-hand side evaluations.
    pub rhs_evals: usize,
}

/// States sampled at monotone times, plus the state the solve ended in.
///
/// Samples are stored flat: sample `i` occupies
/// `states[i * dim..(i + 1) * dim]`. The end state is kept separately
/// because a save policy need not record the window end.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution<T> {
    times: Vec<T>,
    states: Vec<T>,
    dim: usize,
    end: Option<(T, Vec<T>)>,
    stats: SolveStats,
}

impl<T: Copy> Solution<T> {
    /// An empty solution for states of length `dim`.
    pub fn new(dim: usize) -> Self {
        Self {
            times: Vec::new(),
            states: Vec::new(),
            dim,
            end: None,
            stats: SolveStats::default(),
        }
    }

    /// Append one sample.
    ///
    /// # Panics
    ///
    /// Panics if `state.len() != self.dim()`.
    pub fn push(&mut self, t: T, state: &[T]) {
        assert_eq!(state.len(), self.dim, "sample length must equal dim");
        self.times.push(t);
        self.states.extend_from_slice(state);
    }

    /// Record the state the solve ended in.
    pub fn finish(&mut self, t: T, state: &[T]) {
        self.end = Some((t, state.to_vec()));
    }

    /// Sample times.
    pub fn times(&self) -> &[T] {
        &self.times
    }

    /// State at sample `i`.
    pub fn state(&self, i: usize) -> Option<&[T]> {
        if i < self.times.len() {
            Some(&self.states[i * self.dim..(i + 1) * self.dim])
        } else {
            None
        }
    }

    /// State at the end of the solve, falling back to the last sample
    /// when the solver did not call [`finish`](Self::finish).
    pub fn final_state(&self) -> Option<&[T]> {
        match &self.end {
            Some((_, state)) => Some(state),
            None => self.len().checked_sub(1).and_then(|i| self.state(i)),
        }
    }

    /// Time matching [`final_state`](Self::final_state).
    pub fn final_time(&self) -> Option<T> {
        match &self.end {
            Some((t, _)) => Some(*t),
            None => self.times.last().copied(),
        }
    }

    /// `(time, state)` pairs in sample order.
    pub fn iter(&self) -> impl Iterator<Item = (T, &[T])> + '_ {
        (0..self.len()).map(move |i| {
            (
                self.times[i],
                &self.states[i * self.dim..(i + 1) * self.dim],
            )
        })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// `true` if nothing was sampled.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// State length.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Work counters.
    pub fn stats(&self) -> SolveStats {
        self.stats
    }

    /// Replace the work counters.
    pub fn set_stats(&mut self, stats: SolveStats) {
        self.stats = stats;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_are_sliced_by_dim() {
        let mut sol = Solution::new(2);
        sol.push(0.0, &[1.0, 2.0]);
        sol.push(0.5, &[3.0, 4.0]);
        assert_eq!(sol.len(), 2);
        assert_eq!(sol.times(), &[0.0, 0.5]);
        assert_eq!(sol.state(1), Some(&[3.0, 4.0][..]));
        assert_eq!(sol.state(2), None);
        assert_eq!(sol.final_state(), Some(&[3.0, 4.0][..]));
        let pairs: Vec<_> = sol.iter().collect();
        assert_eq!(pairs[0], (0.0, &[1.0, 2.0][..]));
    }

    #[test]
    fn empty_solution_has_no_final_state() {
        let sol = Solution::<f64>::new(3);
        assert!(sol.is_empty());
        assert_eq!(sol.final_state(), None);
    }

    #[test]
    fn finish_overrides_last_sample() {
        let mut sol = Solution::new(1);
        sol.push(0.5, &[1.0]);
        assert_eq!(sol.final_time(), Some(0.5));
        sol.finish(2.0, &[7.0]);
        assert_eq!(sol.final_state(), Some(&[7.0][..]));
        assert_eq!(sol.final_time(), Some(2.0));
        assert_eq!(sol.len(), 1);
    }

    #[test]
    fn zero_dim_samples_still_count() {
        let mut sol = Solution::<f32>::new(0);
        sol.push(1.0, &[]);
        assert_eq!(sol.len(), 1);
        assert_eq!(sol.final_state(), Some(&[][..]));
    }

    #[test]
    #[should_panic(expected = "sample length")]
    fn push_rejects_wrong_length() {
        let mut sol = Solution::new(2);
        sol.push(0.0, &[1.0]);
    }
}
