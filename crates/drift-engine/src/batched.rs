//! Parallel integration over disjoint particle chunks.
//!
//! [`integrate_parallel`](ParticleSet::integrate_parallel) splits the
//! particles into contiguous column chunks and solves each on a scoped
//! worker thread. Results come back over a crossbeam channel and are
//! merged only after every worker has finished, so a failure anywhere
//! leaves the set untouched.
//!
//! Each chunk gets its own adaptive step sequence. With
//! [`SaveAt::Steps`](drift_solver::SaveAt::Steps) different chunks may
//! therefore sample different times. Every other save policy samples the
//! same times as a serial call, but positions agree with the serial ones
//! only to within the solver tolerance, not bit for bit.

use std::any::Any;
use std::cmp::Ordering;
use std::thread;
use std::time::Instant;

use crossbeam_channel::unbounded;
use drift_core::{Direction, IntegrateError, Real, TimeWindow};
use tracing::debug;

use crate::integrate::{flatten, unflatten, Chunk};
use crate::metrics::IntegrateReport;
use crate::particles::ParticleSet;

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

impl<T: Real, P: Send + Sync + 'static> ParticleSet<T, P> {
    /// Like [`integrate`](Self::integrate), spread over up to `workers`
    /// threads.
    ///
    /// `workers` is clamped to `[1, n_particles]`. Rows are merged in time
    /// order with particles in id order within each time.
    ///
    /// # Errors
    ///
    /// The first failing chunk's error, or
    /// [`IntegrateError::WorkerFailed`] if a worker panicked.
    pub fn integrate_parallel(
        &mut self,
        window: impl Into<TimeWindow<T>>,
        workers: usize,
    ) -> Result<IntegrateReport, IntegrateError> {
        let window = window.into();
        let started = Instant::now();
        let n = self.len();
        let dim = self.state_dim();
        let workers = workers.clamp(1, n.max(1));
        let per_worker = n.div_ceil(workers);
        let u0 = flatten(&self.position);
        let integrator = self.integrator();
        let ids = &self.ids;

        let (tx, rx) = unbounded::<(usize, Result<Chunk<T>, IntegrateError>)>();
        let joined: Vec<Result<(), String>> = thread::scope(|scope| {
            let handles: Vec<_> = ids
                .chunks(per_worker)
                .zip(u0.chunks(per_worker * dim))
                .enumerate()
                .map(|(index, (chunk_ids, chunk_u0))| {
                    let tx = tx.clone();
                    let integrator = &integrator;
                    scope.spawn(move || {
                        let outcome = integrator.run(chunk_ids, chunk_u0, window);
                        let _ = tx.send((index, outcome));
                    })
                })
                .collect();
            drop(tx);
            handles
                .into_iter()
                .map(|h| h.join().map_err(|p| panic_reason(p.as_ref())))
                .collect()
        });

        if let Some(reason) = joined.into_iter().find_map(Result::err) {
            return Err(IntegrateError::WorkerFailed { reason });
        }
        let mut chunks: Vec<(usize, Result<Chunk<T>, IntegrateError>)> = rx.try_iter().collect();
        let expected = n.div_ceil(per_worker);
        if chunks.len() != expected {
            return Err(IntegrateError::WorkerFailed {
                reason: format!("{} of {expected} workers reported", chunks.len()),
            });
        }
        chunks.sort_by_key(|(index, _)| *index);

        let mut report = IntegrateReport::default();
        let mut rows = Vec::new();
        let mut final_state = Vec::with_capacity(u0.len());
        let mut times: Vec<T> = Vec::new();
        for (_, outcome) in chunks {
            let chunk = outcome?;
            report.add_stats(chunk.stats);
            rows.extend(chunk.rows);
            final_state.extend(chunk.final_state);
            for t in chunk.times {
                if !times.contains(&t) {
                    times.push(t);
                }
            }
        }
        let direction = window.direction();
        // Stable: within one time, chunk order is id order.
        rows.sort_by(|a, b| {
            let ord = a.t.partial_cmp(&b.t).unwrap_or(Ordering::Equal);
            match direction {
                Direction::Forward => ord,
                Direction::Backward => ord.reverse(),
            }
        });
        let position = unflatten(final_state, dim, n)?;

        report.samples = times.len();
        report.rows_appended = self.record.append_new(rows, direction);
        self.position = position;
        report.elapsed_us = started.elapsed().as_micros() as u64;
        debug!(
            start = window.start.to_f64(),
            end = window.end.to_f64(),
            particles = n,
            workers = expected,
            samples = report.samples,
            rows_appended = report.rows_appended,
            "integrated window in parallel"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RawRows;
    use drift_field::{ArrayField2, VelocityField};
    use ndarray::Array2;

    fn shear() -> VelocityField<f64> {
        let u = Array2::from_shape_fn((12, 12), |(_, j)| 0.1 * j as f64);
        let v = Array2::from_elem((12, 12), 0.05);
        ArrayField2::stationary(u, v, (0.0, 5.0)).unwrap().into()
    }

    fn positions(n: usize) -> Array2<f64> {
        Array2::from_shape_fn((2, n), |(r, c)| 1.0 + c as f64 * 0.7 + r as f64 * 0.3)
    }

    #[test]
    fn parallel_matches_serial() {
        let mut serial = ParticleSet::for_field(shear(), positions(7)).build().unwrap();
        let mut parallel = serial.similar();
        parallel.reset_position(positions(7)).unwrap();

        serial.integrate((0.0, 5.0)).unwrap();
        let report = parallel.integrate_parallel((0.0, 5.0), 3).unwrap();
        assert_eq!(report.samples, 2);
        assert_eq!(report.rows_appended, 14);

        let ids: Vec<_> = parallel.record().iter().map(|r| r.id).collect();
        let serial_ids: Vec<_> = serial.record().iter().map(|r| r.id).collect();
        assert_eq!(ids, serial_ids);
        for (a, b) in serial.position().iter().zip(parallel.position().iter()) {
            assert!((a - b).abs() < 1e-6, "{a} vs {b}");
        }
    }

    #[test]
    fn worker_count_is_clamped() {
        let mut set = ParticleSet::for_field(shear(), positions(2)).build().unwrap();
        let report = set.integrate_parallel((0.0, 1.0), 64).unwrap();
        assert_eq!(report.rows_appended, 4);
        let report = set.integrate_parallel((1.0, 2.0), 0).unwrap();
        assert_eq!(report.rows_appended, 2);
    }

    #[test]
    fn panicking_velocity_function_is_reported() {
        let boom = |_: &(), _t: f64, s: &mut [f64], _out: &mut [f64]| {
            if s[0] > 2.0 {
                panic!("particle escaped");
            }
        };
        let mut set = ParticleSet::builder((), positions(4))
            .velocity_fn(boom)
            .postprocess(RawRows::new(2))
            .build_custom()
            .unwrap();
        let before = set.position().clone();
        let err = set.integrate_parallel((0.0, 1.0), 2).unwrap_err();
        assert_eq!(
            err,
            IntegrateError::WorkerFailed {
                reason: "particle escaped".to_string(),
            }
        );
        assert_eq!(set.position(), &before);
        assert!(set.record().is_empty());
    }
}
