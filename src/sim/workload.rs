use rand::prelude::*;

use super::process::Process;
use crate::core::Ticks;

/// Shape of a randomly generated workload: every tick in `0..ticks` spawns
/// a process with probability `p_arrival`, short with probability `p_short`.
#[derive(Debug, Clone, Copy)]
pub struct BernoulliWorkload {
    pub ticks: Ticks,
    pub p_arrival: f64,
    pub p_short: f64,
    pub short_ticks: Ticks,
    pub long_ticks: Ticks,
    pub seed: u64,
}

impl Default for BernoulliWorkload {
    fn default() -> Self {
        Self {
            ticks: 50,
            p_arrival: 0.3,
            p_short: 0.3,
            short_ticks: 2,
            long_ticks: 6,
            seed: 0,
        }
    }
}

impl BernoulliWorkload {
    pub fn generate(&self) -> Vec<Process> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut processes = Vec::new();

        for t in 0..self.ticks {
            if rng.random::<f64>() < self.p_arrival {
                let burst = if rng.random::<f64>() < self.p_short {
                    self.short_ticks
                } else {
                    self.long_ticks
                };

                processes.push(Process::new(format!("P{}", processes.len() + 1), t, burst));
            }
        }

        processes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_workload() {
        let shape = BernoulliWorkload::default();
        assert_eq!(shape.generate(), shape.generate());
    }

    #[test]
    fn arrivals_sorted_and_bursts_from_mix() {
        let shape = BernoulliWorkload {
            ticks: 200,
            seed: 7,
            ..Default::default()
        };
        let processes = shape.generate();
        assert!(processes.windows(2).all(|w| w[0].arrival < w[1].arrival));
        assert!(
            processes
                .iter()
                .all(|p| p.burst == shape.short_ticks || p.burst == shape.long_ticks)
        );
    }
}
