use std::fmt;

use rustc_hash::FxHashMap;

use super::state::{CpuId, Ticks};
use crate::{error::TimelineError, sim::Registry};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Owner {
    Idle,
    Process(String),
}

impl Owner {
    pub fn process(id: impl Into<String>) -> Self {
        Self::Process(id.into())
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.pad("Idle"),
            Self::Process(id) => f.pad(id),
        }
    }
}

/// Half-open span `[start, end)` attributed to one owner on one processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub owner: Owner,
    pub start: Ticks,
    pub end: Ticks,
    pub cpu: CpuId,
}

impl Segment {
    pub fn duration(&self) -> Ticks {
        self.end - self.start
    }
}

/// Accumulates segments per processor, rejecting anything that would leave
/// a lane overlapping or with uncovered time. Adjacent idle spans merge.
#[derive(Debug)]
pub struct TimelineBuilder {
    lanes: Vec<Vec<Segment>>,
}

impl TimelineBuilder {
    pub fn new(num_cpus: usize) -> Self {
        Self {
            lanes: vec![Vec::new(); num_cpus],
        }
    }

    pub fn push(
        &mut self,
        owner: Owner,
        start: Ticks,
        end: Ticks,
        cpu: CpuId,
    ) -> Result<(), TimelineError> {
        let num_cpus = self.lanes.len();
        let lane = self
            .lanes
            .get_mut(cpu)
            .ok_or(TimelineError::UnknownProcessor { cpu, num_cpus })?;

        if start >= end {
            return Err(TimelineError::EmptySegment { cpu, start, end });
        }

        let prev_end = lane.last().map_or(0, |seg| seg.end);
        if start < prev_end {
            return Err(TimelineError::Overlap {
                cpu,
                prev_end,
                start,
            });
        }
        if start > prev_end {
            return Err(TimelineError::Gap {
                cpu,
                prev_end,
                start,
            });
        }

        if let Some(last) = lane.last_mut() {
            if last.owner.is_idle() && owner.is_idle() {
                last.end = end;
                return Ok(());
            }
        }

        lane.push(Segment {
            owner,
            start,
            end,
            cpu,
        });
        Ok(())
    }

    pub fn finish(self) -> Timeline {
        let num_cpus = self.lanes.len();
        let mut segments: Vec<Segment> = self.lanes.into_iter().flatten().collect();
        segments.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.cpu.cmp(&b.cpu)));
        Timeline { segments, num_cpus }
    }
}

/// Frozen result of a simulation run, ordered by start time then processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    segments: Vec<Segment>,
    num_cpus: usize,
}

impl Timeline {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn num_cpus(&self) -> usize {
        self.num_cpus
    }

    pub fn lane(&self, cpu: CpuId) -> impl Iterator<Item = &Segment> + '_ {
        self.segments.iter().filter(move |seg| seg.cpu == cpu)
    }

    pub fn makespan(&self) -> Ticks {
        self.segments.iter().map(|seg| seg.end).max().unwrap_or(0)
    }

    pub fn busy_time(&self, owner: &Owner) -> Ticks {
        self.segments
            .iter()
            .filter(|seg| &seg.owner == owner)
            .map(Segment::duration)
            .sum()
    }

    /// Re-checks every structural guarantee against the registry the run
    /// was built from.
    pub fn validate(&self, registry: &Registry) -> Result<(), TimelineError> {
        for cpu in 0..self.num_cpus {
            let mut prev_end = 0;
            for seg in self.lane(cpu) {
                if seg.start >= seg.end {
                    return Err(TimelineError::EmptySegment {
                        cpu,
                        start: seg.start,
                        end: seg.end,
                    });
                }
                if seg.start < prev_end {
                    return Err(TimelineError::Overlap {
                        cpu,
                        prev_end,
                        start: seg.start,
                    });
                }
                if seg.start > prev_end {
                    return Err(TimelineError::Gap {
                        cpu,
                        prev_end,
                        start: seg.start,
                    });
                }
                prev_end = seg.end;
            }
        }

        if let Some(seg) = self.segments.iter().find(|seg| seg.cpu >= self.num_cpus) {
            return Err(TimelineError::UnknownProcessor {
                cpu: seg.cpu,
                num_cpus: self.num_cpus,
            });
        }

        let mut served: FxHashMap<&str, Ticks> = FxHashMap::default();
        for seg in &self.segments {
            if let Owner::Process(id) = &seg.owner {
                if registry.pid_of(id).is_none() {
                    return Err(TimelineError::UnknownOwner(id.clone()));
                }
                *served.entry(id.as_str()).or_default() += seg.duration();
            }
        }
        for process in registry.iter() {
            let actual = served.get(process.id.as_str()).copied().unwrap_or(0);
            if actual != process.burst {
                return Err(TimelineError::BurstMismatch {
                    id: process.id.clone(),
                    expected: process.burst,
                    actual,
                });
            }
        }

        Ok(())
    }
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for seg in &self.segments {
            writeln!(
                f,
                "cpu{} {:>6} [{}, {})",
                seg.cpu, seg.owner, seg.start, seg.end
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Process;

    #[test]
    fn adjacent_idle_spans_merge() {
        let mut builder = TimelineBuilder::new(1);
        builder.push(Owner::Idle, 0, 2, 0).unwrap();
        builder.push(Owner::Idle, 2, 5, 0).unwrap();
        builder.push(Owner::process("P1"), 5, 6, 0).unwrap();
        let timeline = builder.finish();

        assert_eq!(timeline.segments().len(), 2);
        assert_eq!(timeline.segments()[0].end, 5);
        assert_eq!(timeline.makespan(), 6);
    }

    #[test]
    fn same_process_back_to_back_stays_split() {
        let mut builder = TimelineBuilder::new(1);
        builder.push(Owner::process("P1"), 0, 2, 0).unwrap();
        builder.push(Owner::process("P1"), 2, 4, 0).unwrap();
        assert_eq!(builder.finish().segments().len(), 2);
    }

    #[test]
    fn rejects_overlap_gap_and_empty() {
        let mut builder = TimelineBuilder::new(2);
        builder.push(Owner::process("P1"), 0, 3, 0).unwrap();

        assert_eq!(
            builder.push(Owner::process("P2"), 2, 4, 0),
            Err(TimelineError::Overlap {
                cpu: 0,
                prev_end: 3,
                start: 2
            })
        );
        assert_eq!(
            builder.push(Owner::process("P2"), 4, 6, 0),
            Err(TimelineError::Gap {
                cpu: 0,
                prev_end: 3,
                start: 4
            })
        );
        assert_eq!(
            builder.push(Owner::Idle, 3, 3, 0),
            Err(TimelineError::EmptySegment {
                cpu: 0,
                start: 3,
                end: 3
            })
        );
        assert!(matches!(
            builder.push(Owner::Idle, 0, 1, 2),
            Err(TimelineError::UnknownProcessor { cpu: 2, .. })
        ));
        // The other lane is independent
        builder.push(Owner::process("P2"), 0, 1, 1).unwrap();
    }

    #[test]
    fn validate_catches_short_service() {
        let registry = Registry::new(vec![
            Process::new("P1", 0, 3),
            Process::new("P2", 0, 1),
        ])
        .unwrap();
        let mut builder = TimelineBuilder::new(1);
        builder.push(Owner::process("P1"), 0, 3, 0).unwrap();
        let timeline = builder.finish();

        assert_eq!(
            timeline.validate(&registry),
            Err(TimelineError::BurstMismatch {
                id: "P2".into(),
                expected: 1,
                actual: 0
            })
        );
    }

    #[test]
    fn segments_sorted_by_start_then_cpu() {
        let mut builder = TimelineBuilder::new(2);
        builder.push(Owner::process("P1"), 0, 4, 0).unwrap();
        builder.push(Owner::Idle, 0, 1, 1).unwrap();
        builder.push(Owner::process("P2"), 1, 2, 1).unwrap();
        let timeline = builder.finish();

        let order: Vec<_> = timeline
            .segments()
            .iter()
            .map(|s| (s.start, s.cpu))
            .collect();
        assert_eq!(order, vec![(0, 0), (0, 1), (1, 1)]);
        assert_eq!(timeline.lane(1).count(), 2);
        assert_eq!(timeline.busy_time(&Owner::process("P1")), 4);
    }
}
