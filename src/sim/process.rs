use std::str::FromStr;

use crate::{core::Ticks, error::InputError};

/// Immutable description of one process in the workload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pub id: String,
    pub arrival: Ticks,
    pub burst: Ticks,
}

impl Process {
    pub fn new(id: impl Into<String>, arrival: Ticks, burst: Ticks) -> Self {
        Self {
            id: id.into(),
            arrival,
            burst,
        }
    }
}

/// Parses `ID:ARRIVAL:BURST`. The id itself may contain `:`.
impl FromStr for Process {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || InputError::Malformed(s.to_owned());
        let mut fields = s.trim().rsplitn(3, ':');
        let burst = fields.next().ok_or_else(malformed)?;
        let arrival = fields.next().ok_or_else(malformed)?;
        let id = fields.next().filter(|id| !id.is_empty()).ok_or_else(malformed)?;

        let arrival: i64 = arrival.trim().parse().map_err(|_| malformed())?;
        if arrival < 0 {
            return Err(InputError::NegativeArrival(id.to_owned()));
        }
        let burst: Ticks = burst.trim().parse().map_err(|_| malformed())?;

        Ok(Self::new(id, arrival as Ticks, burst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_descriptor() {
        assert_eq!("P1:0:5".parse(), Ok(Process::new("P1", 0, 5)));
        assert_eq!("a:b:3:4".parse(), Ok(Process::new("a:b", 3, 4)));
    }

    #[test]
    fn rejects_bad_descriptors() {
        assert_eq!(
            "P1:-2:5".parse::<Process>(),
            Err(InputError::NegativeArrival("P1".into()))
        );
        for bad in ["P1:0", ":0:1", "P1:x:1", "P1:0:-1", ""] {
            assert!(
                matches!(bad.parse::<Process>(), Err(InputError::Malformed(_))),
                "{bad:?} should be malformed"
            );
        }
    }
}
