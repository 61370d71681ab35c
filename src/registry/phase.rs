use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use super::Agent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Phase {
    #[serde(rename = "1.1")]
    P1_1,
    #[serde(rename = "1.2")]
    P1_2,
    #[serde(rename = "1.3")]
    P1_3,
    #[serde(rename = "2")]
    P2,
    #[serde(rename = "3")]
    P3,
    #[serde(rename = "4")]
    P4,
    #[serde(rename = "5")]
    P5,
    #[serde(rename = "6")]
    P6,
}

impl Phase {
    pub const ALL: [Phase; 8] = [
        Phase::P1_1,
        Phase::P1_2,
        Phase::P1_3,
        Phase::P2,
        Phase::P3,
        Phase::P4,
        Phase::P5,
        Phase::P6,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::P1_1 => "1.1",
            Self::P1_2 => "1.2",
            Self::P1_3 => "1.3",
            Self::P2 => "2",
            Self::P3 => "3",
            Self::P4 => "4",
            Self::P5 => "5",
            Self::P6 => "6",
        }
    }

    /// Direct dependencies of this phase.
    pub fn depends_on(self) -> &'static [Phase] {
        const PHASE_ONE: &[Phase] = &[Phase::P1_1, Phase::P1_2, Phase::P1_3];
        match self {
            Self::P1_1 | Self::P1_2 | Self::P1_3 => &[],
            Self::P2 => PHASE_ONE,
            Self::P3 => &[Phase::P2],
            Self::P4 => &[Phase::P3],
            Self::P5 => &[Phase::P4],
            Self::P6 => &[
                Phase::P1_1,
                Phase::P1_2,
                Phase::P1_3,
                Phase::P2,
                Phase::P3,
                Phase::P4,
                Phase::P5,
            ],
        }
    }

    /// Agents assigned to this phase, in declaration order.
    pub fn agents(self) -> Vec<Agent> {
        Agent::ALL
            .into_iter()
            .filter(|a| a.phase() == self)
            .collect()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Layers the phase DAG: each group holds the phases whose dependencies
/// all sit in earlier groups. Groups are launched in order, members in parallel.
pub fn barrier_groups() -> Vec<Vec<Phase>> {
    let mut placed: HashSet<Phase> = HashSet::new();
    let mut groups = Vec::new();

    while placed.len() < Phase::ALL.len() {
        let layer: Vec<Phase> = Phase::ALL
            .into_iter()
            .filter(|p| !placed.contains(p))
            .filter(|p| p.depends_on().iter().all(|d| placed.contains(d)))
            .collect();

        // The table is acyclic; an empty layer would mean it no longer is.
        debug_assert!(!layer.is_empty(), "phase graph contains a cycle");
        if layer.is_empty() {
            break;
        }

        placed.extend(layer.iter().copied());
        groups.push(layer);
    }

    groups
}
