use strum::Display;

use crate::model::Priority;
use crate::policy::Action;

/// Result of carrying out one planned action.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Outcome {
    /// No write was needed (or possible).
    Noop,
    /// The write succeeded.
    Applied,
    /// Dry-run mode: the write was logged, not sent.
    DryRun,
    /// The write failed; it will be re-evaluated next cycle.
    Failed(String),
}

/// Per-appliance line of a cycle report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplianceReport {
    pub priority: Priority,
    pub address: String,
    pub reachable: bool,
    /// Observed DHCP flag; `None` when the appliance could not be probed.
    pub before: Option<bool>,
    /// Believed DHCP flag after reconciliation.
    pub after: Option<bool>,
    pub action: Action,
    pub outcome: Outcome,
}

impl ApplianceReport {
    /// Whether this line recorded an attempted write (successful or not).
    pub fn attempted_write(&self) -> bool {
        matches!(self.outcome, Outcome::Applied | Outcome::Failed(_))
    }
}

/// Summary of one probe / select / reconcile pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub cycle: u64,
    pub selected: Option<Priority>,
    pub appliances: Vec<ApplianceReport>,
}

impl CycleReport {
    /// Number of write calls issued this cycle.
    pub fn writes(&self) -> usize {
        self.appliances
            .iter()
            .filter(|a| a.attempted_write())
            .count()
    }

    pub fn failures(&self) -> usize {
        self.appliances
            .iter()
            .filter(|a| matches!(a.outcome, Outcome::Failed(_)))
            .count()
    }

    /// Exactly the selected appliance (or none) is believed to run DHCP,
    /// among those that could be observed.
    pub fn is_converged(&self) -> bool {
        self.failures() == 0
            && self.appliances.iter().all(|a| match a.after {
                Some(on) => on == (self.selected == Some(a.priority)),
                None => true,
            })
    }
}
