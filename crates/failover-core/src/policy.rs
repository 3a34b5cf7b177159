// ── Failover decision ──
//
// Pure functions over one cycle's observations. No hysteresis and no
// minimum dwell time: a node that answers the probe qualifies immediately,
// so a node flapping every cycle causes enable/disable churn every cycle.

use strum::Display;

use crate::model::{Observation, Priority};

/// What the controller decides to do with one appliance this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Action {
    /// Selected but observed disabled.
    Enable,
    /// Reachable, not selected, observed enabled.
    Disable,
    /// Reachable and already in the desired state.
    #[strum(serialize = "none")]
    Keep,
    /// Unreachable and not selected -- no call is attempted.
    #[strum(serialize = "skipped")]
    Skip,
}

impl Action {
    /// The DHCP flag this action writes, if it writes at all.
    pub fn target(self) -> Option<bool> {
        match self {
            Self::Enable => Some(true),
            Self::Disable => Some(false),
            Self::Keep | Self::Skip => None,
        }
    }

    pub(crate) fn verb(self) -> &'static str {
        match self {
            Self::Enable => "enable",
            Self::Disable => "disable",
            Self::Keep | Self::Skip => "leave",
        }
    }
}

/// Pick the appliance that should run DHCP: the first reachable one.
///
/// `observations` must be in ascending priority order, which the
/// controller guarantees by probing in that order.
pub fn select_active(observations: &[Observation]) -> Option<Priority> {
    observations
        .iter()
        .find(|o| o.reachable)
        .map(|o| o.priority)
}

/// Decide the minimal set of writes that makes observed state match
/// `selected`. Returns one action per observation, in the same order.
pub fn plan(selected: Option<Priority>, observations: &[Observation]) -> Vec<(Priority, Action)> {
    observations
        .iter()
        .map(|o| (o.priority, decide(selected, o)))
        .collect()
}

fn decide(selected: Option<Priority>, o: &Observation) -> Action {
    if !o.reachable {
        return Action::Skip;
    }
    match (selected == Some(o.priority), o.dhcp_enabled) {
        (true, false) => Action::Enable,
        (false, true) => Action::Disable,
        (true, true) | (false, false) => Action::Keep,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    use super::*;

    fn observations(reachable: &[bool], enabled: &[bool]) -> Vec<Observation> {
        Priority::iter()
            .zip(reachable.iter().zip(enabled))
            .map(|(priority, (&up, &on))| {
                if up {
                    Observation::up(priority, on)
                } else {
                    Observation::down(priority)
                }
            })
            .collect()
    }

    #[test]
    fn select_active_picks_lowest_reachable_rank_for_every_vector() {
        for mask in 0u8..8 {
            let reachable = [mask & 1 != 0, mask & 2 != 0, mask & 4 != 0];
            let obs = observations(&reachable, &[false; 3]);
            let expected = Priority::iter()
                .zip(reachable)
                .find(|(_, up)| *up)
                .map(|(p, _)| p);
            assert_eq!(select_active(&obs), expected, "reachability {reachable:?}");
        }
    }

    #[test]
    fn two_server_mode_never_considers_a_third_candidate() {
        let obs = observations(&[false, false], &[false, false]);
        assert_eq!(obs.len(), 2);
        assert_eq!(select_active(&obs), None);

        let obs = observations(&[false, true], &[false, false]);
        assert_eq!(select_active(&obs), Some(Priority::Secondary));

        let obs = observations(&[true, true], &[false, true]);
        assert_eq!(
            plan(select_active(&obs), &obs),
            vec![
                (Priority::Primary, Action::Enable),
                (Priority::Secondary, Action::Disable),
            ]
        );
    }

    #[test]
    fn failover_to_secondary() {
        let obs = observations(&[false, true, true], &[false, false, true]);
        let selected = select_active(&obs);
        assert_eq!(selected, Some(Priority::Secondary));
        assert_eq!(
            plan(selected, &obs),
            vec![
                (Priority::Primary, Action::Skip),
                (Priority::Secondary, Action::Enable),
                (Priority::Tertiary, Action::Disable),
            ]
        );
    }

    #[test]
    fn failback_to_primary() {
        let obs = observations(&[true, true, true], &[false, true, false]);
        let selected = select_active(&obs);
        assert_eq!(selected, Some(Priority::Primary));
        assert_eq!(
            plan(selected, &obs),
            vec![
                (Priority::Primary, Action::Enable),
                (Priority::Secondary, Action::Disable),
                (Priority::Tertiary, Action::Keep),
            ]
        );
    }

    #[test]
    fn total_outage_plans_no_writes() {
        let obs = observations(&[false, false, false], &[false, false, false]);
        let selected = select_active(&obs);
        assert_eq!(selected, None);
        assert!(plan(selected, &obs).iter().all(|(_, a)| *a == Action::Skip));
    }

    #[test]
    fn already_correct_state_plans_no_writes() {
        let obs = observations(&[true, true, true], &[true, false, false]);
        let planned = plan(select_active(&obs), &obs);
        assert!(planned.iter().all(|(_, a)| a.target().is_none()));
    }

    #[test]
    fn no_selection_still_disables_reachable_enabled_nodes() {
        // Boundary case: nothing selected but a node observed up and enabled.
        let obs = vec![Observation::down(Priority::Primary), Observation::up(Priority::Secondary, true)];
        assert_eq!(
            plan(None, &obs),
            vec![
                (Priority::Primary, Action::Skip),
                (Priority::Secondary, Action::Disable),
            ]
        );
    }

    #[test]
    fn unreachable_appliance_is_never_written_even_if_selected() {
        let obs = vec![Observation::down(Priority::Primary), Observation::up(Priority::Secondary, true)];
        assert_eq!(
            plan(Some(Priority::Primary), &obs),
            vec![
                (Priority::Primary, Action::Skip),
                (Priority::Secondary, Action::Disable),
            ]
        );
    }

    #[test]
    fn action_labels() {
        assert_eq!(Action::Enable.to_string(), "enable");
        assert_eq!(Action::Disable.to_string(), "disable");
        assert_eq!(Action::Keep.to_string(), "none");
        assert_eq!(Action::Skip.to_string(), "skipped");
    }
}
