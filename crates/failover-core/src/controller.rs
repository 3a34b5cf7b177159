// ── Controller loop ──
//
// One cycle: probe every appliance in priority order, select the active
// one, reconcile DHCP flags, log. Every call is awaited sequentially; no
// two appliance calls are ever in flight at once.

use std::time::Duration;

use pihole_api::PiholeClient;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::api::DhcpApi;
use crate::config::ControllerConfig;
use crate::error::CoreError;
use crate::model::{Appliance, Observation, Priority};
use crate::policy::{self, Action};
use crate::report::{ApplianceReport, CycleReport, Outcome};

/// An appliance paired with the client used to talk to it.
pub struct Managed<A> {
    pub appliance: Appliance,
    pub api: A,
}

/// Periodic health checker and DHCP placement controller.
pub struct Controller<A> {
    appliances: Vec<Managed<A>>,
    check_interval: Duration,
    dry_run: bool,
    cycle: u64,
}

impl Controller<PiholeClient> {
    /// Build a controller with one [`PiholeClient`] per configured appliance.
    pub fn pihole(config: &ControllerConfig) -> Result<Self, CoreError> {
        let transport = config.transport();
        Self::new(config, |appliance| {
            PiholeClient::new(
                appliance.address.as_str(),
                appliance.credential.clone(),
                &transport,
            )
            .map_err(|source| CoreError::ClientSetup {
                priority: appliance.priority,
                source,
            })
        })
    }
}

impl<A: DhcpApi> Controller<A> {
    /// Build a controller, creating each appliance's client with `build`.
    pub fn new(
        config: &ControllerConfig,
        mut build: impl FnMut(&Appliance) -> Result<A, CoreError>,
    ) -> Result<Self, CoreError> {
        let appliances = config
            .appliances()
            .iter()
            .map(|appliance| {
                Ok(Managed {
                    api: build(appliance)?,
                    appliance: appliance.clone(),
                })
            })
            .collect::<Result<Vec<_>, CoreError>>()?;

        Ok(Self {
            appliances,
            check_interval: config.check_interval,
            dry_run: config.dry_run,
            cycle: 0,
        })
    }

    pub fn appliances(&self) -> &[Managed<A>] {
        &self.appliances
    }

    // ── Cycle steps ──────────────────────────────────────────────────

    /// Query one appliance's status. Never fails: any error downgrades the
    /// appliance to unreachable for this cycle.
    pub async fn probe(managed: &Managed<A>) -> Observation {
        let priority = managed.appliance.priority;
        match managed.api.dhcp_active().await {
            Ok(enabled) => {
                debug!(appliance = %priority, dhcp_enabled = enabled, "probe ok");
                Observation::up(priority, enabled)
            }
            Err(source) => {
                let err = CoreError::Probe { priority, source };
                if err.is_auth_failure() {
                    warn!(
                        appliance = %priority,
                        address = %managed.appliance.address,
                        error = %err,
                        "authentication failed -- check the app password; treating as unreachable"
                    );
                } else {
                    warn!(
                        appliance = %priority,
                        address = %managed.appliance.address,
                        error = %err,
                        "unreachable"
                    );
                }
                Observation::down(priority)
            }
        }
    }

    /// Probe every appliance, in priority order.
    pub async fn probe_all(&self) -> Vec<Observation> {
        let mut observations = Vec::with_capacity(self.appliances.len());
        for managed in &self.appliances {
            observations.push(Self::probe(managed).await);
        }
        observations
    }

    /// Issue the writes needed to make `observations` match `selected`.
    ///
    /// Observations are matched to appliances by priority, in any order. An
    /// appliance with no observation counts as unreachable. Unreachable
    /// appliances are not contacted. Failed writes are logged and not
    /// retried; the next cycle re-observes and retries.
    pub async fn reconcile(
        &self,
        selected: Option<Priority>,
        observations: &[Observation],
    ) -> Vec<ApplianceReport> {
        let observed: Vec<Observation> = self
            .appliances
            .iter()
            .map(|managed| {
                let priority = managed.appliance.priority;
                observations
                    .iter()
                    .find(|o| o.priority == priority)
                    .copied()
                    .unwrap_or_else(|| Observation::down(priority))
            })
            .collect();
        let planned = policy::plan(selected, &observed);
        let mut reports = Vec::with_capacity(planned.len());

        for (managed, (observation, (priority, action))) in self
            .appliances
            .iter()
            .zip(observed.iter().zip(planned))
        {
            let before = observation.reachable.then_some(observation.dhcp_enabled);
            let (after, outcome) = match action.target() {
                None => (before, Outcome::Noop),
                Some(_) if self.dry_run => {
                    info!(appliance = %priority, "dry run: would {} DHCP", action.verb());
                    (before, Outcome::DryRun)
                }
                Some(target) => match managed.api.set_dhcp_active(target).await {
                    Ok(()) => (Some(target), Outcome::Applied),
                    Err(source) => {
                        let err = CoreError::Reconcile {
                            priority,
                            verb: action.verb(),
                            source,
                        };
                        error!(appliance = %priority, error = %err, "DHCP update failed");
                        (before, Outcome::Failed(err.to_string()))
                    }
                },
            };

            reports.push(ApplianceReport {
                priority,
                address: managed.appliance.address.to_string(),
                reachable: observation.reachable,
                before,
                after,
                action,
                outcome,
            });
        }

        reports
    }

    /// Run one probe / select / reconcile pass and log its outcome.
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.cycle += 1;
        debug!(cycle = self.cycle, "starting check cycle");

        let observations = self.probe_all().await;
        let selected = policy::select_active(&observations);
        let appliances = self.reconcile(selected, &observations).await;

        let report = CycleReport {
            cycle: self.cycle,
            selected,
            appliances,
        };
        log_report(&report);
        report
    }

    /// Run cycles until `shutdown` is cancelled, then release sessions.
    ///
    /// Cancellation is only observed between cycles, so a cycle that has
    /// started always finishes its reconciliation.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        info!(
            appliances = self.appliances.len(),
            interval_secs = self.check_interval.as_secs(),
            dry_run = self.dry_run,
            "DHCP failover controller started"
        );

        loop {
            self.run_cycle().await;

            tokio::select! {
                () = shutdown.cancelled() => break,
                () = tokio::time::sleep(self.check_interval) => {}
            }
        }

        info!("shutdown requested, stopping after {} cycles", self.cycle);
        self.release_sessions().await;
    }

    /// Log out of every appliance. Failures are logged and ignored.
    pub async fn release_sessions(&self) {
        for managed in &self.appliances {
            if let Err(e) = managed.api.logout().await {
                debug!(appliance = %managed.appliance.priority, error = %e, "logout failed");
            }
        }
    }
}

fn log_report(report: &CycleReport) {
    for line in &report.appliances {
        info!(
            cycle = report.cycle,
            appliance = %line.priority,
            address = %line.address,
            reachable = line.reachable,
            before = ?line.before,
            after = ?line.after,
            action = %line.action,
            outcome = %line.outcome,
            "appliance state"
        );
    }

    match report.selected {
        Some(active) => info!(
            cycle = report.cycle,
            active = %active,
            writes = report.writes(),
            "cycle complete"
        ),
        None => warn!(
            cycle = report.cycle,
            writes = report.writes(),
            "all appliances unreachable -- no DHCP server enabled"
        ),
    }
}
