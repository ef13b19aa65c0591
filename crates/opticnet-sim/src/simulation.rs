//! Round loop: inject, route, move messages, account.

use opticnet_controller::{
    Controller, HasMessage, MessageId, NetworkStats, RoundReport, RoutingPolicy,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::{Result, SimulationConfig, TrafficSource};

/// A message still in the network.
#[derive(Debug, Clone, Copy)]
struct InFlight {
    message: HasMessage,
    injected: u64,
}

/// Outcome of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationResult {
    pub policy: &'static str,
    pub rounds: u64,
    pub delivered: u64,
    pub undelivered: u64,
    /// Rounds from injection to delivery, averaged over delivered messages
    pub mean_latency: f64,
    pub stats: NetworkStats,
    pub final_edges: Vec<(u32, u32)>,
}

/// Drives a [`Controller`] with traffic from a [`TrafficSource`].
pub struct Simulation {
    config: SimulationConfig,
    controller: Controller,
    traffic: TrafficSource,
    in_flight: Vec<InFlight>,
    next_message: u64,
    delivered: u64,
    total_latency: u64,
    round: u64,
}

impl Simulation {
    /// Build the initial tree and traffic source from `config`.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let controller = Controller::bottom_up(config.topology()?);
        let traffic = TrafficSource::new(&config);
        info!(
            num_nodes = config.num_nodes,
            root = %controller.topology().root(),
            "simulation ready"
        );

        Ok(Self {
            config,
            controller,
            traffic,
            in_flight: Vec::new(),
            next_message: 0,
            delivered: 0,
            total_latency: 0,
            round: 0,
        })
    }

    /// The controller being driven.
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Messages delivered so far.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// No more traffic to inject and nothing left to deliver.
    pub fn is_finished(&self) -> bool {
        self.traffic.is_exhausted() && self.in_flight.is_empty()
    }

    /// Run one round.
    pub fn step(&mut self) -> Result<RoundReport> {
        for (source, destination) in self.traffic.inject(self.round) {
            let id = MessageId(self.next_message);
            self.next_message += 1;
            self.in_flight.push(InFlight {
                message: HasMessage::new(id, source, destination),
                injected: self.round,
            });
        }

        for tracked in &self.in_flight {
            self.controller.submit(tracked.message);
        }

        let report = self.controller.controller_step()?;
        if self.config.check_invariants {
            self.controller.topology().validate()?;
        }

        let mut delivered_now = 0;
        for (message, forward) in report.forwards() {
            let Some(tracked) = self.in_flight.iter_mut().find(|t| t.message.id == message.id)
            else {
                continue;
            };
            tracked.message.current = forward.to;
            if forward.delivered {
                let latency = self.round - tracked.injected + 1;
                self.total_latency += latency;
                delivered_now += 1;
                debug!(message = %message.id, latency, "delivered");
            }
        }
        self.in_flight.retain(|t| !t.message.is_delivered());
        self.delivered += delivered_now;

        info!(
            round = self.round,
            active = report.active_records(),
            rotations = report.rotations.len(),
            delivered = delivered_now,
            in_flight = self.in_flight.len(),
            "round complete"
        );
        self.round += 1;
        Ok(report)
    }

    /// Step until every message is delivered or `max_rounds` is reached.
    pub fn run(mut self) -> Result<SimulationResult> {
        while !self.is_finished() && self.round < self.config.max_rounds {
            self.step()?;
        }
        Ok(self.result())
    }

    pub fn result(&self) -> SimulationResult {
        let mean_latency = if self.delivered == 0 {
            0.0
        } else {
            self.total_latency as f64 / self.delivered as f64
        };
        SimulationResult {
            policy: self.controller.policy().name(),
            rounds: self.round,
            delivered: self.delivered,
            undelivered: self.in_flight.len() as u64,
            mean_latency,
            stats: *self.controller.stats(),
            final_edges: self
                .controller
                .topology()
                .edges()
                .into_iter()
                .map(|(p, c)| (p.value(), c.value()))
                .collect(),
        }
    }
}
