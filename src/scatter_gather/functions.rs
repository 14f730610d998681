//! The impls and functions
//!
use std::{collections::{BTreeMap, HashMap, HashSet}, iter::FusedIterator, sync::{mpsc::{channel, RecvTimeoutError, TryRecvError}, Arc}, time::{Duration, Instant}};
use log::*;
use crate::endpoints::{Endpoint, EndpointRegistry, ServerId};
use crate::error::{FailureReason, GatherError, Result};
use crate::transport::Transport;
use crate::scatter_gather::{Completions, FanOutTarget, GatherResult, Outcome, ResponseDecoder, ScatterGather};

impl FanOutTarget {
    /// Create a target for every server in the registry, with the url created by `build_url`.
    pub fn for_registry<F>(
        registry: &EndpointRegistry,
        build_url: F,
    ) -> Result<Vec<FanOutTarget>>
    where
        F: Fn(&Endpoint) -> Result<String>,
    {
        registry.iter()
            .map(|(server, endpoint)| {
                Ok(FanOutTarget {
                    server: server.clone(),
                    endpoint: endpoint.clone(),
                    url: build_url(endpoint)?,
                })
            })
            .collect()
    }
}

impl Outcome {
    pub fn endpoint(&self) -> &Endpoint {
        match self {
            Outcome::Success { endpoint, .. } => endpoint,
            Outcome::Failure { endpoint, .. } => endpoint,
        }
    }
}

impl<P> GatherResult<P> {
    pub fn new(invited: usize) -> Self {
        GatherResult {
            responses: HashMap::new(),
            failures: BTreeMap::new(),
            invited,
        }
    }
    pub fn responded(&self) -> usize {
        self.responses.len()
    }
    pub fn is_complete(&self) -> bool {
        self.responses.len() == self.invited
    }
}

impl Completions {
    pub fn new(
        rx: std::sync::mpsc::Receiver<Outcome>,
        expected: usize,
        deadline: Instant,
    ) -> Self
    {
        Completions { rx, expected, received: 0, deadline }
    }
}

impl Iterator for Completions {
    type Item = Outcome;

    fn next(&mut self) -> Option<Outcome> {
        if self.received >= self.expected {
            return None;
        }
        let remaining = self.deadline.saturating_duration_since(Instant::now());
        let outcome = if remaining.is_zero() {
            // an outcome that is already waiting still counts, but there is no more waiting.
            match self.rx.try_recv() {
                Ok(outcome) => Some(outcome),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
            }
        } else {
            match self.rx.recv_timeout(remaining) {
                Ok(outcome) => Some(outcome),
                Err(RecvTimeoutError::Timeout) => {
                    debug!("deadline reached with {}/{} outcomes received", self.received, self.expected);
                    None
                },
                Err(RecvTimeoutError::Disconnected) => None,
            }
        };
        match outcome {
            Some(outcome) => {
                self.received += 1;
                Some(outcome)
            },
            None => {
                // make sure the iterator stays exhausted.
                self.expected = self.received;
                None
            },
        }
    }
}

impl FusedIterator for Completions {}

impl<T: Transport> ScatterGather<T> {
    /// Create the engine with a worker pool that runs at most `parallel` requests at the same time.
    pub fn new(
        transport: T,
        parallel: usize,
    ) -> Result<Self>
    {
        if parallel == 0 {
            return Err(GatherError::InvalidArgument("parallel must be at least 1".to_string()));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(parallel)
            .thread_name(|index| format!("scatter-gather-{}", index))
            .build()?;
        Ok(ScatterGather { transport: Arc::new(transport), pool, parallel })
    }
    pub fn transport(&self) -> &T {
        &self.transport
    }
    pub fn parallel(&self) -> usize {
        self.parallel
    }
    /// Send a request to every target, decode and merge the responses that arrive before `timeout` has passed.
    ///
    /// Only invalid arguments make the call fail, and they are found before any request is sent:
    /// a zero timeout, or targets that do not match the registry, or a server targeted twice.
    /// Servers that fail, or do not answer in time, are recorded in [GatherResult::failures].
    pub fn gather<D: ResponseDecoder>(
        &self,
        registry: &EndpointRegistry,
        resource_key: &str,
        targets: Vec<FanOutTarget>,
        decoder: &D,
        timeout: Duration,
    ) -> Result<GatherResult<D::Payload>>
    {
        if timeout.is_zero() {
            return Err(GatherError::InvalidArgument("timeout must be greater than 0".to_string()));
        }
        let mut invited = HashSet::with_capacity(targets.len());
        for target in &targets {
            if registry.address_of(&target.server)? != &target.endpoint {
                return Err(GatherError::InvalidArgument(format!("target {} ({}) does not match the endpoint registry", target.server, target.endpoint)));
            }
            if !invited.insert(target.server.clone()) {
                return Err(GatherError::InvalidArgument(format!("server {} is targeted more than once", target.server)));
            }
        }

        info!("reading {} from {} servers with timeout: {}ms", resource_key, targets.len(), timeout.as_millis());
        let timer = Instant::now();
        let deadline = timer + timeout;

        let completions = self.dispatch(targets, deadline);
        let result = aggregate(registry, invited, completions, decoder);

        if result.is_complete() {
            info!("finish reading {}: {}/{} servers responded, timeout: {}ms, elapsed: {:?}", resource_key, result.responded(), result.invited, timeout.as_millis(), timer.elapsed());
        } else {
            warn!("finish reading {}: {}/{} servers responded, timeout: {}ms, elapsed: {:?}", resource_key, result.responded(), result.invited, timeout.as_millis(), timer.elapsed());
        }
        Ok(result)
    }
    /// Spawn a request for every target on the worker pool, and return the outcomes as they complete.
    ///
    /// Every request is given the time that is left until `deadline` when it starts.
    /// A target that is still queued for a worker at the deadline is not sent at all.
    pub fn dispatch(
        &self,
        targets: Vec<FanOutTarget>,
        deadline: Instant,
    ) -> Completions
    {
        let expected = targets.len();
        let (tx, rx) = channel();
        for target in targets {
            let tx = tx.clone();
            let transport = Arc::clone(&self.transport);
            self.pool.spawn(move || {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    debug!("{}: deadline passed before the request was sent", target.url);
                    return;
                }
                let outcome = match transport.get(&target.url, remaining) {
                    Ok(response) if (200..300).contains(&response.status) => {
                        Outcome::Success { endpoint: target.endpoint, body: response.body }
                    },
                    Ok(response) => {
                        Outcome::Failure { endpoint: target.endpoint, reason: FailureReason::Status(response.status) }
                    },
                    Err(reason) => {
                        Outcome::Failure { endpoint: target.endpoint, reason }
                    },
                };
                // the receiver is gone when the outcome arrived after the collection ended.
                if tx.send(outcome).is_err() {
                    debug!("{}: outcome arrived after the deadline, discarded", target.url);
                }
            });
        }
        Completions::new(rx, expected, deadline)
    }
}

/// Merge the outcomes into a result keyed by server id.
///
/// The server of an outcome is looked up in the registry by the endpoint it came from.
/// An endpoint that is not in the registry, or that belongs to a server that was not invited, is dropped.
/// Every invited server without a decoded response ends up in the failures, as [FailureReason::Timeout]
/// when no outcome was received for it.
pub fn aggregate<D, I>(
    registry: &EndpointRegistry,
    invited: HashSet<ServerId>,
    completions: I,
    decoder: &D,
) -> GatherResult<D::Payload>
where
    D: ResponseDecoder,
    I: IntoIterator<Item = Outcome>,
{
    let mut result = GatherResult::new(invited.len());

    for outcome in completions {
        let server = match registry.server_of(outcome.endpoint()) {
            Ok(server) if invited.contains(server) => server.clone(),
            Ok(server) => {
                error!("outcome for server {} ({}), which was not invited, dropped", server, outcome.endpoint());
                continue;
            },
            Err(e) => {
                error!("outcome dropped: {}", e);
                continue;
            },
        };
        if result.responses.contains_key(&server) || result.failures.contains_key(&server) {
            error!("second outcome for server {} ({}) dropped", server, outcome.endpoint());
            continue;
        }
        let decoded = match outcome {
            Outcome::Success { body, .. } => decoder.decode(&body),
            Outcome::Failure { reason, .. } => Err(reason),
        };
        match decoded {
            Ok(payload) => {
                result.responses.insert(server, payload);
            },
            Err(reason) => {
                warn!("server: {} ({}) failed: {}", server, registry.address_of(&server).map(|e| e.as_str()).unwrap_or_default(), reason);
                result.failures.insert(server, reason);
            },
        }
    }

    for server in invited {
        if !result.responses.contains_key(&server) && !result.failures.contains_key(&server) {
            warn!("server: {} ({}) failed: {}", server, registry.address_of(&server).map(|e| e.as_str()).unwrap_or_default(), FailureReason::Timeout);
            result.failures.insert(server, FailureReason::Timeout);
        }
    }
    result
}
