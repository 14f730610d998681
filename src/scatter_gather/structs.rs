//! The structs
//!
use std::{collections::{BTreeMap, HashMap}, sync::{mpsc::Receiver, Arc}, time::Instant};
use crate::endpoints::{Endpoint, ServerId};
use crate::error::FailureReason;
use crate::transport::Transport;

/// A single request of a fan-out call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanOutTarget {
    pub server: ServerId,
    pub endpoint: Endpoint,
    pub url: String,
}

/// The result of one dispatched request.
///
/// An outcome only knows the endpoint it was sent to, the server id is resolved by the aggregator.
/// A request that did not finish before the deadline produces no outcome at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success {
        endpoint: Endpoint,
        body: String,
    },
    Failure {
        endpoint: Endpoint,
        reason: FailureReason,
    },
}

/// Turns the body of a successful response into a typed payload.
///
/// A decode error is handled in the same way as a failed request.
pub trait ResponseDecoder {
    type Payload;
    fn decode(&self, body: &str) -> Result<Self::Payload, FailureReason>;
}

/// The merged result of a fan-out call.
///
/// `responses` only holds the servers that answered successfully with a body that could be decoded.
/// Every other invited server is in `failures`, with the reason it is missing.
/// A partial result is a normal result: check [GatherResult::is_complete] or `failures`.
#[derive(Debug, Clone, PartialEq)]
pub struct GatherResult<P> {
    pub responses: HashMap<ServerId, P>,
    pub failures: BTreeMap<ServerId, FailureReason>,
    pub invited: usize,
}

/// The outcomes of a dispatched call, in completion order.
///
/// Iteration ends when all expected outcomes are received, when all workers are gone,
/// or when the deadline is reached, whichever happens first.
/// Waiting for the next outcome never goes past the deadline.
#[derive(Debug)]
pub struct Completions {
    pub(super) rx: Receiver<Outcome>,
    pub(super) expected: usize,
    pub(super) received: usize,
    pub(super) deadline: Instant,
}

/// The engine: a transport shared by all requests, and a worker pool that limits the requests in flight.
///
/// Both are kept for the lifetime of the engine, so connections and threads are reused across calls.
pub struct ScatterGather<T: Transport> {
    pub(super) transport: Arc<T>,
    pub(super) pool: rayon::ThreadPool,
    pub(super) parallel: usize,
}
