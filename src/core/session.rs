//! Conversion session state machine.
//!
//! Tracks one user's source/target/amount selection together with the rate
//! table backing it. Every fetch gets a monotonically increasing request id;
//! a response is applied only if no newer fetch has started since, so a slow
//! response for an old source can never overwrite a newer selection.

use crate::core::rates::{
    ConversionRequest, ConversionResult, ConvertError, FetchError, RateProvider, RateTable,
    convert,
};
use thiserror::Error;
use tracing::debug;

pub type RequestId = u64;

/// Where the session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No fetch has started yet.
    Idle,
    /// A fetch for the current source is in flight.
    Fetching,
    /// A rate table is loaded and conversions can run.
    Ready,
    /// The last fetch or conversion failed; `error` says why.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Convert(#[from] ConvertError),

    /// A conversion was requested before any rate table finished loading.
    #[error("no rate table loaded; fetch rates for the source currency first")]
    NotReady,
}

/// Handle for one in-flight fetch, issued by [`ConversionSession::begin_fetch`]
/// and consumed by [`ConversionSession::apply_fetch`]. A ticket whose id has
/// been superseded by a newer fetch applies as a no-op.
#[derive(Debug)]
pub struct FetchTicket {
    id: RequestId,
    base: String,
}

impl FetchTicket {
    /// The source currency this fetch was started for.
    pub fn base(&self) -> &str {
        &self.base
    }
}

/// One user's conversion workflow: a source and target currency, an amount,
/// and at most one rate table (always for the current source).
#[derive(Debug)]
pub struct ConversionSession {
    source: String,
    target: String,
    amount: f64,
    phase: SessionPhase,
    table: Option<RateTable>,
    result: Option<ConversionResult>,
    error: Option<SessionError>,
    next_request: RequestId,
    current_request: Option<RequestId>,
}

impl ConversionSession {
    pub fn new(source: &str, target: &str) -> Self {
        ConversionSession {
            source: source.to_string(),
            target: target.to_string(),
            amount: 1.0,
            phase: SessionPhase::Idle,
            table: None,
            result: None,
            error: None,
            next_request: 0,
            current_request: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// The loaded rate table, if any. When present its base is always the
    /// session's current source.
    pub fn table(&self) -> Option<&RateTable> {
        self.table.as_ref()
    }

    pub fn result(&self) -> Option<ConversionResult> {
        self.result
    }

    pub fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    /// Updates the amount to convert. Rejects negative and non-finite values
    /// up front so the session never holds an amount `convert` would refuse.
    pub fn set_amount(&mut self, amount: f64) -> Result<(), ConvertError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(ConvertError::InvalidAmount { amount });
        }
        self.amount = amount;
        self.result = None;
        Ok(())
    }

    /// Changes the target currency. The loaded table keys rates by target, so
    /// no refetch happens; the stored result is dropped as out of date.
    pub fn set_target(&mut self, target: &str) {
        self.target = target.to_string();
        self.result = None;
    }

    /// Switches the source currency and starts a new fetch for it.
    ///
    /// The old table is discarded immediately, even though the new one has not
    /// arrived yet: a table for the wrong base must never serve a conversion.
    /// Any fetch still in flight is superseded by the returned ticket.
    pub fn begin_fetch(&mut self, source: &str) -> FetchTicket {
        let id = self.next_request;
        self.next_request += 1;
        self.source = source.to_string();
        self.table = None;
        self.result = None;
        self.error = None;
        self.phase = SessionPhase::Fetching;
        self.current_request = Some(id);
        debug!(request = id, source, "Fetching rate table");

        FetchTicket {
            id,
            base: source.to_string(),
        }
    }

    /// Exchanges source and target, then starts a fetch for the new source.
    pub fn begin_swap(&mut self) -> FetchTicket {
        std::mem::swap(&mut self.source, &mut self.target);
        let source = self.source.clone();
        self.begin_fetch(&source)
    }

    /// Lands the outcome of a fetch. Returns `false` when the ticket has been
    /// superseded by a newer fetch; the session is left untouched in that
    /// case, whatever the outcome carried.
    pub fn apply_fetch(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<RateTable, FetchError>,
    ) -> bool {
        if self.current_request != Some(ticket.id) {
            debug!(
                request = ticket.id,
                base = %ticket.base,
                "Ignoring superseded rate response"
            );
            return false;
        }
        self.current_request = None;

        match outcome {
            Ok(table) => {
                debug!(base = %table.base(), rates = table.len(), "Rate table loaded");
                self.table = Some(table);
                self.phase = SessionPhase::Ready;
            }
            Err(e) => {
                debug!(base = %ticket.base, error = %e, "Rate fetch failed");
                self.error = Some(SessionError::Fetch(e));
                self.phase = SessionPhase::Failed;
            }
        }
        true
    }

    /// Converts the current amount using the loaded table and stores the
    /// result. Without a table this fails with [`SessionError::NotReady`] and
    /// leaves the phase alone, since nothing about the session got worse.
    pub fn request_conversion(&mut self) -> Result<ConversionResult, SessionError> {
        let Some(table) = &self.table else {
            return Err(SessionError::NotReady);
        };
        let request = ConversionRequest {
            source: self.source.clone(),
            target: self.target.clone(),
            amount: self.amount,
        };

        match convert(table, &request) {
            Ok(result) => {
                self.result = Some(result);
                self.error = None;
                self.phase = SessionPhase::Ready;
                Ok(result)
            }
            Err(e) => {
                let error = SessionError::Convert(e);
                self.error = Some(error.clone());
                self.phase = SessionPhase::Failed;
                Err(error)
            }
        }
    }

    /// Switches to `source` and drives the fetch to completion.
    pub async fn change_source(
        &mut self,
        provider: &(dyn RateProvider + Send + Sync),
        source: &str,
    ) -> bool {
        let ticket = self.begin_fetch(source);
        let outcome = provider.fetch_rates(ticket.base()).await;
        self.apply_fetch(ticket, outcome)
    }

    /// Swaps source and target and drives the fetch to completion.
    pub async fn swap_currencies(&mut self, provider: &(dyn RateProvider + Send + Sync)) -> bool {
        let ticket = self.begin_swap();
        let outcome = provider.fetch_rates(ticket.base()).await;
        self.apply_fetch(ticket, outcome)
    }

    /// Refetches the table for the current source. Useful after a failed
    /// fetch, or to pick up a newer daily snapshot.
    pub async fn refresh(&mut self, provider: &(dyn RateProvider + Send + Sync)) -> bool {
        let source = self.source.clone();
        self.change_source(provider, &source).await
    }
}
