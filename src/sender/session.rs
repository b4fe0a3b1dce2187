//! Send session: one object holding every collaborator a send needs.
//!
//! # Responsibilities
//! - Assemble collaborators and settings, failing early on missing pieces
//! - Validate a send request before any ledger mutation
//! - Run batches strictly in order, honoring the stop signal between batches
//! - Tag every log line of a run with its `run_id`

use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use crate::chain::client::{ChainClient, StatusSource, TokenProgram, TransactionSigner};
use crate::chain::rpc::JsonRpcClient;
use crate::chain::types::{Address, ChainError, Commitment};
use crate::config::{BatchConfig, ConsensusConfig, RetryConfig, SenderConfig};
use crate::consensus::ConsensusVerifier;
use crate::endpoints::{EndpointRegistry, StaticRegistry};
use crate::lifecycle::StopSignal;
use crate::recipients::{parse_recipients, partition, InputError, Recipient};
use crate::sender::batch::{BatchReport, BatchSubmitter};
use crate::sender::builder::TransferBuilder;
use crate::sender::ledger::ProgressLedger;

/// Errors that abort a whole send before any batch is attempted.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("invalid input: {0}")]
    Input(#[from] InputError),

    #[error("no signer available")]
    MissingSigner,

    #[error("no chain connection: {0}")]
    NoConnection(String),

    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    #[error(transparent)]
    Chain(#[from] ChainError),
}

/// What the caller asks to send.
#[derive(Debug, Clone)]
pub struct SendRequest {
    /// Mint address; `None` or blank means the mint is not configured.
    pub mint: Option<String>,
    /// Newline-delimited `address, amount` lines.
    pub recipients: String,
    pub batch_size: usize,
}

/// Result of one send invocation.
#[derive(Debug, Clone)]
pub struct SendOutcome {
    pub run_id: Uuid,
    pub completed: Vec<Recipient>,
    pub failed: Vec<Recipient>,
    /// Recipients of batches skipped after a stop request.
    pub pending: Vec<Recipient>,
    pub batches: Vec<BatchReport>,
    pub stopped: bool,
}

impl SendOutcome {
    pub fn total(&self) -> usize {
        self.completed.len() + self.failed.len() + self.pending.len()
    }
}

/// Builder for [`SendSession`].
#[derive(Default)]
pub struct SessionBuilder {
    chain: Option<Arc<dyn ChainClient>>,
    signer: Option<Arc<dyn TransactionSigner>>,
    program: Option<Arc<dyn TokenProgram>>,
    registry: Option<Arc<dyn EndpointRegistry>>,
    status_source: Option<Arc<dyn StatusSource>>,
    batch: BatchConfig,
    retry: RetryConfig,
    consensus: ConsensusConfig,
    commitment: Option<Commitment>,
}

impl SessionBuilder {
    pub fn chain_client(mut self, chain: Arc<dyn ChainClient>) -> Self {
        self.chain = Some(chain);
        self
    }

    pub fn signer(mut self, signer: Arc<dyn TransactionSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn token_program(mut self, program: Arc<dyn TokenProgram>) -> Self {
        self.program = Some(program);
        self
    }

    pub fn registry(mut self, registry: Arc<dyn EndpointRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn status_source(mut self, source: Arc<dyn StatusSource>) -> Self {
        self.status_source = Some(source);
        self
    }

    /// Take batch, retry, consensus and commitment settings from `config`.
    pub fn config(mut self, config: &SenderConfig) -> Self {
        self.batch = config.batch.clone();
        self.retry = config.retry.clone();
        self.consensus = config.consensus.clone();
        self.commitment = Some(config.rpc.confirm_commitment);
        self
    }

    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn build(self) -> Result<SendSession, SendError> {
        let chain = self
            .chain
            .ok_or_else(|| SendError::NoConnection("no chain client configured".into()))?;
        let signer = self.signer.ok_or(SendError::MissingSigner)?;
        let program = self
            .program
            .ok_or(SendError::MissingCollaborator("token program"))?;
        let registry = self
            .registry
            .ok_or(SendError::MissingCollaborator("endpoint registry"))?;
        let source = self
            .status_source
            .ok_or(SendError::MissingCollaborator("status source"))?;

        Ok(SendSession {
            chain,
            signer,
            program,
            verifier: ConsensusVerifier::new(registry, source, &self.consensus),
            batch: self.batch,
            retry: self.retry,
            commitment: self.commitment.unwrap_or(Commitment::Confirmed),
        })
    }
}

/// Everything one send invocation runs against.
pub struct SendSession {
    chain: Arc<dyn ChainClient>,
    signer: Arc<dyn TransactionSigner>,
    program: Arc<dyn TokenProgram>,
    verifier: ConsensusVerifier,
    batch: BatchConfig,
    retry: RetryConfig,
    commitment: Commitment,
}

impl SendSession {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    /// Session backed by JSON-RPC against the configured primary endpoint.
    pub fn connect(
        config: &SenderConfig,
        signer: Arc<dyn TransactionSigner>,
        program: Arc<dyn TokenProgram>,
    ) -> Result<Self, SendError> {
        let registry = StaticRegistry::from_config(config)
            .map_err(|e| SendError::NoConnection(e.to_string()))?;
        let primary = registry
            .primary_endpoint()
            .ok_or_else(|| SendError::NoConnection("no enabled endpoint".into()))?;
        let rpc = Arc::new(JsonRpcClient::new(&primary, &config.rpc)?);

        tracing::info!(network = %config.network, primary = %primary.label, "Connected");

        Self::builder()
            .config(config)
            .chain_client(rpc.clone())
            .status_source(rpc)
            .signer(signer)
            .token_program(program)
            .registry(Arc::new(registry))
            .build()
    }

    pub fn verifier(&self) -> &ConsensusVerifier {
        &self.verifier
    }

    /// Send `request`, reporting progress into `ledger`.
    ///
    /// Input problems fail the call before the ledger is touched. Once
    /// batches start, per-attempt failures are absorbed and only show up as
    /// failed recipients.
    pub async fn send(
        &self,
        request: &SendRequest,
        ledger: &mut dyn ProgressLedger,
        stop: &StopSignal,
    ) -> Result<SendOutcome, SendError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("send", %run_id);
        self.run(run_id, request, ledger, stop).instrument(span).await
    }

    async fn run(
        &self,
        run_id: Uuid,
        request: &SendRequest,
        ledger: &mut dyn ProgressLedger,
        stop: &StopSignal,
    ) -> Result<SendOutcome, SendError> {
        let mint_text = request
            .mint
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .ok_or(InputError::MintNotConfigured)?;
        let mint: Address = mint_text.parse().map_err(|source| InputError::InvalidMint {
            address: mint_text.to_string(),
            source,
        })?;

        let mint_account = self
            .chain
            .get_account_info(&mint, self.commitment)
            .await?
            .ok_or_else(|| InputError::MintNotFound(mint.to_string()))?;
        let decimals = self.program.mint_decimals(&mint_account)?;

        let recipients = parse_recipients(&request.recipients, decimals)?;
        let batches = partition(&recipients, request.batch_size, self.batch.max_size)?;

        if !self.verifier.quorum_reachable() {
            tracing::warn!("Consensus threshold exceeds enabled endpoints, verification cannot reach quorum");
        }

        tracing::info!(
            mint = %mint,
            decimals,
            recipients = recipients.len(),
            batches = batches.len(),
            batch_size = request.batch_size,
            "Starting send"
        );

        ledger.mark_pending(&recipients);

        let builder = TransferBuilder::new(
            self.chain.as_ref(),
            self.program.as_ref(),
            self.signer.payer(),
            mint,
            self.commitment,
        );
        let submitter = BatchSubmitter::new(
            self.chain.as_ref(),
            self.signer.as_ref(),
            builder,
            &self.retry,
            self.commitment,
            self.batch.max_size,
        )
        .with_verifier(&self.verifier);

        let mut reports = Vec::with_capacity(batches.len());
        let mut stopped = false;
        for (index, batch) in batches.iter().enumerate() {
            if stop.is_triggered() {
                stopped = true;
                tracing::warn!(
                    remaining = batches.len() - index,
                    "Stop requested, leaving remaining batches pending"
                );
                break;
            }
            tracing::info!(batch = index, size = batch.len(), "Processing batch");
            reports.push(submitter.process_batch(index, batch, ledger).await);
        }

        let mut outcome = SendOutcome {
            run_id,
            completed: Vec::new(),
            failed: Vec::new(),
            pending: Vec::new(),
            batches: reports,
            stopped,
        };
        let completed: HashSet<usize> = outcome
            .batches
            .iter()
            .flat_map(|report| report.completed.iter().copied())
            .collect();
        let failed: HashSet<usize> = outcome
            .batches
            .iter()
            .flat_map(|report| report.failed.iter().copied())
            .collect();
        for recipient in recipients {
            if completed.contains(&recipient.line) {
                outcome.completed.push(recipient);
            } else if failed.contains(&recipient.line) {
                outcome.failed.push(recipient);
            } else {
                outcome.pending.push(recipient);
            }
        }

        tracing::info!(
            completed = outcome.completed.len(),
            failed = outcome.failed.len(),
            pending = outcome.pending.len(),
            stopped,
            "Send finished"
        );
        Ok(outcome)
    }
}
