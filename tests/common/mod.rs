//! Shared fakes for integration tests.
//!
//! `FakeProgram` composes a transaction as JSON of `(instructions, blockhash)`
//! and `FakeChain` decodes it again, so a test policy can decide each
//! submission's fate from the recipients it carries.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use batch_sender::chain::{
    AccountInfo, Address, ChainClient, ChainError, ChainResult, Commitment, ConfirmationTier,
    Instruction, LatestBlockhash, Signature, SignatureStatus, SignedTransaction, SignerError,
    SimulationResult, StatusSource, TokenProgram, TransactionSigner, UnsignedTransaction,
};
use batch_sender::config::{RetryConfig, SenderConfig};
use batch_sender::endpoints::{Endpoint, StaticRegistry};
use batch_sender::sender::{SendSession, SessionBuilder};

pub const MINT: &str = "So11111111111111111111111111111111111111112";
pub const PAYER: &str = "7EcDhSYGxXyscszYEp35KHN8vvw3svAuLKTzXwCFLtV";
pub const DECIMALS: u8 = 6;

/// Distinct valid address for index `n`.
pub fn addr(n: usize) -> Address {
    let mut bytes = [0xA5u8; 32];
    bytes[24..].copy_from_slice(&(n as u64).to_be_bytes());
    Address::from_bytes(bytes)
}

/// Token account the fake program derives for `owner`; applying it twice
/// gives back the owner.
pub fn ata(owner: &Address) -> Address {
    let mut bytes = [0u8; 32];
    let decoded = bs58::decode(owner.as_str()).into_vec().unwrap();
    bytes.copy_from_slice(&decoded);
    bytes.reverse();
    Address::from_bytes(bytes)
}

/// `count` recipients, amount `i + 1` whole tokens each.
pub fn recipients_text(count: usize) -> String {
    (0..count)
        .map(|i| format!("{}, {}\n", addr(i), i + 1))
        .collect()
}

/// What the fake network does with one submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Land,
    FailOnChain(String),
    FailSend(String),
    Expire,
}

/// A decoded transaction as the fake network saw it.
#[derive(Debug, Clone)]
pub struct Submission {
    pub instructions: Vec<Instruction>,
    pub recipients: Vec<Address>,
    pub created: Vec<Address>,
    pub blockhash: String,
}

impl Submission {
    fn decode(bytes: &[u8]) -> ChainResult<Self> {
        let (instructions, blockhash): (Vec<Instruction>, String) = serde_json::from_slice(bytes)
            .map_err(|e| ChainError::Malformed(e.to_string()))?;

        let mut recipients = Vec::new();
        let mut created = Vec::new();
        for instruction in &instructions {
            match instruction {
                Instruction::Transfer { destination, .. } => recipients.push(ata(destination)),
                Instruction::CreateAssociatedAccount { account, .. } => created.push(account.clone()),
            }
        }

        Ok(Self {
            instructions,
            recipients,
            created,
            blockhash,
        })
    }

    pub fn carries(&self, address: &Address) -> bool {
        self.recipients.contains(address)
    }
}

pub type Policy = Arc<dyn Fn(&Submission) -> Verdict + Send + Sync>;

pub struct FakeChain {
    policy: Policy,
    mint_present: bool,
    existing: Mutex<HashSet<Address>>,
    pending: Mutex<HashMap<Signature, (Verdict, Submission)>>,
    pub submissions: Mutex<Vec<Submission>>,
    pub simulations: Mutex<Vec<Submission>>,
    pub blockhash_fetches: AtomicUsize,
    pub account_lookups: AtomicUsize,
}

impl FakeChain {
    pub fn new(policy: impl Fn(&Submission) -> Verdict + Send + Sync + 'static) -> Self {
        Self {
            policy: Arc::new(policy),
            mint_present: true,
            existing: Mutex::new(HashSet::new()),
            pending: Mutex::new(HashMap::new()),
            submissions: Mutex::new(Vec::new()),
            simulations: Mutex::new(Vec::new()),
            blockhash_fetches: AtomicUsize::new(0),
            account_lookups: AtomicUsize::new(0),
        }
    }

    /// Every submission lands.
    pub fn landing() -> Self {
        Self::new(|_| Verdict::Land)
    }

    pub fn without_mint(mut self) -> Self {
        self.mint_present = false;
        self
    }

    /// Mark the token account of `owner` as already created.
    pub fn with_account(self, owner: &Address) -> Self {
        self.existing.lock().unwrap().insert(ata(owner));
        self
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn simulation_count(&self) -> usize {
        self.simulations.lock().unwrap().len()
    }
}

#[async_trait]
impl ChainClient for FakeChain {
    async fn get_account_info(
        &self,
        address: &Address,
        _commitment: Commitment,
    ) -> ChainResult<Option<AccountInfo>> {
        if address.as_str() == MINT {
            return Ok(self.mint_present.then(|| AccountInfo {
                owner: "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA".into(),
                lamports: 1_461_600,
                data: vec![DECIMALS],
            }));
        }

        self.account_lookups.fetch_add(1, Ordering::SeqCst);
        let exists = self.existing.lock().unwrap().contains(address);
        Ok(exists.then(|| AccountInfo {
            owner: "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA".into(),
            lamports: 2_039_280,
            data: Vec::new(),
        }))
    }

    async fn get_latest_blockhash(&self, _commitment: Commitment) -> ChainResult<LatestBlockhash> {
        let n = self.blockhash_fetches.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(LatestBlockhash {
            blockhash: format!("hash-{}", n),
            last_valid_block_height: 1_000 + n as u64,
        })
    }

    async fn simulate(&self, tx: &UnsignedTransaction) -> ChainResult<SimulationResult> {
        let submission = Submission::decode(&tx.0)?;
        let verdict = (self.policy)(&submission);
        self.simulations.lock().unwrap().push(submission);

        Ok(match verdict {
            Verdict::FailOnChain(message) => SimulationResult {
                err: Some(json!({ "InstructionError": [0, { "Custom": message }] })),
                logs: vec![format!("Program log: Error: {}", message)],
            },
            _ => SimulationResult::default(),
        })
    }

    async fn send_raw(&self, tx: &SignedTransaction) -> ChainResult<Signature> {
        let submission = Submission::decode(&tx.bytes)?;
        let verdict = (self.policy)(&submission);
        self.submissions.lock().unwrap().push(submission.clone());

        if let Verdict::FailSend(message) = verdict {
            return Err(ChainError::Rpc(message));
        }
        self.pending
            .lock()
            .unwrap()
            .insert(tx.signature.clone(), (verdict, submission));
        Ok(tx.signature.clone())
    }

    async fn confirm(
        &self,
        signature: &Signature,
        blockhash: &LatestBlockhash,
        _commitment: Commitment,
    ) -> ChainResult<Option<serde_json::Value>> {
        let (verdict, submission) = self
            .pending
            .lock()
            .unwrap()
            .remove(signature)
            .ok_or_else(|| ChainError::Rpc(format!("unknown signature {}", signature)))?;

        match verdict {
            Verdict::Land => {
                self.existing.lock().unwrap().extend(submission.created);
                Ok(None)
            }
            Verdict::FailOnChain(message) => Ok(Some(json!({ "InstructionError": [0, message] }))),
            Verdict::Expire => Err(ChainError::ConfirmationTimeout {
                last_valid_block_height: blockhash.last_valid_block_height,
            }),
            Verdict::FailSend(_) => unreachable!("rejected at send"),
        }
    }

    async fn get_signature_status(
        &self,
        _signature: &Signature,
        _search_history: bool,
    ) -> ChainResult<Option<SignatureStatus>> {
        Ok(None)
    }
}

/// Signs by handing out `sig-N`.
#[derive(Default)]
pub struct FakeSigner {
    count: AtomicUsize,
    reject: bool,
}

impl FakeSigner {
    pub fn rejecting() -> Self {
        Self {
            count: AtomicUsize::new(0),
            reject: true,
        }
    }
}

#[async_trait]
impl TransactionSigner for FakeSigner {
    fn payer(&self) -> Address {
        PAYER.parse().unwrap()
    }

    async fn sign(&self, tx: UnsignedTransaction) -> Result<SignedTransaction, SignerError> {
        if self.reject {
            return Err(SignerError::UserRejected);
        }
        let n = self.count.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(SignedTransaction {
            bytes: tx.0,
            signature: Signature(format!("sig-{}", n)),
        })
    }
}

pub struct FakeProgram;

impl TokenProgram for FakeProgram {
    fn associated_account(&self, owner: &Address, _mint: &Address) -> ChainResult<Address> {
        Ok(ata(owner))
    }

    fn mint_decimals(&self, mint_account: &AccountInfo) -> ChainResult<u8> {
        mint_account
            .data
            .first()
            .copied()
            .ok_or_else(|| ChainError::Program("mint data too short".into()))
    }

    fn compose(
        &self,
        _payer: &Address,
        instructions: &[Instruction],
        blockhash: &LatestBlockhash,
    ) -> ChainResult<UnsignedTransaction> {
        serde_json::to_vec(&(instructions, &blockhash.blockhash))
            .map(UnsignedTransaction)
            .map_err(|e| ChainError::Program(e.to_string()))
    }
}

/// How a fake endpoint answers a status query.
#[derive(Debug, Clone)]
pub enum Reply {
    Tier(&'static str),
    NotFound,
    ExecutionError,
    Fail(String),
    Hang,
}

/// Status lookups answered per endpoint id; unknown ids report finalized.
#[derive(Default)]
pub struct FakeStatusSource {
    replies: HashMap<String, Reply>,
    pub queries: AtomicUsize,
}

impl FakeStatusSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, endpoint_id: &str, reply: Reply) -> Self {
        self.replies.insert(endpoint_id.to_string(), reply);
        self
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusSource for FakeStatusSource {
    async fn signature_status(
        &self,
        endpoint: &Endpoint,
        _signature: &Signature,
    ) -> ChainResult<Option<SignatureStatus>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .replies
            .get(&endpoint.id)
            .cloned()
            .unwrap_or(Reply::Tier("finalized"));

        match reply {
            Reply::Tier(tier) => Ok(Some(SignatureStatus {
                tier: ConfirmationTier::from_wire(tier),
                err: None,
            })),
            Reply::NotFound => Ok(None),
            Reply::ExecutionError => Ok(Some(SignatureStatus {
                tier: ConfirmationTier::Finalized,
                err: Some(json!({ "InstructionError": [0, "InvalidAccountData"] })),
            })),
            Reply::Fail(message) => Err(ChainError::Rpc(message)),
            Reply::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}

/// `count` enabled endpoints with ids `ep-0..`.
pub fn endpoints(count: usize) -> Vec<Endpoint> {
    (0..count)
        .map(|i| Endpoint::new(format!("ep-{}", i), format!("Endpoint {}", i), format!("https://rpc{}.example.com", i)))
        .collect()
}

pub fn registry(count: usize, threshold: usize) -> Arc<StaticRegistry> {
    Arc::new(StaticRegistry::new(endpoints(count), None, threshold))
}

/// Config with retry backoff disabled.
pub fn test_config() -> SenderConfig {
    let mut config = SenderConfig::default();
    config.retry = RetryConfig {
        base_delay_ms: 0,
        max_delay_ms: 0,
    };
    config
}

/// Session builder wired with all fakes except the chain client.
pub fn builder_with(status: FakeStatusSource) -> SessionBuilder {
    SendSession::builder()
        .config(&test_config())
        .signer(Arc::new(FakeSigner::default()))
        .token_program(Arc::new(FakeProgram))
        .registry(registry(3, 2))
        .status_source(Arc::new(status))
}

pub fn session(chain: Arc<FakeChain>) -> SendSession {
    builder_with(FakeStatusSource::new())
        .chain_client(chain)
        .build()
        .unwrap()
}
