//! Per-attempt transaction building.
//!
//! Account existence and the blockhash are read fresh on every call, so a
//! retry never reuses state observed by an earlier attempt.

use futures_util::future::join_all;

use crate::chain::client::{ChainClient, Instruction, TokenProgram};
use crate::chain::types::{Address, ChainResult, Commitment, LatestBlockhash, UnsignedTransaction};
use crate::recipients::Recipient;

/// A composed, not yet signed, batch transaction.
#[derive(Debug, Clone)]
pub struct BuiltTransaction {
    pub tx: UnsignedTransaction,
    /// Blockhash the transaction was composed against; bounds confirmation.
    pub blockhash: LatestBlockhash,
    /// Destination accounts created by this transaction.
    pub created_accounts: usize,
}

/// Builds one atomic transfer transaction for a batch.
pub struct TransferBuilder<'a> {
    chain: &'a dyn ChainClient,
    program: &'a dyn TokenProgram,
    payer: Address,
    mint: Address,
    commitment: Commitment,
}

impl<'a> TransferBuilder<'a> {
    pub fn new(
        chain: &'a dyn ChainClient,
        program: &'a dyn TokenProgram,
        payer: Address,
        mint: Address,
        commitment: Commitment,
    ) -> Self {
        Self {
            chain,
            program,
            payer,
            mint,
            commitment,
        }
    }

    /// Compose transfers for `batch` in input order.
    ///
    /// A recipient whose token account is missing gets a creation
    /// instruction immediately before its transfer.
    pub async fn build(&self, batch: &[Recipient]) -> ChainResult<BuiltTransaction> {
        let source = self.program.associated_account(&self.payer, &self.mint)?;
        let destinations = batch
            .iter()
            .map(|r| self.program.associated_account(&r.address, &self.mint))
            .collect::<ChainResult<Vec<_>>>()?;

        let lookups = destinations
            .iter()
            .map(|account| self.chain.get_account_info(account, self.commitment));
        let existing = join_all(lookups).await;

        let mut instructions = Vec::with_capacity(batch.len() * 2);
        let mut created_accounts = 0;
        for ((recipient, destination), info) in batch.iter().zip(destinations).zip(existing) {
            if info?.is_none() {
                created_accounts += 1;
                instructions.push(Instruction::CreateAssociatedAccount {
                    payer: self.payer.clone(),
                    owner: recipient.address.clone(),
                    mint: self.mint.clone(),
                    account: destination.clone(),
                });
            }
            instructions.push(Instruction::Transfer {
                source: source.clone(),
                destination,
                owner: self.payer.clone(),
                mint: self.mint.clone(),
                amount: recipient.amount,
            });
        }

        let blockhash = self.chain.get_latest_blockhash(self.commitment).await?;
        let tx = self.program.compose(&self.payer, &instructions, &blockhash)?;

        tracing::debug!(
            size = batch.len(),
            instructions = instructions.len(),
            created_accounts,
            blockhash = %blockhash.blockhash,
            "Built batch transaction"
        );

        Ok(BuiltTransaction {
            tx,
            blockhash,
            created_accounts,
        })
    }
}
