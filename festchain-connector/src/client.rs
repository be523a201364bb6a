//! # Remote Ledger Handle
//!
//! This module provides the [`RemoteLedgerHandle`], the only component that talks to the
//! Solana cluster. It exposes two primitives over the deployed program:
//!
//! - **`call`**: a read-only method. The instruction is evaluated with
//!   `simulateTransaction` and its result is read back from the runtime's return data,
//!   so nothing is signed or committed.
//! - **`send`**: a state-mutating method. The instruction is signed by the given identity,
//!   submitted, and confirmed.
//!
//! Both are checked against the [`InterfaceDescriptor`] before any network traffic. No call
//! is retried; every failure reaches the caller as a [`ConnectorError`].
//!
//! ## RPC Abstraction
//!
//! The handle is generic over the [`AsyncRpcClient`] trait so it works with the live
//! non-blocking `RpcClient` and with test doubles. Everything above the handle
//! (the sync client and the dispatcher) is in turn generic over the [`Ledger`] trait.

use crate::{
    error::ConnectorError,
    interface::{AccountRole, InterfaceDescriptor, MethodKind, MethodSpec, Value},
};
use async_trait::async_trait;
use base64::{prelude::BASE64_STANDARD, Engine};
use solana_client::{nonblocking::rpc_client::RpcClient, rpc_config::RpcSimulateTransactionConfig};
use solana_sdk::{
    hash::Hash,
    instruction::{AccountMeta, Instruction},
    message::Message,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};
use solana_transaction_status::UiReturnDataEncoding;
use std::sync::Arc;

/// A trait abstracting over the asynchronous RPC client functionality.
///
/// This allows the [`RemoteLedgerHandle`] to be generic over the RPC client,
/// making it easy to substitute the live `RpcClient` in tests.
#[async_trait]
pub trait AsyncRpcClient: Send + Sync {
    /// Fetches the latest blockhash from the RPC endpoint.
    async fn get_latest_blockhash(&self) -> Result<Hash, ConnectorError>;
    /// Sends and confirms a transaction, waiting for it to be confirmed.
    async fn send_and_confirm_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, ConnectorError>;
    /// Simulates an unsigned transaction and returns the return data set by `program_id`.
    async fn simulate_return_data(
        &self,
        transaction: &Transaction,
        program_id: &Pubkey,
    ) -> Result<Vec<u8>, ConnectorError>;
}

#[async_trait]
impl AsyncRpcClient for RpcClient {
    async fn get_latest_blockhash(&self) -> Result<Hash, ConnectorError> {
        Ok(self.get_latest_blockhash().await?)
    }

    async fn send_and_confirm_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, ConnectorError> {
        Ok(self.send_and_confirm_transaction(transaction).await?)
    }

    async fn simulate_return_data(
        &self,
        transaction: &Transaction,
        program_id: &Pubkey,
    ) -> Result<Vec<u8>, ConnectorError> {
        let config = RpcSimulateTransactionConfig {
            sig_verify: false,
            replace_recent_blockhash: true,
            commitment: Some(self.commitment()),
            ..RpcSimulateTransactionConfig::default()
        };
        let result = self
            .simulate_transaction_with_config(transaction, config)
            .await?
            .value;

        if let Some(err) = result.err {
            let logs = result.logs.unwrap_or_default().join("; ");
            return Err(ConnectorError::RemoteRejection(format!("{err:?} (logs: {logs})")));
        }

        // All-zero results arrive as empty data; `None` means nothing was returned at all.
        let Some(return_data) = result.return_data else {
            return Err(ConnectorError::Interface(format!(
                "program {program_id} returned no data"
            )));
        };
        if return_data.program_id != program_id.to_string() {
            return Err(ConnectorError::Interface(format!(
                "return data was set by {}, expected {program_id}",
                return_data.program_id
            )));
        }
        let (encoded, encoding) = return_data.data;
        match encoding {
            UiReturnDataEncoding::Base64 => BASE64_STANDARD
                .decode(encoded)
                .map_err(|e| ConnectorError::Interface(format!("invalid return data: {e}"))),
        }
    }
}

/// Proof of a confirmed mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub method: String,
    pub signature: Signature,
}

/// The typed `call`/`send` surface of the remote ledger.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Runs a read-only method against current ledger state.
    async fn call(&self, method: &str, args: &[Value]) -> Result<Vec<Value>, ConnectorError>;

    /// Runs a state-mutating method signed by `signer`.
    async fn send(
        &self,
        method: &str,
        args: &[Value],
        signer: &Keypair,
    ) -> Result<Receipt, ConnectorError>;
}

/// Connection to a deployed program: RPC endpoint, program address and interface.
pub struct RemoteLedgerHandle<C: AsyncRpcClient + ?Sized> {
    /// A shared, thread-safe reference to a Solana JSON RPC client.
    rpc_client: Arc<C>,
    program_id: Pubkey,
    interface: Arc<InterfaceDescriptor>,
    /// Fee payer named in simulated view transactions.
    view_payer: Pubkey,
}

impl<C: AsyncRpcClient + ?Sized> Clone for RemoteLedgerHandle<C> {
    fn clone(&self) -> Self {
        Self {
            rpc_client: self.rpc_client.clone(),
            program_id: self.program_id,
            interface: self.interface.clone(),
            view_payer: self.view_payer,
        }
    }
}

impl<C: AsyncRpcClient + ?Sized> RemoteLedgerHandle<C> {
    /// Creates a new handle.
    ///
    /// # Arguments
    ///
    /// * `rpc_client` - A shared client that implements [`AsyncRpcClient`] (e.g., `Arc<RpcClient>`).
    /// * `program_id` - The address of the deployed program.
    /// * `interface` - The program's interface descriptor.
    pub fn new(rpc_client: Arc<C>, program_id: Pubkey, interface: Arc<InterfaceDescriptor>) -> Self {
        Self {
            rpc_client,
            program_id,
            interface,
            view_payer: Pubkey::default(),
        }
    }

    /// Sets the account named as fee payer when simulating read-only calls.
    /// It must exist on the cluster for the simulation to be accepted.
    pub fn with_view_payer(mut self, payer: Pubkey) -> Self {
        self.view_payer = payer;
        self
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    pub fn interface(&self) -> &InterfaceDescriptor {
        &self.interface
    }

    /// Builds the instruction for `method`, resolving each account role.
    fn instruction(
        &self,
        method: &MethodSpec,
        args: &[Value],
        signer: Pubkey,
    ) -> Result<Instruction, ConnectorError> {
        let data = method.encode_call(args)?;
        let state = self.interface.state_address(&self.program_id);
        let writable = method.kind == MethodKind::Mutation;

        let accounts = method
            .accounts
            .iter()
            .map(|role| match role {
                AccountRole::State if writable => AccountMeta::new(state, false),
                AccountRole::State => AccountMeta::new_readonly(state, false),
                AccountRole::Signer => AccountMeta::new(signer, true),
                AccountRole::SystemProgram => {
                    AccountMeta::new_readonly(solana_sdk::system_program::id(), false)
                }
            })
            .collect();

        Ok(Instruction {
            program_id: self.program_id,
            accounts,
            data,
        })
    }
}

#[async_trait]
impl<C: AsyncRpcClient + ?Sized> Ledger for RemoteLedgerHandle<C> {
    async fn call(&self, method: &str, args: &[Value]) -> Result<Vec<Value>, ConnectorError> {
        let spec = self.interface.method_of_kind(method, MethodKind::View)?;
        let ix = self.instruction(spec, args, self.view_payer)?;
        let tx = Transaction::new_unsigned(Message::new(&[ix], Some(&self.view_payer)));

        tracing::trace!(method, "simulating view call");
        let bytes = self.rpc_client
            .simulate_return_data(&tx, &self.program_id)
            .await?;
        spec.decode_returns(&bytes)
    }

    async fn send(
        &self,
        method: &str,
        args: &[Value],
        signer: &Keypair,
    ) -> Result<Receipt, ConnectorError> {
        let spec = self.interface.method_of_kind(method, MethodKind::Mutation)?;
        let payer = signer.pubkey();
        let ix = self.instruction(spec, args, payer)?;

        let blockhash = self.rpc_client.get_latest_blockhash().await?;
        let tx = Transaction::new_signed_with_payer(&[ix], Some(&payer), &[signer], blockhash);
        let signature = self.rpc_client.send_and_confirm_transaction(&tx).await?;
        tracing::debug!(method, %signature, "transaction confirmed");

        Ok(Receipt {
            method: method.to_string(),
            signature,
        })
    }
}
