use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    rpc_request::RpcError,
};
use thiserror::Error;

/// The error taxonomy shared by every component of the connector.
///
/// Nothing in the connector retries or recovers from these; they are reported
/// at the operation boundary and the operation ends.
#[derive(Error, Debug)]
pub enum ConnectorError {
    /// The RPC endpoint could not be reached or the transport failed.
    #[error("ledger endpoint unreachable: {0}")]
    Connectivity(String),

    /// A call did not match the interface descriptor (unknown method, wrong
    /// arguments, or undecodable return data).
    #[error("interface mismatch: {0}")]
    Interface(String),

    /// The program refused the call (permission or invariant violation).
    #[error("remote rejected the call: {0}")]
    RemoteRejection(String),

    #[error("account index {index} is out of range ({count} accounts available)")]
    IndexOutOfRange { index: usize, count: usize },

    /// A refresh failed part way; no records were produced.
    #[error("event sync failed: {0}")]
    Sync(#[source] Box<ConnectorError>),

    #[error("no signer identities available")]
    NoIdentities,
}

impl ConnectorError {
    /// Returns the innermost cause, looking through `Sync` wrappers.
    pub fn root(&self) -> &ConnectorError {
        match self {
            ConnectorError::Sync(inner) => inner.root(),
            other => other,
        }
    }
}

impl From<ClientError> for ConnectorError {
    fn from(err: ClientError) -> Self {
        match err.kind() {
            ClientErrorKind::TransactionError(_) => {
                ConnectorError::RemoteRejection(err.to_string())
            }
            ClientErrorKind::RpcError(RpcError::RpcResponseError { .. }) => {
                ConnectorError::RemoteRejection(err.to_string())
            }
            ClientErrorKind::SerdeJson(_) => ConnectorError::Interface(err.to_string()),
            _ => ConnectorError::Connectivity(err.to_string()),
        }
    }
}
