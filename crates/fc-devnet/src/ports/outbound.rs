//! Outbound Ports (Driven Ports / SPI)

use crate::domain::errors::ChaincodeError;
use crate::domain::stub::ChaincodeStub;
use shared_types::ChaincodeId;

/// Chaincode installed on the development peers.
///
/// Invocation is synchronous: simulation only touches the in-memory ledger
/// through the stub. The returned bytes become the chaincode response
/// payload; an error becomes a failed proposal response with its message.
pub trait Chaincode: Send + Sync {
    fn id(&self) -> &ChaincodeId;

    fn invoke(
        &self,
        stub: &mut ChaincodeStub<'_>,
        function: &str,
        args: &[Vec<u8>],
    ) -> Result<Vec<u8>, ChaincodeError>;
}
