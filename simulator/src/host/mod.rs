//! Interface to the world state the VM reads from and writes to.
//!
//! The VM never owns world state. Every storage access, membership check and
//! side effect goes through a [`Host`], which must also be able to undo
//! everything written since a [`Checkpoint`] so that reverted frames leave no
//! trace.

use ark_bn254::Fr;
use thiserror::Error;

mod journal;

pub use journal::{InMemoryHost, SideEffects};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("nullifier {nullifier} already exists for contract {contract}")]
    NullifierCollision { contract: Fr, nullifier: Fr },
}

/// Opaque marker for a host state that can be rolled back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Checkpoint(pub(crate) usize);

/// External services available to an executing frame.
///
/// Membership queries return whether the value exists together with the
/// value actually found at the queried position, which is what a proof of
/// the query would be built against.
pub trait Host {
    fn storage_read(&mut self, contract: Fr, slot: Fr) -> Fr;

    fn storage_write(&mut self, contract: Fr, slot: Fr, value: Fr);

    /// Bytecode to run when `contract` is called with `selector`, if the
    /// contract is deployed.
    fn get_bytecode(&self, contract: Fr, selector: Fr) -> Option<Vec<u8>>;

    fn note_hash_exists(&self, note_hash: Fr, leaf_index: u64) -> (bool, Fr);

    fn nullifier_exists(&self, contract: Fr, nullifier: Fr) -> (bool, Fr);

    fn l1_to_l2_message_exists(&self, msg_hash: Fr, leaf_index: u64) -> (bool, Fr);

    fn emit_note_hash(&mut self, contract: Fr, note_hash: Fr);

    fn emit_nullifier(&mut self, contract: Fr, nullifier: Fr) -> Result<(), HostError>;

    fn emit_unencrypted_log(&mut self, contract: Fr, log: Vec<Fr>);

    fn send_l2_to_l1_message(&mut self, contract: Fr, recipient: Fr, content: Fr);

    fn checkpoint(&mut self) -> Checkpoint;

    /// Undoes every write made since `checkpoint` was taken.
    ///
    /// Checkpoints taken after `checkpoint` become invalid.
    fn rollback(&mut self, checkpoint: Checkpoint);
}
