use ahash::{AHashMap, AHashSet};
use ark_bn254::Fr;
use num_traits::Zero;
use tracing::trace;

use super::{Checkpoint, Host, HostError};

/// Side effects emitted through the host, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideEffects {
    pub note_hashes: Vec<(Fr, Fr)>,
    pub nullifiers: Vec<(Fr, Fr)>,
    pub unencrypted_logs: Vec<(Fr, Vec<Fr>)>,
    /// `(contract, recipient, content)` triples.
    pub l2_to_l1_messages: Vec<(Fr, Fr, Fr)>,
}

/// One reversible write.
#[derive(Debug, Clone)]
enum JournalEntry {
    StorageWrite {
        key: (Fr, Fr),
        previous: Option<Fr>,
    },
    NoteHash,
    Nullifier {
        key: (Fr, Fr),
    },
    UnencryptedLog,
    L2ToL1Message,
}

/// A [`Host`] backed by in-memory maps.
///
/// Every write is recorded in an undo journal; a [`Checkpoint`] is simply the
/// journal length at the time it was taken. The note hash and L1 to L2
/// message trees are modelled as vectors indexed by leaf index. Deployed
/// contracts answer every selector with the same bytecode.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHost {
    storage: AHashMap<(Fr, Fr), Fr>,
    contracts: AHashMap<Fr, Vec<u8>>,
    note_hash_tree: Vec<Fr>,
    l1_to_l2_message_tree: Vec<Fr>,
    nullifiers: AHashSet<(Fr, Fr)>,
    side_effects: SideEffects,
    journal: Vec<JournalEntry>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deploys `bytecode` at `address`, replacing any previous code.
    pub fn with_contract(mut self, address: Fr, bytecode: Vec<u8>) -> Self {
        self.contracts.insert(address, bytecode);
        self
    }

    pub fn with_storage(mut self, contract: Fr, slot: Fr, value: Fr) -> Self {
        self.storage.insert((contract, slot), value);
        self
    }

    /// Appends a leaf to the note hash tree.
    pub fn with_note_hash(mut self, note_hash: Fr) -> Self {
        self.note_hash_tree.push(note_hash);
        self
    }

    /// Appends a leaf to the L1 to L2 message tree.
    pub fn with_l1_to_l2_message(mut self, msg_hash: Fr) -> Self {
        self.l1_to_l2_message_tree.push(msg_hash);
        self
    }

    /// Marks a nullifier as already present before execution starts.
    pub fn with_nullifier(mut self, contract: Fr, nullifier: Fr) -> Self {
        self.nullifiers.insert((contract, nullifier));
        self
    }

    pub fn side_effects(&self) -> &SideEffects {
        &self.side_effects
    }

    pub fn storage(&self, contract: Fr, slot: Fr) -> Option<Fr> {
        self.storage.get(&(contract, slot)).copied()
    }

    pub fn journal_len(&self) -> usize {
        self.journal.len()
    }

    fn undo(&mut self, entry: JournalEntry) {
        match entry {
            JournalEntry::StorageWrite { key, previous } => match previous {
                Some(value) => {
                    self.storage.insert(key, value);
                }
                None => {
                    self.storage.remove(&key);
                }
            },
            JournalEntry::NoteHash => {
                self.side_effects.note_hashes.pop();
            }
            JournalEntry::Nullifier { key } => {
                self.nullifiers.remove(&key);
                self.side_effects.nullifiers.pop();
            }
            JournalEntry::UnencryptedLog => {
                self.side_effects.unencrypted_logs.pop();
            }
            JournalEntry::L2ToL1Message => {
                self.side_effects.l2_to_l1_messages.pop();
            }
        }
    }
}

fn leaf_lookup(tree: &[Fr], value: Fr, leaf_index: u64) -> (bool, Fr) {
    let leaf = usize::try_from(leaf_index)
        .ok()
        .and_then(|index| tree.get(index))
        .copied()
        .unwrap_or_else(Fr::zero);
    (leaf == value, leaf)
}

impl Host for InMemoryHost {
    fn storage_read(&mut self, contract: Fr, slot: Fr) -> Fr {
        self.storage
            .get(&(contract, slot))
            .copied()
            .unwrap_or_else(Fr::zero)
    }

    fn storage_write(&mut self, contract: Fr, slot: Fr, value: Fr) {
        let key = (contract, slot);
        let previous = self.storage.insert(key, value);
        self.journal
            .push(JournalEntry::StorageWrite { key, previous });
    }

    fn get_bytecode(&self, contract: Fr, _selector: Fr) -> Option<Vec<u8>> {
        self.contracts.get(&contract).cloned()
    }

    fn note_hash_exists(&self, note_hash: Fr, leaf_index: u64) -> (bool, Fr) {
        leaf_lookup(&self.note_hash_tree, note_hash, leaf_index)
    }

    fn nullifier_exists(&self, contract: Fr, nullifier: Fr) -> (bool, Fr) {
        let exists = self.nullifiers.contains(&(contract, nullifier));
        (exists, if exists { nullifier } else { Fr::zero() })
    }

    fn l1_to_l2_message_exists(&self, msg_hash: Fr, leaf_index: u64) -> (bool, Fr) {
        leaf_lookup(&self.l1_to_l2_message_tree, msg_hash, leaf_index)
    }

    fn emit_note_hash(&mut self, contract: Fr, note_hash: Fr) {
        self.side_effects.note_hashes.push((contract, note_hash));
        self.journal.push(JournalEntry::NoteHash);
    }

    fn emit_nullifier(&mut self, contract: Fr, nullifier: Fr) -> Result<(), HostError> {
        let key = (contract, nullifier);
        if !self.nullifiers.insert(key) {
            return Err(HostError::NullifierCollision {
                contract,
                nullifier,
            });
        }
        self.side_effects.nullifiers.push(key);
        self.journal.push(JournalEntry::Nullifier { key });
        Ok(())
    }

    fn emit_unencrypted_log(&mut self, contract: Fr, log: Vec<Fr>) {
        self.side_effects.unencrypted_logs.push((contract, log));
        self.journal.push(JournalEntry::UnencryptedLog);
    }

    fn send_l2_to_l1_message(&mut self, contract: Fr, recipient: Fr, content: Fr) {
        self.side_effects
            .l2_to_l1_messages
            .push((contract, recipient, content));
        self.journal.push(JournalEntry::L2ToL1Message);
    }

    fn checkpoint(&mut self) -> Checkpoint {
        Checkpoint(self.journal.len())
    }

    fn rollback(&mut self, checkpoint: Checkpoint) {
        trace!(
            from = self.journal.len(),
            to = checkpoint.0,
            "rolling back host journal"
        );
        while self.journal.len() > checkpoint.0 {
            if let Some(entry) = self.journal.pop() {
                self.undo(entry);
            }
        }
    }
}
