//! Transaction-level structure checks and fee accumulation

use crate::crypto::HashPrimitive;
use crate::error::{ConsensusError, Result};
use crate::types::{Digest, Transaction, UtxoCollaborator};

/// A coinbase spends the null outpoint and nothing else.
pub fn is_coinbase(tx: &Transaction) -> bool {
    tx.inputs.len() == 1 && tx.inputs[0].prevout.is_null()
}

/// Enforce the coinbase position rules over a block's transaction list:
/// the list must be non-empty, its first transaction must have the coinbase
/// input shape, and no later transaction may have it.
pub fn check_coinbase_placement(transactions: &[Transaction]) -> Result<()> {
    let first = transactions.first().ok_or(ConsensusError::CoinbaseMissing)?;
    if !is_coinbase(first) {
        return Err(ConsensusError::InvalidCoinbaseInput);
    }
    for (index, tx) in transactions.iter().enumerate().skip(1) {
        if is_coinbase(tx) {
            return Err(ConsensusError::CoinbaseMisplaced { index });
        }
    }
    Ok(())
}

/// Transaction id: double SHA-256 of the canonical wire serialization.
pub fn txid<H: HashPrimitive>(hasher: &H, tx: &Transaction) -> Digest {
    Digest::from_bytes(hasher.double_sha256(&serialize_transaction(tx)))
}

/// Canonical (pre-segwit) wire serialization of a transaction.
pub fn serialize_transaction(tx: &Transaction) -> Vec<u8> {
    let mut bytes = Vec::new();

    bytes.extend_from_slice(&tx.version.to_le_bytes());

    write_compact_size(&mut bytes, tx.inputs.len() as u64);
    for input in &tx.inputs {
        bytes.extend_from_slice(&input.prevout.hash.to_bytes());
        bytes.extend_from_slice(&input.prevout.index.to_le_bytes());
        write_compact_size(&mut bytes, input.script_sig.len() as u64);
        bytes.extend_from_slice(&input.script_sig);
        bytes.extend_from_slice(&input.sequence.to_le_bytes());
    }

    write_compact_size(&mut bytes, tx.outputs.len() as u64);
    for output in &tx.outputs {
        bytes.extend_from_slice(&output.value.to_le_bytes());
        write_compact_size(&mut bytes, output.script_pubkey.len() as u64);
        bytes.extend_from_slice(&output.script_pubkey);
    }

    bytes.extend_from_slice(&tx.lock_time.to_le_bytes());
    bytes
}

/// Bitcoin's variable-length integer encoding.
fn write_compact_size(out: &mut Vec<u8>, value: u64) {
    match value {
        0..=0xfc => out.push(value as u8),
        0xfd..=0xffff => {
            out.push(0xfd);
            out.extend_from_slice(&(value as u16).to_le_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            out.push(0xfe);
            out.extend_from_slice(&(value as u32).to_le_bytes());
        }
        _ => {
            out.push(0xff);
            out.extend_from_slice(&value.to_le_bytes());
        }
    }
}

/// Run every non-coinbase transaction through the UTXO collaborator and sum
/// the reported fees, with overflow checked.
pub fn total_fees<U: UtxoCollaborator>(
    utxo: &mut U,
    transactions: &[Transaction],
    height: u32,
) -> Result<u64> {
    let mut fees = 0u64;
    for tx in transactions.iter().skip(1) {
        let fee = utxo
            .apply_transaction(tx, height)
            .map_err(ConsensusError::UtxoFailure)?;
        fees = fees.checked_add(fee).ok_or(ConsensusError::FeeOverflow)?;
    }
    Ok(fees)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Sha256d;
    use crate::types::{OutPoint, TransactionInput, TransactionOutput};

    fn coinbase_tx(value: u64) -> Transaction {
        Transaction {
            version: 1,
            inputs: vec![TransactionInput {
                prevout: OutPoint::null(),
                script_sig: vec![],
                sequence: 0xffffffff,
            }],
            outputs: vec![TransactionOutput {
                value,
                script_pubkey: vec![],
            }],
            lock_time: 0,
        }
    }

    fn spend_tx(prevout_fill: u8) -> Transaction {
        Transaction {
            version: 1,
            inputs: vec![TransactionInput {
                prevout: OutPoint {
                    hash: Digest::from_bytes([prevout_fill; 32]),
                    index: 0,
                },
                script_sig: vec![0x51],
                sequence: 0xffffffff,
            }],
            outputs: vec![TransactionOutput {
                value: 1000,
                script_pubkey: vec![0x51],
            }],
            lock_time: 0,
        }
    }

    struct FixedFees(Vec<u64>);

    impl UtxoCollaborator for FixedFees {
        fn apply_transaction(
            &mut self,
            _tx: &Transaction,
            _height: u32,
        ) -> std::result::Result<u64, String> {
            if self.0.is_empty() {
                return Err("unexpected transaction".to_string());
            }
            Ok(self.0.remove(0))
        }
    }

    #[test]
    fn test_is_coinbase() {
        assert!(is_coinbase(&coinbase_tx(5_000_000_000)));
        assert!(!is_coinbase(&spend_tx(1)));

        let mut two_inputs = coinbase_tx(0);
        two_inputs.inputs.push(two_inputs.inputs[0].clone());
        assert!(!is_coinbase(&two_inputs));
    }

    #[test]
    fn test_placement_requires_leading_coinbase() {
        assert_eq!(
            check_coinbase_placement(&[]),
            Err(ConsensusError::CoinbaseMissing)
        );
        assert_eq!(
            check_coinbase_placement(&[spend_tx(1)]),
            Err(ConsensusError::InvalidCoinbaseInput)
        );
        assert!(check_coinbase_placement(&[coinbase_tx(0), spend_tx(1)]).is_ok());
    }

    #[test]
    fn test_placement_rejects_second_coinbase() {
        let txs = [coinbase_tx(0), spend_tx(1), coinbase_tx(1)];
        assert_eq!(
            check_coinbase_placement(&txs),
            Err(ConsensusError::CoinbaseMisplaced { index: 2 })
        );
    }

    #[test]
    fn test_serialize_minimal_transaction() {
        let tx = Transaction {
            version: 1,
            inputs: vec![],
            outputs: vec![],
            lock_time: 0,
        };
        // version || 0 inputs || 0 outputs || lock_time
        assert_eq!(
            serialize_transaction(&tx),
            vec![1, 0, 0, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_serialize_field_order() {
        let tx = spend_tx(0xab);
        let bytes = serialize_transaction(&tx);
        assert_eq!(&bytes[0..4], &[1, 0, 0, 0]);
        assert_eq!(bytes[4], 1); // input count
        assert_eq!(&bytes[5..37], &[0xab; 32]); // outpoint hash
        assert_eq!(&bytes[37..41], &[0, 0, 0, 0]); // outpoint index
        assert_eq!(bytes[41], 1); // script_sig length
        assert_eq!(bytes[42], 0x51);
        assert_eq!(&bytes[43..47], &[0xff; 4]); // sequence
        assert_eq!(bytes[47], 1); // output count
        assert_eq!(&bytes[48..56], &1000u64.to_le_bytes());
        assert_eq!(bytes[56], 1); // script_pubkey length
        assert_eq!(bytes[57], 0x51);
        assert_eq!(&bytes[58..62], &[0, 0, 0, 0]); // lock_time
        assert_eq!(bytes.len(), 62);
    }

    #[test]
    fn test_compact_size_boundaries() {
        let mut out = Vec::new();
        write_compact_size(&mut out, 0xfc);
        assert_eq!(out, vec![0xfc]);

        out.clear();
        write_compact_size(&mut out, 0xfd);
        assert_eq!(out, vec![0xfd, 0xfd, 0x00]);

        out.clear();
        write_compact_size(&mut out, 0x1_0000);
        assert_eq!(out, vec![0xfe, 0x00, 0x00, 0x01, 0x00]);

        out.clear();
        write_compact_size(&mut out, 0x1_0000_0000);
        assert_eq!(out, vec![0xff, 0, 0, 0, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn test_txid_depends_on_content() {
        let a = txid(&Sha256d, &spend_tx(1));
        let b = txid(&Sha256d, &spend_tx(2));
        assert_ne!(a, b);
        assert_eq!(a, txid(&Sha256d, &spend_tx(1)));
    }

    #[test]
    fn test_total_fees_skips_coinbase() {
        let txs = [coinbase_tx(0), spend_tx(1), spend_tx(2)];
        let mut utxo = FixedFees(vec![300, 400]);
        assert_eq!(total_fees(&mut utxo, &txs, 100).unwrap(), 700);
    }

    #[test]
    fn test_total_fees_overflow() {
        let txs = [coinbase_tx(0), spend_tx(1), spend_tx(2)];
        let mut utxo = FixedFees(vec![u64::MAX, 1]);
        assert_eq!(
            total_fees(&mut utxo, &txs, 100),
            Err(ConsensusError::FeeOverflow)
        );
    }

    #[test]
    fn test_total_fees_propagates_collaborator_error() {
        let txs = [coinbase_tx(0), spend_tx(1)];
        let mut utxo = FixedFees(vec![]);
        assert_eq!(
            total_fees(&mut utxo, &txs, 100),
            Err(ConsensusError::UtxoFailure(
                "unexpected transaction".to_string()
            ))
        );
    }
}
