//! Native value transfers that record instead of moving funds

use idreg_core::{Address, NativeTransfer, TransferError, Wei};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;

/// A completed transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payment {
    /// Recipient
    pub to: Address,
    /// Amount in wei
    pub amount: Wei,
}

/// Records every payout; selected recipients can be made to reject value.
#[derive(Debug, Default)]
pub struct RecordingBank {
    payments: Mutex<Vec<Payment>>,
    rejecting: Mutex<BTreeSet<Address>>,
}

impl RecordingBank {
    /// Bank that accepts every transfer
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make transfers to `to` fail
    pub fn reject(&self, to: Address) {
        self.rejecting.lock().insert(to);
    }

    /// Let transfers to `to` succeed again
    pub fn accept(&self, to: Address) {
        self.rejecting.lock().remove(&to);
    }

    /// All successful transfers in order
    pub fn payments(&self) -> Vec<Payment> {
        self.payments.lock().clone()
    }

    /// Total successfully paid to `to`
    pub fn paid_to(&self, to: Address) -> Wei {
        self.payments
            .lock()
            .iter()
            .filter(|p| p.to == to)
            .map(|p| p.amount)
            .sum()
    }
}

impl NativeTransfer for RecordingBank {
    fn send_value(&self, to: Address, amount: Wei) -> Result<(), TransferError> {
        if self.rejecting.lock().contains(&to) {
            tracing::debug!(%to, amount, "transfer rejected by recipient");
            return Err(TransferError::CallFailed { to, amount });
        }
        self.payments.lock().push(Payment { to, amount });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_transfers_are_not_recorded() {
        let bank = RecordingBank::new();
        let to = Address::repeat_byte(7);
        bank.send_value(to, 5).unwrap();
        bank.reject(to);
        assert!(bank.send_value(to, 3).is_err());
        bank.accept(to);
        bank.send_value(to, 1).unwrap();
        assert_eq!(bank.paid_to(to), 6);
        assert_eq!(bank.payments().len(), 2);
    }
}
