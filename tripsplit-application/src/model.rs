use tripsplit_domain::{PersonBalance, Transfer};

/// Everything a report needs: both balance snapshots (ascending) and the
/// transfers in generation order.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementResult {
    pub balances_before: Vec<PersonBalance>,
    pub transfers: Vec<Transfer>,
    pub balances_after: Vec<PersonBalance>,
}

impl SettlementResult {
    pub fn is_settled(&self) -> bool {
        self.balances_after.iter().all(|row| row.balance.is_zero())
    }
}
