use types::primitives::Wei;

/// Transactions of these types and later ones price gas as specified in EIP-1559.
pub const FIRST_DYNAMIC_FEE_TRANSACTION_TYPE: u64 = 2;

/// Gas pricing fields of a transaction.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct GasPricing {
    pub transaction_type: u64,
    pub gas_price: Wei,
    pub max_priority_fee_per_gas: Option<Wei>,
    pub max_fee_per_gas: Option<Wei>,
}

/// Price per unit of gas actually paid by a transaction included in a block with `base_fee`.
///
/// Dynamic fee transactions pay `min(base_fee + max_priority_fee_per_gas, max_fee_per_gas)`.
/// A missing base fee can only happen if the node is misconfigured. `max_fee_per_gas` is the
/// closest bound in that case. Other transactions pay `gas_price`.
#[must_use]
pub fn effective_gas_price(pricing: GasPricing, base_fee: Option<Wei>) -> Wei {
    let GasPricing {
        transaction_type,
        gas_price,
        max_priority_fee_per_gas,
        max_fee_per_gas,
    } = pricing;

    if transaction_type < FIRST_DYNAMIC_FEE_TRANSACTION_TYPE {
        return gas_price;
    }

    let Some(max_fee) = max_fee_per_gas else {
        return gas_price;
    };

    let Some(base_fee) = base_fee else {
        return max_fee;
    };

    let priority_fee = max_priority_fee_per_gas.unwrap_or_default();

    base_fee.saturating_add(priority_fee).min(max_fee)
}

#[must_use]
pub fn transaction_fee(pricing: GasPricing, base_fee: Option<Wei>, gas_used: u64) -> Wei {
    effective_gas_price(pricing, base_fee).saturating_mul(gas_used.into())
}
