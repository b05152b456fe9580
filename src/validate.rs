use crate::Error;
use once_cell::sync::Lazy;
use regex::Regex;

static ADDRESS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new("^0x[0-9a-fA-F]{40}$").expect("address pattern is valid"));

/// Checks that `address` is a `0x`-prefixed, 40-hex-digit Ethereum address.
///
/// The check is purely syntactic; nothing is verified against chain state.
pub fn validate_address(address: &str) -> Result<(), Error> {
    if ADDRESS_PATTERN.is_match(address) {
        Ok(())
    } else {
        Err(Error::InvalidAddress(address.to_string()))
    }
}

/// Checks that a deposit or transfer amount is nonzero.
pub fn validate_amount(amount: u64) -> Result<(), Error> {
    if amount == 0 {
        return Err(Error::InvalidAmount(amount));
    }
    Ok(())
}

/// Checks that an event-query starting block is not negative.
pub fn validate_block_number(block: i64) -> Result<(), Error> {
    if block < 0 {
        return Err(Error::InvalidBlockNumber(block));
    }
    Ok(())
}

/// Converts a transfer or swap identifier taken from untyped input (JSON
/// documents, CLI arguments) into the integer form the node expects.
///
/// The typed client methods take `u64` identifiers directly; this is the
/// boundary check for callers that carry identifiers as floating point.
pub fn validate_identifier(identifier: f64) -> Result<u64, Error> {
    if !identifier.is_finite()
        || identifier.fract() != 0.0
        || identifier < 0.0
        || identifier > u64::MAX as f64
    {
        return Err(Error::InvalidIdentifier(identifier));
    }
    Ok(identifier as u64)
}
