use rust_decimal::Decimal;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use web3::types::U256;

/// Decimals of the native currency (wei per ether).
pub const NATIVE_DECIMALS: usize = 18;
/// Fractional digits shown for whole-unit values.
pub const DISPLAY_PRECISION: usize = 4;

#[derive(Debug, Clone)]
pub struct ConversionError {
    pub msg: String,
}

impl ConversionError {
    pub fn from(msg: String) -> Self {
        Self { msg }
    }
}

impl Display for ConversionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error during conversion: {}", self.msg)
    }
}

impl Error for ConversionError {}

/// Converts an amount of whole native units (e.g. "2" or "0.5") into smallest units.
pub fn to_smallest_units(amount: &str) -> Result<U256, ConversionError> {
    let dec = Decimal::from_str(amount.trim())
        .map_err(|e| ConversionError::from(format!("Invalid amount {amount}: {e}")))?
        .normalize();
    if dec.is_sign_negative() && !dec.is_zero() {
        return Err(ConversionError::from(format!(
            "Amount cannot be negative: {amount}"
        )));
    }
    let scale = dec.scale() as usize;
    if scale > NATIVE_DECIMALS {
        return Err(ConversionError::from(format!(
            "Amount has more than {NATIVE_DECIMALS} fractional digits: {amount}"
        )));
    }
    let mantissa = U256::from(dec.mantissa().unsigned_abs());
    mantissa
        .checked_mul(U256::exp10(NATIVE_DECIMALS - scale))
        .ok_or_else(|| ConversionError::from(format!("Amount too large: {amount}")))
}

/// Formats `value` of `decimals` smallest units with exactly `precision` fractional
/// digits, rounding half up.
pub fn format_units(value: U256, decimals: usize, precision: usize) -> String {
    let precision = precision.min(decimals);
    let step = U256::exp10(decimals - precision);
    let rounded = value
        .checked_add(step / 2)
        .map(|v| v / step)
        .unwrap_or(value / step);
    let scale = U256::exp10(precision);
    let whole = rounded / scale;
    if precision == 0 {
        return whole.to_string();
    }
    let frac = (rounded % scale).as_u64();
    format!("{}.{:0width$}", whole, frac, width = precision)
}

/// Display form of a stored smallest-unit value: absent, empty or unparseable values
/// render as "0", anything else as whole units with four fractional digits.
pub fn format_value(value: Option<&str>) -> String {
    match value
        .filter(|v| !v.is_empty())
        .and_then(|v| U256::from_dec_str(v).ok())
    {
        Some(v) => format_units(v, NATIVE_DECIMALS, DISPLAY_PRECISION),
        None => "0".to_string(),
    }
}
