//! Condenses a merchant's offer text into a short one-line summary.
//!
//! Rules are tried in priority order and the first match wins:
//!
//! | pattern                 | example input                        | summary       |
//! |-------------------------|--------------------------------------|---------------|
//! | `SGD<n> return voucher` | "Receive SGD10 return voucher daily" | `$10 voucher` |
//! | `<n>% off`              | "Enjoy 15% off the total bill"       | `15% off`     |
//! | `SGD<n> off`            | "SGD5 off with min spend of SGD30"   | `$5 off`      |
//!
//! Text matching none of them is returned trimmed but otherwise verbatim.

use std::sync::LazyLock;

use regex::Regex;

const CURRENCY_PREFIX: &str = "SGD";
const CURRENCY_SYMBOL: &str = "$";

static RETURN_VOUCHER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"SGD\d+ return voucher").expect("valid return voucher regex"));
static PERCENT_OFF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+% off").expect("valid percent off regex"));
static AMOUNT_OFF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"SGD\d+ off").expect("valid amount off regex"));

#[must_use]
pub fn condense_offer_description(text: &str) -> String {
    if let Some(m) = RETURN_VOUCHER.find(text) {
        return m
            .as_str()
            .replacen(CURRENCY_PREFIX, CURRENCY_SYMBOL, 1)
            .replacen("return ", "", 1)
            .trim()
            .to_string();
    }
    if let Some(m) = PERCENT_OFF.find(text) {
        return m.as_str().trim().to_string();
    }
    if let Some(m) = AMOUNT_OFF.find(text) {
        return m
            .as_str()
            .replacen(CURRENCY_PREFIX, CURRENCY_SYMBOL, 1)
            .trim()
            .to_string();
    }
    text.trim().to_string()
}
