//! Price feed client.
//!
//! Resolves the token's current fiat price with a single request to a
//! CoinGecko-style `simple/price` endpoint. The quote is a point-in-time fact
//! for one run: no caching, no retry. A failed or malformed response aborts
//! the run.

use rust_decimal::Decimal;
use std::{collections::HashMap, str::FromStr};
use thiserror::Error;
use tracing::trace;
use url::Url;

/// A point-in-time price quote for an asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuote {
    /// Price feed identifier of the asset.
    pub asset: String,
    /// Fiat unit the price is denominated in.
    pub fiat_unit: String,
    /// The price of one whole token in the fiat unit. Always positive.
    pub price: Decimal,
}

/// Errors resolving a price quote.
#[derive(Debug, Error)]
pub enum PriceError {
    /// The configured feed base URL cannot address the price endpoint.
    #[error("invalid price feed endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    /// The HTTP request to the feed failed.
    #[error("price feed request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The feed response was not valid JSON of the expected shape.
    #[error("price feed returned a malformed response")]
    MalformedResponse,
    /// The response did not contain a price for the requested pair.
    #[error("price feed has no {fiat_unit} price for {asset}")]
    MissingPrice {
        /// Requested asset.
        asset: String,
        /// Requested fiat unit.
        fiat_unit: String,
    },
    /// The feed returned a price that is zero, negative or not representable.
    #[error("price feed returned an unusable {fiat_unit} price for {asset}: {raw}")]
    InvalidPrice {
        /// Requested asset.
        asset: String,
        /// Requested fiat unit.
        fiat_unit: String,
        /// The raw number as returned by the feed.
        raw: String,
    },
}

/// Client for the external price feed.
#[derive(Debug, Clone)]
pub struct PriceClient {
    http: reqwest::Client,
    base: Url,
}

impl PriceClient {
    /// Creates a client against the given feed base URL.
    pub fn new(base: Url) -> Self {
        Self { http: reqwest::Client::new(), base }
    }

    /// Fetches the current price of `asset` in `fiat_unit`.
    pub async fn resolve(&self, asset: &str, fiat_unit: &str) -> Result<PriceQuote, PriceError> {
        let url = self.base.join("simple/price")?;
        let body = self
            .http
            .get(url)
            .query(&[("ids", asset), ("vs_currencies", fiat_unit)])
            .send()
            .await?
            .text()
            .await?;

        trace!(%asset, %fiat_unit, response = %body, "Price feed response");

        parse_quote(&body, asset, fiat_unit)
    }
}

/// Parses a `simple/price` response body into a [`PriceQuote`].
///
/// The expected shape is `{ <asset>: { <fiat_unit>: number } }`. The number is
/// taken losslessly into a [`Decimal`], never through a native float.
pub fn parse_quote(body: &str, asset: &str, fiat_unit: &str) -> Result<PriceQuote, PriceError> {
    let data: HashMap<String, HashMap<String, serde_json::Number>> =
        serde_json::from_str(body).map_err(|_| PriceError::MalformedResponse)?;

    let raw = data
        .get(asset)
        .and_then(|prices| prices.get(fiat_unit))
        .ok_or_else(|| PriceError::MissingPrice {
            asset: asset.to_string(),
            fiat_unit: fiat_unit.to_string(),
        })?
        .to_string();

    let price = Decimal::from_str(&raw).ok().filter(|price| *price > Decimal::ZERO).ok_or_else(
        || PriceError::InvalidPrice {
            asset: asset.to_string(),
            fiat_unit: fiat_unit.to_string(),
            raw: raw.clone(),
        },
    )?;

    Ok(PriceQuote { asset: asset.to_string(), fiat_unit: fiat_unit.to_string(), price })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_price() {
        let quote = parse_quote(r#"{"decentraland":{"usd":0.4539}}"#, "decentraland", "usd")
            .unwrap();
        assert_eq!(quote.price, Decimal::from_str("0.4539").unwrap());
        assert_eq!(quote.asset, "decentraland");
        assert_eq!(quote.fiat_unit, "usd");
    }

    #[test]
    fn price_survives_float_hostile_literals() {
        // 0.1 is not representable in binary floating point; the decimal
        // parse must preserve the literal exactly.
        let quote = parse_quote(r#"{"t":{"usd":0.1}}"#, "t", "usd").unwrap();
        assert_eq!(quote.price, Decimal::from_str("0.1").unwrap());
    }

    #[test]
    fn rejects_missing_asset() {
        let err = parse_quote(r#"{"other":{"usd":1.0}}"#, "decentraland", "usd").unwrap_err();
        assert!(matches!(err, PriceError::MissingPrice { .. }));
    }

    #[test]
    fn rejects_missing_fiat_unit() {
        let err = parse_quote(r#"{"decentraland":{"eur":1.0}}"#, "decentraland", "usd")
            .unwrap_err();
        assert!(matches!(err, PriceError::MissingPrice { .. }));
    }

    #[test]
    fn rejects_invalid_json() {
        let err = parse_quote("not json", "decentraland", "usd").unwrap_err();
        assert!(matches!(err, PriceError::MalformedResponse));
    }

    #[test]
    fn rejects_non_positive_price() {
        for body in [r#"{"t":{"usd":0}}"#, r#"{"t":{"usd":-3.5}}"#] {
            let err = parse_quote(body, "t", "usd").unwrap_err();
            assert!(matches!(err, PriceError::InvalidPrice { .. }), "body: {body}");
        }
    }
}
