use crate::domain::request::PayoutRequest;
use crate::error::{PayoutError, Result};
use std::io::Read;

/// Reads payout requests from a CSV source.
///
/// Expected columns are `wallet_address, amount, currency, destination_country`
/// plus the optional `urgency` and `chain`. Whitespace is trimmed and rows may
/// omit trailing optional fields.
pub struct PayoutRequestReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> PayoutRequestReader<R> {
    /// Creates a new `PayoutRequestReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes requests.
    ///
    /// A malformed row yields an `Err` for that row only; later rows are still read.
    pub fn requests(self) -> impl Iterator<Item = Result<PayoutRequest>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(PayoutError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::request::{Chain, Urgency};
    use rust_decimal_macros::dec;

    #[test]
    fn test_reader_valid_stream() {
        let data = "wallet_address, amount, currency, destination_country, urgency, chain\n\
                    0xabc, 100, USDC, KE, high, \n\
                    TLa2f6VPqDgRE67v1736s7bJ8Ray5wYjU7, 2.5, USDC, NG, normal, tron";
        let reader = PayoutRequestReader::new(data.as_bytes());
        let results: Vec<Result<PayoutRequest>> = reader.requests().collect();

        assert_eq!(results.len(), 2);
        let first = results[0].as_ref().unwrap();
        assert_eq!(first.amount.value(), dec!(100));
        assert_eq!(first.urgency, Urgency::High);
        assert_eq!(first.chain, Chain::Ethereum);

        let second = results[1].as_ref().unwrap();
        assert_eq!(second.amount.value(), dec!(2.5));
        assert_eq!(second.chain, Chain::Tron);
    }

    #[test]
    fn test_reader_optional_columns_absent() {
        let data = "wallet_address,amount,currency,destination_country\n0xabc,1,USDC,KE";
        let reader = PayoutRequestReader::new(data.as_bytes());
        let request = reader.requests().next().unwrap().unwrap();
        assert_eq!(request.urgency, Urgency::Normal);
        assert_eq!(request.chain, Chain::Ethereum);
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = "wallet_address,amount,currency,destination_country\n\
                    0xabc,not_a_number,USDC,KE\n\
                    0xabc,0,USDC,KE\n\
                    0xabc,5,USDC,KE";
        let reader = PayoutRequestReader::new(data.as_bytes());
        let results: Vec<Result<PayoutRequest>> = reader.requests().collect();

        assert!(results[0].is_err());
        assert!(results[1].is_err(), "zero amount must be rejected");
        assert!(results[2].is_ok());
    }
}
