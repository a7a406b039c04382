use crate::domain::outcome::PayoutOutcome;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct OutcomeRow<'a> {
    tx_id: &'a str,
    status: &'a str,
    code: u16,
    rail: Option<&'a str>,
    converted_amount: Option<Decimal>,
    reason: Option<&'a str>,
}

impl<'a> From<&'a PayoutOutcome> for OutcomeRow<'a> {
    fn from(outcome: &'a PayoutOutcome) -> Self {
        let (rail, converted_amount) = match outcome {
            PayoutOutcome::Success {
                rail,
                converted_amount,
                ..
            } => (Some(rail.as_str()), Some(*converted_amount)),
            _ => (None, None),
        };
        Self {
            tx_id: outcome.transaction_id().as_str(),
            status: outcome.status(),
            code: outcome.status_code(),
            rail,
            converted_amount,
            reason: outcome.reason(),
        }
    }
}

/// Writes payout outcomes as CSV with columns
/// `tx_id,status,code,rail,converted_amount,reason`.
pub struct OutcomeWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OutcomeWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_outcomes<'a, I>(&mut self, outcomes: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a PayoutOutcome>,
    {
        let mut wrote_any = false;
        for outcome in outcomes {
            self.writer.serialize(OutcomeRow::from(outcome))?;
            wrote_any = true;
        }
        if !wrote_any {
            self.writer.write_record([
                "tx_id",
                "status",
                "code",
                "rail",
                "converted_amount",
                "reason",
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::request::TransactionId;
    use rust_decimal_macros::dec;

    fn render(outcomes: &[PayoutOutcome]) -> String {
        let mut buffer = Vec::new();
        OutcomeWriter::new(&mut buffer)
            .write_outcomes(outcomes)
            .unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_writes_header_and_rows() {
        let output = render(&[
            PayoutOutcome::Success {
                transaction_id: TransactionId::from("tx_1"),
                rail: "standard rail".to_string(),
                converted_amount: dec!(14200.00),
                rate: dec!(142.00),
            },
            PayoutOutcome::ComplianceBlocked {
                transaction_id: TransactionId::from("tx_2"),
                reason: "Sanctions or blacklisted wallet".to_string(),
            },
        ]);

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "tx_id,status,code,rail,converted_amount,reason");
        assert_eq!(lines[1], "tx_1,success,200,standard rail,14200.00,");
        assert_eq!(lines[2], "tx_2,blocked,403,,,Sanctions or blacklisted wallet");
    }

    #[test]
    fn test_header_only_when_empty() {
        assert_eq!(
            render(&[]),
            "tx_id,status,code,rail,converted_amount,reason\n"
        );
    }
}
