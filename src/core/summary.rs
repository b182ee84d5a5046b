use crate::core::models::batch::Batch;
use chrono::SecondsFormat;

/// Renders the plain-text summary offered as a download for a batch.
///
/// Amounts are printed with two decimals in the batch currency. Decision
/// details appear only once the batch has been approved or rejected.
pub fn render_batch_summary(batch: &Batch) -> String {
    let currency = &batch.instruction.payment_currency;
    let mut lines = vec![
        format!("Payroll Batch Summary - {}", batch.id),
        format!("Status: {}", batch.status),
    ];
    if let Some(approved_by) = &batch.approved_by {
        lines.push(format!("Approved By: {}", approved_by));
    }
    if let Some(approved_at) = &batch.approved_at {
        lines.push(format!(
            "Approved At: {}",
            approved_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
    }
    if let Some(remarks) = &batch.remarks {
        lines.push(format!("Remarks: {}", remarks));
    }
    lines.push(format!(
        "Created: {}",
        batch.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    ));
    lines.push(format!("Payment Type: {}", batch.instruction.payment_type));
    lines.push(format!("Currency: {}", currency));
    lines.push(format!("Debit Account: {}", batch.instruction.debit_account));
    lines.push(format!("Date: {}", batch.instruction.date));
    lines.push(format!("Total: {:.2} {}", batch.total_amount(), currency));
    lines.push(String::new());
    lines.push("Payments:".to_string());
    lines.extend(
        batch
            .payments
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{}. {} | {:.2} {}", i + 1, p.payee_name, p.amount, currency)),
    );
    lines.join("\n")
}

pub fn summary_file_name(batch_id: &str) -> String {
    format!("Payroll_{}_Summary.txt", batch_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::batch::{BatchStatus, Instruction, Payment};
    use chrono::{TimeZone, Utc};

    fn batch() -> Batch {
        Batch {
            id: "B1".to_string(),
            status: BatchStatus::Submitted,
            instruction: Instruction {
                payment_type: "Salary".to_string(),
                payment_currency: "USD".to_string(),
                debit_account: "ACC-001".to_string(),
                date: "2024-01-31".to_string(),
            },
            payments: vec![
                Payment {
                    payee_name: "Bob".to_string(),
                    amount: 200.0,
                },
                Payment {
                    payee_name: "Carol".to_string(),
                    amount: 300.5,
                },
            ],
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            approved_by: None,
            approved_at: None,
            remarks: None,
        }
    }

    #[test]
    fn renders_pending_batch() {
        let expected = "Payroll Batch Summary - B1\n\
                        Status: Submitted\n\
                        Created: 2024-01-01T00:00:00Z\n\
                        Payment Type: Salary\n\
                        Currency: USD\n\
                        Debit Account: ACC-001\n\
                        Date: 2024-01-31\n\
                        Total: 500.50 USD\n\
                        \n\
                        Payments:\n\
                        1. Bob | 200.00 USD\n\
                        2. Carol | 300.50 USD";
        assert_eq!(render_batch_summary(&batch()), expected);
    }

    #[test]
    fn includes_decision_details_once_decided() {
        let mut b = batch();
        b.status = BatchStatus::Rejected;
        b.approved_by = Some("alice".to_string());
        b.approved_at = Some(Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap());
        b.remarks = Some("bad payee".to_string());

        let text = render_batch_summary(&b);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "Status: Rejected");
        assert_eq!(lines[2], "Approved By: alice");
        assert_eq!(lines[3], "Approved At: 2024-01-02T09:30:00Z");
        assert_eq!(lines[4], "Remarks: bad payee");
    }

    #[test]
    fn file_name_embeds_batch_id() {
        assert_eq!(summary_file_name("B1"), "Payroll_B1_Summary.txt");
    }
}
