use paydash_core::dashboard::TransactionsPage;
use paydash_core::models::{NewPayment, Payment};

use crate::cli::PaymentCommands;
use crate::commands::common::{now_ms, relative_label, Context};
use crate::error::CliError;

pub async fn run_payments(command: PaymentCommands, context: Context) -> Result<(), CliError> {
    context.require_session()?;
    let page = TransactionsPage::new(context.guard, context.api);

    let (payment, as_json) = match command {
        PaymentCommands::Create {
            amount,
            currency,
            email,
            metadata,
            json,
        } => {
            let request = NewPayment {
                amount,
                currency,
                customer_email: email,
                metadata: parse_metadata(metadata.as_deref())?,
            };
            let payment = page.create_payment(request).await?;
            if !json {
                println!("Payment requested");
            }
            (payment, json)
        }
        PaymentCommands::Show { id, json } => (page.payment(&id).await?, json),
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&payment)?);
    } else {
        for line in format_payment_lines(&payment, now_ms()) {
            println!("{line}");
        }
    }
    Ok(())
}

pub fn parse_metadata(raw: Option<&str>) -> Result<Option<serde_json::Value>, CliError> {
    raw.map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(serde_json::from_str)
        .transpose()
        .map_err(CliError::from)
}

pub fn format_payment_lines(payment: &Payment, now_ms: i64) -> Vec<String> {
    vec![
        format!("id:        {}", payment.id),
        format!("amount:    {:.2} {}", payment.amount, payment.currency),
        format!("status:    {}", payment.status),
        format!(
            "customer:  {}",
            if payment.customer_email.is_empty() {
                "-"
            } else {
                &payment.customer_email
            }
        ),
        format!(
            "created:   {} ({})",
            payment.created_at,
            relative_label(&payment.created_at, now_ms)
        ),
    ]
}
