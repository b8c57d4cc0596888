//! Message command handlers.

use chrono::{DateTime, Local, Utc};
use tabled::Tabled;

use soulseer_core::Marketplace;
use soulseer_core::models::{
    Message, MessageSettings, NewMessage, PaymentConfirmation, PaymentMethodKind, PaymentReceipt,
};

use crate::cli::{GlobalOpts, MessagesArgs, MessagesCommand, PayMethod};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct MessageRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Text")]
    text: String,
    #[tabled(rename = "Paid")]
    paid: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Sent")]
    sent: String,
}

fn local_time(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(
        || "-".into(),
        |t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
    )
}

impl From<&Message> for MessageRow {
    fn from(m: &Message) -> Self {
        Self {
            id: m.id.clone(),
            text: m.text.clone().unwrap_or_default(),
            paid: output::yes_no(m.paid.unwrap_or(false)),
            price: output::money(m.price),
            sent: local_time(m.created_at),
        }
    }
}

fn detail(m: &Message) -> String {
    [
        format!("ID:           {}", m.id),
        format!("Conversation: {}", output::opt(m.conversation.as_deref())),
        format!("Text:         {}", output::opt(m.text.as_deref())),
        format!("Paid:         {}", output::yes_no(m.paid.unwrap_or(false))),
        format!("Price:        {}", output::money(m.price)),
        format!("Sent:         {}", local_time(m.created_at)),
    ]
    .join("\n")
}

fn receipt_detail(r: &PaymentReceipt) -> String {
    let payment = r.payment.as_ref();
    [
        format!("Payment:   {}", output::opt(payment.and_then(|p| p.id.as_deref()))),
        format!("Status:    {}", output::opt(payment.and_then(|p| p.status.as_deref()))),
        format!("Amount:    {}", output::money(payment.and_then(|p| p.amount))),
        format!("Completed: {}", output::yes_no(r.is_completed())),
    ]
    .join("\n")
}

fn confirmation_detail(c: &PaymentConfirmation, message: &Message) -> String {
    let content = c.extra.get("url").and_then(|u| u.as_str());
    format!("{}\nContent:      {}", detail(message), output::opt(content))
}

impl From<PayMethod> for PaymentMethodKind {
    fn from(method: PayMethod) -> Self {
        match method {
            PayMethod::Wallet => Self::Wallet,
            PayMethod::Stripe => Self::Stripe,
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    market: &Marketplace,
    args: MessagesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        MessagesCommand::List { conversation } => {
            let messages = market.fetch_messages(&conversation).await?;
            let out = output::render_list(
                &global.output,
                &messages,
                |m| MessageRow::from(m),
                |m| m.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        MessagesCommand::Send {
            to,
            text,
            conversation,
        } => {
            let message = market
                .send_message(&NewMessage {
                    recipient: to,
                    text,
                    conversation_id: conversation,
                })
                .await?;
            let out = output::render_single(&global.output, &message, detail, |m| m.id.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        MessagesCommand::Pay { message, method } => {
            let receipt = market
                .process_message_payment(&message, method.into())
                .await?;
            let out = output::render_single(&global.output, &receipt, receipt_detail, |r| {
                output::yes_no(r.is_completed())
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        MessagesCommand::Confirm { payment_intent } => {
            let confirmation = market.confirm_payment(&payment_intent).await?;
            let message = confirmation.paid_message()?;
            let out = output::render_single(
                &global.output,
                &confirmation,
                |c| confirmation_detail(c, &message),
                |_| message.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        MessagesCommand::Settings {
            message,
            paid,
            price,
        } => {
            if paid.is_none() && price.is_none() {
                return Err(CliError::Validation {
                    field: "settings".into(),
                    reason: "pass --paid and/or --price".into(),
                });
            }
            let updated = market
                .update_message_settings(&message, &MessageSettings { paid, price })
                .await?;
            let out = output::render_single(&global.output, &updated, detail, |m| m.id.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
