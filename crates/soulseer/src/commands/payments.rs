//! Payment command handlers: wallet deposits, reader accounts, checkout,
//! and saved cards.

use tabled::Tabled;

use soulseer_core::models::{ConnectAccount, DepositIntent, PaymentMethod, Payout};
use soulseer_core::{CardConfirmation, CardDetails, Marketplace};

use crate::cli::{GlobalOpts, MethodsCommand, PaymentsArgs, PaymentsCommand, ReaderCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct MethodRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Type")]
    method_type: String,
    #[tabled(rename = "Brand")]
    brand: String,
    #[tabled(rename = "Last 4")]
    last4: String,
    #[tabled(rename = "Expires")]
    expires: String,
}

impl From<&PaymentMethod> for MethodRow {
    fn from(m: &PaymentMethod) -> Self {
        let card = m.card.as_ref();
        let expires = card
            .and_then(|c| Some(format!("{:02}/{}", c.exp_month?, c.exp_year?)))
            .unwrap_or_else(|| "-".into());
        Self {
            id: m.id.clone(),
            method_type: output::opt(m.method_type.as_deref()),
            brand: output::opt(card.and_then(|c| c.brand.as_deref())),
            last4: output::opt(card.and_then(|c| c.last4.as_deref())),
            expires,
        }
    }
}

// ── Detail views ────────────────────────────────────────────────────

fn deposit_detail(d: &DepositIntent) -> String {
    [
        format!(
            "Payment intent: {}",
            output::opt(d.payment_intent_id.as_deref())
        ),
        format!("Amount:         {}", output::money(d.amount)),
    ]
    .join("\n")
}

fn confirmation_detail(c: &CardConfirmation) -> String {
    format!(
        "Payment intent: {}\nStatus:         {}",
        c.payment_intent_id, c.status
    )
}

fn account_detail(a: &ConnectAccount) -> String {
    [
        format!("Account:    {}", output::opt(a.account_id.as_deref())),
        format!("Onboarding: {}", output::opt(a.onboarding_url.as_deref())),
    ]
    .join("\n")
}

fn payout_detail(p: &Payout) -> String {
    [
        format!("Payout: {}", output::opt(p.id.as_deref())),
        format!("Amount: {}", output::money(p.amount)),
        format!("Status: {}", output::opt(p.status.as_deref())),
    ]
    .join("\n")
}

fn account_id(a: &ConnectAccount) -> String {
    a.account_id.clone().unwrap_or_default()
}

fn validate_amount(amount: f64) -> Result<(), CliError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(CliError::Validation {
            field: "amount".into(),
            reason: "must be a positive number".into(),
        })
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    market: &Marketplace,
    args: PaymentsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        PaymentsCommand::Deposit { amount, confirm } => {
            validate_amount(amount)?;
            let intent = market.create_wallet_deposit(amount).await?;

            if confirm {
                let confirmation = market.confirm_card_payment(&intent.client_secret).await?;
                output::success(
                    &format!("Deposited {}", output::money(Some(amount))),
                    &global.color,
                    global.quiet,
                );
                let out = output::render_single(
                    &global.output,
                    &confirmation,
                    confirmation_detail,
                    |c| c.payment_intent_id.clone(),
                )?;
                output::print_output(&out, global.quiet);
                return Ok(());
            }

            let out = output::render_single(&global.output, &intent, deposit_detail, |d| {
                d.payment_intent_id.clone().unwrap_or_default()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PaymentsCommand::ConfirmCard { secret_env } => {
            let secret = util::read_secret(secret_env.as_deref(), "Client secret: ")?;
            let confirmation = market.confirm_card_payment(&secret).await?;
            output::success("Payment succeeded", &global.color, global.quiet);
            let out = output::render_single(
                &global.output,
                &confirmation,
                confirmation_detail,
                |c| c.payment_intent_id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PaymentsCommand::Reader(cmd) => handle_reader(market, cmd, global).await,

        PaymentsCommand::Checkout {
            product,
            success_url,
            cancel_url,
        } => {
            let redirect = market
                .checkout_product(&product, &success_url, &cancel_url)
                .await?;
            let out = output::render_single(
                &global.output,
                &redirect,
                |r| {
                    format!(
                        "Session:  {}\nCheckout: {}",
                        r.session.session_id, r.url
                    )
                },
                |r| r.url.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PaymentsCommand::Methods(cmd) => handle_methods(market, cmd, global).await,
    }
}

async fn handle_reader(
    market: &Marketplace,
    cmd: ReaderCommand,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        ReaderCommand::Create => {
            let account = market.create_reader_account().await?;
            output::success("Reader account created", &global.color, global.quiet);
            let out = output::render_single(&global.output, &account, account_detail, account_id)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ReaderCommand::Show { user } => {
            let account = market.reader_account(user.as_deref()).await?;
            let out = output::render_single(&global.output, &account, account_detail, account_id)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ReaderCommand::Payout { amount, reader } => {
            validate_amount(amount)?;
            if !util::confirm(
                &format!("Pay out {}?", output::money(Some(amount))),
                global.yes,
            )? {
                return Ok(());
            }
            let payout = market.reader_payout(amount, reader.as_deref()).await?;
            let out = output::render_single(&global.output, &payout, payout_detail, |p| {
                p.id.clone().unwrap_or_default()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ReaderCommand::LoginLink { user } => {
            let link = market.reader_login_link(user.as_deref()).await?;
            let out = output::render_single(&global.output, &link, |l| l.url.clone(), |l| {
                l.url.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

async fn handle_methods(
    market: &Marketplace,
    cmd: MethodsCommand,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        MethodsCommand::List => {
            let methods = market.fetch_payment_methods().await?;
            let out = output::render_list(
                &global.output,
                &methods,
                |m| MethodRow::from(m),
                |m| m.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        MethodsCommand::Add {
            exp_month,
            exp_year,
        } => {
            let card = CardDetails {
                number: util::read_secret(None, "Card number: ")?,
                exp_month,
                exp_year,
                cvc: util::read_secret(None, "CVC: ")?,
            };
            let method = market.add_payment_method(&card).await?;
            output::success(
                &format!("Payment method added: {}", method.id),
                &global.color,
                global.quiet,
            );
            let out = output::render_list(
                &global.output,
                std::slice::from_ref(&method),
                |m| MethodRow::from(m),
                |m| m.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        MethodsCommand::Remove { id } => {
            if !util::confirm(&format!("Remove payment method {id}?"), global.yes)? {
                return Ok(());
            }
            market.remove_payment_method(&id).await?;
            output::success("Payment method removed", &global.color, global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use soulseer_core::models::CardSummary;

    use super::*;

    #[test]
    fn method_row_formats_expiry() {
        let method = PaymentMethod {
            id: "pm_1".into(),
            method_type: Some("card".into()),
            card: Some(CardSummary {
                brand: Some("visa".into()),
                last4: Some("4242".into()),
                exp_month: Some(4),
                exp_year: Some(2030),
            }),
            ..PaymentMethod::default()
        };
        let row = MethodRow::from(&method);
        assert_eq!(row.expires, "04/2030");
        assert_eq!(row.last4, "4242");
    }

    #[test]
    fn method_row_without_card() {
        let row = MethodRow::from(&PaymentMethod {
            id: "pm_2".into(),
            ..PaymentMethod::default()
        });
        assert_eq!(row.expires, "-");
        assert_eq!(row.brand, "-");
    }

    #[test]
    fn amount_must_be_positive() {
        assert!(validate_amount(10.0).is_ok());
        assert!(validate_amount(0.0).is_err());
        assert!(validate_amount(f64::NAN).is_err());
    }
}
