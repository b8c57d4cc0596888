// soulseer-core: Client-side state layer between soulseer-api and consumers (CLI).

pub mod action;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod marketplace;
pub mod notify;
pub mod payment;
pub mod reducer;
pub mod session;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use action::{Action, MessageAction, PaymentAction, Phase, ProductAction, ProductListing};
pub use config::{ClientConfig, StripeConfig, TlsVerification};
pub use dispatch::MAX_REPLAYS;
pub use error::{CoreError, SESSION_EXPIRED_MESSAGE};
pub use marketplace::Marketplace;
pub use notify::ErrorChannel;
pub use payment::{
    CardConfirmation, CardDetails, CheckoutRedirect, GatewayError, PaymentGateway, StripeGateway,
};
pub use reducer::{MessagesState, PaymentsState, ProductsState};
pub use session::{Session, TokenSnapshot};
pub use store::{AppState, StateStream, Store};

// Wire models are part of the public surface.
pub use soulseer_api::models;
