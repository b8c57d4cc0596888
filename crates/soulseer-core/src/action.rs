// ── Typed actions ──
//
// One enum per resource slice, one variant per operation. Each variant
// carries the phase of the operation; reducers match them exhaustively.
// The tuple-variant constructors double as the "wrap" function the dispatch
// protocol uses to build REQUEST/SUCCESS/FAILURE actions for an operation.

use soulseer_api::models::{
    Category, ConnectAccount, DepositIntent, LoginLink, Message, MessagePatch,
    PaymentConfirmation, PaymentMethod, PaymentReceipt, Payout, Product, ProductPage,
};
use strum::AsRefStr;

use crate::payment::{CardConfirmation, CheckoutRedirect};

/// Phase of an asynchronous operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase<T> {
    Request,
    Success(T),
    Failure(String),
}

impl<T> Phase<T> {
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Request => "REQUEST",
            Self::Success(_) => "SUCCESS",
            Self::Failure(_) => "FAILURE",
        }
    }

    /// Apply `f` to a SUCCESS payload, keeping REQUEST/FAILURE as they are.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Phase<U> {
        match self {
            Self::Request => Phase::Request,
            Self::Success(value) => Phase::Success(f(value)),
            Self::Failure(error) => Phase::Failure(error),
        }
    }
}

// ── Messages ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, AsRefStr)]
pub enum MessageAction {
    #[strum(serialize = "FETCH_MESSAGES")]
    Fetch(Phase<Vec<Message>>),
    #[strum(serialize = "SEND_MESSAGE")]
    Send(Phase<Message>),
    #[strum(serialize = "PROCESS_PAYMENT")]
    ProcessPayment(Phase<PaymentReceipt>),
    #[strum(serialize = "CONFIRM_PAYMENT")]
    ConfirmPayment(Phase<PaymentConfirmation>),
    #[strum(serialize = "UPDATE_MESSAGE_SETTINGS")]
    UpdateSettings(Phase<MessagePatch>),
}

impl MessageAction {
    fn suffix(&self) -> &'static str {
        match self {
            Self::Fetch(p) => p.suffix(),
            Self::Send(p) => p.suffix(),
            Self::UpdateSettings(p) => p.suffix(),
            Self::ProcessPayment(p) => p.suffix(),
            Self::ConfirmPayment(p) => p.suffix(),
        }
    }
}

// ── Products ─────────────────────────────────────────────────────────

/// A page of the product listing. `append` is set when the page continues
/// the listing already in state instead of replacing it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductListing {
    pub page: ProductPage,
    pub append: bool,
}

#[derive(Debug, Clone, AsRefStr)]
pub enum ProductAction {
    #[strum(serialize = "FETCH_PRODUCTS")]
    FetchProducts(Phase<ProductListing>),
    #[strum(serialize = "FETCH_PRODUCT")]
    FetchProduct(Phase<Product>),
    #[strum(serialize = "FETCH_FEATURED_PRODUCTS")]
    FetchFeatured(Phase<Vec<Product>>),
    #[strum(serialize = "FETCH_CATEGORIES")]
    FetchCategories(Phase<Vec<Category>>),
    #[strum(serialize = "FETCH_AUTHOR_PRODUCTS")]
    FetchAuthorProducts(Phase<ProductPage>),
    #[strum(serialize = "FETCH_RELATED_PRODUCTS")]
    FetchRelated(Phase<Vec<Product>>),
    #[strum(serialize = "CREATE_PRODUCT")]
    Create(Phase<Product>),
    #[strum(serialize = "UPDATE_PRODUCT")]
    Update(Phase<Product>),
    /// Success payload is the deleted product's id.
    #[strum(serialize = "DELETE_PRODUCT")]
    Delete(Phase<String>),
    #[strum(serialize = "TOGGLE_FEATURED")]
    ToggleFeatured(Phase<Product>),
}

impl ProductAction {
    fn suffix(&self) -> &'static str {
        match self {
            Self::FetchProducts(p) => p.suffix(),
            Self::FetchProduct(p)
            | Self::Create(p)
            | Self::Update(p)
            | Self::ToggleFeatured(p) => p.suffix(),
            Self::FetchFeatured(p) | Self::FetchRelated(p) => p.suffix(),
            Self::FetchCategories(p) => p.suffix(),
            Self::FetchAuthorProducts(p) => p.suffix(),
            Self::Delete(p) => p.suffix(),
        }
    }
}

// ── Payments ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, AsRefStr)]
pub enum PaymentAction {
    #[strum(serialize = "CREATE_WALLET_DEPOSIT")]
    WalletDeposit(Phase<DepositIntent>),
    #[strum(serialize = "CONFIRM_CARD_PAYMENT")]
    ConfirmCard(Phase<CardConfirmation>),
    #[strum(serialize = "CREATE_READER_ACCOUNT")]
    CreateReaderAccount(Phase<ConnectAccount>),
    #[strum(serialize = "FETCH_READER_ACCOUNT")]
    FetchReaderAccount(Phase<ConnectAccount>),
    #[strum(serialize = "CREATE_READER_PAYOUT")]
    ReaderPayout(Phase<Payout>),
    #[strum(serialize = "FETCH_LOGIN_LINK")]
    LoginLink(Phase<LoginLink>),
    #[strum(serialize = "CREATE_CHECKOUT_SESSION")]
    Checkout(Phase<CheckoutRedirect>),
    #[strum(serialize = "FETCH_PAYMENT_METHODS")]
    FetchMethods(Phase<Vec<PaymentMethod>>),
    #[strum(serialize = "ADD_PAYMENT_METHOD")]
    AddMethod(Phase<PaymentMethod>),
    /// Success payload is the removed method's id.
    #[strum(serialize = "REMOVE_PAYMENT_METHOD")]
    RemoveMethod(Phase<String>),
}

impl PaymentAction {
    fn suffix(&self) -> &'static str {
        match self {
            Self::WalletDeposit(p) => p.suffix(),
            Self::ConfirmCard(p) => p.suffix(),
            Self::CreateReaderAccount(p) | Self::FetchReaderAccount(p) => p.suffix(),
            Self::ReaderPayout(p) => p.suffix(),
            Self::LoginLink(p) => p.suffix(),
            Self::Checkout(p) => p.suffix(),
            Self::FetchMethods(p) => p.suffix(),
            Self::AddMethod(p) => p.suffix(),
            Self::RemoveMethod(p) => p.suffix(),
        }
    }
}

// ── Root ─────────────────────────────────────────────────────────────

/// Any action the store accepts.
#[derive(Debug, Clone)]
pub enum Action {
    Messages(MessageAction),
    Products(ProductAction),
    Payments(PaymentAction),
}

impl Action {
    /// Canonical kind name, e.g. `FETCH_MESSAGES_SUCCESS`.
    pub fn kind(&self) -> String {
        let (name, suffix) = match self {
            Self::Messages(a) => (a.as_ref(), a.suffix()),
            Self::Products(a) => (a.as_ref(), a.suffix()),
            Self::Payments(a) => (a.as_ref(), a.suffix()),
        };
        format!("{name}_{suffix}")
    }
}

impl From<MessageAction> for Action {
    fn from(action: MessageAction) -> Self {
        Self::Messages(action)
    }
}

impl From<ProductAction> for Action {
    fn from(action: ProductAction) -> Self {
        Self::Products(action)
    }
}

impl From<PaymentAction> for Action {
    fn from(action: PaymentAction) -> Self {
        Self::Payments(action)
    }
}
