pub mod requests;

pub use requests::{
    AccountRequest, PaymentLinkRequest, PaymentRequest, PromptRequest, SearchRequest,
    SearchResult, StatusUpdateRequest,
};
