//! External service clients

mod openai;
mod shopify;

pub use openai::OpenAiClient;
pub use shopify::ShopifyClient;
