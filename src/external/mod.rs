pub mod news_provider;
pub mod newsapi;
pub mod price_provider;
pub mod yahoo;
