pub mod aggregation_service;
pub mod chart_service;
pub mod news_service;
pub mod pipeline_service;
pub mod price_service;
pub mod sentiment_service;
pub mod vader;
