mod app;

pub use app::StorefrontApp;
