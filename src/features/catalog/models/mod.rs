mod category;

pub use category::{Category, Service};
