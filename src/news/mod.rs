pub mod fetcher;

pub use fetcher::{GoogleNewsSource, NewsSource};
