pub mod site;
pub mod storage;

pub use site::{Category, Language};
