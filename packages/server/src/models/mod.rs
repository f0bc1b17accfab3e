pub mod shared;
pub mod site;
