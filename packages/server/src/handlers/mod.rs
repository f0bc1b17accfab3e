pub mod attachment;
pub mod site;
