pub mod decoder;
pub mod hid_report;
pub mod layout;
pub mod router;
pub mod tree;

#[cfg(test)]
pub mod decoder_test;
