pub mod compensation;
pub mod hiring;
pub mod requisition;

#[cfg(test)]
pub(crate) mod fakes;
