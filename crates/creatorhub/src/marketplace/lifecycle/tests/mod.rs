pub(crate) mod common;

mod applications;
mod campaigns;
