pub mod awards;
pub mod complexity;
pub mod heat;
pub mod temporal;
