pub mod probe;
pub mod publish;
pub mod sync;
pub mod version;
