pub mod balance_writer;
pub mod invocation_reader;
