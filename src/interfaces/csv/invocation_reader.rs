use crate::error::{LedgerError, Result};
use crate::interfaces::contract::Invocation;
use std::io::Read;

/// Reads contract invocations from a CSV source.
///
/// Each row is `Function, arg1, arg2, ...` with no header. Rows may have any
/// width, fields are trimmed, and lines starting with `#` are skipped.
pub struct InvocationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> InvocationReader<R> {
    /// Creates a new `InvocationReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .flexible(true)
            .comment(Some(b'#'))
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and parses invocations.
    pub fn invocations(self) -> impl Iterator<Item = Result<Invocation>> {
        self.reader.into_records().map(|result| {
            let record = result.map_err(LedgerError::from)?;
            let mut fields = record.iter();
            let function = fields.next().unwrap_or_default();
            let args: Vec<String> = fields.map(str::to_string).collect();
            Invocation::parse(function, &args)
        })
    }
}
