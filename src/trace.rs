//! Trace parser: turns whitespace-separated `<mode> <hex-address>` records
//! from any `BufRead` into a stream of [`Access`] values.
//!
//! An external collaborator the binary feeds into [`crate::cache::Cache`],
//! not part of the cache model itself.

use std::io::BufRead;

use crate::error::SimError;

/// One decoded trace record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Access {
    pub is_write: bool,
    pub address: u64,
}

/// Wraps a trace source and yields [`Access`] records until EOF.
pub struct Trace<R: BufRead> {
    reader: R,
}

impl<R: BufRead> Trace<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Reads the next record, or `None` at a clean EOF.
    fn next_record(&mut self) -> Option<Result<Access, SimError>> {
        let mut line = String::new();
        loop {
            line.clear();
            let bytes_read = match self.reader.read_line(&mut line) {
                Ok(n) => n,
                Err(e) => return Some(Err(SimError::Input(format!("failed to read trace: {e}")))),
            };
            if bytes_read == 0 {
                return None;
            }
            if line.trim().is_empty() {
                continue;
            }

            let mut fields = line.split_whitespace();
            let mode = match fields.next() {
                Some(m) => m,
                None => continue,
            };
            let addr_str = match fields.next() {
                Some(a) => a,
                None => {
                    return Some(Err(SimError::Input(format!(
                        "malformed trace record: {line:?}"
                    ))))
                }
            };

            let is_write = match mode {
                "r" | "R" => false,
                "w" | "W" => true,
                other => {
                    return Some(Err(SimError::Input(format!(
                        "unknown trace mode {other:?}"
                    ))))
                }
            };
            let address = match u64::from_str_radix(addr_str.trim_start_matches("0x"), 16) {
                Ok(a) => a,
                Err(e) => {
                    return Some(Err(SimError::Input(format!(
                        "invalid hex address {addr_str:?}: {e}"
                    ))))
                }
            };

            return Some(Ok(Access { is_write, address }));
        }
    }

    /// An iterator over the remaining records in the trace.
    pub fn records(&mut self) -> impl Iterator<Item = Result<Access, SimError>> + '_ {
        std::iter::from_fn(move || self.next_record())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn trace_of(s: &str) -> Trace<Cursor<&[u8]>> {
        Trace::new(Cursor::new(s.as_bytes()))
    }

    #[test]
    fn parses_read_and_write_records() {
        let mut t = trace_of("r 1a\nW ff\n");
        let records: Vec<_> = t.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(
            records,
            vec![
                Access {
                    is_write: false,
                    address: 0x1a
                },
                Access {
                    is_write: true,
                    address: 0xff
                },
            ]
        );
    }

    #[test]
    fn skips_blank_lines() {
        let mut t = trace_of("r 1\n\n\nw 2\n");
        let records: Vec<_> = t.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn rejects_unknown_mode() {
        let mut t = trace_of("x 10\n");
        assert!(t.records().next().unwrap().is_err());
    }

    #[test]
    fn ends_cleanly_at_eof() {
        let mut t = trace_of("r 1\n");
        let mut it = t.records();
        assert!(it.next().unwrap().is_ok());
        assert!(it.next().is_none());
    }
}
