//! Log record kinds and their byte encoding (spec.md §3 "Log record").
//!
//! Every mutation record carries `{tx_id, filename, block_number, offset,
//! old_value}` so rollback/recovery can write the old value straight back.

use crate::error::{Error, Result};
use crate::file::BlockId;
use crate::tx::TxId;

#[derive(Debug, Clone, PartialEq)]
pub enum LogRecord {
    Checkpoint,
    Start { tx: TxId },
    Commit { tx: TxId },
    Rollback { tx: TxId },
    SetInt { tx: TxId, blk: BlockId, offset: usize, old: i32 },
    SetShort { tx: TxId, blk: BlockId, offset: usize, old: i16 },
    SetLong { tx: TxId, blk: BlockId, offset: usize, old: i64 },
    SetString { tx: TxId, blk: BlockId, offset: usize, old: String },
    SetBool { tx: TxId, blk: BlockId, offset: usize, old: bool },
    SetDate { tx: TxId, blk: BlockId, offset: usize, old: i64 },
}

const OP_CHECKPOINT: u8 = 0;
const OP_START: u8 = 1;
const OP_COMMIT: u8 = 2;
const OP_ROLLBACK: u8 = 3;
const OP_SET_INT: u8 = 4;
const OP_SET_SHORT: u8 = 5;
const OP_SET_LONG: u8 = 6;
const OP_SET_STRING: u8 = 7;
const OP_SET_BOOL: u8 = 8;
const OP_SET_DATE: u8 = 9;

struct Writer(Vec<u8>);

impl Writer {
    fn new(op: u8) -> Self {
        let mut w = Writer(Vec::new());
        w.0.push(op);
        w
    }
    fn u64(&mut self, v: u64) -> &mut Self {
        self.0.extend_from_slice(&v.to_be_bytes());
        self
    }
    fn i32(&mut self, v: i32) -> &mut Self {
        self.0.extend_from_slice(&v.to_be_bytes());
        self
    }
    fn i16(&mut self, v: i16) -> &mut Self {
        self.0.extend_from_slice(&v.to_be_bytes());
        self
    }
    fn i64(&mut self, v: i64) -> &mut Self {
        self.0.extend_from_slice(&v.to_be_bytes());
        self
    }
    fn u8(&mut self, v: u8) -> &mut Self {
        self.0.push(v);
        self
    }
    fn string(&mut self, s: &str) -> &mut Self {
        self.u64(s.len() as u64);
        self.0.extend_from_slice(s.as_bytes());
        self
    }
    fn blk(&mut self, blk: &BlockId) -> &mut Self {
        self.string(blk.filename());
        self.u64(blk.number());
        self
    }
    fn finish(self) -> Vec<u8> {
        self.0
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    cursor: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, cursor: 1 } // opcode already consumed by caller
    }
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.cursor + n > self.buf.len() {
            return Err(Error::logic("log record truncated"));
        }
        let s = &self.buf[self.cursor..self.cursor + n];
        self.cursor += n;
        Ok(s)
    }
    fn u64(&mut self) -> Result<u64> {
        Ok(u64::from_be_bytes(self.take(8)?.try_into().unwrap()))
    }
    fn i32(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.take(4)?.try_into().unwrap()))
    }
    fn i16(&mut self) -> Result<i16> {
        Ok(i16::from_be_bytes(self.take(2)?.try_into().unwrap()))
    }
    fn i64(&mut self) -> Result<i64> {
        Ok(i64::from_be_bytes(self.take(8)?.try_into().unwrap()))
    }
    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }
    fn string(&mut self) -> Result<String> {
        let len = self.u64()? as usize;
        let bytes = self.take(len)?.to_vec();
        String::from_utf8(bytes).map_err(|_| Error::logic("invalid utf8 in log record"))
    }
    fn blk(&mut self) -> Result<BlockId> {
        let filename = self.string()?;
        let number = self.u64()?;
        Ok(BlockId::new(filename, number))
    }
}

impl LogRecord {
    pub fn tx_id(&self) -> Option<TxId> {
        match self {
            LogRecord::Checkpoint => None,
            LogRecord::Start { tx }
            | LogRecord::Commit { tx }
            | LogRecord::Rollback { tx }
            | LogRecord::SetInt { tx, .. }
            | LogRecord::SetShort { tx, .. }
            | LogRecord::SetLong { tx, .. }
            | LogRecord::SetString { tx, .. }
            | LogRecord::SetBool { tx, .. }
            | LogRecord::SetDate { tx, .. } => Some(*tx),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            LogRecord::Checkpoint => Writer::new(OP_CHECKPOINT).finish(),
            LogRecord::Start { tx } => {
                let mut w = Writer::new(OP_START);
                w.u64(*tx);
                w.finish()
            }
            LogRecord::Commit { tx } => {
                let mut w = Writer::new(OP_COMMIT);
                w.u64(*tx);
                w.finish()
            }
            LogRecord::Rollback { tx } => {
                let mut w = Writer::new(OP_ROLLBACK);
                w.u64(*tx);
                w.finish()
            }
            LogRecord::SetInt { tx, blk, offset, old } => {
                let mut w = Writer::new(OP_SET_INT);
                w.u64(*tx);
                w.blk(blk);
                w.u64(*offset as u64);
                w.i32(*old);
                w.finish()
            }
            LogRecord::SetShort { tx, blk, offset, old } => {
                let mut w = Writer::new(OP_SET_SHORT);
                w.u64(*tx);
                w.blk(blk);
                w.u64(*offset as u64);
                w.i16(*old);
                w.finish()
            }
            LogRecord::SetLong { tx, blk, offset, old } => {
                let mut w = Writer::new(OP_SET_LONG);
                w.u64(*tx);
                w.blk(blk);
                w.u64(*offset as u64);
                w.i64(*old);
                w.finish()
            }
            LogRecord::SetString { tx, blk, offset, old } => {
                let mut w = Writer::new(OP_SET_STRING);
                w.u64(*tx);
                w.blk(blk);
                w.u64(*offset as u64);
                w.string(old);
                w.finish()
            }
            LogRecord::SetBool { tx, blk, offset, old } => {
                let mut w = Writer::new(OP_SET_BOOL);
                w.u64(*tx);
                w.blk(blk);
                w.u64(*offset as u64);
                w.u8(if *old { 1 } else { 0 });
                w.finish()
            }
            LogRecord::SetDate { tx, blk, offset, old } => {
                let mut w = Writer::new(OP_SET_DATE);
                w.u64(*tx);
                w.blk(blk);
                w.u64(*offset as u64);
                w.i64(*old);
                w.finish()
            }
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::logic("empty log record"));
        }
        let op = bytes[0];
        let mut r = Reader::new(bytes);
        Ok(match op {
            OP_CHECKPOINT => LogRecord::Checkpoint,
            OP_START => LogRecord::Start { tx: r.u64()? },
            OP_COMMIT => LogRecord::Commit { tx: r.u64()? },
            OP_ROLLBACK => LogRecord::Rollback { tx: r.u64()? },
            OP_SET_INT => LogRecord::SetInt {
                tx: r.u64()?,
                blk: r.blk()?,
                offset: r.u64()? as usize,
                old: r.i32()?,
            },
            OP_SET_SHORT => LogRecord::SetShort {
                tx: r.u64()?,
                blk: r.blk()?,
                offset: r.u64()? as usize,
                old: r.i16()?,
            },
            OP_SET_LONG => LogRecord::SetLong {
                tx: r.u64()?,
                blk: r.blk()?,
                offset: r.u64()? as usize,
                old: r.i64()?,
            },
            OP_SET_STRING => LogRecord::SetString {
                tx: r.u64()?,
                blk: r.blk()?,
                offset: r.u64()? as usize,
                old: r.string()?,
            },
            OP_SET_BOOL => LogRecord::SetBool {
                tx: r.u64()?,
                blk: r.blk()?,
                offset: r.u64()? as usize,
                old: r.u8()? != 0,
            },
            OP_SET_DATE => LogRecord::SetDate {
                tx: r.u64()?,
                blk: r.blk()?,
                offset: r.u64()? as usize,
                old: r.i64()?,
            },
            other => return Err(Error::logic(format!("unknown log opcode {}", other))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_kind() {
        let blk = BlockId::new("t.tbl", 3);
        let records = vec![
            LogRecord::Checkpoint,
            LogRecord::Start { tx: 1 },
            LogRecord::Commit { tx: 1 },
            LogRecord::Rollback { tx: 1 },
            LogRecord::SetInt { tx: 2, blk: blk.clone(), offset: 8, old: -5 },
            LogRecord::SetShort { tx: 2, blk: blk.clone(), offset: 8, old: -5 },
            LogRecord::SetLong { tx: 2, blk: blk.clone(), offset: 8, old: -5 },
            LogRecord::SetString { tx: 2, blk: blk.clone(), offset: 8, old: "hi".into() },
            LogRecord::SetBool { tx: 2, blk: blk.clone(), offset: 8, old: true },
            LogRecord::SetDate { tx: 2, blk, offset: 8, old: 123 },
        ];
        for rec in records {
            let bytes = rec.to_bytes();
            let back = LogRecord::from_bytes(&bytes).unwrap();
            assert_eq!(rec, back);
        }
    }
}
