use crate::record::Value;

/// A `(key, child-block)` pair bubbled up from a leaf/directory split so
/// the parent directory can insert a pointer to the new sibling block.
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub key: Value,
    pub block_num: u64,
}

impl DirEntry {
    pub fn new(key: Value, block_num: u64) -> Self {
        Self { key, block_num }
    }
}
